//! ps-core: shared value types for paramsweep.
//!
//! Contains:
//! - scalar (configuration scalars carried by parameter ranges)
//! - key_path (dotted paths into nested config documents)
//! - ids (sweep instance identifiers)
//! - numeric (tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod key_path;
pub mod numeric;
pub mod scalar;

pub use error::{CoreError, CoreResult};
pub use ids::InstanceId;
pub use key_path::KeyPath;
pub use numeric::*;
pub use scalar::Scalar;
