//! ps-sweep: parameter ranges and the matrix walker.
//!
//! Provides:
//! - `ParameterRange` stepping policies (linear, exponential, explicit list)
//! - `Parameter` cursors over pre-materialized values aimed at a config key path
//! - `walk_matrix`, the single odometer-order Cartesian product walker
//!
//! # Example
//!
//! ```
//! use ps_sweep::{ParameterRange, walk_matrix};
//!
//! let mut ranges = vec![
//!     ParameterRange::linear("stiffness", "Stiffness", 1000.0, 10000.0, 9000.0).unwrap(),
//!     ParameterRange::linear("viscosity", "Viscosity", 0.0, 0.5, 0.5).unwrap(),
//! ];
//! let mut seen = Vec::new();
//! walk_matrix(&mut ranges, |values| {
//!     seen.push(values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" "));
//!     Ok::<(), std::convert::Infallible>(())
//! })
//! .unwrap();
//! assert_eq!(seen.len(), 4);
//! assert_eq!(seen[1], "stiffness=1000 viscosity=0.5");
//! ```

pub mod error;
pub mod parameter;
pub mod range;
pub mod walker;

pub use error::{SweepError, SweepResult};
pub use parameter::{Assignment, Parameter};
pub use range::{ParameterRange, ParameterValue, RangeSpec};
pub use walker::{Cursor, combinations, walk_matrix};
