//! Application service layer for paramsweep.
//!
//! Ties the sweep engine, config templates and result storage together for
//! the CLI: loading plans, running a series of simulator invocations and
//! analyzing what the instances logged.

pub mod analyzer;
pub mod error;
pub mod plan;
pub mod progress;
pub mod runner;
pub mod simulator;

pub use analyzer::{AnalyzedInstance, FieldSummary, SeriesAnalyzer};
pub use error::{AppError, AppResult};
pub use plan::{ParameterPlan, SimulatorFlags, StepSpec, SweepPlan, load_plan};
pub use progress::{SweepProgressEvent, SweepStage};
pub use runner::{RunnerSettings, SeriesRunner, SweepSummary};
pub use simulator::{Invocation, ProcessSimulator, Simulator, SimulatorExit};
