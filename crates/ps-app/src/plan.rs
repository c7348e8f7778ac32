//! Sweep plan files.
//!
//! A plan names the simulator, the config template, the output root and the
//! swept parameters:
//!
//! ```yaml
//! executable: ./FluidConsole
//! template: scenes/test_gamma.json
//! output: runs/gamma
//! run_length: 10.0
//! path_fields: [particles]
//! parameters:
//!   - path: solver.gamma
//!     description: Pressure solver relaxation
//!     linear: { start: 0.3, end: 1.0, step: 0.05 }
//!   - path: solver.timestep.timestep
//!     values: [0.0025, 0.025]
//! ```
//!
//! Relative `executable`, `template` and `output` paths are taken relative to
//! the plan file's directory.

use crate::error::{AppError, AppResult};
use ps_core::{KeyPath, Real, Scalar};
use ps_sweep::{Parameter, RangeSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command-line flags passed to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorFlags {
    pub config: String,
    pub output: String,
    pub length: String,
}

impl Default for SimulatorFlags {
    fn default() -> Self {
        Self {
            config: "-f".to_string(),
            output: "-o".to_string(),
            length: "-l".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub start: Real,
    pub end: Real,
    pub step: Real,
}

/// One swept dimension. Exactly one of `values`, `linear`, `exponential`
/// must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPlan {
    pub path: KeyPath,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear: Option<StepSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponential: Option<StepSpec>,
}

impl ParameterPlan {
    pub fn range_spec(&self) -> AppResult<RangeSpec> {
        match (&self.values, self.linear, self.exponential) {
            (Some(values), None, None) => Ok(RangeSpec::Explicit {
                values: values.clone(),
            }),
            (None, Some(s), None) => Ok(RangeSpec::Linear {
                start: s.start,
                end: s.end,
                step: s.step,
            }),
            (None, None, Some(s)) => Ok(RangeSpec::Exponential {
                start: s.start,
                end: s.end,
                step: s.step,
            }),
            _ => Err(AppError::InvalidInput(format!(
                "parameter '{}' needs exactly one of values, linear or exponential",
                self.path
            ))),
        }
    }

    pub fn build(&self) -> AppResult<Parameter> {
        let range = self
            .range_spec()?
            .build(self.path.dotted(), self.description.clone())?;
        Ok(Parameter::from_range(self.path.clone(), &range)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub executable: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub run_length: Real,
    #[serde(default)]
    pub flags: SimulatorFlags,
    /// Template fields holding file paths relative to the template.
    #[serde(default)]
    pub path_fields: Vec<KeyPath>,
    /// Keep simulator stdout/stderr in the instance directory.
    #[serde(default)]
    pub capture_output: bool,
    pub parameters: Vec<ParameterPlan>,
}

impl SweepPlan {
    pub fn parameters(&self) -> AppResult<Vec<Parameter>> {
        self.parameters.iter().map(ParameterPlan::build).collect()
    }

    fn rebase(&mut self, base: &Path) {
        if base.as_os_str().is_empty() {
            return;
        }
        // A bare program name is looked up on PATH.
        if self.executable.is_relative() && self.executable.components().count() > 1 {
            self.executable = base.join(&self.executable);
        }
        for path in [&mut self.template, &mut self.output] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load a plan from a YAML file, resolving its relative paths.
pub fn load_plan(path: &Path) -> AppResult<SweepPlan> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::PlanRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut plan: SweepPlan = serde_yaml::from_str(&content).map_err(|e| AppError::PlanParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(base) = path.parent() {
        plan.rebase(base);
    }
    Ok(plan)
}
