//! Parameter ranges.
//!
//! A range is a small state machine over one scalar dimension: it starts at
//! its first value, advances one value at a time and reports when no further
//! value exists. The matrix walker drives ranges only through the `Cursor`
//! capability set, so the stepping policy stays local to this module.

use crate::walker::Cursor;
use crate::{SweepError, SweepResult};
use ps_core::{Real, Scalar, Tolerances, ensure_finite, within_step};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable snapshot of one dimension's current setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub name: String,
    pub description: String,
    pub value: Scalar,
}

impl ParameterValue {
    /// Command line flag form, `--name=value`.
    pub fn as_flag(&self) -> String {
        format!("--{}={}", self.name, self.value)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Bounds and cursor shared by the linear and exponential policies.
#[derive(Debug, Clone, PartialEq)]
pub struct SteppedRange {
    name: String,
    description: String,
    start: Real,
    end: Real,
    step: Real,
    current: Real,
    exhausted: bool,
}

impl SteppedRange {
    fn new(name: String, description: String, start: Real, end: Real, step: Real) -> Self {
        Self {
            name,
            description,
            start,
            end,
            step,
            current: start,
            exhausted: false,
        }
    }

    pub fn start(&self) -> Real {
        self.start
    }

    pub fn end(&self) -> Real {
        self.end
    }

    pub fn step(&self) -> Real {
        self.step
    }

    fn direction(&self) -> Real {
        (self.end - self.start).signum()
    }

    fn reset(&mut self) {
        self.current = self.start;
        self.exhausted = false;
    }

    /// Step with `apply`, clamping onto `end` when the step would reach or
    /// overshoot it. Closeness is measured against the size of the step just
    /// taken. The advance after the clamped endpoint exhausts the range.
    fn advance_with(&mut self, apply: impl Fn(Real, Real) -> Real) {
        if self.exhausted {
            return;
        }
        if self.current == self.end {
            self.exhausted = true;
            return;
        }

        let next = apply(self.current, self.step);
        let increment = next - self.current;
        let overshoots = (next - self.end) * self.direction() > 0.0;
        if overshoots || within_step(next, self.end, increment, Tolerances::default()) {
            self.current = self.end;
        } else {
            self.current = next;
        }
    }
}

/// Explicit ordered list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitRange {
    name: String,
    description: String,
    values: Vec<Scalar>,
    index: usize,
}

impl ExplicitRange {
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }
}

/// A single sweep dimension with its stepping policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterRange {
    /// Advancing adds `step`.
    Linear(SteppedRange),
    /// Advancing multiplies by `step`.
    Exponential(SteppedRange),
    /// Advancing moves to the next listed value.
    Explicit(ExplicitRange),
}

impl ParameterRange {
    /// Linear range from `start` to `end` (inclusive, clamped) by `step`.
    pub fn linear(
        name: impl Into<String>,
        description: impl Into<String>,
        start: Real,
        end: Real,
        step: Real,
    ) -> SweepResult<Self> {
        let name = name.into();
        validate_finite(&name, start, end, step)?;

        if step == 0.0 {
            return Err(SweepError::invalid_range(&name, "step must be non-zero"));
        }
        if (end - start) * step < 0.0 {
            return Err(SweepError::invalid_range(
                &name,
                format!("step {step} moves away from end {end} (start {start})"),
            ));
        }
        if start != end && (start + step == start || end - step == end) {
            return Err(SweepError::invalid_range(
                &name,
                format!("step {step} is too small to change values between {start} and {end}"),
            ));
        }

        Ok(Self::Linear(SteppedRange::new(
            name,
            description.into(),
            start,
            end,
            step,
        )))
    }

    /// Geometric range from `start` to `end` (inclusive, clamped), multiplying by `step`.
    pub fn exponential(
        name: impl Into<String>,
        description: impl Into<String>,
        start: Real,
        end: Real,
        step: Real,
    ) -> SweepResult<Self> {
        let name = name.into();
        validate_finite(&name, start, end, step)?;

        if start == 0.0 {
            return Err(SweepError::invalid_range(&name, "start must be non-zero"));
        }
        if end / start <= 0.0 {
            return Err(SweepError::invalid_range(
                &name,
                "start and end must share a sign",
            ));
        }
        if step <= 0.0 {
            return Err(SweepError::invalid_range(
                &name,
                "multiplier must be positive",
            ));
        }
        if step == 1.0 {
            return Err(SweepError::invalid_range(
                &name,
                "multiplier of 1 never reaches end",
            ));
        }
        let grows = end.abs() > start.abs();
        let shrinks = end.abs() < start.abs();
        if (grows && step < 1.0) || (shrinks && step > 1.0) {
            return Err(SweepError::invalid_range(
                &name,
                format!("multiplier {step} moves away from end {end} (start {start})"),
            ));
        }
        if start != end && start * step == start {
            return Err(SweepError::invalid_range(
                &name,
                format!("multiplier {step} is too close to 1 to change {start}"),
            ));
        }

        Ok(Self::Exponential(SteppedRange::new(
            name,
            description.into(),
            start,
            end,
            step,
        )))
    }

    pub fn explicit(
        name: impl Into<String>,
        description: impl Into<String>,
        values: Vec<Scalar>,
    ) -> SweepResult<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(SweepError::invalid_range(
                &name,
                "explicit range needs at least one value",
            ));
        }
        Ok(Self::Explicit(ExplicitRange {
            name,
            description: description.into(),
            values,
            index: 0,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Linear(r) | Self::Exponential(r) => &r.name,
            Self::Explicit(r) => &r.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Linear(r) | Self::Exponential(r) => &r.description,
            Self::Explicit(r) => &r.description,
        }
    }

    fn current_scalar(&self) -> Scalar {
        match self {
            Self::Linear(r) | Self::Exponential(r) => Scalar::Float(r.current),
            Self::Explicit(r) => {
                let last = r.values.len().saturating_sub(1);
                r.values[r.index.min(last)].clone()
            }
        }
    }

    /// Every value the range yields, in order. The range itself is untouched.
    pub fn values(&self) -> Vec<Scalar> {
        let mut scratch = self.clone();
        scratch.reset();
        let mut values = vec![scratch.current_scalar()];
        scratch.advance();
        while !scratch.is_terminal() {
            values.push(scratch.current_scalar());
            scratch.advance();
        }
        values
    }

    pub fn value_count(&self) -> usize {
        match self {
            Self::Explicit(r) => r.values.len(),
            _ => self.values().len(),
        }
    }
}

impl Cursor for ParameterRange {
    type Item = ParameterValue;

    fn reset(&mut self) {
        match self {
            Self::Linear(r) | Self::Exponential(r) => r.reset(),
            Self::Explicit(r) => r.index = 0,
        }
    }

    fn advance(&mut self) {
        match self {
            Self::Linear(r) => r.advance_with(|value, step| value + step),
            Self::Exponential(r) => r.advance_with(|value, step| value * step),
            Self::Explicit(r) => {
                if r.index < r.values.len() {
                    r.index += 1;
                }
            }
        }
    }

    fn is_terminal(&self) -> bool {
        match self {
            Self::Linear(r) | Self::Exponential(r) => r.exhausted,
            Self::Explicit(r) => r.index >= r.values.len(),
        }
    }

    fn current(&self) -> ParameterValue {
        ParameterValue {
            name: self.name().to_string(),
            description: self.description().to_string(),
            value: self.current_scalar(),
        }
    }
}

fn validate_finite(name: &str, start: Real, end: Real, step: Real) -> SweepResult<()> {
    for (value, what) in [(start, "start"), (end, "end"), (step, "step")] {
        ensure_finite(value, what)
            .map_err(|_| SweepError::invalid_range(name, format!("{what} {value} is not finite")))?;
    }
    Ok(())
}

/// Serializable description of a range, used by plan files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSpec {
    Linear { start: Real, end: Real, step: Real },
    Exponential { start: Real, end: Real, step: Real },
    Explicit { values: Vec<Scalar> },
}

impl RangeSpec {
    pub fn build(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> SweepResult<ParameterRange> {
        match self {
            Self::Linear { start, end, step } => {
                ParameterRange::linear(name, description, *start, *end, *step)
            }
            Self::Exponential { start, end, step } => {
                ParameterRange::exponential(name, description, *start, *end, *step)
            }
            Self::Explicit { values } => {
                ParameterRange::explicit(name, description, values.clone())
            }
        }
    }
}
