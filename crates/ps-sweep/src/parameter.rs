//! Index cursors over pre-materialized values aimed at a config key path.

use crate::range::ParameterRange;
use crate::walker::Cursor;
use crate::{SweepError, SweepResult};
use ps_core::KeyPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dimension's value placed at its config location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub path: KeyPath,
    pub value: Value,
}

/// A discrete sweep dimension targeting one key path of the config template.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    target_path: KeyPath,
    values: Vec<Value>,
    current_index: usize,
}

impl Parameter {
    pub fn new(target_path: KeyPath, values: Vec<Value>) -> SweepResult<Self> {
        if values.is_empty() {
            return Err(SweepError::EmptyParameterValues {
                path: target_path.dotted(),
            });
        }
        Ok(Self {
            target_path,
            values,
            current_index: 0,
        })
    }

    /// Materialize every value of `range` into a parameter.
    pub fn from_range(target_path: KeyPath, range: &ParameterRange) -> SweepResult<Self> {
        let values = range.values().iter().map(|v| v.to_json()).collect();
        Self::new(target_path, values)
    }

    pub fn target_path(&self) -> &KeyPath {
        &self.target_path
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Value under the cursor. Past the end this is the last value.
    pub fn current_value(&self) -> &Value {
        let last = self.values.len() - 1;
        &self.values[self.current_index.min(last)]
    }

    pub fn next(&mut self) {
        if self.current_index < self.values.len() {
            self.current_index += 1;
        }
    }

    pub fn at_end(&self) -> bool {
        self.current_index == self.values.len()
    }

    pub fn path_as_string(&self) -> String {
        self.target_path.dotted()
    }

    /// Rewrite whole-number floats as integers, for targets that hold
    /// integers. Fractional and non-numeric values are kept.
    pub fn with_integer_values(mut self) -> Self {
        for value in &mut self.values {
            if !value.is_f64() {
                continue;
            }
            if let Some(int) = value.as_f64().and_then(exact_integer) {
                *value = Value::from(int);
            }
        }
        self
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

fn exact_integer(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER).then_some(v as i64)
}

impl Cursor for Parameter {
    type Item = Assignment;

    fn reset(&mut self) {
        self.current_index = 0;
    }

    fn advance(&mut self) {
        self.next();
    }

    fn is_terminal(&self) -> bool {
        self.at_end()
    }

    fn current(&self) -> Assignment {
        Assignment {
            path: self.target_path.clone(),
            value: self.current_value().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(dotted: &str) -> KeyPath {
        KeyPath::parse(dotted).unwrap()
    }

    #[test]
    fn empty_values_are_a_construction_error() {
        let err = Parameter::new(path("solver.gamma"), vec![]).unwrap_err();
        assert_eq!(
            err,
            SweepError::EmptyParameterValues {
                path: "solver.gamma".to_string()
            }
        );
    }

    #[test]
    fn cursor_reaches_end_after_len_steps() {
        let mut param = Parameter::new(path("solver.gamma"), vec![json!(0.4), json!(0.5)]).unwrap();
        assert_eq!(param.current_value(), &json!(0.4));
        param.next();
        assert_eq!(param.current_value(), &json!(0.5));
        assert!(!param.at_end());
        param.next();
        assert!(param.at_end());
        param.next();
        assert_eq!(param.current_index(), 2);
        param.reset();
        assert_eq!(param.current().value, json!(0.4));
    }

    #[test]
    fn from_range_materializes_values() {
        let range = ParameterRange::linear("viscosity", "Viscosity", 0.0, 1.0, 0.5).unwrap();
        let param = Parameter::from_range(path("solver.viscosity"), &range).unwrap();
        assert_eq!(param.values(), &[json!(0.0), json!(0.5), json!(1.0)]);
        assert_eq!(param.path_as_string(), "solver.viscosity");
    }

    #[test]
    fn integer_targets_get_integer_values() {
        let range = ParameterRange::linear("stiffness", "", 1000.0, 10000.0, 4500.0).unwrap();
        let param = Parameter::from_range(path("solver.stiffness"), &range)
            .unwrap()
            .with_integer_values();
        assert_eq!(param.values(), &[json!(1000), json!(5500), json!(10000)]);
        assert!(param.values().iter().all(serde_json::Value::is_i64));

        let mixed = Parameter::new(path("a"), vec![json!(2.0), json!(2.5), json!("x"), json!(-3)])
            .unwrap()
            .with_integer_values();
        assert_eq!(mixed.values(), &[json!(2), json!(2.5), json!("x"), json!(-3)]);
    }

    #[test]
    fn values_may_be_structured() {
        let param = Parameter::new(
            path("scenario.emitter"),
            vec![json!({"rate": 10}), json!("off")],
        )
        .unwrap();
        assert_eq!(param.len(), 2);
        assert_eq!(param.current().path, path("scenario.emitter"));
    }
}
