//! Reader for self-describing sensor logs.
//!
//! A sensor log is newline-delimited JSON. A definition object names the
//! sensor and its fields:
//!
//! ```text
//! {"name": "density", "definitions": [{"fieldName": "Average Density", "unit": "kg/m^3", "type": "float"}]}
//! ```
//!
//! Every following data row holds a timestep marker and one value per field:
//!
//! ```text
//! [{"simulationTime": 0.01, "timestepNumber": 1}, 1000.2]
//! ```
//!
//! A new definition object starts a new segment and discards the samples
//! collected so far.

use crate::{ResultsError, ResultsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One named column of a sensor log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(skip)]
    pub index: usize,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, rename = "type")]
    pub field_type: String,
}

#[derive(Deserialize)]
struct DefinitionHeader {
    #[serde(default)]
    name: String,
    definitions: Vec<SensorDefinition>,
}

/// Parsed series of one sensor log file.
#[derive(Debug, Clone, Default)]
pub struct SensorReader {
    name: String,
    definitions: Vec<SensorDefinition>,
    field_index: HashMap<String, usize>,
    series: Vec<Vec<f64>>,
    timesteps: Vec<Value>,
    segments: usize,
}

impl SensorReader {
    pub fn open(path: &Path) -> ResultsResult<Self> {
        let file = File::open(path).map_err(|e| ResultsError::SensorRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Parse a log from any buffered source. `source_name` labels errors.
    pub fn from_reader<R: BufRead>(reader: R, source_name: &str) -> ResultsResult<Self> {
        let mut sensor = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let line_no = i + 1;
            let malformed = |reason: String| ResultsError::MalformedSensorRow {
                source_name: source_name.to_string(),
                line: line_no,
                reason,
            };

            let record: Value = serde_json::from_str(trimmed)
                .map_err(|e| malformed(format!("invalid JSON: {e}")))?;
            match record {
                Value::Object(_) => {
                    let header: DefinitionHeader = serde_json::from_value(record)
                        .map_err(|e| malformed(format!("invalid definition object: {e}")))?;
                    sensor.define(header);
                }
                Value::Array(items) => sensor.push_row(items).map_err(malformed)?,
                _ => {
                    return Err(malformed(
                        "expected a definition object or a data row".to_string(),
                    ));
                }
            }
        }
        Ok(sensor)
    }

    fn define(&mut self, header: DefinitionHeader) {
        if self.segments > 0 {
            tracing::debug!(
                sensor = %header.name,
                discarded_rows = self.timesteps.len(),
                "sensor schema redefined"
            );
        }
        self.segments += 1;
        self.name = header.name;
        self.field_index.clear();
        self.definitions = header.definitions;
        for (index, def) in self.definitions.iter_mut().enumerate() {
            def.index = index;
            self.field_index.insert(def.field_name.clone(), index);
        }
        self.series = vec![Vec::new(); self.definitions.len()];
        self.timesteps.clear();
    }

    fn push_row(&mut self, items: Vec<Value>) -> Result<(), String> {
        if self.segments == 0 {
            return Err("data row before any definition object".to_string());
        }
        let expected = self.definitions.len() + 1;
        if items.len() != expected {
            return Err(format!(
                "expected {} elements, found {}",
                expected,
                items.len()
            ));
        }

        let mut items = items.into_iter();
        let marker = items.next().unwrap_or(Value::Null);
        let mut row = Vec::with_capacity(self.definitions.len());
        for (def, value) in self.definitions.iter().zip(items) {
            let sample = match &value {
                Value::Number(n) => n.as_f64(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            };
            match sample {
                Some(sample) => row.push(sample),
                None => return Err(format!("field '{}' is not numeric: {value}", def.field_name)),
            }
        }

        self.timesteps.push(marker);
        for (series, sample) in self.series.iter_mut().zip(row) {
            series.push(sample);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definitions(&self) -> &[SensorDefinition] {
        &self.definitions
    }

    /// Number of data rows in the current segment.
    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    pub fn timesteps(&self) -> &[Value] {
        &self.timesteps
    }

    /// Simulation time of each row: the marker itself when numeric, or its
    /// `simulationTime` member when it is a timepoint object.
    pub fn simulation_times(&self) -> Vec<Option<f64>> {
        self.timesteps
            .iter()
            .map(|marker| match marker {
                Value::Number(n) => n.as_f64(),
                Value::Object(map) => map.get("simulationTime").and_then(Value::as_f64),
                _ => None,
            })
            .collect()
    }

    fn series(&self, field_name: &str) -> ResultsResult<&[f64]> {
        let index = self
            .field_index
            .get(field_name)
            .ok_or_else(|| ResultsError::UnknownField {
                field: field_name.to_string(),
            })?;
        Ok(&self.series[*index])
    }

    pub fn get_data(&self, field_name: &str) -> ResultsResult<Vec<f64>> {
        Ok(self.series(field_name)?.to_vec())
    }

    /// Arithmetic mean; an empty series has mean `0.0`.
    pub fn get_data_mean(&self, field_name: &str) -> ResultsResult<f64> {
        let data = self.series(field_name)?;
        if data.is_empty() {
            return Ok(0.0);
        }
        Ok(data.iter().sum::<f64>() / data.len() as f64)
    }

    pub fn get_data_max(&self, field_name: &str) -> ResultsResult<f64> {
        let data = self.series(field_name)?;
        data.iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| ResultsError::EmptySeries {
                field: field_name.to_string(),
            })
    }

    pub fn get_data_min(&self, field_name: &str) -> ResultsResult<f64> {
        let data = self.series(field_name)?;
        data.iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| ResultsError::EmptySeries {
                field: field_name.to_string(),
            })
    }

    /// Unbiased sample variance (divides by `n - 1`).
    pub fn get_data_sample_variance(&self, field_name: &str) -> ResultsResult<f64> {
        let data = self.series(field_name)?;
        if data.len() < 2 {
            return Err(ResultsError::InsufficientSamples {
                field: field_name.to_string(),
                needed: 2,
                found: data.len(),
            });
        }
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let squares: f64 = data.iter().map(|v| (v - mean) * (v - mean)).sum();
        Ok(squares / (n - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ResultsResult<SensorReader> {
        SensorReader::from_reader(text.as_bytes(), "test")
    }

    const ONE_FIELD: &str = r#"{"name": "iisph", "definitions": [{"fieldName": "Last Iteration Count", "type": "int"}]}"#;

    #[test]
    fn mean_of_two_rows() {
        let text = format!("{ONE_FIELD}\n[0, 1.0]\n[1, 3.0]\n");
        let sensor = parse(&text).unwrap();
        assert_eq!(sensor.name(), "iisph");
        assert_eq!(sensor.get_data_mean("Last Iteration Count").unwrap(), 2.0);
        assert_eq!(sensor.get_data_max("Last Iteration Count").unwrap(), 3.0);
        assert_eq!(sensor.get_data_min("Last Iteration Count").unwrap(), 1.0);
        assert_eq!(sensor.get_data_sample_variance("Last Iteration Count").unwrap(), 2.0);
        assert_eq!(sensor.timesteps(), &[serde_json::json!(0), serde_json::json!(1)]);
    }

    #[test]
    fn empty_series_conventions() {
        let sensor = parse(ONE_FIELD).unwrap();
        let field = "Last Iteration Count";
        assert!(sensor.get_data(field).unwrap().is_empty());
        assert_eq!(sensor.get_data_mean(field).unwrap(), 0.0);
        assert!(matches!(
            sensor.get_data_max(field),
            Err(ResultsError::EmptySeries { .. })
        ));
        assert!(matches!(
            sensor.get_data_sample_variance(field),
            Err(ResultsError::InsufficientSamples { needed: 2, found: 0, .. })
        ));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let sensor = parse(ONE_FIELD).unwrap();
        assert!(matches!(
            sensor.get_data_mean("Average Density"),
            Err(ResultsError::UnknownField { .. })
        ));
    }

    #[test]
    fn row_length_mismatch_aborts() {
        let text = format!("{ONE_FIELD}\n[0, 1.0]\n[1, 3.0, 4.0]\n");
        match parse(&text) {
            Err(ResultsError::MalformedSensorRow { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn rows_need_a_definition_and_numbers() {
        assert!(matches!(
            parse("[0, 1.0]"),
            Err(ResultsError::MalformedSensorRow { line: 1, .. })
        ));
        let text = format!("{ONE_FIELD}\n[0, \"fast\"]\n");
        assert!(matches!(
            parse(&text),
            Err(ResultsError::MalformedSensorRow { line: 2, .. })
        ));
        assert!(matches!(
            parse("42"),
            Err(ResultsError::MalformedSensorRow { .. })
        ));
    }

    #[test]
    fn redefinition_resets_series() {
        let text = concat!(
            r#"{"name": "a", "definitions": [{"fieldName": "x"}]}"#,
            "\n[0, 5.0]\n[1, 6.0]\n\n",
            r#"{"name": "b", "definitions": [{"fieldName": "y"}, {"fieldName": "z"}]}"#,
            "\n[2, 1.0, true]\n",
        );
        let sensor = parse(text).unwrap();
        assert_eq!(sensor.name(), "b");
        assert_eq!(sensor.len(), 1);
        assert!(matches!(sensor.get_data("x"), Err(ResultsError::UnknownField { .. })));
        assert_eq!(sensor.get_data("z").unwrap(), vec![1.0]);
        assert_eq!(sensor.definitions()[1].index, 1);
    }

    #[test]
    fn timepoint_markers_expose_simulation_time() {
        let text = format!(
            "{ONE_FIELD}\n[{{\"simulationTime\": 0.5, \"timestepNumber\": 3}}, 2]\n[1.5, 4]\n[\"late\", 1]\n"
        );
        let sensor = parse(&text).unwrap();
        assert_eq!(sensor.simulation_times(), vec![Some(0.5), Some(1.5), None]);
    }
}
