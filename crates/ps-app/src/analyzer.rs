//! Joins documentation records with the sensor logs each instance wrote.

use crate::error::{AppError, AppResult};
use ps_core::InstanceId;
use ps_results::{
    DocumentationRecord, ResultsError, SensorReader, SweepStore, load_documentation_file,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One instance with its sensors, in the order they were requested.
#[derive(Debug, Clone)]
pub struct AnalyzedInstance<'a> {
    pub record: &'a DocumentationRecord,
    pub sensors: Vec<SensorReader>,
}

impl AnalyzedInstance<'_> {
    pub fn sensor(&self, filename_index: usize) -> Option<&SensorReader> {
        self.sensors.get(filename_index)
    }
}

/// Aggregates of one sensor field for one instance. `max` is `None` for an
/// empty series; `sample_variance` is `None` below two samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub instance_id: InstanceId,
    pub parameters: Map<String, Value>,
    pub samples: usize,
    pub mean: f64,
    pub max: Option<f64>,
    pub sample_variance: Option<f64>,
}

pub struct SeriesAnalyzer {
    root_dir: PathBuf,
    records: Vec<DocumentationRecord>,
    sensor_filenames: Vec<String>,
    succeeded_only: bool,
}

impl SeriesAnalyzer {
    /// `documentation_path` is the final `instance_docs.json`, the journal,
    /// or the sweep output directory itself. A missing final file falls back
    /// to the journal next to it.
    pub fn open<I, N>(documentation_path: &Path, sensor_filenames: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let (root_dir, records) = if documentation_path.is_dir() {
            let store = SweepStore::open(documentation_path.to_path_buf());
            (documentation_path.to_path_buf(), store.load_documentation()?)
        } else {
            let root_dir = documentation_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let records = if documentation_path.exists() {
                load_documentation_file(documentation_path)?
            } else {
                SweepStore::open(root_dir.clone()).load_documentation()?
            };
            (root_dir, records)
        };

        tracing::debug!(
            root = %root_dir.display(),
            records = records.len(),
            "loaded documentation"
        );
        Ok(Self {
            root_dir,
            records,
            sensor_filenames: sensor_filenames.into_iter().map(Into::into).collect(),
            succeeded_only: false,
        })
    }

    /// Skip instances whose simulator did not exit cleanly.
    pub fn only_succeeded(mut self) -> Self {
        self.succeeded_only = true;
        self
    }

    pub fn records(&self) -> &[DocumentationRecord] {
        &self.records
    }

    pub fn sensor_path(&self, instance_id: InstanceId, filename: &str) -> PathBuf {
        self.root_dir.join(instance_id.stem()).join(filename)
    }

    /// Lazily open the sensors of each instance as it is pulled.
    pub fn instances(&self) -> impl Iterator<Item = AppResult<AnalyzedInstance<'_>>> + '_ {
        self.records
            .iter()
            .filter(move |r| !self.succeeded_only || r.status.is_success())
            .map(move |record| {
                self.sensor_filenames
                    .iter()
                    .map(|name| SensorReader::open(&self.sensor_path(record.instance_id, name)))
                    .collect::<Result<Vec<_>, ResultsError>>()
                    .map(|sensors| AnalyzedInstance { record, sensors })
                    .map_err(AppError::from)
            })
    }

    /// Mean, max and sample variance of `field` from the first sensor of
    /// every instance.
    pub fn summarize(&self, field: &str) -> AppResult<Vec<FieldSummary>> {
        if self.sensor_filenames.is_empty() {
            return Err(AppError::InvalidInput(
                "no sensor file given to summarize".to_string(),
            ));
        }

        let mut out = Vec::new();
        for instance in self.instances() {
            let instance = instance?;
            let Some(sensor) = instance.sensor(0) else {
                continue;
            };
            out.push(FieldSummary {
                instance_id: instance.record.instance_id,
                parameters: instance.record.parameters.clone(),
                samples: sensor.get_data(field)?.len(),
                mean: sensor.get_data_mean(field)?,
                max: optional(sensor.get_data_max(field))?,
                sample_variance: optional(sensor.get_data_sample_variance(field))?,
            });
        }
        Ok(out)
    }
}

fn optional(result: Result<f64, ResultsError>) -> AppResult<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ResultsError::EmptySeries { .. } | ResultsError::InsufficientSamples { .. }) => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
