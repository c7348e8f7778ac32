//! Persisted sweep data types.

use chrono::{DateTime, Utc};
use ps_core::{CoreResult, InstanceId, KeyPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use uuid::Uuid;

/// Outcome of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Invocation has not returned yet.
    Pending,
    Succeeded {
        exit_code: i32,
    },
    /// Non-zero exit, or terminated by a signal (`exit_code` is then `None`).
    Failed {
        exit_code: Option<i32>,
    },
    /// The process could not be started.
    LaunchFailed {
        message: String,
    },
}

impl InstanceStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::LaunchFailed { .. } => "launch_failed",
        }
    }
}

/// Persisted projection of one sweep instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationRecord {
    pub instance_id: InstanceId,
    /// Dotted target path -> value, in dimension order.
    pub parameters: Map<String, Value>,
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub config_digest: String,
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl DocumentationRecord {
    pub fn new<'a>(
        instance_id: InstanceId,
        assignment: impl IntoIterator<Item = (&'a KeyPath, &'a Value)>,
        config_path: PathBuf,
        output_dir: PathBuf,
        config_digest: String,
    ) -> Self {
        let parameters = assignment
            .into_iter()
            .map(|(path, value)| (path.dotted(), value.clone()))
            .collect();
        Self {
            instance_id,
            parameters,
            config_path,
            output_dir,
            config_digest,
            status: InstanceStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Value recorded for a dotted path.
    pub fn parameter(&self, dotted: &str) -> Option<&Value> {
        self.parameters.get(dotted)
    }

    /// Decode the recorded parameters back into key paths and values.
    pub fn assignment(&self) -> CoreResult<Vec<(KeyPath, Value)>> {
        self.parameters
            .iter()
            .map(|(dotted, value)| -> CoreResult<(KeyPath, Value)> {
                Ok((KeyPath::parse(dotted)?, value.clone()))
            })
            .collect()
    }
}

/// Sweep-level metadata written before the first instance runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub sweep_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub executable: PathBuf,
    pub template: PathBuf,
    pub run_length: f64,
    pub dimensions: Vec<String>,
    pub total_instances: usize,
}
