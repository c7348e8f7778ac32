//! Series runner: one simulator invocation per parameter combination.

use crate::error::{AppError, AppResult};
use crate::plan::{SimulatorFlags, SweepPlan};
use crate::progress::{SweepProgressEvent, SweepStage};
use crate::simulator::{Invocation, ProcessSimulator, Simulator};
use chrono::Utc;
use ps_config::{ConfigError, ConfigTemplate};
use ps_core::{InstanceId, KeyPath, Real};
use ps_results::{DocumentationRecord, InstanceStatus, SweepManifest, SweepStore, config_digest};
use ps_sweep::{Assignment, Parameter, combinations, walk_matrix};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

/// Where and how the simulator runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    pub executable: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub run_length: Real,
    pub flags: SimulatorFlags,
    pub path_fields: Vec<KeyPath>,
    pub capture_output: bool,
}

impl RunnerSettings {
    pub fn new(
        executable: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        run_length: Real,
    ) -> Self {
        Self {
            executable: executable.into(),
            template: template.into(),
            output: output.into(),
            run_length,
            flags: SimulatorFlags::default(),
            path_fields: Vec::new(),
            capture_output: false,
        }
    }
}

impl From<&SweepPlan> for RunnerSettings {
    fn from(plan: &SweepPlan) -> Self {
        Self {
            executable: plan.executable.clone(),
            template: plan.template.clone(),
            output: plan.output.clone(),
            run_length: plan.run_length,
            flags: plan.flags.clone(),
            path_fields: plan.path_fields.clone(),
            capture_output: plan.capture_output,
        }
    }
}

/// Outcome of a finished sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub sweep_id: Uuid,
    pub instances: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub documentation_path: PathBuf,
}

pub struct SeriesRunner<S = ProcessSimulator> {
    settings: RunnerSettings,
    template: ConfigTemplate,
    parameters: Vec<Parameter>,
    simulator: S,
    records: Vec<DocumentationRecord>,
    evaluated: bool,
}

impl SeriesRunner<ProcessSimulator> {
    pub fn from_plan(plan: &SweepPlan) -> AppResult<Self> {
        Self::new(RunnerSettings::from(plan), plan.parameters()?, ProcessSimulator)
    }
}

impl<S: Simulator> SeriesRunner<S> {
    /// Load the template and check that every dimension and path field
    /// resolves in it. Each key path may be swept by one parameter only.
    /// Parameters aimed at integer fields get integer values where they are
    /// whole numbers. Nothing is written.
    pub fn new(
        settings: RunnerSettings,
        parameters: Vec<Parameter>,
        simulator: S,
    ) -> AppResult<Self> {
        if parameters.is_empty() {
            return Err(AppError::NoDimensions);
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = parameters.iter().find(|p| !seen.insert(p.target_path().clone())) {
            return Err(AppError::DuplicateKeyPath {
                path: duplicate.path_as_string(),
            });
        }

        let template = ConfigTemplate::load(&settings.template)?;
        let targets = parameters.iter().map(Parameter::target_path);
        template
            .check_paths(targets.chain(settings.path_fields.iter()))
            .map_err(|e| match e {
                ConfigError::UnresolvedKeyPath { path, .. }
                | ConfigError::NotAContainer { path, .. } => AppError::UnresolvedKeyPath {
                    path,
                    template: settings.template.clone(),
                },
                other => other.into(),
            })?;

        let parameters = parameters
            .into_iter()
            .map(|parameter| match template.resolve(parameter.target_path()) {
                Ok(current) if current.is_i64() || current.is_u64() => {
                    parameter.with_integer_values()
                }
                _ => parameter,
            })
            .collect();

        Ok(Self {
            settings,
            template,
            parameters,
            simulator,
            records: Vec::new(),
            evaluated: false,
        })
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Records of the evaluated sweep, in instance order.
    pub fn records(&self) -> &[DocumentationRecord] {
        &self.records
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn total_instances(&self) -> usize {
        self.parameters.iter().map(Parameter::len).product()
    }

    /// Every combination the sweep would run, without running anything.
    pub fn preview(&self) -> Vec<(InstanceId, Vec<Assignment>)> {
        let mut cursors = self.parameters.clone();
        let mut id = InstanceId::FIRST;
        combinations(&mut cursors)
            .into_iter()
            .map(|assignment| {
                let entry = (id, assignment);
                id = id.next();
                entry
            })
            .collect()
    }

    pub fn evaluate(&mut self) -> AppResult<SweepSummary> {
        self.evaluate_with_progress(None)
    }

    /// Run the whole sweep. May be called once per runner.
    pub fn evaluate_with_progress(
        &mut self,
        mut progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
    ) -> AppResult<SweepSummary> {
        if self.evaluated {
            return Err(AppError::AlreadyEvaluated);
        }
        self.evaluated = true;

        let started = Instant::now();
        let total = self.total_instances();
        emit_progress(
            &mut progress_cb,
            SweepStage::PreparingOutput,
            None,
            (0, total),
            started,
            Some(self.settings.output.display().to_string()),
        );

        let store = SweepStore::create(self.settings.output.clone())?;
        let sweep_id = Uuid::new_v4();
        store.save_manifest(&SweepManifest {
            sweep_id,
            created_at: Utc::now(),
            executable: self.settings.executable.clone(),
            template: self.settings.template.clone(),
            run_length: self.settings.run_length,
            dimensions: self
                .parameters
                .iter()
                .map(Parameter::path_as_string)
                .collect(),
            total_instances: total,
        })?;

        let _span = tracing::info_span!("sweep", %sweep_id).entered();
        tracing::info!(
            instances = total,
            output = %self.settings.output.display(),
            "starting sweep"
        );

        let mut sweep = Sweep {
            settings: &self.settings,
            template: &self.template,
            simulator: &mut self.simulator,
            store,
            records: Vec::with_capacity(total),
            next_id: InstanceId::FIRST,
            total,
            started,
            progress_cb,
        };
        walk_matrix(&mut self.parameters, |assignment| {
            sweep.run_instance(assignment)
        })?;

        sweep.emit(SweepStage::WritingDocumentation, None, None);
        let documentation_path = sweep.store.save_documentation(&sweep.records)?;

        let succeeded = sweep
            .records
            .iter()
            .filter(|r| r.status.is_success())
            .count();
        let summary = SweepSummary {
            sweep_id,
            instances: sweep.records.len(),
            succeeded,
            failed: sweep.records.len() - succeeded,
            documentation_path,
        };
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            documentation = %summary.documentation_path.display(),
            "sweep finished"
        );
        sweep.emit(SweepStage::Completed, None, None);

        self.records = sweep.records;
        Ok(summary)
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(SweepProgressEvent)>,
    stage: SweepStage,
    instance_id: Option<InstanceId>,
    (completed, total): (usize, usize),
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(SweepProgressEvent {
            stage,
            instance_id,
            completed,
            total,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
        });
    }
}

struct Sweep<'a, 'p, S> {
    settings: &'a RunnerSettings,
    template: &'a ConfigTemplate,
    simulator: &'a mut S,
    store: SweepStore,
    records: Vec<DocumentationRecord>,
    next_id: InstanceId,
    total: usize,
    started: Instant,
    progress_cb: Option<&'p mut dyn FnMut(SweepProgressEvent)>,
}

impl<S: Simulator> Sweep<'_, '_, S> {
    fn emit(&mut self, stage: SweepStage, instance_id: Option<InstanceId>, message: Option<String>) {
        emit_progress(
            &mut self.progress_cb,
            stage,
            instance_id,
            (self.records.len(), self.total),
            self.started,
            message,
        );
    }

    fn run_instance(&mut self, assignment: &[Assignment]) -> AppResult<()> {
        let id = self.next_id;
        let overrides = || assignment.iter().map(|a| (&a.path, &a.value));
        self.emit(SweepStage::MaterializingConfig, Some(id), None);

        let mut doc = self.template.patched(overrides())?;
        self.template
            .rebase_path_fields(&mut doc, &self.settings.path_fields)?;
        let config_path = self
            .store
            .config_path(id, self.template.format().extension());
        self.template.write_document(&doc, &config_path)?;
        let output_dir = self.store.create_instance_dir(id)?;

        let mut record = DocumentationRecord::new(
            id,
            overrides(),
            config_path.clone(),
            output_dir.clone(),
            config_digest(&doc),
        );
        tracing::debug!(
            instance = %id,
            config = %config_path.display(),
            output = %output_dir.display(),
            "materialized instance"
        );

        let invocation = Invocation {
            instance_id: id,
            executable: self.settings.executable.clone(),
            config_path,
            output_dir,
            run_length: self.settings.run_length,
            flags: self.settings.flags.clone(),
            capture_output: self.settings.capture_output,
        };
        let described = describe(assignment);
        tracing::info!(instance = %id, assignment = %described, "running instance");
        self.emit(SweepStage::RunningInstance, Some(id), Some(described));

        record.started_at = Some(Utc::now());
        let status = match self.simulator.run(&invocation) {
            Ok(exit) => exit.status(),
            Err(e) => InstanceStatus::LaunchFailed {
                message: e.to_string(),
            },
        };
        record.finished_at = Some(Utc::now());
        if status.is_success() {
            tracing::info!(instance = %id, "instance succeeded");
        } else {
            tracing::warn!(instance = %id, status = ?status, "instance failed");
        }
        record.status = status;

        self.store.append_record(&record)?;
        self.records.push(record);
        self.next_id = id.next();
        self.emit(SweepStage::RecordingInstance, Some(id), None);
        Ok(())
    }
}

fn describe(assignment: &[Assignment]) -> String {
    assignment
        .iter()
        .map(|a| format!("{}={}", a.path, a.value))
        .collect::<Vec<_>>()
        .join(" ")
}
