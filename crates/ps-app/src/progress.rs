use ps_core::InstanceId;

#[derive(Debug, Clone, PartialEq)]
pub enum SweepStage {
    PreparingOutput,
    MaterializingConfig,
    RunningInstance,
    RecordingInstance,
    WritingDocumentation,
    Completed,
}

#[derive(Debug, Clone)]
pub struct SweepProgressEvent {
    pub stage: SweepStage,
    pub instance_id: Option<InstanceId>,
    pub completed: usize,
    pub total: usize,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl SweepProgressEvent {
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

impl SweepStage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PreparingOutput => "preparing",
            Self::MaterializingConfig => "config",
            Self::RunningInstance => "running",
            Self::RecordingInstance => "recording",
            Self::WritingDocumentation => "docs",
            Self::Completed => "done",
        }
    }
}
