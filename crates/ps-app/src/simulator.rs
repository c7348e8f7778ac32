//! The external simulator seam.

use crate::plan::SimulatorFlags;
use ps_core::{InstanceId, Real};
use ps_results::InstanceStatus;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const STDOUT_LOG: &str = "stdout.log";
pub const STDERR_LOG: &str = "stderr.log";

/// Everything needed to launch one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub instance_id: InstanceId,
    pub executable: PathBuf,
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub run_length: Real,
    pub flags: SimulatorFlags,
    pub capture_output: bool,
}

impl Invocation {
    /// `<config_flag> <config> <output_flag> <dir> <length_flag> <length>`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            OsString::from(&self.flags.config),
            self.config_path.clone().into_os_string(),
            OsString::from(&self.flags.output),
            self.output_dir.clone().into_os_string(),
            OsString::from(&self.flags.length),
            OsString::from(self.run_length.to_string()),
        ]
    }
}

/// How a simulator process ended. `code` is `None` when it was killed by a
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorExit {
    pub code: Option<i32>,
}

impl SimulatorExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn status(self) -> InstanceStatus {
        match self.code {
            Some(0) => InstanceStatus::Succeeded { exit_code: 0 },
            code => InstanceStatus::Failed { exit_code: code },
        }
    }
}

/// Runs one instance to completion. An `Err` means the process never
/// started.
pub trait Simulator {
    fn run(&mut self, invocation: &Invocation) -> io::Result<SimulatorExit>;
}

/// Launches the configured executable as a child process and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSimulator;

impl Simulator for ProcessSimulator {
    fn run(&mut self, invocation: &Invocation) -> io::Result<SimulatorExit> {
        let mut command = Command::new(&invocation.executable);
        command.args(invocation.args()).stdin(Stdio::null());

        if invocation.capture_output {
            let stdout = File::create(invocation.output_dir.join(STDOUT_LOG))?;
            let stderr = File::create(invocation.output_dir.join(STDERR_LOG))?;
            command.stdout(stdout).stderr(stderr);
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        tracing::debug!(
            executable = %invocation.executable.display(),
            args = ?invocation.args(),
            "launching simulator"
        );
        let status = command.status()?;
        Ok(SimulatorExit {
            code: status.code(),
        })
    }
}
