//! Sequential workflow runner.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use climada_kit_config::{MissingPrerequisite, ProjectSettings, RunnerConfig};
use climada_kit_workflow::{FailureReason, WorkflowResult, WorkflowSpec};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::console::RunObserver;
use crate::error::RunnerError;
use crate::probe::{self, ProbeOutcome};
use crate::process::{self, Exit, ProcessCommand, ProcessOutcome};
use crate::report::RunReport;

/// Runs workflow scripts one at a time and collects their results.
///
/// The runner owns its configuration. Each workflow gets the same
/// interpreter, timeout and project environment, read from that value and
/// nowhere else.
pub struct WorkflowRunner {
  config: RunnerConfig,
  project: ProjectSettings,
  /// The interpreter as launched. Relative paths are made absolute so the
  /// probe and every workflow, each with its own working directory, start
  /// the same binary.
  interpreter: PathBuf,
  env: Vec<(String, String)>,
}

impl WorkflowRunner {
  pub fn new(config: RunnerConfig, project: ProjectSettings) -> Result<Self, RunnerError> {
    config
      .validate()
      .map_err(|source| RunnerError::Config { source })?;

    let interpreter = resolve_interpreter(&config.interpreter, &project).map_err(|source| {
      RunnerError::Interpreter {
        interpreter: config.interpreter.clone(),
        source,
      }
    })?;

    let env = project.env_vars();
    Ok(Self {
      config,
      project,
      interpreter,
      env,
    })
  }

  /// Create the project output directories if the project asks for them.
  pub fn prepare(&self) -> Result<(), RunnerError> {
    if self.project.create_output_dirs {
      self
        .project
        .ensure_output_dirs()
        .map_err(|source| RunnerError::Prepare { source })?;
    }
    Ok(())
  }

  /// Run every spec in order and return one result per spec.
  ///
  /// A failing or hanging workflow never stops the run. Only a missing
  /// interpreter, a failed prerequisite probe or cancellation stop launching
  /// new processes. The specs left over are then recorded as skipped.
  #[instrument(name = "workflow_run_all", skip_all, fields(workflows = specs.len()))]
  pub async fn run(
    &self,
    specs: &[WorkflowSpec],
    observer: &mut dyn RunObserver,
    cancel: &CancellationToken,
  ) -> RunReport {
    let started = Instant::now();
    observer.run_started(specs);
    info!(interpreter = %self.config.interpreter, "run_started");

    let mut halt = if specs.is_empty() {
      None
    } else {
      self.check_prerequisite(observer, cancel).await
    };

    let mut results = Vec::with_capacity(specs.len());
    for spec in specs {
      if halt.is_none() && cancel.is_cancelled() {
        halt = Some(FailureReason::Cancelled);
      }

      let result = match &halt {
        Some(reason) => WorkflowResult::skipped(spec.clone(), reason.clone()),
        None => {
          observer.workflow_started(spec);
          let result = self.run_workflow(spec, cancel).await;
          halt = halt_reason(&result);
          result
        }
      };

      observer.workflow_finished(&result);
      results.push(result);
    }

    let report = RunReport::new(results, started.elapsed());
    info!(
      passed = report.passed(),
      failed = report.failed(),
      skipped = report.skipped(),
      total = report.total(),
      duration_secs = report.total_duration.as_secs_f64(),
      "run_completed"
    );
    observer.run_finished(&report);

    report
  }

  /// Run the probe if one is configured. Returns the reason to skip
  /// everything, if any.
  async fn check_prerequisite(
    &self,
    observer: &mut dyn RunObserver,
    cancel: &CancellationToken,
  ) -> Option<FailureReason> {
    let prerequisite = self.config.prerequisite.as_ref()?;

    let outcome = probe::check(
      &self.interpreter,
      prerequisite,
      &self.env,
      &self.project.root,
      cancel,
    )
    .await;
    observer.prerequisite_checked(&outcome);

    match outcome {
      ProbeOutcome::Available { .. } => None,
      ProbeOutcome::Cancelled => Some(FailureReason::Cancelled),
      ProbeOutcome::Unavailable { message } => match self.config.on_missing_prerequisite {
        MissingPrerequisite::Skip => Some(FailureReason::PrerequisiteUnavailable { message }),
        MissingPrerequisite::Run => {
          warn!("prerequisite unavailable, running workflows anyway");
          None
        }
      },
    }
  }

  /// Run a single workflow. Always produces a result.
  #[instrument(
    name = "workflow_execute",
    skip(self, spec, cancel),
    fields(workflow = %spec.name, order = spec.order)
  )]
  pub async fn run_workflow(&self, spec: &WorkflowSpec, cancel: &CancellationToken) -> WorkflowResult {
    if !spec.path.is_file() {
      warn!(path = %spec.path.display(), "workflow_missing");
      return WorkflowResult::failed(
        spec.clone(),
        FailureReason::MissingFile,
        Duration::ZERO,
        String::new(),
      );
    }

    let command = self.command_for(spec);
    info!(path = %spec.path.display(), "workflow_started");

    let result = match process::run(&command, cancel).await {
      Ok(outcome) => self.classify(spec, outcome),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => WorkflowResult::failed(
        spec.clone(),
        FailureReason::InterpreterNotFound {
          interpreter: self.config.interpreter.clone(),
        },
        Duration::ZERO,
        String::new(),
      ),
      Err(e) => WorkflowResult::failed(
        spec.clone(),
        FailureReason::Launch {
          message: e.to_string(),
        },
        Duration::ZERO,
        String::new(),
      ),
    };

    match &result.reason {
      None => info!(duration_secs = result.duration_secs(), "workflow_passed"),
      Some(reason) => error!(
        duration_secs = result.duration_secs(),
        reason = %reason,
        "workflow_failed"
      ),
    }

    result
  }

  /// `<interpreter> <file name>`, run from the script's own directory.
  fn command_for(&self, spec: &WorkflowSpec) -> ProcessCommand {
    let script: OsString = spec
      .path
      .file_name()
      .map(OsString::from)
      .unwrap_or_else(|| spec.path.clone().into_os_string());

    ProcessCommand {
      program: self.interpreter.clone().into_os_string(),
      args: vec![script],
      working_dir: spec.working_dir().to_path_buf(),
      env: self.env.clone(),
      timeout: self.config.timeout(),
      tail_lines: self.config.output_tail_lines,
    }
  }

  fn classify(&self, spec: &WorkflowSpec, outcome: ProcessOutcome) -> WorkflowResult {
    let reason = match outcome.exit {
      Exit::Code(0) => return WorkflowResult::passed(spec.clone(), outcome.elapsed),
      Exit::Code(code) => {
        let output = outcome.output.lines().collect::<Vec<_>>().join("\n");
        FailureReason::from_exit(code, &output)
      }
      Exit::Signal => FailureReason::Terminated,
      Exit::TimedOut => FailureReason::Timeout {
        limit: self.config.timeout(),
      },
      Exit::Cancelled => FailureReason::Cancelled,
    };

    WorkflowResult::failed(spec.clone(), reason, outcome.elapsed, outcome.output.render())
  }
}

/// Bare program names are left for `PATH` lookup. Paths with a directory
/// part resolve against the project root.
fn resolve_interpreter(interpreter: &str, project: &ProjectSettings) -> std::io::Result<PathBuf> {
  let path = Path::new(interpreter);
  if path.is_absolute() || path.components().count() < 2 {
    return Ok(path.to_path_buf());
  }
  std::path::absolute(project.resolve(path))
}

/// Whether a result leaves the rest of the run unable to proceed.
fn halt_reason(result: &WorkflowResult) -> Option<FailureReason> {
  match result.reason.as_ref()? {
    FailureReason::InterpreterNotFound { .. } => Some(FailureReason::EnvironmentUnavailable),
    FailureReason::Cancelled => Some(FailureReason::Cancelled),
    _ => None,
  }
}
