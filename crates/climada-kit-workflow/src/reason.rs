//! Why a workflow did not pass.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Markers a workflow prints when a Python dependency cannot be imported.
const IMPORT_FAILURE_MARKERS: &[&str] = &[
  "ModuleNotFoundError",
  "No module named",
  "Error importing required modules",
  "ImportError",
];

/// Reason attached to a failed or skipped result.
///
/// None of these abort a run. The runner turns each into a result and moves
/// on to the next workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
  /// The script file does not exist. No process was started.
  MissingFile,

  /// The script exited non-zero after failing to import a dependency.
  ImportUnavailable { module: Option<String> },

  /// The script ran past its time limit and was killed.
  Timeout { limit: Duration },

  /// The script exited with a non-zero code.
  UnexpectedExit { code: i32 },

  /// The script was terminated by a signal and has no exit code.
  Terminated,

  /// The interpreter program does not exist. Nothing after this can run.
  InterpreterNotFound { interpreter: String },

  /// The interpreter could not be started for another reason.
  Launch { message: String },

  /// The run was interrupted.
  Cancelled,

  /// The prerequisite probe failed before any script ran.
  PrerequisiteUnavailable { message: String },

  /// An earlier workflow hit an error that leaves nothing runnable.
  EnvironmentUnavailable,
}

impl FailureReason {
  /// Classify a non-zero exit from the script's captured output.
  pub fn from_exit(code: i32, output: &str) -> Self {
    if IMPORT_FAILURE_MARKERS.iter().any(|m| output.contains(m)) {
      FailureReason::ImportUnavailable {
        module: missing_module(output),
      }
    } else {
      FailureReason::UnexpectedExit { code }
    }
  }
}

/// Pull the module name out of `No module named 'climada'`.
fn missing_module(output: &str) -> Option<String> {
  let rest = output.split("No module named").nth(1)?.trim_start();
  let name: String = rest
    .trim_start_matches(['\'', '"'])
    .chars()
    .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
    .collect();

  if name.is_empty() { None } else { Some(name) }
}

impl fmt::Display for FailureReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FailureReason::MissingFile => write!(f, "missing file"),
      FailureReason::ImportUnavailable { module: Some(m) } => {
        write!(f, "required module '{}' is not installed", m)
      }
      FailureReason::ImportUnavailable { module: None } => {
        write!(f, "required modules are not installed")
      }
      FailureReason::Timeout { limit } => write!(f, "timed out after {:.1}s", limit.as_secs_f64()),
      FailureReason::UnexpectedExit { code } => write!(f, "exited with code {}", code),
      FailureReason::Terminated => write!(f, "terminated by signal"),
      FailureReason::InterpreterNotFound { interpreter } => {
        write!(f, "interpreter '{}' not found", interpreter)
      }
      FailureReason::Launch { message } => write!(f, "failed to launch: {}", message),
      FailureReason::Cancelled => write!(f, "interrupted"),
      FailureReason::PrerequisiteUnavailable { message } => {
        write!(f, "prerequisite unavailable: {}", message)
      }
      FailureReason::EnvironmentUnavailable => write!(f, "environment unavailable"),
    }
  }
}
