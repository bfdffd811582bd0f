//! Pre-run check that the interpreter can import the wrapped library.

use std::path::Path;

use climada_kit_config::PrerequisiteConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::process::{self, Exit, ProcessCommand};

const PROBE_TAIL_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
  /// The module imported. `version` is its `__version__`, if it has one.
  Available { version: Option<String> },
  Unavailable { message: String },
  Cancelled,
}

/// Run `<interpreter> -c "import <module>"`.
///
/// Never fails: a missing interpreter, a failed import and a timeout all come
/// back as [`ProbeOutcome::Unavailable`].
#[instrument(
  name = "prerequisite_probe",
  skip(interpreter, prerequisite, env, working_dir, cancel),
  fields(interpreter = %interpreter.display(), module = %prerequisite.module)
)]
pub async fn check(
  interpreter: &Path,
  prerequisite: &PrerequisiteConfig,
  env: &[(String, String)],
  working_dir: &Path,
  cancel: &CancellationToken,
) -> ProbeOutcome {
  if !working_dir.is_dir() {
    let message = format!("working directory '{}' does not exist", working_dir.display());
    warn!(message = %message, "prerequisite_unavailable");
    return ProbeOutcome::Unavailable { message };
  }

  let module = &prerequisite.module;
  let code = format!(
    "import {module}; print(getattr({module}, '__version__', ''))",
    module = module
  );

  let command = ProcessCommand {
    program: interpreter.as_os_str().to_os_string(),
    args: vec!["-c".into(), code.into()],
    working_dir: working_dir.to_path_buf(),
    env: env.to_vec(),
    timeout: prerequisite.timeout(),
    tail_lines: PROBE_TAIL_LINES,
  };

  let outcome = match process::run(&command, cancel).await {
    Ok(outcome) => outcome,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      warn!("interpreter not found");
      return ProbeOutcome::Unavailable {
        message: format!("interpreter '{}' not found", interpreter.display()),
      };
    }
    Err(e) => {
      warn!(error = %e, "failed to launch probe");
      return ProbeOutcome::Unavailable {
        message: format!("failed to launch '{}': {}", interpreter.display(), e),
      };
    }
  };

  let result = match outcome.exit {
    Exit::Code(0) => ProbeOutcome::Available {
      version: outcome.output.last_line().map(str::to_string),
    },
    Exit::Code(code) => ProbeOutcome::Unavailable {
      message: outcome
        .output
        .last_line()
        .map(str::to_string)
        .unwrap_or_else(|| format!("cannot import '{}' (exit code {})", module, code)),
    },
    Exit::Signal => ProbeOutcome::Unavailable {
      message: format!("import of '{}' was terminated by a signal", module),
    },
    Exit::TimedOut => ProbeOutcome::Unavailable {
      message: format!(
        "import of '{}' timed out after {}s",
        module, prerequisite.timeout_secs
      ),
    },
    Exit::Cancelled => ProbeOutcome::Cancelled,
  };

  match &result {
    ProbeOutcome::Available { version } => {
      info!(version = version.as_deref().unwrap_or("unknown"), "prerequisite_available");
    }
    ProbeOutcome::Unavailable { message } => {
      warn!(message = %message, "prerequisite_unavailable");
    }
    ProbeOutcome::Cancelled => {}
  }

  result
}
