use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when the prerequisite probe fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPrerequisite {
  /// Record every workflow as skipped without launching anything.
  #[default]
  Skip,
  /// Launch the workflows anyway and let each one report its own failure.
  Run,
}

/// Import probe run once before any workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerequisiteConfig {
  /// Module the interpreter must be able to import, e.g. "climada".
  pub module: String,
  /// Upper bound on the probe's wall-clock time.
  pub timeout_secs: u64,
}

impl Default for PrerequisiteConfig {
  fn default() -> Self {
    Self {
      module: "climada".to_string(),
      timeout_secs: 30,
    }
  }
}

impl PrerequisiteConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// Settings that govern how workflows are launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
  /// Program used to run each workflow script.
  pub interpreter: String,
  /// Directory holding the workflow scripts, relative to the project root.
  pub workflows_dir: PathBuf,
  /// Per-workflow wall-clock timeout.
  pub timeout_secs: u64,
  /// Number of trailing output lines kept for a failed workflow.
  pub output_tail_lines: usize,
  /// List scripts from `workflows_dir` instead of using the catalog.
  pub discover: bool,
  /// File extension matched by discovery.
  pub script_extension: String,
  /// Probe run before the first workflow. `null` disables it.
  pub prerequisite: Option<PrerequisiteConfig>,
  pub on_missing_prerequisite: MissingPrerequisite,
}

impl Default for RunnerConfig {
  fn default() -> Self {
    Self {
      interpreter: "python3".to_string(),
      workflows_dir: PathBuf::from("workflows"),
      timeout_secs: 300,
      output_tail_lines: 20,
      discover: false,
      script_extension: "py".to_string(),
      prerequisite: Some(PrerequisiteConfig::default()),
      on_missing_prerequisite: MissingPrerequisite::default(),
    }
  }
}

impl RunnerConfig {
  /// Per-workflow timeout as a [`Duration`].
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  /// Check that the settings can drive a run.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.interpreter.trim().is_empty() {
      return Err(ConfigError::Invalid {
        field: "runner.interpreter".to_string(),
        message: "must not be empty".to_string(),
      });
    }

    if self.timeout_secs == 0 {
      return Err(ConfigError::Invalid {
        field: "runner.timeout_secs".to_string(),
        message: "must be greater than zero".to_string(),
      });
    }

    if let Some(prerequisite) = &self.prerequisite {
      if prerequisite.module.trim().is_empty() {
        return Err(ConfigError::Invalid {
          field: "runner.prerequisite.module".to_string(),
          message: "must not be empty".to_string(),
        });
      }
      if prerequisite.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
          field: "runner.prerequisite.timeout_secs".to_string(),
          message: "must be greater than zero".to_string(),
        });
      }
    }

    Ok(())
  }
}
