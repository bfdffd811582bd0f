use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::project::ProjectSettings;
use crate::runner::RunnerConfig;
use crate::workflow::WorkflowDef;

/// Top-level configuration for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
  pub runner: RunnerConfig,
  pub project: ProjectSettings,
  /// Replaces the built-in catalog when present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflows: Option<Vec<WorkflowDef>>,
}

impl KitConfig {
  /// Parse a config from a JSON string.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse { source })
  }

  /// Load a config file.
  ///
  /// A relative `project.root` in the file is taken relative to the file's
  /// own directory, so a config can sit next to the scripts it describes.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut config = Self::from_json(&content)?;
    if config.project.root.is_relative() {
      let base = path.parent().unwrap_or_else(|| Path::new("."));
      config.project.root = base.join(&config.project.root);
    }

    Ok(config)
  }

  /// Absolute (or root-relative) workflows directory.
  pub fn workflows_dir(&self) -> PathBuf {
    self.project.resolve(&self.runner.workflows_dir)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    self.runner.validate()?;

    if let Some(workflows) = &self.workflows
      && let Some(def) = workflows.iter().find(|d| d.path.as_os_str().is_empty())
    {
      return Err(ConfigError::Invalid {
        field: "workflows".to_string(),
        message: format!(
          "entry {} has an empty path",
          def.name.as_deref().unwrap_or("<unnamed>")
        ),
      });
    }

    Ok(())
  }
}
