use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A workflow entry in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  /// Script path, relative to the workflows directory unless absolute.
  pub path: PathBuf,
  /// Display name. Defaults to the script's file name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
}
