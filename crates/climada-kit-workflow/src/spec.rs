use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A workflow script scheduled for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
  pub name: String,
  pub path: PathBuf,
  /// 1-based position in the declared list.
  pub order: usize,
}

impl WorkflowSpec {
  pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, order: usize) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
      order,
    }
  }

  /// Build a spec named after the script's file name.
  pub fn from_path(path: impl Into<PathBuf>, order: usize) -> Self {
    let path = path.into();
    let name = file_name(&path);
    Self { name, path, order }
  }

  /// Directory the script runs in.
  pub fn working_dir(&self) -> &Path {
    match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    }
  }
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
