use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("failed to list workflows in {}: {source}", dir.display())]
  Discovery {
    dir: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("unknown workflow: {name}")]
  UnknownWorkflow { name: String },
}
