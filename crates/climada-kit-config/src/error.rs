//! Configuration errors.

use std::path::PathBuf;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The config file is not valid JSON for [`crate::KitConfig`].
  #[error("failed to parse config: {source}")]
  Parse {
    #[source]
    source: serde_json::Error,
  },

  /// A value is out of range or otherwise unusable.
  #[error("invalid value for '{field}': {message}")]
  Invalid { field: String, message: String },

  /// An output directory could not be created.
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
