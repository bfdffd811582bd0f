//! Runner errors.

use climada_kit_config::ConfigError;

/// Errors raised before any workflow runs.
///
/// Per-workflow problems never surface here. They become
/// [`climada_kit_workflow::FailureReason`]s on the workflow's result.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
  /// Invalid runner settings.
  #[error("invalid runner configuration: {source}")]
  Config {
    #[source]
    source: ConfigError,
  },

  /// A relative interpreter path could not be made absolute.
  #[error("failed to resolve interpreter '{interpreter}': {source}")]
  Interpreter {
    interpreter: String,
    #[source]
    source: std::io::Error,
  },

  /// The project output directories could not be created.
  #[error("failed to prepare project directories: {source}")]
  Prepare {
    #[source]
    source: ConfigError,
  },
}
