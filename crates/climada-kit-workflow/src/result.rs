use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reason::FailureReason;
use crate::spec::WorkflowSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
  Passed,
  Failed,
  Skipped,
}

impl fmt::Display for WorkflowStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      WorkflowStatus::Passed => "PASSED",
      WorkflowStatus::Failed => "FAILED",
      WorkflowStatus::Skipped => "SKIPPED",
    };
    f.pad(label)
  }
}

/// Outcome of attempting one workflow.
///
/// Built through [`WorkflowResult::passed`], [`WorkflowResult::failed`] or
/// [`WorkflowResult::skipped`] so status and reason always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
  pub spec: WorkflowSpec,
  pub status: WorkflowStatus,
  pub duration: Duration,
  /// Tail of combined stdout/stderr. Empty unless the workflow failed.
  pub output_excerpt: String,
  pub reason: Option<FailureReason>,
}

impl WorkflowResult {
  pub fn passed(spec: WorkflowSpec, duration: Duration) -> Self {
    Self {
      spec,
      status: WorkflowStatus::Passed,
      duration,
      output_excerpt: String::new(),
      reason: None,
    }
  }

  pub fn failed(
    spec: WorkflowSpec,
    reason: FailureReason,
    duration: Duration,
    output_excerpt: String,
  ) -> Self {
    Self {
      spec,
      status: WorkflowStatus::Failed,
      duration,
      output_excerpt,
      reason: Some(reason),
    }
  }

  /// A workflow that was never launched.
  pub fn skipped(spec: WorkflowSpec, reason: FailureReason) -> Self {
    Self {
      spec,
      status: WorkflowStatus::Skipped,
      duration: Duration::ZERO,
      output_excerpt: String::new(),
      reason: Some(reason),
    }
  }

  pub fn is_passed(&self) -> bool {
    self.status == WorkflowStatus::Passed
  }

  pub fn duration_secs(&self) -> f64 {
    self.duration.as_secs_f64()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_constructors_pair_status_and_reason() {
    let spec = WorkflowSpec::from_path("a.py", 1);

    let passed = WorkflowResult::passed(spec.clone(), Duration::from_secs(2));
    assert!(passed.is_passed());
    assert!(passed.reason.is_none());
    assert_eq!(passed.duration_secs(), 2.0);

    let failed = WorkflowResult::failed(
      spec.clone(),
      FailureReason::UnexpectedExit { code: 1 },
      Duration::from_millis(10),
      "boom".to_string(),
    );
    assert_eq!(failed.status, WorkflowStatus::Failed);
    assert_eq!(failed.output_excerpt, "boom");

    let skipped = WorkflowResult::skipped(spec, FailureReason::Cancelled);
    assert_eq!(skipped.status, WorkflowStatus::Skipped);
    assert_eq!(skipped.duration, Duration::ZERO);
  }

  #[test]
  fn test_status_display_respects_width() {
    assert_eq!(format!("{:<8}|", WorkflowStatus::Failed), "FAILED  |");
  }
}
