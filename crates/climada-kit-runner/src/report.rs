//! Aggregate outcome of a run and its summary table.

use std::fmt::Write;
use std::time::Duration;

use climada_kit_workflow::{WorkflowResult, WorkflowStatus};

pub(crate) const RULE_WIDTH: usize = 70;

/// Every result of a run, in declared order.
#[derive(Debug, Clone)]
pub struct RunReport {
  pub results: Vec<WorkflowResult>,
  pub total_duration: Duration,
}

impl RunReport {
  pub fn new(results: Vec<WorkflowResult>, total_duration: Duration) -> Self {
    Self {
      results,
      total_duration,
    }
  }

  pub fn total(&self) -> usize {
    self.results.len()
  }

  pub fn passed(&self) -> usize {
    self.count(WorkflowStatus::Passed)
  }

  pub fn failed(&self) -> usize {
    self.count(WorkflowStatus::Failed)
  }

  pub fn skipped(&self) -> usize {
    self.count(WorkflowStatus::Skipped)
  }

  /// True when every result passed. An empty run counts as passed.
  pub fn all_passed(&self) -> bool {
    self.results.iter().all(WorkflowResult::is_passed)
  }

  /// Process exit status: 0 when everything passed, 1 otherwise.
  pub fn exit_code(&self) -> u8 {
    if self.all_passed() { 0 } else { 1 }
  }

  /// `X/N passed`. Skipped workflows count in N only.
  pub fn aggregate_line(&self) -> String {
    format!("{}/{} passed", self.passed(), self.total())
  }

  fn count(&self, status: WorkflowStatus) -> usize {
    self.results.iter().filter(|r| r.status == status).count()
  }

  /// Render the summary table and totals.
  pub fn render_summary(&self) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let name_width = self
      .results
      .iter()
      .map(|r| r.spec.name.chars().count())
      .max()
      .unwrap_or(0)
      .max("Workflow".len());

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "WORKFLOW EXECUTION SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
      out,
      "{:>3}  {:<name_width$}  {:<7}  {:>9}",
      "#", "Workflow", "Status", "Duration"
    );
    let _ = writeln!(
      out,
      "{:>3}  {:<name_width$}  {:<7}  {:>9}",
      "-",
      "-".repeat(name_width),
      "-------",
      "---------"
    );

    for result in &self.results {
      let _ = writeln!(
        out,
        "{:>3}  {:<name_width$}  {:<7}  {:>8.1}s",
        result.spec.order,
        result.spec.name,
        result.status,
        result.duration_secs()
      );
    }

    let total_secs = self.total_duration.as_secs_f64();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", self.aggregate_line());
    let _ = writeln!(out, "Failed: {}", self.failed());
    let _ = writeln!(out, "Skipped: {}", self.skipped());
    let _ = write!(
      out,
      "Total time: {:.1}s ({:.1}m)",
      total_secs,
      total_secs / 60.0
    );

    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use climada_kit_workflow::{FailureReason, WorkflowSpec};

  fn spec(name: &str, order: usize) -> WorkflowSpec {
    WorkflowSpec::new(name, format!("workflows/{}", name), order)
  }

  #[test]
  fn test_all_passed() {
    let report = RunReport::new(
      (1..=5)
        .map(|i| WorkflowResult::passed(spec(&format!("w{}.py", i), i), Duration::from_secs(1)))
        .collect(),
      Duration::from_secs(5),
    );

    assert!(report.all_passed());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.aggregate_line(), "5/5 passed");
  }

  #[test]
  fn test_skipped_counts_in_denominator_only() {
    let report = RunReport::new(
      vec![
        WorkflowResult::passed(spec("a.py", 1), Duration::from_secs(1)),
        WorkflowResult::skipped(spec("b.py", 2), FailureReason::Cancelled),
      ],
      Duration::from_secs(1),
    );

    assert_eq!(report.aggregate_line(), "1/2 passed");
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.exit_code(), 1);
  }

  #[test]
  fn test_empty_run_passes() {
    let report = RunReport::new(vec![], Duration::ZERO);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.aggregate_line(), "0/0 passed");
  }

  #[test]
  fn test_summary_table_rows() {
    let report = RunReport::new(
      vec![
        WorkflowResult::passed(spec("01_basic_risk_assessment.py", 1), Duration::from_millis(1200)),
        WorkflowResult::failed(
          spec("02_exposure_integration.py", 2),
          FailureReason::UnexpectedExit { code: 1 },
          Duration::from_millis(400),
          String::new(),
        ),
      ],
      Duration::from_secs(90),
    );

    let summary = report.render_summary();
    assert!(summary.contains("WORKFLOW EXECUTION SUMMARY"));
    assert!(summary.contains("  1  01_basic_risk_assessment.py  PASSED        1.2s"));
    assert!(summary.contains("  2  02_exposure_integration.py   FAILED        0.4s"));
    assert!(summary.contains("1/2 passed"));
    assert!(summary.ends_with("Total time: 90.0s (1.5m)"));
  }
}
