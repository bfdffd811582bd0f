//! Progress and summary output.

use std::io::Write;

use climada_kit_workflow::{WorkflowResult, WorkflowSpec, WorkflowStatus};

use crate::probe::ProbeOutcome;
use crate::report::{RULE_WIDTH, RunReport};

/// Receives run progress as it happens.
///
/// All methods default to doing nothing.
pub trait RunObserver {
  fn run_started(&mut self, _specs: &[WorkflowSpec]) {}
  fn prerequisite_checked(&mut self, _outcome: &ProbeOutcome) {}
  fn workflow_started(&mut self, _spec: &WorkflowSpec) {}
  fn workflow_finished(&mut self, _result: &WorkflowResult) {}
  fn run_finished(&mut self, _report: &RunReport) {}
}

/// Discards all progress.
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Plain-text console report.
///
/// Write errors (a closed stdout, usually) are ignored so a broken pipe
/// never changes the outcome of a run.
pub struct ConsoleReporter<W: Write> {
  out: W,
}

impl ConsoleReporter<std::io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write> ConsoleReporter<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn rule(&mut self) {
    let _ = writeln!(self.out, "{}", "=".repeat(RULE_WIDTH));
  }
}

impl<W: Write> RunObserver for ConsoleReporter<W> {
  fn run_started(&mut self, specs: &[WorkflowSpec]) {
    self.rule();
    let _ = writeln!(self.out, "CLIMADA Workflows Runner");
    self.rule();

    if specs.is_empty() {
      let _ = writeln!(self.out, "\nNo workflow scripts found.");
      return;
    }

    let _ = writeln!(self.out, "\nRunning {} workflow(s):", specs.len());
    for spec in specs {
      let _ = writeln!(self.out, "  {}. {}", spec.order, spec.name);
    }
  }

  fn prerequisite_checked(&mut self, outcome: &ProbeOutcome) {
    let _ = match outcome {
      ProbeOutcome::Available { version } => writeln!(
        self.out,
        "\n✓ CLIMADA {} detected",
        version.as_deref().unwrap_or("(unknown version)")
      ),
      ProbeOutcome::Unavailable { message } => writeln!(
        self.out,
        "\n⚠ WARNING: CLIMADA not available: {}\n  mamba env create -f environment.yml\n  mamba activate climada_env",
        message
      ),
      ProbeOutcome::Cancelled => writeln!(self.out, "\nInterrupted."),
    };
  }

  fn workflow_started(&mut self, spec: &WorkflowSpec) {
    let _ = writeln!(self.out);
    self.rule();
    let _ = writeln!(self.out, "Running: {}", spec.name);
    self.rule();
  }

  fn workflow_finished(&mut self, result: &WorkflowResult) {
    let reason = result
      .reason
      .as_ref()
      .map(ToString::to_string)
      .unwrap_or_default();

    let _ = match result.status {
      WorkflowStatus::Passed => {
        writeln!(self.out, "✓ PASSED ({:.1}s)", result.duration_secs())
      }
      WorkflowStatus::Failed => writeln!(
        self.out,
        "✗ FAILED ({:.1}s): {}",
        result.duration_secs(),
        reason
      ),
      WorkflowStatus::Skipped => writeln!(self.out, "- SKIPPED {}: {}", result.spec.name, reason),
    };

    if !result.output_excerpt.is_empty() {
      let _ = writeln!(self.out, "\nOutput (tail):");
      for line in result.output_excerpt.lines() {
        let _ = writeln!(self.out, "    {}", line);
      }
    }
  }

  fn run_finished(&mut self, report: &RunReport) {
    let _ = writeln!(self.out);
    let _ = writeln!(self.out, "{}", report.render_summary());

    let _ = if report.all_passed() {
      writeln!(self.out, "\n✓ All workflows completed successfully!")
    } else {
      writeln!(
        self.out,
        "\n⚠ Some workflows did not pass. Check the output above for details."
      )
    };
    let _ = self.out.flush();
  }
}
