//! climada-kit Runner
//!
//! Runs the kit's example workflows one after another, each in its own
//! child process, and reports what happened.
//!
//! # Architecture
//!
//! ```text
//! WorkflowRunner::run(specs, observer, cancel) -> RunReport
//! ├── probe::check            - optional "import climada" probe
//! └── run_workflow(spec)      - per spec, strictly sequential
//!     ├── missing file        -> FAILED, no process
//!     └── process::run        - spawn, wait | timeout | cancel, kill, reap
//!         └── OutputTail      - last N lines of stdout + stderr
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let runner = WorkflowRunner::new(config.runner, config.project)?;
//! let mut reporter = ConsoleReporter::stdout();
//! let report = runner.run(&specs, &mut reporter, &CancellationToken::new()).await;
//! std::process::exit(report.exit_code() as i32);
//! ```

mod console;
mod error;
mod probe;
mod process;
mod report;
mod runner;
mod tail;

pub use console::{ConsoleReporter, RunObserver, SilentObserver};
pub use error::RunnerError;
pub use probe::ProbeOutcome;
pub use report::RunReport;
pub use runner::WorkflowRunner;
pub use tail::OutputTail;
