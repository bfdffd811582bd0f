//! Scoped child-process execution.
//!
//! [`run`] owns the child from spawn to reap. Whichever way the wait ends
//! (exit, timeout or cancellation) the child is killed if still alive,
//! both output pipes are drained or abandoned, and a [`ProcessOutcome`] is
//! returned. `kill_on_drop` covers the remaining path where the future
//! itself is dropped mid-wait.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::tail::OutputTail;

/// How long reader tasks may take to hit EOF once the child is gone.
///
/// A grandchild that inherited the pipes can keep them open indefinitely.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Everything needed to launch one child process.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
  pub program: OsString,
  pub args: Vec<OsString>,
  pub working_dir: PathBuf,
  pub env: Vec<(String, String)>,
  pub timeout: Duration,
  /// Lines of combined output to keep.
  pub tail_lines: usize,
}

/// How the wait on a child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
  /// Exited on its own with this code.
  Code(i32),
  /// Ended by a signal without an exit code.
  Signal,
  /// Killed after exceeding the timeout.
  TimedOut,
  /// Killed because the run was cancelled.
  Cancelled,
}

#[derive(Debug)]
pub struct ProcessOutcome {
  pub exit: Exit,
  pub elapsed: Duration,
  pub output: OutputTail,
}

enum Waited {
  Exited(std::io::Result<std::process::ExitStatus>),
  TimedOut,
  Cancelled,
}

/// Run a command to completion, timeout or cancellation.
///
/// Only a failure to spawn is returned as an error. Everything after a
/// successful spawn is reported through [`Exit`].
pub async fn run(
  command: &ProcessCommand,
  cancel: &CancellationToken,
) -> std::io::Result<ProcessOutcome> {
  let started = Instant::now();

  let mut child = Command::new(&command.program)
    .args(&command.args)
    .current_dir(&command.working_dir)
    .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()?;

  debug!(pid = ?child.id(), "child_spawned");

  let (tx, mut rx) = mpsc::unbounded_channel::<String>();
  let readers = vec![
    spawn_reader(child.stdout.take(), tx.clone()),
    spawn_reader(child.stderr.take(), tx),
  ];

  let tail_lines = command.tail_lines;
  let collector = tokio::spawn(async move {
    let mut tail = OutputTail::new(tail_lines);
    while let Some(line) = rx.recv().await {
      tail.push(line);
    }
    tail
  });

  let waited = tokio::select! {
    status = child.wait() => Waited::Exited(status),
    () = tokio::time::sleep(command.timeout) => Waited::TimedOut,
    () = cancel.cancelled() => Waited::Cancelled,
  };

  let exit = match waited {
    Waited::Exited(Ok(status)) => match status.code() {
      Some(code) => Exit::Code(code),
      None => Exit::Signal,
    },
    Waited::Exited(Err(e)) => {
      warn!(error = %e, "failed to wait on child");
      kill(&mut child).await;
      Exit::Signal
    }
    Waited::TimedOut => {
      kill(&mut child).await;
      Exit::TimedOut
    }
    Waited::Cancelled => {
      kill(&mut child).await;
      Exit::Cancelled
    }
  };

  let elapsed = started.elapsed();
  release_readers(readers).await;

  let output = collector
    .await
    .unwrap_or_else(|_| OutputTail::new(tail_lines));

  Ok(ProcessOutcome {
    exit,
    elapsed,
    output,
  })
}

/// Kill and reap the child. A child that already exited is not an error.
async fn kill(child: &mut tokio::process::Child) {
  if let Err(e) = child.kill().await {
    debug!(error = %e, "kill failed, child likely already exited");
  }
}

/// Wait briefly for readers to reach EOF, then abort the stragglers.
async fn release_readers(readers: Vec<JoinHandle<()>>) {
  let abort_handles: Vec<_> = readers.iter().map(JoinHandle::abort_handle).collect();

  if tokio::time::timeout(READER_GRACE, futures::future::join_all(readers))
    .await
    .is_err()
  {
    debug!("output pipes still open after child exit, abandoning readers");
    for handle in abort_handles {
      handle.abort();
    }
  }
}

/// Forward a pipe line by line. Invalid UTF-8 is replaced, not fatal.
fn spawn_reader<R>(stream: Option<R>, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let Some(stream) = stream else {
      return;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
      buf.clear();
      match reader.read_until(b'\n', &mut buf).await {
        Ok(0) => break,
        Ok(_) => {
          let line = String::from_utf8_lossy(&buf);
          let line = line.trim_end_matches(['\n', '\r']).to_string();
          if tx.send(line).is_err() {
            break;
          }
        }
        Err(e) => {
          debug!(error = %e, "output read failed");
          break;
        }
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sh(script: &str, timeout: Duration) -> ProcessCommand {
    ProcessCommand {
      program: "sh".into(),
      args: vec!["-c".into(), script.into()],
      working_dir: PathBuf::from("."),
      env: vec![],
      timeout,
      tail_lines: 10,
    }
  }

  #[tokio::test]
  async fn test_exit_code_and_output() {
    let command = sh("echo out; echo err >&2; exit 3", Duration::from_secs(10));
    let outcome = run(&command, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.exit, Exit::Code(3));
    let lines: Vec<_> = outcome.output.lines().collect();
    assert!(lines.contains(&"out"));
    assert!(lines.contains(&"err"));
  }

  #[tokio::test]
  async fn test_timeout_kills_child() {
    let command = sh("exec sleep 10", Duration::from_millis(200));
    let outcome = run(&command, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.exit, Exit::TimedOut);
    assert!(outcome.elapsed >= Duration::from_millis(200));
    assert!(outcome.elapsed < Duration::from_secs(5));
  }

  #[tokio::test]
  async fn test_grandchild_holding_pipes_does_not_stall() {
    // sh is killed, its background sleep keeps stdout open.
    let command = sh("sleep 10 & sleep 10", Duration::from_millis(200));
    let started = Instant::now();
    let outcome = run(&command, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.exit, Exit::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));
  }

  #[tokio::test]
  async fn test_cancelled_before_exit() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let command = sh("exec sleep 10", Duration::from_secs(10));
    let outcome = run(&command, &cancel).await.unwrap();
    assert_eq!(outcome.exit, Exit::Cancelled);
  }

  #[tokio::test]
  async fn test_spawn_failure_is_an_error() {
    let command = ProcessCommand {
      program: "climada-kit-no-such-program".into(),
      ..sh("", Duration::from_secs(1))
    };
    let err = run(&command, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
  }
}
