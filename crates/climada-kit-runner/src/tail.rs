//! Bounded buffer for the last lines of a process's output.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` lines and counts the ones it let go.
#[derive(Debug, Clone, Default)]
pub struct OutputTail {
  lines: VecDeque<String>,
  capacity: usize,
  dropped: usize,
}

impl OutputTail {
  pub fn new(capacity: usize) -> Self {
    Self {
      lines: VecDeque::with_capacity(capacity),
      capacity,
      dropped: 0,
    }
  }

  pub fn push(&mut self, line: impl Into<String>) {
    if self.capacity == 0 {
      self.dropped += 1;
      return;
    }
    if self.lines.len() == self.capacity {
      self.lines.pop_front();
      self.dropped += 1;
    }
    self.lines.push_back(line.into());
  }

  pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> {
    self.lines.iter().map(String::as_str)
  }

  /// Last non-blank line.
  pub fn last_line(&self) -> Option<&str> {
    self.lines().rev().map(str::trim).find(|l| !l.is_empty())
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Lines evicted to stay within capacity.
  pub fn dropped(&self) -> usize {
    self.dropped
  }

  /// The kept lines joined with newlines, with a marker if anything was cut.
  pub fn render(&self) -> String {
    let body = self.lines().collect::<Vec<_>>().join("\n");
    match (self.dropped, body.is_empty()) {
      (0, _) => body,
      (n, true) => format!("... ({} lines omitted)", n),
      (n, false) => format!("... ({} earlier lines omitted)\n{}", n, body),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_keeps_last_lines() {
    let mut tail = OutputTail::new(3);
    for i in 1..=5 {
      tail.push(format!("line {}", i));
    }

    assert_eq!(tail.lines().collect::<Vec<_>>(), ["line 3", "line 4", "line 5"]);
    assert_eq!(tail.dropped(), 2);
    assert_eq!(
      tail.render(),
      "... (2 earlier lines omitted)\nline 3\nline 4\nline 5"
    );
  }

  #[test]
  fn test_under_capacity_renders_plainly() {
    let mut tail = OutputTail::new(10);
    tail.push("only");
    assert_eq!(tail.render(), "only");
    assert_eq!(tail.dropped(), 0);
  }

  #[test]
  fn test_zero_capacity() {
    let mut tail = OutputTail::new(0);
    tail.push("a");
    tail.push("b");
    assert!(tail.is_empty());
    assert_eq!(tail.render(), "... (2 lines omitted)");
  }

  #[test]
  fn test_last_line_skips_blank() {
    let mut tail = OutputTail::new(4);
    tail.push("1.2.3");
    tail.push("   ");
    assert_eq!(tail.last_line(), Some("1.2.3"));
    assert_eq!(OutputTail::new(4).last_line(), None);
  }
}
