//! Library error types and worker-failure aggregation.

use std::fmt;

use thiserror::Error;

/// Errors produced by the library.
///
/// Runtime tree operations (insert, remove) report logical failure through
/// boolean results instead; only programmer-wrong inputs and worker-thread
/// failures surface here.
#[derive(Debug, Error)]
pub enum Error {
  /// A parameter failed construction-time validation.
  #[error("invalid argument: {0}")]
  InvalidArgument(&'static str),

  /// A cached result was requested in a state where it cannot be produced.
  #[error("invalid state: {0}")]
  InvalidState(String),

  /// One or more worker threads failed while executing submitted tasks.
  /// Carries the rendered [`ErrorList`] message.
  #[error("{0}")]
  Async(String),
}

/// Accumulates diagnostics from worker threads into a single message.
///
/// The first entry prepends a header line; each entry lands on its own line.
#[derive(Debug, Default)]
pub struct ErrorList {
  message: String,
}

impl ErrorList {
  const HEADER: &'static str = "error(s) raised on worker threads:";

  pub fn new() -> Self {
    Self::default()
  }

  /// Append one diagnostic line.
  pub fn push(&mut self, message: &str) {
    if self.message.is_empty() {
      self.message.push_str(Self::HEADER);
    }
    self.message.push('\n');
    self.message.push_str(message);
  }

  /// True until the first `push`.
  pub fn is_empty(&self) -> bool {
    self.message.is_empty()
  }

  /// The rendered message so far.
  pub fn message(&self) -> &str {
    &self.message
  }

  /// Consume the list into an [`Error::Async`].
  pub fn into_error(self) -> Error {
    Error::Async(self.message)
  }
}

impl fmt::Display for ErrorList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}
