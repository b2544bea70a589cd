use thiserror::Error;
use tracing::trace;

use crate::internal::*;

static END_OF_INPUT: Token = Token::eof();

/// Cursor over a fixed token sequence with a stack of saved positions
/// for backtracking.
///
/// Every `mark()` must be balanced by exactly one `restore()` or
/// `commit()`. The stream does not enforce the pairing itself, it only
/// reports an `Underflow` when there is nothing left to pop.
#[derive(Debug)]
pub struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
  marks: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
  #[error("restore or commit without a matching mark")]
  Underflow,
}

impl TokenStream {
  pub fn new(tokens: Vec<Token>) -> Self {
    TokenStream {
      tokens,
      pos: 0,
      marks: Vec::with_capacity(8),
    }
  }

  pub const fn position(&self) -> usize {
    self.pos
  }

  /// Number of marks not yet restored or committed.
  pub fn depth(&self) -> usize {
    self.marks.len()
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn is_at_end(&self) -> bool {
    self.pos >= self.len()
  }

  /// Returns the token under the cursor and advances past it. Once the
  /// cursor reaches the end, every call returns a synthetic `Eof` token
  /// and the cursor stays put.
  #[allow(clippy::should_implement_trait)]
  pub fn next(&mut self) -> &Token {
    if self.is_at_end() {
      return &END_OF_INPUT;
    }
    self.pos += 1;
    &self.tokens[self.pos - 1]
  }

  pub fn peek(&self) -> &Token {
    self.tokens.get(self.pos).unwrap_or(&END_OF_INPUT)
  }

  pub fn seek(&mut self, pos: usize) {
    self.pos = pos.min(self.len());
  }

  pub fn mark(&mut self) {
    self.marks.push(self.pos);
  }

  /// Pops the latest mark and moves the cursor to it, shifted forward by
  /// `offset` tokens.
  pub fn restore(&mut self, offset: usize) -> Result<(), StreamError> {
    let saved = self.marks.pop().ok_or(StreamError::Underflow)?;
    let target = saved.saturating_add(offset).min(self.len());
    if self.pos != target {
      trace!(from = self.pos, to = target, "rewinding");
    }
    self.pos = target;
    Ok(())
  }

  /// Drops the latest mark, keeping everything read since.
  pub fn commit(&mut self) -> Result<(), StreamError> {
    self.marks.pop().map(|_| ()).ok_or(StreamError::Underflow)
  }
}
