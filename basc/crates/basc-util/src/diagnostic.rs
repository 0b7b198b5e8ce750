//! Diagnostic collection.
//!
//! Compile errors never abort a stage: each stage records what it finds
//! on a shared [`Handler`] and runs to completion, so the user sees a
//! batch of diagnostics per run. The driver reads the counter at stage
//! boundaries and decides whether to continue.

use std::cell::RefCell;
use std::fmt;

use crate::Pos;

/// A single compile diagnostic, tied to a source line.
///
/// Expression-level diagnostics additionally carry the lexical position
/// of the offending token.
///
/// # Examples
///
/// ```
/// use basc_util::{Diagnostic, Pos};
///
/// let diag = Diagnostic::new(10, "Operand expected in expression.");
/// assert_eq!(format!("{}", diag), "ERROR in line 10 - Operand expected in expression.");
///
/// let diag = diag.with_pos(Pos::new(1, 12));
/// assert_eq!(
///     format!("{}", diag),
///     "ERROR in line 10 at 1:12 - Operand expected in expression."
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// BASIC line number the diagnostic belongs to.
    pub line_number: u32,
    /// Lexical position, present for expression-level diagnostics.
    pub pos: Option<Pos>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for a source line.
    pub fn new(line_number: u32, message: impl Into<String>) -> Self {
        Self {
            line_number,
            pos: None,
            message: message.into(),
        }
    }

    /// Attach a lexical position.
    pub fn with_pos(mut self, pos: Pos) -> Self {
        self.pos = Some(pos);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(
                f,
                "ERROR in line {} at {} - {}",
                self.line_number, pos, self.message
            ),
            None => write!(f, "ERROR in line {} - {}", self.line_number, self.message),
        }
    }
}

/// Accumulates diagnostics across a compilation.
///
/// Uses interior mutability so every stage can record errors through a
/// shared reference without threading `&mut` through the recursive
/// expression walks.
///
/// # Examples
///
/// ```
/// use basc_util::Handler;
///
/// let handler = Handler::new();
/// assert!(!handler.has_errors());
///
/// handler.error(10, "Invalid line number 99.");
/// assert_eq!(handler.error_count(), 1);
///
/// let batch = handler.drain();
/// assert_eq!(batch.len(), 1);
/// assert!(!handler.has_errors());
/// ```
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a source line.
    pub fn error(&self, line_number: u32, message: impl Into<String>) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::new(line_number, message));
    }

    /// Record an error for a source line at a lexical position.
    pub fn error_at(&self, line_number: u32, pos: Pos, message: impl Into<String>) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::new(line_number, message).with_pos(pos));
    }

    /// Number of errors recorded since the last [`Handler::drain`].
    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// True if any error has been recorded since the last drain.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Take the recorded diagnostics, resetting the counter.
    ///
    /// The driver calls this at each stage boundary to print the batch.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handler() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert!(handler.drain().is_empty());
    }

    #[test]
    fn test_error_accumulation() {
        let handler = Handler::new();
        handler.error(10, "first");
        handler.error(20, "second");
        assert_eq!(handler.error_count(), 2);

        let batch = handler.drain();
        assert_eq!(batch[0].line_number, 10);
        assert_eq!(batch[1].line_number, 20);
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn test_error_at_formats_position() {
        let handler = Handler::new();
        handler.error_at(30, Pos::new(3, 7), "Operand expected in expression.");
        let batch = handler.drain();
        assert_eq!(
            batch[0].to_string(),
            "ERROR in line 30 at 3:7 - Operand expected in expression."
        );
    }

    #[test]
    fn test_line_error_format() {
        let diag = Diagnostic::new(99, "Invalid line number 100.");
        assert_eq!(diag.to_string(), "ERROR in line 99 - Invalid line number 100.");
    }
}
