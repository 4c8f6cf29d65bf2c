//! Reversible edit commands for line documents.
//!
//! Each command touches exactly one line and snapshots that full line
//! as its undo payload. Subtracting the inserted text instead would be
//! unsafe once other edits move lines around, so undo always restores
//! the saved line verbatim.

use crate::history::{EditCommand, EditError};

use super::document::LineBuffer;

/// Appends a new final line.
#[derive(Debug, Clone)]
pub struct Append {
    text: String,
}

impl Append {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl EditCommand<LineBuffer> for Append {
    fn execute(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        doc.append_line(self.text.clone());
        Ok(())
    }

    fn undo(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        // An empty buffer here is a logic error, not a user error.
        doc.pop_line().map(|_| ()).ok_or(EditError::EmptyUndo)
    }
}

/// Splices text into a line at a 1-based column.
#[derive(Debug, Clone)]
pub struct Insert {
    line: usize,
    col: usize,
    text: String,
    saved: Option<String>,
}

impl Insert {
    #[must_use]
    pub fn new(line: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            col,
            text: text.into(),
            saved: None,
        }
    }
}

impl EditCommand<LineBuffer> for Insert {
    fn execute(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let original = doc
            .line(self.line)
            .ok_or(EditError::LineOutOfRange {
                line: self.line,
                count: doc.line_count(),
            })?
            .to_string();
        doc.insert_text(self.line, self.col, &self.text)?;
        self.saved = Some(original);
        Ok(())
    }

    fn undo(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let saved = self.saved.take().ok_or(EditError::Corrupt)?;
        doc.set_line(self.line, saved)
    }
}

/// Removes `len` characters starting at a 1-based column.
#[derive(Debug, Clone)]
pub struct Delete {
    line: usize,
    col: usize,
    len: usize,
    saved: Option<String>,
}

impl Delete {
    #[must_use]
    pub fn new(line: usize, col: usize, len: usize) -> Self {
        Self {
            line,
            col,
            len,
            saved: None,
        }
    }
}

impl EditCommand<LineBuffer> for Delete {
    fn execute(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let original = doc
            .line(self.line)
            .ok_or(EditError::LineOutOfRange {
                line: self.line,
                count: doc.line_count(),
            })?
            .to_string();
        doc.delete_span(self.line, self.col, self.len)?;
        self.saved = Some(original);
        Ok(())
    }

    fn undo(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let saved = self.saved.take().ok_or(EditError::Corrupt)?;
        doc.set_line(self.line, saved)
    }
}

/// Deletes `len` characters at a column and inserts new text at the
/// same position, atomically.
#[derive(Debug, Clone)]
pub struct Replace {
    line: usize,
    col: usize,
    len: usize,
    text: String,
    saved: Option<String>,
}

impl Replace {
    #[must_use]
    pub fn new(line: usize, col: usize, len: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            col,
            len,
            text: text.into(),
            saved: None,
        }
    }
}

impl EditCommand<LineBuffer> for Replace {
    fn execute(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let original = doc
            .line(self.line)
            .ok_or(EditError::LineOutOfRange {
                line: self.line,
                count: doc.line_count(),
            })?
            .to_string();
        doc.replace_span(self.line, self.col, self.len, &self.text)?;
        self.saved = Some(original);
        Ok(())
    }

    fn undo(&mut self, doc: &mut LineBuffer) -> Result<(), EditError> {
        let saved = self.saved.take().ok_or(EditError::Corrupt)?;
        doc.set_line(self.line, saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_text(&lines.join("\n"))
    }

    #[test]
    fn test_append_and_undo() {
        let mut buf = buffer(&["one"]);
        let mut history = History::new();

        history
            .execute(Box::new(Append::new("two")), &mut buf)
            .unwrap();
        assert_eq!(buf.lines(), &["one", "two"]);

        assert!(history.undo(&mut buf));
        assert_eq!(buf.lines(), &["one"]);
    }

    #[test]
    fn test_append_undo_on_empty_buffer_fails_safely() {
        let mut buf = LineBuffer::new();
        let mut cmd = Append::new("x");
        assert_eq!(cmd.undo(&mut buf), Err(EditError::EmptyUndo));
    }

    #[test]
    fn test_insert_scenario_hello_python_world() {
        let mut buf = buffer(&["Hello World"]);
        let mut history = History::new();

        history
            .execute(Box::new(Insert::new(1, 6, " Python")), &mut buf)
            .unwrap();
        assert_eq!(buf.line(1), Some("Hello Python World"));

        assert!(history.undo(&mut buf));
        assert_eq!(buf.line(1), Some("Hello World"));

        assert!(history.redo(&mut buf));
        assert_eq!(buf.line(1), Some("Hello Python World"));
    }

    #[test]
    fn test_insert_boundary_columns() {
        let mut buf = buffer(&["Hello"]);

        // Column line_length + 1 succeeds (append within line).
        assert!(Insert::new(1, 6, "!").execute(&mut buf).is_ok());
        assert_eq!(buf.line(1), Some("Hello!"));

        // Column line_length + 2 fails and changes nothing.
        let err = Insert::new(1, 8, "!").execute(&mut buf);
        assert_eq!(err, Err(EditError::ColumnOutOfRange { line: 1, col: 8 }));
        assert_eq!(buf.line(1), Some("Hello!"));
    }

    #[test]
    fn test_delete_scenario() {
        let mut buf = buffer(&["Hello Python World"]);
        let mut history = History::new();

        history
            .execute(Box::new(Delete::new(1, 6, 7)), &mut buf)
            .unwrap();
        assert_eq!(buf.line(1), Some("Hello World"));

        assert!(history.undo(&mut buf));
        assert_eq!(buf.line(1), Some("Hello Python World"));
    }

    #[test]
    fn test_delete_span_past_end_leaves_state() {
        let mut buf = buffer(&["short"]);
        let err = Delete::new(1, 3, 10).execute(&mut buf);
        assert_eq!(
            err,
            Err(EditError::SpanOutOfRange {
                line: 1,
                col: 3,
                len: 10
            })
        );
        assert_eq!(buf.line(1), Some("short"));
    }

    #[test]
    fn test_replace_and_undo() {
        let mut buf = buffer(&["This is line 2"]);
        let mut history = History::new();

        history
            .execute(Box::new(Replace::new(1, 9, 4, "Code")), &mut buf)
            .unwrap();
        assert_eq!(buf.line(1), Some("This is Code 2"));

        assert!(history.undo(&mut buf));
        assert_eq!(buf.line(1), Some("This is line 2"));

        assert!(history.redo(&mut buf));
        assert_eq!(buf.line(1), Some("This is Code 2"));
    }

    #[test]
    fn test_undo_restores_exact_line_sequence() {
        let before = buffer(&["Hello World", "second"]);
        let mut buf = before.clone();
        let mut history = History::new();

        history
            .execute(Box::new(Insert::new(1, 6, " Python")), &mut buf)
            .unwrap();
        history
            .execute(Box::new(Replace::new(2, 1, 6, "2nd")), &mut buf)
            .unwrap();
        history
            .execute(Box::new(Append::new("third")), &mut buf)
            .unwrap();

        assert!(history.undo(&mut buf));
        assert!(history.undo(&mut buf));
        assert!(history.undo(&mut buf));
        assert_eq!(buf, before);
    }
}
