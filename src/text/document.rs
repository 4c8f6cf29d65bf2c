//! Line buffer storage and the line document wrapper.
//!
//! Lines are stored without terminators. The public coordinate system
//! is 1-based for both lines and columns; columns count characters,
//! not bytes. Internal storage is 0-based.

use std::path::{Path, PathBuf};

use crate::history::{EditCommand, EditError, History};

/// Marker for the first-line logging directive.
pub const LOG_DIRECTIVE: &str = "# log";

/// Ordered sequence of text lines with bounds-checked primitives.
///
/// All mutating primitives validate before touching the buffer, so a
/// failed call leaves the content byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Creates a buffer from whole-file text, splitting on line breaks.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns a line by 1-based number.
    #[must_use]
    pub fn line(&self, line_no: usize) -> Option<&str> {
        if line_no == 0 {
            return None;
        }
        self.lines.get(line_no - 1).map(String::as_str)
    }

    /// Returns all lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins the lines back into whole-file text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Appends a new final line.
    pub fn append_line(&mut self, text: String) {
        self.lines.push(text);
    }

    /// Removes and returns the last line.
    pub fn pop_line(&mut self) -> Option<String> {
        self.lines.pop()
    }

    /// Overwrites a line wholesale (used by undo restoration).
    pub fn set_line(&mut self, line_no: usize, text: String) -> Result<(), EditError> {
        let count = self.line_count();
        if line_no == 0 || line_no > count {
            return Err(EditError::LineOutOfRange {
                line: line_no,
                count,
            });
        }
        self.lines[line_no - 1] = text;
        Ok(())
    }

    /// Splices `text` into a line at a 1-based character column.
    ///
    /// Column may equal `line_length + 1` to append at the end of the
    /// line; anything past that is rejected.
    pub fn insert_text(&mut self, line_no: usize, col: usize, text: &str) -> Result<(), EditError> {
        let count = self.line_count();
        let line = self
            .line(line_no)
            .ok_or(EditError::LineOutOfRange {
                line: line_no,
                count,
            })?;
        let byte = column_byte(line, line_no, col)?;
        self.lines[line_no - 1].insert_str(byte, text);
        Ok(())
    }

    /// Removes `len` characters starting at a 1-based column.
    pub fn delete_span(&mut self, line_no: usize, col: usize, len: usize) -> Result<(), EditError> {
        self.splice_span(line_no, col, len, "")
    }

    /// Removes `len` characters at a 1-based column, then inserts
    /// `text` at the same position, in one atomic step.
    pub fn replace_span(
        &mut self,
        line_no: usize,
        col: usize,
        len: usize,
        text: &str,
    ) -> Result<(), EditError> {
        self.splice_span(line_no, col, len, text)
    }

    fn splice_span(
        &mut self,
        line_no: usize,
        col: usize,
        len: usize,
        text: &str,
    ) -> Result<(), EditError> {
        let count = self.line_count();
        let line = self
            .line(line_no)
            .ok_or(EditError::LineOutOfRange {
                line: line_no,
                count,
            })?;
        let start = column_byte(line, line_no, col)?;
        let chars = line.chars().count();
        if col - 1 + len > chars {
            return Err(EditError::SpanOutOfRange {
                line: line_no,
                col,
                len,
            });
        }
        let end = start
            + line[start..]
                .char_indices()
                .nth(len)
                .map_or(line.len() - start, |(i, _)| i);
        self.lines[line_no - 1].replace_range(start..end, text);
        Ok(())
    }
}

/// Converts a 1-based character column into a byte offset, accepting
/// `char_count + 1` as the append position.
fn column_byte(line: &str, line_no: usize, col: usize) -> Result<usize, EditError> {
    if col == 0 {
        return Err(EditError::ColumnOutOfRange { line: line_no, col });
    }
    let mut remaining = col - 1;
    for (byte, _) in line.char_indices() {
        if remaining == 0 {
            return Ok(byte);
        }
        remaining -= 1;
    }
    if remaining == 0 {
        Ok(line.len())
    } else {
        Err(EditError::ColumnOutOfRange { line: line_no, col })
    }
}

/// A line-text document: buffer, modified flag, and undo history.
pub struct LineDocument {
    name: String,
    path: Option<PathBuf>,
    buffer: LineBuffer,
    modified: bool,
    history: History<LineBuffer>,
}

impl LineDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            buffer: LineBuffer::new(),
            modified: false,
            history: History::new(),
        }
    }

    /// Creates a document from whole-file text.
    #[must_use]
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            path: None,
            buffer: LineBuffer::from_text(text),
            modified: false,
            history: History::new(),
        }
    }

    /// Returns the document name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the on-disk path, if the document has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Assigns the on-disk path.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Returns true if the document has unsaved changes.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Forces the modified flag (snapshot restore, save).
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Returns the line buffer.
    #[must_use]
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Returns all lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    /// Returns whole-file text for saving.
    #[must_use]
    pub fn content(&self) -> String {
        self.buffer.to_text()
    }

    /// Returns the first-line logging directive, if present.
    #[must_use]
    pub fn log_directive(&self) -> Option<&str> {
        self.buffer
            .lines()
            .first()
            .map(String::as_str)
            .filter(|l| l.trim_start().starts_with(LOG_DIRECTIVE))
    }

    /// Runs a command through the undo engine.
    ///
    /// Any successful execute marks the document modified.
    pub fn execute(
        &mut self,
        cmd: impl EditCommand<LineBuffer> + 'static,
    ) -> Result<(), EditError> {
        self.history.execute(Box::new(cmd), &mut self.buffer)?;
        self.modified = true;
        Ok(())
    }

    /// Undoes the most recent command; `false` when nothing to undo.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.buffer);
        if undone {
            self.modified = true;
        }
        undone
    }

    /// Redoes the most recently undone command; `false` when nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.buffer);
        if redone {
            self.modified = true;
        }
        redone
    }

    /// Returns a numbered view of a 1-based line range.
    ///
    /// `end` of `None` means "to the last line"; out-of-range bounds
    /// are clamped.
    #[must_use]
    pub fn view(&self, start: usize, end: Option<usize>) -> Vec<String> {
        let total = self.buffer.line_count();
        let start_idx = start.max(1) - 1;
        let end_idx = end.map_or(total, |e| e.min(total));
        if start_idx >= end_idx {
            return Vec::new();
        }
        self.buffer.lines()[start_idx..end_idx]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}: {}", start_idx + i + 1, line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Insert;

    #[test]
    fn test_from_text_strips_terminators() {
        let buffer = LineBuffer::from_text("one\ntwo\nthree\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(1), Some("one"));
        assert_eq!(buffer.line(3), Some("three"));
        assert_eq!(buffer.line(4), None);
        assert_eq!(buffer.line(0), None);
    }

    #[test]
    fn test_to_text_round_trip() {
        let buffer = LineBuffer::from_text("a\nb");
        assert_eq!(buffer.to_text(), "a\nb");
    }

    #[test]
    fn test_insert_text_bounds() {
        let mut buffer = LineBuffer::from_text("Hello");
        // Column line_length + 1 appends within the line.
        assert!(buffer.insert_text(1, 6, "!").is_ok());
        assert_eq!(buffer.line(1), Some("Hello!"));
        // One past that fails.
        assert_eq!(
            buffer.insert_text(1, 8, "x"),
            Err(EditError::ColumnOutOfRange { line: 1, col: 8 })
        );
        assert_eq!(
            buffer.insert_text(2, 1, "x"),
            Err(EditError::LineOutOfRange { line: 2, count: 1 })
        );
    }

    #[test]
    fn test_delete_span_bounds() {
        let mut buffer = LineBuffer::from_text("Hello World");
        assert_eq!(
            buffer.delete_span(1, 6, 7),
            Err(EditError::SpanOutOfRange {
                line: 1,
                col: 6,
                len: 7
            })
        );
        assert_eq!(buffer.line(1), Some("Hello World"));
        assert!(buffer.delete_span(1, 6, 6).is_ok());
        assert_eq!(buffer.line(1), Some("Hello"));
    }

    #[test]
    fn test_replace_span_is_atomic() {
        let mut buffer = LineBuffer::from_text("This is line 2");
        assert!(buffer.replace_span(1, 9, 4, "Code").is_ok());
        assert_eq!(buffer.line(1), Some("This is Code 2"));
    }

    #[test]
    fn test_multibyte_columns_count_characters() {
        let mut buffer = LineBuffer::from_text("héllo");
        assert!(buffer.insert_text(1, 6, "!").is_ok());
        assert_eq!(buffer.line(1), Some("héllo!"));
        assert!(buffer.delete_span(1, 2, 1).is_ok());
        assert_eq!(buffer.line(1), Some("hllo!"));
    }

    #[test]
    fn test_document_modified_on_execute_undo_redo() {
        let mut doc = LineDocument::from_text("a.txt", "Hello World");
        assert!(!doc.is_modified());

        doc.execute(Insert::new(1, 6, " Python")).unwrap();
        assert!(doc.is_modified());

        doc.set_modified(false);
        assert!(doc.undo());
        assert!(doc.is_modified());

        doc.set_modified(false);
        assert!(doc.redo());
        assert!(doc.is_modified());
    }

    #[test]
    fn test_log_directive_detection() {
        let doc = LineDocument::from_text("a.txt", "# log -e append\nbody");
        assert_eq!(doc.log_directive(), Some("# log -e append"));

        let plain = LineDocument::from_text("b.txt", "body");
        assert_eq!(plain.log_directive(), None);
    }

    #[test]
    fn test_view_numbers_and_clamps() {
        let doc = LineDocument::from_text("a.txt", "one\ntwo\nthree");
        assert_eq!(doc.view(1, None), vec!["1: one", "2: two", "3: three"]);
        assert_eq!(doc.view(2, Some(10)), vec!["2: two", "3: three"]);
        assert!(doc.view(4, Some(2)).is_empty());
    }
}
