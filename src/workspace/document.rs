//! Polymorphism over the two document kinds.
//!
//! A tagged enum rather than trait objects: callers dispatch on
//! capability accessors (`lines`, `element_texts`) instead of
//! inspecting types.

use std::path::{Path, PathBuf};

use crate::text::LineDocument;
use crate::xml::XmlDocument;

/// An open document: either a line-text buffer or an element tree.
pub enum Document {
    Text(LineDocument),
    Xml(XmlDocument),
}

impl Document {
    /// Returns the document name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text(doc) => doc.name(),
            Self::Xml(doc) => doc.name(),
        }
    }

    /// Returns the on-disk path, if assigned.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Text(doc) => doc.path(),
            Self::Xml(doc) => doc.path(),
        }
    }

    /// Assigns the on-disk path.
    pub fn set_path(&mut self, path: PathBuf) {
        match self {
            Self::Text(doc) => doc.set_path(path),
            Self::Xml(doc) => doc.set_path(path),
        }
    }

    /// Returns true if the document has unsaved changes.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        match self {
            Self::Text(doc) => doc.is_modified(),
            Self::Xml(doc) => doc.is_modified(),
        }
    }

    /// Forces the modified flag.
    pub fn set_modified(&mut self, modified: bool) {
        match self {
            Self::Text(doc) => doc.set_modified(modified),
            Self::Xml(doc) => doc.set_modified(modified),
        }
    }

    /// Returns whole-file text for saving.
    #[must_use]
    pub fn content(&self) -> String {
        match self {
            Self::Text(doc) => doc.content(),
            Self::Xml(doc) => doc.content(),
        }
    }

    /// Returns the first-line logging directive, if present.
    #[must_use]
    pub fn log_directive(&self) -> Option<&str> {
        match self {
            Self::Text(doc) => doc.log_directive(),
            Self::Xml(doc) => doc.log_directive(),
        }
    }

    /// Undoes the most recent command; `false` when nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self {
            Self::Text(doc) => doc.undo(),
            Self::Xml(doc) => doc.undo(),
        }
    }

    /// Redoes the most recently undone command; `false` when nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        match self {
            Self::Text(doc) => doc.redo(),
            Self::Xml(doc) => doc.redo(),
        }
    }

    /// Capability accessor: the line sequence of a line document.
    #[must_use]
    pub fn lines(&self) -> Option<&[String]> {
        match self {
            Self::Text(doc) => Some(doc.lines()),
            Self::Xml(_) => None,
        }
    }

    /// Capability accessor: `(id, text)` spans of a tree document.
    #[must_use]
    pub fn element_texts(&self) -> Option<Vec<(String, String)>> {
        match self {
            Self::Text(_) => None,
            Self::Xml(doc) => Some(doc.tree().element_texts()),
        }
    }

    /// Returns the line document, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&LineDocument> {
        match self {
            Self::Text(doc) => Some(doc),
            Self::Xml(_) => None,
        }
    }

    /// Returns the line document mutably, if this is one.
    pub fn as_text_mut(&mut self) -> Option<&mut LineDocument> {
        match self {
            Self::Text(doc) => Some(doc),
            Self::Xml(_) => None,
        }
    }

    /// Returns the tree document, if this is one.
    #[must_use]
    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Text(_) => None,
            Self::Xml(doc) => Some(doc),
        }
    }

    /// Returns the tree document mutably, if this is one.
    pub fn as_xml_mut(&mut self) -> Option<&mut XmlDocument> {
        match self {
            Self::Text(_) => None,
            Self::Xml(doc) => Some(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_accessors() {
        let text = Document::Text(LineDocument::from_text("a.txt", "one\ntwo"));
        assert!(text.lines().is_some());
        assert!(text.element_texts().is_none());
        assert!(text.as_text().is_some());
        assert!(text.as_xml().is_none());

        let xml = Document::Xml(XmlDocument::new("a.xml"));
        assert!(xml.lines().is_none());
        assert_eq!(xml.element_texts(), Some(Vec::new()));
        assert!(xml.as_xml().is_some());
    }
}
