//! Reversible structural commands for tree documents.
//!
//! All commands address elements by id. Undo payloads record the
//! parent path and child index captured during execute; they stay
//! valid because the engine only ever undoes against the exact
//! post-execute tree. Every structural command rebuilds the id index
//! after mutating; text edits leave the index untouched.

use crate::history::{EditCommand, EditError};

use super::document::{NodePath, XmlTree};
use super::element::Element;

/// Splices a new element immediately before a target element.
#[derive(Debug, Clone)]
pub struct InsertBefore {
    tag: String,
    new_id: String,
    target_id: String,
    text: Option<String>,
    inserted_at: Option<(NodePath, usize)>,
}

impl InsertBefore {
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        new_id: impl Into<String>,
        target_id: impl Into<String>,
        text: Option<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            new_id: new_id.into(),
            target_id: target_id.into(),
            text,
            inserted_at: None,
        }
    }
}

impl EditCommand<XmlTree> for InsertBefore {
    fn execute(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        if doc.contains(&self.new_id) {
            return Err(EditError::IdInUse(self.new_id.clone()));
        }
        let target_path = doc
            .path_of(&self.target_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownId(self.target_id.clone()))?;
        let Some((&index, parent_path)) = target_path.split_last() else {
            // The root has no parent to insert relative to.
            return Err(EditError::RootProtected("inserted before"));
        };
        let element = Element::with_text(&*self.tag, &*self.new_id, self.text.clone());
        let parent = doc.node_at_mut(parent_path).ok_or(EditError::Corrupt)?;
        parent.children.insert(index, element);
        doc.rebuild_index();
        self.inserted_at = Some((parent_path.to_vec(), index));
        Ok(())
    }

    fn undo(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let (parent_path, index) = self.inserted_at.take().ok_or(EditError::Corrupt)?;
        let parent = doc.node_at_mut(&parent_path).ok_or(EditError::Corrupt)?;
        if parent.children.get(index).map(|c| c.id.as_str()) != Some(&self.new_id) {
            return Err(EditError::Corrupt);
        }
        parent.children.remove(index);
        doc.rebuild_index();
        Ok(())
    }
}

/// Appends a new element as the last child of a parent element.
#[derive(Debug, Clone)]
pub struct AppendChild {
    tag: String,
    new_id: String,
    parent_id: String,
    text: Option<String>,
    inserted_at: Option<(NodePath, usize)>,
}

impl AppendChild {
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        new_id: impl Into<String>,
        parent_id: impl Into<String>,
        text: Option<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            new_id: new_id.into(),
            parent_id: parent_id.into(),
            text,
            inserted_at: None,
        }
    }
}

impl EditCommand<XmlTree> for AppendChild {
    fn execute(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        if doc.contains(&self.new_id) {
            return Err(EditError::IdInUse(self.new_id.clone()));
        }
        let parent_path = doc
            .path_of(&self.parent_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownId(self.parent_id.clone()))?;
        let element = Element::with_text(&*self.tag, &*self.new_id, self.text.clone());
        let parent = doc.node_at_mut(&parent_path).ok_or(EditError::Corrupt)?;
        let index = parent.children.len();
        parent.children.push(element);
        doc.rebuild_index();
        self.inserted_at = Some((parent_path, index));
        Ok(())
    }

    fn undo(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let (parent_path, index) = self.inserted_at.take().ok_or(EditError::Corrupt)?;
        let parent = doc.node_at_mut(&parent_path).ok_or(EditError::Corrupt)?;
        if parent.children.get(index).map(|c| c.id.as_str()) != Some(&self.new_id) {
            return Err(EditError::Corrupt);
        }
        parent.children.remove(index);
        doc.rebuild_index();
        Ok(())
    }
}

/// Renames an element id.
///
/// The root id is immutable by policy, keeping the root identity
/// stable across sessions.
#[derive(Debug, Clone)]
pub struct EditId {
    old_id: String,
    new_id: String,
    path: Option<NodePath>,
}

impl EditId {
    #[must_use]
    pub fn new(old_id: impl Into<String>, new_id: impl Into<String>) -> Self {
        Self {
            old_id: old_id.into(),
            new_id: new_id.into(),
            path: None,
        }
    }
}

impl EditCommand<XmlTree> for EditId {
    fn execute(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let path = doc
            .path_of(&self.old_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownId(self.old_id.clone()))?;
        if doc.contains(&self.new_id) {
            return Err(EditError::IdInUse(self.new_id.clone()));
        }
        if path.is_empty() {
            return Err(EditError::RootProtected("renamed"));
        }
        let element = doc.node_at_mut(&path).ok_or(EditError::Corrupt)?;
        element.id = self.new_id.clone();
        doc.rebuild_index();
        self.path = Some(path);
        Ok(())
    }

    fn undo(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let path = self.path.take().ok_or(EditError::Corrupt)?;
        let element = doc.node_at_mut(&path).ok_or(EditError::Corrupt)?;
        if element.id != self.new_id {
            return Err(EditError::Corrupt);
        }
        element.id = self.old_id.clone();
        doc.rebuild_index();
        Ok(())
    }
}

/// Sets or clears an element's text payload.
#[derive(Debug, Clone)]
pub struct EditText {
    element_id: String,
    text: Option<String>,
    prior: Option<(NodePath, Option<String>)>,
}

impl EditText {
    #[must_use]
    pub fn new(element_id: impl Into<String>, text: Option<String>) -> Self {
        Self {
            element_id: element_id.into(),
            text: text.filter(|t| !t.is_empty()),
            prior: None,
        }
    }
}

impl EditCommand<XmlTree> for EditText {
    fn execute(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let path = doc
            .path_of(&self.element_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownId(self.element_id.clone()))?;
        let element = doc.node_at_mut(&path).ok_or(EditError::Corrupt)?;
        let prior = std::mem::replace(&mut element.text, self.text.clone());
        // "No text" is a valid prior state and must be restorable.
        self.prior = Some((path, prior));
        Ok(())
    }

    fn undo(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let (path, prior) = self.prior.take().ok_or(EditError::Corrupt)?;
        let element = doc.node_at_mut(&path).ok_or(EditError::Corrupt)?;
        element.text = prior;
        Ok(())
    }
}

/// Removes an element and its entire subtree.
///
/// The removed element carries its children with it, so undo restores
/// every nested id in one splice.
#[derive(Debug, Clone)]
pub struct DeleteElement {
    element_id: String,
    removed: Option<(NodePath, usize, Element)>,
}

impl DeleteElement {
    #[must_use]
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            removed: None,
        }
    }
}

impl EditCommand<XmlTree> for DeleteElement {
    fn execute(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let path = doc
            .path_of(&self.element_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownId(self.element_id.clone()))?;
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(EditError::RootProtected("deleted"));
        };
        let parent = doc.node_at_mut(parent_path).ok_or(EditError::Corrupt)?;
        let element = parent.children.remove(index);
        doc.rebuild_index();
        self.removed = Some((parent_path.to_vec(), index, element));
        Ok(())
    }

    fn undo(&mut self, doc: &mut XmlTree) -> Result<(), EditError> {
        let (parent_path, index, element) = self.removed.take().ok_or(EditError::Corrupt)?;
        let parent = doc.node_at_mut(&parent_path).ok_or(EditError::Corrupt)?;
        if index > parent.children.len() {
            return Err(EditError::Corrupt);
        }
        parent.children.insert(index, element);
        doc.rebuild_index();
        Ok(())
    }
}
