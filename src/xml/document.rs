//! Tree storage with an id index, and the tree document wrapper.
//!
//! The index maps each element id to its node path (the child-index
//! route from the root). It is rebuilt by a full tree walk after every
//! structural mutation rather than patched incrementally, so index
//! coherence is a pure function of tree shape. Trees are small; the
//! O(n) walk is an accepted cost.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::history::{EditCommand, EditError, History};
use crate::text::document::LOG_DIRECTIVE;

use super::element::Element;
use super::parser::{self, XmlError};

/// Child-index route from the root; the root itself is the empty path.
pub type NodePath = Vec<usize>;

/// Id of the root element, fixed across sessions.
pub const ROOT_ID: &str = "root";

/// A single-rooted element tree plus its id index.
#[derive(Debug, Clone)]
pub struct XmlTree {
    root: Element,
    index: HashMap<String, NodePath>,
}

impl XmlTree {
    /// Creates a tree holding only the root element.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            root: Element::new(ROOT_ID, ROOT_ID),
            index: HashMap::new(),
        };
        tree.rebuild_index();
        tree
    }

    /// Builds a tree from a parsed root, verifying id uniqueness.
    pub fn from_root(root: Element) -> Result<Self, XmlError> {
        let mut tree = Self {
            root,
            index: HashMap::new(),
        };
        let mut seen = HashMap::new();
        walk(&tree.root, &mut Vec::new(), &mut |elem, path| {
            seen.insert(elem.id.clone(), path.to_vec())
                .map_or(Ok(()), |_| Err(XmlError::DuplicateId(elem.id.clone())))
        })?;
        tree.index = seen;
        Ok(tree)
    }

    /// Rebuilds the id index from the tree shape.
    ///
    /// Commands guarantee id uniqueness before mutating, so the walk
    /// never meets a duplicate here.
    pub fn rebuild_index(&mut self) {
        let mut index = HashMap::new();
        let _ = walk(&self.root, &mut Vec::new(), &mut |elem, path| {
            index.insert(elem.id.clone(), path.to_vec());
            Ok::<(), XmlError>(())
        });
        self.index = index;
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the id index.
    #[must_use]
    pub fn index(&self) -> &HashMap<String, NodePath> {
        &self.index
    }

    /// Returns true while an id is live in the index.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the node path for an id.
    #[must_use]
    pub fn path_of(&self, id: &str) -> Option<&NodePath> {
        self.index.get(id)
    }

    /// Resolves an element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index.get(id).and_then(|path| self.node_at(path))
    }

    /// Resolves a node by path.
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&Element> {
        let mut node = &self.root;
        for &idx in path {
            node = node.children.get(idx)?;
        }
        Some(node)
    }

    /// Resolves a node mutably by path.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut node = &mut self.root;
        for &idx in path {
            node = node.children.get_mut(idx)?;
        }
        Some(node)
    }

    /// Collects `(id, text)` pairs for every element carrying text.
    #[must_use]
    pub fn element_texts(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let _ = walk(&self.root, &mut Vec::new(), &mut |elem, _| {
            if let Some(text) = &elem.text {
                if !text.trim().is_empty() {
                    out.push((elem.id.clone(), text.clone()));
                }
            }
            Ok::<(), XmlError>(())
        });
        out
    }

    /// Serializes the tree with its declaration line.
    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
            self.root.to_xml()
        )
    }

    /// Renders the tree with box-drawing connectors for display.
    #[must_use]
    pub fn tree_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} [id=\"{}\"]", self.root.tag, self.root.id)];
        if let Some(text) = &self.root.text {
            let connector = if self.root.children.is_empty() {
                "└── "
            } else {
                "├── "
            };
            lines.push(format!("{connector}\"{text}\""));
        }
        render_children(&self.root, "", &mut lines);
        lines
    }
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

fn render_children(parent: &Element, prefix: &str, lines: &mut Vec<String>) {
    let count = parent.children.len();
    for (i, child) in parent.children.iter().enumerate() {
        let last = i == count - 1;
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!(
            "{prefix}{connector}{} [id=\"{}\"]",
            child.tag, child.id
        ));
        let extension = if last { "    " } else { "│   " };
        let child_prefix = format!("{prefix}{extension}");
        if let Some(text) = &child.text {
            let text_connector = if child.children.is_empty() {
                "└── "
            } else {
                "├── "
            };
            lines.push(format!("{child_prefix}{text_connector}\"{text}\""));
        }
        render_children(child, &child_prefix, lines);
    }
}

/// Depth-first walk calling `visit` with each element and its path.
fn walk<E>(
    elem: &Element,
    path: &mut Vec<usize>,
    visit: &mut impl FnMut(&Element, &[usize]) -> Result<(), E>,
) -> Result<(), E> {
    visit(elem, path)?;
    for (i, child) in elem.children.iter().enumerate() {
        path.push(i);
        walk(child, path, visit)?;
        path.pop();
    }
    Ok(())
}

/// A tree document: element tree, modified flag, and undo history.
pub struct XmlDocument {
    name: String,
    path: Option<PathBuf>,
    tree: XmlTree,
    modified: bool,
    history: History<XmlTree>,
    /// Logging directive stored outside the tree, re-attached on save.
    log_directive: Option<String>,
}

impl XmlDocument {
    /// Creates an empty document (root element only).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            tree: XmlTree::new(),
            modified: false,
            history: History::new(),
            log_directive: None,
        }
    }

    /// Parses a document from its persisted textual form.
    ///
    /// A first line carrying the logging directive sits above the XML
    /// declaration; it is split off and held out-of-band.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self, XmlError> {
        let (directive, body) = match text.lines().next() {
            Some(first) if first.trim_start().starts_with(LOG_DIRECTIVE) => {
                let rest = text.split_once('\n').map_or("", |(_, rest)| rest);
                (Some(first.to_string()), rest)
            }
            _ => (None, text),
        };
        let tree = if body.trim().is_empty() {
            XmlTree::new()
        } else {
            XmlTree::from_root(parser::parse(body)?)?
        };
        Ok(Self {
            name: name.into(),
            path: None,
            tree,
            modified: false,
            history: History::new(),
            log_directive: directive,
        })
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

    /// Returns the element tree.
    #[must_use]
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Returns the out-of-band logging directive.
    #[must_use]
    pub fn log_directive(&self) -> Option<&str> {
        self.log_directive.as_deref()
    }

    /// Installs the logging directive line (used by `init` templating).
    pub fn set_log_directive(&mut self, directive: Option<String>) {
        self.log_directive = directive;
    }

    /// Returns whole-file text for saving, directive line first.
    #[must_use]
    pub fn content(&self) -> String {
        match &self.log_directive {
            Some(directive) => format!("{directive}\n{}", self.tree.to_xml()),
            None => self.tree.to_xml(),
        }
    }

    /// Runs a command through the undo engine.
    ///
    /// Any successful execute marks the document modified.
    pub fn execute(&mut self, cmd: impl EditCommand<XmlTree> + 'static) -> Result<(), EditError> {
        self.history.execute(Box::new(cmd), &mut self.tree)?;
        self.modified = true;
        Ok(())
    }

    /// Undoes the most recent command; `false` when nothing to undo.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.tree);
        if undone {
            self.modified = true;
        }
        undone
    }

    /// Redoes the most recently undone command; `false` when nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.tree);
        if redone {
            self.modified = true;
        }
        redone
    }
}
