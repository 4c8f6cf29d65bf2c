//! Multi-document workspace.
//!
//! The workspace is the registry of open documents and the single place
//! session events originate. It owns its observers directly (a command
//! logger and an activity statistics tracker) and fans every [`Event`]
//! out to both; observers never reach back into the workspace.

pub mod document;
pub mod event;

pub use document::Document;
pub use event::{Event, Observer};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::history::EditError;
use crate::observer::{CommandLogger, Statistics};
use crate::observer::statistics::format_duration;
use crate::session::{FileState, SnapshotStore, WorkspaceSnapshot};
use crate::text::document::LOG_DIRECTIVE;
use crate::text::LineDocument;
use crate::xml::{XmlDocument, XmlError};

/// Errors from workspace-level operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Named document is not open.
    #[error("file '{0}' is not open")]
    NotOpen(String),
    /// Named document is already open.
    #[error("file '{0}' is already open")]
    AlreadyOpen(String),
    /// An operation needed an active document and none is set.
    #[error("no active file")]
    NoActiveDocument,
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// XML parse failure while loading a tree document.
    #[error("xml error: {0}")]
    Xml(#[from] XmlError),
    /// Edit command failure surfaced through the workspace.
    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// Outcome of prompting about a modified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    /// Write the document to disk before proceeding.
    Save,
    /// Drop unsaved changes.
    Discard,
}

/// Policy deciding what to do with a modified document on close/exit.
///
/// Injected so the core stays testable; the binary supplies a stdin
/// prompt, tests supply scripted answers.
pub trait ClosePrompt {
    /// Decides the fate of the named modified document.
    fn decide(&mut self, name: &str) -> SaveChoice;
}

/// Registry of open documents plus session observers.
pub struct Workspace {
    documents: HashMap<String, Document>,
    active: Option<String>,
    /// Open names in activation order; last entry is the fallback
    /// active document after a close.
    recent: Vec<String>,
    root: PathBuf,
    logger: Option<CommandLogger>,
    statistics: Option<Statistics>,
}

impl Workspace {
    /// Creates a workspace rooted at `root` with both observers attached.
    ///
    /// Command logs are written into `root` as `.{basename}.log` files.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let logger = CommandLogger::with_dir(&root);
        Self {
            documents: HashMap::new(),
            active: None,
            recent: Vec::new(),
            logger: Some(logger),
            statistics: Some(Statistics::new()),
            root,
        }
    }

    /// Returns the workspace root directory.
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Returns the active document name, if any.
    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Returns the active document.
    #[must_use]
    pub fn active_document(&self) -> Option<&Document> {
        self.active.as_ref().and_then(|n| self.documents.get(n))
    }

    /// Returns the active document mutably.
    pub fn active_document_mut(&mut self) -> Option<&mut Document> {
        match &self.active {
            Some(name) => self.documents.get_mut(name),
            None => None,
        }
    }

    /// Returns an open document by name.
    #[must_use]
    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    /// Returns whether the named document is open.
    #[must_use]
    pub fn is_open(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Returns open document names in activation order.
    #[must_use]
    pub fn open_names(&self) -> &[String] {
        &self.recent
    }

    /// Returns the command logger, if attached.
    #[must_use]
    pub fn logger(&self) -> Option<&CommandLogger> {
        self.logger.as_ref()
    }

    /// Returns the statistics tracker, if attached.
    #[must_use]
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    fn emit(&mut self, event: Event) {
        if let Some(logger) = &mut self.logger {
            logger.notify(&event);
        }
        if let Some(statistics) = &mut self.statistics {
            statistics.notify(&event);
        }
    }

    /// Emits a `command` event for the active document.
    ///
    /// Called after each successfully executed user command so the
    /// logger can append it to the document's log.
    pub fn record_command(&mut self, command_str: &str) {
        if let Some(name) = self.active.clone() {
            self.emit(Event::Command {
                name,
                command_str: command_str.to_string(),
            });
        }
    }

    fn resolve(&self, name: Option<&str>) -> Result<String, WorkspaceError> {
        match name {
            Some(n) => {
                if self.documents.contains_key(n) {
                    Ok(n.to_string())
                } else {
                    Err(WorkspaceError::NotOpen(n.to_string()))
                }
            }
            None => self
                .active
                .clone()
                .ok_or(WorkspaceError::NoActiveDocument),
        }
    }

    /// Opens a document from disk and makes it active.
    ///
    /// A missing file opens as an empty document of the kind implied by
    /// the extension (`.xml` for tree documents). Emits `active_stop`
    /// for the previous document, `active_start`, `auto_log_enable`
    /// when the first line carries the `# log` directive, then the
    /// `load` command event.
    ///
    /// # Errors
    ///
    /// Fails if the name is already open, the file cannot be read, or
    /// an `.xml` file does not parse.
    pub fn open(&mut self, name: &str) -> Result<(), WorkspaceError> {
        if self.documents.contains_key(name) {
            return Err(WorkspaceError::AlreadyOpen(name.to_string()));
        }
        let path = self.root.join(name);
        let content = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };
        let mut doc = if name.ends_with(".xml") {
            Document::Xml(XmlDocument::from_text(name, &content)?)
        } else {
            Document::Text(LineDocument::from_text(name, &content))
        };
        doc.set_path(path);
        let directive = doc.log_directive().map(str::to_string);
        self.activate_new(name, doc, directive, format!("load {name}"));
        Ok(())
    }

    /// Creates a fresh document, optionally templated with the `# log`
    /// directive, and makes it active. Nothing is written to disk until
    /// the first save; the document starts modified.
    ///
    /// # Errors
    ///
    /// Fails if the name is already open.
    pub fn init(&mut self, name: &str, with_log: bool) -> Result<(), WorkspaceError> {
        if self.documents.contains_key(name) {
            return Err(WorkspaceError::AlreadyOpen(name.to_string()));
        }
        let mut doc = if name.ends_with(".xml") {
            let mut xml = XmlDocument::new(name);
            if with_log {
                xml.set_log_directive(Some(LOG_DIRECTIVE.to_string()));
            }
            Document::Xml(xml)
        } else {
            let text = if with_log { LOG_DIRECTIVE } else { "" };
            Document::Text(LineDocument::from_text(name, text))
        };
        doc.set_path(self.root.join(name));
        doc.set_modified(true);
        let directive = doc.log_directive().map(str::to_string);
        self.activate_new(name, doc, directive, format!("init {name}"));
        Ok(())
    }

    fn activate_new(
        &mut self,
        name: &str,
        doc: Document,
        directive: Option<String>,
        command_str: String,
    ) {
        if let Some(prev) = self.active.clone() {
            self.emit(Event::ActiveStop { name: prev });
        }
        self.documents.insert(name.to_string(), doc);
        self.recent.push(name.to_string());
        self.active = Some(name.to_string());
        self.emit(Event::ActiveStart {
            name: name.to_string(),
        });
        if directive.is_some() {
            self.emit(Event::AutoLogEnable {
                name: name.to_string(),
                directive,
            });
        }
        self.emit(Event::Command {
            name: name.to_string(),
            command_str,
        });
    }

    /// Makes an already-open document active.
    ///
    /// # Errors
    ///
    /// Fails if the name is not open.
    pub fn switch(&mut self, name: &str) -> Result<(), WorkspaceError> {
        if !self.documents.contains_key(name) {
            return Err(WorkspaceError::NotOpen(name.to_string()));
        }
        if self.active.as_deref() != Some(name) {
            if let Some(prev) = self.active.clone() {
                self.emit(Event::ActiveStop { name: prev });
            }
            self.recent.retain(|n| n != name);
            self.recent.push(name.to_string());
            self.active = Some(name.to_string());
            self.emit(Event::ActiveStart {
                name: name.to_string(),
            });
        }
        self.emit(Event::Command {
            name: name.to_string(),
            command_str: format!("edit {name}"),
        });
        Ok(())
    }

    /// Saves one document to its path, clearing the modified flag.
    ///
    /// # Errors
    ///
    /// Fails if the name is not open or the write fails.
    pub fn save_one(&mut self, name: &str) -> Result<(), WorkspaceError> {
        let doc = self
            .documents
            .get_mut(name)
            .ok_or_else(|| WorkspaceError::NotOpen(name.to_string()))?;
        let path = match doc.path() {
            Some(p) => p.to_path_buf(),
            None => {
                let p = self.root.join(name);
                doc.set_path(p.clone());
                p
            }
        };
        fs::write(&path, doc.content())?;
        doc.set_modified(false);
        self.emit(Event::Command {
            name: name.to_string(),
            command_str: format!("save {name}"),
        });
        Ok(())
    }

    /// Saves the active document.
    ///
    /// # Errors
    ///
    /// Fails if no document is active or the write fails.
    pub fn save_active(&mut self) -> Result<(), WorkspaceError> {
        let name = self
            .active
            .clone()
            .ok_or(WorkspaceError::NoActiveDocument)?;
        self.save_one(&name)
    }

    /// Saves every open document. Failures are independent; each is
    /// reported and the rest still save.
    pub fn save_all(&mut self) -> Vec<(String, WorkspaceError)> {
        let names = self.recent.clone();
        let mut failures = Vec::new();
        for name in names {
            if let Err(e) = self.save_one(&name) {
                tracing::warn!("failed to save '{name}': {e}");
                failures.push((name, e));
            }
        }
        failures
    }

    /// Closes a document (the active one when `name` is `None`).
    ///
    /// A modified document is routed through `prompt`; `Save` writes it
    /// first, `Discard` drops the changes. Discarding a document that
    /// was never saved to disk also deletes its command log. When the
    /// active document closes, the most recently activated remaining
    /// document becomes active.
    ///
    /// # Errors
    ///
    /// Fails if the target is not open, or a requested save fails.
    pub fn close(
        &mut self,
        name: Option<&str>,
        prompt: &mut dyn ClosePrompt,
    ) -> Result<(), WorkspaceError> {
        let target = self.resolve(name)?;
        if self.documents[&target].is_modified() {
            match prompt.decide(&target) {
                SaveChoice::Save => self.save_one(&target)?,
                SaveChoice::Discard => {}
            }
        }
        self.remove(&target);
        Ok(())
    }

    fn remove(&mut self, target: &str) {
        let Some(doc) = self.documents.remove(target) else {
            return;
        };
        let on_disk = doc.path().is_some_and(|p| p.exists());
        if !on_disk {
            if let Some(logger) = &mut self.logger {
                logger.delete_log_file(target);
                logger.disable(target);
            }
        }
        self.recent.retain(|n| n != target);
        let was_active = self.active.as_deref() == Some(target);
        if was_active {
            self.emit(Event::ActiveStop {
                name: target.to_string(),
            });
        }
        self.emit(Event::Close {
            name: target.to_string(),
        });
        if was_active {
            self.active = self.recent.last().cloned();
            if let Some(next) = self.active.clone() {
                self.emit(Event::ActiveStart { name: next });
            }
        }
    }

    /// Enables command logging for a document without writing a session
    /// header (the header belongs to directive-driven enablement).
    ///
    /// # Errors
    ///
    /// Fails if the target is not open.
    pub fn log_on(&mut self, name: Option<&str>) -> Result<(), WorkspaceError> {
        let target = self.resolve(name)?;
        self.emit(Event::LogOn { name: target });
        Ok(())
    }

    /// Disables command logging for a document.
    ///
    /// # Errors
    ///
    /// Fails if the target is not open.
    pub fn log_off(&mut self, name: Option<&str>) -> Result<(), WorkspaceError> {
        let target = self.resolve(name)?;
        self.emit(Event::LogOff { name: target });
        Ok(())
    }

    /// Reads the command log of a document.
    ///
    /// # Errors
    ///
    /// Fails if the target is not open or the log cannot be read.
    pub fn read_log(&self, name: Option<&str>) -> Result<String, WorkspaceError> {
        let target = self.resolve(name)?;
        match &self.logger {
            Some(logger) => Ok(logger.read_log(&target)?),
            None => Ok(String::new()),
        }
    }

    /// Captures the restorable state: open files in activation order
    /// with modified flags, the active name, and the logging-enabled
    /// set (queried from the logger, never duplicated here).
    #[must_use]
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            active: self.active.clone(),
            files: self
                .recent
                .iter()
                .map(|name| FileState {
                    name: name.clone(),
                    modified: self.documents[name].is_modified(),
                })
                .collect(),
            logged_files: self
                .logger
                .as_ref()
                .map(CommandLogger::enabled_files)
                .unwrap_or_default(),
        }
    }

    /// Rebuilds workspace state from a snapshot.
    ///
    /// Each file is re-opened through the normal load path, then
    /// modified flags are forced, then logging is re-enabled, then the
    /// active pointer is set. A file that fails to reload is reported
    /// and skipped.
    pub fn restore(&mut self, snapshot: &WorkspaceSnapshot) {
        for state in &snapshot.files {
            if let Err(e) = self.open(&state.name) {
                tracing::warn!("could not restore '{}': {e}", state.name);
            }
        }
        for state in &snapshot.files {
            if let Some(doc) = self.documents.get_mut(&state.name) {
                doc.set_modified(state.modified);
            }
        }
        for name in &snapshot.logged_files {
            if self.documents.contains_key(name) {
                self.emit(Event::LogOn { name: name.clone() });
            }
        }
        if let Some(target) = snapshot.active.clone() {
            if self.documents.contains_key(&target) && self.active.as_deref() != Some(&*target) {
                if let Some(prev) = self.active.clone() {
                    self.emit(Event::ActiveStop { name: prev });
                }
                self.recent.retain(|n| n != &target);
                self.recent.push(target.clone());
                self.active = Some(target.clone());
                self.emit(Event::ActiveStart { name: target });
            }
        }
    }

    /// Prompts per modified document (save keeps it open, discard
    /// closes it), then persists the snapshot of whatever remains.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be written; per-document save
    /// failures are reported and skipped.
    pub fn check_and_exit(
        &mut self,
        prompt: &mut dyn ClosePrompt,
        store: &SnapshotStore,
    ) -> Result<(), WorkspaceError> {
        let modified: Vec<String> = self
            .recent
            .iter()
            .filter(|n| self.documents[*n].is_modified())
            .cloned()
            .collect();
        for name in modified {
            match prompt.decide(&name) {
                SaveChoice::Save => {
                    if let Err(e) = self.save_one(&name) {
                        tracing::warn!("failed to save '{name}' on exit: {e}");
                    }
                }
                SaveChoice::Discard => self.remove(&name),
            }
        }
        store.save(&self.snapshot())?;
        Ok(())
    }

    /// One listing line per open document: active marker, name,
    /// modified star, and accrued active duration.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.recent
            .iter()
            .map(|name| {
                let marker = if self.active.as_deref() == Some(name) {
                    ">"
                } else {
                    " "
                };
                let mut line = format!("{marker} {name}");
                if self.documents[name].is_modified() {
                    line.push_str(" *");
                }
                if let Some(statistics) = &self.statistics {
                    line.push(' ');
                    line.push_str(&format_duration(statistics.duration(name)));
                }
                line
            })
            .collect()
    }
}
