//! Quill
//!
//! A multi-document editing engine with an interactive shell.
//!
//! # Architecture
//!
//! - **History Module**: command trait and generic undo/redo stacks
//! - **Text Module**: line-oriented document with positional edits
//! - **Xml Module**: id-indexed element tree document with a simplified
//!   XML reader/writer
//! - **Workspace Module**: open-document registry, session events, and
//!   typed observers (command logger, activity statistics)
//! - **Session Module**: workspace snapshot persistence
//!
//! # Usage
//!
//! ```no_run
//! use quill::app::{App, Outcome, StdinPrompt};
//!
//! let mut app = App::new(".");
//! app.restore_session();
//! let outcome = app.dispatch("help", &mut StdinPrompt).expect("dispatch failed");
//! assert!(matches!(outcome, Outcome::Output(_)));
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod app;
pub mod history;
pub mod logging;
pub mod observer;
pub mod session;
pub mod spell;
pub mod text;
pub mod workspace;
pub mod xml;

// Re-export main types
pub use app::App;
pub use history::{EditCommand, EditError, History};
pub use observer::{CommandLogger, Statistics};
pub use session::{SnapshotStore, WorkspaceSnapshot};
pub use workspace::{Document, Event, Observer, Workspace, WorkspaceError};
pub use xml::{Element, XmlDocument, XmlTree};
