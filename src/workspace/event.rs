//! Workspace event notifications.
//!
//! Events flow one way, from the workspace to its observers. Observers
//! must not reach back into the workspace from a notification handler;
//! they only record what they are told.

/// An event emitted by the workspace, always naming a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A document became active.
    ActiveStart { name: String },
    /// A document stopped being active.
    ActiveStop { name: String },
    /// A command ran against a document; carries the literal command
    /// string for the session log.
    Command { name: String, command_str: String },
    /// A loaded document carried a logging directive in its first line.
    AutoLogEnable {
        name: String,
        directive: Option<String>,
    },
    /// Logging was switched on for a document.
    LogOn { name: String },
    /// Logging was switched off for a document.
    LogOff { name: String },
    /// A document was closed.
    Close { name: String },
}

impl Event {
    /// Returns the document name the event refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ActiveStart { name }
            | Self::ActiveStop { name }
            | Self::Command { name, .. }
            | Self::AutoLogEnable { name, .. }
            | Self::LogOn { name }
            | Self::LogOff { name }
            | Self::Close { name } => name,
        }
    }
}

/// A session observer. Implementations ignore events they do not
/// handle and must never fail out of a notification.
pub trait Observer {
    fn notify(&mut self, event: &Event);
}
