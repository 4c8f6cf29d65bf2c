//! Per-document command logging observer.
//!
//! Each document gets one log artifact: a dot-prefixed, `.log`-suffixed
//! sibling named from the document's base name, regardless of how
//! deeply the document itself is nested. Logging is best-effort: a
//! failed write is reported and never aborts the triggering operation.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::workspace::event::{Event, Observer};

/// Flag token that marks an exclusion in a logging directive.
const EXCLUDE_FLAG: &str = "-e";

/// Session-scoped, per-document command log with exclusion filtering.
pub struct CommandLogger {
    /// Directory the log artifacts live in.
    dir: PathBuf,
    /// Documents with logging currently enabled.
    enabled: HashSet<String>,
    /// Per-document excluded command-name tokens.
    excluded: HashMap<String, HashSet<String>>,
    /// Documents whose session header has been written this process.
    session_started: HashSet<String>,
}

impl CommandLogger {
    /// Creates a logger writing into the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dir(PathBuf::from("."))
    }

    /// Creates a logger writing into `dir`.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            enabled: HashSet::new(),
            excluded: HashMap::new(),
            session_started: HashSet::new(),
        }
    }

    /// Enables logging for a document.
    pub fn enable(&mut self, name: &str) {
        self.enabled.insert(name.to_string());
    }

    /// Disables logging for a document. Filter and session marker are
    /// untouched, so re-enabling does not duplicate headers.
    pub fn disable(&mut self, name: &str) {
        self.enabled.remove(name);
    }

    /// Returns true if logging is enabled for a document.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Returns the enabled-document list, sorted for stable snapshots.
    #[must_use]
    pub fn enabled_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.enabled.iter().cloned().collect();
        names.sort();
        names
    }

    /// Returns the log artifact path for a document.
    #[must_use]
    pub fn log_path(&self, name: &str) -> PathBuf {
        let base = Path::new(name)
            .file_name()
            .map_or_else(|| name.to_string(), |n| n.to_string_lossy().into_owned());
        self.dir.join(format!(".{base}.log"))
    }

    /// Reads the log content for a document.
    pub fn read_log(&self, name: &str) -> std::io::Result<String> {
        fs::read_to_string(self.log_path(name))
    }

    /// Deletes the log artifact for a document (discarding a document
    /// that never reached disk).
    pub fn delete_log_file(&self, name: &str) {
        let path = self.log_path(name);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("could not delete log file {}: {e}", path.display());
            }
        }
    }

    /// Installs the exclusion filter carried by a logging directive.
    ///
    /// The directive looks like `# log -e append-child -e insert-before`:
    /// each `-e` flag is followed by one excluded command token.
    fn apply_directive(&mut self, name: &str, directive: &str) {
        let mut tokens = directive.split_whitespace().peekable();
        let mut excluded = HashSet::new();
        while let Some(token) = tokens.next() {
            if token == EXCLUDE_FLAG {
                if let Some(cmd) = tokens.next() {
                    excluded.insert(cmd.to_string());
                }
            }
        }
        if !excluded.is_empty() {
            self.excluded.insert(name.to_string(), excluded);
        }
    }

    /// Writes the session header once per document per process.
    ///
    /// Guarded by the session-started set, not by enablement, so
    /// toggling logging off and on never duplicates headers.
    fn start_session(&mut self, name: &str) {
        if self.session_started.contains(name) {
            return;
        }
        self.session_started.insert(name.to_string());
        let line = format!("session start at {}", timestamp());
        self.write_line(name, &line);
    }

    /// Returns true if a command string passes the exclusion filter.
    fn passes_filter(&self, name: &str, command_str: &str) -> bool {
        let Some(excluded) = self.excluded.get(name) else {
            return true;
        };
        command_str
            .split_whitespace()
            .next()
            .is_none_or(|head| !excluded.contains(head))
    }

    fn write_line(&self, name: &str, line: &str) {
        let path = self.log_path(name);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = result {
            tracing::warn!("failed to write log for {name}: {e}");
        }
    }
}

impl Default for CommandLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for CommandLogger {
    fn notify(&mut self, event: &Event) {
        match event {
            Event::AutoLogEnable { name, directive } => {
                if let Some(directive) = directive {
                    self.apply_directive(name, directive);
                }
                self.enable(name);
                self.start_session(name);
            }
            Event::LogOn { name } => self.enable(name),
            Event::LogOff { name } => self.disable(name),
            Event::Command { name, command_str } => {
                if self.is_enabled(name) && self.passes_filter(name, command_str) {
                    let line = format!("{} {command_str}", timestamp());
                    self.write_line(name, &line);
                }
            }
            _ => {}
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event_command(name: &str, command_str: &str) -> Event {
        Event::Command {
            name: name.to_string(),
            command_str: command_str.to_string(),
        }
    }

    #[test]
    fn test_log_path_ignores_nesting() {
        let logger = CommandLogger::with_dir("/tmp/logs");
        assert_eq!(
            logger.log_path("deep/nested/a.txt"),
            PathBuf::from("/tmp/logs/.a.txt.log")
        );
    }

    #[test]
    fn test_commands_logged_only_when_enabled() {
        let dir = TempDir::new().unwrap();
        let mut logger = CommandLogger::with_dir(dir.path());

        logger.notify(&event_command("a.txt", "append \"one\""));
        assert!(logger.read_log("a.txt").is_err());

        logger.notify(&Event::LogOn {
            name: "a.txt".to_string(),
        });
        logger.notify(&event_command("a.txt", "append \"two\""));
        let content = logger.read_log("a.txt").unwrap();
        assert!(content.contains("append \"two\""));
        assert!(!content.contains("session start"));
    }

    #[test]
    fn test_exclusion_filter() {
        let dir = TempDir::new().unwrap();
        let mut logger = CommandLogger::with_dir(dir.path());

        logger.notify(&Event::AutoLogEnable {
            name: "a.xml".to_string(),
            directive: Some("# log -e append-child -e insert-before".to_string()),
        });
        logger.notify(&event_command("a.xml", "append-child title t1 root"));
        logger.notify(&event_command("a.xml", "insert-before title t0 t1"));
        logger.notify(&event_command("a.xml", "edit-text t1 \"bar\""));

        let content = logger.read_log("a.xml").unwrap();
        assert!(content.contains("edit-text"));
        assert!(!content.contains("append-child"));
        assert!(!content.contains("insert-before"));
    }

    #[test]
    fn test_session_header_written_once() {
        let dir = TempDir::new().unwrap();
        let mut logger = CommandLogger::with_dir(dir.path());

        logger.notify(&Event::AutoLogEnable {
            name: "a.txt".to_string(),
            directive: None,
        });
        logger.notify(&Event::LogOff {
            name: "a.txt".to_string(),
        });
        logger.notify(&Event::AutoLogEnable {
            name: "a.txt".to_string(),
            directive: None,
        });

        let content = logger.read_log("a.txt").unwrap();
        assert_eq!(content.matches("session start at").count(), 1);
    }

    #[test]
    fn test_toggle_keeps_filter() {
        let dir = TempDir::new().unwrap();
        let mut logger = CommandLogger::with_dir(dir.path());

        logger.notify(&Event::AutoLogEnable {
            name: "a.xml".to_string(),
            directive: Some("# log -e append".to_string()),
        });
        logger.notify(&Event::LogOff {
            name: "a.xml".to_string(),
        });
        logger.notify(&Event::LogOn {
            name: "a.xml".to_string(),
        });
        logger.notify(&event_command("a.xml", "append \"x\""));

        let content = logger.read_log("a.xml").unwrap();
        assert!(!content.contains("append \"x\""));
    }

    #[test]
    fn test_delete_log_file() {
        let dir = TempDir::new().unwrap();
        let mut logger = CommandLogger::with_dir(dir.path());

        logger.notify(&Event::AutoLogEnable {
            name: "a.txt".to_string(),
            directive: None,
        });
        assert!(logger.log_path("a.txt").exists());

        logger.delete_log_file("a.txt");
        assert!(!logger.log_path("a.txt").exists());
    }

    #[test]
    fn test_enabled_files_sorted() {
        let mut logger = CommandLogger::new();
        logger.enable("b.txt");
        logger.enable("a.txt");
        assert_eq!(logger.enabled_files(), vec!["a.txt", "b.txt"]);
    }
}
