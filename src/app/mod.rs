//! Interactive command dispatch.
//!
//! Maps tokenized REPL input onto workspace and document operations.
//! The dispatcher owns the workspace, the snapshot store, and the
//! spelling collaborator; `main` just feeds it lines.

pub mod dir_tree;
pub mod tokens;

use std::io::{self, Write};

use thiserror::Error;

use crate::history::EditError;
use crate::session::SnapshotStore;
use crate::spell::{SpellCheck, WordListChecker};
use crate::text;
use crate::workspace::{ClosePrompt, SaveChoice, Workspace, WorkspaceError};
use crate::xml;

use tokens::{TokenError, tokenize};

/// Dispatch failure, rendered as a one-line message in the REPL.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed command line.
    #[error("{0}")]
    Usage(String),
    /// Tokenizing failure.
    #[error("{0}")]
    Token(#[from] TokenError),
    /// Workspace-level failure.
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),
    /// Document edit failure.
    #[error("{0}")]
    Edit(#[from] EditError),
    /// Filesystem failure.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Result of dispatching one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to print.
    Done,
    /// Lines to print.
    Output(Vec<String>),
    /// The session should end.
    Exit,
}

/// Prompt that asks on stdin whether to save a modified document.
pub struct StdinPrompt;

impl ClosePrompt for StdinPrompt {
    fn decide(&mut self, name: &str) -> SaveChoice {
        print!("save changes to '{name}'? [y/n] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return SaveChoice::Discard;
        }
        if line.trim().eq_ignore_ascii_case("y") {
            SaveChoice::Save
        } else {
            SaveChoice::Discard
        }
    }
}

/// REPL state: the workspace plus its collaborators.
pub struct App {
    workspace: Workspace,
    store: SnapshotStore,
    checker: WordListChecker,
}

impl App {
    /// Creates an app rooted at the given working directory.
    #[must_use]
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        let root = root.into();
        let store = SnapshotStore::in_dir(&root);
        Self {
            workspace: Workspace::new(root),
            store,
            checker: WordListChecker::new(),
        }
    }

    /// Returns the workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Restores the previous session's snapshot if one exists.
    pub fn restore_session(&mut self) {
        match self.store.load() {
            Ok(Some(snapshot)) => self.workspace.restore(&snapshot),
            Ok(None) => {}
            Err(e) => tracing::warn!("could not load workspace snapshot: {e}"),
        }
    }

    /// Dispatches one input line.
    ///
    /// # Errors
    ///
    /// Returns the failure to report; the session continues afterwards.
    pub fn dispatch(
        &mut self,
        line: &str,
        prompt: &mut dyn ClosePrompt,
    ) -> Result<Outcome, AppError> {
        let tokens = tokenize(line)?;
        let Some(command) = tokens.first().map(String::as_str) else {
            return Ok(Outcome::Done);
        };
        let args = &tokens[1..];

        match command {
            "load" => {
                let name = one_arg(args, "load <file>")?;
                self.workspace.open(name)?;
                Ok(Outcome::Done)
            }
            "init" => {
                let name = args
                    .first()
                    .ok_or_else(|| usage("init <file> [with-log]"))?
                    .clone();
                let with_log = match args.get(1).map(String::as_str) {
                    None => false,
                    Some("with-log") => true,
                    Some(other) => {
                        return Err(usage(&format!("unknown init option '{other}'")));
                    }
                };
                self.workspace.init(&name, with_log)?;
                Ok(Outcome::Done)
            }
            "save" => match args.first().map(String::as_str) {
                None => {
                    self.workspace.save_active()?;
                    Ok(Outcome::Done)
                }
                Some("all") => {
                    let failures = self.workspace.save_all();
                    if failures.is_empty() {
                        Ok(Outcome::Done)
                    } else {
                        Ok(Outcome::Output(
                            failures
                                .into_iter()
                                .map(|(name, e)| format!("could not save '{name}': {e}"))
                                .collect(),
                        ))
                    }
                }
                Some(name) => {
                    self.workspace.save_one(name)?;
                    Ok(Outcome::Done)
                }
            },
            "close" => {
                self.workspace
                    .close(args.first().map(String::as_str), prompt)?;
                Ok(Outcome::Done)
            }
            "edit" => {
                let name = one_arg(args, "edit <file>")?;
                self.workspace.switch(name)?;
                Ok(Outcome::Done)
            }
            "editor-list" => Ok(Outcome::Output(self.workspace.list())),
            "dir-tree" => {
                let path = match args.first() {
                    Some(sub) => self.workspace.root().join(sub),
                    None => self.workspace.root().clone(),
                };
                Ok(Outcome::Output(dir_tree::tree_lines(&path)?))
            }
            "undo" => {
                let doc = self.active_mut()?;
                if doc.undo() {
                    self.workspace.record_command("undo");
                    Ok(Outcome::Done)
                } else {
                    Ok(Outcome::Output(vec!["nothing to undo".to_string()]))
                }
            }
            "redo" => {
                let doc = self.active_mut()?;
                if doc.redo() {
                    self.workspace.record_command("redo");
                    Ok(Outcome::Done)
                } else {
                    Ok(Outcome::Output(vec!["nothing to redo".to_string()]))
                }
            }
            "append" => {
                let text = one_arg(args, "append <text>")?.to_string();
                self.text_execute(text::Append::new(text), line)?;
                Ok(Outcome::Done)
            }
            "insert" => {
                if args.len() != 3 {
                    return Err(usage("insert <line> <col> <text>"));
                }
                let line_no = parse_number(&args[0], "line")?;
                let col = parse_number(&args[1], "col")?;
                self.text_execute(text::Insert::new(line_no, col, args[2].clone()), line)?;
                Ok(Outcome::Done)
            }
            "replace" => {
                if args.len() != 4 {
                    return Err(usage("replace <line> <col> <len> <text>"));
                }
                let line_no = parse_number(&args[0], "line")?;
                let col = parse_number(&args[1], "col")?;
                let len = parse_number(&args[2], "len")?;
                self.text_execute(
                    text::Replace::new(line_no, col, len, args[3].clone()),
                    line,
                )?;
                Ok(Outcome::Done)
            }
            "delete" => self.dispatch_delete(args, line),
            "show" => {
                let doc = self.active()?;
                let text_doc = doc
                    .as_text()
                    .ok_or_else(|| usage("show works on text documents"))?;
                let (start, end) = match args.first() {
                    Some(range) => parse_range(range)?,
                    None => (1, None),
                };
                let lines = text_doc.view(start, end);
                self.workspace.record_command(line);
                Ok(Outcome::Output(lines))
            }
            "xml-tree" => {
                let doc = self.active()?;
                let xml_doc = doc
                    .as_xml()
                    .ok_or_else(|| usage("xml-tree works on xml documents"))?;
                let lines = xml_doc.tree().tree_lines();
                self.workspace.record_command(line);
                Ok(Outcome::Output(lines))
            }
            "insert-before" => {
                if args.len() < 3 || args.len() > 4 {
                    return Err(usage("insert-before <tag> <id> <target-id> [text]"));
                }
                let cmd = xml::InsertBefore::new(
                    args[0].clone(),
                    args[1].clone(),
                    args[2].clone(),
                    args.get(3).cloned(),
                );
                self.xml_execute(cmd, line)?;
                Ok(Outcome::Done)
            }
            "append-child" => {
                if args.len() < 3 || args.len() > 4 {
                    return Err(usage("append-child <tag> <id> <parent-id> [text]"));
                }
                let cmd = xml::AppendChild::new(
                    args[0].clone(),
                    args[1].clone(),
                    args[2].clone(),
                    args.get(3).cloned(),
                );
                self.xml_execute(cmd, line)?;
                Ok(Outcome::Done)
            }
            "edit-id" => {
                if args.len() != 2 {
                    return Err(usage("edit-id <old-id> <new-id>"));
                }
                self.xml_execute(xml::EditId::new(args[0].clone(), args[1].clone()), line)?;
                Ok(Outcome::Done)
            }
            "edit-text" => {
                if args.is_empty() || args.len() > 2 {
                    return Err(usage("edit-text <id> [text]"));
                }
                self.xml_execute(
                    xml::EditText::new(args[0].clone(), args.get(1).cloned()),
                    line,
                )?;
                Ok(Outcome::Done)
            }
            "log-on" => {
                self.workspace.log_on(args.first().map(String::as_str))?;
                Ok(Outcome::Done)
            }
            "log-off" => {
                self.workspace.log_off(args.first().map(String::as_str))?;
                Ok(Outcome::Done)
            }
            "log-show" => {
                let content = self.workspace.read_log(args.first().map(String::as_str))?;
                Ok(Outcome::Output(content.lines().map(String::from).collect()))
            }
            "spell-check" => self.spell_check(line),
            "help" => Ok(Outcome::Output(HELP.lines().map(String::from).collect())),
            "exit" => {
                self.workspace.check_and_exit(prompt, &self.store)?;
                Ok(Outcome::Exit)
            }
            other => Err(usage(&format!("unknown command '{other}' (try 'help')"))),
        }
    }

    fn active(&self) -> Result<&crate::workspace::Document, AppError> {
        self.workspace
            .active_document()
            .ok_or(AppError::Workspace(WorkspaceError::NoActiveDocument))
    }

    fn active_mut(&mut self) -> Result<&mut crate::workspace::Document, AppError> {
        self.workspace
            .active_document_mut()
            .ok_or(AppError::Workspace(WorkspaceError::NoActiveDocument))
    }

    fn text_execute(
        &mut self,
        cmd: impl crate::history::EditCommand<text::LineBuffer> + 'static,
        line: &str,
    ) -> Result<(), AppError> {
        let doc = self.active_mut()?;
        let text_doc = doc
            .as_text_mut()
            .ok_or_else(|| usage("active file is not a text document"))?;
        text_doc.execute(cmd)?;
        self.workspace.record_command(line);
        Ok(())
    }

    fn xml_execute(
        &mut self,
        cmd: impl crate::history::EditCommand<xml::XmlTree> + 'static,
        line: &str,
    ) -> Result<(), AppError> {
        let doc = self.active_mut()?;
        let xml_doc = doc
            .as_xml_mut()
            .ok_or_else(|| usage("active file is not an xml document"))?;
        xml_doc.execute(cmd)?;
        self.workspace.record_command(line);
        Ok(())
    }

    /// `delete` is overloaded: three numeric arguments for a text span,
    /// one element id for a tree document.
    fn dispatch_delete(&mut self, args: &[String], line: &str) -> Result<Outcome, AppError> {
        let doc = self.active()?;
        if doc.as_text().is_some() {
            if args.len() != 3 {
                return Err(usage("delete <line> <col> <len>"));
            }
            let line_no = parse_number(&args[0], "line")?;
            let col = parse_number(&args[1], "col")?;
            let len = parse_number(&args[2], "len")?;
            self.text_execute(text::Delete::new(line_no, col, len), line)?;
        } else {
            if args.len() != 1 {
                return Err(usage("delete <element-id>"));
            }
            self.xml_execute(xml::DeleteElement::new(args[0].clone()), line)?;
        }
        Ok(Outcome::Done)
    }

    fn spell_check(&mut self, line: &str) -> Result<Outcome, AppError> {
        let doc = self.active()?;
        let mut report: Vec<String> = if let Some(lines) = doc.lines() {
            self.checker
                .check_lines(lines)
                .into_iter()
                .map(|f| {
                    format!(
                        "line {}, col {}: '{}' -> '{}'",
                        f.line, f.col, f.wrong, f.suggestion
                    )
                })
                .collect()
        } else if let Some(elements) = doc.element_texts() {
            self.checker
                .check_elements(&elements)
                .into_iter()
                .map(|f| {
                    format!(
                        "element '{}': '{}' -> '{}'",
                        f.element_id, f.wrong, f.suggestion
                    )
                })
                .collect()
        } else {
            Vec::new()
        };
        if report.is_empty() {
            report.push("no problems found".to_string());
        }
        self.workspace.record_command(line);
        Ok(Outcome::Output(report))
    }
}

fn usage(msg: &str) -> AppError {
    AppError::Usage(msg.to_string())
}

fn one_arg<'a>(args: &'a [String], usage_msg: &str) -> Result<&'a str, AppError> {
    match args {
        [only] => Ok(only),
        _ => Err(usage(usage_msg)),
    }
}

fn parse_number(token: &str, what: &str) -> Result<usize, AppError> {
    token
        .parse()
        .map_err(|_| usage(&format!("{what} must be a positive number, got '{token}'")))
}

/// Parses a `start:end` range; either side may be omitted.
fn parse_range(token: &str) -> Result<(usize, Option<usize>), AppError> {
    let Some((start, end)) = token.split_once(':') else {
        let line = parse_number(token, "line")?;
        return Ok((line, Some(line)));
    };
    let start = if start.is_empty() {
        1
    } else {
        parse_number(start, "start")?
    };
    let end = if end.is_empty() {
        None
    } else {
        Some(parse_number(end, "end")?)
    };
    Ok((start, end))
}

const HELP: &str = "\
workspace:
  load <file>                 open a file (created on first save if missing)
  init <file> [with-log]      create a fresh file, optionally pre-logged
  save [<file>|all]           write to disk
  close [<file>]              close, asking about unsaved changes
  edit <file>                 make an open file active
  editor-list                 list open files
  dir-tree [<path>]           show the directory tree
  exit                        save the session and quit
text documents:
  append <text>               add a line at the end
  insert <line> <col> <text>  insert within a line
  delete <line> <col> <len>   remove a span
  replace <line> <col> <len> <text>
  show [<start>:<end>]        print numbered lines
xml documents:
  xml-tree                    print the element tree
  insert-before <tag> <id> <target-id> [text]
  append-child <tag> <id> <parent-id> [text]
  edit-id <old-id> <new-id>
  edit-text <id> [text]       set or clear element text
  delete <element-id>
history and tools:
  undo / redo                 step through the active file's history
  log-on / log-off [<file>]   toggle command logging
  log-show [<file>]           print the command log
  spell-check                 report misspellings in the active file
  help                        this text";
