//! Integration tests for the workspace lifecycle.
//!
//! These tests verify that:
//! - Documents load, save, switch, and close through the public API
//! - The command log honors the `# log` directive and its exclusions
//! - Session headers are written once per document per process
//! - Snapshots capture and restore active/modified/logged state

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use quill::session::SnapshotStore;
use quill::workspace::{ClosePrompt, SaveChoice, Workspace};

struct Scripted(Vec<SaveChoice>);

impl ClosePrompt for Scripted {
    fn decide(&mut self, _name: &str) -> SaveChoice {
        self.0.remove(0)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_load_edit_save_round_trip() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "first\nsecond").unwrap();

    let mut ws = Workspace::new(dir.path());
    ws.open("notes.txt").unwrap();
    {
        let doc = ws.active_document_mut().unwrap().as_text_mut().unwrap();
        doc.execute(quill::text::Append::new("third")).unwrap();
    }
    assert!(ws.active_document().unwrap().is_modified());
    ws.save_active().unwrap();

    let on_disk = fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert_eq!(on_disk, "first\nsecond\nthird");
    assert!(!ws.active_document().unwrap().is_modified());
}

#[test]
fn test_xml_save_reattaches_directive_line() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("book.xml"),
        "# log\n<book id=\"root\"><title id=\"t1\">Novel</title></book>",
    )
    .unwrap();

    let mut ws = Workspace::new(dir.path());
    ws.open("book.xml").unwrap();
    assert!(ws.logger().unwrap().is_enabled("book.xml"));
    ws.save_active().unwrap();

    let on_disk = fs::read_to_string(dir.path().join("book.xml")).unwrap();
    assert!(on_disk.starts_with("# log\n"));
    assert!(on_disk.contains("<title id=\"t1\">Novel</title>"));
}

#[test]
fn test_close_with_save_choice_writes_then_removes() {
    let dir = TempDir::new().unwrap();
    let mut ws = Workspace::new(dir.path());
    ws.init("draft.txt", false).unwrap();
    ws.close(None, &mut Scripted(vec![SaveChoice::Save])).unwrap();

    assert!(dir.path().join("draft.txt").exists());
    assert!(!ws.is_open("draft.txt"));
    assert_eq!(ws.active_name(), None);
}

// ============================================================================
// Command logging
// ============================================================================

#[test]
fn test_directive_exclusions_filter_commands() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("story.txt"),
        "# log -e insert -e show\nonce upon a time",
    )
    .unwrap();

    let mut ws = Workspace::new(dir.path());
    ws.open("story.txt").unwrap();
    ws.record_command("append \"the end\"");
    ws.record_command("insert 1 1 x");
    ws.record_command("show");

    let log = ws.read_log(None).unwrap();
    assert!(log.contains("session start at"));
    assert!(log.contains("load story.txt"));
    assert!(log.contains("append \"the end\""));
    assert!(!log.contains("insert 1 1 x"));
    assert!(!log.contains("show"));
}

#[test]
fn test_session_header_written_once_across_toggles() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "# log\nhello").unwrap();

    let mut ws = Workspace::new(dir.path());
    ws.open("a.txt").unwrap();
    ws.log_off(None).unwrap();
    ws.record_command("append hidden");
    ws.log_on(None).unwrap();
    ws.record_command("append visible");

    let log = ws.read_log(None).unwrap();
    assert_eq!(log.matches("session start at").count(), 1);
    assert!(!log.contains("append hidden"));
    assert!(log.contains("append visible"));
}

#[test]
fn test_log_lives_beside_nested_documents() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("deep.txt"), "# log\nx").unwrap();

    let mut ws = Workspace::new(dir.path());
    ws.open("sub/deep.txt").unwrap();
    // the log is named after the basename and sits in the workspace root
    assert!(dir.path().join(".deep.txt.log").exists());
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshot_restores_full_session() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.xml"), "<root id=\"root\" />").unwrap();
    let store = SnapshotStore::in_dir(dir.path());

    {
        let mut ws = Workspace::new(dir.path());
        ws.open("a.txt").unwrap();
        ws.open("b.xml").unwrap();
        ws.log_on(Some("a.txt")).unwrap();
        {
            let doc = ws.active_document_mut().unwrap().as_xml_mut().unwrap();
            doc.execute(quill::xml::AppendChild::new("item", "i1", "root", None))
                .unwrap();
        }
        ws.switch("a.txt").unwrap();
        store.save(&ws.snapshot()).unwrap();
    }

    let mut ws = Workspace::new(dir.path());
    ws.restore(&store.load().unwrap().unwrap());

    assert_eq!(ws.active_name(), Some("a.txt"));
    assert_eq!(
        ws.open_names(),
        ["b.xml".to_string(), "a.txt".to_string()]
    );
    // the unsaved edit is gone but the snapshot still marks b.xml dirty
    assert!(ws.document("b.xml").unwrap().is_modified());
    assert!(!ws.document("a.txt").unwrap().is_modified());
    assert!(ws.logger().unwrap().is_enabled("a.txt"));
}

#[test]
fn test_restored_modified_flag_wins_over_fresh_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    let store = SnapshotStore::in_dir(dir.path());

    {
        let mut ws = Workspace::new(dir.path());
        ws.open("a.txt").unwrap();
        ws.active_document_mut().unwrap().set_modified(true);
        store.save(&ws.snapshot()).unwrap();
    }

    let mut ws = Workspace::new(dir.path());
    ws.restore(&store.load().unwrap().unwrap());
    // a fresh load would be unmodified; the snapshot flag is forced after
    assert!(ws.document("a.txt").unwrap().is_modified());
}
