//! Integration tests for document editing history.
//!
//! These tests verify that:
//! - Arbitrary sequences of text commands are fully reversible
//! - Redo replays exactly what undo reverted
//! - Failed commands never make it into the history

use proptest::prelude::*;

use quill::text::{Append, Delete, Insert, LineDocument, Replace};

#[derive(Debug, Clone)]
enum Op {
    Append(String),
    Insert(usize, usize, String),
    Delete(usize, usize, usize),
    Replace(usize, usize, usize, String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let word = "[a-z]{0,6}";
    prop_oneof![
        word.prop_map(Op::Append),
        (1usize..6, 1usize..10, word).prop_map(|(l, c, s)| Op::Insert(l, c, s)),
        (1usize..6, 1usize..10, 0usize..6).prop_map(|(l, c, n)| Op::Delete(l, c, n)),
        (1usize..6, 1usize..10, 0usize..6, word)
            .prop_map(|(l, c, n, s)| Op::Replace(l, c, n, s)),
    ]
}

fn apply(doc: &mut LineDocument, op: Op) -> bool {
    match op {
        Op::Append(s) => doc.execute(Append::new(s)).is_ok(),
        Op::Insert(l, c, s) => doc.execute(Insert::new(l, c, s)).is_ok(),
        Op::Delete(l, c, n) => doc.execute(Delete::new(l, c, n)).is_ok(),
        Op::Replace(l, c, n, s) => doc.execute(Replace::new(l, c, n, s)).is_ok(),
    }
}

proptest! {
    #[test]
    fn undoing_everything_restores_the_buffer(
        ops in proptest::collection::vec(op_strategy(), 1..24)
    ) {
        let mut doc = LineDocument::from_text("p.txt", "alpha\nbeta\ngamma");
        let before = doc.lines().to_vec();

        let applied = ops.into_iter().filter(|op| apply(&mut doc, op.clone())).count();

        for _ in 0..applied {
            prop_assert!(doc.undo());
        }
        prop_assert!(!doc.undo());
        prop_assert_eq!(doc.lines().to_vec(), before);
    }

    #[test]
    fn redo_replays_what_undo_reverted(
        ops in proptest::collection::vec(op_strategy(), 1..16)
    ) {
        let mut doc = LineDocument::from_text("p.txt", "one\ntwo");
        let applied = ops.into_iter().filter(|op| apply(&mut doc, op.clone())).count();
        let after = doc.lines().to_vec();

        for _ in 0..applied {
            prop_assert!(doc.undo());
        }
        for _ in 0..applied {
            prop_assert!(doc.redo());
        }
        prop_assert_eq!(doc.lines().to_vec(), after);
    }
}

#[test]
fn test_failed_command_leaves_no_history() {
    let mut doc = LineDocument::from_text("t.txt", "short");
    assert!(doc.execute(Insert::new(9, 1, "x")).is_err());
    assert!(!doc.undo());
    assert_eq!(doc.content(), "short");
}

#[test]
fn test_new_edit_clears_redo_branch() {
    let mut doc = LineDocument::from_text("t.txt", "");
    doc.execute(Append::new("one")).unwrap();
    doc.execute(Append::new("two")).unwrap();
    assert!(doc.undo());
    doc.execute(Append::new("three")).unwrap();
    assert!(!doc.redo());
    assert_eq!(doc.content(), "one\nthree");
}
