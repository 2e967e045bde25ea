//! Property-based history invariants over a simple mutable document.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tabula_undo::{Journal, UndoList, UndoRecord};

type Doc = Rc<RefCell<Vec<i64>>>;

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
    Set { slot: usize, value: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i64>().prop_map(Op::Push),
        Just(Op::Pop),
        (any::<usize>(), any::<i64>()).prop_map(|(slot, value)| Op::Set { slot, value }),
    ]
}

fn push_cmd(doc: Doc, value: i64) -> UndoRecord {
    UndoRecord::new("push", move || {
        doc.borrow_mut().push(value);
        pop_cmd(doc.clone())
    })
}

fn pop_cmd(doc: Doc) -> UndoRecord {
    UndoRecord::new("pop", move || {
        match doc.borrow_mut().pop() {
            Some(value) => push_cmd(doc.clone(), value),
            None => UndoRecord::noop("pop"),
        }
    })
}

fn set_cmd(doc: Doc, slot: usize, value: i64) -> UndoRecord {
    UndoRecord::new("set", move || {
        let prior = std::mem::replace(&mut doc.borrow_mut()[slot], value);
        set_cmd(doc.clone(), slot, prior)
    })
}

/// Apply one op to the document and record its inverse.
fn mutate(doc: &Doc, op: &Op, list: &mut UndoList) {
    match op {
        Op::Push(value) => {
            doc.borrow_mut().push(*value);
            list.push(pop_cmd(doc.clone()));
        }
        Op::Pop => {
            if let Some(value) = doc.borrow_mut().pop() {
                list.push(push_cmd(doc.clone(), value));
            }
        }
        Op::Set { slot, value } => {
            let mut inner = doc.borrow_mut();
            if inner.is_empty() {
                return;
            }
            let slot = slot % inner.len();
            let prior = std::mem::replace(&mut inner[slot], *value);
            drop(inner);
            list.push(set_cmd(doc.clone(), slot, prior));
        }
    }
}

proptest! {
    #[test]
    fn full_undo_restores_and_full_redo_replays(
        ops in proptest::collection::vec(op_strategy(), 1..24),
        batch in 1usize..5,
    ) {
        let doc: Doc = Rc::new(RefCell::new(vec![0, 1, 2]));
        let initial = doc.borrow().clone();
        let mut journal = Journal::new();

        for chunk in ops.chunks(batch) {
            let mut list = UndoList::new("batch");
            for op in chunk {
                mutate(&doc, op, &mut list);
            }
            journal.add_undo(list);
        }
        let final_state = doc.borrow().clone();

        while journal.undo() {}
        prop_assert_eq!(&*doc.borrow(), &initial);

        while journal.redo() {}
        prop_assert_eq!(&*doc.borrow(), &final_state);

        // A second full cycle still lands on the same states.
        while journal.undo() {}
        prop_assert_eq!(&*doc.borrow(), &initial);
    }

    #[test]
    fn interrupted_history_discards_the_redo_branch(
        ops in proptest::collection::vec(op_strategy(), 2..12),
    ) {
        let doc: Doc = Rc::new(RefCell::new(vec![0]));
        let mut journal = Journal::new();

        for op in &ops {
            let mut list = UndoList::new("op");
            mutate(&doc, op, &mut list);
            journal.add_undo(list);
        }

        prop_assume!(journal.undo());
        let branch_point = doc.borrow().clone();

        let mut list = UndoList::new("fresh action");
        mutate(&doc, &Op::Push(99), &mut list);
        journal.add_undo(list);

        prop_assert!(!journal.can_redo());
        prop_assert!(journal.undo());
        prop_assert_eq!(&*doc.borrow(), &branch_point);
    }
}
