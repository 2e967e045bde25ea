//! Attribute edits across several objects journaled and unwound.

use std::cell::RefCell;
use std::rc::Rc;

use tabula_props::{
    CheckChain, ChoiceCheck, ClassSpec, FloatCheck, IntCheck, PropObject, Property, TextCheck,
    Value,
};
use tabula_undo::{Journal, UndoList};

fn line_spec() -> Rc<ClassSpec> {
    ClassSpec::builder("Line")
        .property(
            Property::new("width", CheckChain::single(IntCheck::range(0, 20))).default_value(1i64),
        )
        .property(
            Property::new("style", CheckChain::single(ChoiceCheck::text(["solid", "dashed"])))
                .default_value("solid"),
        )
        .property(
            Property::new("alpha", CheckChain::single(FloatCheck::range(0.0, 1.0)))
                .default_value(1.0),
        )
        .property(Property::new("label", CheckChain::single(TextCheck::new())))
        .build()
}

#[test]
fn edits_across_objects_unwind_in_reverse() {
    let spec = line_spec();
    let a = PropObject::new(Rc::clone(&spec)).unwrap();
    let b = PropObject::new(spec).unwrap();

    let mut journal = Journal::new();
    let mut list = UndoList::new("style both lines");
    a.set_undoable("width", Value::Int(3), &mut list).unwrap();
    b.set_undoable("width", Value::Int(5), &mut list).unwrap();
    a.set_undoable("style", Value::from("dashed"), &mut list)
        .unwrap();
    journal.add_undo(list);

    assert!(journal.undo());
    assert_eq!(a.stored("width").unwrap(), Value::Undefined);
    assert_eq!(b.stored("width").unwrap(), Value::Undefined);
    assert_eq!(a.stored("style").unwrap(), Value::Undefined);

    assert!(journal.redo());
    assert_eq!(a.get("width").unwrap(), Value::Int(3));
    assert_eq!(b.get("width").unwrap(), Value::Int(5));
    assert_eq!(a.get("style").unwrap(), Value::from("dashed"));
}

#[test]
fn undo_fires_signals_subscribers_rely_on() {
    let a = PropObject::new(line_spec()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let _sub = a.on_update(move |e| {
        seen_clone
            .borrow_mut()
            .push((e.attribute.clone(), e.value.clone()));
    });

    let mut journal = Journal::new();
    let mut list = UndoList::new("set width");
    a.set_undoable("width", Value::Int(7), &mut list).unwrap();
    journal.add_undo(list);

    assert!(journal.undo());
    assert!(journal.redo());
    assert_eq!(
        *seen.borrow(),
        vec![
            ("width".to_string(), Value::Int(7)),
            ("width".to_string(), Value::Undefined),
            ("width".to_string(), Value::Int(7)),
        ]
    );
}

#[test]
fn branch_discard_applies_to_attribute_history() {
    let a = PropObject::new(line_spec()).unwrap();
    let mut journal = Journal::new();

    for width in [2i64, 4] {
        let mut list = UndoList::new("set width");
        a.set_undoable("width", Value::Int(width), &mut list).unwrap();
        journal.add_undo(list);
    }

    assert!(journal.undo()); // Back to 2.
    assert_eq!(a.get("width").unwrap(), Value::Int(2));
    assert!(journal.can_redo());

    let mut list = UndoList::new("set width");
    a.set_undoable("width", Value::Int(9), &mut list).unwrap();
    journal.add_undo(list);

    assert!(!journal.can_redo());
    assert!(journal.undo());
    assert_eq!(a.get("width").unwrap(), Value::Int(2));
}

#[test]
fn failed_set_records_nothing() {
    let a = PropObject::new(line_spec()).unwrap();
    let mut list = UndoList::new("bad edit");
    assert!(a.set_undoable("width", Value::Int(999), &mut list).is_err());
    assert!(a.set_undoable("style", Value::from("wavy"), &mut list).is_err());
    assert!(list.is_empty());
}
