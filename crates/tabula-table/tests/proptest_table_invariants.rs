//! Property-based invariants for the table engine.

use proptest::prelude::*;

use tabula_props::Value;
use tabula_table::{Designation, Table, UndoMode};
use tabula_undo::UndoList;

fn permutation(n: usize) -> impl Strategy<Value = Vec<usize>> {
    Just((0..n).collect::<Vec<usize>>()).prop_shuffle()
}

fn inverse_of(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (pos, &k) in order.iter().enumerate() {
        inverse[k] = pos;
    }
    inverse
}

/// A table with distinguishable metadata so a desync would be visible.
fn tagged_table(columns: usize, rows: usize) -> Table {
    let codes: String = ['d', 'f', 'l', 'i', 's']
        .into_iter()
        .cycle()
        .take(columns)
        .collect();
    let table = Table::new(columns, rows, &codes).unwrap();
    let mut setup = UndoList::new("tag");
    for (i, name) in table.column_names().into_iter().enumerate() {
        let designation = Designation::ALL[i % Designation::ALL.len()];
        table.set_designation(&name, designation, &mut setup).unwrap();
        table
            .set_label(&name, format!("label {i}"), &mut setup)
            .unwrap();
    }
    table
}

#[derive(Debug, Clone)]
enum Op {
    Resize(usize),
    Extend(usize),
    InsertRows { at: usize, n: usize },
    DeleteRows { at: usize, n: usize },
    DeleteZeroFill { at: usize, n: usize },
    SetCell { col: usize, row: usize, value: i64 },
    Rearrange(Vec<usize>),
    RemoveColumn(usize),
}

fn op_strategy(columns: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..12).prop_map(Op::Resize),
        (0usize..4).prop_map(Op::Extend),
        (any::<usize>(), 0usize..4).prop_map(|(at, n)| Op::InsertRows { at, n }),
        (any::<usize>(), 0usize..6).prop_map(|(at, n)| Op::DeleteRows { at, n }),
        (any::<usize>(), 0usize..6).prop_map(|(at, n)| Op::DeleteZeroFill { at, n }),
        // i32-ranged so the write lands in every column type, including
        // the 32-bit integer column.
        (
            any::<usize>(),
            any::<usize>(),
            i64::from(i32::MIN)..=i64::from(i32::MAX)
        )
            .prop_map(|(col, row, value)| Op::SetCell { col, row, value }),
        permutation(columns).prop_map(Op::Rearrange),
        any::<usize>().prop_map(Op::RemoveColumn),
    ]
}

/// Apply one op with indices clamped into the current shape; returns
/// whether anything was recorded.
fn apply(table: &Table, op: &Op, list: &mut UndoList) {
    let rows = table.row_count();
    let cols = table.column_count();
    match op {
        Op::Resize(n) => table.resize(*n, list).unwrap(),
        Op::Extend(n) => table.extend(*n, list).unwrap(),
        Op::InsertRows { at, n } => {
            table.insert_n_rows(at % (rows + 1), *n, list).unwrap();
        }
        Op::DeleteRows { at, n } => {
            table.delete_n_rows(at % (rows + 1), *n, list).map(|_| ()).unwrap();
        }
        Op::DeleteZeroFill { at, n } => {
            // Zero-filled rows only, so the cheap undo mode stays exact:
            // delete the tail appended by a resize.
            table.resize(rows + n, list).unwrap();
            table
                .delete_n_rows_with(rows + at % (n + 1), usize::MAX, UndoMode::ZeroFill, list)
                .map(|_| ())
                .unwrap();
        }
        Op::SetCell { col, row, value } => {
            if rows > 0 {
                table
                    .set_value(col % cols, row % rows, Value::Int(*value), list)
                    .unwrap();
            }
        }
        Op::Rearrange(order) => {
            if order.len() == cols {
                table.rearrange(order, list).unwrap();
            }
        }
        Op::RemoveColumn(i) => {
            if cols > 1 {
                table.remove_by_index(i % cols, list).map(|_| ()).unwrap();
            }
        }
    }
}

proptest! {
    #[test]
    fn rearrange_then_inverse_is_identity(order in permutation(5)) {
        let table = tagged_table(5, 3);
        let original = table.deep_copy();

        let mut list = UndoList::new("shuffle");
        table.rearrange(&order, &mut list).unwrap();
        table.rearrange(&inverse_of(&order), &mut list).unwrap();

        prop_assert_eq!(&table, &original);
    }

    #[test]
    fn rearrange_keeps_metadata_bound_to_names(order in permutation(6)) {
        let table = tagged_table(6, 2);
        let expected: Vec<(String, Designation)> = table
            .column_names()
            .into_iter()
            .map(|name| {
                let d = table.designation(&name).unwrap();
                (name, d)
            })
            .collect();

        let mut list = UndoList::new("shuffle");
        table.rearrange(&order, &mut list).unwrap();

        for (name, designation) in expected {
            prop_assert_eq!(table.designation(&name).unwrap(), designation);
        }
    }

    #[test]
    fn any_op_sequence_unwinds_to_the_original(
        ops in proptest::collection::vec(op_strategy(4), 1..12)
    ) {
        let table = tagged_table(4, 5);
        let original = table.deep_copy();

        let mut list = UndoList::new("mutation burst");
        for op in &ops {
            apply(&table, op, &mut list);
        }

        let redo = list.apply();
        prop_assert_eq!(&table, &original);

        // And the redo list's own inverse also lands back at the start.
        let undo_again = redo.apply();
        let _ = undo_again.apply();
        prop_assert_eq!(&table, &original);
    }
}
