//! Property-based tests for the delta engine and the quality helpers.

use std::collections::HashSet;

use keydiff::model::RowKey;
use keydiff::{trim_whitespace, CellValue, Delta, DeltaOptions, Table};
use proptest::prelude::*;

/// Keyed table with possibly repeated ids and float values
fn keyed_table() -> impl Strategy<Value = Table> {
    prop::collection::vec((0i64..12, -100.0f64..100.0), 0..25).prop_map(|rows| {
        let (ids, values): (Vec<CellValue>, Vec<CellValue>) = rows
            .into_iter()
            .map(|(id, v)| (CellValue::Int(id), CellValue::Float(v)))
            .unzip();
        Table::from_columns(vec![("id", ids), ("value", values)]).unwrap()
    })
}

fn key_set(table: &Table) -> HashSet<RowKey> {
    table
        .rows
        .iter()
        .map(|row| RowKey::new(vec![row.cells[0].clone()]))
        .collect()
}

fn changed_ids(delta: &Delta) -> HashSet<RowKey> {
    let changed = delta.changed("value").unwrap();
    changed
        .rows
        .iter()
        .map(|row| RowKey::new(vec![row.cells[0].clone()]))
        .collect()
}

proptest! {
    #[test]
    fn prop_keys_partition(a in keyed_table(), b in keyed_table()) {
        let delta = Delta::new(&a, &b, &["id"]).unwrap();

        let only_a: HashSet<RowKey> = delta.unmatched_a_keys().iter().cloned().collect();
        let only_b: HashSet<RowKey> = delta.unmatched_b_keys().iter().cloned().collect();
        let matched: HashSet<RowKey> = delta.matched_keys().cloned().collect();

        prop_assert!(only_a.is_disjoint(&only_b));
        prop_assert!(only_a.is_disjoint(&matched));
        prop_assert!(only_b.is_disjoint(&matched));

        let all: HashSet<RowKey> = key_set(&a).union(&key_set(&b)).cloned().collect();
        let covered: HashSet<RowKey> = only_a
            .union(&only_b)
            .cloned()
            .chain(matched.iter().cloned())
            .collect();
        prop_assert_eq!(covered, all);
    }

    #[test]
    fn prop_self_delta_is_empty(a in keyed_table()) {
        let delta = Delta::new(&a, &a, &["id"]).unwrap();

        prop_assert!(delta.unmatched_a().is_empty());
        prop_assert!(delta.unmatched_b().is_empty());
        prop_assert!(delta.changed("value").unwrap().is_empty());
        prop_assert!(!delta.has_differences());
    }

    #[test]
    fn prop_tolerance_is_monotonic(
        a in keyed_table(),
        b in keyed_table(),
        tol in 0.0f64..50.0,
        extra in 0.0f64..50.0,
        rel in 0.0f64..1.0,
        extra_rel in 0.0f64..1.0,
    ) {
        let loose = DeltaOptions::new(tol + extra, rel + extra_rel).unwrap();
        let strict = DeltaOptions::new(tol, rel).unwrap();

        let loose = Delta::with_options(&a, &b, &["id"], loose).unwrap();
        let strict = Delta::with_options(&a, &b, &["id"], strict).unwrap();

        prop_assert!(changed_ids(&loose).is_subset(&changed_ids(&strict)));
    }

    #[test]
    fn prop_trim_is_idempotent(names in prop::collection::vec("[ \\t]{0,2}[a-z]{0,4}[ \\t]{0,2}", 0..10)) {
        let cells: Vec<CellValue> = names.into_iter().map(CellValue::from).collect();
        let table = Table::from_columns(vec![("name", cells)]).unwrap();

        let once = trim_whitespace::<&str>(&table, None).unwrap();
        let twice = trim_whitespace::<&str>(&once, None).unwrap();

        prop_assert_eq!(once, twice);
    }
}
