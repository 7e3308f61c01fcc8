//! Row matching algorithm

use crate::model::{KeyIndex, RowKey, Table};

/// A key present on both sides with the aligned row positions
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRow {
    pub key: RowKey,
    pub row_a: usize,
    pub row_b: usize,
}

/// Outcome of matching two tables by key
#[derive(Debug, Clone, Default)]
pub struct KeyMatch {
    /// Positions of rows in A whose key is absent from B, in A order
    pub unmatched_a: Vec<usize>,
    /// Positions of rows in B whose key is absent from A, in B order
    pub unmatched_b: Vec<usize>,
    /// Keys present on both sides, in first-occurrence order of A
    pub matched: Vec<MatchedRow>,
}

/// Row matcher using hash-based key lookup
pub struct RowMatcher<'a> {
    index_a: &'a KeyIndex,
    index_b: &'a KeyIndex,
}

impl<'a> RowMatcher<'a> {
    /// Create a new row matcher over the key indices of both tables
    pub fn new(index_a: &'a KeyIndex, index_b: &'a KeyIndex) -> Self {
        Self { index_a, index_b }
    }

    /// Match rows between tables A and B
    pub fn match_rows(&self, table_a: &Table, table_b: &Table) -> KeyMatch {
        let unmatched_a = unmatched_rows(table_a, self.index_a, self.index_b);
        let unmatched_b = unmatched_rows(table_b, self.index_b, self.index_a);

        let matched = self
            .index_a
            .iter()
            .filter_map(|(key, row_a)| {
                self.index_b.position(key).map(|row_b| MatchedRow {
                    key: key.clone(),
                    row_a,
                    row_b,
                })
            })
            .collect();

        KeyMatch {
            unmatched_a,
            unmatched_b,
            matched,
        }
    }
}

/// Every row of `table` (duplicates included) whose key is missing from `other`
fn unmatched_rows(table: &Table, own: &KeyIndex, other: &KeyIndex) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !other.contains(&own.key_of(row)))
        .map(|(idx, _)| idx)
        .collect()
}
