//! Schema comparison logic

use serde::{Deserialize, Serialize};

use crate::model::{CellType, Table};

/// Types of schema changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaChange {
    /// Column exists only in table A
    OnlyInA { name: String, index: usize },
    /// Column exists only in table B
    OnlyInB { name: String, index: usize },
    /// Column inferred type differs between the tables
    TypeChanged {
        name: String,
        type_a: CellType,
        type_b: CellType,
    },
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::OnlyInA { name, index } => {
                write!(f, "- {} (only in A, position {})", name, index)
            }
            SchemaChange::OnlyInB { name, index } => {
                write!(f, "+ {} (only in B, position {})", name, index)
            }
            SchemaChange::TypeChanged {
                name,
                type_a,
                type_b,
            } => {
                write!(f, "~ {} (type {} → {})", name, type_a, type_b)
            }
        }
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare schemas of two tables
    pub fn compare(table_a: &Table, table_b: &Table) -> Vec<SchemaChange> {
        let mut changes = Vec::new();

        for col in &table_a.columns {
            if table_b.column(&col.name).is_none() {
                changes.push(SchemaChange::OnlyInA {
                    name: col.name.clone(),
                    index: col.index,
                });
            }
        }

        for col in &table_b.columns {
            if table_a.column(&col.name).is_none() {
                changes.push(SchemaChange::OnlyInB {
                    name: col.name.clone(),
                    index: col.index,
                });
            }
        }

        // Null columns carry no type information
        for col_a in &table_a.columns {
            if let Some(col_b) = table_b.column(&col_a.name) {
                let (type_a, type_b) = (col_a.inferred_type, col_b.inferred_type);
                if type_a != type_b && type_a != CellType::Null && type_b != CellType::Null {
                    changes.push(SchemaChange::TypeChanged {
                        name: col_a.name.clone(),
                        type_a,
                        type_b,
                    });
                }
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_compare_schemas() {
        let a = Table::from_columns(vec![
            ("id", vec![CellValue::Int(1)]),
            ("old", vec![CellValue::Int(1)]),
            ("price", vec![CellValue::Int(1)]),
        ])
        .unwrap();
        let b = Table::from_columns(vec![
            ("id", vec![CellValue::Int(1)]),
            ("price", vec!["1".into()]),
            ("new", vec![CellValue::Int(1)]),
        ])
        .unwrap();

        let changes = SchemaDiff::compare(&a, &b);

        assert_eq!(
            changes,
            vec![
                SchemaChange::OnlyInA { name: "old".into(), index: 1 },
                SchemaChange::OnlyInB { name: "new".into(), index: 2 },
                SchemaChange::TypeChanged {
                    name: "price".into(),
                    type_a: CellType::Int,
                    type_b: CellType::String,
                },
            ]
        );
    }
}
