//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::{resolve_key_columns, row_key, KeyIndex, RowKey, Side};
pub use schema::{CellType, Column};
pub use table::{CellValue, Row, Table};
