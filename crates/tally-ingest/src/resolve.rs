//! Header lookup.
//!
//! Matching is exact after trimming and lower-casing; there is no fuzzy
//! matching. The first alias of a field that exists in the row wins.

use std::collections::HashMap;

use tally_core::cell::{CellValue, Row};
use tally_core::enums::Field;

use crate::aliases::AliasTable;

/// Case-folded view of one row's headers, built once per row.
///
/// When a row repeats a header (in any casing), the leftmost column wins.
#[derive(Debug)]
pub struct HeaderIndex<'r> {
    cells: HashMap<String, &'r CellValue>,
}

impl<'r> HeaderIndex<'r> {
    #[must_use]
    pub fn new(row: &'r Row) -> Self {
        let mut cells = HashMap::with_capacity(row.len());
        for (header, value) in row.iter() {
            let key = fold(header);
            if key.is_empty() {
                continue;
            }
            cells.entry(key).or_insert(value);
        }
        Self { cells }
    }

    /// Number of distinct readable headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raw value of the first alias of `field` present in the row, or `None`
    /// when no alias matches.
    #[must_use]
    pub fn resolve(&self, table: &AliasTable, field: Field) -> Option<&'r CellValue> {
        table
            .aliases(field)
            .iter()
            .find_map(|alias| self.cells.get(&fold(alias)).copied())
    }
}

/// One-off lookup without building an index.
#[must_use]
pub fn resolve<'r>(row: &'r Row, table: &AliasTable, field: Field) -> Option<&'r CellValue> {
    HeaderIndex::new(row).resolve(table, field)
}

fn fold(header: &str) -> String {
    header.trim().to_lowercase()
}
