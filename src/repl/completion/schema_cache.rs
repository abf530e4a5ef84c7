//! Session-lifetime table schema cache

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Column;

/// Mapping from table name to its ordered column list.
///
/// Cloning is cheap: entries live behind an `Arc` and a write copies the map
/// only when a clone is still holding the old one. Entries are replaced whole
/// and never evicted.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    entries: Arc<HashMap<String, Arc<[Column]>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached columns of `table`; never blocks and never fetches
    pub fn get(&self, table: &str) -> Option<&[Column]> {
        self.entries.get(table).map(|columns| &columns[..])
    }

    /// Store the columns of `table`, replacing any previous entry
    pub fn set(&mut self, table: impl Into<String>, columns: Vec<Column>) {
        Arc::make_mut(&mut self.entries).insert(table.into(), columns.into());
    }

    pub fn contains(&self, table: &str) -> bool {
        self.entries.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached table names, sorted
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }
}
