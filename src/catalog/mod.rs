//! Table catalog collaborators
//!
//! The suggestion core needs two things from a data source: the list of known
//! tables and, per table, its column list. Both are consumed through the async
//! [`TableLister`] and [`SchemaFetcher`] traits so the core can run against a
//! live workspace, a static catalog file, or a test fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{CatalogError, Result};

/// A column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column type as reported by the data source (e.g. `datetime`, `string`)
    #[serde(rename = "type", default)]
    pub column_type: String,
}

impl Column {
    /// Create a column from a name and type
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// Lists the tables available in the active data source
#[async_trait]
pub trait TableLister: Send + Sync {
    /// Return the known table names
    async fn list_tables(&self) -> std::result::Result<Vec<String>, CatalogError>;
}

/// Fetches the column list of a single table
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Return the ordered columns of `table`
    async fn fetch_schema(&self, table: &str) -> std::result::Result<Vec<Column>, CatalogError>;
}

/// One table entry in a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tables: Vec<CatalogTable>,
}

/// In-memory catalog, usually loaded from a TOML file.
///
/// ```toml
/// [[tables]]
/// name = "AzureActivity"
/// columns = [
///     { name = "TimeGenerated", type = "datetime" },
///     { name = "OperationName", type = "string" },
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    /// Table names in file order
    tables: Vec<String>,
    /// Columns per table
    schemas: HashMap<String, Vec<Column>>,
}

impl StaticCatalog {
    /// Build a catalog from table entries, keeping their order
    pub fn new(tables: impl IntoIterator<Item = CatalogTable>) -> Self {
        let mut catalog = Self::default();
        for table in tables {
            if !catalog.schemas.contains_key(&table.name) {
                catalog.tables.push(table.name.clone());
            }
            catalog.schemas.insert(table.name, table.columns);
        }
        catalog
    }

    /// Parse a catalog from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| CatalogError::InvalidCatalog(e.to_string()))?;
        Ok(Self::new(file.tables))
    }

    /// Load a catalog from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Table names in catalog order
    pub fn table_names(&self) -> &[String] {
        &self.tables
    }

    /// Columns of a table, if the catalog knows it
    pub fn columns(&self, table: &str) -> Option<&[Column]> {
        self.schemas.get(table).map(Vec::as_slice)
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[async_trait]
impl TableLister for StaticCatalog {
    async fn list_tables(&self) -> std::result::Result<Vec<String>, CatalogError> {
        Ok(self.tables.clone())
    }
}

#[async_trait]
impl SchemaFetcher for StaticCatalog {
    async fn fetch_schema(&self, table: &str) -> std::result::Result<Vec<Column>, CatalogError> {
        self.schemas
            .get(table)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(table.to_string()))
    }
}
