//! Decision table loading
//!
//! Tables are stored as YAML (or JSON, which is valid YAML). A file may hold
//! several tables separated by `---`. Every loaded table is validated.

use crate::error::{Result, SdkError};
use serde::Deserialize;
use std::path::Path;
use tabula_core::DecisionTable;

/// Parse a single decision table from YAML
pub fn table_from_yaml(content: &str) -> Result<DecisionTable> {
    let table: DecisionTable = serde_yaml::from_str(content)?;
    table.validate()?;
    Ok(table)
}

/// Parse every decision table of a multi-document YAML string
pub fn tables_from_yaml(content: &str) -> Result<Vec<DecisionTable>> {
    let mut tables = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let table = DecisionTable::deserialize(document)?;
        table.validate()?;
        tables.push(table);
    }

    Ok(tables)
}

/// Load every decision table of a YAML file
pub fn load_tables(path: impl AsRef<Path>) -> Result<Vec<DecisionTable>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let tables = tables_from_yaml(&content)?;

    if tables.is_empty() {
        return Err(SdkError::InvalidTableFile(format!(
            "File does not contain a decision table: {}",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), tables = tables.len(), "Loaded decision tables");
    Ok(tables)
}
