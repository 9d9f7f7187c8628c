//! In-memory table source implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::TableSource;
use crate::types::{RawTable, TbResult, TrialBalanceError};

/// In-memory table source for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: Arc<RwLock<HashMap<String, RawTable>>>,
}

impl MemorySource {
    /// Create an empty memory source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under a name, replacing any previous table
    pub fn insert_table(&self, name: &str, table: RawTable) {
        self.tables
            .write()
            .unwrap()
            .insert(name.to_string(), table);
    }

    /// Remove all registered tables (useful for testing)
    pub fn clear(&self) {
        self.tables.write().unwrap().clear();
    }
}

#[async_trait]
impl TableSource for MemorySource {
    async fn fetch_table(&self, name: &str) -> TbResult<RawTable> {
        self.tables
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| TrialBalanceError::TableNotFound(name.to_string()))
    }

    async fn list_tables(&self) -> TbResult<Vec<String>> {
        let mut names: Vec<String> = self.tables.read().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    #[tokio::test]
    async fn test_fetch_and_list() {
        let source = MemorySource::new();
        let mut table = RawTable::new(vec!["account_number".to_string()]);
        table.push_row(vec![CellValue::from("1000")]);
        source.insert_table("sap_2024", table);

        let fetched = source.fetch_table("sap_2024").await.unwrap();
        assert_eq!(fetched.len(), 1);

        assert_eq!(
            source.list_tables().await.unwrap(),
            vec!["sap_2024".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_table_errors() {
        let source = MemorySource::new();
        let err = source.fetch_table("nope").await.unwrap_err();
        assert!(matches!(err, TrialBalanceError::TableNotFound(_)));
    }
}
