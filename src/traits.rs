//! Traits for table sourcing and extensibility

use async_trait::async_trait;

use crate::types::{RawTable, TbResult};

/// Abstraction over where raw tabular exports come from.
///
/// The core never reads files itself; the surrounding orchestration layer
/// implements this trait over CSV files, spreadsheets, or HTTP responses.
/// Each fetch is independent, so callers are free to load several tables
/// concurrently; implementations must not rely on call ordering.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch a raw table by name
    async fn fetch_table(&self, name: &str) -> TbResult<RawTable>;

    /// Names of the tables this source can supply
    async fn list_tables(&self) -> TbResult<Vec<String>>;
}
