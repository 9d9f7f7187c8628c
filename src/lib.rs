//! # Trial Balance Core
//!
//! A library for normalizing heterogeneous general ledger exports onto a
//! canonical account-balance schema and comparing fiscal periods.
//!
//! ## Features
//!
//! - **Schema mapping**: automatic detection of which raw column supplies each
//!   canonical field, with synonym and substring matching
//! - **Period handling**: free-text fiscal period parsing ("Q2 2024",
//!   "JAN 2024", "2024") and inclusive date-range filtering
//! - **Account categorization**: range-based financial statement categories
//!   and tax sub-categories from validated, non-overlapping rule tables
//! - **Variance analysis**: period-over-period outer joins with materiality
//!   flags and new/dropped account detection
//! - **Compliance validation**: balance equation, missing identifier, and
//!   duplicate account checks with a structured PASSED/FAILED verdict
//! - **Source abstraction**: trait-based table sourcing so the core never
//!   touches the filesystem
//!
//! ## Quick Start
//!
//! ```rust
//! use trialbalance_core::{SchemaMapper, VarianceAnalyzer, CellValue, RawTable};
//!
//! let mut raw = RawTable::new(vec!["gl_account".into(), "dr_amount".into()]);
//! raw.push_row(vec![CellValue::from("1000"), CellValue::from(150000)]);
//!
//! let mapper = SchemaMapper::new();
//! let normalized = mapper.normalize(&raw, "sap_export");
//! assert_eq!(normalized.records[0].account_number, "1000");
//! ```

pub mod audit;
pub mod category;
pub mod compliance;
pub mod period;
pub mod provision;
pub mod schema;
pub mod system;
pub mod traits;
pub mod types;
pub mod utils;
pub mod variance;

// Re-export commonly used types
pub use audit::{AuditEntry, AuditLog};
pub use category::{
    AccountCategorizer, Categorization, CategoryRule, CategoryRuleSet, CategorySummary,
    TaxCategoryTable,
};
pub use compliance::{validate_trial_balance, ComplianceReport, ComplianceStatus};
pub use period::{filter_by_period, parse_period, FilterOutcome, PeriodFilterResult, PeriodKind, PeriodSpec};
pub use provision::TaxProvisionExport;
pub use schema::{SchemaMapper, SynonymTable};
pub use system::{DatasetSummary, LoadedDataset, TrialBalanceSystem};
pub use traits::TableSource;
pub use types::*;
pub use utils::MemorySource;
pub use variance::{VarianceAnalyzer, VarianceEntry, VarianceReport};
