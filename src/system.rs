//! Pipeline orchestrator that coordinates loading, filtering, and analysis

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::audit::AuditLog;
use crate::category::{AccountCategorizer, CategorySummary, Categorization};
use crate::compliance::{validate_trial_balance, ComplianceReport};
use crate::period::{filter_by_period, parse_period, PeriodFilterResult, PeriodSpec};
use crate::provision::TaxProvisionExport;
use crate::schema::SchemaMapper;
use crate::traits::TableSource;
use crate::types::{NormalizedTable, TbResult};
use crate::variance::{VarianceAnalyzer, VarianceReport};

/// Number of accounts included in a dataset summary sample
const SUMMARY_SAMPLE_SIZE: usize = 10;

/// A glance at one account for dataset summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSample {
    pub account_number: String,
    pub account_name: String,
    pub net_balance: BigDecimal,
}

/// Load-time summary of one normalized dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset label (the source table name)
    pub label: String,
    /// Number of normalized records
    pub total_records: usize,
    /// Sum of all debit amounts
    pub total_debits: BigDecimal,
    /// Sum of all credit amounts
    pub total_credits: BigDecimal,
    /// `total_debits - total_credits` (signed)
    pub balance_difference: BigDecimal,
    /// First few accounts for a quick visual check
    pub sample_accounts: Vec<AccountSample>,
}

impl DatasetSummary {
    fn from_table(table: &NormalizedTable) -> Self {
        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);
        for record in &table.records {
            total_debits += &record.debit;
            total_credits += &record.credit;
        }
        let balance_difference = &total_debits - &total_credits;

        let sample_accounts = table
            .records
            .iter()
            .take(SUMMARY_SAMPLE_SIZE)
            .map(|record| AccountSample {
                account_number: record.account_number.clone(),
                account_name: record.account_name.clone(),
                net_balance: record.net_balance(),
            })
            .collect();

        Self {
            label: table.label.clone(),
            total_records: table.len(),
            total_debits,
            total_credits,
            balance_difference,
            sample_accounts,
        }
    }
}

/// A normalized dataset together with its load-time summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedDataset {
    pub table: NormalizedTable,
    pub summary: DatasetSummary,
}

/// Main processing system that orchestrates schema mapping, period filtering,
/// categorization, variance analysis, and compliance validation over tables
/// supplied by a [`TableSource`].
///
/// Every analysis step appends to an in-memory audit log that the caller can
/// inspect or serialize alongside the reports.
pub struct TrialBalanceSystem<S: TableSource> {
    source: S,
    mapper: SchemaMapper,
    categorizer: AccountCategorizer,
    analyzer: VarianceAnalyzer,
    audit: AuditLog,
}

impl<S: TableSource> TrialBalanceSystem<S> {
    /// Create a system with default mapper, categorizer, and analyzer
    pub fn new(source: S) -> Self {
        Self::with_components(
            source,
            SchemaMapper::new(),
            AccountCategorizer::default(),
            VarianceAnalyzer::new(),
        )
    }

    /// Create a system with explicitly configured components.
    ///
    /// All configuration the core consumes (synonym tables, category rules,
    /// materiality threshold) arrives here as structs; nothing is read from
    /// the process environment.
    pub fn with_components(
        source: S,
        mapper: SchemaMapper,
        categorizer: AccountCategorizer,
        analyzer: VarianceAnalyzer,
    ) -> Self {
        Self {
            source,
            mapper,
            categorizer,
            analyzer,
            audit: AuditLog::new(),
        }
    }

    /// Fetch a raw table, detect its schema, and standardize it.
    ///
    /// Mapping gaps degrade to defaults rather than failing; the resulting
    /// [`crate::types::ColumnMapping`] travels with the table for diagnostics.
    pub async fn load_dataset(&mut self, name: &str) -> TbResult<LoadedDataset> {
        let raw = self.source.fetch_table(name).await?;
        let table = self.mapper.normalize(&raw, name);
        let summary = DatasetSummary::from_table(&table);

        let mut details = HashMap::new();
        details.insert("table".to_string(), name.to_string());
        details.insert("records".to_string(), table.len().to_string());
        details.insert(
            "mapped_fields".to_string(),
            table.mapping.mapped_count().to_string(),
        );
        details.insert(
            "unmapped_fields".to_string(),
            format!("{:?}", table.mapping.unmapped_fields()),
        );
        self.audit.record("schema_mapper", "load_dataset", details);

        Ok(LoadedDataset { table, summary })
    }

    /// Load several datasets by name.
    ///
    /// Each load is independent with no shared mutable state between tables,
    /// so callers needing throughput can instead fetch tables concurrently
    /// and normalize each with a [`SchemaMapper`] directly.
    pub async fn load_datasets(&mut self, names: &[&str]) -> TbResult<Vec<LoadedDataset>> {
        let mut datasets = Vec::with_capacity(names.len());
        for name in names {
            datasets.push(self.load_dataset(name).await?);
        }
        Ok(datasets)
    }

    /// Parse a free-text period expression into a [`PeriodSpec`]
    pub fn parse_period(&self, text: &str) -> TbResult<PeriodSpec> {
        parse_period(text)
    }

    /// Parse a period expression and filter a table to it.
    ///
    /// # Errors
    ///
    /// Fails only when the period text has no usable year; the caller may
    /// then choose to treat the dataset as unfiltered.
    pub fn filter_period(
        &mut self,
        table: &NormalizedTable,
        period_text: &str,
    ) -> TbResult<PeriodFilterResult> {
        let period = parse_period(period_text)?;
        let result = filter_by_period(table, &period);

        let mut details = HashMap::new();
        details.insert("table".to_string(), table.label.clone());
        details.insert("period".to_string(), result.period.label.clone());
        details.insert("kept".to_string(), result.table.len().to_string());
        details.insert("outcome".to_string(), format!("{:?}", result.outcome));
        self.audit.record("period_filter", "filter_period", details);

        Ok(result)
    }

    /// Compare two normalized tables period-over-period
    pub fn compare_periods(
        &mut self,
        current: &NormalizedTable,
        prior: &NormalizedTable,
    ) -> VarianceReport {
        let report = self.analyzer.compare(current, prior);

        let mut details = HashMap::new();
        details.insert("current".to_string(), report.current_label.clone());
        details.insert("prior".to_string(), report.prior_label.clone());
        details.insert(
            "material_variances".to_string(),
            report.material_count().to_string(),
        );
        details.insert(
            "new_accounts".to_string(),
            report.new_accounts.len().to_string(),
        );
        self.audit
            .record("variance_analyzer", "variance_analysis", details);

        report
    }

    /// Categorize a single account number
    pub fn categorize_account(&self, account_number: &str) -> Categorization {
        self.categorizer.categorize(account_number)
    }

    /// Produce a per-category breakdown of a normalized table
    pub fn categorize_table(&mut self, table: &NormalizedTable) -> CategorySummary {
        let summary = self.categorizer.summarize_table(table);

        let mut details = HashMap::new();
        details.insert("table".to_string(), table.label.clone());
        details.insert("categories".to_string(), summary.totals.len().to_string());
        self.audit
            .record("account_categorizer", "categorize_table", details);

        summary
    }

    /// Run compliance validation over a normalized table
    pub fn validate(&mut self, table: &NormalizedTable) -> ComplianceReport {
        let report = validate_trial_balance(table);

        let mut details = HashMap::new();
        details.insert("table".to_string(), table.label.clone());
        details.insert("status".to_string(), format!("{:?}", report.status));
        details.insert(
            "duplicates".to_string(),
            report.duplicate_accounts.to_string(),
        );
        self.audit
            .record("compliance_validator", "validate_trial_balance", details);

        report
    }

    /// Shape a normalized table for a tax provision system
    pub fn prepare_provision_export(
        &mut self,
        table: &NormalizedTable,
        entity_id: Option<&str>,
        period_end: NaiveDate,
        currency: &str,
    ) -> TaxProvisionExport {
        let export = TaxProvisionExport::from_table(table, entity_id, period_end, currency);

        let mut details = HashMap::new();
        details.insert("table".to_string(), table.label.clone());
        details.insert(
            "accounts".to_string(),
            export.account_details.len().to_string(),
        );
        self.audit
            .record("provision_formatter", "prepare_provision_export", details);

        export
    }

    /// The audit trail accumulated so far
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::FilterOutcome;
    use crate::types::{CellValue, RawTable};
    use crate::utils::MemorySource;

    fn sap_style_table() -> RawTable {
        let mut raw = RawTable::new(vec![
            "gl_account".to_string(),
            "gl_description".to_string(),
            "dr_amount".to_string(),
            "cr_amount".to_string(),
            "period_ending".to_string(),
        ]);
        raw.push_row(vec![
            CellValue::from("1000"),
            CellValue::from("Cash"),
            CellValue::from(150000),
            CellValue::from(0),
            CellValue::from("2024-01-31"),
        ]);
        raw.push_row(vec![
            CellValue::from("4000"),
            CellValue::from("Sales Revenue"),
            CellValue::from(0),
            CellValue::from(150000),
            CellValue::from("2024-05-31"),
        ]);
        raw
    }

    #[tokio::test]
    async fn test_load_dataset_summary_matches_compliance_totals() {
        let source = MemorySource::new();
        source.insert_table("sap_2024", sap_style_table());

        let mut system = TrialBalanceSystem::new(source);
        let dataset = system.load_dataset("sap_2024").await.unwrap();

        assert_eq!(dataset.summary.total_records, 2);
        assert_eq!(dataset.summary.sample_accounts[0].account_number, "1000");

        let report = system.validate(&dataset.table);
        assert_eq!(report.total_debits, dataset.summary.total_debits);
        assert_eq!(report.total_credits, dataset.summary.total_credits);
    }

    #[tokio::test]
    async fn test_filter_period_drops_out_of_range() {
        let source = MemorySource::new();
        source.insert_table("sap_2024", sap_style_table());

        let mut system = TrialBalanceSystem::new(source);
        let dataset = system.load_dataset("sap_2024").await.unwrap();

        let filtered = system.filter_period(&dataset.table, "Q1 2024").unwrap();
        assert_eq!(filtered.table.len(), 1);
        assert_eq!(filtered.table.records[0].account_number, "1000");
        assert!(matches!(filtered.outcome, FilterOutcome::Applied { .. }));
    }

    #[tokio::test]
    async fn test_bad_period_text_is_fatal_to_filter_only() {
        let source = MemorySource::new();
        source.insert_table("sap_2024", sap_style_table());

        let mut system = TrialBalanceSystem::new(source);
        let dataset = system.load_dataset("sap_2024").await.unwrap();

        assert!(system.filter_period(&dataset.table, "last quarter").is_err());
        // The dataset itself is untouched and still usable
        assert_eq!(dataset.table.len(), 2);
    }

    #[tokio::test]
    async fn test_audit_trail_records_each_step() {
        let source = MemorySource::new();
        source.insert_table("sap_2024", sap_style_table());
        source.insert_table("sap_2023", sap_style_table());

        let mut system = TrialBalanceSystem::new(source);
        let datasets = system.load_datasets(&["sap_2024", "sap_2023"]).await.unwrap();
        system.compare_periods(&datasets[0].table, &datasets[1].table);
        system.validate(&datasets[0].table);
        system.categorize_table(&datasets[0].table);

        let actions: Vec<&str> = system
            .audit_log()
            .entries()
            .iter()
            .map(|e| e.action.as_str())
            .collect();
        assert_eq!(
            actions,
            vec![
                "load_dataset",
                "load_dataset",
                "variance_analysis",
                "validate_trial_balance",
                "categorize_table",
            ]
        );
    }
}
