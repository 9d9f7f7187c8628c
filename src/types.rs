//! Core types and data structures for trial balance processing

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Sentinel used when an identifier column could not be mapped or a cell is blank
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// The canonical fields every heterogeneous ledger export is normalized onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// General ledger account number (required, unique within a period)
    AccountNumber,
    /// Human-readable account description
    AccountName,
    /// Debit amount (non-negative)
    Debit,
    /// Credit amount (non-negative)
    Credit,
    /// Reporting period date (optional)
    Period,
    /// Legal entity identifier (optional)
    EntityId,
}

impl CanonicalField {
    /// All canonical fields in mapping-resolution order
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::AccountNumber,
        CanonicalField::AccountName,
        CanonicalField::Debit,
        CanonicalField::Credit,
        CanonicalField::Period,
        CanonicalField::EntityId,
    ];

    /// Canonical column name as it appears in a standardized table
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::AccountNumber => "account_number",
            CanonicalField::AccountName => "account_name",
            CanonicalField::Debit => "debit",
            CanonicalField::Credit => "credit",
            CanonicalField::Period => "period",
            CanonicalField::EntityId => "entity_id",
        }
    }

    /// Whether the field identifies an account (gets the "Unknown" sentinel when unmapped)
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            CanonicalField::AccountNumber | CanonicalField::AccountName
        )
    }

    /// Whether the field carries a monetary amount (defaults to zero when unmapped)
    pub fn is_amount(&self) -> bool {
        matches!(self, CanonicalField::Debit | CanonicalField::Credit)
    }
}

/// A single cell of a caller-supplied table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Numeric cell content
    Number(BigDecimal),
    /// Textual cell content
    Text(String),
    /// Missing cell
    Empty,
}

impl CellValue {
    /// Coerce the cell to a monetary amount.
    ///
    /// Non-numeric or missing values coerce to zero rather than failing, so a
    /// single malformed amount never aborts a whole table load.
    pub fn to_amount(&self) -> BigDecimal {
        match self {
            CellValue::Number(n) => n.clone(),
            CellValue::Text(s) => {
                let cleaned = s.trim().replace(',', "");
                BigDecimal::from_str(&cleaned).unwrap_or_else(|_| BigDecimal::from(0))
            }
            CellValue::Empty => BigDecimal::from(0),
        }
    }

    /// Coerce the cell to a date, trying the layouts seen in ledger exports
    pub fn to_date(&self) -> Option<NaiveDate> {
        let text = match self {
            CellValue::Text(s) => s.trim(),
            _ => return None,
        };
        const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    }

    /// Coerce the cell to text, if present
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Empty => None,
        }
    }

    /// Whether the cell is missing or blank
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<BigDecimal> for CellValue {
    fn from(value: BigDecimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(BigDecimal::from(value))
    }
}

/// A raw tabular export with caller-controlled column names and order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names in source order
    pub columns: Vec<String>,
    /// Rows keyed by column name
    pub rows: Vec<HashMap<String, CellValue>>,
}

impl RawTable {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row of cells in column order; missing trailing cells become empty
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        let mut row = HashMap::new();
        for (i, column) in self.columns.iter().enumerate() {
            let cell = cells.get(i).cloned().unwrap_or(CellValue::Empty);
            row.insert(column.clone(), cell);
        }
        self.rows.push(row);
    }

    /// Number of rows in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolved mapping from canonical fields to raw column names for one table.
///
/// Built once per table by schema detection and immutable afterwards; fields
/// that could not be resolved are reported rather than silently absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: HashMap<CanonicalField, String>,
}

impl ColumnMapping {
    pub(crate) fn new(columns: HashMap<CanonicalField, String>) -> Self {
        Self { columns }
    }

    /// The raw column chosen to supply a canonical field, if any
    pub fn column_for(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Whether a canonical field resolved to a raw column
    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Canonical fields that resolved to a raw column, in canonical order
    pub fn mapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_mapped(*f))
            .collect()
    }

    /// Canonical fields that did not resolve and will fall back to defaults
    pub fn unmapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|f| !self.is_mapped(*f))
            .collect()
    }

    /// Number of canonical fields that resolved
    pub fn mapped_count(&self) -> usize {
        self.columns.len()
    }
}

/// A single record conforming to the canonical schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// General ledger account number ("Unknown" when the source had none)
    pub account_number: String,
    /// Account description ("Unknown" when the source had none)
    pub account_name: String,
    /// Debit amount
    pub debit: BigDecimal,
    /// Credit amount
    pub credit: BigDecimal,
    /// Reporting period date, if the source supplied a parseable one
    pub period: Option<NaiveDate>,
    /// Legal entity identifier, if supplied
    pub entity_id: Option<String>,
}

impl NormalizedRecord {
    /// Net balance, recomputed from debit and credit on every call
    pub fn net_balance(&self) -> BigDecimal {
        &self.debit - &self.credit
    }

    /// Whether the record carries a real account number rather than the sentinel
    pub fn has_account_number(&self) -> bool {
        !self.account_number.is_empty() && self.account_number != UNKNOWN_SENTINEL
    }

    /// Whether the record carries a real account name rather than the sentinel
    pub fn has_account_name(&self) -> bool {
        !self.account_name.is_empty() && self.account_name != UNKNOWN_SENTINEL
    }
}

/// A table of records normalized onto the canonical schema, together with the
/// column mapping that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// Caller-supplied label for the dataset (file name, source system, etc.)
    pub label: String,
    /// The column mapping used during standardization (diagnostics)
    pub mapping: ColumnMapping,
    /// Normalized records
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source table had a period column mapped at all
    pub fn has_period_column(&self) -> bool {
        self.mapping.is_mapped(CanonicalField::Period)
    }

    /// Render the table back to raw form under canonical column names.
    ///
    /// Useful for diagnostics and for verifying that standardization is
    /// idempotent: re-standardizing the result reproduces this table.
    pub fn to_raw_table(&self) -> RawTable {
        let columns: Vec<String> = CanonicalField::ALL
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        let mut raw = RawTable::new(columns);
        for record in &self.records {
            raw.push_row(vec![
                CellValue::Text(record.account_number.clone()),
                CellValue::Text(record.account_name.clone()),
                CellValue::Number(record.debit.clone()),
                CellValue::Number(record.credit.clone()),
                match record.period {
                    Some(date) => CellValue::Text(date.format("%Y-%m-%d").to_string()),
                    None => CellValue::Empty,
                },
                match &record.entity_id {
                    Some(entity) => CellValue::Text(entity.clone()),
                    None => CellValue::Empty,
                },
            ]);
        }
        raw
    }
}

/// Errors that can occur in the trial balance core
#[derive(Debug, thiserror::Error)]
pub enum TrialBalanceError {
    #[error("Period parse error: {0}")]
    PeriodParse(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Source error: {0}")]
    Source(String),
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for trial balance operations
pub type TbResult<T> = Result<T, TrialBalanceError>;
