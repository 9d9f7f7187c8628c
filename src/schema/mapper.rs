//! Column mapping detection and table standardization

use bigdecimal::BigDecimal;
use std::collections::HashMap;

use crate::schema::SynonymTable;
use crate::types::{
    CanonicalField, CellValue, ColumnMapping, NormalizedRecord, NormalizedTable, RawTable,
    UNKNOWN_SENTINEL,
};

/// Maps arbitrary export schemas onto the canonical account-balance schema.
///
/// Detection is a pure function of the column names plus the synonym table;
/// it never fails. Fields that cannot be inferred fall back to explicit
/// defaults during standardization, so data-quality gaps surface in the
/// [`ColumnMapping`] diagnostics and downstream compliance checks instead of
/// aborting the load.
#[derive(Debug, Clone, Default)]
pub struct SchemaMapper {
    synonyms: SynonymTable,
}

impl SchemaMapper {
    /// Create a mapper with the default synonym table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper with a custom synonym table
    pub fn with_synonyms(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Detect which raw column supplies each canonical field.
    ///
    /// Per canonical field, in order, first match wins:
    /// 1. exact case-insensitive match of the canonical field name
    /// 2. exact case-insensitive match of a configured synonym
    /// 3. substring match of a synonym token within the lowercased column name
    pub fn detect_schema(&self, columns: &[String]) -> ColumnMapping {
        let lowered: Vec<String> = columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();

        let mut resolved = HashMap::new();
        for field in CanonicalField::ALL {
            if let Some(column) = self.resolve_field(field, columns, &lowered) {
                resolved.insert(field, column);
            }
        }
        ColumnMapping::new(resolved)
    }

    fn resolve_field(
        &self,
        field: CanonicalField,
        columns: &[String],
        lowered: &[String],
    ) -> Option<String> {
        // Tier 1: exact canonical name
        if let Some(i) = lowered.iter().position(|c| c == field.name()) {
            return Some(columns[i].clone());
        }

        // Tier 2: exact synonym
        let synonyms = self.synonyms.synonyms_for(field);
        for synonym in synonyms {
            if let Some(i) = lowered.iter().position(|c| c == synonym) {
                return Some(columns[i].clone());
            }
        }

        // Tier 3: synonym token contained in the column name
        for (i, column) in lowered.iter().enumerate() {
            if synonyms.iter().any(|syn| column.contains(syn.as_str())) {
                return Some(columns[i].clone());
            }
        }

        None
    }

    /// Apply a column mapping to every row, producing a normalized table.
    ///
    /// Debit/credit cells are coerced to numeric with non-numeric and missing
    /// values treated as zero; unmapped identifier fields fall back to the
    /// "Unknown" sentinel, unmapped amounts to zero. The operation is
    /// idempotent: standardizing an already-standardized table is a no-op.
    pub fn standardize(
        &self,
        raw: &RawTable,
        mapping: &ColumnMapping,
        label: &str,
    ) -> NormalizedTable {
        let records = raw
            .rows
            .iter()
            .map(|row| self.standardize_row(row, mapping))
            .collect();

        NormalizedTable {
            label: label.to_string(),
            mapping: mapping.clone(),
            records,
        }
    }

    /// Detect the schema and standardize in one step
    pub fn normalize(&self, raw: &RawTable, label: &str) -> NormalizedTable {
        let mapping = self.detect_schema(&raw.columns);
        self.standardize(raw, &mapping, label)
    }

    fn standardize_row(
        &self,
        row: &HashMap<String, CellValue>,
        mapping: &ColumnMapping,
    ) -> NormalizedRecord {
        let cell = |field: CanonicalField| -> Option<&CellValue> {
            mapping.column_for(field).and_then(|column| row.get(column))
        };

        let identifier = |field: CanonicalField| -> String {
            cell(field)
                .and_then(CellValue::to_text)
                .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string())
        };

        let amount = |field: CanonicalField| -> BigDecimal {
            cell(field)
                .map(CellValue::to_amount)
                .unwrap_or_else(|| BigDecimal::from(0))
        };

        NormalizedRecord {
            account_number: identifier(CanonicalField::AccountNumber),
            account_name: identifier(CanonicalField::AccountName),
            debit: amount(CanonicalField::Debit),
            credit: amount(CanonicalField::Credit),
            period: cell(CanonicalField::Period).and_then(CellValue::to_date),
            entity_id: cell(CanonicalField::EntityId).and_then(CellValue::to_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_wins() {
        let mapper = SchemaMapper::new();
        let mapping = mapper.detect_schema(&columns(&[
            "Account_Number",
            "account_name",
            "debit",
            "credit",
        ]));
        assert_eq!(
            mapping.column_for(CanonicalField::AccountNumber),
            Some("Account_Number")
        );
        assert_eq!(mapping.column_for(CanonicalField::Debit), Some("debit"));
    }

    #[test]
    fn test_synonym_match() {
        let mapper = SchemaMapper::new();
        let mapping = mapper.detect_schema(&columns(&[
            "gl_account",
            "gl_description",
            "dr_amount",
            "cr_amount",
            "period_ending",
        ]));
        assert_eq!(
            mapping.column_for(CanonicalField::AccountNumber),
            Some("gl_account")
        );
        assert_eq!(
            mapping.column_for(CanonicalField::AccountName),
            Some("gl_description")
        );
        assert_eq!(mapping.column_for(CanonicalField::Debit), Some("dr_amount"));
        assert_eq!(
            mapping.column_for(CanonicalField::Credit),
            Some("cr_amount")
        );
        assert_eq!(
            mapping.column_for(CanonicalField::Period),
            Some("period_ending")
        );
    }

    #[test]
    fn test_substring_match() {
        let mapper = SchemaMapper::new();
        let mapping = mapper.detect_schema(&columns(&["sap_gl_account_ref", "total_dr_amount_fy"]));
        assert_eq!(
            mapping.column_for(CanonicalField::AccountNumber),
            Some("sap_gl_account_ref")
        );
        assert_eq!(
            mapping.column_for(CanonicalField::Debit),
            Some("total_dr_amount_fy")
        );
    }

    #[test]
    fn test_unresolvable_columns_reported() {
        let mapper = SchemaMapper::new();
        let mapping = mapper.detect_schema(&columns(&["foo", "bar"]));
        assert_eq!(mapping.mapped_count(), 0);
        assert_eq!(mapping.unmapped_fields().len(), CanonicalField::ALL.len());
    }

    #[test]
    fn test_standardize_defaults() {
        let mapper = SchemaMapper::new();
        let mut raw = RawTable::new(columns(&["gl_account"]));
        raw.push_row(vec![CellValue::from("1000")]);

        let normalized = mapper.normalize(&raw, "sap");
        let record = &normalized.records[0];
        assert_eq!(record.account_number, "1000");
        assert_eq!(record.account_name, UNKNOWN_SENTINEL);
        assert_eq!(record.debit, BigDecimal::from(0));
        assert_eq!(record.credit, BigDecimal::from(0));
        assert_eq!(record.period, None);
        assert_eq!(record.entity_id, None);
    }

    #[test]
    fn test_non_numeric_amounts_coerce_to_zero() {
        let mapper = SchemaMapper::new();
        let mut raw = RawTable::new(columns(&["account_number", "debit", "credit"]));
        raw.push_row(vec![
            CellValue::from("1000"),
            CellValue::from("oops"),
            CellValue::Empty,
        ]);

        let normalized = mapper.normalize(&raw, "test");
        assert_eq!(normalized.records[0].debit, BigDecimal::from(0));
        assert_eq!(normalized.records[0].credit, BigDecimal::from(0));
    }

    #[test]
    fn test_standardize_is_idempotent() {
        let mapper = SchemaMapper::new();
        let mut raw = RawTable::new(columns(&[
            "gl_account",
            "gl_description",
            "dr_amount",
            "cr_amount",
            "period_ending",
        ]));
        raw.push_row(vec![
            CellValue::from("1000"),
            CellValue::from("Cash"),
            CellValue::from("150000"),
            CellValue::from("0"),
            CellValue::from("2024-01-31"),
        ]);

        let once = mapper.normalize(&raw, "sap");
        let again = mapper.normalize(&once.to_raw_table(), "sap");
        assert_eq!(again.records, once.records);
    }
}
