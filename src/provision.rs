//! Formatting of validated trial balances for tax provision systems

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::NormalizedTable;

/// One account row formatted for upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionAccountDetail {
    pub account_number: String,
    pub account_name: String,
    pub debit_amount: BigDecimal,
    pub credit_amount: BigDecimal,
    pub net_balance: BigDecimal,
    /// Originating system; falls back to the table label
    pub source_system: String,
}

/// A validated trial balance shaped for a tax provision system.
///
/// Pure formatting over an already-normalized table; writing the result
/// anywhere is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxProvisionExport {
    pub entity_id: String,
    pub period_end: NaiveDate,
    pub currency: String,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    pub account_details: Vec<ProvisionAccountDetail>,
}

impl TaxProvisionExport {
    /// Shape a normalized table for upload.
    ///
    /// The entity id is taken from the first record that carries one unless
    /// overridden; the table label becomes the per-account source system.
    pub fn from_table(
        table: &NormalizedTable,
        entity_id: Option<&str>,
        period_end: NaiveDate,
        currency: &str,
    ) -> Self {
        let resolved_entity = entity_id
            .map(str::to_string)
            .or_else(|| {
                table
                    .records
                    .iter()
                    .find_map(|record| record.entity_id.clone())
            })
            .unwrap_or_else(|| "UNSPECIFIED".to_string());

        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);
        let account_details = table
            .records
            .iter()
            .map(|record| {
                total_debits += &record.debit;
                total_credits += &record.credit;
                ProvisionAccountDetail {
                    account_number: record.account_number.clone(),
                    account_name: record.account_name.clone(),
                    debit_amount: record.debit.clone(),
                    credit_amount: record.credit.clone(),
                    net_balance: record.net_balance(),
                    source_system: table.label.clone(),
                }
            })
            .collect();

        Self {
            entity_id: resolved_entity,
            period_end,
            currency: currency.to_string(),
            total_debits,
            total_credits,
            account_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaMapper;
    use crate::types::{CellValue, RawTable};

    fn sample_table() -> NormalizedTable {
        let mut raw = RawTable::new(vec![
            "account_number".to_string(),
            "account_name".to_string(),
            "debit".to_string(),
            "credit".to_string(),
            "entity_id".to_string(),
        ]);
        raw.push_row(vec![
            CellValue::from("1000"),
            CellValue::from("Cash"),
            CellValue::from(150000),
            CellValue::from(0),
            CellValue::from("ENT001"),
        ]);
        raw.push_row(vec![
            CellValue::from("4000"),
            CellValue::from("Revenue"),
            CellValue::from(0),
            CellValue::from(150000),
            CellValue::from("ENT001"),
        ]);
        SchemaMapper::new().normalize(&raw, "SAP")
    }

    #[test]
    fn test_export_totals_and_details() {
        let export = TaxProvisionExport::from_table(
            &sample_table(),
            None,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            "USD",
        );

        assert_eq!(export.entity_id, "ENT001");
        assert_eq!(export.total_debits, BigDecimal::from(150000));
        assert_eq!(export.total_credits, BigDecimal::from(150000));
        assert_eq!(export.account_details.len(), 2);

        let cash = &export.account_details[0];
        assert_eq!(cash.net_balance, BigDecimal::from(150000));
        assert_eq!(cash.source_system, "SAP");
    }

    #[test]
    fn test_explicit_entity_overrides_records() {
        let export = TaxProvisionExport::from_table(
            &sample_table(),
            Some("ENT999"),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            "USD",
        );
        assert_eq!(export.entity_id, "ENT999");
    }

    #[test]
    fn test_export_serializes_to_json() {
        let export = TaxProvisionExport::from_table(
            &sample_table(),
            None,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            "USD",
        );
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"entity_id\":\"ENT001\""));
        assert!(json.contains("account_details"));
    }
}
