//! Aggregate compliance checks over a normalized trial balance

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::types::NormalizedTable;

/// Absolute currency-unit tolerance for the balance equation
fn balance_tolerance() -> BigDecimal {
    // Allow for rounding in source systems
    BigDecimal::from_str("0.01").unwrap_or_else(|_| BigDecimal::from(0))
}

/// Overall compliance verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Passed,
    Failed,
}

/// Structured report of aggregate invariants over one normalized table.
///
/// A failed check is a value in this report, never an error: compliance
/// validation is pure reporting with no mutation of its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Label of the validated table
    pub label: String,
    /// Sum of all debit amounts
    pub total_debits: BigDecimal,
    /// Sum of all credit amounts
    pub total_credits: BigDecimal,
    /// `|total_debits - total_credits|`
    pub balance_difference: BigDecimal,
    /// Whether the difference is within the absolute 0.01 tolerance
    pub is_balanced: bool,
    /// Records whose account number is blank or the "Unknown" sentinel
    pub missing_account_numbers: usize,
    /// Records whose account name is blank or the "Unknown" sentinel
    pub missing_account_names: usize,
    /// Surplus occurrences of duplicated account numbers
    pub duplicate_accounts: usize,
    /// Total records examined
    pub total_accounts: usize,
    /// PASSED iff balanced, no missing account numbers, and no duplicates
    pub status: ComplianceStatus,
}

/// Validate one normalized record set against the trial balance invariants.
///
/// Checks the balance equation (total debits equal total credits within an
/// absolute 0.01 tolerance), missing account identifiers, and duplicate
/// account numbers (counted once per surplus occurrence).
pub fn validate_trial_balance(table: &NormalizedTable) -> ComplianceReport {
    let mut total_debits = BigDecimal::from(0);
    let mut total_credits = BigDecimal::from(0);
    let mut missing_account_numbers = 0;
    let mut missing_account_names = 0;
    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    for record in &table.records {
        total_debits += &record.debit;
        total_credits += &record.credit;
        if !record.has_account_number() {
            missing_account_numbers += 1;
        }
        if !record.has_account_name() {
            missing_account_names += 1;
        }
        *occurrences.entry(record.account_number.as_str()).or_insert(0) += 1;
    }

    let duplicate_accounts: usize = occurrences
        .values()
        .filter(|&&count| count > 1)
        .map(|&count| count - 1)
        .sum();

    let balance_difference = (&total_debits - &total_credits).abs();
    let is_balanced = balance_difference < balance_tolerance();

    let status = if is_balanced && missing_account_numbers == 0 && duplicate_accounts == 0 {
        ComplianceStatus::Passed
    } else {
        ComplianceStatus::Failed
    };

    ComplianceReport {
        label: table.label.clone(),
        total_debits,
        total_credits,
        balance_difference,
        is_balanced,
        missing_account_numbers,
        missing_account_names,
        duplicate_accounts,
        total_accounts: table.len(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaMapper;
    use crate::types::{CellValue, RawTable};

    fn table(rows: &[(&str, &str, &str, &str)]) -> NormalizedTable {
        let mut raw = RawTable::new(vec![
            "account_number".to_string(),
            "account_name".to_string(),
            "debit".to_string(),
            "credit".to_string(),
        ]);
        for (number, name, debit, credit) in rows {
            raw.push_row(vec![
                CellValue::from(*number),
                CellValue::from(*name),
                CellValue::from(*debit),
                CellValue::from(*credit),
            ]);
        }
        SchemaMapper::new().normalize(&raw, "test")
    }

    #[test]
    fn test_balanced_set_passes() {
        let report = validate_trial_balance(&table(&[
            ("1000", "Cash", "150000", "0"),
            ("4000", "Revenue", "0", "150000.00"),
        ]));

        assert_eq!(report.total_debits, BigDecimal::from(150000));
        assert_eq!(report.total_credits, BigDecimal::from(150000));
        assert!(report.is_balanced);
        assert_eq!(report.status, ComplianceStatus::Passed);
    }

    #[test]
    fn test_unbalanced_set_fails() {
        let report = validate_trial_balance(&table(&[
            ("1000", "Cash", "100", "0"),
            ("4000", "Revenue", "0", "99.50"),
        ]));

        assert!(!report.is_balanced);
        assert_eq!(
            report.balance_difference,
            BigDecimal::from_str("0.50").unwrap()
        );
        assert_eq!(report.status, ComplianceStatus::Failed);
    }

    #[test]
    fn test_rounding_within_tolerance_passes() {
        let report = validate_trial_balance(&table(&[
            ("1000", "Cash", "100.005", "0"),
            ("4000", "Revenue", "0", "100.00"),
        ]));
        assert!(report.is_balanced);
    }

    #[test]
    fn test_duplicate_account_fails() {
        let report = validate_trial_balance(&table(&[
            ("1000", "Cash", "50", "0"),
            ("1000", "Cash", "50", "0"),
            ("4000", "Revenue", "0", "100"),
        ]));

        assert_eq!(report.duplicate_accounts, 1);
        assert!(report.is_balanced);
        assert_eq!(report.status, ComplianceStatus::Failed);
    }

    #[test]
    fn test_duplicates_counted_per_surplus_occurrence() {
        let report = validate_trial_balance(&table(&[
            ("1000", "Cash", "0", "0"),
            ("1000", "Cash", "0", "0"),
            ("1000", "Cash", "0", "0"),
            ("2000", "AP", "0", "0"),
            ("2000", "AP", "0", "0"),
        ]));
        assert_eq!(report.duplicate_accounts, 3);
    }

    #[test]
    fn test_missing_identifiers_counted() {
        let report = validate_trial_balance(&table(&[
            ("", "Cash", "10", "0"),
            ("Unknown", "Mystery", "0", "10"),
            ("3000", "", "0", "0"),
        ]));

        // Blank cells standardize to the sentinel, so both forms count
        assert_eq!(report.missing_account_numbers, 2);
        assert_eq!(report.missing_account_names, 1);
        assert_eq!(report.status, ComplianceStatus::Failed);
    }

    #[test]
    fn test_validation_does_not_mutate_input() {
        let input = table(&[("1000", "Cash", "100", "0")]);
        let before = input.clone();
        let _ = validate_trial_balance(&input);
        assert_eq!(input, before);
    }
}
