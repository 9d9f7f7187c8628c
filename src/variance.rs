//! Period-over-period variance analysis of normalized trial balances

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{NormalizedTable, UNKNOWN_SENTINEL};

/// Default materiality threshold, in percent
pub const DEFAULT_MATERIALITY_THRESHOLD_PCT: u32 = 15;

/// One account's movement between two periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceEntry {
    /// Account number (join key)
    pub account_number: String,
    /// Account name, taken from the current period when present there
    pub account_name: String,
    /// Net balance in the current period (zero when the account is absent)
    pub current_balance: BigDecimal,
    /// Net balance in the prior period (zero when the account is absent)
    pub prior_balance: BigDecimal,
    /// `current_balance - prior_balance`
    pub variance_amount: BigDecimal,
    /// Percentage variance relative to the larger balance magnitude
    pub variance_pct: BigDecimal,
    /// Whether the percentage variance exceeds the materiality threshold
    pub is_material: bool,
}

impl VarianceEntry {
    /// New account: nothing in the prior period, something in the current
    pub fn is_new_account(&self) -> bool {
        self.prior_balance == BigDecimal::from(0) && self.current_balance != BigDecimal::from(0)
    }

    /// Dropped account: something in the prior period, nothing in the current
    pub fn is_dropped_account(&self) -> bool {
        self.current_balance == BigDecimal::from(0) && self.prior_balance != BigDecimal::from(0)
    }
}

/// Structured result of comparing two periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReport {
    /// Label of the current-period table
    pub current_label: String,
    /// Label of the prior-period table
    pub prior_label: String,
    /// Materiality threshold applied, in percent
    pub materiality_threshold_pct: BigDecimal,
    /// One entry per account appearing in either period, ordered by account number
    pub entries: Vec<VarianceEntry>,
    /// Record count of the current-period table
    pub total_accounts_current: usize,
    /// Record count of the prior-period table
    pub total_accounts_prior: usize,
    /// Account numbers first seen in the current period
    pub new_accounts: Vec<String>,
    /// Account numbers that vanished from the current period
    pub dropped_accounts: Vec<String>,
}

impl VarianceReport {
    /// Entries whose variance exceeds the materiality threshold
    pub fn material_entries(&self) -> Vec<&VarianceEntry> {
        self.entries.iter().filter(|e| e.is_material).collect()
    }

    /// Number of material variances
    pub fn material_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_material).count()
    }
}

/// Joins two normalized record sets on account number and computes deltas.
///
/// The comparison is symmetric up to sign: swapping current and prior negates
/// `variance_amount` and `variance_pct` for every entry while leaving
/// materiality flags unchanged.
#[derive(Debug, Clone)]
pub struct VarianceAnalyzer {
    materiality_threshold_pct: BigDecimal,
}

impl VarianceAnalyzer {
    /// Create an analyzer with the default 15% materiality threshold
    pub fn new() -> Self {
        Self::with_threshold(BigDecimal::from(DEFAULT_MATERIALITY_THRESHOLD_PCT))
    }

    /// Create an analyzer with a custom materiality threshold, in percent
    pub fn with_threshold(materiality_threshold_pct: BigDecimal) -> Self {
        Self {
            materiality_threshold_pct,
        }
    }

    /// Compare two normalized tables, producing an outer join keyed on
    /// account number.
    ///
    /// Balances missing on either side default to zero before the delta is
    /// computed; duplicate account numbers within one side are aggregated by
    /// summing their net balances so each account yields exactly one entry.
    pub fn compare(&self, current: &NormalizedTable, prior: &NormalizedTable) -> VarianceReport {
        let current_balances = net_balances_by_account(current);
        let prior_balances = net_balances_by_account(prior);

        let mut account_numbers: Vec<&String> = current_balances.keys().collect();
        for account in prior_balances.keys() {
            if !current_balances.contains_key(account) {
                account_numbers.push(account);
            }
        }
        account_numbers.sort();

        let zero = BigDecimal::from(0);
        let mut entries = Vec::with_capacity(account_numbers.len());
        let mut new_accounts = Vec::new();
        let mut dropped_accounts = Vec::new();

        for account_number in account_numbers {
            let (current_balance, current_name) = current_balances
                .get(account_number)
                .map(|(balance, name)| (balance.clone(), Some(name)))
                .unwrap_or((zero.clone(), None));
            let (prior_balance, prior_name) = prior_balances
                .get(account_number)
                .map(|(balance, name)| (balance.clone(), Some(name)))
                .unwrap_or((zero.clone(), None));

            let account_name = current_name
                .or(prior_name)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string());

            let variance_amount = &current_balance - &prior_balance;
            let variance_pct = variance_pct(&current_balance, &prior_balance, &variance_amount);
            let is_material = variance_pct.abs() > self.materiality_threshold_pct;

            let entry = VarianceEntry {
                account_number: account_number.clone(),
                account_name,
                current_balance,
                prior_balance,
                variance_amount,
                variance_pct,
                is_material,
            };
            if entry.is_new_account() {
                new_accounts.push(entry.account_number.clone());
            }
            if entry.is_dropped_account() {
                dropped_accounts.push(entry.account_number.clone());
            }
            entries.push(entry);
        }

        VarianceReport {
            current_label: current.label.clone(),
            prior_label: prior.label.clone(),
            materiality_threshold_pct: self.materiality_threshold_pct.clone(),
            entries,
            total_accounts_current: current.len(),
            total_accounts_prior: prior.len(),
            new_accounts,
            dropped_accounts,
        }
    }
}

impl Default for VarianceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentage variance relative to the larger balance magnitude.
///
/// The denominator is `max(|current|, |prior|)`, which keeps the comparison
/// symmetric: swapping the inputs negates the percentage exactly. A zero
/// prior balance is not a divide-by-zero: both sides zero means 0%, and a
/// new account reports a sign-preserved 100% magnitude.
fn variance_pct(
    current_balance: &BigDecimal,
    prior_balance: &BigDecimal,
    variance_amount: &BigDecimal,
) -> BigDecimal {
    let zero = BigDecimal::from(0);
    if *current_balance == zero && *prior_balance == zero {
        return zero;
    }
    let denominator = current_balance.abs().max(prior_balance.abs());
    variance_amount / denominator * BigDecimal::from(100)
}

fn net_balances_by_account(table: &NormalizedTable) -> BTreeMap<String, (BigDecimal, String)> {
    let mut balances: BTreeMap<String, (BigDecimal, String)> = BTreeMap::new();
    for record in &table.records {
        let entry = balances
            .entry(record.account_number.clone())
            .or_insert_with(|| (BigDecimal::from(0), record.account_name.clone()));
        entry.0 += record.net_balance();
    }
    balances
}
