//! Known column-name synonyms for each canonical field

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::CanonicalField;

/// Configured synonym lists used by schema detection.
///
/// Loaded once per run and treated as immutable so that mapping is
/// deterministic and repeatable for the same inputs. The default table covers
/// the column-name variations commonly produced by SAP- and Oracle-style
/// general ledger exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymTable {
    synonyms: HashMap<CanonicalField, Vec<String>>,
}

impl SynonymTable {
    /// Create a synonym table from explicit per-field lists.
    ///
    /// Synonyms are matched case-insensitively; they are lowercased here so
    /// lookups never have to normalize twice.
    pub fn new(synonyms: HashMap<CanonicalField, Vec<String>>) -> Self {
        let synonyms = synonyms
            .into_iter()
            .map(|(field, list)| {
                let lowered = list.into_iter().map(|s| s.to_lowercase()).collect();
                (field, lowered)
            })
            .collect();
        Self { synonyms }
    }

    /// Synonyms configured for a canonical field, in configured order
    pub fn synonyms_for(&self, field: CanonicalField) -> &[String] {
        self.synonyms
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let mut synonyms = HashMap::new();
        synonyms.insert(
            CanonicalField::AccountNumber,
            string_vec(&[
                "account_no",
                "acc_no",
                "account_id",
                "gl_account",
                "account_code",
            ]),
        );
        synonyms.insert(
            CanonicalField::AccountName,
            string_vec(&[
                "account_desc",
                "description",
                "acc_name",
                "gl_description",
                "account_description",
            ]),
        );
        synonyms.insert(
            CanonicalField::Debit,
            string_vec(&["debit_amount", "dr", "debit_amt", "dr_amount"]),
        );
        synonyms.insert(
            CanonicalField::Credit,
            string_vec(&["credit_amount", "cr", "credit_amt", "cr_amount"]),
        );
        synonyms.insert(
            CanonicalField::Period,
            string_vec(&[
                "period_end",
                "date",
                "period_ending",
                "as_of_date",
                "reporting_date",
            ]),
        );
        synonyms.insert(
            CanonicalField::EntityId,
            string_vec(&[
                "entity",
                "company_id",
                "legal_entity",
                "company_code",
                "org_id",
            ]),
        );
        Self::new(synonyms)
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
