//! Account categorization driven by configured account-number ranges

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{NormalizedTable, TbResult, TrialBalanceError};

/// Category assigned when no configured range matches an account number
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Tax sub-category assigned when the resolved category has none configured
pub const DEFAULT_TAX_CATEGORY: &str = "Standard";

/// Confidence reported for a range-matched categorization
const MATCHED_CONFIDENCE: f64 = 0.95;
/// Confidence reported when no range matched
const UNMATCHED_CONFIDENCE: f64 = 0.3;

/// One account-number range mapped to a financial statement category.
///
/// Bounds are inclusive and compared lexicographically as strings, matching
/// the way ledger exports mix numeric and alphanumeric account codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Inclusive lower bound
    pub range_start: String,
    /// Inclusive upper bound
    pub range_end: String,
    /// Category assigned to account numbers within the range
    pub category: String,
}

impl CategoryRule {
    /// Create a rule for an inclusive account-number range
    pub fn new(range_start: &str, range_end: &str, category: &str) -> Self {
        Self {
            range_start: range_start.to_string(),
            range_end: range_end.to_string(),
            category: category.to_string(),
        }
    }

    /// Whether the account number falls within this rule's range
    pub fn contains(&self, account_number: &str) -> bool {
        self.range_start.as_str() <= account_number && account_number <= self.range_end.as_str()
    }

    fn overlaps(&self, other: &CategoryRule) -> bool {
        self.range_start <= other.range_end && other.range_start <= self.range_end
    }
}

/// An ordered, validated set of category rules.
///
/// The loader rejects configurations with overlapping ranges instead of
/// silently resolving ties by table order, so first-match lookup is
/// unambiguous by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleSet {
    /// Create a rule set, validating range sanity and pairwise disjointness.
    ///
    /// # Errors
    ///
    /// Returns [`TrialBalanceError::Config`] when a rule's start exceeds its
    /// end or when any two rules overlap.
    pub fn new(rules: Vec<CategoryRule>) -> TbResult<Self> {
        for rule in &rules {
            if rule.range_start > rule.range_end {
                return Err(TrialBalanceError::Config(format!(
                    "category rule '{}' has start '{}' greater than end '{}'",
                    rule.category, rule.range_start, rule.range_end
                )));
            }
        }
        for (i, rule) in rules.iter().enumerate() {
            for other in &rules[i + 1..] {
                if rule.overlaps(other) {
                    return Err(TrialBalanceError::Config(format!(
                        "category rules '{}' ({}-{}) and '{}' ({}-{}) overlap",
                        rule.category,
                        rule.range_start,
                        rule.range_end,
                        other.category,
                        other.range_start,
                        other.range_end
                    )));
                }
            }
        }
        Ok(Self { rules })
    }

    /// Standard five-range chart used by SAP/Oracle style exports:
    /// 1000-1999 Assets, 2000-2999 Liabilities, 3000-3999 Equity,
    /// 4000-4999 Revenue, 5000-5999 Expenses.
    pub fn standard_chart() -> Self {
        // Disjoint by construction
        Self {
            rules: vec![
                CategoryRule::new("1000", "1999", "Assets"),
                CategoryRule::new("2000", "2999", "Liabilities"),
                CategoryRule::new("3000", "3999", "Equity"),
                CategoryRule::new("4000", "4999", "Revenue"),
                CategoryRule::new("5000", "5999", "Expenses"),
            ],
        }
    }

    /// The first rule whose range contains the account number
    pub fn find(&self, account_number: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|rule| rule.contains(account_number))
    }

    /// The configured rules, in order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

/// Mapping from category to its configured tax sub-categories.
///
/// When a category has several sub-categories the first configured one is
/// selected; this single-choice behavior is a deliberate simplification, not
/// a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxCategoryTable {
    categories: HashMap<String, Vec<String>>,
}

impl TaxCategoryTable {
    /// Create a tax category table from explicit per-category lists
    pub fn new(categories: HashMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// Standard tax sub-categories for the standard chart
    pub fn standard() -> Self {
        let mut categories = HashMap::new();
        categories.insert(
            "Assets".to_string(),
            vec!["Depreciable".to_string(), "Non-Depreciable".to_string()],
        );
        categories.insert(
            "Liabilities".to_string(),
            vec!["Current".to_string(), "Long-Term".to_string()],
        );
        categories.insert("Equity".to_string(), vec!["Contributed".to_string()]);
        categories.insert(
            "Revenue".to_string(),
            vec!["Taxable".to_string(), "Exempt".to_string()],
        );
        categories.insert(
            "Expenses".to_string(),
            vec!["Deductible".to_string(), "Non-Deductible".to_string()],
        );
        Self { categories }
    }

    /// The first configured sub-category for a category, or "Standard"
    pub fn resolve(&self, category: &str) -> String {
        self.categories
            .get(category)
            .and_then(|subs| subs.first())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TAX_CATEGORY.to_string())
    }
}

/// The result of categorizing one account number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    /// The account number that was categorized
    pub account_number: String,
    /// Resolved financial statement category, or "Unknown"
    pub category: String,
    /// Resolved tax sub-category
    pub tax_category: String,
    /// Confidence marker: high when a range matched, low otherwise
    pub confidence: f64,
    /// Short human-readable explanation of the match
    pub reasoning: String,
}

impl Categorization {
    /// Whether a configured range matched the account number
    pub fn is_matched(&self) -> bool {
        self.category != UNKNOWN_CATEGORY
    }
}

/// Categorizes account numbers using process-wide, read-only rule tables
#[derive(Debug, Clone)]
pub struct AccountCategorizer {
    rules: CategoryRuleSet,
    tax_categories: TaxCategoryTable,
}

impl AccountCategorizer {
    /// Create a categorizer from validated rule tables
    pub fn new(rules: CategoryRuleSet, tax_categories: TaxCategoryTable) -> Self {
        Self {
            rules,
            tax_categories,
        }
    }

    /// Categorize one account number.
    ///
    /// Never errors: an unmatched account resolves to "Unknown" with a low
    /// confidence marker so the gap stays visible in the output.
    pub fn categorize(&self, account_number: &str) -> Categorization {
        match self.rules.find(account_number) {
            Some(rule) => Categorization {
                account_number: account_number.to_string(),
                category: rule.category.clone(),
                tax_category: self.tax_categories.resolve(&rule.category),
                confidence: MATCHED_CONFIDENCE,
                reasoning: format!(
                    "Account {} falls in range {}-{} for {} accounts",
                    account_number, rule.range_start, rule.range_end, rule.category
                ),
            },
            None => Categorization {
                account_number: account_number.to_string(),
                category: UNKNOWN_CATEGORY.to_string(),
                tax_category: DEFAULT_TAX_CATEGORY.to_string(),
                confidence: UNMATCHED_CONFIDENCE,
                reasoning: format!("Account {} matches no configured range", account_number),
            },
        }
    }

    /// Per-category record counts and net balance totals for one table.
    ///
    /// Unmatched accounts are reported under "Unknown" so nothing drops out
    /// of the summary silently.
    pub fn summarize_table(&self, table: &NormalizedTable) -> CategorySummary {
        let mut totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for record in &table.records {
            let categorization = self.categorize(&record.account_number);
            let entry = totals.entry(categorization.category).or_default();
            entry.account_count += 1;
            entry.net_balance += record.net_balance();
        }
        CategorySummary {
            label: table.label.clone(),
            totals,
        }
    }
}

impl Default for AccountCategorizer {
    fn default() -> Self {
        Self::new(CategoryRuleSet::standard_chart(), TaxCategoryTable::standard())
    }
}

/// Aggregate for one category within a [`CategorySummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CategoryTotal {
    /// Number of records in the category
    pub account_count: usize,
    /// Sum of net balances in the category
    pub net_balance: BigDecimal,
}

/// Per-category breakdown of a normalized table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Label of the summarized table
    pub label: String,
    /// Totals keyed by category name, sorted for stable output
    pub totals: BTreeMap<String, CategoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaMapper;
    use crate::types::{CellValue, RawTable};

    #[test]
    fn test_standard_chart_categorization() {
        let categorizer = AccountCategorizer::default();

        let cash = categorizer.categorize("1000");
        assert_eq!(cash.category, "Assets");
        assert_eq!(cash.tax_category, "Depreciable");
        assert!(cash.confidence > 0.9);
        assert!(cash.is_matched());

        assert_eq!(categorizer.categorize("2500").category, "Liabilities");
        assert_eq!(categorizer.categorize("4100").category, "Revenue");
    }

    #[test]
    fn test_unmatched_account_degrades_visibly() {
        let categorizer = AccountCategorizer::default();
        let result = categorizer.categorize("9999");
        assert_eq!(result.category, UNKNOWN_CATEGORY);
        assert_eq!(result.tax_category, DEFAULT_TAX_CATEGORY);
        assert!(result.confidence < 0.5);
        assert!(!result.is_matched());
    }

    #[test]
    fn test_lexicographic_bounds_handle_alphanumeric_codes() {
        let rules = CategoryRuleSet::new(vec![CategoryRule::new("A000", "A999", "Adjustments")])
            .unwrap();
        let categorizer = AccountCategorizer::new(rules, TaxCategoryTable::default());

        assert_eq!(categorizer.categorize("A500").category, "Adjustments");
        assert_eq!(categorizer.categorize("B100").category, UNKNOWN_CATEGORY);
        // digits sort below letters, so "150" is outside A000-A999
        assert_eq!(categorizer.categorize("150").category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_overlapping_rules_rejected() {
        let result = CategoryRuleSet::new(vec![
            CategoryRule::new("1000", "1999", "Assets"),
            CategoryRule::new("1500", "2500", "Other"),
        ]);
        assert!(matches!(result, Err(TrialBalanceError::Config(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = CategoryRuleSet::new(vec![CategoryRule::new("2000", "1000", "Backwards")]);
        assert!(matches!(result, Err(TrialBalanceError::Config(_))));
    }

    #[test]
    fn test_first_tax_subcategory_selected_deterministically() {
        let table = TaxCategoryTable::standard();
        for _ in 0..10 {
            assert_eq!(table.resolve("Revenue"), "Taxable");
        }
        assert_eq!(table.resolve("Nonexistent"), DEFAULT_TAX_CATEGORY);
    }

    #[test]
    fn test_summarize_table() {
        let mapper = SchemaMapper::new();
        let mut raw = RawTable::new(vec![
            "account_number".to_string(),
            "debit".to_string(),
            "credit".to_string(),
        ]);
        raw.push_row(vec![
            CellValue::from("1000"),
            CellValue::from(500),
            CellValue::from(0),
        ]);
        raw.push_row(vec![
            CellValue::from("1100"),
            CellValue::from(250),
            CellValue::from(0),
        ]);
        raw.push_row(vec![
            CellValue::from("4000"),
            CellValue::from(0),
            CellValue::from(750),
        ]);

        let table = mapper.normalize(&raw, "test");
        let summary = AccountCategorizer::default().summarize_table(&table);

        assert_eq!(summary.totals["Assets"].account_count, 2);
        assert_eq!(summary.totals["Assets"].net_balance, BigDecimal::from(750));
        assert_eq!(
            summary.totals["Revenue"].net_balance,
            BigDecimal::from(-750)
        );
    }
}
