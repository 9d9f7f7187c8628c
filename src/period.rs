//! Fiscal period parsing and period-based record filtering

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{NormalizedRecord, NormalizedTable, TbResult, TrialBalanceError};

/// The granularity of a parsed fiscal period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Quarter,
    Month,
    Year,
}

/// A canonical date range parsed from a free-text period expression.
///
/// Immutable once parsed; `start_date <= end_date` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpec {
    /// Granularity of the period
    pub kind: PeriodKind,
    /// Calendar year the period belongs to
    pub year: i32,
    /// First day of the period (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive)
    pub end_date: NaiveDate,
    /// Human-readable description, e.g. "Q2 2024" or "Full Year 2024"
    pub label: String,
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Parse a free-text fragment naming a fiscal period into a [`PeriodSpec`].
///
/// A four-digit year in 2000..=2099 is mandatory. Given the year, a "Q1".."Q4"
/// token selects the calendar quarter, a three-letter month abbreviation
/// selects that month, and anything else falls back to the full calendar year.
///
/// # Errors
///
/// Returns [`TrialBalanceError::PeriodParse`] when no year token is present;
/// no sensible default range exists without one.
pub fn parse_period(text: &str) -> TbResult<PeriodSpec> {
    let upper = text.trim().to_uppercase();

    let year = extract_year(&upper).ok_or_else(|| {
        TrialBalanceError::PeriodParse(format!("no year found in '{}'", text.trim()))
    })?;

    for quarter in 1..=4u32 {
        if upper.contains(&format!("Q{}", quarter)) {
            return Ok(quarter_spec(year, quarter));
        }
    }

    if let Some(month) = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| upper.contains(abbr))
    {
        return Ok(month_spec(year, month as u32 + 1));
    }

    Ok(PeriodSpec {
        kind: PeriodKind::Year,
        year,
        start_date: ymd(year, 1, 1),
        end_date: ymd(year, 12, 31),
        label: format!("Full Year {}", year),
    })
}

/// Find the first standalone four-digit 20xx token in the uppercased input
fn extract_year(upper: &str) -> Option<i32> {
    let bytes = upper.as_bytes();
    for start in 0..bytes.len().saturating_sub(3) {
        let window = &bytes[start..start + 4];
        if !window.iter().all(u8::is_ascii_digit) {
            continue;
        }
        // Reject digits bleeding in from either side, e.g. "120244"
        let digit_before = start > 0 && bytes[start - 1].is_ascii_digit();
        let digit_after = start + 4 < bytes.len() && bytes[start + 4].is_ascii_digit();
        if digit_before || digit_after {
            continue;
        }
        if window[0] == b'2' && window[1] == b'0' {
            // Window is four ASCII digits, parse cannot fail
            return std::str::from_utf8(window).ok()?.parse().ok();
        }
    }
    None
}

fn quarter_spec(year: i32, quarter: u32) -> PeriodSpec {
    let (start, end) = match quarter {
        1 => (ymd(year, 1, 1), ymd(year, 3, 31)),
        2 => (ymd(year, 4, 1), ymd(year, 6, 30)),
        3 => (ymd(year, 7, 1), ymd(year, 9, 30)),
        _ => (ymd(year, 10, 1), ymd(year, 12, 31)),
    };
    PeriodSpec {
        kind: PeriodKind::Quarter,
        year,
        start_date: start,
        end_date: end,
        label: format!("Q{} {}", quarter, year),
    }
}

fn month_spec(year: i32, month: u32) -> PeriodSpec {
    PeriodSpec {
        kind: PeriodKind::Month,
        year,
        start_date: ymd(year, month, 1),
        end_date: ymd(year, month, last_day_of_month(year, month)),
        label: format!("{} {}", MONTH_ABBREVIATIONS[(month - 1) as usize], year),
    }
}

/// Last day of a calendar month.
///
/// February uses the simplified `year % 4 == 0` leap rule for compatibility
/// with the upstream system; the century exception (divisible by 100 but not
/// 400) is deliberately not applied. Known limitation.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Month and day are produced by the tables above, never out of range
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(NaiveDate::MIN)
}

/// Outcome of applying a period filter to a normalized table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOutcome {
    /// The table had a period column; records outside the range or with an
    /// unparseable period value were dropped
    Applied {
        /// Records dropped because their period fell outside the range
        dropped_out_of_range: usize,
        /// Records dropped because they had no parseable period value
        dropped_missing_period: usize,
    },
    /// The table had no period column mapped; the filter was a no-op and the
    /// full record set was returned unchanged
    NotApplicable,
}

/// Result of filtering a normalized table to a fiscal period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFilterResult {
    /// The period the filter was asked to apply
    pub period: PeriodSpec,
    /// Records retained by the filter
    pub table: NormalizedTable,
    /// Whether the filter actually applied, and what it dropped
    pub outcome: FilterOutcome,
}

/// Restrict a normalized table to records whose period falls within
/// `[start_date, end_date]`, inclusive on both ends.
///
/// Records without a parseable period value are dropped silently; the caller
/// sees them only in the outcome counts. When the source table had no period
/// column mapped at all the filter is a no-op, reported as
/// [`FilterOutcome::NotApplicable`] so the fallback stays distinguishable from
/// "zero records matched".
pub fn filter_by_period(table: &NormalizedTable, period: &PeriodSpec) -> PeriodFilterResult {
    if !table.has_period_column() {
        return PeriodFilterResult {
            period: period.clone(),
            table: table.clone(),
            outcome: FilterOutcome::NotApplicable,
        };
    }

    let mut kept: Vec<NormalizedRecord> = Vec::new();
    let mut dropped_out_of_range = 0;
    let mut dropped_missing_period = 0;

    for record in &table.records {
        match record.period {
            Some(date) if date >= period.start_date && date <= period.end_date => {
                kept.push(record.clone());
            }
            Some(_) => dropped_out_of_range += 1,
            None => dropped_missing_period += 1,
        }
    }

    PeriodFilterResult {
        period: period.clone(),
        table: NormalizedTable {
            label: table.label.clone(),
            mapping: table.mapping.clone(),
            records: kept,
        },
        outcome: FilterOutcome::Applied {
            dropped_out_of_range,
            dropped_missing_period,
        },
    }
}
