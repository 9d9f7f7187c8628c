//! Period-over-period variance analysis example

use bigdecimal::BigDecimal;
use trialbalance_core::utils::MemorySource;
use trialbalance_core::{CellValue, RawTable, TrialBalanceSystem, VarianceAnalyzer};

fn period_table(rows: &[(&str, &str, i64, i64)]) -> RawTable {
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
    raw
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📊 Trial Balance Core - Variance Analysis Example\n");

    let source = MemorySource::new();
    source.insert_table(
        "fy2024",
        period_table(&[
            ("1000", "Cash", 132000, 0),
            ("1100", "Trade Receivables", 165000, 0),
            ("1150", "Prepaid Insurance", 5500, 0),
            ("4000", "Sales Revenue", 0, 380000),
        ]),
    );
    source.insert_table(
        "fy2023",
        period_table(&[
            ("1000", "Cash", 98000, 0),
            ("1100", "Trade Receivables", 170000, 0),
            ("4000", "Sales Revenue", 0, 310000),
            ("5200", "Rent Expense", 48000, 0),
        ]),
    );

    // Use a stricter 10% materiality threshold than the 15% default
    let mut system = TrialBalanceSystem::with_components(
        source,
        Default::default(),
        Default::default(),
        VarianceAnalyzer::with_threshold(BigDecimal::from(10)),
    );

    let datasets = system.load_datasets(&["fy2024", "fy2023"]).await?;
    let report = system.compare_periods(&datasets[0].table, &datasets[1].table);

    println!(
        "Comparing {} against {} (threshold {}%):\n",
        report.current_label, report.prior_label, report.materiality_threshold_pct
    );

    for entry in &report.entries {
        let marker = if entry.is_material { "⚠️ " } else { "  " };
        println!(
            "{} {} {}: {} -> {} (amount {}, pct {})",
            marker,
            entry.account_number,
            entry.account_name,
            entry.prior_balance,
            entry.current_balance,
            entry.variance_amount,
            entry.variance_pct
        );
    }

    println!("\nMaterial variances: {}", report.material_count());
    println!("New accounts: {:?}", report.new_accounts);
    println!("Dropped accounts: {:?}", report.dropped_accounts);

    Ok(())
}
