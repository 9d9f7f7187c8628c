//! Basic normalization and compliance example

use trialbalance_core::utils::MemorySource;
use trialbalance_core::{CellValue, RawTable, TrialBalanceSystem};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Trial Balance Core - Basic Reconciliation Example\n");

    // 1. Register a SAP-style export with non-canonical column names
    let mut sap = RawTable::new(vec![
        "gl_account".to_string(),
        "gl_description".to_string(),
        "dr_amount".to_string(),
        "cr_amount".to_string(),
        "period_ending".to_string(),
    ]);
    sap.push_row(vec![
        CellValue::from("1000"),
        CellValue::from("Cash and Bank Balances"),
        CellValue::from(150000),
        CellValue::from(0),
        CellValue::from("2024-01-31"),
    ]);
    sap.push_row(vec![
        CellValue::from("2000"),
        CellValue::from("Trade Payables"),
        CellValue::from(0),
        CellValue::from(65000),
        CellValue::from("2024-01-31"),
    ]);
    sap.push_row(vec![
        CellValue::from("4000"),
        CellValue::from("Sales Revenue"),
        CellValue::from(0),
        CellValue::from(85000),
        CellValue::from("2024-01-31"),
    ]);

    let source = MemorySource::new();
    source.insert_table("sap_q1_2024", sap);

    let mut system = TrialBalanceSystem::new(source);

    // 2. Load with automatic schema detection
    println!("📂 Loading SAP export...");
    let dataset = system.load_dataset("sap_q1_2024").await?;
    println!(
        "  ✓ {} records, {} of 6 canonical fields mapped",
        dataset.summary.total_records,
        dataset.table.mapping.mapped_count()
    );
    for sample in &dataset.summary.sample_accounts {
        println!(
            "    {} - {} (net {})",
            sample.account_number, sample.account_name, sample.net_balance
        );
    }
    println!();

    // 3. Filter to the requested fiscal period
    println!("📅 Filtering to Q1 2024...");
    let filtered = system.filter_period(&dataset.table, "Q1 2024")?;
    println!(
        "  ✓ {} ({} records kept)\n",
        filtered.period.label,
        filtered.table.len()
    );

    // 4. Categorize and validate
    println!("🏷️  Category breakdown:");
    let categories = system.categorize_table(&filtered.table);
    for (category, total) in &categories.totals {
        println!(
            "    {}: {} accounts, net balance {}",
            category, total.account_count, total.net_balance
        );
    }
    println!();

    println!("🔍 Compliance check:");
    let report = system.validate(&filtered.table);
    println!("    Total debits:  {}", report.total_debits);
    println!("    Total credits: {}", report.total_credits);
    println!("    Status: {:?}", report.status);
    println!();

    println!("📝 Audit trail: {} entries recorded", system.audit_log().len());

    Ok(())
}
