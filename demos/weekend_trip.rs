//! Weekend trip example: record shared costs and settle up

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use group_split_core::utils::MemoryStorage;
use group_split_core::{
    patterns, EngineSettings, ExpenseBuilder, GroupId, GroupLedger, Member, Money,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let settings = EngineSettings::load("split")?;
    let mut ledger = GroupLedger::with_settings(MemoryStorage::new(), settings.clone());
    let group = GroupId::new();

    // 1. Build the roster
    println!("Setting up the group...");
    let alice = ledger
        .add_member(
            &group,
            Member::registered("Alice", Some("alice@example.com".to_string())),
        )
        .await?;
    let bob = ledger
        .add_member(&group, Member::registered("Bob", None))
        .await?;
    let carol = ledger.add_member(&group, Member::guest("Carol")).await?;
    for member in ledger.list_members(&group).await? {
        println!(
            "  - {}{}",
            member.display_name(),
            if member.is_guest() { " (guest)" } else { "" }
        );
    }
    println!();

    // 2. Record expenses
    println!("Recording expenses...");
    let rule = ledger.equal_split_for_group(&group).await?;
    let cabin = ExpenseBuilder::new(
        group,
        alice.id(),
        "Cabin".to_string(),
        "$300.00".parse::<Money>()?,
        NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
    )
    .category("lodging".to_string())
    .split(rule)
    .build()?;
    ledger.record_expense(cabin).await?;

    let groceries = patterns::percentage_expense(
        group,
        bob.id(),
        "Groceries".to_string(),
        Money::from_cents(8450),
        NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
        vec![
            (alice.id(), BigDecimal::from(25)),
            (bob.id(), BigDecimal::from(25)),
            (carol.id(), BigDecimal::from(50)),
        ],
    )?;
    ledger.record_expense(groceries).await?;

    let kayaks = patterns::exact_expense(
        group,
        carol.id(),
        "Kayak rental".to_string(),
        Money::from_cents(9000),
        NaiveDate::from_ymd_opt(2024, 7, 6).unwrap(),
        vec![
            (alice.id(), Money::from_cents(3000)),
            (bob.id(), Money::from_cents(6000)),
        ],
    )?;
    ledger.record_expense(kayaks).await?;

    for expense in ledger.group_expenses(&group).await? {
        println!(
            "  {} {:<14} {} ({})",
            expense.date,
            expense.title,
            settings.format(expense.amount),
            expense.split_type
        );
    }
    println!();

    // 3. Balances and suggested transfers
    let report = ledger.group_balances(&group).await?;
    println!(
        "Balances (total spent {}):",
        settings.format(report.total_expenses)
    );
    for balance in &report.balances {
        println!(
            "  {:<8} paid {:>9} owes {:>9} net {:>9}",
            balance.member.display_name(),
            settings.format(balance.total_paid),
            settings.format(balance.total_owed),
            settings.format(balance.net_balance)
        );
    }
    println!();

    println!("Suggested transfers:");
    for transfer in &report.transfers {
        println!(
            "  {} -> {}: {}",
            report.member_name(&transfer.from).unwrap_or_default(),
            report.member_name(&transfer.to).unwrap_or_default(),
            settings.format(transfer.amount)
        );
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    println!();

    // 4. Settle the first suggestion
    if let Some(transfer) = report.transfers.first() {
        let record = ledger
            .settle_transfer(&transfer.from, group, transfer, "Trip".to_string())
            .await?;
        let record = ledger.complete_settlement(&transfer.to, &record.id).await?;
        println!("Settlement {} is now {:?}", record.id, record.status);
    }

    Ok(())
}
