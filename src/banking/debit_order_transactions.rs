// 🔁 Debit Order Transactions - one debit per debit-order occurrence in a year

use crate::banking::debit_orders::{occurs_on, DebitOrder, DebitOrderStatus};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_or_empty, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "banking/debit_order_transactions";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

/// Debit orders issued before this year are not looked up
pub const FIRST_ORDER_YEAR: i32 = 2015;
pub const IMMEDIATE_PAYMENT_FEE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitOrderTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub customer_id: String,
    pub transaction_date: NaiveDate,
    pub transaction_time: NaiveTime,
    pub amount: f64,
    pub debit_credit: String,
    pub status: String,
    pub description: String,
    pub immediate_payment: bool,
    pub receiving_account: String,
    pub receiving_bank: Option<String>,
    pub transaction_cost: f64,
    pub ewallet_number: Option<String>,
    pub channel: String,
    pub debit_order_id: String,
    pub debit_order_type: String,
}

pub fn generate_occurrences(orders: &[DebitOrder], year: i32, rng: &mut Sampler) -> Vec<DebitOrderTransaction> {
    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };

    let running: Vec<&DebitOrder> = orders
        .iter()
        .filter(|o| o.status != DebitOrderStatus::Suspended)
        .collect();

    let mut rows = Vec::new();
    let mut counter = 1;
    for date in start.iter_days().take_while(|d| *d <= end) {
        for order in running.iter().filter(|o| occurs_on(o, date)) {
            rows.push(occurrence(order, date, year, counter, rng));
            counter += 1;
        }
    }
    rows
}

fn occurrence(order: &DebitOrder, date: NaiveDate, year: i32, n: usize, rng: &mut Sampler) -> DebitOrderTransaction {
    let status = *rng.weighted(&[("Completed", 0.92), ("Failed", 0.06), ("Cancelled", 0.02)]);
    // Most debit orders run in the early-morning batch
    let hour = if rng.chance(0.7) { rng.int(6, 8) } else { rng.int(9, 17) };
    let time = NaiveTime::from_hms_opt(hour as u32, rng.int(0, 59) as u32, rng.int(0, 59) as u32)
        .unwrap_or_default();

    let immediate = rng.chance(0.05);
    let description = order.description.to_lowercase();
    let ewallet_number = (description.contains("ewallet") || description.contains("mobile"))
        .then(|| format!("27{}", rng.int(600_000_000, 899_999_999)));
    let channel = *rng.weighted(&[
        ("Online", 0.05),
        ("Mobile", 0.10),
        ("ATM", 0.02),
        ("Branch", 0.03),
        ("Automated", 0.80),
    ]);

    DebitOrderTransaction {
        transaction_id: format!("TXND{}{:07}", year, n),
        account_id: order.account_id.clone(),
        customer_id: order.customer_id.clone(),
        transaction_date: date,
        transaction_time: time,
        amount: order.amount,
        debit_credit: "Debit".to_string(),
        status: status.to_string(),
        description: order.description.clone(),
        immediate_payment: immediate,
        receiving_account: order.account_to.clone(),
        receiving_bank: order.is_external().then(|| "External Bank".to_string()),
        transaction_cost: if immediate { IMMEDIATE_PAYMENT_FEE } else { 0.0 },
        ewallet_number,
        channel: channel.to_string(),
        debit_order_id: order.debit_order_id.clone(),
        debit_order_type: order.debit_order_type.clone(),
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🔁 Generating debit order transactions for {}...", config.year);
    let mut orders: Vec<DebitOrder> = Vec::new();
    for year in FIRST_ORDER_YEAR..=config.year {
        orders.extend(read_or_empty::<DebitOrder>(&layout.path(Domain::Banking, "debit_orders", Some(year)))?);
    }
    println!("   📂 {} debit orders on file", orders.len());

    let mut rng = Sampler::seeded(seed);
    let transactions = generate_occurrences(&orders, config.year, &mut rng);
    let path = layout.path(Domain::Banking, "debit_order_transactions", Some(config.year));
    let rows = write_table(&path, &transactions)?;
    println!("✓ Saved {} debit order transactions to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::debit_orders::tests::create_test_order;
    use crate::banking::debit_orders::Frequency;

    #[test]
    fn test_monthly_order_runs_twelve_times() {
        let start = NaiveDate::from_ymd_opt(2018, 11, 30).unwrap();
        let order = create_test_order(Frequency::Monthly, start);
        let mut rng = Sampler::seeded(1);
        let rows = generate_occurrences(&[order], 2019, &mut rng);

        assert_eq!(rows.len(), 12);
        for row in &rows {
            assert_eq!(chrono::Datelike::day(&row.transaction_date), 28);
            assert_eq!(row.debit_credit, "Debit");
            assert!(row.ewallet_number.is_some(), "mobile description gets an eWallet number");
            assert_eq!(row.receiving_bank.as_deref(), Some("External Bank"));
        }
        println!("✅ Monthly debit order occurrences PASSED");
    }

    #[test]
    fn test_suspended_orders_skipped_and_ids_sequential() {
        let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let mut suspended = create_test_order(Frequency::Weekly, start);
        suspended.status = DebitOrderStatus::Suspended;
        let weekly = create_test_order(Frequency::Weekly, start);

        let mut rng = Sampler::seeded(2);
        let rows = generate_occurrences(&[suspended, weekly], 2019, &mut rng);
        assert_eq!(rows.len(), 53);
        assert_eq!(rows[0].transaction_id, "TXND20190000001");
        assert!(rows.iter().all(|r| r.transaction_cost == 0.0 || r.immediate_payment));
    }
}
