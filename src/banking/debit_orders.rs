// 🔁 Debit Orders - recurring authorised deductions against accounts opened in a year

use crate::banking::accounts::{Account, AccountType};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "banking/debit_orders";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
    Weekly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Annually => "Annually",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebitOrderStatus {
    Active,
    Cancelled,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitOrder {
    pub debit_order_id: String,
    pub customer_id: String,
    pub account_id: String,
    /// Internal account id or an external 24-character account reference
    pub account_to: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub cancellation_date: Option<NaiveDate>,
    pub status: DebitOrderStatus,
    pub description: String,
    pub debit_order_type: String,
}

impl DebitOrder {
    pub fn is_external(&self) -> bool {
        self.account_to.len() > 20
    }
}

/// (type, providers, amount range, frequencies with weights, weight)
struct OrderKind {
    name: &'static str,
    providers: &'static [&'static str],
    amount: (f64, f64),
    frequencies: &'static [(Frequency, f64)],
    weight: f64,
}

const MONTHLY: &[(Frequency, f64)] = &[(Frequency::Monthly, 1.0)];

const ORDER_KINDS: &[OrderKind] = &[
    OrderKind { name: "Insurance Premium", providers: &["Old Mutual", "Sanlam", "Hollard", "OUTsurance", "Momentum"], amount: (150.0, 1_500.0), frequencies: &[(Frequency::Monthly, 0.85), (Frequency::Annually, 0.15)], weight: 0.18 },
    OrderKind { name: "Medical Aid", providers: &["Discovery Health", "Bonitas", "Momentum Health", "Medshield"], amount: (1_200.0, 6_500.0), frequencies: MONTHLY, weight: 0.12 },
    OrderKind { name: "Funeral Cover", providers: &["AVBOB", "Old Mutual", "Clientele", "Assupol"], amount: (80.0, 450.0), frequencies: MONTHLY, weight: 0.12 },
    OrderKind { name: "Cell Phone Contract", providers: &["Vodacom", "MTN", "Cell C", "Telkom Mobile"], amount: (199.0, 1_299.0), frequencies: MONTHLY, weight: 0.15 },
    OrderKind { name: "Mobile Data", providers: &["Vodacom", "MTN", "Rain"], amount: (49.0, 499.0), frequencies: &[(Frequency::Monthly, 0.6), (Frequency::Weekly, 0.4)], weight: 0.06 },
    OrderKind { name: "eWallet Top-up", providers: &["FNB eWallet", "Capitec Pay", "SnapScan"], amount: (50.0, 500.0), frequencies: &[(Frequency::Weekly, 0.7), (Frequency::Monthly, 0.3)], weight: 0.04 },
    OrderKind { name: "Gym Membership", providers: &["Virgin Active", "Planet Fitness", "Zone Fitness"], amount: (250.0, 900.0), frequencies: MONTHLY, weight: 0.07 },
    OrderKind { name: "Streaming Subscription", providers: &["DStv", "Showmax", "Netflix"], amount: (99.0, 899.0), frequencies: MONTHLY, weight: 0.08 },
    OrderKind { name: "Retirement Annuity", providers: &["Allan Gray", "Coronation", "10X Investments"], amount: (500.0, 5_000.0), frequencies: &[(Frequency::Monthly, 0.8), (Frequency::Quarterly, 0.2)], weight: 0.06 },
    OrderKind { name: "Vehicle Finance", providers: &["WesBank", "MFC", "Toyota Financial Services"], amount: (2_500.0, 9_000.0), frequencies: MONTHLY, weight: 0.05 },
    OrderKind { name: "School Fees", providers: &["Curro", "ADvTECH", "Spark Schools"], amount: (1_500.0, 7_500.0), frequencies: &[(Frequency::Monthly, 0.7), (Frequency::Quarterly, 0.2), (Frequency::Annually, 0.1)], weight: 0.04 },
    OrderKind { name: "Municipal Rates", providers: &["City of Johannesburg", "City of Cape Town", "eThekwini Municipality", "City of Tshwane"], amount: (600.0, 3_500.0), frequencies: MONTHLY, weight: 0.03 },
];

const BUSINESS_KINDS: &[OrderKind] = &[
    OrderKind { name: "Equipment Lease", providers: &["Nashua", "Konica Minolta", "Sasfin"], amount: (2_000.0, 25_000.0), frequencies: MONTHLY, weight: 0.35 },
    OrderKind { name: "Business Insurance", providers: &["Santam", "Hollard", "Old Mutual Insure"], amount: (1_500.0, 20_000.0), frequencies: &[(Frequency::Monthly, 0.7), (Frequency::Annually, 0.3)], weight: 0.35 },
    OrderKind { name: "Software Subscription", providers: &["Sage", "Xero", "Microsoft"], amount: (300.0, 5_000.0), frequencies: MONTHLY, weight: 0.30 },
];

pub struct DebitOrderGenerator {
    year: i32,
    rng: Sampler,
    counter: usize,
}

impl DebitOrderGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        DebitOrderGenerator {
            year,
            rng: Sampler::seeded(seed),
            counter: 1,
        }
    }

    pub fn generate(&mut self, accounts: &[Account]) -> Vec<DebitOrder> {
        let internal: Vec<&str> = accounts
            .iter()
            .filter(|a| a.account_type == AccountType::Business)
            .map(|a| a.account_id.as_str())
            .collect();
        let year_end = NaiveDate::from_ymd_opt(self.year, 12, 31).unwrap_or(NaiveDate::MAX);

        let mut orders = Vec::new();
        for account in accounts.iter().filter(|a| a.account_status != "closed") {
            let (kinds, count) = if account.account_type == AccountType::Business {
                (BUSINESS_KINDS, self.rng.int(1, 3) as u32)
            } else {
                (ORDER_KINDS, self.rng.poisson(1.5).min(4))
            };
            for _ in 0..count {
                let start_from = account.opening_date.max(NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or(account.opening_date));
                if start_from > year_end {
                    continue;
                }
                let order = self.order(account, kinds, &internal, start_from, year_end);
                orders.push(order);
            }
        }

        tracing::info!(year = self.year, debit_orders = orders.len(), "debit orders generated");
        orders
    }

    fn order(
        &mut self,
        account: &Account,
        kinds: &[OrderKind],
        internal: &[&str],
        start_from: NaiveDate,
        year_end: NaiveDate,
    ) -> DebitOrder {
        let weights: Vec<f64> = kinds.iter().map(|k| k.weight).collect();
        let kind = &kinds[self.rng.weighted_index(&weights)];
        let provider = *self.rng.pick(kind.providers);
        let frequency = *self.rng.weighted(kind.frequencies);
        let amount = round_to(self.rng.uniform(kind.amount.0, kind.amount.1), 2);

        let start_date = self.rng.date_between(start_from, year_end);
        let end_date = if self.rng.chance(0.4) {
            start_date.checked_add_months(Months::new(self.rng.int(12, 60) as u32))
        } else {
            None
        };

        let status = *self.rng.weighted(&[
            (DebitOrderStatus::Active, 0.85),
            (DebitOrderStatus::Cancelled, 0.10),
            (DebitOrderStatus::Suspended, 0.05),
        ]);
        let cancellation_date = match status {
            DebitOrderStatus::Cancelled => {
                let latest = end_date.unwrap_or(year_end).max(start_date);
                Some(self.rng.date_between(start_date, latest))
            }
            _ => None,
        };

        let account_to = if !internal.is_empty() && self.rng.chance(0.3) {
            self.rng.pick(internal).to_string()
        } else {
            format!("ZA{}", self.rng.digits(22))
        };

        let order = DebitOrder {
            debit_order_id: format!("DO{}{:06}", self.year, self.counter),
            customer_id: account.customer_id.clone(),
            account_id: account.account_id.clone(),
            account_to,
            amount,
            frequency,
            start_date,
            end_date,
            cancellation_date,
            status,
            description: format!("{} {}", provider, kind.name),
            debit_order_type: kind.name.to_string(),
        };
        self.counter += 1;
        order
    }
}

/// Day-of-month match with days past the 28th clamped to the 28th
fn same_day_of_month(start: NaiveDate, date: NaiveDate) -> bool {
    if start.day() > 28 {
        date.day() == 28
    } else {
        date.day() == start.day()
    }
}

/// Whether a debit order runs on `date`
pub fn occurs_on(order: &DebitOrder, date: NaiveDate) -> bool {
    let start = order.start_date;
    if date < start || order.end_date.map_or(false, |end| date > end) {
        return false;
    }
    if order.cancellation_date.map_or(false, |cancelled| date >= cancelled) {
        return false;
    }
    match order.frequency {
        Frequency::Monthly => same_day_of_month(start, date),
        Frequency::Weekly => date.weekday() == start.weekday(),
        Frequency::Quarterly => {
            let months = (date.year() - start.year()) * 12 + date.month() as i32 - start.month() as i32;
            months % 3 == 0 && same_day_of_month(start, date)
        }
        Frequency::Annually => date.month() == start.month() && same_day_of_month(start, date),
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🔁 Generating debit orders for {}...", config.year);
    let accounts: Vec<Account> = read_table(&layout.path(Domain::Banking, "accounts", Some(config.year)))?;
    let orders = DebitOrderGenerator::new(config.year, seed).generate(&accounts);

    let path = layout.path(Domain::Banking, "debit_orders", Some(config.year));
    let rows = write_table(&path, &orders)?;
    println!("✓ Saved {} debit orders to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::banking::accounts::tests::create_test_customers;
    use crate::banking::accounts::AccountGenerator;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn create_test_order(frequency: Frequency, start: NaiveDate) -> DebitOrder {
        DebitOrder {
            debit_order_id: "DO2019000001".to_string(),
            customer_id: "IND2019000001".to_string(),
            account_id: "ACC0000001".to_string(),
            account_to: format!("ZA{}", "1".repeat(22)),
            amount: 250.0,
            frequency,
            start_date: start,
            end_date: None,
            cancellation_date: None,
            status: DebitOrderStatus::Active,
            description: "Vodacom Mobile Data".to_string(),
            debit_order_type: "Mobile Data".to_string(),
        }
    }

    #[test]
    fn test_monthly_clamps_to_28th() {
        let order = create_test_order(Frequency::Monthly, d(2019, 1, 31));
        assert!(occurs_on(&order, d(2019, 2, 28)));
        assert!(occurs_on(&order, d(2019, 3, 28)));
        assert!(!occurs_on(&order, d(2019, 3, 31)));
        assert!(!occurs_on(&order, d(2018, 12, 28)), "before start");
    }

    #[test]
    fn test_weekly_quarterly_annual() {
        let weekly = create_test_order(Frequency::Weekly, d(2019, 1, 7));
        assert!(occurs_on(&weekly, d(2019, 1, 14)));
        assert!(!occurs_on(&weekly, d(2019, 1, 15)));

        let quarterly = create_test_order(Frequency::Quarterly, d(2019, 1, 15));
        assert!(occurs_on(&quarterly, d(2019, 4, 15)));
        assert!(!occurs_on(&quarterly, d(2019, 5, 15)));

        let annual = create_test_order(Frequency::Annually, d(2019, 6, 1));
        assert!(occurs_on(&annual, d(2020, 6, 1)));
        assert!(!occurs_on(&annual, d(2020, 7, 1)));
    }

    #[test]
    fn test_cancellation_and_end_stop_occurrences() {
        let mut order = create_test_order(Frequency::Monthly, d(2019, 1, 10));
        order.cancellation_date = Some(d(2019, 5, 10));
        assert!(occurs_on(&order, d(2019, 4, 10)));
        assert!(!occurs_on(&order, d(2019, 5, 10)));

        order.cancellation_date = None;
        order.end_date = Some(d(2019, 8, 1));
        assert!(!occurs_on(&order, d(2019, 8, 10)));
    }

    #[test]
    fn test_generated_orders_start_after_opening() {
        let customers = create_test_customers(2019);
        let accounts = AccountGenerator::new(2019, 5).generate(&customers);
        let orders = DebitOrderGenerator::new(2019, 5).generate(&accounts);
        assert!(!orders.is_empty());

        for o in &orders {
            let account = accounts.iter().find(|a| a.account_id == o.account_id).unwrap();
            assert!(o.start_date >= account.opening_date);
            assert_eq!(o.start_date.year(), 2019);
            if let Some(c) = o.cancellation_date {
                assert!(c >= o.start_date);
                assert_eq!(o.status, DebitOrderStatus::Cancelled);
            }
        }
        println!("✅ Debit orders PASSED ({} orders)", orders.len());
    }
}
