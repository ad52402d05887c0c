// 🧾 Transactions - day-by-day simulation of every open account over one year
//
// Per day: scheduled loan and debit-order debits, salaries, grants, weekend
// drinking, then category spending. Every debit goes through the balance
// tracker so no account drops below its tier's overdraft floor.

use crate::banking::accounts::Account;
use crate::banking::balance::{BalanceTracker, BankingTier, Direction};
use crate::banking::customers::BankCustomer;
use crate::banking::debit_order_transactions::DebitOrderTransaction;
use crate::banking::loan_payments::LoanPayment;
use crate::banking::merchants::{AgeGroup, Merchant, MerchantCatalog, SpendingBand, SpendingCategory};
use crate::config::{GeneratorConfig, SeedPolicy, VolumeBounds};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_or_empty, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const GENERATOR: &str = "banking/transactions";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

const FIRST_ACCOUNT_YEAR: i32 = 2015;
const SOCIAL_GRANT: f64 = 350.0;
const MIN_SALARY: f64 = 4_000.0;

/// Bank-wide purchases per day before calendar multipliers
const DAILY_VOLUMES: &[(SpendingCategory, VolumeBounds)] = &[
    (SpendingCategory::Groceries, VolumeBounds::new(80, 150)),
    (SpendingCategory::Clothing, VolumeBounds::new(8, 20)),
    (SpendingCategory::Fuel, VolumeBounds::new(15, 25)),
    (SpendingCategory::Restaurants, VolumeBounds::new(10, 25)),
    (SpendingCategory::Retail, VolumeBounds::new(5, 15)),
    (SpendingCategory::Transport, VolumeBounds::new(20, 40)),
    (SpendingCategory::Entertainment, VolumeBounds::new(3, 10)),
    (SpendingCategory::Medical, VolumeBounds::new(2, 8)),
    (SpendingCategory::Utilities, VolumeBounds::new(5, 12)),
    (SpendingCategory::Airtime, VolumeBounds::new(15, 30)),
];

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub transaction_date: NaiveDate,
    pub transaction_time: NaiveTime,
    pub amount: f64,
    pub debit_credit: String,
    pub category: String,
    pub status: String,
    pub description: String,
    pub immediate_payment: bool,
    pub receiving_account: Option<String>,
    pub receiving_bank: Option<String>,
    pub transaction_cost: f64,
    pub ewallet_number: Option<String>,
    pub channel: String,
    pub merchant_name: Option<String>,
    pub loan_id: Option<String>,
    pub debit_order_id: Option<String>,
}

impl From<&LoanPayment> for Transaction {
    fn from(p: &LoanPayment) -> Self {
        Transaction {
            transaction_id: p.transaction_id.clone(),
            account_id: p.account_id.clone(),
            transaction_date: p.transaction_date,
            transaction_time: p.transaction_time,
            amount: p.amount,
            debit_credit: Direction::Debit.as_str().to_string(),
            category: "loan payment".to_string(),
            status: p.status.to_lowercase(),
            description: p.description.clone(),
            immediate_payment: p.immediate_payment,
            receiving_account: None,
            receiving_bank: None,
            transaction_cost: p.transaction_cost,
            ewallet_number: None,
            channel: p.channel.to_lowercase(),
            merchant_name: None,
            loan_id: Some(p.loan_id.clone()),
            debit_order_id: None,
        }
    }
}

impl From<&DebitOrderTransaction> for Transaction {
    fn from(d: &DebitOrderTransaction) -> Self {
        Transaction {
            transaction_id: d.transaction_id.clone(),
            account_id: d.account_id.clone(),
            transaction_date: d.transaction_date,
            transaction_time: d.transaction_time,
            amount: d.amount,
            debit_credit: Direction::Debit.as_str().to_string(),
            category: "debit order".to_string(),
            status: d.status.to_lowercase(),
            description: d.description.clone(),
            immediate_payment: d.immediate_payment,
            receiving_account: Some(d.receiving_account.clone()),
            receiving_bank: d.receiving_bank.clone(),
            transaction_cost: d.transaction_cost,
            ewallet_number: d.ewallet_number.clone(),
            channel: d.channel.to_lowercase(),
            merchant_name: None,
            loan_id: None,
            debit_order_id: Some(d.debit_order_id.clone()),
        }
    }
}

// ============================================================================
// SPENDER PROFILES
// ============================================================================

/// Account holder attributes that drive spending
#[derive(Debug, Clone)]
pub struct Spender {
    pub account_id: String,
    pub opening_date: NaiveDate,
    pub closure_date: Option<NaiveDate>,
    pub tier: BankingTier,
    pub age: Option<u32>,
    pub monthly_income: Option<f64>,
    pub occupation: String,
    pub is_company: bool,
    pub distress: f64,
}

impl Spender {
    fn is_open_on(&self, date: NaiveDate) -> bool {
        self.opening_date <= date && self.closure_date.map_or(true, |c| date <= c)
    }

    fn is_working(&self) -> bool {
        !self.is_company && self.occupation != "Unemployed" && !self.occupation.contains("Student")
    }

    fn is_unemployed(&self) -> bool {
        !self.is_company && self.occupation == "Unemployed"
    }

    fn can_drink(&self) -> bool {
        !self.is_company
            && self.age.map_or(false, |a| (18..=65).contains(&a))
            && !self.occupation.contains("Student")
    }
}

/// Distress drawn from monthly income: 0.0 (fine), 0.5 (stretched) or 0.8 (distressed)
fn draw_distress(rng: &mut Sampler, monthly_income: f64) -> f64 {
    let weights = if monthly_income < 15_000.0 {
        [0.6, 0.3, 0.1]
    } else if monthly_income > 40_000.0 {
        [0.8, 0.15, 0.05]
    } else {
        [0.7, 0.25, 0.05]
    };
    [0.0, 0.5, 0.8][rng.weighted_index(&weights)]
}

/// Joins accounts to their holders, filling missing attributes with synthetic values
pub fn build_spenders(accounts: &[Account], customers: &[BankCustomer], year: i32, rng: &mut Sampler) -> Vec<Spender> {
    let by_id: HashMap<&str, &BankCustomer> = customers.iter().map(|c| (c.customer_id.as_str(), c)).collect();
    let mut synthetic_age = 0usize;
    let mut synthetic_income = 0usize;

    let spenders: Vec<Spender> = accounts
        .iter()
        .map(|account| {
            let customer = by_id.get(account.customer_id.as_str()).copied();
            let is_company = customer.map_or(false, |c| c.is_company());

            let age = match customer {
                Some(c) if c.is_company() => None,
                Some(c) => c
                    .birth_date
                    .map(|d| (year - d.year()).max(0) as u32)
                    .or(c.age),
                None => None,
            };
            let age = if age.is_none() && !is_company {
                synthetic_age += 1;
                Some(realistic_age(rng))
            } else {
                age
            };

            let monthly_income = match customer.and_then(|c| c.annual_income) {
                Some(income) if income > 0.0 => income / 12.0,
                _ => {
                    synthetic_income += 1;
                    rng.normal(25_000.0, 8_000.0).max(MIN_SALARY)
                }
            };
            let occupation = customer.map_or_else(|| "Employed".to_string(), |c| c.occupation.clone());

            let mut tier = BankingTier::for_account_type(account.account_type);
            if occupation.contains("Student") && matches!(tier, BankingTier::Basic | BankingTier::Standard) {
                tier = BankingTier::Student;
            }

            Spender {
                account_id: account.account_id.clone(),
                opening_date: account.opening_date,
                closure_date: account.closure_date,
                tier,
                age,
                monthly_income: Some(monthly_income),
                occupation,
                is_company,
                distress: draw_distress(rng, monthly_income),
            }
        })
        .collect();

    if synthetic_age > 0 || synthetic_income > 0 {
        tracing::warn!(synthetic_age, synthetic_income, "filled missing holder attributes with synthetic values");
    }
    spenders
}

fn realistic_age(rng: &mut Sampler) -> u32 {
    let bands = [((18, 25), 0.25), ((26, 35), 0.30), ((36, 45), 0.20), ((46, 55), 0.15), ((56, 65), 0.07), ((66, 80), 0.03)];
    let (lo, hi) = *rng.weighted(&bands);
    rng.int(lo, hi) as u32
}

// ============================================================================
// DRAWS
// ============================================================================

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Purchase hour: peak hours 60% of the time, else 08-21
fn purchase_hour(rng: &mut Sampler, category: SpendingCategory, date: NaiveDate) -> u32 {
    let shift = if is_weekend(date) && category.is_nightlife() { 2 } else { 0 };
    if rng.chance(0.6) {
        let peaks = category.peak_hours();
        (rng.pick(peaks) + shift).min(23)
    } else {
        rng.int(8, 21) as u32
    }
}

pub fn purchase_amount(rng: &mut Sampler, merchant: &Merchant, spender: &Spender, category: SpendingCategory) -> f64 {
    let base = rng.normal(merchant.avg_amount, merchant.std_deviation);
    let age = AgeGroup::of(spender.age).preference(category);
    let band = SpendingBand::of(spender.monthly_income).multiplier(category, spender.distress);
    round_to((base * age * band).max(10.0), 2)
}

pub fn purchase_status(rng: &mut Sampler, merchant: &Merchant, date: NaiveDate, distress: f64) -> &'static str {
    let (_, mut cancelled, mut failed, pending) = merchant.size.status_weights();
    if distress > 0.5 {
        failed = (failed * (1.0 + distress)).min(0.1);
        cancelled = (cancelled * (1.0 + distress)).min(0.1);
    }
    if is_weekend(date) {
        failed = (failed * 1.5).min(0.08);
    }
    let completed = 1.0 - (cancelled + failed + pending);
    *rng.weighted(&[
        ("completed", completed),
        ("cancelled", cancelled),
        ("failed", failed),
        ("pending", pending),
    ])
}

fn time_at(rng: &mut Sampler, hour: u32) -> NaiveTime {
    let minute = rng.int(0, 59) as u32;
    let second = rng.int(0, 59) as u32;
    NaiveTime::from_hms_opt(hour.min(23), minute, second).unwrap_or_default()
}

// ============================================================================
// SIMULATOR
// ============================================================================

pub struct TransactionSimulator {
    year: i32,
    scale: f64,
    rng: Sampler,
    catalog: MerchantCatalog,
    tracker: BalanceTracker,
    counter: usize,
    paydays: HashMap<String, u32>,
    grant_days: HashMap<String, u32>,
}

impl TransactionSimulator {
    pub fn new(year: i32, seed: u64, scale: f64) -> Self {
        TransactionSimulator {
            year,
            scale,
            rng: Sampler::seeded(seed),
            catalog: MerchantCatalog::with_defaults(),
            tracker: BalanceTracker::new(),
            counter: 1,
            paydays: HashMap::new(),
            grant_days: HashMap::new(),
        }
    }

    pub fn tracker(&self) -> &BalanceTracker {
        &self.tracker
    }

    fn next_id(&mut self) -> String {
        let id = format!("TXN{}{:06}", self.year, self.counter);
        self.counter += 1;
        id
    }

    /// Runs the whole year; rows come back in day order
    pub fn simulate(
        &mut self,
        spenders: &[Spender],
        loan_payments: &[LoanPayment],
        debit_orders: &[DebitOrderTransaction],
    ) -> Vec<Transaction> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(self.year, 1, 1),
            NaiveDate::from_ymd_opt(self.year, 12, 31),
        ) else {
            return Vec::new();
        };

        let mut scheduled: HashMap<NaiveDate, Vec<Transaction>> = HashMap::new();
        for t in loan_payments
            .iter()
            .map(Transaction::from)
            .chain(debit_orders.iter().map(Transaction::from))
        {
            scheduled.entry(t.transaction_date).or_default().push(t);
        }

        let mut rows = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            let open: Vec<&Spender> = spenders.iter().filter(|s| s.is_open_on(date)).collect();
            rows.extend(self.open_new_accounts(&open, date, start));

            if date.day() == 1 {
                self.plan_month(&open);
            }

            if let Some(mut due) = scheduled.remove(&date) {
                // scheduled rows only land on accounts open that day
                let before = due.len();
                let open_ids: HashSet<&str> = open.iter().map(|s| s.account_id.as_str()).collect();
                due.retain(|t| open_ids.contains(t.account_id.as_str()));
                if due.len() < before {
                    tracing::debug!(%date, dropped = before - due.len(), "scheduled rows for closed or unopened accounts");
                }
                due.sort_by_key(|t| t.transaction_time);
                for t in &due {
                    self.tracker.process(&t.account_id, t.amount, Direction::Debit);
                }
                rows.extend(due);
            }

            rows.extend(self.salaries(&open, date));
            rows.extend(self.grants(&open, date));
            rows.extend(self.alcohol(&open, date));
            for (category, volume) in DAILY_VOLUMES {
                rows.extend(self.category_spending(&open, date, *category, *volume));
            }
        }

        tracing::info!(year = self.year, rows = rows.len(), accounts = self.tracker.len(), "transactions simulated");
        rows
    }

    /// Accounts enter the tracker on their opening day (or Jan 1 when opened earlier)
    fn open_new_accounts(&mut self, open: &[&Spender], date: NaiveDate, start: NaiveDate) -> Vec<Transaction> {
        let fresh: Vec<&Spender> = open
            .iter()
            .copied()
            .filter(|s| !self.tracker.is_tracked(&s.account_id))
            .collect();
        let mut rows = Vec::new();
        for spender in fresh {
            if spender.opening_date < start {
                let carried = self.rng.uniform(500.0, 15_000.0);
                self.tracker.initialize(&spender.account_id, spender.tier, round_to(carried, 2));
                continue;
            }

            let deposit = round_to(self.rng.uniform(200.0, 8_000.0), 2);
            self.tracker.initialize(&spender.account_id, spender.tier, deposit);
            let hour = self.rng.int(8, 16) as u32;
            let time = time_at(&mut self.rng, hour);
            let channel = *self.rng.pick(&["branch", "online banking"]);
            let id = self.next_id();
            rows.push(Transaction {
                transaction_id: id,
                account_id: spender.account_id.clone(),
                transaction_date: date,
                transaction_time: time,
                amount: deposit,
                debit_credit: Direction::Credit.as_str().to_string(),
                category: "initial deposit".to_string(),
                status: "completed".to_string(),
                description: "Account opening deposit".to_string(),
                immediate_payment: false,
                receiving_account: Some(spender.account_id.clone()),
                receiving_bank: None,
                transaction_cost: 0.0,
                ewallet_number: None,
                channel: channel.to_string(),
                merchant_name: None,
                loan_id: None,
                debit_order_id: None,
            });
        }
        rows
    }

    /// One salary (80% of earners) on a day in 23-28, one grant on a day in 1-5
    fn plan_month(&mut self, open: &[&Spender]) {
        self.paydays.clear();
        self.grant_days.clear();
        for spender in open {
            if spender.is_working() && self.rng.chance(0.8) {
                let day = self.rng.int(23, 28) as u32;
                self.paydays.insert(spender.account_id.clone(), day);
            } else if spender.is_unemployed() {
                let day = self.rng.int(1, 5) as u32;
                self.grant_days.insert(spender.account_id.clone(), day);
            }
        }
    }

    fn credit_row(&mut self, spender: &Spender, date: NaiveDate, time: NaiveTime, amount: f64, kind: (&str, &str), channel: &str) -> Transaction {
        self.tracker.process(&spender.account_id, amount, Direction::Credit);
        Transaction {
            transaction_id: self.next_id(),
            account_id: spender.account_id.clone(),
            transaction_date: date,
            transaction_time: time,
            amount,
            debit_credit: Direction::Credit.as_str().to_string(),
            category: kind.0.to_string(),
            status: "completed".to_string(),
            description: kind.1.to_string(),
            immediate_payment: false,
            receiving_account: Some(spender.account_id.clone()),
            receiving_bank: None,
            transaction_cost: 0.0,
            ewallet_number: None,
            channel: channel.to_string(),
            merchant_name: None,
            loan_id: None,
            debit_order_id: None,
        }
    }

    fn salaries(&mut self, open: &[&Spender], date: NaiveDate) -> Vec<Transaction> {
        let due: Vec<&Spender> = open
            .iter()
            .copied()
            .filter(|s| self.paydays.get(&s.account_id) == Some(&date.day()))
            .collect();
        let mut rows = Vec::new();
        for spender in due {
            let base = spender.monthly_income.unwrap_or(25_000.0).abs().max(MIN_SALARY);
            let amount = round_to(self.rng.normal(base, base * 0.2).max(MIN_SALARY), 2);
            let hour = self.rng.int(6, 9) as u32;
            let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default();
            let channel = *self.rng.pick(&["online banking", "mobile banking app"]);
            rows.push(self.credit_row(spender, date, time, amount, ("salary payment", "Monthly salary"), channel));
        }
        rows
    }

    fn grants(&mut self, open: &[&Spender], date: NaiveDate) -> Vec<Transaction> {
        let time = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default();
        let due: Vec<&Spender> = open
            .iter()
            .copied()
            .filter(|s| self.grant_days.get(&s.account_id) == Some(&date.day()))
            .collect();
        let mut rows = Vec::new();
        for spender in due {
            rows.push(self.credit_row(spender, date, time, SOCIAL_GRANT, ("government grant", "Monthly social grant"), "branch"));
        }
        rows
    }

    /// Shrinks a debit to the headroom left above the floor; None when below `minimum`
    fn affordable(&self, account_id: &str, amount: f64, margin: f64, minimum: f64) -> Option<f64> {
        if self.tracker.can_transact(account_id, amount) {
            return Some(amount);
        }
        let headroom = round_to(self.tracker.headroom(account_id, margin), 2);
        (headroom >= minimum).then(|| amount.min(headroom))
    }

    fn purchase_row(&mut self, spender: &Spender, merchant: &Merchant, category: SpendingCategory, date: NaiveDate, time: NaiveTime, amount: f64, channel: &str) -> Transaction {
        let status = purchase_status(&mut self.rng, merchant, date, spender.distress);
        Transaction {
            transaction_id: self.next_id(),
            account_id: spender.account_id.clone(),
            transaction_date: date,
            transaction_time: time,
            amount,
            debit_credit: Direction::Debit.as_str().to_string(),
            category: category.as_str().to_string(),
            status: status.to_string(),
            description: format!("Purchase at {}", merchant.name),
            immediate_payment: false,
            receiving_account: None,
            receiving_bank: None,
            transaction_cost: 0.0,
            ewallet_number: None,
            channel: channel.to_string(),
            merchant_name: Some(merchant.name.to_string()),
            loan_id: None,
            debit_order_id: None,
        }
    }

    /// Thursday to Sunday evenings
    fn alcohol(&mut self, open: &[&Spender], date: NaiveDate) -> Vec<Transaction> {
        let (probability, hours) = match date.weekday() {
            Weekday::Sat | Weekday::Sun => (0.18, (16, 23)),
            Weekday::Fri => (0.15, (17, 22)),
            Weekday::Thu => (0.08, (18, 21)),
            _ => return Vec::new(),
        };
        let drinkers: Vec<&Spender> = open.iter().copied().filter(|s| s.can_drink()).collect();
        let n = (drinkers.len() as f64 * probability) as usize;
        if n == 0 {
            return Vec::new();
        }

        let mut rows = Vec::new();
        for spender in self.rng.sample(&drinkers, n) {
            if spender.distress > 0.5 && self.rng.chance(0.5) {
                continue;
            }
            let Some(merchant) = self.catalog.pick(SpendingCategory::Alcohol, &mut self.rng) else {
                continue;
            };
            let amount = purchase_amount(&mut self.rng, merchant, spender, SpendingCategory::Alcohol);
            let Some(amount) = self.affordable(&spender.account_id, amount, 10.0, 50.0) else {
                continue;
            };
            if !self.tracker.process(&spender.account_id, amount, Direction::Debit) {
                continue;
            }
            let hour = self.rng.int(hours.0, hours.1) as u32;
            let minute = self.rng.int(0, 59) as u32;
            let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
            rows.push(self.purchase_row(spender, merchant, SpendingCategory::Alcohol, date, time, amount, "pos"));
        }
        rows
    }

    fn category_spending(&mut self, open: &[&Spender], date: NaiveDate, category: SpendingCategory, volume: VolumeBounds) -> Vec<Transaction> {
        if open.is_empty() {
            return Vec::new();
        }
        let weekend = if is_weekend(date) { category.weekend_multiplier() } else { 1.0 };
        let payday = if (25..=28).contains(&date.day()) { category.payday_multiplier() } else { 1.0 };
        let month_start = date.day() <= 7 && !matches!(category, SpendingCategory::Utilities | SpendingCategory::Medical);
        let cash_flow = if month_start { 0.6 } else { 1.0 };

        let base = volume.scaled(self.scale).draw(&mut self.rng);
        let count = (base as f64 * weekend * payday * cash_flow) as usize;

        let mut rows = Vec::new();
        for _ in 0..count {
            let spender = *self.rng.pick(open);
            if spender.distress > 0.5 && category.is_discretionary() && self.rng.chance(0.5) {
                continue;
            }
            let Some(merchant) = self.catalog.pick(category, &mut self.rng) else {
                continue;
            };
            let hour = purchase_hour(&mut self.rng, category, date);
            if !merchant.is_open(hour) {
                continue;
            }
            let amount = purchase_amount(&mut self.rng, merchant, spender, category);
            let Some(amount) = self.affordable(&spender.account_id, amount, 20.0, 10.0) else {
                continue;
            };
            if !self.tracker.process(&spender.account_id, amount, Direction::Debit) {
                continue;
            }
            let time = time_at(&mut self.rng, hour);
            let channel = if category.is_in_store() {
                "pos"
            } else {
                *self.rng.pick(&["pos", "online banking"])
            };
            rows.push(self.purchase_row(spender, merchant, category, date, time, amount, channel));
        }
        rows
    }
}

// ============================================================================
// RUN
// ============================================================================

fn dedup_accounts(accounts: Vec<Account>) -> Vec<Account> {
    let mut by_id: HashMap<String, Account> = HashMap::new();
    for account in accounts {
        by_id.insert(account.account_id.clone(), account);
    }
    let mut accounts: Vec<Account> = by_id.into_values().collect();
    accounts.sort_by(|a, b| a.account_id.cmp(&b.account_id));
    accounts
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🧾 Simulating transactions for {}...", config.year);
    let mut accounts: Vec<Account> = Vec::new();
    let mut customers: Vec<BankCustomer> = Vec::new();
    for year in FIRST_ACCOUNT_YEAR..=config.year {
        accounts.extend(read_or_empty::<Account>(&layout.path(Domain::Banking, "accounts", Some(year)))?);
        customers.extend(read_or_empty::<BankCustomer>(&layout.path(Domain::Banking, "customers", Some(year)))?);
    }
    // Accounts closed before the year never transact
    let accounts: Vec<Account> = dedup_accounts(accounts)
        .into_iter()
        .filter(|a| a.closure_date.map_or(true, |c| c.year() >= config.year))
        .collect();

    let loan_payments: Vec<LoanPayment> =
        read_or_empty(&layout.path(Domain::Banking, "loan_payments", Some(config.year)))?;
    let debit_orders: Vec<DebitOrderTransaction> =
        read_or_empty(&layout.path(Domain::Banking, "debit_order_transactions", Some(config.year)))?;
    println!(
        "   📂 {} accounts, {} loan payments, {} debit orders scheduled",
        accounts.len(),
        loan_payments.len(),
        debit_orders.len()
    );

    let mut profile_rng = Sampler::seeded(seed ^ 0x5eed);
    let spenders = build_spenders(&accounts, &customers, config.year, &mut profile_rng);
    let mut simulator = TransactionSimulator::new(config.year, seed, config.scale);
    let transactions = simulator.simulate(&spenders, &loan_payments, &debit_orders);

    let mut outputs = Vec::new();
    let mut total = 0;
    for month in 1..=12 {
        let rows: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.transaction_date.month() == month)
            .collect();
        let path = layout.monthly_path(config.year, month);
        total += write_table(&path, &rows)?;
        println!("   ✓ {:02}: {} transactions", month, rows.len());
        outputs.push(path);
    }
    println!("✓ Saved {} transactions across 12 monthly files", total);

    Ok(RunOutcome::new(GENERATOR, config.year, seed, outputs, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::accounts::tests::create_test_customers;
    use crate::banking::accounts::AccountGenerator;

    fn create_test_spenders(year: i32) -> (Vec<Account>, Vec<Spender>) {
        let customers = create_test_customers(year);
        let accounts = AccountGenerator::new(year, 11).generate(&customers);
        let mut rng = Sampler::seeded(12);
        let spenders = build_spenders(&accounts, &customers, year, &mut rng);
        (accounts, spenders)
    }

    #[test]
    fn test_no_transaction_before_opening() {
        let (accounts, spenders) = create_test_spenders(2019);
        let opened: HashMap<&str, NaiveDate> =
            accounts.iter().map(|a| (a.account_id.as_str(), a.opening_date)).collect();

        let mut sim = TransactionSimulator::new(2019, 5, 0.1);
        let rows = sim.simulate(&spenders, &[], &[]);
        assert!(!rows.is_empty());
        for t in &rows {
            assert!(t.transaction_date >= opened[t.account_id.as_str()], "{} before opening", t.transaction_id);
            assert_eq!(t.transaction_date.year(), 2019);
        }
        println!("✅ Opening date ordering PASSED ({} rows)", rows.len());
    }

    #[test]
    fn test_balances_stay_above_floor() {
        let (_, spenders) = create_test_spenders(2019);
        let mut sim = TransactionSimulator::new(2019, 6, 0.1);
        sim.simulate(&spenders, &[], &[]);

        for s in &spenders {
            if sim.tracker().is_tracked(&s.account_id) {
                assert!(
                    sim.tracker().balance(&s.account_id) >= s.tier.overdraft_floor() - 1e-6,
                    "{} below floor",
                    s.account_id
                );
            }
        }
    }

    #[test]
    fn test_one_salary_per_month_and_sequential_ids() {
        let (_, spenders) = create_test_spenders(2019);
        let mut sim = TransactionSimulator::new(2019, 7, 0.05);
        let rows = sim.simulate(&spenders, &[], &[]);

        let mut per_month: HashMap<(String, u32), usize> = HashMap::new();
        for t in rows.iter().filter(|t| t.category == "salary payment") {
            assert!((23..=28).contains(&t.transaction_date.day()));
            *per_month.entry((t.account_id.clone(), t.transaction_date.month())).or_default() += 1;
        }
        assert!(per_month.values().all(|n| *n == 1), "one salary per account per month");

        let generated: Vec<&Transaction> = rows.iter().filter(|t| t.transaction_id.starts_with("TXN2019")).collect();
        for (i, t) in generated.iter().enumerate() {
            assert_eq!(t.transaction_id, format!("TXN2019{:06}", i + 1));
        }
    }

    #[test]
    fn test_scheduled_rows_applied_once() {
        let (_, spenders) = create_test_spenders(2019);
        let date = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        let spender = spenders.iter().find(|s| s.is_open_on(date)).unwrap();
        let debit = create_test_debit(&spender.account_id, date);

        let mut sim = TransactionSimulator::new(2019, 8, 0.0);
        let rows = sim.simulate(&spenders, &[], &[debit]);
        let scheduled: Vec<&Transaction> = rows.iter().filter(|t| t.category == "debit order").collect();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].transaction_id, "TXND20190000001");
        assert_eq!(scheduled[0].debit_credit, "debit");
    }

    #[test]
    fn test_scheduled_rows_before_opening_dropped() {
        let (_, spenders) = create_test_spenders(2019);
        let spender = spenders
            .iter()
            .find(|s| s.opening_date > NaiveDate::from_ymd_opt(2019, 1, 1).unwrap())
            .unwrap();
        let early = spender.opening_date.pred_opt().unwrap();
        let debits = vec![
            create_test_debit(&spender.account_id, early),
            create_test_debit("ACC-NOT-IN-BOOK", NaiveDate::from_ymd_opt(2019, 3, 1).unwrap()),
        ];

        let mut sim = TransactionSimulator::new(2019, 9, 0.0);
        let rows = sim.simulate(&spenders, &[], &debits);
        assert!(rows.iter().all(|t| t.category != "debit order"), "scheduled rows must wait for the account to open");
        for t in &rows {
            assert!(t.transaction_date >= spenders.iter().find(|s| s.account_id == t.account_id).unwrap().opening_date);
        }
        println!("✅ Scheduled rows before opening PASSED");
    }

    fn create_test_debit(account_id: &str, date: NaiveDate) -> DebitOrderTransaction {
        DebitOrderTransaction {
            transaction_id: "TXND20190000001".to_string(),
            account_id: account_id.to_string(),
            customer_id: "IND2019000001".to_string(),
            transaction_date: date,
            transaction_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            amount: 199.0,
            debit_credit: "Debit".to_string(),
            status: "Completed".to_string(),
            description: "Gym".to_string(),
            immediate_payment: false,
            receiving_account: "ZA0000".to_string(),
            receiving_bank: None,
            transaction_cost: 0.0,
            ewallet_number: None,
            channel: "Automated".to_string(),
            debit_order_id: "DO2019000001".to_string(),
            debit_order_type: "Gym".to_string(),
        }
    }

    #[test]
    fn test_status_weights_under_distress() {
        let catalog = MerchantCatalog::with_defaults();
        let merchant = catalog.find("PEP").unwrap();
        let mut rng = Sampler::seeded(3);
        let saturday = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        let failures = (0..5_000)
            .filter(|_| purchase_status(&mut rng, merchant, saturday, 0.8) == "failed")
            .count();
        // failed is capped at 8% on weekends
        assert!(failures < 5_000 * 10 / 100, "failures {}", failures);
    }
}
