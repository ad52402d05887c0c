// 💸 Loan Payments - monthly instalments, arrears variations and recovery attempts

use crate::banking::corruption;
use crate::banking::loan_defaults::LoanDefault;
use crate::banking::loans::{Loan, LoanType, FIRST_LOAN_YEAR};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_or_empty, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const GENERATOR: &str = "banking/loan_payments";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

pub const BASE_TRANSACTION_COST: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Automation {
    Automatic,
    Manual,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    RegularPayment,
    LatePayment,
    PartialPayment,
    ExtraPayment,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::RegularPayment => "regular_payment",
            PaymentType::LatePayment => "late_payment",
            PaymentType::PartialPayment => "partial_payment",
            PaymentType::ExtraPayment => "extra_payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    pub transaction_id: String,
    pub account_id: String,
    pub transaction_date: NaiveDate,
    pub transaction_time: NaiveTime,
    pub amount: f64,
    pub debit_credit: String,
    pub status: String,
    pub description: String,
    pub immediate_payment: bool,
    pub transaction_cost: f64,
    pub channel: String,
    pub loan_id: String,
    pub customer_id: String,
    pub loan_type: LoanType,
    pub payment_type: PaymentType,
    pub payment_automation: Automation,
    pub is_recovery_attempt: bool,
}

/// Instalment dates: the first of the month after approval + 30 days, then monthly
pub fn payment_schedule(approval: NaiveDate, terms_months: u32) -> Vec<NaiveDate> {
    let first = approval + Duration::days(30);
    let Some(first) = first.with_day(1) else {
        return Vec::new();
    };
    (0..terms_months)
        .filter_map(|k| first.checked_add_months(Months::new(k)))
        .collect()
}

/// (amount, type, description suffix)
fn payment_variation(rng: &mut Sampler, base: f64, recovery: bool) -> (f64, PaymentType, String) {
    if recovery {
        return if rng.chance(0.6) {
            (round_to(base * rng.uniform(0.2, 0.8), 2), PaymentType::PartialPayment, " - Partial Payment".to_string())
        } else {
            (base, PaymentType::RegularPayment, " - Recovery Payment".to_string())
        };
    }

    let roll = rng.uniform(0.0, 1.0);
    if roll < 0.85 {
        (base, PaymentType::RegularPayment, String::new())
    } else if roll < 0.92 {
        let fee = round_to(base * rng.uniform(0.02, 0.05), 2);
        (round_to(base + fee, 2), PaymentType::LatePayment, format!(" - Late Payment (Fee: R{:.2})", fee))
    } else if roll < 0.96 {
        (round_to(base * rng.uniform(0.5, 0.95), 2), PaymentType::PartialPayment, " - Partial Payment".to_string())
    } else {
        (round_to(base * rng.uniform(1.1, 2.0), 2), PaymentType::ExtraPayment, " - Extra Principal Payment".to_string())
    }
}

pub struct LoanPaymentGenerator {
    year: i32,
    rng: Sampler,
}

impl LoanPaymentGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        LoanPaymentGenerator {
            year,
            rng: Sampler::seeded(seed),
        }
    }

    pub fn generate(&mut self, loans: &[Loan], defaults: &[LoanDefault]) -> Vec<LoanPayment> {
        let default_dates: HashMap<&str, NaiveDate> = defaults
            .iter()
            .filter(|d| d.will_default)
            .filter_map(|d| d.default_date.map(|date| (d.loan_id.as_str(), date)))
            .collect();

        let mut payments = Vec::new();
        for loan in loans.iter().filter(|l| l.is_approved() && l.monthly_installment > 0.0) {
            let Some(approval) = loan.approval_date else {
                continue;
            };
            let automation = *self.rng.weighted(&[
                (Automation::Automatic, 0.65),
                (Automation::Manual, 0.25),
                (Automation::Mixed, 0.10),
            ]);
            let default_date = default_dates.get(loan.loan_id.as_str()).copied();
            let mut recovery_left = if default_date.is_some() { self.rng.int(2, 6) } else { 0 };

            for date in payment_schedule(approval.date(), loan.terms_months) {
                let mut recovery = false;
                if default_date.map_or(false, |d| date >= d) {
                    if recovery_left == 0 || !self.rng.chance(0.3) {
                        continue;
                    }
                    recovery = true;
                    recovery_left -= 1;
                }
                if date.year() != self.year {
                    continue;
                }
                payments.push(self.payment(loan, date, automation, recovery));
            }
        }

        payments.sort_by(|a, b| (a.transaction_date, a.transaction_time).cmp(&(b.transaction_date, b.transaction_time)));
        for (i, p) in payments.iter_mut().enumerate() {
            p.transaction_id = format!("TXNL{}{:07}", self.year, i + 1);
        }

        tracing::info!(year = self.year, payments = payments.len(), "loan payments generated");
        payments
    }

    fn payment(&mut self, loan: &Loan, date: NaiveDate, automation: Automation, recovery: bool) -> LoanPayment {
        let rng = &mut self.rng;
        let (amount, payment_type, suffix) = payment_variation(rng, loan.monthly_installment, recovery);

        let automatic = match automation {
            Automation::Automatic => true,
            Automation::Manual => false,
            Automation::Mixed => rng.chance(0.7),
        };

        let (channel, status, hour) = if automatic {
            let channel = *rng.weighted(&[("Automated", 0.85), ("Online", 0.10), ("Mobile", 0.05)]);
            let status = *rng.weighted(&[("Completed", 0.96), ("Failed", 0.03), ("Cancelled", 0.01)]);
            // Debit runs happen in the small hours
            let hour = if channel == "Automated" { *rng.pick(&[2, 3, 4]) } else { rng.int(1, 6) };
            (channel, status, hour)
        } else {
            let channel = *rng.weighted(&[
                ("Online", 0.40),
                ("Mobile", 0.25),
                ("Branch", 0.15),
                ("ATM", 0.12),
                ("Automated", 0.08),
            ]);
            let status = *rng.weighted(&[("Completed", 0.88), ("Failed", 0.08), ("Cancelled", 0.04)]);
            let hour = match channel {
                "Branch" => rng.int(9, 16),
                "ATM" => rng.int(8, 22),
                _ => rng.int(7, 23),
            };
            (channel, status, hour)
        };
        let time = NaiveTime::from_hms_opt(hour as u32, rng.int(0, 59) as u32, rng.int(0, 59) as u32)
            .unwrap_or_default();

        let immediate = matches!(channel, "Online" | "Mobile") && rng.chance(0.08);
        let cost = BASE_TRANSACTION_COST
            * if immediate {
                2.0
            } else {
                match channel {
                    "Branch" => 1.5,
                    "ATM" => 1.0,
                    _ => 0.5,
                }
            };

        LoanPayment {
            transaction_id: String::new(),
            account_id: loan.account_id.clone(),
            transaction_date: date,
            transaction_time: time,
            amount,
            debit_credit: "Debit".to_string(),
            status: status.to_string(),
            description: format!("Loan Payment - {}{}", loan.loan_id, suffix),
            immediate_payment: immediate,
            transaction_cost: round_to(cost, 2),
            channel: channel.to_string(),
            loan_id: loan.loan_id.clone(),
            customer_id: loan.customer_id.clone(),
            loan_type: loan.loan_type,
            payment_type,
            payment_automation: automation,
            is_recovery_attempt: recovery,
        }
    }

    /// Corruption shares this generator's stream so `--with-errors` stays reproducible
    pub fn rng(&mut self) -> &mut Sampler {
        &mut self.rng
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("💸 Generating loan payments for {}...", config.year);
    let mut loans: Vec<Loan> = Vec::new();
    let mut defaults: Vec<LoanDefault> = Vec::new();
    for year in FIRST_LOAN_YEAR..=config.year {
        loans.extend(read_or_empty::<Loan>(&layout.path(Domain::Banking, "loans", Some(year)))?);
        defaults.extend(read_or_empty::<LoanDefault>(&layout.path(Domain::Banking, "loan_defaults", Some(year)))?);
    }
    println!("   📂 {} loans, {} default flags", loans.len(), defaults.len());

    let mut generator = LoanPaymentGenerator::new(config.year, seed);
    let payments = generator.generate(&loans, &defaults);
    let path = layout.path(Domain::Banking, "loan_payments", Some(config.year));
    let rows = write_table(&path, &payments)?;
    println!("✓ Saved {} loan payments to {}", rows, path.display());

    let mut outputs = vec![path];
    if config.with_errors {
        let corrupted = corruption::corrupt_payments(&payments, generator.rng());
        let error_path = layout
            .domain_dir(Domain::Banking)
            .join(format!("loan_payments_{}_with_errors.csv", config.year));
        write_table(&error_path, &corrupted)?;
        println!("✓ Saved corrupted copy to {}", error_path.display());
        outputs.push(error_path);
    }

    Ok(RunOutcome::new(GENERATOR, config.year, seed, outputs, rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::banking::loans::tests::create_test_loans;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn create_test_payments(year: i32) -> (Vec<Loan>, Vec<LoanPayment>) {
        let (_, _, loans) = create_test_loans(year);
        let payments = LoanPaymentGenerator::new(year, 21).generate(&loans, &[]);
        (loans, payments)
    }

    #[test]
    fn test_schedule_starts_first_of_month_after_30_days() {
        let schedule = payment_schedule(d(2019, 1, 15), 3);
        assert_eq!(schedule, vec![d(2019, 2, 1), d(2019, 3, 1), d(2019, 4, 1)]);

        let schedule = payment_schedule(d(2019, 1, 1), 1);
        assert_eq!(schedule, vec![d(2019, 1, 1)], "Jan 31 rounds back to Jan 1");
    }

    #[test]
    fn test_payments_only_for_approved_loans_in_year() {
        let (loans, payments) = create_test_payments(2019);
        let approved: HashMap<&str, &Loan> = loans
            .iter()
            .filter(|l| l.is_approved())
            .map(|l| (l.loan_id.as_str(), l))
            .collect();

        for p in &payments {
            let loan = approved.get(p.loan_id.as_str()).expect("payment for an approved loan");
            assert_eq!(p.transaction_date.year(), 2019);
            assert_eq!(p.transaction_date.day(), 1);
            assert!(p.transaction_date > loan.approval_date.unwrap().date());
            assert!(p.amount > 0.0);
            assert!(!p.is_recovery_attempt);
        }
        println!("✅ Loan payments PASSED ({} payments)", payments.len());
    }

    #[test]
    fn test_default_stops_regular_payments() {
        let (loans, _) = create_test_payments(2019);
        let Some(loan) = loans.iter().find(|l| l.is_approved() && l.terms_months >= 12) else {
            return;
        };
        let approval = loan.approval_date.unwrap().date();
        let default = LoanDefault {
            loan_id: loan.loan_id.clone(),
            will_default: true,
            default_date: Some(approval + Duration::days(1)),
        };
        let year = (approval + Duration::days(31)).year();
        let payments = LoanPaymentGenerator::new(year, 3).generate(std::slice::from_ref(loan), &[default]);
        assert!(payments.len() <= 6, "at most 6 recovery attempts, got {}", payments.len());
        assert!(payments.iter().all(|p| p.is_recovery_attempt));
    }

    #[test]
    fn test_ids_year_scoped_and_ordered() {
        let (_, payments) = create_test_payments(2019);
        for (i, p) in payments.iter().enumerate() {
            assert_eq!(p.transaction_id, format!("TXNL2019{:07}", i + 1));
        }
        assert!(payments.windows(2).all(|w| w[0].transaction_date <= w[1].transaction_date));
    }
}
