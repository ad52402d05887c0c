// 💳 Premium Payments - the payment history implied by each policy's
// frequency, inside its effective window

use crate::config::{GeneratorConfig, SeedPolicy};
use crate::insurance::policies::{PaymentFrequency, Policy};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "insurance/payments";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

const PAYMENT_METHODS: [(&str, f64); 5] = [
    ("Debit Order", 0.60),
    ("EFT", 0.25),
    ("Credit Card", 0.10),
    ("Cash", 0.03),
    ("Mobile Payment", 0.02),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumPayment {
    pub payment_id: String,
    pub policy_number: String,
    pub applicant_id: String,
    pub payment_date: NaiveDate,
    pub amount_paid: u64,
    pub payment_method: String,
    pub payment_frequency: PaymentFrequency,
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Due dates for a policy. Recurring premiums fall on period ends
/// (month, quarter, half-year) or on the policy anniversary; a single
/// premium is paid on the effective date. Policies shorter than a day owe nothing.
pub fn due_dates(frequency: PaymentFrequency, effective: NaiveDate, expiration: NaiveDate) -> Vec<NaiveDate> {
    if expiration <= effective {
        return Vec::new();
    }
    let period_months = match frequency {
        PaymentFrequency::SinglePremium => return vec![effective],
        PaymentFrequency::Annually => {
            return (0..)
                .map_while(|n| effective.checked_add_months(Months::new(12 * n)))
                .take_while(|d| *d <= expiration)
                .collect();
        }
        PaymentFrequency::Monthly => 1,
        PaymentFrequency::Quarterly => 3,
        PaymentFrequency::SemiAnnually => 6,
    };

    // first period end on or after the effective date
    let first_month = (effective.month() - 1) / period_months * period_months + period_months;
    let mut dates = Vec::new();
    let (mut year, mut month) = (effective.year(), first_month);
    while let Some(due) = month_end(year, month) {
        if due > expiration {
            break;
        }
        dates.push(due);
        month += period_months;
        if month > 12 {
            month -= 12;
            year += 1;
        }
    }
    dates
}

pub struct PaymentScheduler {
    rng: Sampler,
    counter: usize,
}

impl PaymentScheduler {
    pub fn new(seed: u64) -> Self {
        PaymentScheduler {
            rng: Sampler::seeded(seed),
            counter: 0,
        }
    }

    pub fn generate(&mut self, policies: &[Policy]) -> Vec<PremiumPayment> {
        let mut payments = Vec::new();
        for policy in policies {
            for date in due_dates(policy.payment_frequency, policy.effective_date, policy.expiration_date) {
                self.counter += 1;
                payments.push(PremiumPayment {
                    payment_id: format!("PAY{:06}", self.counter),
                    policy_number: policy.policy_number.clone(),
                    applicant_id: policy.applicant_id.clone(),
                    payment_date: date,
                    amount_paid: policy.premium_amount,
                    payment_method: self.rng.weighted(&PAYMENT_METHODS).to_string(),
                    payment_frequency: policy.payment_frequency,
                });
            }
        }
        tracing::info!(policies = policies.len(), payments = payments.len(), "premium payments generated");
        payments
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("💳 Generating premium payments...");
    let policies: Vec<Policy> = read_table(&layout.path(Domain::Insurance, "policies", None))?;
    println!("   📂 {} policies", policies.len());

    let mut scheduler = PaymentScheduler::new(seed);
    let payments = scheduler.generate(&policies);

    let path = layout.path(Domain::Insurance, "payments", None);
    let rows = write_table(&path, &payments)?;
    println!("✓ Saved {} payments to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insurance::policies::tests::create_test_policies;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_month_ends() {
        let dates = due_dates(PaymentFrequency::Monthly, date(2019, 1, 15), date(2019, 4, 10));
        assert_eq!(dates, vec![date(2019, 1, 31), date(2019, 2, 28), date(2019, 3, 31)]);
    }

    #[test]
    fn test_quarterly_and_semi_annual() {
        let quarterly = due_dates(PaymentFrequency::Quarterly, date(2018, 5, 2), date(2019, 4, 1));
        assert_eq!(quarterly, vec![date(2018, 6, 30), date(2018, 9, 30), date(2018, 12, 31), date(2019, 3, 31)]);

        let semi = due_dates(PaymentFrequency::SemiAnnually, date(2018, 7, 1), date(2019, 12, 31));
        assert_eq!(semi, vec![date(2018, 12, 31), date(2019, 6, 30), date(2019, 12, 31)]);
    }

    #[test]
    fn test_annual_and_single() {
        let annual = due_dates(PaymentFrequency::Annually, date(2016, 2, 29), date(2019, 3, 1));
        assert_eq!(annual, vec![date(2016, 2, 29), date(2017, 2, 28), date(2018, 2, 28), date(2019, 2, 28)]);

        let single = due_dates(PaymentFrequency::SinglePremium, date(2017, 3, 3), date(2018, 3, 3));
        assert_eq!(single, vec![date(2017, 3, 3)]);
        assert!(due_dates(PaymentFrequency::Monthly, date(2017, 3, 3), date(2017, 3, 3)).is_empty());
    }

    #[test]
    fn test_payments_inside_policy_window() {
        let (_, policies) = create_test_policies();
        let payments = PaymentScheduler::new(42).generate(&policies);
        let by_number: HashMap<&str, &Policy> = policies.iter().map(|p| (p.policy_number.as_str(), p)).collect();

        for pay in &payments {
            let policy = by_number[pay.policy_number.as_str()];
            assert!(pay.payment_date >= policy.effective_date);
            assert!(pay.payment_date <= policy.expiration_date);
            assert_eq!(pay.amount_paid, policy.premium_amount);
        }
        println!("✅ {} payments PASSED", payments.len());
    }
}
