// ⚠️ Loan Defaults - which loans default and when

use crate::banking::customers::BankCustomer;
use crate::banking::loans::{Loan, FIRST_LOAN_YEAR};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_or_empty, read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const GENERATOR: &str = "banking/loan_defaults";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

const BASE_DEFAULT_PROBABILITY: f64 = 0.15;
const UNKNOWN_RISK: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDefault {
    pub loan_id: String,
    pub will_default: bool,
    pub default_date: Option<NaiveDate>,
}

pub fn default_probability(risk_score: f64, application_year: i32) -> f64 {
    let p = BASE_DEFAULT_PROBABILITY * (1.0 + risk_score * 2.0);
    if application_year == 2020 {
        p * 1.5
    } else {
        p
    }
}

pub fn generate_defaults(loans: &[Loan], customers: &[BankCustomer], rng: &mut Sampler) -> Vec<LoanDefault> {
    let risk: HashMap<&str, f64> = customers
        .iter()
        .map(|c| (c.customer_id.as_str(), c.risk_score))
        .collect();

    loans
        .iter()
        .map(|loan| {
            let risk_score = risk.get(loan.customer_id.as_str()).copied().unwrap_or(UNKNOWN_RISK);
            let start = loan.application_date.date();
            let will_default = rng.chance(default_probability(risk_score, start.year()));

            let default_date = if will_default {
                let end = start
                    .checked_add_months(Months::new(loan.terms_months))
                    .unwrap_or(start);
                let term_days = (end - start).num_days();
                // Defaults land within two years of the application
                (term_days > 0).then(|| start + Duration::days(rng.int(30, term_days.min(730))))
            } else {
                None
            };

            LoanDefault {
                loan_id: loan.loan_id.clone(),
                will_default,
                default_date,
            }
        })
        .collect()
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("⚠️  Generating loan defaults for {}...", config.year);
    let loans: Vec<Loan> = read_table(&layout.path(Domain::Banking, "loans", Some(config.year)))?;
    let mut customers: Vec<BankCustomer> = Vec::new();
    for year in FIRST_LOAN_YEAR..=config.year {
        customers.extend(read_or_empty::<BankCustomer>(&layout.path(Domain::Banking, "customers", Some(year)))?);
    }

    let mut rng = Sampler::seeded(seed);
    let defaults = generate_defaults(&loans, &customers, &mut rng);
    let path = layout.path(Domain::Banking, "loan_defaults", Some(config.year));
    let rows = write_table(&path, &defaults)?;
    println!(
        "✓ Saved {} default flags ({} defaulting) to {}",
        rows,
        defaults.iter().filter(|d| d.will_default).count(),
        path.display()
    );

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::loans::tests::create_test_loans;

    #[test]
    fn test_probability_rule() {
        assert!((default_probability(0.0, 2019) - 0.15).abs() < 1e-9);
        assert!((default_probability(1.0, 2019) - 0.45).abs() < 1e-9);
        assert!((default_probability(1.0, 2020) - 0.675).abs() < 1e-9);
    }

    #[test]
    fn test_default_dates_follow_application() {
        let (customers, _, loans) = create_test_loans(2019);
        let mut rng = Sampler::seeded(4);
        let defaults = generate_defaults(&loans, &customers, &mut rng);
        assert_eq!(defaults.len(), loans.len());

        let by_id: HashMap<&str, &Loan> = loans.iter().map(|l| (l.loan_id.as_str(), l)).collect();
        for d in defaults.iter().filter(|d| d.will_default) {
            let loan = by_id[d.loan_id.as_str()];
            let date = d.default_date.expect("defaulting loan has a date");
            let offset = (date - loan.application_date.date()).num_days();
            assert!((30..=730).contains(&offset), "offset {}", offset);
        }
        assert!(defaults.iter().filter(|d| !d.will_default).all(|d| d.default_date.is_none()));
        println!("✅ Loan defaults PASSED");
    }
}
