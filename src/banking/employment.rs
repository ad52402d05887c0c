// 💼 Employment Panel - monthly employed/unemployed status per individual, 2018-2024

use crate::banking::accounts::IncomeLevel;
use crate::banking::customers::BankCustomer;
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "banking/employment";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

pub const PANEL_START: (i32, u32) = (2018, 1);
pub const PANEL_END: (i32, u32) = (2024, 12);

const JOB_LOSS: f64 = 0.02;
const REHIRE: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentStatus {
    pub customer_id: String,
    /// First day of the month
    pub period: NaiveDate,
    pub is_employed: bool,
    pub occupation: String,
}

/// Monthly (job loss, rehire) probabilities for one person in one year
pub fn transition_probabilities(year: i32, age: u32, income: IncomeLevel) -> (f64, f64) {
    let (mut loss, mut rehire) = (JOB_LOSS, REHIRE);
    if year == 2020 {
        loss *= 3.0;
        rehire *= 0.5;
    }
    if age < 25 || age > 60 {
        loss *= 1.5;
    }
    if income == IncomeLevel::Low {
        loss *= 1.2;
        rehire *= 0.8;
    }
    (loss, rehire)
}

fn periods() -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let (mut year, mut month) = PANEL_START;
    while (year, month) <= PANEL_END {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, 1) {
            out.push(d);
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    out
}

pub fn employment_panel(customers: &[BankCustomer], rng: &mut Sampler) -> Vec<EmploymentStatus> {
    let periods = periods();
    let mut rows = Vec::new();

    for customer in customers.iter().filter(|c| !c.is_company()) {
        let occupation = customer.occupation.clone();
        let mut employed = !customer.is_unemployed() && !occupation.contains("Student");
        let income = IncomeLevel::of(customer.annual_income);
        let birth_year = customer.birth_date.map(|d| d.year());

        for period in &periods {
            let age = match birth_year {
                Some(by) => (period.year() - by).max(0) as u32,
                None => customer.age.unwrap_or(35),
            };
            let (loss, rehire) = transition_probabilities(period.year(), age, income);

            if !employed && rng.chance(rehire) {
                employed = true;
            } else if employed && rng.chance(loss) {
                employed = false;
            }

            rows.push(EmploymentStatus {
                customer_id: customer.customer_id.clone(),
                period: *period,
                is_employed: employed,
                occupation: if employed { occupation.clone() } else { "Unemployed".to_string() },
            });
        }
    }
    rows
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("💼 Generating employment panel for {} customers...", config.year);
    let customers: Vec<BankCustomer> = read_table(&layout.path(Domain::Banking, "customers", Some(config.year)))?;
    let mut rng = Sampler::seeded(seed);
    let panel = employment_panel(&customers, &mut rng);

    let path = layout.path(Domain::Banking, "employment", Some(config.year));
    let rows = write_table(&path, &panel)?;
    println!("✓ Saved {} monthly statuses to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::accounts::tests::create_test_customers;

    #[test]
    fn test_transition_probabilities_not_compounded() {
        assert_eq!(transition_probabilities(2019, 30, IncomeLevel::Medium), (0.02, 0.15));
        let (loss, rehire) = transition_probabilities(2020, 22, IncomeLevel::Low);
        assert!((loss - 0.02 * 3.0 * 1.5 * 1.2).abs() < 1e-12);
        assert!((rehire - 0.15 * 0.5 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_panel_shape() {
        let customers = create_test_customers(2019);
        let individuals = customers.iter().filter(|c| !c.is_company()).count();
        let mut rng = Sampler::seeded(8);
        let panel = employment_panel(&customers, &mut rng);

        assert_eq!(periods().len(), 84);
        assert_eq!(panel.len(), individuals * 84);
        for row in panel.iter().filter(|r| !r.is_employed) {
            assert_eq!(row.occupation, "Unemployed");
        }
        assert!(panel.iter().all(|r| r.period.day() == 1));
    }
}
