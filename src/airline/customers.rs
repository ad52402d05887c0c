// 🧳 Airline Customers - travellers registered in a year, grouped under client accounts
//
// A client account holds 1-5 travellers. The first is the main holder and
// always an adult. Corporate accounts (COM) book bigger parties.

use crate::airline::check_year;
use crate::config::{GeneratorConfig, SeedPolicy, VolumeBounds};
use crate::identity::{
    city_and_province, document_number, draw_sa_demographic, email_for, full_name, phone_number,
    sa_address, Demographic, Gender, IdDocument, EMAIL_DOMAINS, PHONE_PLANS, SOUTH_AFRICA,
};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "airline/customers";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

pub const TRAVELLERS: VolumeBounds = VolumeBounds::new(70_000, 200_000);

const SA_SHARE: f64 = 0.6;
const CORPORATE_SHARE: f64 = 0.05;
const ENTRY_MODES: [&str; 4] = ["Website", "Mobile Application", "Agent", "Walk-in"];
const FOREIGN_STREETS: [&str; 6] = [
    "Main Street",
    "High Street",
    "Park Avenue",
    "Station Road",
    "Church Road",
    "Market Street",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineCustomer {
    pub customer_id: String,
    pub client_id: String,
    /// Individual | Corporate
    pub customer_type: String,
    pub is_main_holder: bool,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub nationality: String,
    pub id_type: IdDocument,
    pub id_number: String,
    pub travel_document_expiry: Option<NaiveDate>,
    pub email_address: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub province_state: String,
    pub marketing_consent: bool,
    pub comm_pref: String,
    pub date_of_registration: NaiveDate,
    pub entry_mode: String,
}

impl AirlineCustomer {
    pub fn is_corporate(&self) -> bool {
        self.customer_id.starts_with("COM")
    }
}

/// Name pool for a traveller's nationality
fn demographic_for(rng: &mut Sampler, nationality: &str) -> Demographic {
    match nationality {
        SOUTH_AFRICA => draw_sa_demographic(rng),
        "Zimbabwe" => Demographic::Zimbabwean,
        "China" | "Japan" => Demographic::Asian,
        "India" => Demographic::Indian,
        "United Kingdom" | "United States" | "Canada" | "Australia" => Demographic::English,
        _ => Demographic::International,
    }
}

pub struct AirlineCustomerGenerator {
    year: i32,
    rng: Sampler,
    nationality_weights: Vec<f64>,
}

impl AirlineCustomerGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        let others = (PHONE_PLANS.len() - 1) as f64;
        let nationality_weights = PHONE_PLANS
            .iter()
            .map(|p| if p.country == SOUTH_AFRICA { SA_SHARE } else { (1.0 - SA_SHARE) / others })
            .collect();
        AirlineCustomerGenerator {
            year,
            rng: Sampler::seeded(seed),
            nationality_weights,
        }
    }

    pub fn generate(&mut self, bounds: VolumeBounds) -> Result<Vec<AirlineCustomer>> {
        let target = bounds.draw(&mut self.rng);
        let mut customers = Vec::with_capacity(target);
        let mut client_no = 0;

        while customers.len() < target {
            let size = *self.rng.weighted(&[(1usize, 0.5), (2, 0.3), (3, 0.15), (4, 0.03), (5, 0.02)]);
            let size = size.min(target - customers.len());
            client_no += 1;
            let client_id = format!("CL{}{:05}", self.year, client_no);
            let corporate = self.rng.chance(CORPORATE_SHARE);

            for member in 0..size {
                let traveller = self.traveller(&client_id, corporate, member == 0, customers.len() + 1)?;
                customers.push(traveller);
            }
        }

        tracing::info!(year = self.year, travellers = customers.len(), clients = client_no, "airline customers generated");
        Ok(customers)
    }

    fn traveller(&mut self, client_id: &str, corporate: bool, main_holder: bool, n: usize) -> Result<AirlineCustomer> {
        let year = self.year;
        let rng = &mut self.rng;

        let nationality = PHONE_PLANS[rng.weighted_index(&self.nationality_weights)].country;
        let gender = Gender::draw(rng);
        let demographic = demographic_for(rng, nationality);
        let name = full_name(rng, demographic, gender);

        let min_age = if main_holder { 18 } else { 0 };
        let oldest = NaiveDate::from_ymd_opt(year - 80, 1, 1).unwrap_or_default();
        let youngest = NaiveDate::from_ymd_opt(year - min_age, 1, 1).unwrap_or_default();
        let dob = rng.date_between(oldest, youngest);

        let id_type = if nationality == SOUTH_AFRICA {
            *rng.weighted(&[
                (IdDocument::NationalId, 0.6),
                (IdDocument::Passport, 0.3),
                (IdDocument::DriversLicense, 0.1),
            ])
        } else {
            *rng.weighted(&[(IdDocument::Passport, 0.7), (IdDocument::DriversLicense, 0.3)])
        };
        let id_number = document_number(rng, id_type, nationality, &name, dob, gender)?;

        let year_start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
        let year_end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or_default();
        let travel_document_expiry = match id_type {
            IdDocument::Passport => {
                let last = NaiveDate::from_ymd_opt(year + 10, 12, 31).unwrap_or(year_end);
                Some(rng.date_between(year_start, last))
            }
            _ => None,
        };

        let email_address = email_for(rng, &name, EMAIL_DOMAINS);
        let phone_number = phone_number(rng, nationality);
        let (address, city, province_state) = if nationality == SOUTH_AFRICA {
            let a = sa_address(rng);
            (a.street, a.city, a.province)
        } else {
            let street = format!("{} {}", rng.int(1, 999), rng.pick(&FOREIGN_STREETS));
            let (city, province) = city_and_province(rng, nationality);
            (street, city, province)
        };

        Ok(AirlineCustomer {
            customer_id: format!("{}{}{:06}", if corporate { "COM" } else { "IND" }, year, n),
            client_id: client_id.to_string(),
            customer_type: if corporate { "Corporate" } else { "Individual" }.to_string(),
            is_main_holder: main_holder,
            name,
            dob,
            gender,
            nationality: nationality.to_string(),
            id_type,
            id_number,
            travel_document_expiry,
            email_address,
            phone_number,
            address,
            city,
            province_state,
            marketing_consent: rng.chance(0.7),
            comm_pref: rng
                .weighted(&[("Email", 0.4), ("SMS", 0.3), ("Phone", 0.2), ("Mail", 0.1)])
                .to_string(),
            date_of_registration: rng.date_between(year_start, year_end),
            entry_mode: rng.pick(&ENTRY_MODES).to_string(),
        })
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🧳 Generating airline customers for {}...", config.year);
    let mut generator = AirlineCustomerGenerator::new(config.year, seed);
    let customers = generator.generate(config.bounds(TRAVELLERS))?;

    let path = layout.path(Domain::Airline, "customers", Some(config.year));
    let rows = write_table(&path, &customers)?;
    println!("✓ Saved {} travellers to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::identity::{sa_id_matches_dob, validate_sa_id};
    use chrono::Datelike;
    use std::collections::HashMap;

    pub(crate) fn create_test_customers(year: i32) -> Vec<AirlineCustomer> {
        AirlineCustomerGenerator::new(year, 42)
            .generate(VolumeBounds::new(600, 800))
            .unwrap()
    }

    #[test]
    fn test_counts_and_unique_ids() {
        let customers = create_test_customers(2015);
        assert!((600..=800).contains(&customers.len()));

        let mut ids: Vec<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), customers.len());
        println!("✅ {} travellers PASSED", customers.len());
    }

    #[test]
    fn test_client_groups() {
        let customers = create_test_customers(2015);
        let mut groups: HashMap<&str, Vec<&AirlineCustomer>> = HashMap::new();
        for c in &customers {
            groups.entry(c.client_id.as_str()).or_default().push(c);
        }
        for members in groups.values() {
            assert!(members.len() <= 5);
            assert_eq!(members.iter().filter(|m| m.is_main_holder).count(), 1);
            let corporate = members[0].is_corporate();
            assert!(members.iter().all(|m| m.is_corporate() == corporate), "one prefix per client");

            let holder = members.iter().find(|m| m.is_main_holder).unwrap();
            let adult_from = NaiveDate::from_ymd_opt(2015 - 18, 1, 1).unwrap();
            assert!(holder.dob <= adult_from, "main holder is an adult");
        }
    }

    #[test]
    fn test_documents_follow_nationality() {
        let customers = create_test_customers(2016);
        for c in &customers {
            match c.id_type {
                IdDocument::NationalId => {
                    assert_eq!(c.nationality, SOUTH_AFRICA);
                    assert!(validate_sa_id(&c.id_number), "bad id {}", c.id_number);
                    assert!(sa_id_matches_dob(&c.id_number, c.dob));
                }
                IdDocument::Passport => assert!(c.travel_document_expiry.is_some()),
                IdDocument::DriversLicense => assert!(c.travel_document_expiry.is_none()),
            }
            assert_eq!(c.date_of_registration.year(), 2016);
        }

        let sa = customers.iter().filter(|c| c.nationality == SOUTH_AFRICA).count() as f64;
        let share = sa / customers.len() as f64;
        assert!((0.5..0.7).contains(&share), "SA share {:.2}", share);
    }
}
