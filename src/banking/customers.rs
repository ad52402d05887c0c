// 👤 Bank Customers - individuals (IND) and companies (COM) joining in a year
//
// Volumes dip around 2019/2020 and entry dates skip the 2020 lockdown.

use crate::config::{GeneratorConfig, SeedPolicy, VolumeBounds};
use crate::identity::{
    self, draw_sa_demographic, full_name, generate_sa_id, sa_address, Demographic, Gender,
    SOUTH_AFRICA,
};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "banking/customers";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankCustomer {
    pub customer_id: String,
    /// Individual | Company
    pub customer_type: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub citizenship: String,
    pub nationality: String,
    pub ethnicity: Option<String>,
    pub residential_address: Option<String>,
    pub commercial_address: Option<String>,
    pub city: String,
    pub province: String,
    pub email: String,
    pub phone_number: String,
    pub id_type: String,
    pub id_number: String,
    pub id_expiry_date: Option<NaiveDate>,
    pub visa_type: Option<String>,
    pub visa_expiry_date: Option<NaiveDate>,
    pub is_pep: bool,
    pub sanctioned_country: bool,
    pub risk_score: f64,
    pub tax_id_number: String,
    pub occupation: String,
    pub employer_name: Option<String>,
    pub source_of_funds: String,
    pub marital_status: Option<String>,
    pub preferred_contact_method: String,
    pub next_of_kin: Option<String>,
    pub date_of_entry: NaiveDate,
    pub annual_income: Option<f64>,
    pub company_age: Option<u32>,
    pub company_size: Option<String>,
    pub number_of_employees: Option<u32>,
    pub annual_turnover: Option<u64>,
    pub directors_count: Option<u32>,
    pub shareholders_count: Option<u32>,
    pub bee_level: Option<u32>,
    pub vat_registered: Option<bool>,
    pub industry_risk_rating: Option<String>,
}

impl BankCustomer {
    pub fn is_company(&self) -> bool {
        self.customer_type == "Company"
    }

    pub fn is_unemployed(&self) -> bool {
        self.occupation == "Unemployed"
    }
}

// ============================================================================
// REFERENCE DATA
// ============================================================================

const INDUSTRY_OCCUPATIONS: &[(&str, &[&str])] = &[
    ("Finance", &["Accountant", "Banker", "Financial Advisor", "Auditor", "Risk Manager", "Loan Officer"]),
    ("Retail", &["Salesperson", "Cashier", "Store Manager", "Customer Service"]),
    ("Manufacturing", &["Engineer", "Mechanic", "Quality Control Inspector", "Production Manager"]),
    ("Healthcare", &["Nurse", "Doctor", "Pharmacist", "Dentist", "Medical Technician"]),
    ("IT", &["Software Developer", "Data Analyst", "System Administrator", "Network Engineer"]),
    ("Transport", &["Driver", "Logistician", "Fleet Manager", "Dispatcher"]),
    ("Construction", &["Carpenter", "Electrician", "Plumber", "Construction Worker", "Site Manager"]),
    ("Education", &["Teacher", "Professor", "Librarian", "Counselor"]),
    ("Mining", &["Miner", "Geologist", "Safety Officer"]),
    ("Hospitality", &["Chef", "Waiter", "Hotel Manager", "Receptionist"]),
    ("Insurance", &["Underwriter", "Claims Adjuster", "Actuary"]),
    ("Legal Services", &["Lawyer", "Paralegal", "Legal Secretary"]),
    ("Agriculture", &["Farmer", "Agricultural Technician", "Farm Manager"]),
    ("Media", &["Journalist", "Editor", "Photographer"]),
];

const GENERAL_OCCUPATIONS: &[&str] = &[
    "Unemployed", "Student", "Politician", "Manager", "Entrepreneur", "Self-Employed",
];

pub const BIG_COMPANIES: &[&str] = &[
    "Sasol", "MTN South Africa", "Shoprite", "Standard Bank", "Nedbank", "Vodacom",
    "Bidvest Group", "Anglo American", "FirstRand", "Absa Group", "Telkom", "Eskom",
    "Pick n Pay", "Discovery Limited", "Sanlam", "Old Mutual", "Woolworths Holdings",
    "Tiger Brands", "Clicks Group", "Capitec Bank",
];

const COMPANY_WORDS: &[&str] = &[
    "Ubuntu", "Protea", "Highveld", "Karoo", "Summit", "Baobab", "Meridian", "Cape",
    "Zenith", "Savanna", "Ridge", "Harbour", "Impala", "Table Bay", "Lowveld",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Holdings", "Trading", "Solutions", "Logistics", "Consulting", "Group", "Enterprises", "Services",
];

const VISA_TYPES: &[&str] = &[
    "Work", "Student", "Tourist", "Business", "Diplomatic", "Transit", "Medical", "Exchange",
    "Permanent Resident", "Refugee",
];

const COMPANY_SIZES: &[&str] = &["Micro (<10)", "Small (10-50)", "Medium (51-250)", "Large (>250)"];

const FOREIGN_NATIONALITIES: &[(&str, &str)] = &[
    ("Zimbabwe", "ZW"),
    ("Botswana", "BW"),
    ("Namibia", "NA"),
    ("Mozambique", "MZ"),
];

/// SA city weights; the remainder falls back to a provincial address
const CITY_WEIGHTS: &[(&str, &str, f64)] = &[
    ("Johannesburg", "Gauteng", 0.25),
    ("Cape Town", "Western Cape", 0.18),
    ("Durban", "KwaZulu-Natal", 0.15),
    ("Pretoria", "Gauteng", 0.12),
    ("Port Elizabeth", "Eastern Cape", 0.05),
    ("Bloemfontein", "Free State", 0.03),
    ("East London", "Eastern Cape", 0.03),
    ("Pietermaritzburg", "KwaZulu-Natal", 0.02),
];

const CONTACT_METHODS: &[&str] = &["Email", "Phone", "SMS", "Mail"];

/// Yearly (individuals, companies) bounds before scaling
pub fn volume_bounds(year: i32) -> (VolumeBounds, VolumeBounds) {
    match year {
        2020 => (VolumeBounds::new(0, 500), VolumeBounds::new(0, 100)),
        2019 => (VolumeBounds::new(12_000, 20_000), VolumeBounds::new(400, 1_200)),
        _ => (VolumeBounds::new(15_000, 25_000), VolumeBounds::new(500, 1_500)),
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct CustomerGenerator {
    year: i32,
    rng: Sampler,
}

impl CustomerGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        CustomerGenerator {
            year,
            rng: Sampler::seeded(seed),
        }
    }

    pub fn generate(&mut self, individuals: VolumeBounds, companies: VolumeBounds) -> Vec<BankCustomer> {
        let n_individuals = individuals.draw(&mut self.rng);
        let n_companies = companies.draw(&mut self.rng);

        if n_individuals == 0 && n_companies == 0 {
            tracing::warn!(year = self.year, "no customers drawn for this year");
            return Vec::new();
        }

        let mut customers: Vec<BankCustomer> = (1..=n_individuals)
            .map(|i| self.individual(i))
            .collect();
        customers.extend((1..=n_companies).map(|i| self.company(i)));

        self.assign_next_of_kin(&mut customers);
        self.rng.shuffle(&mut customers);

        tracing::info!(
            year = self.year,
            individuals = n_individuals,
            companies = n_companies,
            "bank customers generated"
        );
        customers
    }

    fn individual(&mut self, idx: usize) -> BankCustomer {
        let rng = &mut self.rng;
        let is_sa = rng.chance(0.8);

        let (demographic, nationality, citizenship) = if is_sa {
            (draw_sa_demographic(rng), SOUTH_AFRICA, "ZA")
        } else {
            let (nationality, code) = *rng.pick(FOREIGN_NATIONALITIES);
            (Demographic::Zimbabwean, nationality, code)
        };

        let gender = Gender::draw(rng);
        let name = full_name(rng, demographic, gender);
        let age = draw_age(rng);
        let birth_date = birth_date_for_age(rng, self.year, age);

        let (id_type, id_number, id_expiry) = if is_sa {
            ("National ID", generate_sa_id(rng, birth_date, gender, true), None)
        } else {
            let number = format!("{}{}{}", rng.letter(), rng.letter(), rng.digits(6));
            let expiry = rng.date_between(ymd(self.year, 1, 1), ymd(self.year + 5, 12, 31));
            ("Passport", number, Some(expiry))
        };
        let (visa_type, visa_expiry) = if is_sa {
            (None, None)
        } else {
            let expiry = rng.date_between(ymd(self.year, 1, 1), ymd(self.year + 5, 12, 31));
            (Some(rng.pick(VISA_TYPES).to_string()), Some(expiry))
        };

        let occupation = if age < 35 && rng.chance(0.65) {
            "Unemployed".to_string()
        } else {
            draw_occupation(rng)
        };
        let employer = draw_employer(rng, &occupation);
        let (annual_income, risk_score) = income_and_risk(rng, age, &occupation, employer.as_deref());

        let mut source_of_funds = match occupation.as_str() {
            "Student" => rng.pick(&["Inheritance", "Allowance"]).to_string(),
            "Unemployed" => rng.pick(&["Grants", "Savings", "Pension"]).to_string(),
            _ => rng
                .weighted(&[
                    ("Salary", 0.6),
                    ("Inheritance", 0.05),
                    ("Business", 0.1),
                    ("Grants", 0.05),
                    ("Savings", 0.15),
                    ("Pension", 0.05),
                ])
                .to_string(),
        };
        if age > 50 && rng.chance(0.1) {
            source_of_funds = "Inheritance".to_string();
        }

        let marital_status = rng
            .weighted(&[("Single", 0.45), ("Married", 0.4), ("Divorced", 0.1), ("Widowed", 0.05)])
            .to_string();
        let (street, city, province) = draw_residence(rng);
        let email = identity::email_for(rng, &name, &["gmail.com", "outlook.com", "webmail.co.za", "mweb.co.za"]);
        let phone = identity::phone_number(rng, SOUTH_AFRICA);

        BankCustomer {
            customer_id: format!("IND{}{:06}", self.year, idx),
            customer_type: "Individual".to_string(),
            full_name: name,
            birth_date: Some(birth_date),
            age: Some(age),
            gender: Some(gender.as_str().to_string()),
            citizenship: citizenship.to_string(),
            nationality: nationality.to_string(),
            ethnicity: Some(if is_sa { demographic.as_str().to_string() } else { "Foreign National".to_string() }),
            residential_address: Some(format!("{}, {}, {}", street, city, SOUTH_AFRICA)),
            commercial_address: None,
            city,
            province,
            email,
            phone_number: phone,
            id_type: id_type.to_string(),
            id_number,
            id_expiry_date: id_expiry,
            visa_type,
            visa_expiry_date: visa_expiry,
            is_pep: rng.chance(0.02),
            sanctioned_country: false,
            risk_score,
            tax_id_number: rng.digits(10),
            occupation,
            employer_name: employer,
            source_of_funds,
            marital_status: Some(marital_status),
            preferred_contact_method: rng.pick(CONTACT_METHODS).to_string(),
            next_of_kin: None,
            date_of_entry: entry_date(rng, self.year),
            annual_income: Some(annual_income),
            company_age: None,
            company_size: None,
            number_of_employees: None,
            annual_turnover: None,
            directors_count: None,
            shareholders_count: None,
            bee_level: None,
            vat_registered: None,
            industry_risk_rating: None,
        }
    }

    fn company(&mut self, idx: usize) -> BankCustomer {
        let rng = &mut self.rng;
        let name = format!("{} {}", rng.pick(COMPANY_WORDS), rng.pick(COMPANY_SUFFIXES));
        let (industry, _) = *rng.pick(INDUSTRY_OCCUPATIONS);
        let registration = format!(
            "{}/{}/{:02}",
            rng.int(1900, self.year as i64),
            rng.int(100_000, 999_999),
            rng.int(1, 99)
        );
        let (street, city, province) = draw_residence(rng);
        let domain = format!("{}.co.za", name.to_lowercase().replace(' ', ""));
        let contact_demographic = draw_sa_demographic(rng);
        let contact_gender = Gender::draw(rng);
        let contact = full_name(rng, contact_demographic, contact_gender);

        BankCustomer {
            customer_id: format!("COM{}{:06}", self.year, idx),
            customer_type: "Company".to_string(),
            full_name: name,
            birth_date: None,
            age: None,
            gender: None,
            citizenship: "ZA".to_string(),
            nationality: SOUTH_AFRICA.to_string(),
            ethnicity: None,
            residential_address: None,
            commercial_address: Some(format!("{}, {}, {}", street, city, SOUTH_AFRICA)),
            city,
            province,
            email: format!("info@{}", domain),
            phone_number: identity::phone_number(rng, SOUTH_AFRICA),
            id_type: "Registration Number".to_string(),
            id_number: registration,
            id_expiry_date: None,
            visa_type: None,
            visa_expiry_date: None,
            is_pep: false,
            sanctioned_country: false,
            risk_score: round_to(rng.beta(1.5, 7.0), 3),
            tax_id_number: rng.digits(10),
            occupation: industry.to_string(),
            employer_name: None,
            source_of_funds: industry.to_string(),
            marital_status: None,
            preferred_contact_method: rng.pick(CONTACT_METHODS).to_string(),
            next_of_kin: Some(contact),
            date_of_entry: entry_date(rng, self.year),
            annual_income: None,
            company_age: Some(rng.int(1, 50) as u32),
            company_size: Some(rng.pick(COMPANY_SIZES).to_string()),
            number_of_employees: Some(*rng.weighted(&[(5, 0.6), (25, 0.25), (100, 0.10), (500, 0.05)])),
            annual_turnover: Some(rng.int(1_000_000, 100_000_000) as u64),
            directors_count: Some(rng.int(1, 8) as u32),
            shareholders_count: Some(rng.int(1, 15) as u32),
            bee_level: Some(rng.int(1, 8) as u32),
            vat_registered: Some(rng.chance(0.7)),
            industry_risk_rating: Some(rng.pick(&["Low", "Medium", "High"]).to_string()),
        }
    }

    /// 20% of individuals get a next of kin: half another customer, half a relative by name
    fn assign_next_of_kin(&mut self, customers: &mut [BankCustomer]) {
        let individual_ids: Vec<String> = customers
            .iter()
            .filter(|c| !c.is_company())
            .map(|c| c.customer_id.clone())
            .collect();

        for customer in customers.iter_mut().filter(|c| !c.is_company()) {
            if !self.rng.chance(0.2) {
                continue;
            }
            let kin = if self.rng.chance(0.5) && individual_ids.len() > 1 {
                let pick = self.rng.pick(&individual_ids).clone();
                if pick == customer.customer_id {
                    None
                } else {
                    Some(pick)
                }
            } else {
                let demographic = if customer.citizenship == "ZA" {
                    Demographic::Black
                } else {
                    Demographic::Zimbabwean
                };
                let gender = Gender::draw(&mut self.rng);
                let relative = full_name(&mut self.rng, demographic, gender);
                let first = relative.split(' ').next().unwrap_or("").to_string();
                if self.rng.chance(0.7) {
                    Some(format!("{} {}", first, identity::surname(&customer.full_name)))
                } else {
                    Some(relative)
                }
            };
            customer.next_of_kin = kin;
        }
    }
}

// ============================================================================
// DRAWS
// ============================================================================

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn draw_age(rng: &mut Sampler) -> u32 {
    let bands = [
        ((18, 25), 0.25),
        ((26, 35), 0.30),
        ((36, 45), 0.20),
        ((46, 55), 0.15),
        ((56, 65), 0.07),
        ((66, 80), 0.03),
    ];
    let (lo, hi) = *rng.weighted(&bands);
    rng.int(lo, hi) as u32
}

/// A birth date such that the person is `age` on 31 December of `year`
pub fn birth_date_for_age(rng: &mut Sampler, year: i32, age: u32) -> NaiveDate {
    let year_end = ymd(year, 12, 31);
    let latest = year_end
        .with_year(year - age as i32)
        .unwrap_or(ymd(year - age as i32, 12, 28));
    latest - Duration::days(rng.int(0, 364))
}

fn draw_occupation(rng: &mut Sampler) -> String {
    let total: usize = INDUSTRY_OCCUPATIONS.iter().map(|(_, o)| o.len()).sum::<usize>()
        + GENERAL_OCCUPATIONS.len();
    let mut idx = rng.int(0, total as i64 - 1) as usize;
    for (_, occupations) in INDUSTRY_OCCUPATIONS {
        if idx < occupations.len() {
            return occupations[idx].to_string();
        }
        idx -= occupations.len();
    }
    GENERAL_OCCUPATIONS[idx.min(GENERAL_OCCUPATIONS.len() - 1)].to_string()
}

fn draw_employer(rng: &mut Sampler, occupation: &str) -> Option<String> {
    if matches!(occupation, "Unemployed" | "Student") {
        return None;
    }
    let employer = if rng.chance(0.15) {
        "Self-Employed".to_string()
    } else if rng.chance(0.3) {
        "Informal Business".to_string()
    } else if rng.chance(0.4) {
        rng.pick(BIG_COMPANIES).to_string()
    } else {
        format!("{} {}", rng.pick(COMPANY_WORDS), rng.pick(COMPANY_SUFFIXES))
    };
    Some(employer)
}

/// Annual income in ZAR and a 0..1 risk score
pub fn income_and_risk(rng: &mut Sampler, age: u32, occupation: &str, employer: Option<&str>) -> (f64, f64) {
    let (lo, hi): (f64, f64) = match occupation {
        "Doctor" => (800_000.0, 2_000_000.0),
        "Lawyer" => (600_000.0, 1_500_000.0),
        "Engineer" => (400_000.0, 800_000.0),
        "Teacher" => (250_000.0, 400_000.0),
        "Nurse" => (300_000.0, 500_000.0),
        "Unemployed" => (0.0, 0.0),
        "Student" => (0.0, 50_000.0),
        "Manager" => (500_000.0, 1_200_000.0),
        _ => (200_000.0, 600_000.0),
    };
    let age_multiplier = if age > 25 { 1.0 + (age as f64 - 25.0) * 0.02 } else { 0.8 };
    let employer_multiplier = match employer {
        Some(e) if BIG_COMPANIES.contains(&e) => 1.3,
        _ => 1.0,
    };
    let income = (rng.uniform(lo, hi.max(lo)) * age_multiplier * employer_multiplier).floor();

    let mut risk = 0.1 + 100_000.0 / (income + 1.0);
    if occupation == "Unemployed" {
        risk += 0.3;
    }
    if age < 25 {
        risk += 0.1;
    }
    if employer == Some("Self-Employed") {
        risk += 0.15;
    }
    (income, round_to(risk.min(1.0), 3))
}

/// (street, city, province); every customer banks from an SA address
fn draw_residence(rng: &mut Sampler) -> (String, String, String) {
    let mut weights: Vec<f64> = CITY_WEIGHTS.iter().map(|(_, _, w)| *w).collect();
    weights.push(0.17);
    let idx = rng.weighted_index(&weights);
    let address = sa_address(rng);
    match CITY_WEIGHTS.get(idx) {
        Some((city, province, _)) => (address.street, city.to_string(), province.to_string()),
        None => (address.street, address.city, address.province),
    }
}

/// Quarter-weighted entry date; 2020 skips the March-May lockdown
pub fn entry_date(rng: &mut Sampler, year: i32) -> NaiveDate {
    if year == 2020 {
        return if rng.chance(0.1) {
            rng.date_between(ymd(year, 1, 1), ymd(year, 2, 29))
        } else {
            rng.date_between(ymd(year, 6, 1), ymd(year, 12, 31))
        };
    }
    let quarter = *rng.weighted(&[(1u32, 0.3), (2, 0.2), (3, 0.2), (4, 0.3)]);
    let start = ymd(year, (quarter - 1) * 3 + 1, 1);
    let end = if quarter == 4 {
        ymd(year, 12, 31)
    } else {
        ymd(year, quarter * 3 + 1, 1) - Duration::days(1)
    };
    rng.date_between(start, end)
}

// ============================================================================
// RUN
// ============================================================================

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);
    let (individuals, companies) = volume_bounds(config.year);

    println!("👤 Generating bank customers for {}...", config.year);
    let mut generator = CustomerGenerator::new(config.year, seed);
    let customers = generator.generate(config.bounds(individuals), config.bounds(companies));

    let path = layout.path(Domain::Banking, "customers", Some(config.year));
    let rows = write_table(&path, &customers)?;
    println!("✓ Saved {} customers to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{sa_id_matches_dob, validate_sa_id};

    fn small() -> (VolumeBounds, VolumeBounds) {
        (VolumeBounds::new(150, 250), VolumeBounds::new(5, 15))
    }

    #[test]
    fn test_counts_within_bounds_and_ids_unique() {
        let (ind, com) = small();
        let customers = CustomerGenerator::new(2018, 42).generate(ind, com);

        let n_ind = customers.iter().filter(|c| !c.is_company()).count();
        let n_com = customers.iter().filter(|c| c.is_company()).count();
        assert!(ind.contains(n_ind), "individuals {} out of bounds", n_ind);
        assert!(com.contains(n_com), "companies {} out of bounds", n_com);

        let mut ids: Vec<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), customers.len());
    }

    #[test]
    fn test_sa_ids_match_birth_dates() {
        let (ind, com) = small();
        let customers = CustomerGenerator::new(2018, 42).generate(ind, com);

        for c in customers.iter().filter(|c| c.id_type == "National ID") {
            let dob = c.birth_date.expect("individual has a birth date");
            assert!(validate_sa_id(&c.id_number), "bad id {}", c.id_number);
            assert!(sa_id_matches_dob(&c.id_number, dob));
            assert_eq!(c.nationality, SOUTH_AFRICA);
        }
        println!("✅ Bank customer SA IDs PASSED");
    }

    #[test]
    fn test_entry_dates_in_year_and_lockdown_gap() {
        let mut rng = Sampler::seeded(1);
        for _ in 0..300 {
            let d = entry_date(&mut rng, 2020);
            assert_eq!(d.year(), 2020);
            assert!(!(3..=5).contains(&d.month()), "lockdown entry {}", d);
        }
        for _ in 0..100 {
            assert_eq!(entry_date(&mut rng, 2018).year(), 2018);
        }
    }

    #[test]
    fn test_birth_date_matches_age() {
        let mut rng = Sampler::seeded(2);
        for age in [18u32, 35, 80] {
            let dob = birth_date_for_age(&mut rng, 2020, age);
            assert_eq!(dob.year(), 2020 - age as i32, "age {} gave {}", age, dob);
        }
    }

    #[test]
    fn test_income_and_risk_rules() {
        let mut rng = Sampler::seeded(3);
        let (income, risk) = income_and_risk(&mut rng, 30, "Unemployed", None);
        assert_eq!(income, 0.0);
        assert_eq!(risk, 1.0);

        let (income, risk) = income_and_risk(&mut rng, 45, "Doctor", Some("Sasol"));
        assert!(income >= 800_000.0 * 1.4 * 1.3 - 1.0);
        assert!(risk < 0.3);
    }

    #[test]
    fn test_same_seed_same_customers() {
        let (ind, com) = small();
        let a = CustomerGenerator::new(2018, 42).generate(ind, com);
        let b = CustomerGenerator::new(2018, 42).generate(ind, com);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_year() {
        let none = VolumeBounds::new(0, 0);
        assert!(CustomerGenerator::new(2020, 42).generate(none, none).is_empty());
    }
}
