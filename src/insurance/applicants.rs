// 🩺 Insurance Applicants - people applying for cover, with the health and
// financial profile underwriting prices against

use crate::config::{GeneratorConfig, SeedPolicy, VolumeBounds};
use crate::identity::{
    draw_sa_demographic, email_for, full_name, generate_sa_id, phone_number, sa_address, Demographic, Gender,
    SOUTH_AFRICA,
};
use crate::insurance::HIGH_RISK_JOBS;
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "insurance/applicants";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

pub const APPLICANTS: VolumeBounds = VolumeBounds::new(5_000, 10_000);

const EMAIL_DOMAINS: &[&str] = &[
    "mweb.co.za",
    "telkomsa.net",
    "vodamail.co.za",
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "webmail.co.za",
];
const BANKS: [&str; 5] = ["Standard Bank", "Absa", "Nedbank", "FNB", "Capitec"];
const PROOFS_OF_ADDRESS: [&str; 4] = ["Utility Bill", "Bank Statement", "Lease Agreement", "ID Document"];
const NATIONALITIES: [(&str, f64); 6] = [
    (SOUTH_AFRICA, 0.80),
    ("Zimbabwe", 0.05),
    ("Namibia", 0.04),
    ("Botswana", 0.04),
    ("Mozambique", 0.04),
    ("Lesotho", 0.03),
];

// ============================================================================
// OCCUPATIONS
// ============================================================================

/// Monthly salary band in ZAR per job title
const JOB_SALARY: &[(&str, f64, f64)] = &[
    ("Intern", 5_000.0, 10_000.0),
    ("Electrician", 15_000.0, 30_000.0),
    ("Teacher", 20_000.0, 40_000.0),
    ("Manager", 40_000.0, 80_000.0),
    ("Software Developer", 30_000.0, 70_000.0),
    ("Nurse", 25_000.0, 45_000.0),
    ("Doctor", 60_000.0, 120_000.0),
    ("Security Guard", 8_000.0, 15_000.0),
    ("Retail Worker", 6_000.0, 12_000.0),
    ("Accountant", 30_000.0, 60_000.0),
    ("Engineer", 40_000.0, 80_000.0),
    ("Plumber", 15_000.0, 30_000.0),
    ("Mechanic", 15_000.0, 35_000.0),
    ("Chef", 15_000.0, 35_000.0),
    ("Waiter", 5_000.0, 10_000.0),
    ("Lawyer", 50_000.0, 100_000.0),
    ("Architect", 40_000.0, 70_000.0),
    ("Pharmacist", 40_000.0, 70_000.0),
    ("Dentist", 50_000.0, 100_000.0),
    ("Sales Representative", 20_000.0, 50_000.0),
    ("Marketing Specialist", 25_000.0, 50_000.0),
    ("Student", 0.0, 5_000.0),
    ("Data Scientist", 45_000.0, 90_000.0),
    ("DevOps Engineer", 40_000.0, 85_000.0),
    ("Cybersecurity Analyst", 35_000.0, 80_000.0),
    ("Cloud Architect", 50_000.0, 100_000.0),
    ("AI Specialist", 50_000.0, 110_000.0),
    ("Senior Data Scientist", 60_000.0, 120_000.0),
    ("IT Manager", 50_000.0, 100_000.0),
    ("Network Engineer", 35_000.0, 75_000.0),
    ("UX Designer", 30_000.0, 65_000.0),
    ("Project Manager", 45_000.0, 90_000.0),
    ("Business Analyst", 35_000.0, 75_000.0),
];

/// Inclusive age window for jobs that have one
const JOB_AGE_LIMITS: &[(&str, u32, u32)] = &[
    ("Student", 18, 25),
    ("Intern", 20, 28),
    ("Cybersecurity Analyst", 25, 60),
    ("Senior Data Scientist", 30, 65),
    ("DevOps Engineer", 25, 60),
    ("Cloud Architect", 28, 65),
    ("AI Specialist", 25, 65),
    ("Doctor", 28, 70),
    ("Dentist", 26, 70),
    ("Lawyer", 25, 70),
    ("Manager", 28, 65),
    ("IT Manager", 30, 65),
];

const ENTRY_LEVEL_JOBS: [&str; 4] = ["Student", "Intern", "Retail Worker", "Waiter"];

/// A job an applicant of `age` could plausibly hold
pub fn job_for_age(rng: &mut Sampler, age: u32) -> &'static str {
    let eligible: Vec<&'static str> = JOB_SALARY
        .iter()
        .map(|(job, _, _)| *job)
        .filter(|job| match JOB_AGE_LIMITS.iter().find(|(j, _, _)| j == job) {
            Some((_, lo, hi)) => (*lo..=*hi).contains(&age),
            None => age >= 22 || ENTRY_LEVEL_JOBS.contains(job),
        })
        .collect();

    if eligible.is_empty() {
        return if age < 22 { "Student" } else { *rng.pick(&["Retail Worker", "Security Guard", "Waiter"]) };
    }
    *rng.pick(&eligible)
}

fn salary_band(job: &str) -> (f64, f64) {
    JOB_SALARY
        .iter()
        .find(|(j, _, _)| *j == job)
        .map_or((5_000.0, 10_000.0), |(_, lo, hi)| (*lo, *hi))
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlcoholUse {
    None,
    Low,
    Moderate,
    High,
}

impl AlcoholUse {
    pub fn from_units(units: u32) -> Self {
        match units {
            0 => AlcoholUse::None,
            1..=7 => AlcoholUse::Low,
            8..=14 => AlcoholUse::Moderate,
            _ => AlcoholUse::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub applicant_id: String,
    pub name: String,
    pub demographic: Demographic,
    pub gender: Gender,
    pub age: u32,
    pub date_of_birth: NaiveDate,
    pub id_number: String,
    pub nationality: String,
    pub address: String,
    pub province: String,
    pub phone: String,
    pub email: String,
    pub job_title: String,
    pub monthly_income_zar: u64,
    pub assets_value_zar: u64,
    pub debts_value_zar: u64,
    pub credit_score: u32,
    pub is_smoker: bool,
    pub smoker_years: u32,
    pub previous_smoker: bool,
    pub years_since_quit: Option<u32>,
    pub alcohol_use: AlcoholUse,
    pub alcohol_units_per_week: u32,
    pub long_term_medication: bool,
    pub medication_since_years: Option<u32>,
    pub bank_name: String,
    pub bank_account: String,
    pub proof_of_address: String,
}

impl Applicant {
    pub fn has_high_risk_job(&self) -> bool {
        HIGH_RISK_JOBS.contains(&self.job_title.as_str())
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct ApplicantGenerator {
    rng: Sampler,
    /// Ages are measured against this date
    reference: NaiveDate,
}

impl ApplicantGenerator {
    pub fn new(seed: u64) -> Self {
        ApplicantGenerator {
            rng: Sampler::seeded(seed),
            reference: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or_default(),
        }
    }

    pub fn generate(&mut self, bounds: VolumeBounds) -> Vec<Applicant> {
        let n = bounds.draw(&mut self.rng);
        let applicants: Vec<Applicant> = (1..=n).map(|i| self.applicant(i)).collect();
        tracing::info!(applicants = applicants.len(), "insurance applicants generated");
        applicants
    }

    fn applicant(&mut self, n: usize) -> Applicant {
        let reference = self.reference;
        let rng = &mut self.rng;

        let nationality = *rng.weighted(&NATIONALITIES);
        let demographic = if nationality == "Zimbabwe" { Demographic::Zimbabwean } else { draw_sa_demographic(rng) };
        let gender = if rng.chance(0.5) { Gender::Female } else { Gender::Male };
        let name = full_name(rng, demographic, gender);

        // skewed young, clipped to adult ages
        let age = rng.gamma(2.5, 10.0).clamp(18.0, 80.0) as u32;
        let job = job_for_age(rng, age);
        let monthly_income = income(rng, job, age);
        let (assets, debts) = balance_sheet(rng, age, monthly_income);
        let credit_score = rng.normal(650.0, 100.0).clamp(300.0, 850.0) as u32;

        let smoking = smoking_history(rng, age);
        let alcohol_units = alcohol_units(rng, age);
        let medication_rate = (0.1 + (age as f64 - 30.0) * 0.02).clamp(0.05, 0.7);
        let long_term_medication = rng.chance(medication_rate);
        let medication_since_years = if long_term_medication && age > 25 {
            Some(rng.uniform(1.0, (age - 25).max(1) as f64) as u32)
        } else {
            None
        };

        let date_of_birth = reference - Duration::days(age as i64 * 365 + rng.int(0, 364));
        let id_number = generate_sa_id(rng, date_of_birth, gender, nationality == SOUTH_AFRICA);
        let address = sa_address(rng);

        Applicant {
            applicant_id: format!("APPL{:05}", n),
            demographic,
            gender,
            age,
            date_of_birth,
            id_number,
            nationality: nationality.to_string(),
            address: address.one_line(),
            province: address.province,
            phone: phone_number(rng, SOUTH_AFRICA),
            email: email_for(rng, &name, EMAIL_DOMAINS),
            name,
            job_title: job.to_string(),
            monthly_income_zar: monthly_income,
            assets_value_zar: assets,
            debts_value_zar: debts,
            credit_score,
            is_smoker: smoking.smoker_years.is_some(),
            smoker_years: smoking.smoker_years.unwrap_or(0),
            previous_smoker: smoking.years_since_quit.is_some(),
            years_since_quit: smoking.years_since_quit,
            alcohol_use: AlcoholUse::from_units(alcohol_units),
            alcohol_units_per_week: alcohol_units,
            long_term_medication,
            medication_since_years,
            bank_name: rng.pick(&BANKS).to_string(),
            bank_account: rng.int(1_000_000_000, 9_999_999_999).to_string(),
            proof_of_address: rng.pick(&PROOFS_OF_ADDRESS).to_string(),
        }
    }
}

/// Salary within the job's band, rising with experience
fn income(rng: &mut Sampler, job: &str, age: u32) -> u64 {
    let (lo, hi) = salary_band(job);
    if lo <= 0.0 {
        return rng.exponential(2_000.0) as u64;
    }
    let experience = ((age as f64 - 22.0) / 40.0).clamp(0.1, 1.0);
    let base = lo + (hi - lo) * rng.beta(2.0, 2.0);
    (base * (0.8 + 0.4 * experience)) as u64
}

/// (assets, debts). Assets accumulate with age, debt load falls with it.
fn balance_sheet(rng: &mut Sampler, age: u32, monthly_income: u64) -> (u64, u64) {
    let years = age as f64 - 18.0;
    let assets = if rng.chance((0.1 + years * 0.02).min(0.8)) {
        let base = 50_000.0 + (age.saturating_sub(25) as f64) * 5_000.0;
        (rng.lognormal(0.5, 0.5) * base) as u64
    } else {
        0
    };
    let debts = if rng.chance((0.8 - years * 0.01).max(0.2)) {
        let factor = match age {
            0..=29 => 0.8,
            30..=39 => 0.5,
            _ => 0.3,
        };
        (rng.lognormal(0.5, 0.5) * monthly_income as f64 * 12.0 * factor) as u64
    } else {
        0
    };
    (assets, debts)
}

struct SmokingHistory {
    smoker_years: Option<u32>,
    years_since_quit: Option<u32>,
}

fn smoking_history(rng: &mut Sampler, age: u32) -> SmokingHistory {
    let a = age as i64;
    let smoker_rate = (0.1 + (age as f64 - 18.0) * 0.005).clamp(0.05, 0.35);
    if rng.chance(smoker_rate) {
        let started = rng.int(16, (a - 1).min(30));
        return SmokingHistory {
            smoker_years: Some((a - started).max(0) as u32),
            years_since_quit: None,
        };
    }

    let former_rate = (0.05 + (age as f64 - 30.0) * 0.01).clamp(0.02, 0.3);
    if rng.chance(former_rate) {
        let started = rng.int(16, (a - 1).min(40));
        let quit = rng.int(started + 1, a);
        return SmokingHistory {
            smoker_years: None,
            years_since_quit: Some((a - quit).max(0) as u32),
        };
    }
    SmokingHistory {
        smoker_years: None,
        years_since_quit: None,
    }
}

/// Weekly units, heavier for younger applicants
fn alcohol_units(rng: &mut Sampler, age: u32) -> u32 {
    let mean = match age {
        0..=24 => 10.0,
        25..=39 => 8.0,
        _ => 5.0,
    };
    rng.exponential(mean) as u32
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🩺 Generating insurance applicants...");
    let mut generator = ApplicantGenerator::new(seed);
    let applicants = generator.generate(config.bounds(APPLICANTS));

    let path = layout.path(Domain::Insurance, "applicants", None);
    let rows = write_table(&path, &applicants)?;
    println!("✓ Saved {} applicants to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::identity::{sa_id_matches_dob, validate_sa_id};

    pub(crate) fn create_test_applicants() -> Vec<Applicant> {
        ApplicantGenerator::new(42).generate(VolumeBounds::new(400, 500))
    }

    #[test]
    fn test_applicant_identity() {
        let applicants = create_test_applicants();
        assert!((400..=500).contains(&applicants.len()));
        assert_eq!(applicants[0].applicant_id, "APPL00001");

        for a in &applicants {
            assert!((18..=80).contains(&a.age));
            assert!(validate_sa_id(&a.id_number), "bad id {}", a.id_number);
            assert!(sa_id_matches_dob(&a.id_number, a.date_of_birth));
            let citizen = &a.id_number[10..11] == "0";
            assert_eq!(citizen, a.nationality == SOUTH_AFRICA);
            assert!(a.address.contains(&a.province));
            assert!((300..=850).contains(&a.credit_score));
        }
        println!("✅ {} applicants PASSED", applicants.len());
    }

    #[test]
    fn test_jobs_respect_age_limits() {
        let applicants = create_test_applicants();
        for a in &applicants {
            if let Some((_, lo, hi)) = JOB_AGE_LIMITS.iter().find(|(j, _, _)| *j == a.job_title) {
                assert!((*lo..=*hi).contains(&a.age), "{} aged {}", a.job_title, a.age);
            }
            if a.age < 22 {
                assert!(ENTRY_LEVEL_JOBS.contains(&a.job_title.as_str()) || JOB_AGE_LIMITS.iter().any(|(j, _, _)| *j == a.job_title));
            }
        }
    }

    #[test]
    fn test_health_history_consistent() {
        let applicants = create_test_applicants();
        for a in &applicants {
            assert!(!(a.is_smoker && a.previous_smoker));
            if !a.is_smoker {
                assert_eq!(a.smoker_years, 0);
            }
            assert_eq!(a.alcohol_use, AlcoholUse::from_units(a.alcohol_units_per_week));
            if a.medication_since_years.is_some() {
                assert!(a.long_term_medication);
            }
        }
        assert_eq!(AlcoholUse::from_units(15), AlcoholUse::High);
        assert_eq!(AlcoholUse::from_units(7), AlcoholUse::Low);
    }
}
