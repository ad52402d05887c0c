// 🔀 Pipeline - generator dispatch, run manifest, replay and validation
//
// Every generator is `fn(&GeneratorConfig) -> Result<RunOutcome>`. This module
// maps CLI names onto them, records each run and replays recorded runs.

use crate::airline::{self, Booking, FlightSchedule};
use crate::banking::{self, Account, BankCustomer, Transaction};
use crate::config::{GeneratorConfig, VolumeBounds};
use crate::error::GenError;
use crate::identity::IdDocument;
use crate::insurance::{self, Applicant, Claim, Policy};
use crate::manifest::{fingerprint_files, latest_run, list_runs, open_manifest, record_run, RunRecord};
use crate::quality::{DatasetQualityEngine, QualityReport};
use crate::table::{read_table, scratch_dir, DataLayout, Domain};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// RUN OUTCOME
// ============================================================================

/// What a generator wrote
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub generator: String,
    pub year: i32,
    /// Seed actually used, after resolving overrides and entropy
    pub seed: u64,
    pub outputs: Vec<PathBuf>,
    pub rows: usize,
}

impl RunOutcome {
    pub fn new(generator: &str, year: i32, seed: u64, outputs: Vec<PathBuf>, rows: usize) -> Self {
        RunOutcome {
            generator: generator.to_string(),
            year,
            seed,
            outputs,
            rows,
        }
    }

    pub fn fingerprint(&self) -> Result<String> {
        let paths: Vec<&Path> = self.outputs.iter().map(|p| p.as_path()).collect();
        fingerprint_files(&paths)
    }
}

// ============================================================================
// GENERATOR REGISTRY
// ============================================================================

pub type RunFn = fn(&GeneratorConfig) -> Result<RunOutcome>;

/// Dependency order: each generator only reads tables written before it
const AIRLINE: &[(&str, RunFn)] = &[
    ("routes", airline::routes::run),
    ("fleet", airline::fleet::run),
    ("customers", airline::customers::run),
    ("schedules", airline::schedules::run),
    ("bookings", airline::bookings::run),
    ("checkins", airline::checkins::run),
];

const BANKING: &[(&str, RunFn)] = &[
    ("customers", banking::customers::run),
    ("accounts", banking::accounts::run),
    ("loans", banking::loans::run),
    ("loan_defaults", banking::loan_defaults::run),
    ("employment", banking::employment::run),
    ("debit_orders", banking::debit_orders::run),
    ("debit_order_transactions", banking::debit_order_transactions::run),
    ("loan_payments", banking::loan_payments::run),
    ("transactions", banking::transactions::run),
];

const INSURANCE: &[(&str, RunFn)] = &[
    ("applicants", insurance::applicants::run),
    ("policies", insurance::policies::run),
    ("claims", insurance::claims::run),
    ("payments", insurance::payments::run),
];

pub const DOMAINS: [Domain; 3] = [Domain::Airline, Domain::Banking, Domain::Insurance];

pub fn generators(domain: Domain) -> &'static [(&'static str, RunFn)] {
    match domain {
        Domain::Airline => AIRLINE,
        Domain::Banking => BANKING,
        Domain::Insurance => INSURANCE,
    }
}

/// Resolve CLI names (`loan-payments` and `loan_payments` both work)
/// to the generator's `domain/entity` name and entry point.
pub fn find_generator(domain: &str, entity: &str) -> Result<(String, RunFn), GenError> {
    let unknown = || GenError::UnknownGenerator {
        domain: domain.to_string(),
        entity: entity.to_string(),
    };
    let parsed = Domain::parse(domain).ok_or_else(unknown)?;
    let normalized = entity.replace('-', "_");
    generators(parsed)
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(name, run)| (format!("{}/{}", parsed.as_str(), name), *run))
        .ok_or_else(unknown)
}

// ============================================================================
// RUNNING
// ============================================================================

/// Run one generator and record it in the manifest
pub fn run_generator(config: &GeneratorConfig, domain: &str, entity: &str) -> Result<RunRecord> {
    let (name, run) = find_generator(domain, entity)?;
    tracing::info!(generator = %name, year = config.year, "starting generator");

    let outcome = run(config).with_context(|| format!("{} failed for {}", name, config.year))?;
    record_outcome(config, &outcome)
}

fn record_outcome(config: &GeneratorConfig, outcome: &RunOutcome) -> Result<RunRecord> {
    let fingerprint = outcome.fingerprint()?;
    let outputs: Vec<String> = outcome.outputs.iter().map(|p| p.display().to_string()).collect();
    let output_path = outputs.first().cloned().unwrap_or_default();

    let record = RunRecord::new(
        &outcome.generator,
        outcome.year,
        outcome.seed,
        &output_path,
        outcome.rows,
        fingerprint,
    )
    .with_param("scale", serde_json::json!(config.scale))
    .with_param("with_errors", serde_json::json!(config.with_errors))
    .with_param("outputs", serde_json::json!(outputs));

    let conn = open_manifest(&config.manifest_path)?;
    record_run(&conn, &record)?;
    tracing::info!(
        generator = %record.generator,
        year = record.year,
        seed = record.seed,
        rows = record.row_count,
        "run recorded"
    );
    Ok(record)
}

/// Run every generator of a domain in order
pub fn run_domain(config: &GeneratorConfig, domain: Domain) -> Result<Vec<RunRecord>> {
    println!("\n🔀 Pipeline: {} {}", domain.as_str(), config.year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    generators(domain)
        .iter()
        .map(|(entity, _)| run_generator(config, domain.as_str(), entity))
        .collect()
}

/// `all` or a single domain name
pub fn run_pipeline(config: &GeneratorConfig, target: &str) -> Result<Vec<RunRecord>> {
    let domains: Vec<Domain> = if target == "all" {
        DOMAINS.to_vec()
    } else {
        vec![Domain::parse(target)
            .ok_or_else(|| GenError::InvalidArgument(format!("unknown domain '{}'", target)))?]
    };

    let mut records = Vec::new();
    for domain in domains {
        records.extend(run_domain(config, domain)?);
    }
    Ok(records)
}

pub fn recorded_runs(config: &GeneratorConfig) -> Result<Vec<RunRecord>> {
    let conn = open_manifest(&config.manifest_path)?;
    list_runs(&conn)
}

// ============================================================================
// VERIFY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Verification {
    pub generator: String,
    pub year: i32,
    pub seed: u64,
    pub recorded: String,
    pub replayed: String,
}

impl Verification {
    pub fn matches(&self) -> bool {
        self.recorded == self.replayed
    }
}

/// Replay the latest recorded run with its seed against a copy of the
/// domain's tables and compare output fingerprints.
pub fn verify(config: &GeneratorConfig, domain: &str, entity: &str) -> Result<Verification> {
    let (name, run) = find_generator(domain, entity)?;
    let conn = open_manifest(&config.manifest_path)?;
    let recorded = latest_run(&conn, &name, config.year)?.ok_or_else(|| GenError::NoRecordedRun {
        generator: name.clone(),
        year: config.year,
    })?;

    let scratch = scratch_dir("verify");
    let source = DataLayout::new(&config.data_dir);
    let target = DataLayout::new(&scratch);
    for d in DOMAINS {
        let dir = source.domain_dir(d);
        if dir.exists() {
            copy_dir(&dir, &target.domain_dir(d))?;
        }
    }

    let mut replay = GeneratorConfig::new(&scratch, recorded.year);
    replay.seed_override = Some(recorded.seed);
    replay.scale = recorded
        .params
        .get("scale")
        .and_then(|v| v.as_f64())
        .unwrap_or(config.scale);
    replay.with_errors = recorded
        .params
        .get("with_errors")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    tracing::info!(generator = %name, year = recorded.year, seed = recorded.seed, "replaying run");
    let result = run(&replay).and_then(|outcome| outcome.fingerprint());
    if let Err(err) = fs::remove_dir_all(&scratch) {
        tracing::warn!(path = %scratch.display(), error = %err, "could not remove scratch directory");
    }

    Ok(Verification {
        generator: name,
        year: recorded.year,
        seed: recorded.seed,
        recorded: recorded.fingerprint,
        replayed: result?,
    })
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Failed to create {}", to.display()))?;
    for entry in fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

// ============================================================================
// VALIDATE
// ============================================================================

fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    read_table(path).map(Some)
}

/// Quality checks over whatever tables exist for the configured year
pub fn validate(config: &GeneratorConfig) -> Result<Vec<QualityReport>> {
    let layout = DataLayout::new(&config.data_dir);
    let engine = DatasetQualityEngine::new();
    let year = config.year;
    let mut reports = Vec::new();

    // Airline
    let bookings: Option<Vec<Booking>> = load(&layout.path(Domain::Airline, "bookings", Some(year)))?;
    let schedules: Option<Vec<FlightSchedule>> = load(&layout.path(Domain::Airline, "schedules", Some(year)))?;
    if let (Some(bookings), Some(schedules)) = (&bookings, &schedules) {
        reports.push(engine.check_bookings(bookings, schedules));
    }
    if let Some(customers) = load::<airline::AirlineCustomer>(&layout.path(Domain::Airline, "customers", Some(year)))? {
        let ids = customers
            .iter()
            .filter(|c| c.id_type == IdDocument::NationalId)
            .map(|c| (c.customer_id.as_str(), c.id_number.as_str(), c.dob));
        reports.push(engine.check_sa_ids("airline/customers", ids));
        let bounds = config.bounds(airline::customers::TRAVELLERS);
        reports.push(engine.check_row_count("airline/customers", customers.len(), bounds));
    }

    // Banking
    if let Some(customers) = load::<BankCustomer>(&layout.path(Domain::Banking, "customers", Some(year)))? {
        let ids = customers
            .iter()
            .filter(|c| c.id_type == IdDocument::NationalId.as_str())
            .filter_map(|c| c.birth_date.map(|dob| (c.customer_id.as_str(), c.id_number.as_str(), dob)));
        reports.push(engine.check_sa_ids("banking/customers", ids));
        let (individuals, companies) = banking::customers::volume_bounds(year);
        let individuals = config.bounds(individuals);
        let companies = config.bounds(companies);
        let bounds = VolumeBounds::new(individuals.min + companies.min, individuals.max + companies.max);
        reports.push(engine.check_row_count("banking/customers", customers.len(), bounds));
    }
    let mut transactions: Vec<Transaction> = Vec::new();
    let mut found = false;
    for month in 1..=12 {
        if let Some(rows) = load::<Transaction>(&layout.monthly_path(year, month))? {
            found = true;
            transactions.extend(rows);
        }
    }
    if found {
        let mut accounts: Vec<Account> = Vec::new();
        for y in banking::accounts::FIRST_OPENING_YEAR..=year {
            accounts.extend(load::<Account>(&layout.path(Domain::Banking, "accounts", Some(y)))?.unwrap_or_default());
        }
        reports.push(engine.check_account_activity(&accounts, &transactions));
    }

    // Insurance
    if let Some(applicants) = load::<Applicant>(&layout.path(Domain::Insurance, "applicants", None))? {
        let ids = applicants
            .iter()
            .map(|a| (a.applicant_id.as_str(), a.id_number.as_str(), a.date_of_birth));
        reports.push(engine.check_sa_ids("insurance/applicants", ids));
        let bounds = config.bounds(insurance::applicants::APPLICANTS);
        reports.push(engine.check_row_count("insurance/applicants", applicants.len(), bounds));
    }
    let claims: Option<Vec<Claim>> = load(&layout.path(Domain::Insurance, "claims", None))?;
    let policies: Option<Vec<Policy>> = load(&layout.path(Domain::Insurance, "policies", None))?;
    if let (Some(claims), Some(policies)) = (&claims, &policies) {
        reports.push(engine.check_claim_settlements(claims, policies));
    }

    tracing::info!(year, checks = reports.len(), "validation finished");
    Ok(reports)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn create_test_config(label: &str) -> (PathBuf, GeneratorConfig) {
        let dir = scratch_dir(label);
        let mut config = GeneratorConfig::new(&dir, 2020);
        config.scale = 0.02;
        (dir, config)
    }

    #[test]
    fn test_find_generator_names() {
        let (name, _) = find_generator("banking", "loan-payments").unwrap();
        assert_eq!(name, "banking/loan_payments");
        let (name, _) = find_generator("airline", "checkins").unwrap();
        assert_eq!(name, "airline/checkins");

        assert_matches!(
            find_generator("banking", "mortgages"),
            Err(GenError::UnknownGenerator { entity, .. }) if entity == "mortgages"
        );
        assert_matches!(find_generator("shipping", "routes"), Err(GenError::UnknownGenerator { .. }));
    }

    #[test]
    fn test_registry_order() {
        let insurance: Vec<&str> = generators(Domain::Insurance).iter().map(|(n, _)| *n).collect();
        assert_eq!(insurance, vec!["applicants", "policies", "claims", "payments"]);
        assert_eq!(generators(Domain::Banking).len(), 9);
        assert_eq!(generators(Domain::Airline).last().map(|(n, _)| *n), Some("checkins"));
    }

    #[test]
    fn test_insurance_pipeline_records_and_verifies() {
        let (dir, config) = create_test_config("pipeline");

        let records = run_pipeline(&config, "insurance").unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.year == 2020 && r.fingerprint.len() == 64));
        assert_eq!(recorded_runs(&config).unwrap().len(), 4);

        let check = verify(&config, "insurance", "claims").unwrap();
        assert_eq!(check.seed, 42);
        assert!(check.matches(), "replayed claims differ from the recorded run");

        let reports = validate(&config).unwrap();
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| !r.has_critical_issues()), "{:?}", reports);

        fs::remove_dir_all(&dir).ok();
        println!("✅ Insurance pipeline PASSED");
    }

    #[test]
    fn test_banking_pipeline_keeps_transactions_after_opening() {
        let (dir, mut config) = create_test_config("pipeline-banking");
        config.year = 2019;
        config.scale = 0.01;

        let records = run_pipeline(&config, "banking").unwrap();
        assert_eq!(records.len(), 9);

        let reports = validate(&config).unwrap();
        let activity = reports
            .iter()
            .find(|r| r.subject == "banking/transactions")
            .expect("transactions validated");
        assert!(activity.rows_checked > 0);
        assert!(!activity.has_critical_issues(), "{:?}", activity.issues);
        assert!(reports.iter().all(|r| !r.has_critical_issues()), "{:?}", reports);

        let check = verify(&config, "banking", "loans").unwrap();
        assert!(check.matches());

        fs::remove_dir_all(&dir).ok();
        println!("✅ Banking pipeline PASSED");
    }

    #[test]
    fn test_banking_pipeline_with_no_customers() {
        let (dir, mut config) = create_test_config("pipeline-banking-empty");
        config.year = 2020;
        config.scale = 0.0;

        let records = run_pipeline(&config, "banking").unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records[0].row_count, 0, "2020 at zero scale draws no customers");
        assert!(records.iter().all(|r| r.row_count == 0 || r.generator == "banking/transactions"));

        let reports = validate(&config).unwrap();
        assert!(reports.iter().all(|r| !r.has_critical_issues()), "{:?}", reports);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_verify_without_recorded_run() {
        let (dir, config) = create_test_config("verify-missing");
        let err = verify(&config, "insurance", "policies").unwrap_err();
        assert_matches!(err.downcast_ref::<GenError>(), Some(GenError::NoRecordedRun { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_domain_in_pipeline() {
        let (dir, config) = create_test_config("pipeline-unknown");
        let err = run_pipeline(&config, "shipping").unwrap_err();
        assert_matches!(err.downcast_ref::<GenError>(), Some(GenError::InvalidArgument(_)));
        fs::remove_dir_all(&dir).ok();
    }
}
