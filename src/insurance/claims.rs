// 🧾 Claims - losses against policies, settled net of the deductible and
// split with the reinsurer
//
// Every policy rolls once for whether it claims at all. Claimants then file
// 1..max claims spread over the policy's effective window, each with its own
// amount, fraud screening and settlement. The only state carried between
// claims is the policy's own claim history.

use crate::config::{GeneratorConfig, SeedPolicy};
use crate::insurance::applicants::Applicant;
use crate::insurance::policies::{Policy, PolicyType, ReinsuranceType};
use crate::insurance::{book_end, book_start};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const GENERATOR: &str = "insurance/claims";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

const MAX_CLAIM_RATE: f64 = 0.9;
const VANDALISM: &str = "Vandalism";
const VANDALISM_CAP: u64 = 20_000;
const LARGE_CLAIM: u64 = 50_000;

/// Claims filed after this date are too fresh to have been decided
fn last_decidable_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 8, 30).unwrap_or_default()
}

// ============================================================================
// CLAIM MODELS
// ============================================================================

/// Claim amount distribution, scaled by coverage net of deductible
#[derive(Debug, Clone, Copy, PartialEq)]
enum AmountModel {
    /// Median at `factor` × scale
    LogNormal { sigma: f64, factor: f64, vandalism_factor: f64 },
    /// Mean at `shape` × scale / `divisor`
    Gamma { shape: f64, divisor: f64, vandalism_divisor: f64 },
    /// Mean at scale / `divisor`
    Exponential { divisor: f64, vandalism_divisor: f64 },
}

impl AmountModel {
    fn draw(&self, rng: &mut Sampler, scale: f64, vandalism: bool) -> f64 {
        match *self {
            AmountModel::LogNormal { sigma, factor, vandalism_factor } => {
                let f = if vandalism { vandalism_factor } else { factor };
                rng.lognormal((scale * f).max(1.0).ln(), sigma)
            }
            AmountModel::Gamma { shape, divisor, vandalism_divisor } => {
                let d = if vandalism { vandalism_divisor } else { divisor };
                rng.gamma(shape, scale / d)
            }
            AmountModel::Exponential { divisor, vandalism_divisor } => {
                let d = if vandalism { vandalism_divisor } else { divisor };
                rng.exponential(scale / d)
            }
        }
    }
}

struct ClaimModel {
    rate: f64,
    max_claims: u64,
    amount: AmountModel,
    kinds: &'static [(&'static str, f64)],
    processing_days: (u32, u32),
    fraud_rate: f64,
    handlers: [&'static str; 5],
}

fn claim_model(policy_type: PolicyType) -> ClaimModel {
    match policy_type {
        PolicyType::Life => ClaimModel {
            rate: 0.08,
            max_claims: 1,
            amount: AmountModel::LogNormal { sigma: 0.4, factor: 0.9, vandalism_factor: 0.1 },
            kinds: &[("Death", 0.6), ("Disability", 0.2), ("Critical Illness", 0.15), ("Terminal Illness", 0.05)],
            processing_days: (30, 90),
            fraud_rate: 0.02,
            handlers: ["John LifeAdjuster", "Sarah Benefits", "Michael DeathClaims", "Lisa Disability", "Robert Annuities"],
        },
        PolicyType::Health => ClaimModel {
            rate: 0.25,
            max_claims: 4,
            amount: AmountModel::LogNormal { sigma: 0.6, factor: 0.6, vandalism_factor: 0.1 },
            kinds: &[
                ("Hospitalization", 0.3),
                ("Surgery", 0.25),
                ("Outpatient", 0.2),
                ("Chronic Condition", 0.15),
                ("Emergency", 0.1),
            ],
            processing_days: (14, 45),
            fraud_rate: 0.08,
            handlers: ["Dr. Smith", "Nurse Johnson", "Medical Review Team", "Health Specialist", "Hospital Liaison"],
        },
        PolicyType::Car => ClaimModel {
            rate: 0.22,
            max_claims: 3,
            amount: AmountModel::Gamma { shape: 2.0, divisor: 3.0, vandalism_divisor: 20.0 },
            kinds: &[("Collision", 0.35), ("Theft", 0.25), (VANDALISM, 0.15), ("Accident", 0.15), ("Glass Damage", 0.1)],
            processing_days: (7, 30),
            fraud_rate: 0.12,
            handlers: ["Auto Specialist", "Accident Investigator", "Collision Expert", "Vehicle Assessor", "Repair Coordinator"],
        },
        PolicyType::Home => ClaimModel {
            rate: 0.18,
            max_claims: 2,
            amount: AmountModel::Gamma { shape: 1.5, divisor: 2.0, vandalism_divisor: 10.0 },
            kinds: &[
                ("Fire", 0.25),
                ("Theft", 0.25),
                ("Water Damage", 0.2),
                ("Structural Damage", 0.15),
                ("Storm Damage", 0.15),
            ],
            processing_days: (21, 60),
            fraud_rate: 0.06,
            handlers: ["Property Adjuster", "Structural Engineer", "Home Claims Dept", "Building Inspector", "Damage Assessor"],
        },
        PolicyType::Travel => ClaimModel {
            rate: 0.35,
            max_claims: 3,
            amount: AmountModel::Exponential { divisor: 5.0, vandalism_divisor: 20.0 },
            kinds: &[
                ("Trip Cancellation", 0.3),
                ("Medical Emergency", 0.25),
                ("Lost Luggage", 0.2),
                ("Delay", 0.15),
                ("Travel Accident", 0.1),
            ],
            processing_days: (5, 21),
            fraud_rate: 0.15,
            handlers: ["Travel Claims", "Emergency Services", "Trip Specialist", "Tour Coordinator", "Travel Agent Liaison"],
        },
        PolicyType::Commercial => ClaimModel {
            rate: 0.12,
            max_claims: 2,
            amount: AmountModel::LogNormal { sigma: 0.7, factor: 0.8, vandalism_factor: 0.1 },
            kinds: &[
                ("Property Damage", 0.3),
                ("Liability", 0.25),
                ("Business Interruption", 0.2),
                ("Cyber Incident", 0.15),
                ("Equipment Breakdown", 0.1),
            ],
            processing_days: (45, 120),
            fraud_rate: 0.05,
            handlers: ["Commercial Specialist", "Risk Manager", "Business Claims", "Corporate Adjuster", "Enterprise Risk"],
        },
    }
}

/// Yearly market conditions: (claim, fraud, processing) multipliers
pub fn external_factors(year: i32) -> (f64, f64, f64) {
    match year {
        2016 => (1.05, 1.1, 0.95),
        2017 => (0.95, 0.9, 1.05),
        2018 => (1.1, 1.2, 0.9),
        // pandemic year
        2020 => (1.3, 1.4, 1.2),
        _ => (1.0, 1.0, 1.0),
    }
}

const FRAUD_INDICATORS: [&str; 13] = [
    "Late reporting",
    "Inconsistent story",
    "Previous claims history",
    "Suspicious documentation",
    "Cash payment request",
    "New policy claim",
    "High claim frequency",
    "Unusual circumstances",
    "Witness discrepancies",
    "Photo inconsistencies",
    "Provider history",
    "Geographic mismatch",
    "Missing police report",
];

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Approved,
    Rejected,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentationStatus {
    Complete,
    Partial,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub customer_id: String,
    pub policy_number: String,
    pub policy_type: PolicyType,
    pub claim_type: String,
    pub claim_amount: u64,
    pub date_of_claim: NaiveDate,
    pub status: ClaimStatus,
    /// Zero when rejected, empty while pending
    pub settlement_amount: Option<u64>,
    pub date_of_settlement: Option<NaiveDate>,
    pub processing_days: u32,
    pub reinsurance: bool,
    pub reinsurance_type: Option<ReinsuranceType>,
    pub reinsurer_settlement: Option<u64>,
    pub reinsurance_company: Option<String>,
    pub claim_handler: String,
    /// `; `-separated
    pub fraud_indicators: Option<String>,
    pub complexity_level: String,
    pub documentation_status: DocumentationStatus,
}

// ============================================================================
// SETTLEMENT RULES
// ============================================================================

/// Insurer's payout for an approved claim. Never exceeds what the policy can
/// pay out net of the deductible.
pub fn settle(
    rng: &mut Sampler,
    policy: &Policy,
    claim_type: &str,
    claim_amount: u64,
    flagged: bool,
) -> u64 {
    let mut settlement = claim_amount.saturating_sub(policy.deductible_amount).min(policy.claimable()) as f64;
    if flagged {
        settlement *= rng.uniform(0.5, 0.8);
    }
    match policy.policy_type {
        PolicyType::Health => settlement *= rng.uniform(0.8, 0.95),
        PolicyType::Travel => settlement *= rng.uniform(0.7, 0.9),
        _ if claim_type == VANDALISM => settlement = settlement.min(VANDALISM_CAP as f64),
        _ => {}
    }
    settlement as u64
}

/// Treaty that responds to a claim on this policy
pub fn claim_reinsurance(policy: &Policy) -> Option<ReinsuranceType> {
    if policy.xol_retention_amount.is_some() && policy.coverage_amount > policy.policy_type.reinsurance_threshold() {
        Some(ReinsuranceType::Xol)
    } else if policy.reinsurance_share.is_some_and(|s| s > 0.0) {
        Some(ReinsuranceType::Proportional)
    } else {
        None
    }
}

/// Reinsurer's part of a settlement. Proportional treaties take their share
/// of every payout; XOL treaties pay what the loss exceeds the retention by.
pub fn reinsurer_share(
    policy: &Policy,
    kind: Option<ReinsuranceType>,
    claim_amount: u64,
    settlement: Option<u64>,
) -> Option<u64> {
    let settlement = settlement.filter(|s| *s > 0)?;
    match kind? {
        ReinsuranceType::Proportional => policy.reinsurance_share.map(|share| (settlement as f64 * share) as u64),
        ReinsuranceType::Xol => {
            let retention = policy.xol_retention_amount?;
            (claim_amount > retention).then(|| settlement.min(claim_amount - retention))
        }
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct ClaimGenerator {
    rng: Sampler,
    counter: usize,
}

impl ClaimGenerator {
    pub fn new(seed: u64) -> Self {
        ClaimGenerator {
            rng: Sampler::seeded(seed),
            counter: 0,
        }
    }

    pub fn generate(&mut self, applicants: &[Applicant], policies: &[Policy]) -> Vec<Claim> {
        let by_id: HashMap<&str, &Applicant> = applicants.iter().map(|a| (a.applicant_id.as_str(), a)).collect();
        let mut claims = Vec::new();

        for policy in policies {
            let Some(applicant) = by_id.get(policy.applicant_id.as_str()).copied() else {
                tracing::debug!(policy = %policy.policy_number, "policy without applicant");
                continue;
            };
            let filed = self.claims_for(applicant, policy);
            claims.extend(filed);
        }

        let pending = claims.iter().filter(|c| c.status == ClaimStatus::Pending).count();
        tracing::info!(policies = policies.len(), claims = claims.len(), pending, "claims generated");
        claims
    }

    /// Probability the policy claims at least once over its window
    fn claim_rate(applicant: &Applicant, policy: &Policy, start: NaiveDate, end: NaiveDate) -> f64 {
        let model = claim_model(policy.policy_type);
        let mut rate = model.rate;
        if policy.policy_type.is_personal_risk() {
            if applicant.is_smoker {
                rate *= 1.5;
            }
            if applicant.long_term_medication {
                rate *= 1.3;
            }
        }
        if applicant.has_high_risk_job() {
            rate *= 1.2;
        }
        let years: Vec<f64> = (start.year()..=end.year()).map(|y| external_factors(y).0).collect();
        rate *= years.iter().sum::<f64>() / years.len().max(1) as f64;
        (rate * policy.risk_factor).min(MAX_CLAIM_RATE)
    }

    fn claims_for(&mut self, applicant: &Applicant, policy: &Policy) -> Vec<Claim> {
        let start = policy.effective_date.max(book_start());
        let end = policy.expiration_date.min(book_end());
        if start >= end {
            return Vec::new();
        }
        if !self.rng.chance(Self::claim_rate(applicant, policy, start, end)) {
            return Vec::new();
        }

        let model = claim_model(policy.policy_type);
        let window = (end - start).num_days();
        let max_claims = model.max_claims.min((window as f64 / 365.0 * 1.5) as u64);
        let count = self.rng.binomial(max_claims, 0.5).max(1);

        // travel claims cluster late in the trip, the rest early in the term
        let (a, b) = if policy.policy_type == PolicyType::Travel { (3.0, 2.0) } else { (2.0, 3.0) };
        let mut dates: Vec<NaiveDate> = (0..count)
            .map(|_| start + Duration::days((self.rng.beta(a, b) * window as f64) as i64))
            .collect();
        dates.sort();

        let mut history: Vec<NaiveDate> = Vec::new();
        let mut filed = Vec::new();
        for date in dates {
            let claim = self.claim(policy, &model, date, &history);
            history.push(date);
            filed.push(claim);
        }
        filed
    }

    fn claim(&mut self, policy: &Policy, model: &ClaimModel, date: NaiveDate, history: &[NaiveDate]) -> Claim {
        let rng = &mut self.rng;
        let claim_type = *rng.weighted(model.kinds);
        let vandalism = claim_type == VANDALISM;

        let scale = policy.claimable();
        let cap = if vandalism { scale.min(VANDALISM_CAP) } else { scale };
        let claim_amount = (model.amount.draw(rng, scale as f64, vandalism).max(0.0) as u64).min(cap);

        let indicators = fraud_indicators(rng, policy, model, claim_type, claim_amount, date, history);
        let documentation = *rng.pick(&[
            DocumentationStatus::Complete,
            DocumentationStatus::Partial,
            DocumentationStatus::Pending,
        ]);
        let processing_days = processing_days(rng, model, date, claim_type, claim_amount, !indicators.is_empty(), documentation);

        let status = decide(rng, policy.policy_type, date, processing_days, !indicators.is_empty(), documentation);
        let (settlement_amount, date_of_settlement) = match status {
            ClaimStatus::Approved => (
                Some(settle(rng, policy, claim_type, claim_amount, !indicators.is_empty())),
                Some(date + Duration::days(processing_days as i64)),
            ),
            ClaimStatus::Rejected => (Some(0), Some(date + Duration::days(processing_days as i64))),
            ClaimStatus::Pending => (None, None),
        };

        let reinsurance_type = claim_reinsurance(policy);
        let reinsurer_settlement = reinsurer_share(policy, reinsurance_type, claim_amount, settlement_amount);
        let claim_handler = rng.pick(&model.handlers).to_string();
        let complexity_level = rng.pick(&["Simple", "Moderate", "Complex"]).to_string();

        self.counter += 1;
        Claim {
            claim_id: format!("CLM{:06}", self.counter),
            customer_id: policy.applicant_id.clone(),
            policy_number: policy.policy_number.clone(),
            policy_type: policy.policy_type,
            claim_type: claim_type.to_string(),
            claim_amount,
            date_of_claim: date,
            status,
            settlement_amount,
            date_of_settlement,
            processing_days,
            reinsurance: reinsurance_type.is_some(),
            reinsurance_type,
            reinsurer_settlement,
            reinsurance_company: reinsurance_type.and(policy.reinsurance_company.clone()),
            claim_handler,
            fraud_indicators: (!indicators.is_empty()).then(|| indicators.join("; ")),
            complexity_level,
            documentation_status: documentation,
        }
    }
}

fn fraud_indicators(
    rng: &mut Sampler,
    policy: &Policy,
    model: &ClaimModel,
    claim_type: &str,
    claim_amount: u64,
    date: NaiveDate,
    history: &[NaiveDate],
) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if history.len() > 2 {
        flags.push("Multiple previous claims");
    }
    if history.last().is_some_and(|last| (date - *last).num_days() < 30) {
        flags.push("High claim frequency");
    }
    if claim_amount > LARGE_CLAIM && policy.policy_type != PolicyType::Car && claim_type != VANDALISM {
        flags.push("Unusually large claim");
    }
    if (date - policy.effective_date).num_days() < 30 {
        flags.push("New policy claim");
    }
    if claim_type == VANDALISM && rng.chance(0.3) {
        flags.push("Missing police report");
    }
    if rng.chance(model.fraud_rate * external_factors(date.year()).1) {
        flags.push(*rng.pick(&FRAUD_INDICATORS));
    }
    flags
}

#[allow(clippy::too_many_arguments)]
fn processing_days(
    rng: &mut Sampler,
    model: &ClaimModel,
    date: NaiveDate,
    claim_type: &str,
    claim_amount: u64,
    flagged: bool,
    documentation: DocumentationStatus,
) -> u32 {
    let factor = external_factors(date.year()).2;
    let (lo, hi) = model.processing_days;
    let mut days = rng.int((lo as f64 * factor) as i64, (hi as f64 * factor) as i64) as f64;

    if claim_amount > LARGE_CLAIM && claim_type != VANDALISM {
        days *= 1.5;
    }
    if flagged {
        days *= 1.3;
    }
    match documentation {
        DocumentationStatus::Partial => days *= 1.2,
        DocumentationStatus::Pending => days *= 1.5,
        DocumentationStatus::Complete => {}
    }
    if claim_type == VANDALISM {
        days = days.min(20.0);
    }
    days.max(7.0) as u32
}

/// Claims filed before the decision cutoff that would settle inside the book
/// get a decision; everything else is still pending.
fn decide(
    rng: &mut Sampler,
    policy_type: PolicyType,
    date: NaiveDate,
    processing_days: u32,
    flagged: bool,
    documentation: DocumentationStatus,
) -> ClaimStatus {
    let settles = date + Duration::days(processing_days as i64);
    if date > last_decidable_date() || settles > book_end() {
        return ClaimStatus::Pending;
    }

    let (mut approve, mut reject, pending) = if flagged { (0.4, 0.4, 0.2) } else { (0.7, 0.2, 0.1) };
    if matches!(policy_type, PolicyType::Life | PolicyType::Commercial) {
        approve *= 0.9;
        reject *= 1.1;
    }
    if documentation == DocumentationStatus::Pending {
        approve *= 0.8;
        reject *= 1.2;
    }
    *rng.weighted(&[
        (ClaimStatus::Approved, approve),
        (ClaimStatus::Rejected, reject),
        (ClaimStatus::Pending, pending),
    ])
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🧾 Generating claims...");
    let applicants: Vec<Applicant> = read_table(&layout.path(Domain::Insurance, "applicants", None))?;
    let policies: Vec<Policy> = read_table(&layout.path(Domain::Insurance, "policies", None))?;
    println!("   📂 {} applicants, {} policies", applicants.len(), policies.len());

    let mut generator = ClaimGenerator::new(seed);
    let claims = generator.generate(&applicants, &policies);

    let path = layout.path(Domain::Insurance, "claims", None);
    let rows = write_table(&path, &claims)?;
    println!("✓ Saved {} claims to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::insurance::policies::tests::create_test_policies;
    use crate::insurance::policies::PaymentFrequency;

    pub(crate) fn create_test_claims() -> (Vec<Policy>, Vec<Claim>) {
        let (applicants, policies) = create_test_policies();
        let claims = ClaimGenerator::new(42).generate(&applicants, &policies);
        (policies, claims)
    }

    fn create_test_policy(policy_type: PolicyType, coverage: u64, deductible: u64) -> Policy {
        Policy {
            policy_number: "ZAC2018000001".to_string(),
            applicant_id: "APPL00001".to_string(),
            policy_type,
            policy_subtype: "Property".to_string(),
            coverage_amount: coverage,
            premium_amount: 3_000,
            deductible_amount: deductible,
            has_xol: false,
            is_reinsured: false,
            reinsurance_company: None,
            reinsurance_share: None,
            xol_retention_amount: None,
            reinsurance_type: None,
            risk_factor: 1.0,
            effective_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            renewal_notice_date: NaiveDate::from_ymd_opt(2019, 11, 1).unwrap(),
            payment_frequency: PaymentFrequency::Monthly,
            discount_percentage: 0.0,
            agent_name: "Online Agent".to_string(),
            channel: "Online".to_string(),
        }
    }

    #[test]
    fn test_settlement_within_coverage() {
        let (policies, claims) = create_test_claims();
        assert!(!claims.is_empty());
        let by_number: HashMap<&str, &Policy> = policies.iter().map(|p| (p.policy_number.as_str(), p)).collect();

        for c in &claims {
            let policy = by_number[c.policy_number.as_str()];
            assert!(c.claim_amount <= policy.claimable());
            assert!(c.date_of_claim >= policy.effective_date && c.date_of_claim <= policy.expiration_date);
            match c.status {
                ClaimStatus::Approved => {
                    let settled = c.settlement_amount.unwrap();
                    assert!(settled <= policy.claimable(), "{} over-settled", c.claim_id);
                    assert!(c.date_of_settlement.unwrap() <= book_end());
                }
                ClaimStatus::Rejected => assert_eq!(c.settlement_amount, Some(0)),
                ClaimStatus::Pending => {
                    assert!(c.settlement_amount.is_none() && c.date_of_settlement.is_none());
                    assert!(c.reinsurer_settlement.is_none());
                }
            }
            if c.claim_type == VANDALISM {
                assert!(c.claim_amount <= VANDALISM_CAP);
            }
        }
        println!("✅ {} claims PASSED", claims.len());
    }

    #[test]
    fn test_late_claims_stay_pending() {
        let (_, claims) = create_test_claims();
        for c in claims.iter().filter(|c| c.date_of_claim > last_decidable_date()) {
            assert_eq!(c.status, ClaimStatus::Pending);
        }
        assert!(claims.iter().all(|c| c.processing_days >= 7));
    }

    #[test]
    fn test_proportional_reinsurer_share() {
        let mut policy = create_test_policy(PolicyType::Commercial, 2_000_000, 50_000);
        policy.reinsurance_share = Some(0.5);
        policy.reinsurance_type = Some(ReinsuranceType::Proportional);

        let kind = claim_reinsurance(&policy);
        assert_eq!(kind, Some(ReinsuranceType::Proportional));
        assert_eq!(reinsurer_share(&policy, kind, 300_000, Some(250_000)), Some(125_000));
        assert_eq!(reinsurer_share(&policy, kind, 300_000, Some(0)), None);
        assert_eq!(reinsurer_share(&policy, kind, 300_000, None), None);
    }

    #[test]
    fn test_xol_reinsurer_share() {
        let mut policy = create_test_policy(PolicyType::Commercial, 2_000_000, 50_000);
        policy.xol_retention_amount = Some(400_000);
        policy.reinsurance_type = Some(ReinsuranceType::Xol);

        let kind = claim_reinsurance(&policy);
        assert_eq!(kind, Some(ReinsuranceType::Xol));
        // loss above retention: reinsurer pays the excess
        assert_eq!(reinsurer_share(&policy, kind, 1_000_000, Some(950_000)), Some(600_000));
        // excess larger than the settlement is capped by it
        assert_eq!(reinsurer_share(&policy, kind, 1_900_000, Some(1_000_000)), Some(1_000_000));
        // loss under retention stays with the insurer
        assert_eq!(reinsurer_share(&policy, kind, 300_000, Some(250_000)), None);

        let small = create_test_policy(PolicyType::Commercial, 400_000, 10_000);
        assert_eq!(claim_reinsurance(&small), None);
    }

    #[test]
    fn test_settle_caps() {
        let mut rng = Sampler::seeded(3);
        let car = create_test_policy(PolicyType::Car, 300_000, 5_000);
        for _ in 0..20 {
            let paid = settle(&mut rng, &car, VANDALISM, 295_000, false);
            assert!(paid <= VANDALISM_CAP);
        }
        let paid = settle(&mut rng, &car, "Collision", 100_000, false);
        assert_eq!(paid, 95_000);
        let paid = settle(&mut rng, &car, "Collision", 3_000, false);
        assert_eq!(paid, 0, "below deductible");
    }
}
