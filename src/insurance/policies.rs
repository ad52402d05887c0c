// 📜 Policies - 1-5 policies per applicant, priced on the applicant's risk
// profile and flagged for proportional or excess-of-loss reinsurance

use crate::config::{GeneratorConfig, SeedPolicy};
use crate::insurance::applicants::{AlcoholUse, Applicant};
use crate::insurance::{book_end, book_start};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "insurance/policies";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(23);

const MAX_POLICIES: u32 = 5;
const COMMERCIAL_JOBS: [&str; 4] = ["Business Owner", "Director", "Executive", "Manager"];

// ============================================================================
// POLICY TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyType {
    Life,
    Health,
    Car,
    Home,
    Travel,
    Commercial,
}

impl PolicyType {
    pub const ALL: [PolicyType; 6] = [
        PolicyType::Life,
        PolicyType::Health,
        PolicyType::Car,
        PolicyType::Home,
        PolicyType::Travel,
        PolicyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Life => "Life",
            PolicyType::Health => "Health",
            PolicyType::Car => "Car",
            PolicyType::Home => "Home",
            PolicyType::Travel => "Travel",
            PolicyType::Commercial => "Commercial",
        }
    }

    /// Letter in the policy number
    pub fn code(&self) -> char {
        match self {
            PolicyType::Life => 'L',
            PolicyType::Health => 'H',
            PolicyType::Car => 'A',
            PolicyType::Home => 'P',
            PolicyType::Travel => 'T',
            PolicyType::Commercial => 'C',
        }
    }

    /// Life and Health are priced on the applicant's body
    pub fn is_personal_risk(&self) -> bool {
        matches!(self, PolicyType::Life | PolicyType::Health)
    }

    /// Multiple of annual income the coverage may reach
    fn coverage_factor(&self) -> f64 {
        match self {
            PolicyType::Life => 10.0,
            PolicyType::Health => 5.0,
            PolicyType::Car => 0.5,
            PolicyType::Home => 1.0,
            PolicyType::Travel => 0.1,
            PolicyType::Commercial => 2.0,
        }
    }

    fn coverage_limits(&self) -> (u64, u64) {
        match self {
            PolicyType::Life => (100_000, 10_000_000),
            PolicyType::Health => (50_000, 5_000_000),
            PolicyType::Car => (50_000, 2_000_000),
            PolicyType::Home => (200_000, 10_000_000),
            PolicyType::Travel => (10_000, 1_000_000),
            PolicyType::Commercial => (500_000, 50_000_000),
        }
    }

    fn base_premium(&self) -> u64 {
        match self {
            PolicyType::Life => 2_000,
            PolicyType::Health => 1_500,
            PolicyType::Car => 1_000,
            PolicyType::Home => 1_200,
            PolicyType::Travel => 500,
            PolicyType::Commercial => 3_000,
        }
    }

    fn allows_xol(&self) -> bool {
        !matches!(self, PolicyType::Car | PolicyType::Travel)
    }

    /// Coverage above which reinsurance is considered
    pub fn reinsurance_threshold(&self) -> u64 {
        match self {
            PolicyType::Life => 1_000_000,
            PolicyType::Health => 500_000,
            PolicyType::Car => 250_000,
            PolicyType::Home => 750_000,
            PolicyType::Travel => 100_000,
            PolicyType::Commercial => 500_000,
        }
    }

    fn subtypes(&self) -> &'static [(&'static str, f64)] {
        match self {
            PolicyType::Life => &[
                ("Term Life", 0.4),
                ("Whole Life", 0.3),
                ("Universal Life", 0.2),
                ("Funeral Cover", 0.05),
                ("Group Life", 0.05),
            ],
            PolicyType::Health => &[
                ("Comprehensive", 0.5),
                ("Hospital Plan", 0.3),
                ("Primary Care", 0.1),
                ("Gap Cover", 0.05),
                ("Executive Health", 0.05),
            ],
            PolicyType::Car => &[
                ("Comprehensive", 0.6),
                ("Third Party", 0.2),
                ("Third Party Fire & Theft", 0.15),
                ("Fleet", 0.05),
            ],
            PolicyType::Home => &[
                ("Building", 0.4),
                ("Contents", 0.3),
                ("Building & Contents", 0.2),
                ("Landlord", 0.05),
                ("High-Net-Worth", 0.05),
            ],
            PolicyType::Travel => &[
                ("Single Trip", 0.5),
                ("Annual Multi-Trip", 0.3),
                ("Backpacker", 0.1),
                ("Business", 0.05),
                ("Adventure", 0.05),
            ],
            PolicyType::Commercial => &[
                ("Property", 0.4),
                ("Liability", 0.3),
                ("Professional Indemnity", 0.15),
                ("Directors & Officers", 0.1),
                ("Cyber", 0.05),
            ],
        }
    }

    fn deductibles(&self) -> &'static [(u64, f64)] {
        match self {
            PolicyType::Life => &[(0, 0.1), (5_000, 0.2), (10_000, 0.3), (25_000, 0.4)],
            PolicyType::Health => &[(1_000, 0.1), (2_000, 0.2), (5_000, 0.3), (10_000, 0.25), (20_000, 0.15)],
            PolicyType::Car => &[(2_500, 0.1), (5_000, 0.2), (7_500, 0.3), (10_000, 0.25), (15_000, 0.15)],
            PolicyType::Home => &[(5_000, 0.1), (10_000, 0.2), (15_000, 0.3), (25_000, 0.25), (50_000, 0.15)],
            PolicyType::Travel => &[(500, 0.1), (1_000, 0.2), (2_000, 0.3), (5_000, 0.4)],
            PolicyType::Commercial => &[
                (10_000, 0.1),
                (25_000, 0.2),
                (50_000, 0.3),
                (100_000, 0.25),
                (250_000, 0.15),
            ],
        }
    }
}

// ============================================================================
// REINSURANCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReinsuranceType {
    Proportional,
    #[serde(rename = "XOL")]
    Xol,
}

impl ReinsuranceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReinsuranceType::Proportional => "Proportional",
            ReinsuranceType::Xol => "XOL",
        }
    }
}

/// Subtypes large enough to favour excess-of-loss cover
const XOL_SUBTYPES: [&str; 9] = [
    "Group Life",
    "Executive Health",
    "Fleet",
    "High-Net-Worth",
    "Property",
    "Liability",
    "Professional Indemnity",
    "Directors & Officers",
    "Cyber",
];

/// Treaties placed with a named reinsurer for every qualifying policy
const SPECIFIC_TREATIES: [(PolicyType, &str, ReinsuranceType, &str); 6] = [
    (PolicyType::Home, "Landlord", ReinsuranceType::Proportional, "Sanlam Re"),
    (PolicyType::Life, "Group Life", ReinsuranceType::Xol, "Swiss Re Africa"),
    (PolicyType::Health, "Executive Health", ReinsuranceType::Xol, "RGA Re Africa"),
    (PolicyType::Car, "Fleet", ReinsuranceType::Proportional, "Hollard Re"),
    (PolicyType::Commercial, "Cyber", ReinsuranceType::Xol, "Munich Re"),
    (PolicyType::Commercial, "Property", ReinsuranceType::Proportional, "Africa Re"),
];

const REINSURERS: [&str; 30] = [
    "Munich Re", "Swiss Re", "Hannover Re", "SCOR", "Lloyd's of London",
    "Berkshire Hathaway Re", "Everest Re", "PartnerRe", "AXIS Re", "RenaissanceRe",
    "Transatlantic Re", "Arch Re", "Aspen Re", "Validus Re", "XL Catlin Re",
    "Africa Re", "Munich Re Africa", "Swiss Re Africa", "Santam Re", "Guardrisk Re",
    "Hollard Re", "Old Mutual Re", "Gen Re Africa", "RGA Re Africa", "Absa Re",
    "Discovery Re", "Liberty Re", "Momentum Re", "Sanlam Re", "OUTsurance Re",
];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reinsurance {
    pub kind: Option<ReinsuranceType>,
    pub company: Option<String>,
    /// Reinsurer's fraction of every claim, proportional treaties only
    pub share: Option<f64>,
    /// Insurer keeps losses up to this amount, XOL treaties only
    pub retention: Option<u64>,
}

/// Reinsurance placement for a policy. Only coverage above 80% of the
/// type's threshold is considered.
pub fn place_reinsurance(rng: &mut Sampler, policy_type: PolicyType, subtype: &str, coverage: u64) -> Reinsurance {
    let threshold = policy_type.reinsurance_threshold() as f64;
    let treaty = SPECIFIC_TREATIES
        .iter()
        .find(|(t, s, _, _)| *t == policy_type && *s == subtype);

    let ratio = coverage as f64 / threshold;
    if ratio <= 0.8 {
        return Reinsurance::default();
    }
    let rate = if treaty.is_some() { 1.0 } else { (0.3 + ratio * 0.7).min(0.95) };
    if rng.beta(2.0, 2.0) >= rate {
        return Reinsurance::default();
    }

    let (kind, company) = match treaty {
        Some((_, _, kind, company)) => (*kind, company.to_string()),
        None => {
            let xol = if XOL_SUBTYPES.contains(&subtype) && policy_type.allows_xol() {
                rng.beta(4.0, 1.5) > 0.3
            } else {
                rng.beta(2.0, 4.0) > 0.6 && policy_type.allows_xol()
            };
            let kind = if xol { ReinsuranceType::Xol } else { ReinsuranceType::Proportional };
            (kind, rng.pick(&REINSURERS).to_string())
        }
    };

    match kind {
        ReinsuranceType::Xol => Reinsurance {
            kind: Some(kind),
            company: Some(company),
            share: None,
            retention: Some(rng.normal(threshold * 0.85, threshold * 0.1).max(0.0) as u64),
        },
        ReinsuranceType::Proportional => Reinsurance {
            kind: Some(kind),
            company: Some(company),
            share: Some(round_to((0.4 + 0.5 * rng.beta(2.0, 1.5)).min(0.9), 2)),
            retention: None,
        },
    }
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    #[serde(rename = "Semi-Annually")]
    SemiAnnually,
    Annually,
    #[serde(rename = "Single Premium")]
    SinglePremium,
}

impl PaymentFrequency {
    pub fn draw(rng: &mut Sampler) -> Self {
        *rng.weighted(&[
            (PaymentFrequency::Monthly, 0.55),
            (PaymentFrequency::Quarterly, 0.20),
            (PaymentFrequency::SemiAnnually, 0.05),
            (PaymentFrequency::Annually, 0.15),
            (PaymentFrequency::SinglePremium, 0.05),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_number: String,
    pub applicant_id: String,
    pub policy_type: PolicyType,
    pub policy_subtype: String,
    pub coverage_amount: u64,
    pub premium_amount: u64,
    pub deductible_amount: u64,
    pub has_xol: bool,
    pub is_reinsured: bool,
    pub reinsurance_company: Option<String>,
    pub reinsurance_share: Option<f64>,
    pub xol_retention_amount: Option<u64>,
    pub reinsurance_type: Option<ReinsuranceType>,
    pub risk_factor: f64,
    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub renewal_notice_date: NaiveDate,
    pub payment_frequency: PaymentFrequency,
    pub discount_percentage: f64,
    pub agent_name: String,
    pub channel: String,
}

impl Policy {
    /// Largest amount a single claim can settle for
    pub fn claimable(&self) -> u64 {
        self.coverage_amount.saturating_sub(self.deductible_amount)
    }
}

// ============================================================================
// PRICING
// ============================================================================

/// Multiplicative loading ≥ 1.0 for personal-risk cover, 1.0 otherwise
pub fn risk_factor(rng: &mut Sampler, applicant: &Applicant, policy_type: PolicyType) -> f64 {
    if !policy_type.is_personal_risk() {
        return 1.0;
    }
    let mut factor = 1.0;

    let age_over = applicant.age.saturating_sub(25) as f64;
    factor *= (1.0 + rng.normal(0.0, 0.015) * age_over).max(1.0);
    if applicant.is_smoker {
        factor *= 1.0 + rng.beta(2.0, 3.0) * 1.5;
    }
    if applicant.long_term_medication {
        factor *= 1.0 + rng.gamma(1.5, 0.3);
    }
    if applicant.alcohol_use == AlcoholUse::High {
        factor *= 1.0 + rng.exponential(0.25);
    }
    if applicant.has_high_risk_job() {
        factor *= (1.0 + rng.normal(0.4, 0.2)).max(1.0);
    }
    round_to(factor.max(1.0), 2)
}

// ============================================================================
// AGENTS
// ============================================================================

const CHANNELS: [&str; 5] = ["Online", "Walk-in", "Phone", "Broker", "Corporate"];
const ONLINE_AGENT: &str = "Online Agent";
const ONLINE_ONLY: &[&str] = &[ONLINE_AGENT];

const AGENTS_BY_PROVINCE: &[(&str, &[&str])] = &[
    ("Gauteng", &["Thabo Mokoena", "Sarah Nkosi", "David Pretorius", "Emma Botha", "Lerato Sithole", "Pieter van Zyl", "Grace Mabaso"]),
    ("Western Cape", &["Michael de Vries", "Aisha Patel", "James Bothma", "Nadine Cloete", "Sipho Ndlovu"]),
    ("KwaZulu-Natal", &["Zanele Dlamini", "Richard Naidoo", "Kathy Govender", "Sibusiso Mkhize", "Claire Pillay"]),
    ("Eastern Cape", &["Nomvula Ngece", "Andrew Smith", "Lungile Mbatha", "Tanya Adams", "Bongani Xaba"]),
    ("Free State", &["Rethabile Moloi", "Jacques du Plessis", "Nthabiseng Tshabalala", "Willem Steyn"]),
    ("Mpumalanga", &["Siphiwe Ngwenya", "Annelize Kruger", "Themba Mahlangu", "Vicky Nkuna"]),
    ("Limpopo", &["Mpho Makgoba", "Rendani Netshifhefhe", "Tshepo Malatji", "Lindiwe Phalane"]),
    ("North West", &["Kagiso Modise", "Amelia Fourie", "Tumelo Moagi", "Boitumelo Seema"]),
    ("Northern Cape", &["Karabo van Niekerk", "Hendrik Coetzee", "Fatima Abrahams", "John Kgoele"]),
];

// ============================================================================
// GENERATOR
// ============================================================================

pub struct PolicyGenerator {
    rng: Sampler,
    counter: usize,
    all_agents: Vec<&'static str>,
}

impl PolicyGenerator {
    pub fn new(seed: u64) -> Self {
        let mut all_agents: Vec<&'static str> = AGENTS_BY_PROVINCE
            .iter()
            .flat_map(|(_, agents)| agents.iter().copied())
            .collect();
        all_agents.push(ONLINE_AGENT);
        PolicyGenerator {
            rng: Sampler::seeded(seed),
            counter: 0,
            all_agents,
        }
    }

    pub fn generate(&mut self, applicants: &[Applicant]) -> Vec<Policy> {
        let mut policies = Vec::new();
        for applicant in applicants {
            let types = self.choose_types(applicant);
            for policy_type in types {
                let policy = self.policy(applicant, policy_type);
                policies.push(policy);
            }
        }
        tracing::info!(applicants = applicants.len(), policies = policies.len(), "policies generated");
        policies
    }

    /// Distinct policy types for an applicant, at least one
    fn choose_types(&mut self, applicant: &Applicant) -> Vec<PolicyType> {
        let commercial = COMMERCIAL_JOBS.contains(&applicant.job_title.as_str());
        let count = self
            .rng
            .poisson(if commercial { 2.5 } else { 1.5 })
            .clamp(1, MAX_POLICIES) as usize;

        let mut candidates: Vec<PolicyType> = if commercial {
            vec![PolicyType::Commercial, PolicyType::Life, PolicyType::Health]
        } else if applicant.age < 26 {
            vec![PolicyType::Travel, PolicyType::Car]
        } else if applicant.age <= 50 {
            vec![PolicyType::Car, PolicyType::Health, PolicyType::Home]
        } else {
            vec![PolicyType::Health, PolicyType::Life, PolicyType::Home]
        };
        if applicant.monthly_income_zar > 30_000 || applicant.assets_value_zar > 500_000 {
            candidates.extend([PolicyType::Life, PolicyType::Health]);
        }
        if applicant.monthly_income_zar > 50_000 {
            candidates.push(PolicyType::Travel);
        }

        // cross-sell on top of the profile's base cover
        if commercial && self.rng.beta(2.0, 3.0) > 0.6 {
            candidates.push(PolicyType::Commercial);
        }
        if candidates.contains(&PolicyType::Home) && applicant.assets_value_zar > 500_000 && self.rng.beta(2.0, 4.0) > 0.7 {
            candidates.push(PolicyType::Home);
        }
        if applicant.monthly_income_zar > 75_000 && !candidates.contains(&PolicyType::Life) && self.rng.beta(3.0, 3.0) > 0.5 {
            candidates.push(PolicyType::Life);
        }

        let mut distinct: Vec<PolicyType> = Vec::new();
        for t in candidates {
            if !distinct.contains(&t) {
                distinct.push(t);
            }
        }
        self.rng.sample(&distinct, count)
    }

    fn policy(&mut self, applicant: &Applicant, policy_type: PolicyType) -> Policy {
        let rng = &mut self.rng;
        let subtype = *rng.weighted(policy_type.subtypes());

        let (min_cover, max_cover) = policy_type.coverage_limits();
        let income_cap = policy_type.coverage_factor() * applicant.monthly_income_zar as f64 * 12.0;
        let ceiling = (max_cover as f64).min(income_cap).max(1.0);
        let drawn = rng.lognormal((ceiling * 0.7).ln(), 0.5);
        let coverage = (drawn.min(ceiling) as u64).max(min_cover);

        let risk = risk_factor(rng, applicant, policy_type);
        let age_factor = if policy_type.is_personal_risk() {
            1.0 + (applicant.age as f64 - 40.0).max(0.0) / 50.0
        } else {
            1.0
        };
        let base = policy_type.base_premium();
        let premium = (base as f64 * age_factor * risk * rng.normal(1.0, 0.1)) as u64;
        let premium = if premium == 0 { base } else { premium };

        let deductible = *rng.weighted(policy_type.deductibles());
        let reinsurance = place_reinsurance(rng, policy_type, subtype, coverage);
        let (effective, expiration, renewal) = policy_dates(rng, policy_type);
        let payment_frequency = PaymentFrequency::draw(rng);
        let discount = round_to(rng.beta(1.5, 4.0) * 15.0, 2);

        let commercial = COMMERCIAL_JOBS.contains(&applicant.job_title.as_str());
        let channel_weights: [f64; 5] = if applicant.job_title == "Student" {
            [0.5, 0.3, 0.2, 0.0, 0.0]
        } else if commercial {
            [0.2, 0.1, 0.1, 0.3, 0.3]
        } else {
            [0.4, 0.3, 0.2, 0.05, 0.05]
        };
        let channel = CHANNELS[rng.weighted_index(&channel_weights)];
        let agent = match channel {
            "Walk-in" => {
                let local = AGENTS_BY_PROVINCE
                    .iter()
                    .find(|(p, _)| *p == applicant.province)
                    .map_or(ONLINE_ONLY, |(_, agents)| *agents);
                *rng.pick(local)
            }
            "Broker" => "Broker Channel",
            "Corporate" => "Corporate Account Manager",
            _ => *rng.pick(&self.all_agents),
        };

        self.counter += 1;
        Policy {
            policy_number: format!("ZA{}{}{:06}", policy_type.code(), effective.year(), self.counter),
            applicant_id: applicant.applicant_id.clone(),
            policy_type,
            policy_subtype: subtype.to_string(),
            coverage_amount: coverage,
            premium_amount: premium,
            deductible_amount: deductible,
            has_xol: reinsurance.kind == Some(ReinsuranceType::Xol),
            is_reinsured: reinsurance.kind.is_some(),
            reinsurance_company: reinsurance.company,
            reinsurance_share: reinsurance.share,
            xol_retention_amount: reinsurance.retention,
            reinsurance_type: reinsurance.kind,
            risk_factor: risk,
            effective_date: effective,
            expiration_date: expiration,
            renewal_notice_date: renewal,
            payment_frequency,
            discount_percentage: discount,
            agent_name: agent.to_string(),
            channel: channel.to_string(),
        }
    }
}

/// (effective, expiration, renewal notice), all inside the book window
fn policy_dates(rng: &mut Sampler, policy_type: PolicyType) -> (NaiveDate, NaiveDate, NaiveDate) {
    let (start, end) = (book_start(), book_end());
    let span = (end - start).num_days() as f64;
    let effective = start + Duration::days((rng.beta(2.0, 3.0) * span) as i64);

    let days = match policy_type {
        PolicyType::Life | PolicyType::Health => (rng.gamma(2.0, 2.0) + 1.0) * 365.0,
        PolicyType::Travel => rng.exponential(60.0) + 30.0,
        _ => (rng.gamma(1.5, 1.0) + 1.0) * 365.0,
    };
    let expiration = (effective + Duration::days(days as i64)).min(end);

    let notice = rng.normal(60.0, 15.0) as i64;
    let renewal = (expiration - Duration::days(notice)).min(end).max(effective);
    (effective, expiration, renewal)
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("📜 Generating policies...");
    let applicants: Vec<Applicant> = read_table(&layout.path(Domain::Insurance, "applicants", None))?;
    println!("   📂 {} applicants", applicants.len());

    let mut generator = PolicyGenerator::new(seed);
    let policies = generator.generate(&applicants);

    let path = layout.path(Domain::Insurance, "policies", None);
    let rows = write_table(&path, &policies)?;
    println!("✓ Saved {} policies to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::insurance::applicants::tests::create_test_applicants;
    use std::collections::{HashMap, HashSet};

    pub(crate) fn create_test_policies() -> (Vec<Applicant>, Vec<Policy>) {
        let applicants = create_test_applicants();
        let policies = PolicyGenerator::new(23).generate(&applicants);
        (applicants, policies)
    }

    #[test]
    fn test_every_applicant_covered() {
        let (applicants, policies) = create_test_policies();
        let mut per_applicant: HashMap<&str, Vec<PolicyType>> = HashMap::new();
        for p in &policies {
            per_applicant.entry(p.applicant_id.as_str()).or_default().push(p.policy_type);
        }
        assert_eq!(per_applicant.len(), applicants.len());
        for types in per_applicant.values() {
            assert!((1..=MAX_POLICIES as usize).contains(&types.len()));
            let distinct: HashSet<&PolicyType> = types.iter().collect();
            assert_eq!(distinct.len(), types.len(), "one policy per type");
        }
        println!("✅ {} policies PASSED", policies.len());
    }

    #[test]
    fn test_policy_terms() {
        let (_, policies) = create_test_policies();
        for p in &policies {
            let (min_cover, _) = p.policy_type.coverage_limits();
            assert!(p.coverage_amount >= min_cover);
            assert!(p.coverage_amount > p.deductible_amount);
            assert!(p.premium_amount > 0);
            assert!(p.risk_factor >= 1.0);
            assert!(p.effective_date >= book_start());
            assert!(p.effective_date <= p.expiration_date);
            assert!(p.expiration_date <= book_end());
            assert!(p.renewal_notice_date >= p.effective_date && p.renewal_notice_date <= book_end());
            assert!((0.0..=15.0).contains(&p.discount_percentage));

            let number = &p.policy_number;
            assert!(number.starts_with(&format!("ZA{}{}", p.policy_type.code(), p.effective_date.year())));
        }
    }

    #[test]
    fn test_reinsurance_fields_consistent() {
        let (_, policies) = create_test_policies();
        for p in &policies {
            match p.reinsurance_type {
                Some(ReinsuranceType::Xol) => {
                    assert!(p.has_xol && p.is_reinsured);
                    assert!(p.xol_retention_amount.is_some() && p.reinsurance_share.is_none());
                }
                Some(ReinsuranceType::Proportional) => {
                    let share = p.reinsurance_share.unwrap();
                    assert!((0.4..=0.9).contains(&share));
                    assert!(p.xol_retention_amount.is_none() && !p.has_xol);
                }
                None => assert!(!p.is_reinsured && p.reinsurance_company.is_none()),
            }
        }
    }

    #[test]
    fn test_specific_treaties() {
        let mut rng = Sampler::seeded(1);
        let placed = place_reinsurance(&mut rng, PolicyType::Commercial, "Cyber", 5_000_000);
        assert_eq!(placed.kind, Some(ReinsuranceType::Xol));
        assert_eq!(placed.company.as_deref(), Some("Munich Re"));

        let small = place_reinsurance(&mut rng, PolicyType::Car, "Fleet", 100_000);
        assert_eq!(small, Reinsurance::default(), "below 80% of threshold");

        for _ in 0..50 {
            let car = place_reinsurance(&mut rng, PolicyType::Car, "Comprehensive", 2_000_000);
            assert_ne!(car.kind, Some(ReinsuranceType::Xol), "car cover never goes XOL");
        }
    }
}
