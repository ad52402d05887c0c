// ✅ Dataset Quality Engine - invariant checks over generated tables
//
// Each check walks a whole table and reports one validation per rule.
// Failing rules carry a few offending ids so they can be looked up.

use crate::airline::{Booking, FlightSchedule};
use crate::banking::{Account, Transaction};
use crate::config::VolumeBounds;
use crate::identity::{sa_id_matches_dob, validate_sa_id};
use crate::insurance::{Claim, ClaimStatus, Policy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Offending ids quoted per failed rule
const EXAMPLES: usize = 3;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    pub field: String,
    pub message: String,
    pub confidence: f64,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str, message: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            confidence: 1.0,
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            confidence: if severity == Severity::Critical { 0.0 } else { 0.5 },
            severity,
        }
    }
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Table or check the report covers
    pub subject: String,
    pub rows_checked: usize,
    pub overall_quality: f64,
    pub overall_confidence: f64,
    pub validations: Vec<ValidationResult>,
    pub issues: Vec<QualityIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
    pub needs_review: bool,
}

impl QualityReport {
    fn new(subject: &str, rows_checked: usize, rules: Vec<RuleOutcome>, review_threshold: f64) -> Self {
        let mut validations = Vec::with_capacity(rules.len());
        let mut issues = Vec::new();
        for rule in rules {
            if let Some(issue) = rule.issue {
                issues.push(issue);
            }
            validations.push(rule.result);
        }

        let passed_count = validations.iter().filter(|v| v.passed).count();
        let failed_count = validations.len() - passed_count;
        let n = validations.len().max(1) as f64;
        let overall_quality = if validations.is_empty() { 1.0 } else { passed_count as f64 / n };
        let overall_confidence = if validations.is_empty() {
            1.0
        } else {
            validations.iter().map(|v| v.confidence).sum::<f64>() / n
        };

        QualityReport {
            subject: subject.to_string(),
            rows_checked,
            overall_quality,
            overall_confidence,
            validations,
            issues,
            passed_count,
            failed_count,
            needs_review: overall_confidence < review_threshold,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows, Quality: {:.1}%, Confidence: {:.1}%, Issues: {} ({} critical)",
            self.subject,
            self.rows_checked,
            self.overall_quality * 100.0,
            self.overall_confidence * 100.0,
            self.issues.len(),
            self.issues.iter().filter(|i| i.severity == Severity::Critical).count()
        )
    }

    pub fn is_high_quality(&self) -> bool {
        self.overall_quality >= 0.8 && self.overall_confidence >= 0.7
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // an invariant the generators promise is broken
    Warning,  // suspicious but tolerable
    Info,
}

// ============================================================================
// RULES
// ============================================================================

struct RuleOutcome {
    result: ValidationResult,
    issue: Option<QualityIssue>,
}

/// Collects the ids that break one rule
struct Rule {
    name: &'static str,
    field: &'static str,
    severity: Severity,
    recommendation: &'static str,
    violations: usize,
    examples: Vec<String>,
}

impl Rule {
    fn new(name: &'static str, field: &'static str, severity: Severity, recommendation: &'static str) -> Self {
        Rule {
            name,
            field,
            severity,
            recommendation,
            violations: 0,
            examples: Vec::new(),
        }
    }

    fn check(&mut self, ok: bool, id: &str) {
        if ok {
            return;
        }
        self.violations += 1;
        if self.examples.len() < EXAMPLES {
            self.examples.push(id.to_string());
        }
    }

    fn finish(self, checked: usize) -> RuleOutcome {
        if self.violations == 0 {
            let message = format!("{} of {} rows pass", checked, checked);
            return RuleOutcome {
                result: ValidationResult::pass(self.name, self.field, &message),
                issue: None,
            };
        }
        let message = format!(
            "{} of {} rows violate {} (e.g. {})",
            self.violations,
            checked,
            self.name,
            self.examples.join(", ")
        );
        RuleOutcome {
            issue: Some(QualityIssue {
                severity: self.severity.clone(),
                field: self.field.to_string(),
                issue: message.clone(),
                recommendation: self.recommendation.to_string(),
            }),
            result: ValidationResult::fail(self.name, self.field, &message, self.severity),
        }
    }
}

// ============================================================================
// DATASET QUALITY ENGINE
// ============================================================================

pub struct DatasetQualityEngine {
    /// Minimum confidence threshold for "needs_review"
    review_threshold: f64,
}

impl DatasetQualityEngine {
    pub fn new() -> Self {
        DatasetQualityEngine { review_threshold: 0.7 }
    }

    /// Every booking points at a known flight and was made before it departed
    pub fn check_bookings(&self, bookings: &[Booking], schedules: &[FlightSchedule]) -> QualityReport {
        let departures: HashMap<&str, &FlightSchedule> =
            schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect();

        let mut flight_exists = Rule::new(
            "booking_flight_exists",
            "planning_id",
            Severity::Critical,
            "Regenerate bookings after schedules for the same year",
        );
        let mut before_departure = Rule::new(
            "booking_before_departure",
            "booking_date",
            Severity::Critical,
            "Booking times must be drawn before the scheduled departure",
        );
        let mut not_cancelled = Rule::new(
            "booking_flight_operates",
            "planning_id",
            Severity::Warning,
            "Cancelled flights should not take new bookings",
        );
        let mut has_adult = Rule::new(
            "booking_has_adult",
            "num_adults",
            Severity::Warning,
            "Every party needs at least one adult",
        );

        for b in bookings {
            let flight = departures.get(b.planning_id.as_str());
            flight_exists.check(flight.is_some(), &b.booking_id);
            if let Some(f) = flight {
                before_departure.check(b.booking_date < f.scheduled_departure, &b.booking_id);
                not_cancelled.check(!f.is_cancelled(), &b.booking_id);
            }
            has_adult.check(b.num_adults >= 1, &b.booking_id);
        }

        let n = bookings.len();
        let rules = vec![
            flight_exists.finish(n),
            before_departure.finish(n),
            not_cancelled.finish(n),
            has_adult.finish(n),
        ];
        QualityReport::new("airline/bookings", n, rules, self.review_threshold)
    }

    /// Transactions only touch accounts that were already open
    pub fn check_account_activity(&self, accounts: &[Account], transactions: &[Transaction]) -> QualityReport {
        let opened: HashMap<&str, NaiveDate> = accounts
            .iter()
            .map(|a| (a.account_id.as_str(), a.opening_date))
            .collect();

        let mut account_exists = Rule::new(
            "transaction_account_exists",
            "account_id",
            Severity::Critical,
            "Generate accounts before transactions",
        );
        let mut after_opening = Rule::new(
            "transaction_after_opening",
            "transaction_date",
            Severity::Critical,
            "Transactions must not predate the account's opening date",
        );
        let mut amount_valid = Rule::new(
            "transaction_amount_valid",
            "amount",
            Severity::Warning,
            "Amounts should be finite and non-negative",
        );

        for t in transactions {
            let opening = opened.get(t.account_id.as_str());
            account_exists.check(opening.is_some(), &t.transaction_id);
            if let Some(opening) = opening {
                after_opening.check(t.transaction_date >= *opening, &t.transaction_id);
            }
            amount_valid.check(t.amount.is_finite() && t.amount >= 0.0, &t.transaction_id);
        }

        let n = transactions.len();
        let rules = vec![account_exists.finish(n), after_opening.finish(n), amount_valid.finish(n)];
        QualityReport::new("banking/transactions", n, rules, self.review_threshold)
    }

    /// Claims and settlements stay within coverage net of the deductible
    pub fn check_claim_settlements(&self, claims: &[Claim], policies: &[Policy]) -> QualityReport {
        let by_number: HashMap<&str, &Policy> = policies.iter().map(|p| (p.policy_number.as_str(), p)).collect();

        let mut policy_exists = Rule::new(
            "claim_policy_exists",
            "policy_number",
            Severity::Critical,
            "Generate claims from the current policy table",
        );
        let mut amount_within = Rule::new(
            "claim_within_coverage",
            "claim_amount",
            Severity::Critical,
            "Clip claim amounts to coverage minus deductible",
        );
        let mut settlement_within = Rule::new(
            "settlement_within_coverage",
            "settlement_amount",
            Severity::Critical,
            "Settlements may never exceed coverage minus deductible",
        );
        let mut pending_open = Rule::new(
            "pending_claim_unsettled",
            "status",
            Severity::Warning,
            "Pending claims carry no settlement amount or date",
        );

        for c in claims {
            let policy = by_number.get(c.policy_number.as_str());
            policy_exists.check(policy.is_some(), &c.claim_id);
            if let Some(p) = policy {
                amount_within.check(c.claim_amount <= p.claimable(), &c.claim_id);
                settlement_within.check(c.settlement_amount.map_or(true, |s| s <= p.claimable()), &c.claim_id);
            }
            if c.status == ClaimStatus::Pending {
                pending_open.check(c.settlement_amount.is_none() && c.date_of_settlement.is_none(), &c.claim_id);
            }
        }

        let n = claims.len();
        let rules = vec![
            policy_exists.finish(n),
            amount_within.finish(n),
            settlement_within.finish(n),
            pending_open.finish(n),
        ];
        QualityReport::new("insurance/claims", n, rules, self.review_threshold)
    }

    /// SA ID numbers are Luhn-valid and encode the holder's birth date.
    /// `records` yields (row id, id number, date of birth).
    pub fn check_sa_ids<'a, I>(&self, subject: &str, records: I) -> QualityReport
    where
        I: IntoIterator<Item = (&'a str, &'a str, NaiveDate)>,
    {
        let mut luhn = Rule::new(
            "sa_id_valid",
            "id_number",
            Severity::Critical,
            "ID numbers need 13 digits, a real date and a Luhn check digit",
        );
        let mut dob = Rule::new(
            "sa_id_matches_dob",
            "id_number",
            Severity::Warning,
            "The YYMMDD prefix should equal the date of birth",
        );

        let mut n = 0;
        for (row, id_number, birth_date) in records {
            n += 1;
            luhn.check(validate_sa_id(id_number), row);
            dob.check(sa_id_matches_dob(id_number, birth_date), row);
        }
        QualityReport::new(subject, n, vec![luhn.finish(n), dob.finish(n)], self.review_threshold)
    }

    /// Table volume sits inside the generator's configured bounds
    pub fn check_row_count(&self, entity: &str, n: usize, bounds: VolumeBounds) -> QualityReport {
        let mut rule = Rule::new(
            "row_count_in_bounds",
            "rows",
            Severity::Warning,
            "Re-run the generator; volumes are drawn inside fixed bounds",
        );
        rule.check(bounds.contains(n), entity);
        QualityReport::new(entity, n, vec![rule.finish(1)], self.review_threshold)
    }

    /// Generate summary statistics for a set of reports
    pub fn batch_summary(&self, reports: &[QualityReport]) -> BatchSummary {
        let total = reports.len();
        let divisor = total.max(1) as f64;
        BatchSummary {
            total_checks: total,
            rows_checked: reports.iter().map(|r| r.rows_checked).sum(),
            high_quality_count: reports.iter().filter(|r| r.is_high_quality()).count(),
            needs_review_count: reports.iter().filter(|r| r.needs_review).count(),
            critical_issues_count: reports.iter().filter(|r| r.has_critical_issues()).count(),
            average_quality: reports.iter().map(|r| r.overall_quality).sum::<f64>() / divisor,
            average_confidence: reports.iter().map(|r| r.overall_confidence).sum::<f64>() / divisor,
        }
    }
}

impl Default for DatasetQualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_checks: usize,
    pub rows_checked: usize,
    pub high_quality_count: usize,
    pub needs_review_count: usize,
    pub critical_issues_count: usize,
    pub average_quality: f64,
    pub average_confidence: f64,
}

impl BatchSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} checks over {} rows: {:.1}% quality, {:.1}% confidence | {} high quality, {} need review, {} critical",
            self.total_checks,
            self.rows_checked,
            self.average_quality * 100.0,
            self.average_confidence * 100.0,
            self.high_quality_count,
            self.needs_review_count,
            self.critical_issues_count
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airline::bookings::tests::create_test_bookings;
    use crate::insurance::claims::tests::create_test_claims;
    use crate::random::Sampler;
    use crate::identity::{generate_sa_id, Gender};
    use chrono::Duration;

    #[test]
    fn test_generated_bookings_are_clean() {
        let engine = DatasetQualityEngine::new();
        let airline = create_test_bookings(2015);
        let report = engine.check_bookings(&airline.bookings, &airline.schedules);

        println!("Report: {}", report.summary());
        assert!(!report.has_critical_issues(), "{:?}", report.issues);
        assert_eq!(report.rows_checked, airline.bookings.len());
    }

    #[test]
    fn test_booking_after_departure_is_critical() {
        let engine = DatasetQualityEngine::new();
        let mut airline = create_test_bookings(2015);
        let late = &mut airline.bookings[0];
        let departure = airline
            .schedules
            .iter()
            .find(|s| s.planning_id == late.planning_id)
            .unwrap()
            .scheduled_departure;
        late.booking_date = departure + Duration::hours(1);

        let report = engine.check_bookings(&airline.bookings, &airline.schedules);
        assert!(report.has_critical_issues());
        assert!(report.issues.iter().any(|i| i.field == "booking_date"));
        assert!(!report.validations.iter().find(|v| v.rule_name == "booking_before_departure").unwrap().passed);
    }

    #[test]
    fn test_claim_settlements() {
        let engine = DatasetQualityEngine::new();
        let (policies, mut claims) = create_test_claims();
        let clean = engine.check_claim_settlements(&claims, &policies);
        assert!(!clean.has_critical_issues(), "{:?}", clean.issues);

        let settled = claims.iter().position(|c| c.status != ClaimStatus::Pending).unwrap();
        let policy = policies.iter().find(|p| p.policy_number == claims[settled].policy_number).unwrap();
        claims[settled].settlement_amount = Some(policy.coverage_amount + 1);
        let broken = engine.check_claim_settlements(&claims, &policies);
        assert!(broken.has_critical_issues());
        assert_eq!(broken.failed_count, 1);
    }

    #[test]
    fn test_sa_ids() {
        let engine = DatasetQualityEngine::new();
        let mut rng = Sampler::seeded(9);
        let dob = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        let good = generate_sa_id(&mut rng, dob, Gender::Female, true);
        let mut bad = good.clone();
        bad.replace_range(12..13, if &good[12..] == "0" { "1" } else { "0" });

        let records = vec![("C1", good.as_str(), dob), ("C2", bad.as_str(), dob)];
        let report = engine.check_sa_ids("banking/customers", records);
        assert_eq!(report.rows_checked, 2);
        assert!(report.has_critical_issues());
        assert!(report.issues[0].issue.contains("C2"));
    }

    #[test]
    fn test_row_count_and_summary() {
        let engine = DatasetQualityEngine::new();
        let ok = engine.check_row_count("insurance/applicants", 6_000, VolumeBounds::new(5_000, 10_000));
        let low = engine.check_row_count("insurance/applicants", 10, VolumeBounds::new(5_000, 10_000));
        assert!(ok.is_high_quality());
        assert!(!low.is_high_quality());
        assert!(!low.has_critical_issues());

        let summary = engine.batch_summary(&[ok, low]);
        println!("Batch summary: {}", summary.summary());
        assert_eq!(summary.total_checks, 2);
        assert_eq!(summary.high_quality_count, 1);
        assert_eq!(summary.critical_issues_count, 0);

        let empty = engine.batch_summary(&[]);
        assert_eq!(empty.total_checks, 0);
        assert_eq!(empty.average_quality, 0.0);
    }
}
