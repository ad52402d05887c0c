// Insurance Domain
// Applicant → Policy → Claim / Premium Payment
//
// Insurance tables cover one fixed book of business (policies effective
// 2015-2020), so they live in insurance_data/ without a year suffix.

pub mod applicants;
pub mod policies;
pub mod claims;
pub mod payments;

pub use applicants::{AlcoholUse, Applicant, ApplicantGenerator};
pub use claims::{Claim, ClaimGenerator, ClaimStatus};
pub use payments::{PaymentScheduler, PremiumPayment};
pub use policies::{PaymentFrequency, Policy, PolicyGenerator, PolicyType, ReinsuranceType};

use chrono::NaiveDate;

/// Occupations loaded on Life and Health risk and on claim frequency
pub const HIGH_RISK_JOBS: [&str; 8] = [
    "Security Guard",
    "Construction Worker",
    "Miner",
    "Electrician",
    "Mechanic",
    "Pilot",
    "Driver",
    "Fisherman",
];

/// Earliest policy effective date
pub fn book_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Nothing in the book runs past this date
pub fn book_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default()
}
