// 💳 Loans - applications, pricing and approval for customers with accounts
//
// Applications fall between Jan 1 two years back and Nov 1 of the target year,
// never before the customer joined or the chosen account opened.
// A customer holds at most three loans, at least a year apart.

use crate::banking::accounts::{Account, AccountType, IncomeLevel};
use crate::banking::customers::BankCustomer;
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::error::GenError;
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_or_empty, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const GENERATOR: &str = "banking/loans";
pub const FIRST_LOAN_YEAR: i32 = 2018;
pub const MAX_LOANS_PER_CUSTOMER: usize = 3;
pub const MIN_GAP_DAYS: i64 = 365;

/// Loans are seeded with the target year
pub fn seed_policy(year: i32) -> SeedPolicy {
    SeedPolicy::Fixed(year as u64)
}

// ============================================================================
// LOAN TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    #[serde(rename = "Home Loan")]
    Home,
    #[serde(rename = "Personal Loan")]
    Personal,
    #[serde(rename = "Business Loan")]
    Business,
    #[serde(rename = "Vehicle Loan")]
    Vehicle,
    #[serde(rename = "Education Loan")]
    Education,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Home => "Home Loan",
            LoanType::Personal => "Personal Loan",
            LoanType::Business => "Business Loan",
            LoanType::Vehicle => "Vehicle Loan",
            LoanType::Education => "Education Loan",
        }
    }

    /// Base annual rate in percent
    pub fn base_rate(&self) -> f64 {
        match self {
            LoanType::Home => 7.0,
            LoanType::Personal => 12.0,
            LoanType::Business => 9.0,
            LoanType::Vehicle => 10.5,
            LoanType::Education => 8.0,
        }
    }

    pub fn max_dti(&self) -> f64 {
        match self {
            LoanType::Home => 0.28,
            LoanType::Personal => 0.15,
            LoanType::Business => 0.25,
            LoanType::Vehicle => 0.20,
            LoanType::Education => 0.10,
        }
    }

    fn rate_adjustment(&self) -> f64 {
        match self {
            LoanType::Home => -0.5,
            LoanType::Vehicle => 0.0,
            LoanType::Education => 0.5,
            LoanType::Personal => 2.0,
            LoanType::Business => 1.0,
        }
    }

    fn purposes(&self) -> &'static [(&'static str, f64)] {
        match self {
            LoanType::Home => &[("Purchase", 0.4), ("Refinance", 0.3), ("Construction", 0.15), ("Home Improvement", 0.15)],
            LoanType::Personal => &[("Debt Consolidation", 0.6), ("Medical", 0.15), ("Wedding", 0.1), ("Travel", 0.1), ("Emergency", 0.05)],
            LoanType::Business => &[("Equipment", 0.3), ("Working Capital", 0.4), ("Expansion", 0.2), ("Inventory", 0.1)],
            LoanType::Vehicle => &[("New Car", 0.5), ("Used Car", 0.3), ("Motorcycle", 0.1), ("Commercial Vehicle", 0.1)],
            LoanType::Education => &[("Tuition", 0.4), ("Living Expenses", 0.3), ("Books", 0.2), ("Study Abroad", 0.1)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Approved,
    Rejected,
    #[serde(rename = "Approved_Then_Withdrawn")]
    ApprovedThenWithdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::ApprovedThenWithdrawn => "Approved_Then_Withdrawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationChannel {
    LegacyMainframe,
    NewDigital,
    BranchManual,
    MobileApp,
    BrokerChannel,
}

impl ApplicationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationChannel::LegacyMainframe => "legacy_mainframe",
            ApplicationChannel::NewDigital => "new_digital",
            ApplicationChannel::BranchManual => "branch_manual",
            ApplicationChannel::MobileApp => "mobile_app",
            ApplicationChannel::BrokerChannel => "broker_channel",
        }
    }

    fn approval_modifier(&self) -> f64 {
        match self {
            ApplicationChannel::MobileApp => 0.9,
            ApplicationChannel::BrokerChannel => 1.2,
            _ => 1.0,
        }
    }
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: String,
    pub customer_id: String,
    pub account_id: String,
    pub loan_type: LoanType,
    pub principal_amount: f64,
    pub amount_granted: f64,
    /// Annual percent
    pub interest_rate: f64,
    pub terms_months: u32,
    pub monthly_installment: f64,
    pub collateral_description: String,
    pub loan_grade: String,
    pub name_contract_type: String,
    pub credit_score: u32,
    pub credit_history_months: u32,
    pub payment_history_pct: f64,
    pub credit_utilization: f64,
    pub ext_source_rating: f64,
    pub financial_distress: bool,
    pub flag_bank_statement: bool,
    pub flag_proof_of_address: bool,
    pub flag_employment_verification: bool,
    pub flag_tax_returns: bool,
    pub flag_property_valuation: bool,
    pub flag_vehicle_valuation: bool,
    pub flag_academic_records: bool,
    pub flag_business_registration: bool,
    pub flag_audited_financials: bool,
    pub count_req_credit_bureau_hour: u32,
    pub count_req_credit_bureau_day: u32,
    pub count_req_credit_bureau_week: u32,
    pub count_req_credit_bureau_month: u32,
    pub count_req_credit_bureau_quarter: u32,
    pub count_req_credit_bureau_year: u32,
    pub loan_purpose: String,
    pub application_channel: String,
    pub application_status: ApplicationStatus,
    pub rejection_reason: Option<String>,
    pub processing_days: u32,
    pub application_date: NaiveDateTime,
    pub approval_date: Option<NaiveDateTime>,
}

impl Loan {
    pub fn is_approved(&self) -> bool {
        self.application_status == ApplicationStatus::Approved
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CreditProfile {
    pub credit_score: u32,
    pub credit_history_months: u32,
    pub payment_history_pct: f64,
    pub credit_utilization: f64,
    pub ext_source_rating: f64,
}

// ============================================================================
// PURE PRICING FUNCTIONS
// ============================================================================

/// Level monthly payment for an amortising loan
pub fn amortization_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal;
    }
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return principal / term_months as f64;
    }
    let growth = (1.0 + r).powi(term_months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Largest principal a monthly payment can service
pub fn max_principal(monthly_payment: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return monthly_payment * term_months as f64;
    }
    let growth = (1.0 + r).powi(term_months as i32);
    monthly_payment * (growth - 1.0) / (r * growth)
}

pub fn loan_grade(credit_score: u32, debt_to_income: f64, ext_source_rating: f64) -> &'static str {
    let composite = credit_score as f64 / 850.0 * 0.5 + (1.0 - debt_to_income) * 0.3 + ext_source_rating * 0.2;
    match composite {
        c if c >= 0.85 => "A+",
        c if c >= 0.75 => "A",
        c if c >= 0.65 => "B+",
        c if c >= 0.55 => "B",
        c if c >= 0.45 => "C+",
        c if c >= 0.35 => "C",
        _ => "D",
    }
}

fn stability_multiplier(occupation: &str) -> f64 {
    match occupation {
        "Doctor" | "Lawyer" => 1.2,
        "Engineer" => 1.1,
        "Unemployed" => 0.0,
        "Self-Employed" => 0.8,
        "Student" => 0.3,
        _ => 1.0,
    }
}

/// Prior loans per customer, used to enforce the count and gap limits
#[derive(Debug, Default)]
pub struct LoanHistory {
    applications: HashMap<String, Vec<NaiveDateTime>>,
}

impl LoanHistory {
    pub fn from_loans(loans: &[Loan]) -> Self {
        let mut history = LoanHistory::default();
        for loan in loans {
            history.record(&loan.customer_id, loan.application_date);
        }
        history
    }

    pub fn record(&mut self, customer_id: &str, application: NaiveDateTime) {
        self.applications
            .entry(customer_id.to_string())
            .or_default()
            .push(application);
    }

    pub fn can_take_loan(&self, customer_id: &str, year: i32) -> bool {
        let Some(dates) = self.applications.get(customer_id) else {
            return true;
        };
        if dates.len() >= MAX_LOANS_PER_CUSTOMER {
            return false;
        }
        let year_end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
        match dates.iter().max() {
            Some(last) => (year_end - last.date()).num_days() >= MIN_GAP_DAYS,
            None => true,
        }
    }

    pub fn count(&self, customer_id: &str) -> usize {
        self.applications.get(customer_id).map_or(0, |d| d.len())
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct LoanGenerator {
    year: i32,
    rng: Sampler,
    counter: usize,
}

/// A customer's view for one loan run
struct Applicant<'a> {
    customer: &'a BankCustomer,
    age: u32,
    /// Annual income after any 2020 reduction
    income: f64,
    distress: bool,
    profile: CreditProfile,
    accounts: Vec<&'a Account>,
}

impl LoanGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        LoanGenerator {
            year,
            rng: Sampler::seeded(seed),
            counter: 1,
        }
    }

    pub fn generate(
        &mut self,
        customers: &[BankCustomer],
        accounts: &[Account],
        history: &mut LoanHistory,
    ) -> Result<Vec<Loan>> {
        if self.year < FIRST_LOAN_YEAR {
            return Err(GenError::UnsupportedYear {
                generator: GENERATOR.to_string(),
                year: self.year,
                minimum: FIRST_LOAN_YEAR,
            }
            .into());
        }

        let mut by_customer: BTreeMap<&str, Vec<&Account>> = BTreeMap::new();
        for account in accounts {
            by_customer.entry(account.customer_id.as_str()).or_default().push(account);
        }
        let customer_index: HashMap<&str, &BankCustomer> =
            customers.iter().map(|c| (c.customer_id.as_str(), c)).collect();

        let distress_rate = if self.year == 2020 { 0.1 } else { 0.05 };
        let mut loans = Vec::new();

        for (customer_id, customer_accounts) in by_customer {
            let Some(customer) = customer_index.get(customer_id).copied() else {
                tracing::warn!(customer_id, "account without a customer row, skipping");
                continue;
            };
            // Current-year customers always apply; earlier ones in a 3% sample
            if customer.date_of_entry.year() < self.year && !self.rng.chance(0.03) {
                continue;
            }
            if !history.can_take_loan(customer_id, self.year) {
                continue;
            }

            let applicant = self.applicant(customer, customer_accounts, distress_rate);
            let wanted = self.loan_count(&applicant);
            let room = MAX_LOANS_PER_CUSTOMER.saturating_sub(history.count(customer_id));
            for _ in 0..(wanted as usize).min(room) {
                let loan = self.application(&applicant);
                history.record(customer_id, loan.application_date);
                loans.push(loan);
            }
        }

        tracing::info!(
            year = self.year,
            loans = loans.len(),
            approved = loans.iter().filter(|l| l.is_approved()).count(),
            "loans generated"
        );
        Ok(loans)
    }

    fn applicant<'a>(&mut self, customer: &'a BankCustomer, accounts: Vec<&'a Account>, distress_rate: f64) -> Applicant<'a> {
        let age = if customer.is_company() { 40 } else { customer.age.unwrap_or(35) };
        let mut income = customer
            .annual_income
            .filter(|i| *i > 0.0)
            .unwrap_or(300_000.0);
        if self.year == 2020 && self.rng.chance(0.2) {
            income *= self.rng.uniform(0.6, 0.9);
        }
        let distress = self.rng.chance(distress_rate);
        let profile = self.credit_profile(customer, age, distress);
        Applicant {
            customer,
            age,
            income,
            distress,
            profile,
            accounts,
        }
    }

    fn loan_count(&mut self, a: &Applicant) -> u32 {
        if a.customer.is_company() {
            return if self.year == 2020 { 1 } else { *self.rng.weighted(&[(1, 0.8), (2, 0.2)]) };
        }
        if self.year == 2020 {
            *self.rng.weighted(&[(0, 0.7), (1, 0.3)])
        } else if self.year == 2019 && self.rng.chance(0.1) {
            *self.rng.weighted(&[(0, 0.65), (1, 0.35)])
        } else if a.age >= 26 {
            if IncomeLevel::of(Some(a.income)) == IncomeLevel::High {
                *self.rng.weighted(&[(1, 0.3), (2, 0.5), (3, 0.2)])
            } else {
                *self.rng.weighted(&[(1, 0.6), (2, 0.4)])
            }
        } else {
            *self.rng.weighted(&[(0, 0.6), (1, 0.4)])
        }
    }

    fn credit_profile(&mut self, customer: &BankCustomer, age: u32, distress: bool) -> CreditProfile {
        let credit_score = if distress {
            self.rng.int(300, 580) as u32
        } else {
            let mut base = 650.0;
            if matches!(customer.occupation.as_str(), "Doctor" | "Lawyer" | "Engineer") {
                base += 50.0;
            }
            if age > 35 {
                base += 30.0;
            }
            if age < 25 {
                base -= 40.0;
            }
            if self.year == 2020 {
                base -= self.rng.int(10, 50) as f64;
            }
            self.rng.normal(base, 60.0).clamp(580.0, 850.0) as u32
        };

        let credit_history_months = if customer.is_company() {
            self.rng.int(60, 240) as u32
        } else {
            let adult_months = (age.saturating_sub(18) * 12) as f64;
            let drawn = self.rng.normal((age as f64 * 8.0).max(6.0), 24.0).max(6.0);
            drawn.min(adult_months).max(0.0) as u32
        };

        let payment_history_pct = match credit_score {
            s if s > 740 => self.rng.uniform(0.95, 1.0),
            s if s > 670 => self.rng.uniform(0.85, 0.95),
            s if s > 580 => self.rng.uniform(0.70, 0.85),
            _ => self.rng.uniform(0.50, 0.70),
        };

        let credit_utilization = if distress {
            self.rng.uniform(0.7, 0.95)
        } else {
            let mut u = self.rng.uniform(0.05, 0.30);
            if self.year == 2020 && self.rng.chance(0.3) {
                u = (u + self.rng.uniform(0.1, 0.3)).min(0.95);
            }
            u
        };

        let ext = payment_history_pct * 0.4 + (1.0 - credit_utilization) * 0.3 + credit_score as f64 / 850.0 * 0.3;
        CreditProfile {
            credit_score,
            credit_history_months,
            payment_history_pct: round_to(payment_history_pct, 3),
            credit_utilization: round_to(credit_utilization, 3),
            ext_source_rating: round_to(ext, 2),
        }
    }

    fn application(&mut self, a: &Applicant) -> Loan {
        let channel = *self.rng.weighted(&[
            (ApplicationChannel::LegacyMainframe, 0.2),
            (ApplicationChannel::NewDigital, 0.3),
            (ApplicationChannel::BranchManual, 0.2),
            (ApplicationChannel::MobileApp, 0.2),
            (ApplicationChannel::BrokerChannel, 0.1),
        ]);
        let account = self.pick_account(a);
        // no application before the customer joined or the account opened
        let floor = account.map_or(a.customer.date_of_entry, |acc| acc.opening_date.max(a.customer.date_of_entry));
        let application_date = self.application_date(floor);
        let month = application_date.month();
        let loan_type = self.loan_type(a, month, channel);
        let term = self.term(loan_type, a, month);

        let rate = self.risk_adjusted_rate(a, loan_type, application_date, channel);
        let principal = self.principal(a, loan_type, term, rate, month);
        let approval_ratio = match a.profile.credit_score {
            s if s >= 750 => self.rng.beta(9.0, 1.0),
            s if s >= 650 => self.rng.beta(7.0, 3.0),
            _ => self.rng.beta(5.0, 5.0),
        };
        let granted = principal * approval_ratio;
        let installment = round_to(amortization_payment(granted, rate, term), 2);
        let dti = installment / (a.income / 12.0);

        let purpose = self.purpose(a, loan_type, month);
        let flags = self.document_flags(a, loan_type, principal, month);
        let docs_complete = flags[0] && flags[1];
        let (status, rejection_reason, processing_days) =
            self.approval(a, principal, dti, docs_complete, application_date, channel);
        let approval_date = match status {
            ApplicationStatus::Rejected => None,
            _ => Some(application_date + Duration::days(processing_days as i64)),
        };

        let counts = self.bureau_counts(a.distress, application_date);

        let loan = Loan {
            loan_id: self.loan_id(channel, application_date),
            customer_id: a.customer.customer_id.clone(),
            account_id: account.map(|acc| acc.account_id.clone()).unwrap_or_default(),
            loan_type,
            principal_amount: round_to(principal, 2),
            amount_granted: round_to(granted, 2),
            interest_rate: rate,
            terms_months: term,
            monthly_installment: installment,
            collateral_description: self.collateral(a, loan_type),
            loan_grade: loan_grade(a.profile.credit_score, dti, a.profile.ext_source_rating).to_string(),
            name_contract_type: self.rng.pick(&["Standard", "Revolving"]).to_string(),
            credit_score: a.profile.credit_score,
            credit_history_months: a.profile.credit_history_months,
            payment_history_pct: a.profile.payment_history_pct,
            credit_utilization: a.profile.credit_utilization,
            ext_source_rating: a.profile.ext_source_rating,
            financial_distress: a.distress,
            flag_bank_statement: flags[0],
            flag_proof_of_address: flags[1],
            flag_employment_verification: flags[2],
            flag_tax_returns: flags[3],
            flag_property_valuation: loan_type == LoanType::Home,
            flag_vehicle_valuation: loan_type == LoanType::Vehicle,
            flag_academic_records: loan_type == LoanType::Education,
            flag_business_registration: a.customer.is_company(),
            flag_audited_financials: flags[4],
            count_req_credit_bureau_hour: counts[0],
            count_req_credit_bureau_day: counts[1],
            count_req_credit_bureau_week: counts[2],
            count_req_credit_bureau_month: counts[3],
            count_req_credit_bureau_quarter: counts[3] * 3,
            count_req_credit_bureau_year: counts[4],
            loan_purpose: purpose.to_string(),
            application_channel: channel.as_str().to_string(),
            application_status: status,
            rejection_reason,
            processing_days,
            application_date,
            approval_date,
        };
        self.counter += 1;
        loan
    }

    /// Uniform over the two years up to November, never before `floor`
    fn application_date(&mut self, floor: NaiveDate) -> NaiveDateTime {
        let start = NaiveDate::from_ymd_opt(self.year - 2, 1, 1).unwrap_or(NaiveDate::MIN).max(floor);
        let end = NaiveDate::from_ymd_opt(self.year, 11, 1).unwrap_or(NaiveDate::MAX);
        let day = self.rng.date_between(start, end);
        day.and_hms_opt(0, 0, 0).unwrap_or_default() + Duration::seconds(self.rng.int(0, 86_399))
    }

    fn loan_type(&mut self, a: &Applicant, month: u32, channel: ApplicationChannel) -> LoanType {
        if a.customer.is_company() {
            return LoanType::Business;
        }
        let mut weights = vec![
            (LoanType::Home, 0.2),
            (LoanType::Personal, 0.35),
            (LoanType::Vehicle, 0.25),
        ];
        if a.age < 30 {
            weights.push((LoanType::Education, 0.15));
        }
        for (loan_type, w) in weights.iter_mut() {
            let loan_type = *loan_type;
            let factor = match (loan_type, month) {
                (LoanType::Personal, 11 | 12) => 1.5 * if self.year == 2019 { 1.2 } else { 1.0 },
                (LoanType::Vehicle, 11 | 12) => 1.2 * if self.year == 2019 { 0.9 } else { 1.0 },
                (LoanType::Home, 11 | 12) if self.year == 2019 => 0.9,
                (LoanType::Education, 1 | 2) => 2.0,
                (LoanType::Personal, 1 | 2) => 1.3,
                _ => 1.0,
            };
            *w *= factor;
            if self.year == 2020 {
                *w *= match loan_type {
                    LoanType::Personal => 1.8,
                    LoanType::Home => 0.4,
                    LoanType::Vehicle => 0.6,
                    _ => 1.0,
                };
            }
            if channel == ApplicationChannel::BrokerChannel {
                *w *= match loan_type {
                    LoanType::Personal => 0.7,
                    LoanType::Home => 1.4,
                    _ => 1.0,
                };
            }
        }
        *self.rng.weighted(&weights)
    }

    fn term(&mut self, loan_type: LoanType, a: &Applicant, month: u32) -> u32 {
        let options: &[u32] = match loan_type {
            LoanType::Home if !a.customer.is_company() && a.age <= 50 => &[120, 180, 240, 300, 360],
            LoanType::Home => &[120, 180],
            LoanType::Personal => &[12, 24, 36, 48, 60],
            LoanType::Business if matches!(month, 3 | 9) => &[6, 12, 18, 24],
            LoanType::Business => &[24, 36, 48, 60, 84],
            LoanType::Vehicle => &[24, 36, 48, 60, 72],
            LoanType::Education => &[12, 24, 36, 48],
        };
        *self.rng.pick(options)
    }

    /// Percent, clamped to 5..25
    fn risk_adjusted_rate(&mut self, a: &Applicant, loan_type: LoanType, date: NaiveDateTime, channel: ApplicationChannel) -> f64 {
        let risk = match a.profile.credit_score {
            s if s >= 750 => -1.0,
            s if s >= 700 => 0.0,
            s if s >= 650 => 1.5,
            s if s >= 600 => 3.0,
            _ => 5.0,
        };
        let employment = match (a.customer.is_company(), a.customer.occupation.as_str()) {
            (false, "Self-Employed") => 1.5,
            (false, "Doctor" | "Teacher") => -0.5,
            _ => 0.0,
        };
        let competitive = if self.rng.poisson(3.0) > 5 { -self.rng.uniform(0.5, 1.5) } else { 0.0 };
        let years_with_bank = self.rng.exponential(5.0);
        let loyalty = if years_with_bank > 10.0 && a.income > 100_000.0 {
            -self.rng.uniform(0.25, 0.75)
        } else {
            0.0
        };
        let new_customer = if years_with_bank < 1.0 { self.rng.uniform(0.25, 1.0) } else { 0.0 };
        let discretion = if channel == ApplicationChannel::BranchManual { self.rng.normal(0.0, 0.5) } else { 0.0 };
        let month_end = if date.day() > 25 { -self.rng.uniform(0.5, 1.0) } else { 0.0 };
        let stress = match (self.year, date.month()) {
            (2020, _) => 1.2,
            (2019, 11 | 12) => 1.05,
            _ => 1.0,
        };

        let rate = (loan_type.base_rate() + risk + loan_type.rate_adjustment() + employment + competitive
            + loyalty + new_customer + discretion + month_end)
            * stress;
        round_to(rate, 2).clamp(5.0, 25.0)
    }

    fn principal(&mut self, a: &Applicant, loan_type: LoanType, term: u32, rate: f64, month: u32) -> f64 {
        let monthly_income = a.income / 12.0;
        let mut payment = monthly_income * loan_type.max_dti() * stability_multiplier(&a.customer.occupation);
        if !a.customer.is_company() {
            if a.age < 25 {
                payment *= 0.7;
            } else if a.age > 55 {
                payment *= 0.9;
            }
        }
        let serviceable = max_principal(payment, rate, term);
        let cap = match loan_type {
            LoanType::Home => serviceable.min(a.income * 4.0),
            LoanType::Personal => serviceable.min(monthly_income * 10.0),
            LoanType::Business => serviceable.min(a.income * 2.0),
            LoanType::Vehicle => serviceable.min(a.income * 0.8),
            LoanType::Education => serviceable.min(500_000.0),
        }
        .max(0.0);

        let mut amount = cap;
        if self.rng.chance(0.4) {
            let round = *self.rng.pick(&[50_000.0, 75_000.0, 100_000.0, 150_000.0, 200_000.0, 250_000.0, 500_000.0, 1_000_000.0]);
            amount = round * self.rng.uniform(0.95, 1.05);
        }
        if !a.customer.is_company() && a.age < 35 && self.rng.chance(0.25) {
            amount *= self.rng.uniform(1.2, 1.8);
        }
        if a.distress {
            amount = (amount * self.rng.uniform(0.8, 1.0)).min(cap);
        }
        if a.customer.is_company() {
            let seasonal = match (a.customer.occupation.as_str(), month) {
                ("Agriculture", 3) => 2.5,
                ("Agriculture", 4) => 1.8,
                ("Agriculture", 9) => 2.0,
                ("Agriculture", 10) => 1.5,
                ("Retail", 10) => 2.5,
                ("Retail", 11) => 2.0,
                ("Retail", 1) => 0.4,
                ("Construction", 9) => 1.8,
                ("Construction", 10) => 1.6,
                ("Construction", 5) => 0.7,
                _ => 1.0,
            };
            amount *= seasonal;
        }
        amount.min(cap).max(0.0)
    }

    fn purpose(&mut self, a: &Applicant, loan_type: LoanType, month: u32) -> &'static str {
        let holiday_personal: &[(&str, f64)] = &[
            ("Debt Consolidation", 0.5), ("Medical", 0.2), ("Wedding", 0.15), ("Travel", 0.1), ("Emergency", 0.05),
        ];
        let quarter_business: &[(&str, f64)] = &[
            ("Equipment", 0.2), ("Working Capital", 0.5), ("Expansion", 0.2), ("Inventory", 0.1),
        ];
        let table = match loan_type {
            LoanType::Personal if !a.customer.is_company() && matches!(month, 11 | 12) => holiday_personal,
            LoanType::Business if a.customer.is_company() && matches!(month, 3 | 9) => quarter_business,
            other => other.purposes(),
        };
        *self.rng.weighted(table)
    }

    /// (status, rejection reason, processing days)
    fn approval(
        &mut self,
        a: &Applicant,
        principal: f64,
        dti: f64,
        docs_complete: bool,
        date: NaiveDateTime,
        channel: ApplicationChannel,
    ) -> (ApplicationStatus, Option<String>, u32) {
        let employed = a.customer.is_company() || !a.customer.is_unemployed();
        if a.profile.credit_score < 500 || !employed || dti > 0.4 {
            let reason = *self.rng.pick(&["Insufficient income", "High debt-to-income ratio", "Poor credit history"]);
            return (ApplicationStatus::Rejected, Some(reason.to_string()), self.rng.int(1, 3) as u32);
        }

        let review = if principal > 1_000_000.0 {
            self.rng.int(7, 14)
        } else if principal > 500_000.0 {
            self.rng.int(3, 7)
        } else {
            self.rng.int(1, 3)
        };
        let mut days = 1 + review as u32;
        if !docs_complete {
            days += self.rng.int(3, 10) as u32;
        }

        let mut p = match a.profile.credit_score {
            s if s >= 720 => 0.95,
            s if s >= 650 => 0.80,
            s if s >= 580 => 0.60,
            _ => 0.30,
        };
        match (self.year, date.month()) {
            (2020, _) => p *= 0.8,
            (2019, 11 | 12) => p *= 0.95,
            _ => {}
        }
        let mood = *self.rng.weighted(&[("good", 0.3), ("neutral", 0.4), ("stressed", 0.2), ("quota_pressure", 0.1)]);
        p *= 1.0 + self.rng.normal(0.0, 0.1);
        if mood == "stressed" {
            p *= 0.9;
        } else if mood == "quota_pressure" && date.day() > 25 {
            p *= 1.1;
        }
        p *= channel.approval_modifier();

        if !self.rng.chance(p) {
            let reason = *self.rng.pick(&[
                "Insufficient income",
                "High debt-to-income ratio",
                "Poor credit history",
                "Incomplete documentation",
                "Loan officer gut feeling",
                "Application handwriting illegible",
            ]);
            return (ApplicationStatus::Rejected, Some(reason.to_string()), days);
        }
        if self.rng.chance(0.05) {
            let reason = *self.rng.pick(&[
                "Credit_Score_Change",
                "Employment_Verification_Failed",
                "Property_Valuation_Low",
                "Bank_Policy_Change",
                "Customer_Changed_Mind",
            ]);
            return (ApplicationStatus::ApprovedThenWithdrawn, Some(reason.to_string()), days);
        }
        (ApplicationStatus::Approved, None, days)
    }

    /// bank statement, proof of address, employment verification, tax returns, audited financials
    fn document_flags(&mut self, a: &Applicant, loan_type: LoanType, principal: f64, month: u32) -> [bool; 5] {
        if a.customer.is_company() {
            let large = a.customer.number_of_employees.unwrap_or(0) > 50;
            let tax = self.rng.chance(if large { 0.95 } else { 0.7 });
            let audited = self.rng.chance(if large { 0.95 } else { 0.3 });
            return [true, true, false, tax, audited];
        }

        let occupation = a.customer.occupation.as_str();
        // (bank statement, employment letter, tax returns)
        let (p_bank, p_letter, p_tax) = match occupation {
            "Doctor" | "Lawyer" | "Engineer" | "Teacher" => (0.8, 0.6, 0.2),
            "Self-Employed" => (0.9, 0.3, 0.4),
            _ => (0.3, 0.05, 0.2),
        };
        let bank = principal > 100_000.0 || occupation == "Self-Employed" || self.rng.chance(p_bank);
        let address = self.rng.chance(0.95);
        let letter_p = p_letter * if matches!(month, 12 | 1) { 0.7 } else { 1.0 };
        let employment = !matches!(occupation, "Unemployed" | "Student") && self.rng.chance(letter_p);
        let tax = self.rng.chance(p_tax) || loan_type == LoanType::Business;
        [bank, address, employment, tax, false]
    }

    /// hour, day, week, month, year inquiry counts
    fn bureau_counts(&mut self, distress: bool, date: NaiveDateTime) -> [u32; 5] {
        let pattern: [f64; 5] = if distress || (self.year == 2020 && self.rng.chance(0.3)) {
            [2.0, 8.0, 25.0, 60.0, 150.0]
        } else {
            *self.rng.pick(&[
                [0.01, 0.1, 0.5, 1.0, 3.0],
                [0.8, 4.0, 8.0, 12.0, 20.0],
                [0.2, 1.0, 3.0, 8.0, 15.0],
            ])
        };
        let multiplier = if (2..=5).contains(&date.hour()) {
            1.5
        } else if date.weekday() == Weekday::Sun {
            1.3
        } else {
            1.0
        };
        pattern.map(|lambda| (self.rng.poisson(lambda) as f64 * multiplier) as u32)
    }

    fn pick_account<'a>(&mut self, a: &Applicant<'a>) -> Option<&'a Account> {
        let accounts = &a.accounts;
        if accounts.len() > 1 && !a.customer.is_company() {
            let joint: Vec<&'a Account> = accounts
                .iter()
                .copied()
                .filter(|acc| acc.account_type == AccountType::Joint)
                .collect();
            if !joint.is_empty() && self.rng.chance(0.7) {
                return Some(*self.rng.pick(&joint));
            }
            return Some(*self.rng.pick(accounts));
        }
        accounts.first().copied()
    }

    fn collateral(&mut self, a: &Applicant, loan_type: LoanType) -> String {
        match loan_type {
            LoanType::Home => a
                .customer
                .residential_address
                .clone()
                .unwrap_or_else(|| "Unknown Address".to_string()),
            LoanType::Vehicle => {
                let brand = *self.rng.pick(&["Toyota", "Ford", "Honda", "BMW", "Mercedes", "Volkswagen", "Audi", "Hyundai", "Nissan"]);
                let model = *self.rng.pick(&["Corolla", "Focus", "Civic", "X5", "C-Class", "Golf", "A4", "Elantra", "Altima"]);
                format!("{} {} {}", self.rng.int(2005, self.year as i64), brand, model)
            }
            LoanType::Business => self.rng.pick(&["Equipment", "Inventory", "Accounts Receivable", "None"]).to_string(),
            _ => self.rng.pick(&["None", "Savings Account", "Guarantee", "None"]).to_string(),
        }
    }

    fn loan_id(&mut self, channel: ApplicationChannel, date: NaiveDateTime) -> String {
        let year = self.year;
        let n = self.counter;
        let mut id = match channel {
            ApplicationChannel::LegacyMainframe => format!("LN{}{}", year, self.rng.int(100_000, 999_999)),
            ApplicationChannel::NewDigital => format!("DL-{}-{:06}", year, n),
            ApplicationChannel::BranchManual => {
                format!("BR{}{:03}{}", year, self.rng.int(1, 10), self.rng.int(1000, 9999))
            }
            ApplicationChannel::MobileApp => format!("MB{}{}{:04}", year, date.format("%y%m%d"), n),
            ApplicationChannel::BrokerChannel => format!("BK{}-{}-{:05}", year, self.rng.int(100, 999), n),
        };
        if self.rng.chance(0.02) {
            id.push_str(&format!("-R{}", self.rng.int(1, 5)));
        }
        id
    }
}

/// Last scheduled instalment date
pub fn maturity_date(loan: &Loan) -> Option<NaiveDate> {
    let start = loan.approval_date?.date();
    start.checked_add_months(Months::new(loan.terms_months))
}

// ============================================================================
// RUN
// ============================================================================

fn load_years<T: serde::de::DeserializeOwned>(layout: &DataLayout, entity: &str, years: std::ops::Range<i32>) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for year in years {
        rows.extend(read_or_empty::<T>(&layout.path(Domain::Banking, entity, Some(year)))?);
    }
    Ok(rows)
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    let layout = DataLayout::new(&config.data_dir);
    let year = config.year;
    let seed = config.resolve_seed(seed_policy(year));

    println!("💳 Generating loans for {}...", year);
    let customers: Vec<BankCustomer> = load_years(&layout, "customers", FIRST_LOAN_YEAR..year + 1)?;
    let accounts: Vec<Account> = load_years(&layout, "accounts", FIRST_LOAN_YEAR..year + 1)?;
    let current = layout.path(Domain::Banking, "customers", Some(year));
    if !current.exists() {
        return Err(GenError::MissingInput { path: current }.into());
    }
    if customers.is_empty() {
        tracing::warn!(year, "no customers drawn, writing an empty loans table");
    }
    let prior: Vec<Loan> = load_years(&layout, "loans", FIRST_LOAN_YEAR..year)?;
    let mut history = LoanHistory::from_loans(&prior);
    println!("   📂 {} customers, {} accounts, {} prior loans", customers.len(), accounts.len(), prior.len());

    let loans = LoanGenerator::new(year, seed).generate(&customers, &accounts, &mut history)?;
    let path = layout.path(Domain::Banking, "loans", Some(year));
    let rows = write_table(&path, &loans)?;
    println!("✓ Saved {} loans to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::banking::accounts::tests::create_test_customers;
    use crate::banking::accounts::AccountGenerator;
    use assert_matches::assert_matches;

    pub(crate) fn create_test_loans(year: i32) -> (Vec<BankCustomer>, Vec<Account>, Vec<Loan>) {
        let customers = create_test_customers(year);
        let accounts = AccountGenerator::new(year, 11).generate(&customers);
        let mut history = LoanHistory::default();
        let loans = LoanGenerator::new(year, year as u64)
            .generate(&customers, &accounts, &mut history)
            .unwrap();
        (customers, accounts, loans)
    }

    #[test]
    fn test_amortization() {
        let payment = amortization_payment(100_000.0, 12.0, 12);
        assert!((payment - 8884.88).abs() < 0.01, "got {}", payment);
        assert_eq!(amortization_payment(1200.0, 0.0, 12), 100.0);

        let principal = max_principal(payment, 12.0, 12);
        assert!((principal - 100_000.0).abs() < 0.01);
    }

    #[test]
    fn test_loan_grades() {
        assert_eq!(loan_grade(850, 0.0, 1.0), "A+");
        assert_eq!(loan_grade(300, 1.0, 0.0), "D");
    }

    #[test]
    fn test_rejects_years_before_2018() {
        let mut history = LoanHistory::default();
        let err = LoanGenerator::new(2017, 1).generate(&[], &[], &mut history).unwrap_err();
        assert_matches!(err.downcast_ref::<GenError>(), Some(GenError::UnsupportedYear { minimum: 2018, .. }));
    }

    #[test]
    fn test_loan_invariants() {
        let (_, accounts, loans) = create_test_loans(2019);
        assert!(!loans.is_empty(), "expected some loans");

        let account_ids: std::collections::HashSet<&str> =
            accounts.iter().map(|a| a.account_id.as_str()).collect();
        for loan in &loans {
            assert!((5.0..=25.0).contains(&loan.interest_rate), "rate {}", loan.interest_rate);
            assert!(loan.amount_granted <= loan.principal_amount + 0.01);
            assert!(account_ids.contains(loan.account_id.as_str()));
            assert!(loan.application_date.year() >= 2017 && loan.application_date.year() <= 2019);
            match loan.application_status {
                ApplicationStatus::Rejected => {
                    assert!(loan.approval_date.is_none());
                    assert!(loan.rejection_reason.is_some());
                }
                ApplicationStatus::Approved => {
                    assert!(loan.approval_date.unwrap() > loan.application_date);
                    assert!(loan.rejection_reason.is_none());
                }
                ApplicationStatus::ApprovedThenWithdrawn => assert!(loan.rejection_reason.is_some()),
            }
        }
        println!("✅ Loan invariants PASSED ({} loans)", loans.len());
    }

    #[test]
    fn test_application_after_opening_and_entry() {
        let (customers, accounts, loans) = create_test_loans(2019);
        let opened: HashMap<&str, NaiveDate> =
            accounts.iter().map(|a| (a.account_id.as_str(), a.opening_date)).collect();
        let entered: HashMap<&str, NaiveDate> =
            customers.iter().map(|c| (c.customer_id.as_str(), c.date_of_entry)).collect();

        for loan in &loans {
            let applied = loan.application_date.date();
            assert!(applied >= opened[loan.account_id.as_str()], "{} applied before its account opened", loan.loan_id);
            assert!(applied >= entered[loan.customer_id.as_str()], "{} applied before the customer joined", loan.loan_id);
        }
        println!("✅ Application dates PASSED ({} loans)", loans.len());
    }

    #[test]
    fn test_empty_customer_table_gives_empty_loans() {
        let dir = crate::table::scratch_dir("loans-empty");
        let layout = DataLayout::new(&dir);
        write_table::<BankCustomer>(&layout.path(Domain::Banking, "customers", Some(2020)), &[]).unwrap();
        write_table::<Account>(&layout.path(Domain::Banking, "accounts", Some(2020)), &[]).unwrap();

        let outcome = run(&GeneratorConfig::new(&dir, 2020)).unwrap();
        assert_eq!(outcome.rows, 0);
        assert!(layout.path(Domain::Banking, "loans", Some(2020)).exists());

        let missing = run(&GeneratorConfig::new(&dir, 2019)).unwrap_err();
        assert_matches!(missing.downcast_ref::<GenError>(), Some(GenError::MissingInput { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_history_limits() {
        let (_, _, loans) = create_test_loans(2019);
        let mut per_customer: HashMap<&str, usize> = HashMap::new();
        for loan in &loans {
            *per_customer.entry(loan.customer_id.as_str()).or_default() += 1;
        }
        assert!(per_customer.values().all(|n| *n <= MAX_LOANS_PER_CUSTOMER));

        let mut history = LoanHistory::default();
        let recent = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        history.record("IND2019000001", recent);
        assert!(!history.can_take_loan("IND2019000001", 2019));
        assert!(history.can_take_loan("IND2019000001", 2021));
        assert!(history.can_take_loan("IND2019000002", 2019));
    }

    #[test]
    fn test_same_seed_same_loans() {
        let (_, _, a) = create_test_loans(2018);
        let (_, _, b) = create_test_loans(2018);
        assert_eq!(a, b);
    }
}
