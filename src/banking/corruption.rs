// 🧨 Error Injection - a dirty copy of loan payments for exercising data-quality tooling

use crate::banking::loan_payments::LoanPayment;
use crate::random::{round_to, Sampler};
use serde::{Deserialize, Serialize};

/// Loan payment with every column as text so malformed values survive the CSV round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLoanPayment {
    pub transaction_id: String,
    pub account_id: String,
    pub transaction_date: String,
    pub transaction_time: String,
    pub amount: String,
    pub debit_credit: String,
    pub status: String,
    pub description: String,
    pub immediate_payment: String,
    pub transaction_cost: String,
    pub channel: String,
    pub loan_id: String,
    pub customer_id: String,
    pub loan_type: String,
    pub payment_type: String,
    pub payment_automation: String,
    pub is_recovery_attempt: String,
}

impl From<&LoanPayment> for RawLoanPayment {
    fn from(p: &LoanPayment) -> Self {
        RawLoanPayment {
            transaction_id: p.transaction_id.clone(),
            account_id: p.account_id.clone(),
            transaction_date: p.transaction_date.format("%Y-%m-%d").to_string(),
            transaction_time: p.transaction_time.format("%H:%M:%S").to_string(),
            amount: p.amount.to_string(),
            debit_credit: p.debit_credit.clone(),
            status: p.status.clone(),
            description: p.description.clone(),
            immediate_payment: p.immediate_payment.to_string(),
            transaction_cost: p.transaction_cost.to_string(),
            channel: p.channel.clone(),
            loan_id: p.loan_id.clone(),
            customer_id: p.customer_id.clone(),
            loan_type: p.loan_type.as_str().to_string(),
            payment_type: p.payment_type.as_str().to_string(),
            payment_automation: format!("{:?}", p.payment_automation).to_lowercase(),
            is_recovery_attempt: p.is_recovery_attempt.to_string(),
        }
    }
}

// ============================================================================
// INJECTION RATES
// ============================================================================

const MISSING_RATE: f64 = 0.02;
const DUPLICATE_ID_RATE: f64 = 0.01;
const BAD_AMOUNT_RATE: f64 = 0.005;
const BAD_DATE_RATE: f64 = 0.003;
const BAD_TIME_RATE: f64 = 0.01;
const CHANNEL_CASE_RATE: f64 = 0.008;
const STATUS_CASE_RATE: f64 = 0.005;
const CURRENCY_AMOUNT_RATE: f64 = 0.003;
const CURRENCY_COST_RATE: f64 = 0.002;
const WHITESPACE_RATE: f64 = 0.02;
const INVALID_LOAN_RATE: f64 = 0.002;
const BOOLEAN_VARIANT_RATE: f64 = 0.01;
const PADDED_ID_RATE: f64 = 0.005;

const BAD_TIMES: [&str; 4] = ["25:30:00", "12:65:30", "12:30:70", "Invalid Time"];
const CHANNEL_VARIANTS: [&str; 5] = ["ONLINE", "mobile", "Branch Office", "atm", ""];
const STATUS_VARIANTS: [&str; 5] = ["COMPLETED", "failed", "Success", "Pending", ""];
const BOOLEAN_VARIANTS: [&str; 8] = ["TRUE", "FALSE", "Yes", "No", "1", "0", "true", "false"];

/// Distinct row indices, `rate` of the table
fn pick_rows(rng: &mut Sampler, n: usize, rate: f64) -> Vec<usize> {
    let k = (n as f64 * rate) as usize;
    let indices: Vec<usize> = (0..n).collect();
    rng.sample(&indices, k.min(n))
}

pub fn corrupt_payments(payments: &[LoanPayment], rng: &mut Sampler) -> Vec<RawLoanPayment> {
    let mut rows: Vec<RawLoanPayment> = payments.iter().map(RawLoanPayment::from).collect();
    let n = rows.len();
    if n == 0 {
        return rows;
    }

    for i in pick_rows(rng, n, MISSING_RATE) {
        rows[i].transaction_time.clear();
    }
    for i in pick_rows(rng, n, MISSING_RATE) {
        rows[i].description.clear();
    }
    for i in pick_rows(rng, n, MISSING_RATE) {
        rows[i].channel.clear();
    }

    for i in pick_rows(rng, n, DUPLICATE_ID_RATE).into_iter().filter(|i| *i > 0) {
        rows[i].transaction_id = rows[i - 1].transaction_id.clone();
    }

    for i in pick_rows(rng, n, BAD_AMOUNT_RATE) {
        let amount: f64 = rows[i].amount.parse().unwrap_or(0.0);
        rows[i].amount = if rng.chance(0.5) {
            "0".to_string()
        } else {
            (-amount.abs()).to_string()
        };
    }

    for i in pick_rows(rng, n, BAD_DATE_RATE) {
        rows[i].transaction_date = if rng.chance(0.5) { "2030-12-31" } else { "2024-13-45" }.to_string();
    }
    for i in pick_rows(rng, n, BAD_TIME_RATE) {
        rows[i].transaction_time = rng.pick(&BAD_TIMES).to_string();
    }
    for i in pick_rows(rng, n, CHANNEL_CASE_RATE) {
        rows[i].channel = rng.pick(&CHANNEL_VARIANTS).to_string();
    }
    for i in pick_rows(rng, n, STATUS_CASE_RATE) {
        rows[i].status = rng.pick(&STATUS_VARIANTS).to_string();
    }

    for i in pick_rows(rng, n, CURRENCY_AMOUNT_RATE) {
        rows[i].amount = format!("R{}", rows[i].amount);
    }
    for i in pick_rows(rng, n, CURRENCY_COST_RATE) {
        let cost: f64 = rows[i].transaction_cost.parse().unwrap_or(0.0);
        rows[i].transaction_cost = format!("${:.2}", round_to(cost, 2));
    }

    for i in pick_rows(rng, n, WHITESPACE_RATE) {
        rows[i].description = format!("  {}  ", rows[i].description);
    }
    for i in pick_rows(rng, n, INVALID_LOAN_RATE) {
        rows[i].loan_id = format!("INVALID_LOAN_{}", rng.int(1000, 9999));
    }
    for i in pick_rows(rng, n, BOOLEAN_VARIANT_RATE) {
        rows[i].immediate_payment = rng.pick(&BOOLEAN_VARIANTS).to_string();
    }
    for i in pick_rows(rng, n, PADDED_ID_RATE) {
        rows[i].transaction_id = format!(" {} ", rows[i].transaction_id);
    }

    tracing::info!(rows = n, "corrupted copy prepared");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::loan_payments::tests::create_test_payments;

    #[test]
    fn test_corruption_keeps_row_count() {
        let (_, payments) = create_test_payments(2019);
        let mut rng = Sampler::seeded(77);
        let raw = corrupt_payments(&payments, &mut rng);
        assert_eq!(raw.len(), payments.len());
    }

    #[test]
    fn test_injected_values_are_recognisably_dirty() {
        let (_, payments) = create_test_payments(2019);
        if payments.len() < 500 {
            return;
        }
        let mut rng = Sampler::seeded(5);
        let raw = corrupt_payments(&payments, &mut rng);

        let blank_channels = raw.iter().filter(|r| r.channel.is_empty()).count();
        assert!(blank_channels > 0, "some channels blanked");
        let padded = raw.iter().filter(|r| r.description.starts_with("  ")).count();
        assert!(padded > 0, "some descriptions padded");
        let clean = raw
            .iter()
            .zip(payments.iter())
            .filter(|(r, p)| r.transaction_id == p.transaction_id && r.amount == p.amount.to_string())
            .count();
        assert!(clean as f64 > raw.len() as f64 * 0.9, "most rows untouched");
        println!("✅ Error injection PASSED ({} blank channels)", blank_channels);
    }

    #[test]
    fn test_empty_input() {
        let mut rng = Sampler::seeded(1);
        assert!(corrupt_payments(&[], &mut rng).is_empty());
    }
}
