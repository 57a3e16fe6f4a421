//! Validation of AI-produced records
//!
//! Model output is untrusted: dates come in any format, amounts arrive as
//! strings or with a sign, categories drift outside the taxonomy. Every AI
//! record passes through [`finalize`] so both extraction paths honor the same
//! record invariants.

use serde_json::Value;

use crate::ai::RawTransaction;
use crate::models::{clean_description, Category, Transaction, TransactionType, DEFAULT_PAYMENT_METHOD};
use crate::statement::normalize_date;

/// Repair a raw record into a [`Transaction`], or reject it
///
/// - date: must normalize to a real calendar date, else rejected
/// - amount: number or numeric string; sign dropped; zero/NaN rejected
/// - type: credit/deposit/income vs debit/withdrawal/expense, else expense
/// - category: unknown names become `Others`
/// - description/paymentMethod: cleaned, with defaults for empty values
pub fn finalize(raw: RawTransaction) -> Option<Transaction> {
    let date = raw.date.as_deref().and_then(normalize_date)?;
    let amount = raw.amount.as_ref().and_then(amount_value)?;

    let kind = raw
        .kind
        .as_deref()
        .and_then(|k| k.parse().ok())
        .unwrap_or(TransactionType::Expense);

    let category = raw
        .category
        .as_deref()
        .map(Category::from_name)
        .unwrap_or(Category::Others);

    let description = clean_description(raw.description.as_deref().unwrap_or(""));

    let payment_method = raw
        .payment_method
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

    Some(Transaction {
        date,
        description,
        amount,
        kind,
        category,
        payment_method: Some(payment_method),
    })
}

/// Positive magnitude of a JSON number or numeric string
fn amount_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
            .replace(',', "")
            .parse()
            .ok()?,
        _ => return None,
    };

    let magnitude = n.abs();
    (magnitude.is_finite() && magnitude > 0.0).then_some(magnitude)
}
