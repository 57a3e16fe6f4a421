//! Offline statement parser
//!
//! Deterministic line-by-line extraction used when no AI backend is
//! configured or when the AI stage fails. Each line that carries a date
//! token and at least one amount token becomes one transaction; every other
//! line is skipped. Parsing never fails: worst case the result is empty.
//!
//! When a line holds several amount tokens the **last** one is taken as the
//! transaction amount. This suits layouts where the running balance precedes
//! the amount; for layouts that print the balance last it picks the balance.

mod amount;
mod date;

pub use amount::parse_amount;
pub use date::normalize_date;

use std::ops::Range;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::models::{clean_description, Transaction, TransactionType};
use crate::rules::KeywordRules;

/// Lines shorter than this (in characters, after trimming) are headers or noise
pub const MIN_LINE_LEN: usize = 10;

/// Regex/keyword statement parser
#[derive(Debug, Clone)]
pub struct StatementParser {
    date_re: Regex,
    amount_re: Regex,
    rules: Arc<KeywordRules>,
}

impl StatementParser {
    /// Create a parser that classifies with the given rules
    pub fn new(rules: KeywordRules) -> Result<Self> {
        Ok(Self {
            date_re: Regex::new(date::DATE_PATTERN)?,
            amount_re: Regex::new(amount::AMOUNT_PATTERN)?,
            rules: Arc::new(rules),
        })
    }

    /// Create a parser with the embedded default rules
    pub fn with_default_rules() -> Result<Self> {
        Self::new(KeywordRules::embedded()?)
    }

    /// The keyword rules this parser classifies with
    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    /// Parse a whole statement, one candidate transaction per line
    pub fn parse(&self, text: &str) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        let mut lines = 0usize;

        for line in text.lines() {
            lines += 1;
            if let Some(tx) = self.parse_line(line) {
                transactions.push(tx);
            }
        }

        debug!(
            lines,
            parsed = transactions.len(),
            skipped = lines - transactions.len(),
            "Heuristic statement parse complete"
        );

        transactions
    }

    /// Parse a single statement line
    ///
    /// Returns `None` for short lines, lines without a date or amount token,
    /// lines whose date is not a real calendar date, and non-positive amounts.
    pub fn parse_line(&self, line: &str) -> Option<Transaction> {
        let line = line.trim();
        if line.chars().count() < MIN_LINE_LEN {
            return None;
        }

        let date_match = self.date_re.find(line)?;

        let amount_tokens: Vec<(Range<usize>, &str)> = self
            .amount_re
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.get(1).or_else(|| caps.get(2))?;
                Some((whole.range(), number.as_str()))
            })
            .collect();
        let (_, amount_text) = amount_tokens.last()?;

        let date = normalize_date(date_match.as_str())?;
        let amount = parse_amount(amount_text)?;

        let kind = if self.rules.is_income(line) {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };

        let mut spans: Vec<Range<usize>> = amount_tokens.into_iter().map(|(r, _)| r).collect();
        spans.push(date_match.range());
        let description = clean_description(&strip_spans(line, spans));

        let category = self.rules.categorize(&description);
        let payment_method = self.rules.payment_method(&description);

        Some(Transaction {
            date,
            description,
            amount,
            kind,
            category,
            payment_method: Some(payment_method),
        })
    }
}

/// Replace each byte span with a space; overlapping spans are merged.
fn strip_spans(line: &str, mut spans: Vec<Range<usize>>) -> String {
    spans.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for span in spans {
        if span.end <= cursor {
            continue;
        }
        if span.start >= cursor {
            out.push_str(&line[cursor..span.start]);
            out.push(' ');
        }
        cursor = span.end;
    }
    out.push_str(&line[cursor..]);
    out
}
