//! Rules command implementation

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use ledger_core::KeywordRules;

use super::load_rules;

pub fn cmd_rules(rules_path: Option<&Path>) -> Result<()> {
    let rules = load_rules(rules_path)?;
    print!("{}", format_rules(&rules));
    Ok(())
}

/// Human-readable listing of a rule set
pub fn format_rules(rules: &KeywordRules) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📋 Keyword rules ({})", rules.source);
    let _ = writeln!(out);

    let _ = writeln!(out, "Categories (first match wins):");
    for rule in &rules.categories {
        let _ = writeln!(
            out,
            "  {:<20} {}",
            rule.category.as_str(),
            rule.keywords.join(", ")
        );
    }
    let _ = writeln!(out, "  {:<20} (default)", "Others");

    let _ = writeln!(out);
    let _ = writeln!(out, "Payment methods:");
    for rule in &rules.payment_methods {
        let _ = writeln!(out, "  {:<20} {}", rule.method, rule.keywords.join(", "));
    }
    let _ = writeln!(out, "  {:<20} (default)", "bank transfer");

    let _ = writeln!(out);
    let markers: Vec<String> = rules
        .income_markers
        .iter()
        .map(|m| format!("{:?}", m))
        .chain(rules.income_words.iter().map(|w| format!("word {:?}", w)))
        .collect();
    let _ = writeln!(out, "Income markers: {}", markers.join(", "));

    out
}
