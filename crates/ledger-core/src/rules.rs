//! Keyword rules for the offline statement parser
//!
//! Category, payment-method and income-marker tables are immutable
//! configuration owned by the parser, not module state.
//!
//! ## Configuration Resolution
//!
//! Rules are loaded with a two-layer resolution:
//! 1. Explicit path (`--rules` / `LEDGER_RULES_PATH`), or the override in the
//!    data dir (~/.local/share/ledger/config/rules.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, DEFAULT_PAYMENT_METHOD};

/// Embedded default rules (compiled into binary)
const DEFAULT_RULES: &str = include_str!("../../../config/rules.toml");

/// Where a rule set was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for RulesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Keywords that map a description to a category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Keywords that map a description to a payment method
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethodRule {
    pub method: String,
    pub keywords: Vec<String>,
}

/// Ordered keyword tables used by the heuristic parser
#[derive(Debug, Clone)]
pub struct KeywordRules {
    pub categories: Vec<CategoryRule>,
    pub payment_methods: Vec<PaymentMethodRule>,
    /// Substrings of the lowercased line that mark income
    pub income_markers: Vec<String>,
    /// Standalone words of the lowercased line that mark income
    pub income_words: Vec<String>,
    pub source: RulesSource,
}

impl KeywordRules {
    /// Load rules: `LEDGER_RULES_PATH`, then the data dir override, then embedded defaults
    pub fn load() -> Result<Self> {
        let explicit = std::env::var("LEDGER_RULES_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        match explicit {
            Some(path) => Self::from_path(&path),
            None => match default_rules_path() {
                Some(path) if path.exists() => Self::from_path(&path),
                _ => Self::embedded(),
            },
        }
    }

    /// Load rules from a specific file (the file must exist)
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read rules {}: {}", path.display(), e))
        })?;
        let mut rules = parse_rules(&content)?;
        rules.source = RulesSource::File(path.to_path_buf());
        debug!(path = %path.display(), "Loaded keyword rules override");
        Ok(rules)
    }

    /// The rules compiled into the binary
    pub fn embedded() -> Result<Self> {
        parse_rules(DEFAULT_RULES)
    }

    /// First category whose keyword occurs in the description, else `Others`
    pub fn categorize(&self, description: &str) -> Category {
        let lower = description.to_lowercase();
        self.categories
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(Category::Others)
    }

    /// First payment method whose keyword occurs in the description, else "bank transfer"
    pub fn payment_method(&self, description: &str) -> String {
        let lower = description.to_lowercase();
        self.payment_methods
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|rule| rule.method.clone())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string())
    }

    /// Whether a raw statement line reads as a credit
    pub fn is_income(&self, line: &str) -> bool {
        let lower = line.to_lowercase();

        if self.income_markers.iter().any(|m| lower.contains(m.as_str())) {
            return true;
        }

        lower
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .any(|word| self.income_words.iter().any(|w| w == word))
    }
}

/// Default rules override path
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledger").join("config").join("rules.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawRules {
    income: Option<RawIncome>,
    #[serde(default)]
    categories: Vec<RawCategoryRule>,
    #[serde(default)]
    payment_methods: Vec<RawPaymentMethodRule>,
}

#[derive(Debug, Deserialize)]
struct RawIncome {
    #[serde(default)]
    markers: Vec<String>,
    #[serde(default)]
    words: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategoryRule {
    name: String,
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPaymentMethodRule {
    method: String,
    keywords: Vec<String>,
}

/// Lowercase keywords and drop blanks. Markers keep inner/trailing spaces ("cr ").
fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .collect()
}

/// Parse rules from TOML content
fn parse_rules(content: &str) -> Result<KeywordRules> {
    let raw: RawRules = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))?;

    let mut categories = Vec::with_capacity(raw.categories.len());
    for rule in raw.categories {
        let category: Category = rule.name.parse().map_err(Error::Config)?;
        categories.push(CategoryRule {
            category,
            keywords: normalize_keywords(rule.keywords),
        });
    }

    let mut payment_methods = Vec::with_capacity(raw.payment_methods.len());
    for rule in raw.payment_methods {
        let method = rule.method.trim().to_string();
        if method.is_empty() {
            return Err(Error::Config("Payment method name cannot be empty".into()));
        }
        payment_methods.push(PaymentMethodRule {
            method,
            keywords: normalize_keywords(rule.keywords),
        });
    }

    let (income_markers, income_words) = match raw.income {
        Some(income) => (
            normalize_keywords(income.markers),
            normalize_keywords(income.words)
                .into_iter()
                .map(|w| w.trim().to_string())
                .collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(KeywordRules {
        categories,
        payment_methods,
        income_markers,
        income_words,
        source: RulesSource::Embedded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_embedded_rules() {
        let rules = KeywordRules::embedded().unwrap();
        assert_eq!(rules.source, RulesSource::Embedded);
        assert_eq!(rules.categories.len(), 8);
        assert_eq!(rules.categories[0].category, Category::FoodAndDining);
        assert_eq!(rules.payment_methods.len(), 4);
        assert!(rules.income_markers.contains(&"cr ".to_string()));
        assert_eq!(rules.income_words, vec!["cr".to_string()]);
    }

    #[test]
    fn test_categorize_first_match_wins() {
        let rules = KeywordRules::embedded().unwrap();
        assert_eq!(rules.categorize("ZOMATO order"), Category::FoodAndDining);
        assert_eq!(rules.categorize("Netflix subscription"), Category::Entertainment);
        assert_eq!(rules.categorize("Salary credited"), Category::Income);
        // "upi" appears in Transfer, after Food & Dining's "swiggy"
        assert_eq!(rules.categorize("UPI swiggy"), Category::FoodAndDining);
        assert_eq!(rules.categorize("UPI to friend"), Category::Transfer);
        assert_eq!(rules.categorize("Something unknown"), Category::Others);
    }

    #[test]
    fn test_payment_method_detection() {
        let rules = KeywordRules::embedded().unwrap();
        assert_eq!(rules.payment_method("UPI/1234/merchant"), "upi");
        assert_eq!(rules.payment_method("Debit card purchase"), "card");
        assert_eq!(rules.payment_method("ATM withdrawal"), "atm");
        assert_eq!(rules.payment_method("Cheque deposit"), "cheque");
        assert_eq!(rules.payment_method("Check 1042"), "cheque");
        assert_eq!(rules.payment_method("NEFT to landlord"), DEFAULT_PAYMENT_METHOD);
    }

    #[test]
    fn test_is_income_markers() {
        let rules = KeywordRules::embedded().unwrap();
        assert!(rules.is_income("Salary for March"));
        assert!(rules.is_income("Cash DEPOSIT at branch"));
        assert!(rules.is_income("Interest credited"));
        assert!(rules.is_income("NEFT 500.00 Cr"));
        assert!(rules.is_income("NEFT Cr 500.00"));
        assert!(rules.is_income("IMPS/CR/refund"));
        assert!(!rules.is_income("Zomato order Rs.450.00 Dr"));
        // "cr" inside a longer word is not a marker
        assert!(!rules.is_income("Crossword books purchase"));
    }

    #[test]
    fn test_unknown_category_is_config_error() {
        let toml = r#"
[[categories]]
name = "Groceries"
keywords = ["bigbasket"]
"#;
        let err = parse_rules(toml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let toml = r#"
[[categories]]
name = "travel"
keywords = ["IRCTC", "  "]
"#;
        let rules = parse_rules(toml).unwrap();
        assert_eq!(rules.categories[0].category, Category::Travel);
        assert_eq!(rules.categories[0].keywords, vec!["irctc".to_string()]);
        assert_eq!(rules.categorize("IRCTC ticket"), Category::Travel);
    }

    #[test]
    fn test_from_path_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[income]
markers = ["refund"]

[[categories]]
name = "Education"
keywords = ["tuition"]

[[payment_methods]]
method = "netbanking"
keywords = ["neft", "imps"]
"#
        )
        .unwrap();

        let rules = KeywordRules::from_path(file.path()).unwrap();
        assert_eq!(rules.source, RulesSource::File(file.path().to_path_buf()));
        assert_eq!(rules.categorize("Tuition fee"), Category::Education);
        assert_eq!(rules.categorize("Zomato"), Category::Others);
        assert_eq!(rules.payment_method("NEFT transfer"), "netbanking");
        assert!(rules.is_income("Refund from store"));
        assert!(!rules.is_income("Salary"));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = KeywordRules::from_path(Path::new("/nonexistent/rules.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
