//! Domain models for Ledger

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum description length before truncation (in characters)
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Description used when nothing is left after stripping date/amount tokens
pub const DEFAULT_DESCRIPTION: &str = "Bank transaction";

/// Payment method used when none can be detected
pub const DEFAULT_PAYMENT_METHOD: &str = "bank transfer";

/// A transaction extracted from a bank statement
///
/// Records are anonymous: the caller assigns identifiers when storing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub description: String,
    /// Always positive; direction lives in `kind`
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" | "deposit" => Ok(Self::Income),
            "expense" | "debit" | "withdrawal" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed category taxonomy for statement transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Investments")]
    Investments,
    #[serde(rename = "Income")]
    Income,
    #[serde(rename = "Transfer")]
    Transfer,
    /// Catch-all for anything unrecognized
    #[serde(rename = "Others")]
    #[default]
    Others,
}

impl Category {
    /// Display name, as used in prompts, config files and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodAndDining => "Food & Dining",
            Self::Shopping => "Shopping",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Healthcare => "Healthcare",
            Self::BillsAndUtilities => "Bills & Utilities",
            Self::Education => "Education",
            Self::Travel => "Travel",
            Self::Investments => "Investments",
            Self::Income => "Income",
            Self::Transfer => "Transfer",
            Self::Others => "Others",
        }
    }

    /// All categories in taxonomy order
    pub fn all() -> &'static [Category] {
        &[
            Self::FoodAndDining,
            Self::Shopping,
            Self::Transportation,
            Self::Entertainment,
            Self::Healthcare,
            Self::BillsAndUtilities,
            Self::Education,
            Self::Travel,
            Self::Investments,
            Self::Income,
            Self::Transfer,
            Self::Others,
        ]
    }

    /// Lenient lookup: unknown names map to `Others`
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Others)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collapse runs of whitespace, trim, and cap at `MAX_DESCRIPTION_LEN`
/// characters with a trailing ellipsis. Empty input yields `DEFAULT_DESCRIPTION`.
pub fn clean_description(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return DEFAULT_DESCRIPTION.to_string();
    }

    if collapsed.chars().count() > MAX_DESCRIPTION_LEN {
        let truncated: String = collapsed.chars().take(MAX_DESCRIPTION_LEN).collect();
        format!("{}...", truncated)
    } else {
        collapsed
    }
}
