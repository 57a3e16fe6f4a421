//! Prompt library for the AI extraction stage
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/ledger/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This allows users to tune the extraction prompt without modifying the
//! source, while automatically getting new default prompts on upgrade.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Category;

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXTRACT_TRANSACTIONS: &str =
        include_str!("../../../prompts/extract_transactions.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Statement text to a JSON array of transactions
    ExtractTransactions,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractTransactions => "extract_transactions",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::ExtractTransactions]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::ExtractTransactions => defaults::EXTRACT_TRANSACTIONS,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section with template variables replaced
    ///
    /// Falls back to the whole content when there is no `# System` header.
    pub fn render_system(&self, vars: &HashMap<&str, &str>) -> String {
        render(self.system_section().unwrap_or(&self.content), vars)
    }

    /// Render the user section with template variables replaced
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> Result<String> {
        let user = self.user_section().ok_or_else(|| {
            Error::InvalidData(format!(
                "Prompt {} has no # User section",
                self.metadata.id
            ))
        })?;
        Ok(render(user, vars))
    }
}

/// Prompt library for loading and caching prompts
#[derive(Debug)]
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::InvalidData(format!("Prompt {} not cached", id.as_str())))
    }

    /// Load a prompt (checking override first, then default)
    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(path) = self.override_path(id) {
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::InvalidData(format!("Failed to read prompt override: {}", e))
                })?;
                let (metadata, body) = parse_prompt(&content)?;
                tracing::debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
                return Ok(Prompt {
                    metadata,
                    content: body,
                    is_override: true,
                });
            }
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
        })
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }

}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledger").join("prompts").join("overrides"))
}

/// Category taxonomy as listed in the extraction prompt
pub fn category_list() -> String {
    Category::all()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Simple mustache-style replacement: {{var}}
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Next top-level header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nno frontmatter").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n").is_err());
    }

    #[test]
    fn test_extract_section() {
        let content = "# System\nSystem content here.\n\n# User\nUser content here.";

        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(extract_section(content, "# User"), Some("User content here."));
        assert_eq!(extract_section(content, "# Missing"), None);
    }

    #[test]
    fn test_embedded_extraction_prompt() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::ExtractTransactions).unwrap();
        assert_eq!(prompt.metadata.id, "extract_transactions");
        assert!(!prompt.is_override);

        let categories = category_list();
        let mut vars = HashMap::new();
        vars.insert("categories", categories.as_str());
        let system = prompt.render_system(&vars);
        assert!(system.contains("Food & Dining, Shopping"));
        assert!(system.contains("\"paymentMethod\""));
        assert!(system.contains("Return ONLY the JSON array"));
        assert!(!system.contains("{{categories}}"));

        let mut vars = HashMap::new();
        vars.insert("statement", "12/01/2024 Zomato Rs.450.00");
        let user = prompt.render_user(&vars).unwrap();
        assert_eq!(
            user,
            "Extract and categorize all transactions from this bank statement:\n\n12/01/2024 Zomato Rs.450.00"
        );
    }

    #[test]
    fn test_default_prompts_parse() {
        for id in PromptId::all() {
            let (metadata, _) = parse_prompt(id.default_content()).unwrap();
            assert_eq!(metadata.id, id.as_str());
        }
    }

    #[test]
    fn test_override_dir_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("extract_transactions.md")).unwrap();
        write!(
            file,
            "---\nid: extract_transactions\nversion: 7\n---\n\n# System\nCustom.\n\n# User\n{{{{statement}}}}"
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());

        let prompt = lib.get(PromptId::ExtractTransactions).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 7);
        assert_eq!(prompt.system_section(), Some("Custom."));
    }
}
