use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::RuleBook;

/// Errors that can occur while loading a rulebook file.
#[derive(Error, Debug)]
pub enum RulebookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a rulebook from a YAML file.
pub fn load_rulebook(path: impl AsRef<Path>) -> Result<RuleBook, RulebookError> {
    let content = fs::read_to_string(path)?;
    parse_rulebook(&content)
}

/// Parse and validate rulebook YAML.
pub fn parse_rulebook(content: &str) -> Result<RuleBook, RulebookError> {
    let book: RuleBook = serde_yaml::from_str(content)?;
    validate_rulebook(&book)?;
    Ok(book)
}

fn validate_rulebook(book: &RuleBook) -> Result<(), RulebookError> {
    if book.version.trim().is_empty() {
        return Err(RulebookError::Validation(
            "Rulebook version cannot be empty".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for rule in &book.rules {
        if rule.rule_type().trim().is_empty() {
            return Err(RulebookError::Validation(format!(
                "Rule {} has an empty rule_type",
                rule.id
            )));
        }
        if !seen_ids.insert(rule.id) {
            return Err(RulebookError::Validation(format!(
                "Duplicate rule ID: {}",
                rule.id
            )));
        }
    }

    for country in &book.restricted_countries {
        if country.country_code.trim().is_empty() && country.country_name.trim().is_empty() {
            return Err(RulebookError::Validation(
                "Restricted country needs a code or a name".to_string(),
            ));
        }
    }

    Ok(())
}

/// Loads the rulebook from a fixed path.
#[derive(Debug, Clone)]
pub struct RulebookLoader {
    path: PathBuf,
}

impl RulebookLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RulebookLoader { path: path.into() }
    }

    pub fn load(&self) -> Result<RuleBook, RulebookError> {
        load_rulebook(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
