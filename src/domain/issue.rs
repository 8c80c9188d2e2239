use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority attached to a compliance issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
        }
    }
}

/// One detected compliance problem.
///
/// Produced only by checks during evaluation and returned to the caller
/// as part of a `ComplianceResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Label of the rule or restriction that produced the issue
    pub rule_name: String,

    /// Human-readable description
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl ComplianceIssue {
    /// Create an issue without priority or provenance.
    pub fn new(rule_name: impl Into<String>, description: impl Into<String>) -> Self {
        ComplianceIssue {
            rule_name: rule_name.into(),
            description: description.into(),
            reason: None,
            source_link: None,
            last_verified: None,
            priority: None,
        }
    }

    /// Create a HIGH priority issue.
    pub fn high(rule_name: impl Into<String>, description: impl Into<String>) -> Self {
        ComplianceIssue::new(rule_name, description).with_priority(Priority::High)
    }

    /// Create a MEDIUM priority issue.
    pub fn medium(rule_name: impl Into<String>, description: impl Into<String>) -> Self {
        ComplianceIssue::new(rule_name, description).with_priority(Priority::Medium)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_source(mut self, source_link: Option<String>, last_verified: Option<String>) -> Self {
        self.source_link = source_link;
        self.last_verified = last_verified;
        self
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        self.priority == Some(Priority::High)
    }
}
