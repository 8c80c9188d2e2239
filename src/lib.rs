pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod narrative;
pub mod observability;
pub mod policy;
pub mod rules;
pub mod storage;

pub use config::Config;
pub use domain::{
    ComplianceIssue, ComplianceResult, ComplianceRule, ComplianceStatus, Priority,
    RestrictedCountry, RestrictedItem, RuleBook, Severity, Shipment,
};
pub use engine::{evaluate, evaluate_batch, BatchRunner};
pub use rules::{RuleSet, ShipmentCheck};
