pub mod issue;
pub mod numeric;
pub mod restriction;
pub mod result;
pub mod rule;
pub mod rulebook;
pub mod shipment;
pub mod status;

pub use issue::{ComplianceIssue, Priority};
pub use restriction::{RestrictedCountry, RestrictedItem, Severity};
pub use result::{ComplianceResult, Issues, COMPLIANT_DETAILS, EVALUATION_ERROR};
pub use rule::{ComplianceRule, RuleConditions, RuleDraft};
pub use rulebook::RuleBook;
pub use shipment::{CountryCode, Shipment, ShipmentError};
pub use status::ComplianceStatus;
