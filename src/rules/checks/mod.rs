mod product;
mod restricted_country;
mod restricted_item;
mod value_threshold;
mod weight_threshold;

pub use product::ProductRuleCheck;
pub use restricted_country::RestrictedCountryCheck;
pub use restricted_item::RestrictedItemCheck;
pub use value_threshold::ValueThresholdCheck;
pub use weight_threshold::WeightThresholdCheck;
