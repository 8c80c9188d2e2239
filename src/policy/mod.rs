//! File-backed rulebook loading and hot reload.

pub mod hot_reload;
pub mod loader;

pub use hot_reload::RulebookWatcher;
pub use loader::{load_rulebook, parse_rulebook, RulebookError, RulebookLoader};
