pub mod file;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{match_products, DocumentRecord, ResearchRecord, RuleStore};
