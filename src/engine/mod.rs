pub mod batch;
pub mod evaluator;

pub use batch::{evaluate_batch, BatchRunner, DEFAULT_CHUNK_SIZE};
pub use evaluator::evaluate;
