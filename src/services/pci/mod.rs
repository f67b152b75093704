pub mod export;
pub mod processor;
pub mod reader;
pub mod stats;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

pub use processor::BatchProcessor;
