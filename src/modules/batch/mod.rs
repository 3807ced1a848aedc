//! Batch processing
//!
//! Partitioned fan-out of sequence analysis over the worker pool, fan-in
//! in input order, and aggregation of the merged records into rendered
//! views.

pub mod executor;
pub mod processor;
pub mod summary;

pub use executor::BatchExecutor;
pub use processor::BatchProcessor;
pub use summary::{AggregateSummary, SummaryAggregator};
