//! Core runtime pieces shared by every component: the bounded worker
//! pool, the injected logger and the processor configuration.

pub mod config;
pub mod logging;
pub mod parallel;

pub use config::{ConfigError, ProcessorConfig, RenderConfig, ScoringConfig};
pub use logging::Logger;
pub use parallel::{partition, Batch, PartitionError, PoolError, UnitPanic, WorkerPool};
