// Library interface for headlines modules
// This allows tests and the binaries to import modules

pub mod aggregator;
pub mod cache;
pub mod enrich;
pub mod error;
pub mod ingestion;
pub mod model;
pub mod normalize;
pub mod scheduler;
pub mod server;

pub use aggregator::{Aggregator, CycleLimits};
pub use cache::NewsCache;
pub use model::{CycleReport, NewsItem, RawEntry, Snapshot, PLACEHOLDER_SUMMARY};
pub use scheduler::Scheduler;
