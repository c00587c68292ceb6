pub mod orchestrator;
pub mod paginator;
pub mod strategy;

pub use orchestrator::CollectionOrchestrator;
pub use paginator::{Fetched, Paginator};
pub use strategy::StrategyRunner;
