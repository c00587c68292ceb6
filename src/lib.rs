pub mod config;
pub mod error;
pub mod models;
pub mod reddit;
pub mod collector;
pub mod taxonomy;
pub mod analysis;
pub mod storage;

pub use config::{AnalysisConfig, CollectorConfig, Config, RedditCredentials};
pub use error::{Error, Result};
pub use reddit::{PostSource, RedditClient};
pub use collector::CollectionOrchestrator;
pub use analysis::AnalysisPipeline;
pub use storage::Storage;
