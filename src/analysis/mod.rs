pub mod categories;
pub mod frequency;
pub mod normalizer;
pub mod pipeline;
pub mod sentiment;
pub mod topics;

pub use categories::CategoryTagger;
pub use frequency::analyze_queries;
pub use normalizer::{normalize, Corpus, Document};
pub use pipeline::AnalysisPipeline;
pub use sentiment::{analyze_sentiment, classify};
pub use topics::analyze_topics;
