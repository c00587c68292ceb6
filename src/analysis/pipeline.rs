use chrono::Utc;

use crate::analysis::categories::CategoryTagger;
use crate::analysis::frequency::analyze_queries;
use crate::analysis::normalizer::Corpus;
use crate::analysis::sentiment::analyze_sentiment;
use crate::analysis::topics::analyze_topics;
use crate::config::AnalysisConfig;
use crate::models::{AnalysisReport, Dataset};

pub struct AnalysisPipeline {
    tagger: CategoryTagger,
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            tagger: CategoryTagger::new(),
            config,
        }
    }

    /// Normalizes the dataset once, then runs each analysis over the same
    /// read-only corpus. A failing analysis yields an empty section.
    pub fn run(&self, dataset: &Dataset) -> AnalysisReport {
        tracing::info!("Preprocessing {} posts...", dataset.len());
        let corpus = Corpus::build(dataset, self.config.min_text_len);
        tracing::info!("Preprocessing complete: {} posts ready for analysis", corpus.len());

        tracing::info!("Analyzing common queries...");
        let queries = analyze_queries(&corpus, self.config.top_words);

        tracing::info!("Performing topic analysis...");
        let topics = analyze_topics(&corpus, &self.config).unwrap_or_else(|e| {
            tracing::warn!("Topic analysis failed: {}", e);
            Vec::new()
        });

        tracing::info!("Performing sentiment analysis...");
        let sentiment = analyze_sentiment(&corpus);

        tracing::info!("Analyzing USCIS categories...");
        let categories = self.tagger.tag(&corpus);

        let average_comments = if corpus.is_empty() {
            0.0
        } else {
            corpus
                .iter()
                .map(|d| d.post.num_comments as f64)
                .sum::<f64>()
                / corpus.len() as f64
        };

        AnalysisReport {
            generated_at: Utc::now(),
            total_posts: dataset.len(),
            analyzed_posts: corpus.len(),
            fallback_posts: dataset.fallback_count(),
            date_range: dataset.date_range(),
            average_comments,
            queries,
            topics,
            sentiment,
            categories,
        }
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
