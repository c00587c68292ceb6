use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::sleep;

use crate::collector::paginator::Fetched;
use crate::collector::strategy::StrategyRunner;
use crate::config::CollectorConfig;
use crate::models::{Dataset, DateWindow, Post, RetrievalStrategy};
use crate::reddit::source::PostSource;

pub struct CollectionOrchestrator {
    source: Arc<dyn PostSource>,
    config: CollectorConfig,
}

/// Accepted posts and the identifiers already claimed this run.
#[derive(Default)]
struct Collected {
    posts: Vec<Post>,
    seen: HashSet<String>,
}

impl CollectionOrchestrator {
    pub fn new(source: impl PostSource + 'static, config: CollectorConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }

    /// Runs every primary strategy, then the fallback if too few posts were
    /// admitted. Source failures are logged and never abort the collection.
    pub async fn collect(&self, target_count: u32, window: &DateWindow) -> Dataset {
        tracing::info!("Collecting posts from {}", window);

        let runner = StrategyRunner::new(self.source.as_ref());
        let per_strategy = target_count / RetrievalStrategy::PRIMARY.len() as u32;
        let mut collected = Collected::default();

        for strategy in RetrievalStrategy::PRIMARY {
            let fetched = runner.run(strategy, per_strategy).await;
            let accepted = self
                .admit(&mut collected, strategy, fetched, Some(window), self.config.item_delay)
                .await;
            tracing::info!("Collected {} posts from {}", accepted, strategy);
        }

        tracing::info!(
            "Finished primary strategies. Total collected: {}",
            collected.posts.len()
        );

        if collected.posts.len() < self.config.min_posts {
            tracing::warn!(
                "Only collected {} posts (minimum {}); the window {} may be too narrow. \
                 Collecting recent posts without date filtering...",
                collected.posts.len(),
                self.config.min_posts,
                window
            );
            let fetched = runner
                .run(RetrievalStrategy::Fallback, self.config.fallback_limit)
                .await;
            let accepted = self
                .admit(
                    &mut collected,
                    RetrievalStrategy::Fallback,
                    fetched,
                    None,
                    self.config.fallback_item_delay,
                )
                .await;
            tracing::info!("Collected additional {} recent posts", accepted);
        }

        let dataset = Dataset::from_posts(collected.posts);
        tracing::info!("Final dataset: {} unique posts", dataset.len());
        dataset
    }

    /// Deduplicates and window-filters one strategy's items. `window: None`
    /// admits everything not seen before.
    async fn admit(
        &self,
        collected: &mut Collected,
        strategy: RetrievalStrategy,
        fetched: Fetched,
        window: Option<&DateWindow>,
        delay: Duration,
    ) -> usize {
        let pb = self.progress_bar(strategy);
        let mut accepted = 0;

        for raw in fetched.items {
            if collected.seen.contains(&raw.id) {
                continue;
            }

            if window.map_or(true, |w| w.contains(raw.created_at)) {
                collected.seen.insert(raw.id.clone());
                collected.posts.push(Post::from_raw(raw, strategy));
                accepted += 1;
                pb.inc(1);

                if collected.posts.len() % 50 == 0 {
                    tracing::debug!("Collected {} posts so far...", collected.posts.len());
                }
            }

            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        pb.finish_and_clear();

        if let Some(e) = fetched.error {
            tracing::warn!(
                "Error collecting from {} (source failure: {}): {}; keeping {} posts",
                strategy,
                e.is_source_failure(),
                e,
                accepted
            );
        }

        accepted
    }

    fn progress_bar(&self, strategy: RetrievalStrategy) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} posts {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("from {}", strategy));
        pb
    }
}
