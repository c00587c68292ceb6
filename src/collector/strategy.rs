use crate::collector::paginator::{Fetched, Paginator};
use crate::models::RetrievalStrategy;
use crate::reddit::source::{PostSource, SortOrder, TimeFilter};

impl RetrievalStrategy {
    pub fn sort_order(&self) -> SortOrder {
        match self {
            RetrievalStrategy::Recent | RetrievalStrategy::Fallback => SortOrder::New,
            RetrievalStrategy::Engaged => SortOrder::Hot,
            RetrievalStrategy::HistoricalTop => SortOrder::Top(TimeFilter::Year),
        }
    }
}

/// Runs one named strategy against the source.
pub struct StrategyRunner<'a> {
    source: &'a dyn PostSource,
}

impl<'a> StrategyRunner<'a> {
    pub fn new(source: &'a dyn PostSource) -> Self {
        Self { source }
    }

    pub async fn run(&self, strategy: RetrievalStrategy, limit: u32) -> Fetched {
        if limit == 0 {
            tracing::debug!("Skipping {} strategy: nothing requested", strategy);
            return Fetched::default();
        }

        tracing::info!("Collecting from {} posts (limit {})...", strategy, limit);
        let fetched = Paginator::new(self.source)
            .fetch_limited(strategy.sort_order(), limit)
            .await;
        tracing::debug!(
            "{} strategy returned {} items",
            strategy,
            fetched.items.len()
        );
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_sort_orders() {
        assert_eq!(RetrievalStrategy::Recent.sort_order(), SortOrder::New);
        assert_eq!(RetrievalStrategy::Engaged.sort_order(), SortOrder::Hot);
        assert_eq!(
            RetrievalStrategy::HistoricalTop.sort_order(),
            SortOrder::Top(TimeFilter::Year)
        );
        assert_eq!(RetrievalStrategy::Fallback.sort_order(), SortOrder::New);
    }
}
