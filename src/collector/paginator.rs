use crate::error::Error;
use crate::models::RawPost;
use crate::reddit::client::MAX_PAGE_SIZE;
use crate::reddit::source::{PostSource, SortOrder};

/// Items gathered before the listing ended or the source failed.
#[derive(Debug, Default)]
pub struct Fetched {
    pub items: Vec<RawPost>,
    pub error: Option<Error>,
}

pub struct Paginator<'a> {
    source: &'a dyn PostSource,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn PostSource) -> Self {
        Self { source }
    }

    /// Walks `after` cursors until `max_items` are gathered or the listing
    /// ends. An error stops the walk but keeps the pages already read.
    pub async fn fetch_limited(&self, sort: SortOrder, max_items: u32) -> Fetched {
        let mut fetched = Fetched::default();
        let mut after: Option<String> = None;
        let max_items = max_items as usize;

        while fetched.items.len() < max_items {
            let page_size = (max_items - fetched.items.len()).min(MAX_PAGE_SIZE as usize) as u32;

            tracing::debug!(
                "Requesting {} {} items from {} (after: {:?})",
                page_size,
                sort.path(),
                self.source.name(),
                after
            );

            let page = match self.source.fetch_page(sort, page_size, after.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    fetched.error = Some(e);
                    break;
                }
            };

            let items_count = page.items.len();
            fetched.items.extend(page.items);

            match page.after {
                Some(next) if items_count > 0 => after = Some(next),
                _ => break,
            }
        }

        fetched.items.truncate(max_items);
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::reddit::source::PostPage;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Serves `total` numbered posts in pages, failing on request `fail_on`.
    struct NumberedSource {
        total: usize,
        fail_on: Option<usize>,
        calls: Mutex<Vec<(u32, Option<String>)>>,
    }

    impl NumberedSource {
        fn new(total: usize, fail_on: Option<usize>) -> Self {
            Self {
                total,
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PostSource for NumberedSource {
        async fn fetch_page(
            &self,
            _sort: SortOrder,
            limit: u32,
            after: Option<&str>,
        ) -> Result<PostPage> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((limit, after.map(str::to_string)));
                calls.len()
            };
            if self.fail_on == Some(call) {
                return Err(Error::RedditApi("503 Service Unavailable".to_string()));
            }

            let start = after.map(|a| a.parse::<usize>().unwrap()).unwrap_or(0);
            let end = (start + limit as usize).min(self.total);
            let items = (start..end)
                .map(|i| RawPost {
                    id: format!("p{}", i),
                    title: format!("post {}", i),
                    body: String::new(),
                    score: 0,
                    num_comments: 0,
                    created_at: Utc::now(),
                    author: None,
                    url: String::new(),
                })
                .collect();
            let after = (end < self.total).then(|| end.to_string());
            Ok(PostPage { items, after })
        }

        fn name(&self) -> &str {
            "numbered"
        }
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_request() {
        let source = NumberedSource::new(10, None);
        let fetched = Paginator::new(&source).fetch_limited(SortOrder::New, 0).await;

        assert!(fetched.items.is_empty());
        assert!(fetched.error.is_none());
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follows_cursor_across_pages() {
        let source = NumberedSource::new(500, None);
        let fetched = Paginator::new(&source).fetch_limited(SortOrder::Hot, 250).await;

        assert_eq!(fetched.items.len(), 250);
        assert_eq!(fetched.items[249].id, "p249");
        let calls = source.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (100, None),
                (100, Some("100".to_string())),
                (50, Some("200".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_when_listing_ends() {
        let source = NumberedSource::new(30, None);
        let fetched = Paginator::new(&source).fetch_limited(SortOrder::New, 200).await;

        assert_eq!(fetched.items.len(), 30);
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_keeps_earlier_pages() {
        let source = NumberedSource::new(500, Some(2));
        let fetched = Paginator::new(&source).fetch_limited(SortOrder::New, 300).await;

        assert_eq!(fetched.items.len(), 100);
        assert!(matches!(fetched.error, Some(Error::RedditApi(_))));
    }
}
