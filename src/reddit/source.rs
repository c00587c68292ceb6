use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFilter {
    Year,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Year => "year",
        }
    }
}

/// Listing order understood by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    New,
    Hot,
    Top(TimeFilter),
}

impl SortOrder {
    pub fn path(&self) -> &'static str {
        match self {
            SortOrder::New => "new",
            SortOrder::Hot => "hot",
            SortOrder::Top(_) => "top",
        }
    }

    pub fn time_filter(&self) -> Option<TimeFilter> {
        match self {
            SortOrder::Top(filter) => Some(*filter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub items: Vec<RawPost>,
    /// Cursor for the next page, `None` on the last page.
    pub after: Option<String>,
}

/// A paginated forum listing: "give me up to `limit` items sorted by `sort`".
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_page(
        &self,
        sort: SortOrder,
        limit: u32,
        after: Option<&str>,
    ) -> Result<PostPage>;

    fn name(&self) -> &str;
}
