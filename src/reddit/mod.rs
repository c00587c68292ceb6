pub mod client;
pub mod rate_limiter;
pub mod source;

pub use client::RedditClient;
pub use rate_limiter::RateLimiter;
pub use source::{PostPage, PostSource, SortOrder, TimeFilter};
