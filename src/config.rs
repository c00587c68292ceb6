use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub subreddit: String,
    pub database_path: String,
    pub collect_limit: u32,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_posts: usize,
    pub fallback_limit: u32,
    pub num_topics: usize,
    pub top_words: usize,
    pub min_df: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let subreddit = env::var("SUBREDDIT").unwrap_or_else(|_| "USCIS".to_string());

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "uscis_posts.db".to_string());

        let collect_limit = parse_var("COLLECT_LIMIT")?.unwrap_or(1000);

        let start_date = env::var("ANALYSIS_START_DATE").ok().filter(|v| !v.is_empty());
        let end_date = env::var("ANALYSIS_END_DATE").ok().filter(|v| !v.is_empty());

        let min_posts = parse_var("MIN_POSTS")?.unwrap_or(20);
        let fallback_limit = parse_var("FALLBACK_LIMIT")?.unwrap_or(200);

        let defaults = AnalysisConfig::default();
        let num_topics = parse_var("NUM_TOPICS")?.unwrap_or(defaults.num_topics);
        let top_words = parse_var("TOP_WORDS")?.unwrap_or(defaults.top_words);
        let min_df = parse_var("MIN_DF")?.unwrap_or(defaults.min_df);

        Ok(Self {
            subreddit,
            database_path,
            collect_limit,
            start_date,
            end_date,
            min_posts,
            fallback_limit,
            num_topics,
            top_words,
            min_df,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", name, v))),
        Err(_) => Ok(None),
    }
}

/// Script-app credentials for the Reddit OAuth password grant.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            env::var(name)
                .map_err(|_| Error::Config(format!("{} environment variable not set", name)))
        };

        let username = required("REDDIT_USERNAME")?;
        let user_agent = env::var("REDDIT_USER_AGENT")
            .unwrap_or_else(|_| format!("uscisanalyzer/0.1 (by u/{})", username));

        Ok(Self {
            client_id: required("REDDIT_CLIENT_ID")?,
            client_secret: required("REDDIT_CLIENT_SECRET")?,
            username,
            password: required("REDDIT_PASSWORD")?,
            user_agent,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Accepted posts below this count trigger the fallback strategy.
    pub min_posts: usize,
    pub fallback_limit: u32,
    pub item_delay: Duration,
    pub fallback_item_delay: Duration,
    pub show_progress: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            min_posts: 20,
            fallback_limit: 200,
            item_delay: Duration::from_millis(100),
            fallback_item_delay: Duration::from_millis(50),
            show_progress: true,
        }
    }
}

impl From<&Config> for CollectorConfig {
    fn from(config: &Config) -> Self {
        Self {
            min_posts: config.min_posts,
            fallback_limit: config.fallback_limit,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Documents whose clean text is this short or shorter are dropped.
    pub min_text_len: usize,
    pub top_words: usize,
    pub num_topics: usize,
    pub max_features: usize,
    pub min_df: usize,
    pub lda_iterations: usize,
    pub seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_text_len: 10,
            top_words: 20,
            num_topics: 5,
            max_features: 100,
            min_df: 5,
            lda_iterations: 10,
            seed: 42,
        }
    }
}

impl From<&Config> for AnalysisConfig {
    fn from(config: &Config) -> Self {
        Self {
            num_topics: config.num_topics,
            top_words: config.top_words,
            min_df: config.min_df,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            subreddit: "USCIS".to_string(),
            database_path: ":memory:".to_string(),
            collect_limit: 300,
            start_date: None,
            end_date: None,
            min_posts: 7,
            fallback_limit: 40,
            num_topics: 3,
            top_words: 12,
            min_df: 2,
        }
    }

    #[test]
    fn test_collector_config_from_config() {
        let collector = CollectorConfig::from(&config());
        assert_eq!(collector.min_posts, 7);
        assert_eq!(collector.fallback_limit, 40);
        assert_eq!(collector.item_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_analysis_config_from_config() {
        let analysis = AnalysisConfig::from(&config());
        assert_eq!(analysis.num_topics, 3);
        assert_eq!(analysis.top_words, 12);
        assert_eq!(analysis.min_df, 2);
        assert_eq!(analysis.max_features, 100);
        assert_eq!(analysis.seed, 42);
    }

    #[test]
    fn test_parse_var_rejects_non_numbers() {
        env::set_var("USCISANALYZER_TEST_LIMIT", "lots");
        let parsed: Result<Option<u32>> = parse_var("USCISANALYZER_TEST_LIMIT");
        assert!(matches!(parsed, Err(Error::Config(_))));

        env::set_var("USCISANALYZER_TEST_LIMIT", " 25 ");
        assert_eq!(parse_var::<u32>("USCISANALYZER_TEST_LIMIT").unwrap(), Some(25));
        env::remove_var("USCISANALYZER_TEST_LIMIT");
    }
}
