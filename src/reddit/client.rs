use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use crate::config::RedditCredentials;
use crate::error::{Error, Result};
use crate::models::RawPost;
use crate::reddit::rate_limiter::RateLimiter;
use crate::reddit::source::{PostPage, PostSource, SortOrder};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Reddit allows at most 100 items per listing request.
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct RedditClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
    subreddit: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: SubmissionData,
}

#[derive(Deserialize)]
struct SubmissionData {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u32,
    created_utc: f64,
    author: Option<String>,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct Identity {
    name: String,
}

impl RedditClient {
    /// Authenticates with the script-app password grant and returns a client
    /// bound to one subreddit.
    pub async fn connect(credentials: &RedditCredentials, subreddit: &str) -> Result<Self> {
        let user_agent = header::HeaderValue::from_str(&credentials.user_agent)?;

        let auth_client = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .build()?;
        let token = Self::authenticate(&auth_client, credentials).await?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(header::USER_AGENT, user_agent);

        let client = Client::builder().default_headers(headers).build()?;
        tracing::info!("Connected to Reddit API as u/{}", credentials.username);

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: API_BASE.to_string(),
            subreddit: subreddit.to_string(),
        })
    }

    async fn authenticate(client: &Client, credentials: &RedditCredentials) -> Result<String> {
        let response = client
            .post(AUTH_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{} - {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        match (token.access_token, token.error) {
            (Some(access_token), _) => Ok(access_token),
            (None, Some(error)) => Err(Error::Auth(error)),
            (None, None) => Err(Error::Auth("no access token in response".to_string())),
        }
    }

    /// Returns the authenticated account name.
    pub async fn verify(&self) -> Result<String> {
        self.rate_limiter.wait().await;
        let url = format!("{}/api/v1/me", self.base_url);

        let response = self.client.get(&url).send().await?;
        self.rate_limiter.update_from_headers(response.headers()).await;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{} - {}", status, body)));
        }

        let identity: Identity = response.json().await?;
        Ok(identity.name)
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_page(
        &self,
        sort: SortOrder,
        limit: u32,
        after: Option<&str>,
    ) -> Result<PostPage> {
        self.rate_limiter.wait().await;

        let url = format!("{}/r/{}/{}", self.base_url, self.subreddit, sort.path());
        let mut query = vec![
            ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(filter) = sort.time_filter() {
            query.push(("t", filter.as_str().to_string()));
        }
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        tracing::debug!("Fetching: {} {:?}", url, query);
        let response = self.client.get(&url).query(&query).send().await?;
        self.rate_limiter.update_from_headers(response.headers()).await;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                return Err(Error::RateLimited(retry_after));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Auth(format!(
                    "access to r/{} denied ({})",
                    self.subreddit,
                    response.status()
                )));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::RedditApi(format!(
                    "Failed to fetch r/{}/{}: {} - {}",
                    self.subreddit,
                    sort.path(),
                    status,
                    body
                )));
            }
            _ => {}
        }

        let body = response.text().await?;
        parse_listing(&body)
    }

    fn name(&self) -> &str {
        "reddit"
    }
}

fn parse_listing(body: &str) -> Result<PostPage> {
    let listing: Listing = serde_json::from_str(body)?;

    let items = listing
        .data
        .children
        .into_iter()
        .map(|child| into_raw_post(child.data))
        .collect::<Result<Vec<_>>>()?;

    Ok(PostPage {
        items,
        after: listing.data.after,
    })
}

fn into_raw_post(data: SubmissionData) -> Result<RawPost> {
    let created_at = DateTime::<Utc>::from_timestamp(data.created_utc as i64, 0).ok_or_else(
        || Error::ParseError(format!("post {} has invalid created_utc", data.id)),
    )?;

    // Reddit reports removed accounts as "[deleted]".
    let author = data.author.filter(|a| a != "[deleted]");

    Ok(RawPost {
        id: data.id,
        title: data.title,
        body: data.selftext,
        score: data.score,
        num_comments: data.num_comments,
        created_at,
        author,
        url: data.url,
    })
}
