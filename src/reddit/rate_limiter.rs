use reqwest::header::HeaderMap;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

/// Reddit allows 100 OAuth requests per minute; stay comfortably under it.
const SOFT_LIMIT_PER_MINUTE: u32 = 60;

pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

struct RateLimitState {
    remaining: f64,
    reset_at: Option<Instant>,
    requests_this_minute: u32,
    minute_start: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                remaining: 600.0,
                reset_at: None,
                requests_this_minute: 0,
                minute_start: Instant::now(),
            }),
        }
    }

    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        if state.remaining < 1.0 {
            if let Some(reset_at) = state.reset_at {
                let now = Instant::now();
                if reset_at > now {
                    let wait_duration = reset_at - now;
                    drop(state);
                    tracing::info!("Rate limited, waiting {:?}", wait_duration);
                    sleep(wait_duration).await;
                    state = self.state.lock().await;
                }
            }
        }

        let minute_elapsed = state.minute_start.elapsed();
        if minute_elapsed < Duration::from_secs(60) {
            if state.requests_this_minute >= SOFT_LIMIT_PER_MINUTE {
                let wait_time = Duration::from_secs(60) - minute_elapsed;
                drop(state);
                tracing::debug!("Soft rate limiting, waiting {:?}", wait_time);
                sleep(wait_time).await;
                state = self.state.lock().await;
                state.requests_this_minute = 0;
                state.minute_start = Instant::now();
            }
        } else {
            state.requests_this_minute = 0;
            state.minute_start = Instant::now();
        }

        state.requests_this_minute += 1;
    }

    /// Reads `x-ratelimit-remaining` (a float) and `x-ratelimit-reset`
    /// (seconds until the window resets).
    pub async fn update_from_headers(&self, headers: &HeaderMap) {
        let Some((remaining, reset_secs)) = parse_rate_headers(headers) else {
            return;
        };

        let mut state = self.state.lock().await;
        state.remaining = remaining;
        state.reset_at = reset_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_rate_headers(headers: &HeaderMap) -> Option<(f64, Option<u64>)> {
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())?;

    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| secs.max(0.0).ceil() as u64);

    Some((remaining, reset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_reddit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("598.0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("412"));

        assert_eq!(parse_rate_headers(&headers), Some((598.0, Some(412))));
    }

    #[test]
    fn test_missing_headers_are_ignored() {
        assert_eq!(parse_rate_headers(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_update_records_remaining() {
        let limiter = RateLimiter::new();
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("12.0"));

        limiter.update_from_headers(&headers).await;
        limiter.wait().await;

        let state = limiter.state.lock().await;
        assert_eq!(state.remaining, 12.0);
        assert_eq!(state.requests_this_minute, 1);
    }
}
