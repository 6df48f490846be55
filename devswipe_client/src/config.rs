use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 2;
pub const DEFAULT_SUPER_LIKE_WEIGHT: i64 = 2;

/// Where the REST API lives and how long a single request may take.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let base_url = env::var("DEVSWIPE_API_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = parse_var("DEVSWIPE_TIMEOUT_SECS")
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Tuning for one feed browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub page_size: u32,
    /// Prefetch starts once fewer than this many cards remain ahead.
    pub prefetch_threshold: usize,
    /// Optimistic like delta of a super like. Always greater than a like.
    pub super_like_weight: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            super_like_weight: DEFAULT_SUPER_LIKE_WEIGHT,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let page_size = parse_var("DEVSWIPE_PAGE_SIZE")
            .filter(|size: &u32| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let prefetch_threshold =
            parse_var("DEVSWIPE_PREFETCH_THRESHOLD").unwrap_or(DEFAULT_PREFETCH_THRESHOLD);
        let super_like_weight = parse_var("DEVSWIPE_SUPER_LIKE_WEIGHT")
            .unwrap_or(DEFAULT_SUPER_LIKE_WEIGHT);
        Self {
            page_size,
            prefetch_threshold,
            super_like_weight,
        }
        .normalized()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self.normalized()
    }

    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.super_like_weight = self.super_like_weight.max(2);
        self
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_defaults_match_backend_page_size() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 6);
        assert_eq!(config.prefetch_threshold, 2);
        assert_eq!(config.super_like_weight, 2);
    }

    #[test]
    fn super_like_weight_stays_above_a_like() {
        let config = FeedConfig {
            page_size: 0,
            prefetch_threshold: 1,
            super_like_weight: 1,
        }
        .normalized();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.super_like_weight, 2);
    }
}
