use std::time::Duration;

use crate::queue::DEFAULT_MAX_CONCURRENT;

/// Where the site is served and how a crawl pass is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub hostname: String,
    pub port: u16,
    pub max_concurrent: usize,
    /// Visit each route at most once per pass. Needed for sites whose pages link back to each other.
    pub dedupe_routes: bool,
    /// Give up on a render that takes longer than this and free its slot.
    pub item_timeout: Option<Duration>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 3000,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            dedupe_routes: true,
            item_timeout: None,
        }
    }
}

impl CrawlSettings {
    pub fn url_for(&self, route: &str) -> String {
        format!("http://{}:{}{}", self.hostname, self.port, route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Accepted for page renders; manual renders take any content type.
    pub allowed_content_types: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}
