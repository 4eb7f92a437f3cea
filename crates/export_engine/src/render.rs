use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use export_core::is_special_route;

use crate::decode::decode_body;
use crate::{CrawlSettings, RenderError, RenderFailureKind, RenderSettings};

/// How the renderer should treat a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Regular page: wait for the page lifecycle before capturing HTML.
    Page,
    /// Feeds, sitemaps and other data files: capture the raw response.
    Manual,
}

impl RenderMode {
    pub fn for_route(route: &str) -> Self {
        if is_special_route(route) {
            RenderMode::Manual
        } else {
            RenderMode::Page
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub route: String,
    pub url: String,
    pub mode: RenderMode,
}

impl RenderRequest {
    pub fn new(settings: &CrawlSettings, route: &str) -> Self {
        Self {
            route: route.to_string(),
            url: settings.url_for(route),
            mode: RenderMode::for_route(route),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub url: String,
    pub line: u32,
    pub column: u32,
}

/// A console message emitted by a page while it was rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub text: String,
    pub location: SourceLocation,
}

/// Side-channel observer handed to every render call.
pub trait RenderHooks: Send + Sync {
    fn before_request(&self, url: &str);
    fn console_message(&self, message: &ConsoleMessage);
}

/// Turns a route into HTML.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        request: &RenderRequest,
        hooks: &dyn RenderHooks,
    ) -> Result<String, RenderError>;

    /// Release whatever the renderer holds (browsers, connections). Called once per crawl pass.
    async fn cleanup(&self) {}
}

/// Renderer that fetches server output over HTTP. It does not execute
/// scripts, so it never reports console messages.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    settings: RenderSettings,
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(settings: RenderSettings) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| RenderError::new(RenderFailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, actual: u64) -> RenderError {
        RenderError::new(
            RenderFailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Renderer for HttpRenderer {
    async fn render(
        &self,
        request: &RenderRequest,
        hooks: &dyn RenderHooks,
    ) -> Result<String, RenderError> {
        let parsed = reqwest::Url::parse(&request.url)
            .map_err(|err| RenderError::new(RenderFailureKind::InvalidUrl, err.to_string()))?;
        hooks.before_request(parsed.as_str());

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::new(
                RenderFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if request.mode == RenderMode::Page {
            if let Some(ct) = content_type.as_deref() {
                if !self.is_content_type_allowed(ct) {
                    return Err(RenderError::new(
                        RenderFailureKind::UnsupportedContentType {
                            content_type: ct.to_string(),
                        },
                        "unsupported content type",
                    ));
                }
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_body(&bytes, content_type.as_deref())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RenderError {
    if err.is_timeout() {
        return RenderError::new(RenderFailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return RenderError::new(RenderFailureKind::RedirectLimitExceeded, err.to_string());
    }
    RenderError::new(RenderFailureKind::Network, err.to_string())
}
