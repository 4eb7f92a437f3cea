use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use export_core::{CrawlPhase, InvalidTransition};
use thiserror::Error;

use crate::persist::WriteError;
use crate::seeds::SeedError;

pub type Route = String;

/// HTML for one route plus the file path it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub route: Route,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub route: Route,
    pub path: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RenderError {
    pub kind: RenderFailureKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: RenderFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Network,
}

impl fmt::Display for RenderFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderFailureKind::InvalidUrl => write!(f, "invalid url"),
            RenderFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            RenderFailureKind::Timeout => write!(f, "timeout"),
            RenderFailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            RenderFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            RenderFailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            RenderFailureKind::Decode => write!(f, "decode error"),
            RenderFailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why a single route did not make it to disk.
#[derive(Debug, Error)]
pub enum ItemFailure {
    #[error("rendering {route} failed: {error}")]
    Render { route: Route, error: RenderError },
    #[error("rendering {route} timed out after {after:?}")]
    Timeout { route: Route, after: Duration },
    #[error("writing {route} failed: {error}")]
    Write { route: Route, error: WriteError },
}

impl ItemFailure {
    pub fn route(&self) -> &str {
        match self {
            ItemFailure::Render { route, .. }
            | ItemFailure::Timeout { route, .. }
            | ItemFailure::Write { route, .. } => route,
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to resolve seed routes: {0}")]
    SeedResolution(#[from] SeedError),
    #[error(transparent)]
    Phase(#[from] InvalidTransition),
    #[error("{failed} of {processed} routes failed")]
    Partial {
        failed: usize,
        processed: usize,
        report: Box<CrawlReport>,
    },
}

/// Aggregate outcome of one crawl pass.
#[derive(Debug)]
pub struct CrawlReport {
    pub phase: CrawlPhase,
    pub seeds: usize,
    pub processed: usize,
    pub peak_in_flight: usize,
    pub written: Vec<WrittenFile>,
    /// Routes answered with a non-page content type in page mode.
    pub skipped: Vec<Route>,
    pub failures: Vec<ItemFailure>,
}

impl CrawlReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn per-route failures into an error for callers that want all-or-nothing.
    pub fn into_result(self) -> Result<CrawlReport, CrawlError> {
        if self.is_complete_success() {
            return Ok(self);
        }
        Err(CrawlError::Partial {
            failed: self.failures.len(),
            processed: self.processed,
            report: Box::new(self),
        })
    }
}
