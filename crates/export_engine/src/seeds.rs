use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read routes from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Provider(String),
}

/// Produces the starting routes of a crawl pass.
#[async_trait::async_trait]
pub trait SeedProvider: Send + Sync {
    async fn routes(&self) -> Result<Vec<String>, SeedError>;
}

/// Either a fixed list of routes or a provider consulted once per pass.
#[derive(Clone)]
pub enum SeedRoutes {
    Static(Vec<String>),
    Provider(Arc<dyn SeedProvider>),
}

impl SeedRoutes {
    pub async fn resolve(&self) -> Result<Vec<String>, SeedError> {
        match self {
            SeedRoutes::Static(routes) => Ok(routes.clone()),
            SeedRoutes::Provider(provider) => provider.routes().await,
        }
    }
}

impl Default for SeedRoutes {
    fn default() -> Self {
        SeedRoutes::Static(vec!["/".to_string()])
    }
}

impl fmt::Debug for SeedRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedRoutes::Static(routes) => f.debug_tuple("Static").field(routes).finish(),
            SeedRoutes::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

impl From<Vec<String>> for SeedRoutes {
    fn from(routes: Vec<String>) -> Self {
        SeedRoutes::Static(routes)
    }
}

/// Reads one route per line. Blank lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct FileSeedProvider {
    path: PathBuf,
}

impl FileSeedProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SeedProvider for FileSeedProvider {
    async fn routes(&self) -> Result<Vec<String>, SeedError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SeedError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(parse_route_list(&content))
    }
}

pub fn parse_route_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}
