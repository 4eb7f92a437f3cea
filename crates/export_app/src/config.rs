//! Resolves the effective export configuration from CLI flags layered over an
//! optional RON file. Flags given on the command line always win.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use export_engine::{CrawlSettings, FileSeedProvider, RenderSettings, SeedRoutes};
use export_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

const DEFAULT_OUT_DIR: &str = "dist";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub routes: Vec<String>,
    pub routes_file: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub item_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub allow_recrawl: bool,
    pub log_file: Option<PathBuf>,
}

pub fn load(path: &Path) -> anyhow::Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("failed to parse config file {}", path.display()))
}

#[derive(Debug)]
pub struct ExportConfig {
    pub crawl: CrawlSettings,
    pub render: RenderSettings,
    pub seeds: SeedRoutes,
    pub out_dir: PathBuf,
    pub log: LogDestination,
    pub level: LevelFilter,
}

pub fn resolve(cli: &Cli, file: FileConfig) -> ExportConfig {
    let defaults = CrawlSettings::default();
    let crawl = CrawlSettings {
        hostname: cli
            .hostname
            .clone()
            .or(file.hostname)
            .unwrap_or(defaults.hostname),
        port: cli.port.or(file.port).unwrap_or(defaults.port),
        max_concurrent: cli
            .concurrency
            .or(file.concurrency)
            .unwrap_or(defaults.max_concurrent),
        dedupe_routes: !(cli.allow_recrawl || file.allow_recrawl),
        item_timeout: cli
            .item_timeout
            .or(file.item_timeout_secs)
            .map(Duration::from_secs),
    };

    let mut render = RenderSettings::default();
    if let Some(secs) = cli.request_timeout.or(file.request_timeout_secs) {
        render.request_timeout = Duration::from_secs(secs);
    }

    let seeds = if !cli.routes.is_empty() {
        SeedRoutes::Static(cli.routes.clone())
    } else if let Some(path) = cli.routes_file.clone() {
        SeedRoutes::Provider(Arc::new(FileSeedProvider::new(path)))
    } else if !file.routes.is_empty() {
        SeedRoutes::Static(file.routes)
    } else if let Some(path) = file.routes_file {
        SeedRoutes::Provider(Arc::new(FileSeedProvider::new(path)))
    } else {
        SeedRoutes::default()
    };

    let log = match cli.log_file.clone().or(file.log_file) {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };

    ExportConfig {
        crawl,
        render,
        seeds,
        out_dir: cli
            .out_dir
            .clone()
            .or(file.out_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
        log,
        level: if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags_or_file() {
        let config = resolve(&Cli::default(), FileConfig::default());
        assert_eq!(config.crawl, CrawlSettings::default());
        assert_eq!(config.out_dir, PathBuf::from("dist"));
        assert_eq!(config.log, LogDestination::Terminal);
        assert!(matches!(config.seeds, SeedRoutes::Static(ref r) if r == &["/".to_string()]));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = FileConfig {
            hostname: Some("file-host".into()),
            port: Some(8080),
            routes: vec!["/from-file".into()],
            concurrency: Some(10),
            allow_recrawl: true,
            ..FileConfig::default()
        };
        let cli = Cli {
            port: Some(9000),
            routes: vec!["/from-cli".into()],
            ..Cli::default()
        };

        let config = resolve(&cli, file);

        assert_eq!(config.crawl.hostname, "file-host");
        assert_eq!(config.crawl.port, 9000);
        assert_eq!(config.crawl.max_concurrent, 10);
        assert!(!config.crawl.dedupe_routes);
        assert!(matches!(config.seeds, SeedRoutes::Static(ref r) if r == &["/from-cli".to_string()]));
    }

    #[test]
    fn routes_file_becomes_a_provider() {
        let file = FileConfig {
            routes_file: Some(PathBuf::from("routes.txt")),
            item_timeout_secs: Some(30),
            ..FileConfig::default()
        };
        let config = resolve(&Cli::default(), file);
        assert!(matches!(config.seeds, SeedRoutes::Provider(_)));
        assert_eq!(config.crawl.item_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn ron_file_is_loaded() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("export.ron");
        fs::write(
            &path,
            r#"(hostname: Some("127.0.0.1"), port: Some(4173), routes: ["/", "/rss.xml"])"#,
        )
        .unwrap();

        let file = load(&path).unwrap();

        assert_eq!(file.hostname.as_deref(), Some("127.0.0.1"));
        assert_eq!(file.port, Some(4173));
        assert_eq!(file.routes, vec!["/", "/rss.xml"]);
        assert_eq!(file.concurrency, None);
    }

    #[test]
    fn unreadable_config_reports_path() {
        let err = load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.ron"));
    }
}
