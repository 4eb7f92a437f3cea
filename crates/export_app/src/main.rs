//! `site-export`: crawl a running site and write every reachable route to disk.
//!
//! Exit codes: 0 when every route was exported, 1 when some routes failed,
//! 2 when the export could not run at all.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use export_engine::{CrawlReport, Crawler, FacadeLogger, FsWriter, HttpRenderer};
use export_logging::export_error;
use serde_json::json;

use cli::Cli;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(err) => {
            export_error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            2
        }
    };
    std::process::exit(exit_code);
}

async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    let file = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None => config::FileConfig::default(),
    };
    let export = config::resolve(&cli, file);
    export_logging::initialize(export.log.clone(), export.level);

    let renderer = HttpRenderer::new(export.render.clone()).context("failed to set up HTTP client")?;
    let crawler = Crawler::new(
        export.crawl.clone(),
        export.seeds.clone(),
        Arc::new(renderer),
        Arc::new(FsWriter::new(&export.out_dir)),
        Arc::new(FacadeLogger),
    );

    let report = crawler.crawl().await?;
    print_summary(&report, cli.json)?;

    Ok(if report.is_complete_success() { 0 } else { 1 })
}

fn print_summary(report: &CrawlReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let summary = json!({
            "seeds": report.seeds,
            "processed": report.processed,
            "peak_in_flight": report.peak_in_flight,
            "written": report.written.iter().map(|file| json!({
                "route": file.route,
                "path": file.path,
                "destination": file.destination.display().to_string(),
            })).collect::<Vec<_>>(),
            "skipped": report.skipped,
            "failures": report.failures.iter().map(|failure| json!({
                "route": failure.route(),
                "error": failure.to_string(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Exported {} of {} route(s)", report.written.len(), report.processed);
    for route in &report.skipped {
        println!("  skipped: {} (not a page)", route);
    }
    for failure in &report.failures {
        println!("  failed: {}", failure);
    }
    Ok(())
}
