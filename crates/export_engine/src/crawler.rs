use std::sync::Arc;

use export_core::{extract_links, route_to_file, CrawlPhase, PhaseEvent};
use export_logging::{export_debug, export_info, export_trace, export_warn};

use crate::logger::LoggingHooks;
use crate::queue::{QueueHandle, QueueOptions, WorkItem, WorkQueue};
use crate::render::RenderRequest;
use crate::{
    CrawlError, CrawlReport, CrawlSettings, ItemFailure, Logger, OutputFile, RenderFailureKind,
    Renderer, Route, SeedRoutes, WrittenFile, Writer,
};

/// What became of a route that did not fail.
enum Exported {
    Written(WrittenFile),
    /// The page answered with a content type that is not exported.
    Skipped(Route),
}

/// Wires seed resolution, the work queue and the external renderer, writer
/// and logger into crawl passes. Every call to [`Crawler::crawl`] starts from
/// scratch with a fresh queue.
pub struct Crawler {
    settings: CrawlSettings,
    seeds: SeedRoutes,
    renderer: Arc<dyn Renderer>,
    writer: Arc<dyn Writer>,
    logger: Arc<dyn Logger>,
}

impl Crawler {
    pub fn new(
        settings: CrawlSettings,
        seeds: SeedRoutes,
        renderer: Arc<dyn Renderer>,
        writer: Arc<dyn Writer>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            settings,
            seeds,
            renderer,
            writer,
            logger,
        }
    }

    /// Run one crawl pass.
    ///
    /// Per-route failures are collected in the report, and pages served with a
    /// content type that is not exported are listed as skipped. Only a failing seed
    /// provider aborts the pass. The renderer is cleaned up exactly once
    /// either way.
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        let phase = advance(CrawlPhase::Idle, PhaseEvent::Start)?;

        let seeds = match self.seeds.resolve().await {
            Ok(seeds) => seeds,
            Err(err) => {
                export_warn!("Seed resolution failed: {}", err);
                let phase = advance(phase, PhaseEvent::SeedsFailed)?;
                self.finalize(phase).await?;
                return Err(CrawlError::SeedResolution(err));
            }
        };
        let phase = advance(phase, PhaseEvent::SeedsResolved)?;

        let options = QueueOptions {
            max_concurrent: self.settings.max_concurrent,
            dedupe: self.settings.dedupe_routes,
        };
        let this = self;
        let queue = WorkQueue::new(options, move |route, handle| this.process(route, handle));
        for seed in &seeds {
            if !matches!(queue.add(seed.as_str()), Ok(true)) {
                export_debug!("Seed {} not queued", seed);
            }
        }
        export_info!(
            "Exporting {} seed route(s) from {}:{} with up to {} concurrent renders",
            seeds.len(),
            self.settings.hostname,
            self.settings.port,
            self.settings.max_concurrent
        );

        let outcome = queue.run().await;
        let phase = advance(phase, PhaseEvent::Quiescent)?;
        let phase = self.finalize(phase).await?;

        let mut written = Vec::new();
        let mut skipped = Vec::new();
        for exported in outcome.completed {
            match exported {
                Exported::Written(file) => written.push(file),
                Exported::Skipped(route) => skipped.push(route),
            }
        }
        let report = CrawlReport {
            phase,
            seeds: seeds.len(),
            processed: outcome.processed,
            peak_in_flight: outcome.peak_in_flight,
            written,
            skipped,
            failures: outcome.failures.into_iter().map(|(_, err)| err).collect(),
        };
        export_info!(
            "Export finished: {} written, {} skipped, {} failed",
            report.written.len(),
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }

    async fn finalize(&self, phase: CrawlPhase) -> Result<CrawlPhase, CrawlError> {
        self.renderer.cleanup().await;
        advance(phase, PhaseEvent::CleanedUp)
    }

    async fn process(&self, route: WorkItem, queue: QueueHandle) -> Result<Exported, ItemFailure> {
        let request = RenderRequest::new(&self.settings, &route);
        let hooks = LoggingHooks::new(self.logger.as_ref());
        let rendering = self.renderer.render(&request, &hooks);
        let rendered = match self.settings.item_timeout {
            Some(limit) => tokio::time::timeout(limit, rendering)
                .await
                .map_err(|_| ItemFailure::Timeout {
                    route: route.clone(),
                    after: limit,
                })?,
            None => rendering.await,
        };
        let html = match rendered {
            Ok(html) => html,
            Err(error) => {
                if let RenderFailureKind::UnsupportedContentType { content_type } = &error.kind {
                    export_info!("Skipping {} served as {}", route, content_type);
                    return Ok(Exported::Skipped(route));
                }
                return Err(ItemFailure::Render { route, error });
            }
        };

        for link in extract_links(&html, &route) {
            if let Err(err) = queue.add(link) {
                export_warn!("Discovered link on {} dropped: {}", route, err);
            }
        }

        let path = route_to_file(&route);
        self.logger.log(&format!("Writing {path} for {route}"));
        let output = OutputFile {
            route,
            path,
            content: html,
        };
        match self.writer.write(&output).await {
            Ok(destination) => {
                export_trace!("{} -> {:?}", output.route, destination);
                Ok(Exported::Written(WrittenFile {
                    route: output.route,
                    path: output.path,
                    destination,
                }))
            }
            Err(error) => Err(ItemFailure::Write {
                route: output.route,
                error,
            }),
        }
    }
}

fn advance(phase: CrawlPhase, event: PhaseEvent) -> Result<CrawlPhase, CrawlError> {
    let next = phase.advance(event)?;
    export_debug!("Crawl phase {} -> {}", phase, next);
    Ok(next)
}
