//! Exporter engine: bounded work queue, crawl orchestration and the IO
//! collaborators it drives.
mod crawler;
mod decode;
mod logger;
mod persist;
pub mod queue;
mod render;
mod seeds;
mod settings;
mod types;

pub use crawler::Crawler;
pub use decode::decode_body;
pub use logger::{FacadeLogger, Logger, LoggingHooks};
pub use persist::{
    ensure_output_dir, relative_output_path, AtomicFileWriter, FsWriter, WriteError, Writer,
};
pub use queue::{QueueError, QueueHandle, QueueOptions, QueueReport, WorkItem, WorkQueue};
pub use render::{
    ConsoleLevel, ConsoleMessage, HttpRenderer, RenderHooks, RenderMode, RenderRequest, Renderer,
    SourceLocation,
};
pub use seeds::{parse_route_list, FileSeedProvider, SeedError, SeedProvider, SeedRoutes};
pub use settings::{CrawlSettings, RenderSettings};
pub use types::{
    CrawlError, CrawlReport, ItemFailure, OutputFile, RenderError, RenderFailureKind, Route,
    WrittenFile,
};
