//! Exporter core: pure route mapping, link discovery and crawl phase tracking.
mod links;
mod phase;
mod route;

pub use links::{extract_links, href_value, Links};
pub use phase::{CrawlPhase, InvalidTransition, PhaseEvent};
pub use route::{is_special_route, route_to_file, SPECIAL_EXTENSIONS};
