use export_logging::{export_debug, export_error, export_info, export_warn};

use crate::render::{ConsoleLevel, ConsoleMessage, RenderHooks};

/// Fire-and-forget text sink for crawl progress.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards progress lines to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, message: &str) {
        export_info!("{}", message);
    }
}

/// Render hooks that report requests through a [`Logger`] and page console
/// output through the logging facade, keeping the console level.
pub struct LoggingHooks<'a> {
    logger: &'a dyn Logger,
}

impl<'a> LoggingHooks<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }
}

impl RenderHooks for LoggingHooks<'_> {
    fn before_request(&self, url: &str) {
        self.logger.log(&format!("Crawling contents from {url}"));
    }

    fn console_message(&self, message: &ConsoleMessage) {
        let location = &message.location;
        let origin = format!(
            "Message from {}:{}:{}",
            location.url, location.line, location.column
        );
        match message.level {
            ConsoleLevel::Error => export_error!("{} {}", origin, message.text),
            ConsoleLevel::Warning => export_warn!("{} {}", origin, message.text),
            ConsoleLevel::Debug => export_debug!("{} {}", origin, message.text),
            ConsoleLevel::Log | ConsoleLevel::Info => export_info!("{} {}", origin, message.text),
        }
    }
}
