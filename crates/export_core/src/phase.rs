use std::fmt;

use thiserror::Error;

/// Lifecycle of a single crawl pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlPhase {
    #[default]
    Idle,
    ResolvingSeeds,
    Draining,
    Finalizing,
    Done,
}

/// Inputs that move a crawl pass forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    SeedsResolved,
    /// Seed resolution failed; the pass skips draining and goes straight to cleanup.
    SeedsFailed,
    Quiescent,
    CleanedUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid crawl transition: {event:?} while {from}")]
pub struct InvalidTransition {
    pub from: CrawlPhase,
    pub event: PhaseEvent,
}

impl CrawlPhase {
    /// Pure transition function; a finished pass never restarts.
    pub fn advance(self, event: PhaseEvent) -> Result<CrawlPhase, InvalidTransition> {
        let next = match (self, event) {
            (CrawlPhase::Idle, PhaseEvent::Start) => CrawlPhase::ResolvingSeeds,
            (CrawlPhase::ResolvingSeeds, PhaseEvent::SeedsResolved) => CrawlPhase::Draining,
            (CrawlPhase::ResolvingSeeds, PhaseEvent::SeedsFailed) => CrawlPhase::Finalizing,
            (CrawlPhase::Draining, PhaseEvent::Quiescent) => CrawlPhase::Finalizing,
            (CrawlPhase::Finalizing, PhaseEvent::CleanedUp) => CrawlPhase::Done,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    pub fn is_done(self) -> bool {
        self == CrawlPhase::Done
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlPhase::Idle => "idle",
            CrawlPhase::ResolvingSeeds => "resolving seeds",
            CrawlPhase::Draining => "draining",
            CrawlPhase::Finalizing => "finalizing",
            CrawlPhase::Done => "done",
        };
        f.write_str(name)
    }
}
