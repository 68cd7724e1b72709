use std::path::PathBuf;

use crate::outcome::SkippedEpisode;

/// Events emitted during a run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The history file has been read
    HistoryLoaded { path: PathBuf, records: usize },

    /// Episodes were matched to a programme
    ProgrammeMatched { programme: String, matched: usize },

    /// An episode was left out of a programme's mirror or feed
    EpisodeSkipped {
        programme: String,
        episode: SkippedEpisode,
    },

    /// A mirror entry no longer justified by the history was removed
    StaleEntryRemoved { programme: String, path: PathBuf },

    /// A mirror directory was removed because nothing is published any more
    MirrorRemoved { programme: String, path: PathBuf },

    /// A feed document was written
    FeedWritten {
        programme: String,
        path: PathBuf,
        items: usize,
    },

    /// A programme could not be fully processed
    ProgrammeFailed { programme: String, error: String },

    /// The run has finished
    RunCompleted {
        programmes: usize,
        published: usize,
        skipped: usize,
        removed: usize,
        failed: usize,
    },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to print messages or collect statistics.
pub trait ProgressReporter {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A no-op progress reporter that silently ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}
