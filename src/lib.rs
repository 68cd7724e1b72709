pub mod config;
pub mod error;
pub mod feed;
pub mod history;
pub mod matcher;
pub mod mirror;
pub mod outcome;
pub mod progress;
pub mod rules;
pub mod sync;

// Re-export main types for convenience
pub use config::{Config, MatchSpec, ProgrammeConfig, Settings};
pub use error::{ConfigError, FeedError, HistoryError, MirrorError, RuleError, RunError, TagError};
pub use feed::{Mp4TagReader, NoTags, TagReader, assemble_feed};
pub use history::{EpisodeRecord, HistoryReader, read_history};
pub use matcher::{Buckets, match_episodes};
pub use mirror::{MirrorSync, feed_file_name, mirror_dir_name};
pub use outcome::{SkipReason, SkippedEpisode};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter};
pub use rules::{MatchRule, NameMatcher, compile_rules};
pub use sync::{ProgrammeSummary, RunClock, RunSummary, run};
