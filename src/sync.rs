// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::{ProgrammeConfig, Settings};
use crate::error::RunError;
use crate::feed::{FeedContext, TagReader, assemble_feed, reference_build_time};
use crate::history::{EpisodeRecord, read_history};
use crate::matcher::match_episodes;
use crate::mirror::{MirrorSync, feed_file_name, partition_existing};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::rules::compile_rules;

/// The two instants a run depends on
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    /// Reference point for episode ages
    pub now: DateTime<Utc>,
    /// Timestamp written into every feed
    pub build_date: DateTime<Utc>,
}

impl RunClock {
    /// Read the system clock, deriving the build date through `reference`
    pub fn system(reference: Tz) -> Self {
        Self {
            now: Utc::now(),
            build_date: reference_build_time(reference, Local::now().naive_local()),
        }
    }
}

/// What happened to one programme during a run
#[derive(Debug, Clone, Default)]
pub struct ProgrammeSummary {
    pub programme: String,
    pub matched: usize,
    pub published: usize,
    pub skipped: usize,
    pub removed: usize,
    pub feed_path: Option<PathBuf>,
    pub failures: Vec<String>,
}

/// Result of a complete run, in configuration order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub programmes: Vec<ProgrammeSummary>,
}

impl RunSummary {
    pub fn published(&self) -> usize {
        self.programmes.iter().map(|p| p.published).sum()
    }

    pub fn skipped(&self) -> usize {
        self.programmes.iter().map(|p| p.skipped).sum()
    }

    pub fn removed(&self) -> usize {
        self.programmes.iter().map(|p| p.removed).sum()
    }

    /// Number of programmes with at least one failure
    pub fn failed(&self) -> usize {
        self.programmes.iter().filter(|p| !p.failures.is_empty()).count()
    }
}

/// Publish every configured programme
///
/// This is the main entry point for the library. It:
/// 1. Compiles the match rules
/// 2. Reads the download history once
/// 3. Sorts episodes into programme buckets
/// 4. For each programme in config order, refreshes its hardlink mirror
///    and writes its feed
///
/// Only configuration, history and output directory problems abort the run.
/// Everything else is recorded per programme.
pub fn run(
    settings: &Settings,
    tags: &dyn TagReader,
    reporter: &dyn ProgressReporter,
    clock: RunClock,
) -> Result<RunSummary, RunError> {
    let rules = compile_rules(&settings.programmes)?;

    std::fs::create_dir_all(&settings.output_dir).map_err(|e| RunError::OutputDirectoryFailed {
        path: settings.output_dir.clone(),
        source: e,
    })?;

    let records = read_history(&settings.history_file)?;
    reporter.report(ProgressEvent::HistoryLoaded {
        path: settings.history_file.clone(),
        records: records.len(),
    });

    let buckets = match_episodes(&records, &rules, clock.now);

    let mut summary = RunSummary::default();
    for programme in &settings.programmes {
        let Some(name) = programme.enabled_name() else {
            continue;
        };

        let bucket = buckets.get(name);
        reporter.report(ProgressEvent::ProgrammeMatched {
            programme: name.to_string(),
            matched: bucket.len(),
        });

        let programme_summary =
            publish_programme(settings, programme, name, bucket, tags, reporter, clock);
        summary.programmes.push(programme_summary);
    }

    reporter.report(ProgressEvent::RunCompleted {
        programmes: summary.programmes.len(),
        published: summary.published(),
        skipped: summary.skipped(),
        removed: summary.removed(),
        failed: summary.failed(),
    });

    Ok(summary)
}

fn publish_programme(
    settings: &Settings,
    programme: &ProgrammeConfig,
    name: &str,
    bucket: &[&EpisodeRecord],
    tags: &dyn TagReader,
    reporter: &dyn ProgressReporter,
    clock: RunClock,
) -> ProgrammeSummary {
    let mut summary = ProgrammeSummary {
        programme: name.to_string(),
        matched: bucket.len(),
        ..Default::default()
    };

    let report_skip = |episode| {
        reporter.report(ProgressEvent::EpisodeSkipped {
            programme: name.to_string(),
            episode,
        })
    };

    let mirror = match MirrorSync::new(&settings.output_dir, name) {
        Ok(mirror) => mirror,
        Err(e) => {
            summary.failures.push(e.to_string());
            report_failures(&summary, reporter);
            return summary;
        }
    };

    let (existing, missing) = partition_existing(bucket);
    summary.skipped += missing.len();
    missing.into_iter().for_each(report_skip);

    let published = mirror.publish(&existing);
    summary.skipped += published.skipped.len();
    published.skipped.iter().cloned().for_each(report_skip);

    if settings.cleanup {
        match mirror.remove_stale(&published.live) {
            Ok(cleanup) => {
                summary.removed = cleanup.removed.len();
                for path in cleanup.removed {
                    reporter.report(ProgressEvent::StaleEntryRemoved {
                        programme: name.to_string(),
                        path,
                    });
                }
                if cleanup.directory_removed {
                    reporter.report(ProgressEvent::MirrorRemoved {
                        programme: name.to_string(),
                        path: mirror.dir().to_path_buf(),
                    });
                }
                for (path, error) in cleanup.failed {
                    summary
                        .failures
                        .push(format!("Failed to remove {}: {}", path.display(), error));
                }
            }
            Err(e) => summary.failures.push(e.to_string()),
        }
    }

    let context = FeedContext {
        programme: name,
        description: &programme.description,
        url_base: &settings.url_base,
        default_author: &settings.author,
        language: &settings.language,
        build_date: clock.build_date,
    };
    let feed = assemble_feed(&context, &published.linked, tags);
    summary.published = feed.items.len();
    summary.skipped += feed.skipped.len();
    feed.skipped.iter().cloned().for_each(report_skip);

    let feed_path = settings.output_dir.join(feed_file_name(name));
    match feed.write_to_file(&feed_path) {
        Ok(()) => {
            info!(
                programme = name,
                path = %feed_path.display(),
                items = feed.items.len(),
                "Wrote feed"
            );
            reporter.report(ProgressEvent::FeedWritten {
                programme: name.to_string(),
                path: feed_path.clone(),
                items: feed.items.len(),
            });
            summary.feed_path = Some(feed_path);
        }
        Err(e) => summary.failures.push(e.to_string()),
    }

    report_failures(&summary, reporter);
    summary
}

fn report_failures(summary: &ProgrammeSummary, reporter: &dyn ProgressReporter) {
    for error in &summary.failures {
        warn!(programme = %summary.programme, %error, "Programme failed");
        reporter.report(ProgressEvent::ProgrammeFailed {
            programme: summary.programme.clone(),
            error: error.clone(),
        });
    }
}
