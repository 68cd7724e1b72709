// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MirrorError;
use crate::history::EpisodeRecord;
use crate::outcome::{SkipReason, SkippedEpisode};

use super::naming::{is_plain_entry_name, mirror_dir_name};

/// Split a bucket into records whose source file exists and skips for the rest
pub fn partition_existing<'a>(
    episodes: &[&'a EpisodeRecord],
) -> (Vec<&'a EpisodeRecord>, Vec<SkippedEpisode>) {
    let mut existing = Vec::new();
    let mut missing = Vec::new();

    for &episode in episodes {
        if episode.filename.is_file() {
            existing.push(episode);
        } else {
            warn!(source = %episode.filename.display(), "Skipping episode with missing source");
            missing.push(skipped(episode, SkipReason::MissingSource));
        }
    }

    (existing, missing)
}

fn skipped(episode: &EpisodeRecord, reason: SkipReason) -> SkippedEpisode {
    SkippedEpisode {
        pid: episode.pid.clone(),
        source: episode.filename.clone(),
        reason,
    }
}

/// Result of linking one programme's episodes into its mirror directory
#[derive(Debug, Clone, Default)]
pub struct PublishReport<'a> {
    /// Episodes now reachable through the mirror, in bucket order
    pub linked: Vec<&'a EpisodeRecord>,
    pub skipped: Vec<SkippedEpisode>,
    /// File names inside the mirror directory justified by this run
    pub live: HashSet<OsString>,
}

/// Result of removing stale entries from a mirror directory
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Entries that could not be removed (path, error message)
    pub failed: Vec<(PathBuf, String)>,
    pub directory_removed: bool,
}

/// Hardlink mirror of a single programme
///
/// Every operation is idempotent so that a run interrupted half way is
/// repaired by the next complete one.
#[derive(Debug, Clone)]
pub struct MirrorSync {
    dir: PathBuf,
}

impl MirrorSync {
    /// Mirror of `programme` inside `output_dir`
    ///
    /// Fails unless the sanitized name is a single ordinary entry, so that
    /// cleanup can never reach the output directory itself or anything
    /// above it.
    pub fn new(output_dir: &Path, programme: &str) -> Result<Self, MirrorError> {
        let name = mirror_dir_name(programme);
        if !is_plain_entry_name(&name) {
            return Err(MirrorError::InvalidDirectory {
                programme: programme.to_string(),
                dir: name,
            });
        }

        Ok(Self {
            dir: output_dir.join(name),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Link every episode into the mirror directory
    ///
    /// The directory is created just before the first link. If this run
    /// created it and nothing could be linked, it is removed again.
    pub fn publish<'a>(&self, episodes: &[&'a EpisodeRecord]) -> PublishReport<'a> {
        let mut report = PublishReport::default();
        let mut dir_ready = self.dir.is_dir();
        let created_here = !dir_ready;

        for &episode in episodes {
            match self.link_episode(episode, &mut dir_ready) {
                Ok(file_name) => {
                    report.live.insert(file_name);
                    report.linked.push(episode);
                }
                Err(reason) => {
                    warn!(
                        source = %episode.filename.display(),
                        %reason,
                        "Skipping episode"
                    );
                    report.skipped.push(skipped(episode, reason));
                }
            }
        }

        if created_here
            && dir_ready
            && report.live.is_empty()
            && let Err(e) = std::fs::remove_dir(&self.dir)
        {
            debug!(
                dir = %self.dir.display(),
                error = %e,
                "Could not remove unused mirror directory"
            );
        }

        report
    }

    fn link_episode(
        &self,
        episode: &EpisodeRecord,
        dir_ready: &mut bool,
    ) -> Result<OsString, SkipReason> {
        let source = &episode.filename;
        let file_name = source.file_name().ok_or(SkipReason::NoFileName)?;

        if !*dir_ready {
            std::fs::create_dir_all(&self.dir)
                .map_err(|e| SkipReason::CreateDirectoryFailed(e.to_string()))?;
            *dir_ready = true;
        }

        let destination = self.dir.join(file_name);

        // Unlinking here would delete the source itself
        if destination == *source {
            return Ok(file_name.to_os_string());
        }

        remove_if_exists(&destination)
            .map_err(|e| SkipReason::UnlinkFailed(e.to_string()))?;
        std::fs::hard_link(source, &destination)
            .map_err(|e| SkipReason::LinkFailed(e.to_string()))?;

        debug!(
            source = %source.display(),
            link = %destination.display(),
            "Linked episode"
        );

        Ok(file_name.to_os_string())
    }

    /// Delete every mirror entry not named in `live`
    ///
    /// When `live` is empty the directory itself is removed as well. A
    /// missing directory is not an error.
    pub fn remove_stale(&self, live: &HashSet<OsString>) -> Result<CleanupReport, MirrorError> {
        let mut report = CleanupReport::default();

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
            Err(e) => {
                return Err(MirrorError::ReadDirectoryFailed {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| MirrorError::ReadDirectoryFailed {
                path: self.dir.clone(),
                source: e,
            })?;

            if live.contains(&entry.file_name()) {
                continue;
            }

            let path = entry.path();
            let result = if entry.file_type().is_ok_and(|t| t.is_dir()) {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };

            match result {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed stale mirror entry");
                    report.removed.push(path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => report.failed.push((path, e.to_string())),
            }
        }

        if live.is_empty() {
            match std::fs::remove_dir(&self.dir) {
                Ok(()) => report.directory_removed = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => report.failed.push((self.dir.clone(), e.to_string())),
            }
        }

        Ok(report)
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
