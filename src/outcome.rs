// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single episode was left out of a mirror or feed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("source file does not exist")]
    MissingSource,

    #[error("source path has no file name")]
    NoFileName,

    #[error("could not create mirror directory: {0}")]
    CreateDirectoryFailed(String),

    #[error("could not remove previous link: {0}")]
    UnlinkFailed(String),

    #[error("could not create hardlink: {0}")]
    LinkFailed(String),

    #[error("could not read source file: {0}")]
    Unreadable(String),
}

/// An episode that was skipped, with the source file it referred to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEpisode {
    pub pid: String,
    pub source: PathBuf,
    pub reason: SkipReason,
}
