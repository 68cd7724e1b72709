// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading the download history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to open history file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading or validating the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("Invalid config: {0}")]
    Invalid(#[from] config::ConfigError),

    #[error("Invalid url_base '{url}': {source}")]
    InvalidUrlBase {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("url_base '{url}' cannot be used as a base for episode links")]
    UrlBaseNotABase { url: String },

    #[error("Unknown timezone '{name}'")]
    UnknownTimezone { name: String },

    #[error("Could not determine the home directory for the default history file")]
    HomeDirectoryUnknown,

    #[error("Programme '{name}' is configured more than once")]
    DuplicateProgramme { name: String },

    #[error("Programme '{name}' maps to '{dir}', which is not a directory of its own")]
    ReservedMirrorName { name: String, dir: String },

    #[error("Programmes '{first}' and '{second}' both write '{entry}' in the output directory")]
    OutputCollision {
        first: String,
        second: String,
        entry: String,
    },
}

/// Errors that can occur when compiling programme match rules
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid match pattern '{pattern}' for programme '{programme}': {source}")]
    InvalidPattern {
        programme: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that can occur while cleaning up a mirror directory
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Programme '{programme}' maps to '{dir}', which is not inside the output directory")]
    InvalidDirectory { programme: String, dir: String },

    #[error("Failed to read mirror directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when reading embedded audio tags
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Failed to read tags from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: mp4ameta::Error,
    },
}

/// Errors that can occur when writing a feed document
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to create feed file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode feed {path}: {source}")]
    EncodeFailed {
        path: PathBuf,
        #[source]
        source: rss::Error,
    },

    #[error("Failed to write feed file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors that abort a whole run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
