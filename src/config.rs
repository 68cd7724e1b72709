// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration loading.
//!
//! [`Config::load`] reads a YAML file through the `config` crate.
//! [`Config::into_settings`] validates it and resolves defaults that depend
//! on the environment (home directory, timezone, URL base) into
//! [`Settings`], which is what the rest of the crate consumes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::mirror::{feed_file_name, is_plain_entry_name, mirror_dir_name};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG: &str = "histcast.yaml";

/// History file location relative to the home directory
pub const DEFAULT_HISTORY_FILE: &str = ".get_iplayer/download_history";

/// Raw configuration as written in the YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub output_dir: PathBuf,
    pub url_base: String,
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub cleanup: bool,
    pub programmes: Vec<ProgrammeConfig>,
}

/// One configured programme
#[derive(Debug, Clone, Deserialize)]
pub struct ProgrammeConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "match")]
    pub match_spec: Option<MatchSpec>,
    #[serde(default = "default_max_age_days", rename = "maxage")]
    pub max_age_days: u32,
    #[serde(default)]
    pub description: String,
}

/// The `match` key of a programme: one pattern or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MatchSpec {
    Single(String),
    List(Vec<String>),
}

impl MatchSpec {
    pub fn patterns(&self) -> &[String] {
        match self {
            MatchSpec::Single(pattern) => std::slice::from_ref(pattern),
            MatchSpec::List(patterns) => patterns,
        }
    }
}

impl ProgrammeConfig {
    /// Create a programme that matches episodes by exact name
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            match_spec: None,
            max_age_days: default_max_age_days(),
            description: String::new(),
        }
    }

    /// The programme name, or `None` when the entry is disabled
    pub fn enabled_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

fn default_author() -> String {
    "BBC".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_max_age_days() -> u32 {
    365
}

/// Validated configuration with every default resolved
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub url_base: Url,
    pub history_file: PathBuf,
    pub author: String,
    pub language: String,
    pub timezone: Tz,
    pub cleanup: bool,
    pub programmes: Vec<ProgrammeConfig>,
}

impl Config {
    /// Load the YAML configuration file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validate and resolve against the current user's home directory
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        self.resolve(home.as_deref())
    }

    /// Validate and resolve against an explicit home directory
    pub fn resolve(self, home: Option<&Path>) -> Result<Settings, ConfigError> {
        let url_base = parse_url_base(&self.url_base)?;

        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone {
                name: self.timezone.clone(),
            })?;

        let history_file = match self.history_file {
            Some(path) => expand_home(&path, home)?,
            None => home
                .ok_or(ConfigError::HomeDirectoryUnknown)?
                .join(DEFAULT_HISTORY_FILE),
        };

        check_programme_names(&self.programmes)?;

        Ok(Settings {
            output_dir: expand_home(&self.output_dir, home)?,
            url_base,
            history_file,
            author: self.author,
            language: self.language,
            timezone,
            cleanup: self.cleanup,
            programmes: self.programmes,
        })
    }
}

fn parse_url_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrlBase {
        url: raw.to_string(),
        source: e,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::UrlBaseNotABase {
            url: raw.to_string(),
        });
    }

    Ok(url)
}

fn expand_home(path: &Path, home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home.ok_or(ConfigError::HomeDirectoryUnknown)?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Programme names must be unique, and so must every mirror directory and
/// feed file they map to, otherwise cleanup of one programme would delete
/// another's links. A name that sanitizes to `.` or `..` would point the
/// mirror at the output directory or its parent.
fn check_programme_names(programmes: &[ProgrammeConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut entries: HashMap<String, &str> = HashMap::new();

    for name in programmes.iter().filter_map(ProgrammeConfig::enabled_name) {
        if !names.insert(name) {
            return Err(ConfigError::DuplicateProgramme {
                name: name.to_string(),
            });
        }

        let dir = mirror_dir_name(name);
        if !is_plain_entry_name(&dir) {
            return Err(ConfigError::ReservedMirrorName {
                name: name.to_string(),
                dir,
            });
        }

        for entry in [dir, feed_file_name(name)] {
            if let Some(first) = entries.insert(entry.clone(), name) {
                return Err(ConfigError::OutputCollision {
                    first: first.to_string(),
                    second: name.to_string(),
                    entry,
                });
            }
        }
    }

    Ok(())
}
