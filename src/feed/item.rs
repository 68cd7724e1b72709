// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use crate::history::EpisodeRecord;
use crate::outcome::SkipReason;

use super::tags::TagReader;

/// Episode title used by the history when an episode has no title of its own
const UNTITLED: &str = "-";

/// Width of each half of the sequence key
const SEQUENCE_WIDTH: usize = 8;

/// Everything the encoder needs to know about one episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub summary: String,
    pub subtitle: Option<String>,
    pub guid: String,
    pub pub_date: DateTime<Utc>,
    pub enclosure: EnclosureInfo,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub episode: Option<String>,
    pub season: Option<String>,
    /// `SSSSSSSS:EEEEEEEE`, for ordering in podcast clients
    pub sequence: String,
}

/// The published audio file of an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosureInfo {
    pub url: Url,
    pub length: u64,
    /// `None` for extensions outside the known audio table
    pub mime_type: Option<&'static str>,
}

/// Title shown for an episode, falling back to the programme name
pub fn episode_title(record: &EpisodeRecord) -> &str {
    if record.episode.is_empty() || record.episode == UNTITLED {
        &record.name
    } else {
        &record.episode
    }
}

/// Left-pad with zeros to eight characters, keeping the last eight
pub fn pad_number(value: &str) -> String {
    let padded: Vec<char> = "0"
        .repeat(SEQUENCE_WIDTH)
        .chars()
        .chain(value.chars())
        .collect();
    padded[padded.len() - SEQUENCE_WIDTH..].iter().collect()
}

pub fn sequence_key(series: &str, episode: &str) -> String {
    format!("{}:{}", pad_number(series), pad_number(episode))
}

/// MIME type for an audio file, by extension
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}

/// Summary text for an episode; only MP4 audio carries one
pub fn read_summary(path: &Path, tags: &dyn TagReader) -> String {
    if path.extension().and_then(|e| e.to_str()) != Some("m4a") {
        return String::new();
    }

    match tags.read_summary(path) {
        Ok(summary) => summary.unwrap_or_default(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No summary tag");
            String::new()
        }
    }
}

/// Public URL of a file, built from path segments under `base`
pub fn public_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

/// Derive the feed item for a published episode
///
/// `mirror_dir` is the programme's mirror directory name under `url_base`.
pub fn build_item(
    record: &EpisodeRecord,
    url_base: &Url,
    mirror_dir: &str,
    tags: &dyn TagReader,
) -> Result<FeedItem, SkipReason> {
    let source = &record.filename;
    let file_name = source
        .file_name()
        .ok_or(SkipReason::NoFileName)?
        .to_string_lossy();
    let length = std::fs::metadata(source)
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?
        .len();

    Ok(FeedItem {
        title: episode_title(record).to_string(),
        summary: read_summary(source, tags),
        subtitle: non_empty(&record.description),
        guid: record.web.clone(),
        pub_date: record.added_at(),
        enclosure: EnclosureInfo {
            url: public_url(url_base, &[mirror_dir, file_name.as_ref()]),
            length,
            mime_type: mime_type_for(source),
        },
        duration: non_empty(&record.duration),
        image: non_empty(&record.thumbnail),
        author: non_empty(&record.channel),
        episode: non_empty(&record.episode_number),
        season: non_empty(&record.series_number),
        sequence: sequence_key(&record.series_number, &record.episode_number),
    })
}
