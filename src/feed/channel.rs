// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rss::extension::itunes::{ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder};
use rss::{Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, Item, ItemBuilder};
use tracing::warn;
use url::Url;

use crate::error::FeedError;
use crate::history::EpisodeRecord;
use crate::mirror::{feed_file_name, mirror_dir_name};
use crate::outcome::SkippedEpisode;

use super::item::{FeedItem, build_item, public_url};
use super::tags::TagReader;

/// Programme-level inputs for assembling a feed
#[derive(Debug, Clone)]
pub struct FeedContext<'a> {
    pub programme: &'a str,
    pub description: &'a str,
    pub url_base: &'a Url,
    /// Channel author used when the last episode names no channel
    pub default_author: &'a str,
    pub language: &'a str,
    pub build_date: DateTime<Utc>,
}

/// Channel-level metadata of an assembled feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub description: String,
    pub link: Url,
    pub language: String,
    pub author: String,
    pub image: Option<String>,
    pub build_date: DateTime<Utc>,
}

/// A feed ready for encoding
#[derive(Debug, Clone)]
pub struct AssembledFeed {
    pub channel: ChannelInfo,
    /// Items in bucket order
    pub items: Vec<FeedItem>,
    pub skipped: Vec<SkippedEpisode>,
}

/// Build the feed of one programme from its published episodes
///
/// An empty episode list still yields a complete channel without items.
/// Author and image come from the last item.
pub fn assemble_feed(
    context: &FeedContext<'_>,
    episodes: &[&EpisodeRecord],
    tags: &dyn TagReader,
) -> AssembledFeed {
    let mirror_dir = mirror_dir_name(context.programme);
    let mut items = Vec::with_capacity(episodes.len());
    let mut skipped = Vec::new();

    for &episode in episodes {
        match build_item(episode, context.url_base, &mirror_dir, tags) {
            Ok(item) => items.push(item),
            Err(reason) => {
                warn!(source = %episode.filename.display(), %reason, "Leaving episode out of feed");
                skipped.push(SkippedEpisode {
                    pid: episode.pid.clone(),
                    source: episode.filename.clone(),
                    reason,
                });
            }
        }
    }

    let feed_name = feed_file_name(context.programme);
    // An empty channel or thumbnail on the last item falls back to the
    // configured author and no image, rather than an empty value
    let last = items.last();
    let channel = ChannelInfo {
        title: context.programme.to_string(),
        description: context.description.to_string(),
        link: public_url(context.url_base, &[feed_name.as_str()]),
        language: context.language.to_string(),
        author: last
            .and_then(|item| item.author.clone())
            .unwrap_or_else(|| context.default_author.to_string()),
        image: last.and_then(|item| item.image.clone()),
        build_date: context.build_date,
    };

    AssembledFeed {
        channel,
        items,
        skipped,
    }
}

impl AssembledFeed {
    /// Encode as an RSS 2.0 channel with iTunes extensions
    pub fn to_channel(&self) -> Channel {
        let build_date = self.channel.build_date.to_rfc2822();

        let itunes = ITunesChannelExtensionBuilder::default()
            .author(Some(self.channel.author.clone()))
            .image(self.channel.image.clone())
            .build();

        ChannelBuilder::default()
            .title(self.channel.title.clone())
            .link(self.channel.link.to_string())
            .description(self.channel.description.clone())
            .language(Some(self.channel.language.clone()))
            .pub_date(Some(build_date.clone()))
            .last_build_date(Some(build_date))
            .itunes_ext(Some(itunes))
            .items(self.items.iter().map(encode_item).collect::<Vec<_>>())
            .build()
    }

    /// Write the encoded feed to `path`
    ///
    /// The document is written next to the target and renamed into place, so
    /// an interrupted run never leaves a truncated feed behind.
    pub fn write_to_file(&self, path: &Path) -> Result<(), FeedError> {
        let partial = partial_path(path);

        let file = File::create(&partial).map_err(|e| FeedError::FileCreateFailed {
            path: partial.clone(),
            source: e,
        })?;

        let mut writer = self
            .to_channel()
            .write_to(BufWriter::new(file))
            .map_err(|e| FeedError::EncodeFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| FeedError::FileWriteFailed {
                path: partial.clone(),
                source: e,
            })?;

        std::fs::rename(&partial, path).map_err(|e| FeedError::FileWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn encode_item(item: &FeedItem) -> Item {
    let itunes = ITunesItemExtensionBuilder::default()
        .duration(item.duration.clone())
        .image(item.image.clone())
        .subtitle(item.subtitle.clone())
        .summary(Some(item.summary.clone()))
        .author(item.author.clone())
        .episode(item.episode.clone())
        .season(item.season.clone())
        .order(Some(item.sequence.clone()))
        .build();

    let enclosure = EnclosureBuilder::default()
        .url(item.enclosure.url.to_string())
        .length(item.enclosure.length.to_string())
        .mime_type(item.enclosure.mime_type.unwrap_or_default().to_string())
        .build();

    let guid = GuidBuilder::default()
        .value(item.guid.clone())
        .permalink(false)
        .build();

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .description(Some(item.summary.clone()))
        .guid(Some(guid))
        .pub_date(Some(item.pub_date.to_rfc2822()))
        .enclosure(Some(enclosure))
        .itunes_ext(Some(itunes))
        .build()
}

/// Build timestamp of a feed
///
/// The local wall-clock time is read as a time in `reference` and converted
/// to UTC. Ambiguous times resolve to the earlier instant; times that do not
/// exist in `reference` are taken as UTC.
pub fn reference_build_time(reference: Tz, local_now: NaiveDateTime) -> DateTime<Utc> {
    reference
        .from_local_datetime(&local_now)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local_now))
}
