// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Separator between the positional fields of a history line
pub const FIELD_DELIMITER: char = '|';

/// Number of positional fields in a history line
pub const FIELD_COUNT: usize = 18;

/// One line of the download history
///
/// Fields appear in the log in declaration order. The file path is not
/// checked for existence here; a record may describe a file that has since
/// been deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub pid: String,
    pub name: String,
    pub episode: String,
    pub kind: String,
    /// Seconds since the Unix epoch, 0 when the field was absent or not numeric
    pub time_added: i64,
    pub mode: String,
    pub filename: PathBuf,
    pub versions: String,
    pub duration: String,
    pub description: String,
    pub channel: String,
    pub categories: String,
    pub thumbnail: String,
    pub guidance: String,
    /// Programme page URL, used as the feed GUID
    pub web: String,
    pub episode_number: String,
    pub series_number: String,
    pub tail: String,
}

impl EpisodeRecord {
    /// Parse a single history line
    ///
    /// Never fails: missing trailing fields become empty strings and fields
    /// past the last known one are ignored.
    pub fn parse_line(line: &str) -> Self {
        let mut fields = line.split(FIELD_DELIMITER);
        let mut next = || fields.next().unwrap_or_default().to_string();

        Self {
            pid: next(),
            name: next(),
            episode: next(),
            kind: next(),
            time_added: parse_timestamp(&next()),
            mode: next(),
            filename: PathBuf::from(next()),
            versions: next(),
            duration: next(),
            description: next(),
            channel: next(),
            categories: next(),
            thumbnail: next(),
            guidance: next(),
            web: next(),
            episode_number: next(),
            series_number: next(),
            tail: next(),
        }
    }

    /// The time the episode was added, in UTC
    pub fn added_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.time_added, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

fn parse_timestamp(field: &str) -> i64 {
    field.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_LINE: &str = "b0abc123|Only Connect|Series 5: Episode 7|tv|1700000000|\
        hlshd1|/media/iplayer/Only_Connect.m4a|default|1800|Quiz show|BBC Four|\
        Quiz,Comedy|https://example.com/thumb.jpg|0|https://example.com/b0abc123|7|5|";

    #[test]
    fn parse_line_reads_all_fields_positionally() {
        assert_eq!(FULL_LINE.split(FIELD_DELIMITER).count(), FIELD_COUNT);

        let record = EpisodeRecord::parse_line(FULL_LINE);

        assert_eq!(record.pid, "b0abc123");
        assert_eq!(record.name, "Only Connect");
        assert_eq!(record.episode, "Series 5: Episode 7");
        assert_eq!(record.kind, "tv");
        assert_eq!(record.time_added, 1_700_000_000);
        assert_eq!(record.mode, "hlshd1");
        assert_eq!(
            record.filename,
            PathBuf::from("/media/iplayer/Only_Connect.m4a")
        );
        assert_eq!(record.versions, "default");
        assert_eq!(record.duration, "1800");
        assert_eq!(record.description, "Quiz show");
        assert_eq!(record.channel, "BBC Four");
        assert_eq!(record.categories, "Quiz,Comedy");
        assert_eq!(record.thumbnail, "https://example.com/thumb.jpg");
        assert_eq!(record.guidance, "0");
        assert_eq!(record.web, "https://example.com/b0abc123");
        assert_eq!(record.episode_number, "7");
        assert_eq!(record.series_number, "5");
        assert_eq!(record.tail, "");
    }

    #[test]
    fn parse_line_tolerates_missing_trailing_fields() {
        let record = EpisodeRecord::parse_line("pid1|The Archers|Omnibus");

        assert_eq!(record.name, "The Archers");
        assert_eq!(record.episode, "Omnibus");
        assert_eq!(record.time_added, 0);
        assert_eq!(record.filename, PathBuf::new());
        assert_eq!(record.web, "");
        assert_eq!(record.series_number, "");
    }

    #[test]
    fn parse_line_ignores_extra_fields() {
        let line = format!("{FULL_LINE}extra|more");
        let record = EpisodeRecord::parse_line(&line);

        assert_eq!(record.tail, "extra");
        assert_eq!(record.series_number, "5");
    }

    #[test]
    fn non_numeric_time_added_defaults_to_epoch() {
        let record = EpisodeRecord::parse_line("pid|Name|Ep|radio|yesterday|");
        assert_eq!(record.time_added, 0);
        assert_eq!(record.added_at(), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn padded_time_added_is_accepted() {
        let record = EpisodeRecord::parse_line("pid|Name|Ep|radio| 1700000000 |");
        assert_eq!(record.time_added, 1_700_000_000);
    }

    #[test]
    fn added_at_converts_epoch_seconds() {
        let record = EpisodeRecord::parse_line(FULL_LINE);
        assert_eq!(
            record.added_at().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn empty_line_yields_empty_record() {
        let record = EpisodeRecord::parse_line("");
        assert_eq!(record, EpisodeRecord::default());
    }
}
