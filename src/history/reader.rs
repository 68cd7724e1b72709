// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::HistoryError;

use super::record::EpisodeRecord;

/// Lazy reader over a download history file
///
/// Yields one record per non-blank line. Individual rows never fail; only
/// I/O errors on the underlying reader are surfaced, after which the reader
/// is exhausted.
pub struct HistoryReader<R> {
    path: PathBuf,
    reader: R,
    buf: Vec<u8>,
    finished: bool,
}

impl HistoryReader<BufReader<File>> {
    /// Open the history file at `path`
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let file = File::open(path).map_err(|e| HistoryError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self::from_reader(BufReader::new(file), path))
    }
}

impl<R: BufRead> HistoryReader<R> {
    /// Wrap an already opened reader; `path` is only used for error context
    pub fn from_reader(reader: R, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            buf: Vec::new(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for HistoryReader<R> {
    type Item = Result<EpisodeRecord, HistoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buf.clear();

            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    let line = line.trim_end_matches(['\n', '\r']);

                    if line.trim().is_empty() {
                        continue;
                    }

                    return Some(Ok(EpisodeRecord::parse_line(line)));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(HistoryError::Read {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
            }
        }

        None
    }
}

/// Read every record of the history file at `path`
pub fn read_history(path: &Path) -> Result<Vec<EpisodeRecord>, HistoryError> {
    HistoryReader::open(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use tempfile::tempdir;

    fn read_all(input: &[u8]) -> Vec<EpisodeRecord> {
        HistoryReader::from_reader(Cursor::new(input.to_vec()), Path::new("history"))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn reads_one_record_per_line() {
        let records = read_all(b"p1|Show A|Ep 1|radio|100|\np2|Show B|Ep 2|radio|200|\n");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Show A");
        assert_eq!(records[1].name, "Show B");
        assert_eq!(records[1].time_added, 200);
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let records = read_all(b"p1|Show A|Ep 1|radio|100|\np2|Show B");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Show B");
    }

    #[test]
    fn skips_blank_lines() {
        let records = read_all(b"\np1|Show A\n   \n\np2|Show B\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn strips_carriage_returns() {
        let records = read_all(b"p1|Show A|Ep|radio|100|mode|/tmp/a.mp3\r\n");
        assert_eq!(records[0].filename, PathBuf::from("/tmp/a.mp3"));
    }

    #[test]
    fn malformed_rows_do_not_stop_the_read() {
        let records = read_all(b"garbage\np1|Show A|Ep|radio|not-a-time|\np2|Show B|Ep|radio|5|\n");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].pid, "garbage");
        assert_eq!(records[1].time_added, 0);
        assert_eq!(records[2].time_added, 5);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let records = read_all(b"p1|Caf\xe9 Society|Ep|radio|100|\n");
        assert_eq!(records[0].name, "Caf\u{fffd} Society");
        assert_eq!(records[0].time_added, 100);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = HistoryReader::open(&dir.path().join("missing"));
        assert!(matches!(result, Err(HistoryError::Open { .. })));
    }

    #[test]
    fn read_history_collects_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("download_history");
        let contents = "p1|Show A|Ep 1|radio|100|\np2|Show B|Ep 2|radio|200|\n";
        std::fs::write(&path, contents).unwrap();

        let records = read_history(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pid, "p1");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_error_is_reported_once() {
        let mut reader =
            HistoryReader::from_reader(BufReader::new(FailingReader), Path::new("history"));

        assert!(matches!(reader.next(), Some(Err(HistoryError::Read { .. }))));
        assert!(reader.next().is_none());
    }
}
