// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::TagError;

/// Source of descriptive text embedded in audio files
pub trait TagReader {
    /// Read the episode summary stored in the file's tags, if any
    fn read_summary(&self, path: &Path) -> Result<Option<String>, TagError>;
}

/// Reads the lyrics atom (`©lyr`) of MP4 audio files
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp4TagReader;

impl TagReader for Mp4TagReader {
    fn read_summary(&self, path: &Path) -> Result<Option<String>, TagError> {
        let tag = mp4ameta::Tag::read_from_path(path).map_err(|e| TagError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(tag.lyrics().map(String::from))
    }
}

/// A tag reader that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTags;

impl TagReader for NoTags {
    fn read_summary(&self, _path: &Path) -> Result<Option<String>, TagError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn mp4_reader_fails_on_non_mp4_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not-really.m4a");
        std::fs::write(&path, b"definitely not an mp4 container").unwrap();

        assert!(Mp4TagReader.read_summary(&path).is_err());
    }

    #[test]
    fn mp4_reader_fails_on_missing_file() {
        let dir = tempdir().unwrap();
        assert!(Mp4TagReader.read_summary(&dir.path().join("missing.m4a")).is_err());
    }

    #[test]
    fn no_tags_returns_none() {
        assert_eq!(NoTags.read_summary(Path::new("/any.m4a")).unwrap(), None);
    }
}
