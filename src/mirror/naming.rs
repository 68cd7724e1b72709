use std::path::{Component, Path};

/// Extension of the feed document written next to each mirror directory
pub const FEED_EXTENSION: &str = "rss";

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | ':' | '/')
}

/// Directory name used for a programme's mirror
///
/// Every run of spaces, colons and slashes collapses into one underscore.
pub fn mirror_dir_name(programme: &str) -> String {
    let mut result = String::with_capacity(programme.len());
    let mut last_was_separator = false;

    for c in programme.chars() {
        if is_separator(c) {
            if !last_was_separator {
                result.push('_');
                last_was_separator = true;
            }
        } else {
            result.push(c);
            last_was_separator = false;
        }
    }

    result
}

/// Whether `name` names a single ordinary entry inside a directory
///
/// `.`, `..` and the empty string refer to the directory itself or its
/// parent and are rejected.
pub fn is_plain_entry_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// File name of a programme's feed document
pub fn feed_file_name(programme: &str) -> String {
    format!("{}.{}", mirror_dir_name(programme), FEED_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_colon_and_space_run() {
        assert_eq!(mirror_dir_name("Only Connect: Series 5"), "Only_Connect_Series_5");
    }

    #[test]
    fn replaces_single_space() {
        assert_eq!(mirror_dir_name("The Archers"), "The_Archers");
    }

    #[test]
    fn collapses_mixed_separators() {
        assert_eq!(mirror_dir_name("a / b :: c"), "a_b_c");
    }

    #[test]
    fn keeps_leading_and_trailing_runs() {
        assert_eq!(mirror_dir_name(" /News/ "), "_News_");
    }

    #[test]
    fn leaves_other_punctuation_alone() {
        assert_eq!(mirror_dir_name("Stop-Start (Radio 4)"), "Stop-Start_(Radio_4)");
    }

    #[test]
    fn preserves_non_ascii() {
        assert_eq!(mirror_dir_name("Café Society"), "Café_Society");
    }

    #[test]
    fn dot_names_are_not_plain_entries() {
        assert_eq!(mirror_dir_name("."), ".");
        assert!(!is_plain_entry_name("."));
        assert!(!is_plain_entry_name(".."));
        assert!(!is_plain_entry_name(""));
    }

    #[test]
    fn ordinary_names_are_plain_entries() {
        assert!(is_plain_entry_name("Only_Connect"));
        assert!(is_plain_entry_name("..."));
        assert!(is_plain_entry_name(".hidden"));
        assert!(is_plain_entry_name("_News_"));
    }

    #[test]
    fn feed_name_uses_mirror_name() {
        assert_eq!(feed_file_name("Only Connect: Series 5"), "Only_Connect_Series_5.rss");
    }
}
