//! Filename-based content classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::ContentType;

static VIDEO_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(mp4|mkv|avi|mov|m4v|wmv|webm|flv)$").expect("valid video pattern")
});

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(s\d{1,2}e\d{1,2}|season\s*\d+)").expect("valid episode pattern")
});

/// Classify a file by name.
///
/// A video container whose name also carries a season/episode marker is a
/// [`ContentType::TvShow`]; any other video container is a
/// [`ContentType::Movie`]; everything else is [`ContentType::Other`].
pub fn classify(name: &str) -> ContentType {
    if !VIDEO_CONTAINER.is_match(name) {
        return ContentType::Other;
    }
    if EPISODE_MARKER.is_match(name) {
        ContentType::TvShow
    } else {
        ContentType::Movie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tv_show() {
        assert_eq!(classify("Show.S01E02.mkv"), ContentType::TvShow);
        assert_eq!(classify("show s1e9 720p.mp4"), ContentType::TvShow);
        assert_eq!(classify("Drama Season 3 Finale.AVI"), ContentType::TvShow);
        assert_eq!(classify("drama season3.mov"), ContentType::TvShow);
    }

    #[test]
    fn test_movie() {
        assert_eq!(classify("Movie.2020.mp4"), ContentType::Movie);
        assert_eq!(classify("HOME_VIDEO.MKV"), ContentType::Movie);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("notes.txt"), ContentType::Other);
        assert_eq!(classify("Show.S01E02.srt"), ContentType::Other);
        assert_eq!(classify("mp4"), ContentType::Other);
        assert_eq!(classify(""), ContentType::Other);
    }

    #[test]
    fn test_deterministic() {
        for name in ["Show.S01E02.mkv", "Movie.2020.mp4", "notes.txt"] {
            assert_eq!(classify(name), classify(name));
        }
    }
}
