//! Technical properties of audio and video files.

use std::path::Path;

use filetrack_core::{ExtractorError, Metadata};

/// Read stream properties: `duration` (seconds), `bitrate` and
/// `audio_bitrate` (kbps), `sample_rate` (Hz), `channels`, `bit_depth`.
/// Properties the container does not report are omitted.
#[cfg(feature = "media")]
pub(super) fn read_tags(path: &Path) -> Result<Metadata, ExtractorError> {
    use lofty::file::AudioFile;

    let tagged = lofty::read_from_path(path).map_err(|err| ExtractorError::new(err.to_string()))?;
    let properties = tagged.properties();

    let mut metadata = Metadata::new();
    let duration = properties.duration();
    if !duration.is_zero() {
        metadata.insert("duration".to_string(), format!("{:.3}", duration.as_secs_f64()));
    }
    let numeric = [
        ("bitrate", properties.overall_bitrate()),
        ("audio_bitrate", properties.audio_bitrate()),
        ("sample_rate", properties.sample_rate()),
        ("channels", properties.channels().map(u32::from)),
        ("bit_depth", properties.bit_depth().map(u32::from)),
    ];
    for (key, value) in numeric {
        if let Some(value) = value {
            metadata.insert(key.to_string(), value.to_string());
        }
    }

    Ok(metadata)
}

#[cfg(not(feature = "media"))]
pub(super) fn read_tags(_path: &Path) -> Result<Metadata, ExtractorError> {
    Ok(Metadata::new())
}

#[cfg(all(test, feature = "media"))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_garbage_audio_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("song.mp3");
        fs::write(&path, [0u8; 16]).unwrap();

        assert!(read_tags(&path).is_err());
    }
}
