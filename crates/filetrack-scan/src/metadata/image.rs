//! EXIF tags from image files.

use std::path::Path;

use filetrack_core::{ExtractorError, Metadata};

/// Read the primary image's EXIF fields.
///
/// Known tags are keyed by name (`Make`, `DateTimeOriginal`); tags the
/// decoder does not know are keyed by their numeric id.
#[cfg(feature = "exif")]
pub(super) fn read_exif(path: &Path) -> Result<Metadata, ExtractorError> {
    use std::fs::File;
    use std::io::BufReader;

    let mut reader = BufReader::new(File::open(path)?);
    let exif = exif::Reader::new()
        .read_from_container(&mut reader)
        .map_err(|err| ExtractorError::new(err.to_string()))?;

    let metadata = exif
        .fields()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .map(|field| {
            let key = match field.tag.description() {
                Some(_) => field.tag.to_string(),
                None => field.tag.number().to_string(),
            };
            let value = field.display_value().with_unit(&exif).to_string();
            (key, value)
        })
        .collect();

    Ok(metadata)
}

#[cfg(not(feature = "exif"))]
pub(super) fn read_exif(_path: &Path) -> Result<Metadata, ExtractorError> {
    Ok(Metadata::new())
}

/// A minimal JPEG whose EXIF block has `Make = "Canon"` and tag 0xBEEF = 7
/// in the primary IFD, and `Model = "Thumb"` in the thumbnail IFD.
#[cfg(all(test, feature = "exif"))]
pub(super) fn jpeg_with_exif() -> Vec<u8> {
    fn entry(tiff: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32) {
        tiff.extend_from_slice(&tag.to_le_bytes());
        tiff.extend_from_slice(&kind.to_le_bytes());
        tiff.extend_from_slice(&count.to_le_bytes());
        tiff.extend_from_slice(&value.to_le_bytes());
    }
    const ASCII: u16 = 2;
    const SHORT: u16 = 3;

    let mut tiff = b"II\x2a\x00".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 at 8: two entries, next IFD at 44, "Canon" stored at 38.
    tiff.extend_from_slice(&2u16.to_le_bytes());
    entry(&mut tiff, 0x010f, ASCII, 6, 38);
    entry(&mut tiff, 0xbeef, SHORT, 1, 7);
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(b"Canon\0");
    // IFD1 at 44: one entry, "Thumb" stored at 62.
    tiff.extend_from_slice(&1u16.to_le_bytes());
    entry(&mut tiff, 0x0110, ASCII, 6, 62);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(b"Thumb\0");

    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}
