//! EXIF metadata captured at decode time.
//!
//! Container handling (JPEG APP1, PNG `eXIf`, bare TIFF) and the IFD walk are
//! delegated to `kamadak-exif`. Only the Orientation tag of the primary image
//! is kept.
//!
//! Reading is best-effort. No EXIF, or EXIF the reader rejects, means no
//! metadata. A *present* Orientation field that is not an integer is kept as
//! unreadable, because metadata was there but unusable.

use exif::{In, Reader, Tag};
use std::fmt;
use std::io::Cursor;
use tracing::trace;

/// EXIF data extracted at decode time. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExifMetadata {
    orientation: Option<OrientationField>,
}

/// Orientation field as stored in the primary IFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrientationField {
    Integer(u32),
    /// Present, but with a non-integer value (kept as displayed by the reader).
    Unreadable(String),
}

/// Orientation field present but not an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableTag {
    pub value: String,
}

impl fmt::Display for UnreadableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orientation tag is not an integer: {}", self.value)
    }
}

impl ExifMetadata {
    pub fn with_orientation(code: u32) -> Self {
        Self {
            orientation: Some(OrientationField::Integer(code)),
        }
    }

    pub fn orientation_field(&self) -> Option<&OrientationField> {
        self.orientation.as_ref()
    }

    /// The orientation code, `Ok(None)` if the tag is absent.
    pub fn orientation(&self) -> Result<Option<u32>, UnreadableTag> {
        match &self.orientation {
            None => Ok(None),
            Some(OrientationField::Integer(v)) => Ok(Some(*v)),
            Some(OrientationField::Unreadable(value)) => Err(UnreadableTag {
                value: value.clone(),
            }),
        }
    }
}

/// Read EXIF metadata from raw container bytes.
pub fn read_exif(data: &[u8]) -> Option<ExifMetadata> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(e) => {
            trace!(error = %e, "no usable EXIF");
            return None;
        }
    };
    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .map(|field| match field.value.get_uint(0) {
            Some(code) => OrientationField::Integer(code),
            None => OrientationField::Unreadable(field.display_value().to_string()),
        });
    Some(ExifMetadata { orientation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{crc32, exif_tiff, jpeg_bytes, png_bytes, splice_jpeg_exif};

    #[test]
    fn big_endian_short() {
        let meta = read_exif(&exif_tiff(true, 3, &[0x00, 0x06, 0x00, 0x00])).unwrap();
        assert_eq!(meta.orientation(), Ok(Some(6)));
    }

    #[test]
    fn little_endian_short() {
        let meta = read_exif(&exif_tiff(false, 3, &[0x08, 0x00, 0x00, 0x00])).unwrap();
        assert_eq!(meta.orientation(), Ok(Some(8)));
    }

    #[test]
    fn long_type() {
        let meta = read_exif(&exif_tiff(true, 4, &[0x00, 0x00, 0x00, 0x03])).unwrap();
        assert_eq!(meta.orientation(), Ok(Some(3)));
    }

    #[test]
    fn ascii_orientation_is_unreadable() {
        let meta = read_exif(&exif_tiff(true, 2, b"6\0\0\0")).unwrap();
        assert!(matches!(
            meta.orientation_field(),
            Some(OrientationField::Unreadable(_))
        ));
        let err = meta.orientation().unwrap_err();
        assert!(err.to_string().starts_with("orientation tag is not an integer"));
        assert!(err.value.contains('6'));
    }

    #[test]
    fn ifd_without_orientation_is_absent() {
        // Big-endian header, IFD0 with one ImageWidth (0x0100) entry
        let mut tiff = b"MM\0\x2A\0\0\0\x08".to_vec();
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x01, 0x00, 0x00, 0x03, 0, 0, 0, 1, 0x00, 0x10, 0, 0]);
        tiff.extend_from_slice(&[0, 0, 0, 0]);
        let meta = read_exif(&tiff).unwrap();
        assert_eq!(meta.orientation(), Ok(None));
    }

    #[test]
    fn bad_tiff_magic_is_ignored() {
        assert_eq!(read_exif(b"MM\0\x2B\0\0\0\x08"), None);
        assert_eq!(read_exif(b"XX"), None);
    }

    #[test]
    fn read_from_jpeg_app1() {
        let tiff = exif_tiff(true, 3, &[0x00, 0x05, 0x00, 0x00]);
        let jpeg = splice_jpeg_exif(&jpeg_bytes(8, 8), &tiff);
        let meta = read_exif(&jpeg).unwrap();
        assert_eq!(meta.orientation(), Ok(Some(5)));
    }

    #[test]
    fn jpeg_without_exif_has_no_metadata() {
        assert_eq!(read_exif(&jpeg_bytes(8, 8)), None);
    }

    #[test]
    fn read_from_png_exif_chunk() {
        let tiff = exif_tiff(false, 3, &[0x02, 0x00, 0x00, 0x00]);
        let png = png_bytes(4, 4);
        // eXIf goes right after IHDR (8 signature + 25 IHDR chunk bytes)
        let mut chunk = b"eXIf".to_vec();
        chunk.extend_from_slice(&tiff);
        let mut out = png[..33].to_vec();
        out.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
        out.extend_from_slice(&chunk);
        out.extend_from_slice(&crc32(&chunk).to_be_bytes());
        out.extend_from_slice(&png[33..]);

        let meta = read_exif(&out).unwrap();
        assert_eq!(meta.orientation(), Ok(Some(2)));
    }

    #[test]
    fn bare_tiff_is_read_directly() {
        let tiff = exif_tiff(false, 3, &[0x07, 0x00, 0x00, 0x00]);
        assert_eq!(read_exif(&tiff).unwrap().orientation(), Ok(Some(7)));
    }

    #[test]
    fn unknown_container_has_no_metadata() {
        assert_eq!(read_exif(b"GIF89a\x01\x00\x01\x00"), None);
        assert_eq!(read_exif(&[]), None);
    }
}
