//! Per-task scratch storage handing an image to a detection backend
//!
//! Each task owns one uniquely named temporary file. The file is removed
//! when the handle drops, on every exit path: normal return, contained
//! backend failure, or unwind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// A scratch file holding one image for the duration of a detection task
pub struct ScratchImage {
    file: NamedTempFile,
}

impl ScratchImage {
    /// Write `bytes` to a fresh uniquely named scratch file
    ///
    /// The suffix is sniffed from the image content so backends that
    /// dispatch on extension see the right one; unrecognized content
    /// falls back to `.jpg`.
    pub fn write(bytes: &[u8]) -> Result<Self> {
        let suffix = match image::guess_format(bytes) {
            Ok(format) => match format.extensions_str().first() {
                Some(ext) => format!(".{}", ext),
                None => ".jpg".to_string(),
            },
            Err(_) => ".jpg".to_string(),
        };

        let mut file = tempfile::Builder::new()
            .prefix("detect-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        log::debug!("scratch image at {}", file.path().display());
        Ok(Self { file })
    }

    /// Path handed to the detection backend
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // Smallest valid PNG header, enough for format sniffing
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_scratch_holds_image_bytes() {
        let bytes = b"not really a jpeg";
        let scratch = ScratchImage::write(bytes).unwrap();

        let stored = std::fs::read(scratch.path()).unwrap();
        assert_eq!(stored, bytes);
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let scratch = ScratchImage::write(b"bytes").unwrap();
        let path: PathBuf = scratch.path().to_path_buf();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_suffix_sniffed_from_content() {
        let scratch = ScratchImage::write(PNG_MAGIC).unwrap();
        let path = scratch.path().to_string_lossy().to_string();
        assert!(path.ends_with(".png"), "unexpected scratch path {}", path);
    }

    #[test]
    fn test_unknown_content_falls_back_to_jpg() {
        let scratch = ScratchImage::write(b"\x00\x01\x02\x03").unwrap();
        let path = scratch.path().to_string_lossy().to_string();
        assert!(path.ends_with(".jpg"), "unexpected scratch path {}", path);
    }
}
