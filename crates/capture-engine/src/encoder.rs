//! PNG encoding and output writing.

use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::{FrameBuffer, PixelFormat};

/// Encode a frame as an opaque RGB PNG. The alpha channel is dropped.
pub fn encode_png(frame: &FrameBuffer) -> CaptureResult<Vec<u8>> {
    frame.validate()?;
    let rgb = to_rgb8(frame);

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::encode(format!("PNG encoding failed: {e}")))?;

    tracing::debug!(
        width = frame.width,
        height = frame.height,
        bytes = png.len(),
        "encoded PNG"
    );
    Ok(png)
}

fn to_rgb8(frame: &FrameBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    match frame.format {
        PixelFormat::Bgra8 => {
            for row in frame.rows() {
                for px in row.chunks_exact(4) {
                    rgb.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }
    }
    rgb
}

/// Write PNG bytes to `path`, creating missing parent directories and
/// replacing any existing file.
///
/// A bare file name is written to the current directory.
pub fn write_png_file(path: &Path, png: &[u8]) -> CaptureResult<PathBuf> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir().map_err(|e| {
            CaptureError::file_save(format!("cannot resolve current directory: {e}"))
        })?,
    };

    if !parent.exists() {
        tracing::info!("creating directory {}", parent.display());
        std::fs::create_dir_all(&parent).map_err(|e| {
            CaptureError::file_save(format!("cannot create {}: {e}", parent.display()))
        })?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| CaptureError::file_save(format!("{} has no file name", path.display())))?;
    let target = parent.join(file_name);

    std::fs::write(&target, png)
        .map_err(|e| CaptureError::file_save(format!("cannot write {}: {e}", target.display())))?;

    tracing::info!("screenshot saved to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(png: &[u8]) -> image::RgbImage {
        image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .unwrap()
            .to_rgb8()
    }

    #[test]
    fn test_bgra_is_swizzled_and_alpha_ignored() {
        // One blue pixel then one red pixel, both fully transparent.
        let frame = FrameBuffer::bgra8(vec![255, 0, 0, 0, 0, 0, 255, 0], 2, 1, 8);
        let img = decode(&encode_png(&frame).unwrap());

        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_malformed_frame_is_a_save_failure() {
        let frame = FrameBuffer::bgra8(vec![0; 7], 2, 1, 8);
        let err = encode_png(&frame).unwrap_err();
        assert_eq!(
            err.code(),
            primeshot_common::error::ErrorCode::FileSaveFailed
        );
    }

    #[test]
    fn test_write_creates_parents_and_replaces() {
        let dir = std::env::temp_dir().join("primeshot_test_writer");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("a").join("b").join("shot.png");

        let first = write_png_file(&path, b"first").unwrap();
        assert_eq!(first, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        write_png_file(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_uncreatable_parent_is_a_save_failure() {
        let dir = std::env::temp_dir().join("primeshot_test_writer_blocked");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = write_png_file(&blocker.join("shot.png"), b"png").unwrap_err();
        assert_eq!(
            err.code(),
            primeshot_common::error::ErrorCode::FileSaveFailed
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    proptest! {
        #[test]
        fn prop_png_dimensions_match_frame(
            width in 1u32..24,
            height in 1u32..24,
            padding in 0usize..16,
            seed in any::<u8>(),
        ) {
            let stride = width as usize * 4 + padding;
            let data: Vec<u8> = (0..stride * height as usize)
                .map(|i| (i as u8).wrapping_add(seed))
                .collect();
            let frame = FrameBuffer::bgra8(data, width, height, stride);

            let img = decode(&encode_png(&frame).unwrap());
            prop_assert_eq!(img.dimensions(), (width, height));

            let last_row = frame.rows().last().unwrap();
            let last = img.get_pixel(width - 1, height - 1).0;
            let px = &last_row[last_row.len() - 4..];
            prop_assert_eq!(last, [px[2], px[1], px[0]]);
        }
    }
}
