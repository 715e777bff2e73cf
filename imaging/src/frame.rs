//! Frame primitives and the frame sampler.
//!
//! Camera frames are kept as tightly packed RGB buffers (`Frame`). The sampler
//! turns a frame into a JPEG still wrapped in a `data:` URI (`StillImage`),
//! which is the form both the analysis client and the history log keep.
//!
//! History thumbnails go the other way: the data URI is decoded back into a
//! `Frame` and downscaled before it is uploaded as a texture.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{RgbImage, codecs::jpeg::JpegEncoder};

use crate::Size;

/// Quality factor used for sampled stills unless configured otherwise.
pub const DEFAULT_JPEG_QUALITY: u8 = 50;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("not a base64 image data URI")]
    NotDataUri,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Owned RGB frame (no alpha).
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build a frame from packed RGB bytes.
    ///
    /// Returns `None` when the buffer does not hold exactly `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, bytes).map(Self::new)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::from_pixels(self.width(), self.height())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Snapshot this frame into a JPEG still at its native resolution.
    ///
    /// A frame that has not been decoded yet (zero width or height) yields
    /// `None`, as does an encoder failure. Neither is treated as an error by
    /// callers; the cycle simply produces no image.
    pub fn sample(&self, quality: u8) -> Option<StillImage> {
        if self.width() == 0 || self.height() == 0 {
            tracing::debug!("frame not decoded yet; skipping sample");
            return None;
        }

        let mut jpeg = Vec::new();
        let encoded = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(&self.image);
        if let Err(err) = encoded {
            tracing::debug!(error = %err, "jpeg encode failed");
            return None;
        }

        let mut data_uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
        data_uri.push_str(JPEG_DATA_URI_PREFIX);
        BASE64.encode_string(&jpeg, &mut data_uri);

        Some(StillImage {
            data_uri,
            width: self.width(),
            height: self.height(),
        })
    }

    /// Downscale to at most `max_height` rows, preserving aspect ratio.
    ///
    /// Uses `fast_image_resize` (SIMD-optimized). Frames that already fit are
    /// returned as-is.
    pub fn thumbnail(&self, max_height: u32) -> Frame {
        let max_height = max_height.max(1);
        if self.height() <= max_height || self.width() == 0 {
            return self.clone();
        }

        let height = max_height;
        let width = ((self.width() as u64 * height as u64) / self.height() as u64).max(1) as u32;

        let src = match fast_image_resize::images::ImageRef::new(
            self.width(),
            self.height(),
            self.as_bytes(),
            fast_image_resize::PixelType::U8x3,
        ) {
            Ok(src) => src,
            Err(err) => {
                tracing::debug!(error = %err, "thumbnail source rejected");
                return self.clone();
            }
        };

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Convolution(fast_image_resize::FilterType::Bilinear),
        );

        if let Err(err) = resizer.resize(&src, &mut dst, &options) {
            tracing::debug!(error = %err, "thumbnail resize failed");
            return self.clone();
        }

        Frame::from_rgb(width, height, dst.into_vec()).unwrap_or_else(|| self.clone())
    }
}

/// Encoded still image in `data:` URI form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

impl StillImage {
    /// Decode any base64 image data URI (jpeg or png) back into a frame.
    pub fn decode(data_uri: &str) -> Result<Frame, ImageError> {
        let payload = data_uri
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or(ImageError::NotDataUri)?;

        let bytes = BASE64.decode(payload)?;
        let image = image::load_from_memory(&bytes)?.to_rgb8();
        Ok(Frame::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let image = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        Frame::new(image)
    }

    #[test]
    fn sample_produces_jpeg_data_uri_at_native_size() {
        let still = gradient(64, 48).sample(DEFAULT_JPEG_QUALITY).unwrap();
        assert!(still.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!((still.width, still.height), (64, 48));

        let decoded = StillImage::decode(&still.data_uri).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn sample_skips_undecoded_frame() {
        let empty = Frame::new(RgbImage::new(0, 0));
        assert!(empty.sample(DEFAULT_JPEG_QUALITY).is_none());
    }

    #[test]
    fn decode_rejects_plain_text() {
        assert!(matches!(StillImage::decode("hello"), Err(ImageError::NotDataUri)));
        assert!(matches!(
            StillImage::decode("data:image/png;base64,@@@"),
            Err(ImageError::Base64(_))
        ));
    }

    #[test]
    fn thumbnail_preserves_aspect() {
        let thumb = gradient(320, 160).thumbnail(40);
        assert_eq!((thumb.width(), thumb.height()), (80, 40));

        let small = gradient(20, 10).thumbnail(40);
        assert_eq!((small.width(), small.height()), (20, 10));
    }

    #[test]
    fn from_rgb_checks_buffer_length() {
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_some());
        assert!(Frame::from_rgb(2, 2, vec![0; 11]).is_none());
    }
}
