//! Decoding and caching of symbol images.
//!
//! Decoding happens off the render thread through [`decode_symbol`]; the
//! renderer only ever looks images up in [`SymbolImages`].

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to decode image {src}: {source}")]
    Decode {
        src: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decode the image at `src` into RGBA pixels ready for drawing.
///
/// The natural size is the returned image's `width` and `height`.
pub fn decode_symbol(src: &str) -> Result<peniko::ImageData, ImageLoadError> {
    let decoded = image::open(src).map_err(|source| ImageLoadError::Decode {
        src: src.to_string(),
        source,
    })?;
    Ok(to_image_data(decoded))
}

fn to_image_data(decoded: image::DynamicImage) -> peniko::ImageData {
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    peniko::ImageData {
        data: peniko::Blob::new(Arc::new(rgba.into_vec())),
        format: peniko::ImageFormat::Rgba8,
        width,
        height,
        alpha_type: peniko::ImageAlphaType::Alpha,
    }
}

/// Decoded symbol images keyed by source path.
///
/// A failed decode is stored as `None` so the source is never requested
/// again; the symbol is then drawn without its image.
#[derive(Default)]
pub struct SymbolImages {
    cache: HashMap<String, Option<peniko::ImageData>>,
}

impl SymbolImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome of decoding `src`.
    pub fn insert(&mut self, src: impl Into<String>, image: Option<peniko::ImageData>) {
        self.cache.insert(src.into(), image);
    }

    /// The decoded image for `src`, if it loaded.
    pub fn get(&self, src: &str) -> Option<&peniko::ImageData> {
        self.cache.get(src).and_then(Option::as_ref)
    }

    /// Whether `src` has been loaded or has failed to load.
    pub fn is_cached(&self, src: &str) -> bool {
        self.cache.contains_key(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reports_natural_size() {
        let path = std::env::temp_dir().join(format!("wellpad-decode-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let decoded = decode_symbol(&path.to_string_lossy());
        std::fs::remove_file(&path).ok();

        let data = decoded.unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.data.data().len(), 4 * 2 * 4);
    }

    #[test]
    fn test_decode_missing_file() {
        assert!(decode_symbol("/no/such/symbol.png").is_err());
    }

    #[test]
    fn test_lookup_only() {
        let mut images = SymbolImages::new();
        assert!(images.get("tank.png").is_none());
        assert!(!images.is_cached("tank.png"));

        images.insert("broken.png", None);
        assert!(images.is_cached("broken.png"));
        assert!(images.get("broken.png").is_none());
    }
}
