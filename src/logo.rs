use std::path::Path;

use crate::error::ContextError;

/// A decoded logo, ready to be embedded as an image `XObject`.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    /// 8 bits per component RGB samples, row by row.
    pub rgb: Vec<u8>,
    /// 8 bits per sample alpha channel, only present when some pixel is not opaque.
    pub alpha: Option<Vec<u8>>,
}

impl Logo {
    /// Decodes a PNG or JPEG image.
    pub fn decode(image_bytes: &[u8]) -> Result<Self, ContextError> {
        let decoded_image = image::load_from_memory(image_bytes)
            .map_err(|error| ContextError::with_error("Unable to decode the logo image", &error))?;
        let rgba_image = decoded_image.to_rgba8();
        let (width, height) = rgba_image.dimensions();
        if width == 0 || height == 0 {
            return Err(ContextError::with_context("The logo image is empty"));
        }

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba_image.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }
        let is_opaque = alpha.iter().all(|sample| *sample == u8::MAX);

        Ok(Logo {
            width,
            height,
            rgb,
            alpha: if is_opaque { None } else { Some(alpha) },
        })
    }

    /// Reads and decodes the logo at the given path. A logo is optional decoration, so any
    /// failure is logged and reported as no logo at all.
    pub fn load_or_skip(logo_path: &Path) -> Option<Self> {
        let image_bytes = match std::fs::read(logo_path) {
            Ok(image_bytes) => image_bytes,
            Err(error) => {
                log::warn!("Unable to read the logo {:?}, falling back to text: {}", logo_path, error);
                return None;
            }
        };
        match Logo::decode(&image_bytes) {
            Ok(logo) => Some(logo),
            Err(error) => {
                log::warn!("Unable to use the logo {:?}, falling back to text: {}", logo_path, error);
                None
            }
        }
    }
}
