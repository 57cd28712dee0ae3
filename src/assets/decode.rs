use std::sync::Arc;

use crate::foundation::{error::ResourceLoadError, math::Fnv1a64};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster in premultiplied RGBA8 form.
pub struct Bitmap {
    /// Content hash, stable for identical pixels and dimensions.
    pub key: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap premultiplied pixels, or `None` when the buffer does not match the dimensions.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba8_premul.len() != expected {
            return None;
        }
        let mut h = Fnv1a64::new_default();
        h.write_u64(u64::from(width));
        h.write_u64(u64::from(height));
        h.write_bytes(&rgba8_premul);
        Some(Self {
            key: h.finish(),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Single-color bitmap; handy for placeholders and fixtures.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> Self {
        let px = premul.repeat((width as usize) * (height as usize));
        let mut h = Fnv1a64::new_default();
        h.write_u64(u64::from(width));
        h.write_u64(u64::from(height));
        h.write_bytes(&px);
        Self {
            key: h.finish(),
            width,
            height,
            rgba8_premul: Arc::new(px),
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied [`Bitmap`].
pub fn decode_image(source: &str, bytes: &[u8]) -> Result<Bitmap, ResourceLoadError> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| ResourceLoadError::Decode {
        source_id: source.to_string(),
        message: e.to_string(),
    })?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Bitmap::from_premul(width, height, rgba8_premul).ok_or_else(|| ResourceLoadError::Decode {
        source_id: source.to_string(),
        message: "decoded buffer does not match image dimensions".to_string(),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
