//! Image placement helpers.

use kurbo::{Rect, Size};
use std::io::Cursor;

/// Intrinsic pixel size of an encoded image, without decoding pixel data.
pub fn image_size(bytes: &[u8]) -> Option<Size> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    match reader.into_dimensions() {
        Ok((w, h)) if w > 0 && h > 0 => Some(Size::new(w as f64, h as f64)),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Could not read image dimensions: {}", e);
            None
        }
    }
}

/// Largest rectangle with the aspect ratio of `source` that fits inside
/// `bounds`, centred in it.
pub fn contain_rect(source: Size, bounds: Rect) -> Rect {
    if source.width <= 0.0 || source.height <= 0.0 || bounds.height() <= 0.0 {
        return bounds;
    }
    let aspect = source.width / source.height;
    let target_aspect = bounds.width() / bounds.height();

    let size = if aspect > target_aspect {
        // Wider than the box: fit to width.
        Size::new(bounds.width(), bounds.width() / aspect)
    } else {
        Size::new(bounds.height() * aspect, bounds.height())
    };
    Rect::from_center_size(bounds.center(), size)
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode test png");
    out.into_inner()
}
