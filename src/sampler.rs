//! Downsampling of the source image to a bounded working resolution.

use image::{ImageBuffer, Rgba, RgbaImage, imageops::FilterType};

use crate::error::{Error, Result};

/// Longest side of the working sample.
pub const DEFAULT_MAX_SIDE: u32 = 200;

/// Anything that can hand out a decoded, row-major RGBA buffer.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// `width * height * 4` bytes, row-major RGBA.
    fn rgba(&self) -> &[u8];
}

/// Owned RGBA pixels, for callers that decode images themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Buffer filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat((width as usize) * (height as usize));
        Self::new(width, height, data)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }
}

impl PixelSource for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgba(&self) -> &[u8] {
        &self.data
    }
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn rgba(&self) -> &[u8] {
        self.as_raw()
    }
}

/// Output dimensions for a `w`×`h` image so the longest side is at most
/// `max_side`. Never upscales.
pub fn sample_dimensions(w: u32, h: u32, max_side: u32) -> (u32, u32) {
    let max_side = max_side.max(1) as f64;
    let scale = (max_side / w as f64).min(max_side / h as f64).min(1.0);
    let out_w = ((w as f64) * scale).floor().max(1.0) as u32;
    let out_h = ((h as f64) * scale).floor().max(1.0) as u32;
    (out_w, out_h)
}

fn length_mismatch(width: u32, height: u32) -> Error {
    Error::InvalidImage {
        width,
        height,
        reason: "pixel buffer length does not match dimensions",
    }
}

/// Bilinear downsample of `source` into a working buffer.
pub fn sample<S: PixelSource + ?Sized>(source: &S, max_side: u32) -> Result<RgbaImage> {
    let (w, h) = (source.width(), source.height());
    if w == 0 || h == 0 {
        return Err(Error::InvalidImage {
            width: w,
            height: h,
            reason: "zero dimension",
        });
    }

    let raw = source.rgba();
    if raw.len() as u64 != u64::from(w) * u64::from(h) * 4 {
        return Err(length_mismatch(w, h));
    }

    let (out_w, out_h) = sample_dimensions(w, h, max_side);
    if out_w == w && out_h == h {
        return RgbaImage::from_raw(w, h, raw.to_vec()).ok_or_else(|| length_mismatch(w, h));
    }

    let view: ImageBuffer<Rgba<u8>, &[u8]> =
        ImageBuffer::from_raw(w, h, raw).ok_or_else(|| length_mismatch(w, h))?;
    Ok(image::imageops::resize(&view, out_w, out_h, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downscales_longest_side_to_bound() {
        assert_eq!(sample_dimensions(1000, 500, 200), (200, 100));
        assert_eq!(sample_dimensions(300, 900, 200), (66, 200));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(sample_dimensions(50, 20, 200), (50, 20));
        assert_eq!(sample_dimensions(200, 200, 200), (200, 200));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(sample_dimensions(5000, 1, 200), (200, 1));
    }

    #[test]
    fn zero_width_is_invalid() {
        let buf = PixelBuffer::new(0, 10, Vec::new());
        assert!(matches!(
            sample(&buf, DEFAULT_MAX_SIDE),
            Err(Error::InvalidImage { width: 0, .. })
        ));
    }

    #[test]
    fn short_buffer_is_invalid() {
        let buf = PixelBuffer::new(4, 4, vec![0; 10]);
        assert!(matches!(
            sample(&buf, DEFAULT_MAX_SIDE),
            Err(Error::InvalidImage { .. })
        ));
    }

    #[test]
    fn resampled_buffer_preserves_flat_color() {
        let buf = PixelBuffer::filled(400, 300, [200, 40, 40, 255]);
        let out = sample(&buf, DEFAULT_MAX_SIDE).unwrap();
        assert_eq!(out.dimensions(), (200, 150));
        assert_eq!(out.get_pixel(10, 10).0, [200, 40, 40, 255]);
    }

    #[test]
    fn small_image_is_copied_verbatim() {
        let mut buf = PixelBuffer::filled(3, 2, [0, 0, 0, 255]);
        buf.put_pixel(2, 1, [9, 8, 7, 6]);
        let out = sample(&buf, DEFAULT_MAX_SIDE).unwrap();
        assert_eq!(out.as_raw(), buf.rgba());
    }
}
