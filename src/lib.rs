//! Cover-art driven gradient backgrounds for lyric cards.
//!
//! Given decoded RGBA pixels, the engine picks a small, diverse palette and
//! turns it into a two-layer gradient description:
//!
//! 1. downsample to at most 200px on the long side
//! 2. bucket pixels into a position/saturation weighted histogram
//! 3. greedily select diverse colors, with k-means and complement fallbacks
//! 4. harmonize saturation, lightness and hue around the dominant color
//! 5. choose linear (with angle) or radial geometry
//! 6. emit the primary gradient plus a soft accent layer
//!
//! ```no_run
//! use cover_gradient::{ExtractOptions, extract_gradient};
//!
//! let img = image::open("cover.jpg").unwrap().to_rgba8();
//! let gradient = extract_gradient(&img, &ExtractOptions::default()).unwrap();
//! let layers = gradient.to_layers();
//! println!("--g-linear: {};\n--g-radial: {};", layers.primary, layers.accent);
//! ```

use wasm_bindgen::prelude::*;
use js_sys::{Array, Object, Reflect};

pub mod color;
pub mod direction;
mod engine;
pub mod error;
pub mod fallback;
pub mod gradient;
pub mod harmonize;
pub mod quantize;
pub mod sampler;
pub mod select;

pub use color::{FALLBACK_PALETTE, Hsl, Palette, PaletteEntry, Rgb};
pub use direction::{Anchor, GradientKind};
pub use engine::{
    ExtractOptions, Extraction, extract, extract_gradient, extract_palette, gradient_for_palette,
    gradient_from_colors,
};
pub use error::{Error, Result};
pub use gradient::{AccentLayer, GradientDescription, GradientLayers};
pub use sampler::{PixelBuffer, PixelSource};

/// Decode an encoded image (PNG, JPEG, ...) and run the full pipeline on it.
pub fn extract_bytes(input: &[u8], options: &ExtractOptions) -> Result<Extraction> {
    let img = image::load_from_memory(input)?;
    extract(&img.to_rgba8(), options)
}

/// Build the card gradient for an encoded cover image.
///
/// Returns a JS object `{ primary, accent, palette }` where `primary` and
/// `accent` are the CSS layer strings and `palette` holds the stop colors as
/// `RRGGBB` hex strings.
#[wasm_bindgen(js_name = extractGradient)]
pub fn extract_gradient_js(input: Vec<u8>, color_count: usize) -> std::result::Result<Object, JsValue> {
    let extraction = extract_bytes(&input, &ExtractOptions::with_color_count(color_count))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    gradient_to_js(&extraction.gradient)
}

/// Like [`extract_gradient_js`] but for a caller-supplied hex palette.
#[wasm_bindgen(js_name = gradientFromPalette)]
pub fn gradient_from_palette_js(palette: Array) -> std::result::Result<Object, JsValue> {
    let mut colors = Vec::new();
    for val in palette.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
        colors.push(Rgb::from_hex(&s).map_err(|e| JsValue::from_str(&e.to_string()))?);
    }
    let options = ExtractOptions::with_color_count(colors.len().max(1));
    gradient_to_js(&gradient_from_colors(&colors, &options))
}

fn gradient_to_js(gradient: &GradientDescription) -> std::result::Result<Object, JsValue> {
    let layers = gradient.to_layers();

    let palette_js = Array::new();
    for c in &gradient.stops {
        palette_js.push(&JsValue::from_str(&c.to_hex()));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("primary"), &JsValue::from_str(&layers.primary))?;
    Reflect::set(&result, &JsValue::from_str("accent"), &JsValue::from_str(&layers.accent))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;

    Ok(result)
}
