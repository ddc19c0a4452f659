//! Position- and saturation-weighted color histogram.

use image::RgbaImage;

use crate::color::{Hsl, Rgb};

/// Quantization step per channel.
const STEP: u8 = 16;
/// Levels per channel (0, 16, ..., 240).
const LEVELS: usize = 16;
const BIN_COUNT: usize = LEVELS * LEVELS * LEVELS;

const MIN_ALPHA: u8 = 128;
const MIN_LIGHTNESS: f64 = 5.0;
const MAX_LIGHTNESS: f64 = 95.0;
const MIN_SATURATION: f64 = 10.0;

/// Share of the weight lost at the image corners.
const EDGE_FALLOFF: f64 = 0.3;
/// Extra weight given to fully saturated pixels.
const SATURATION_BOOST: f64 = 0.5;

/// Quantized color bucket. Each channel is one of 16 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinKey(u16);

impl BinKey {
    pub fn from_rgb(c: Rgb) -> Self {
        let level = |v: u8| usize::from(quantize_channel(v) / STEP);
        Self((level(c.r) * LEVELS * LEVELS + level(c.g) * LEVELS + level(c.b)) as u16)
    }

    fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Representative color of the bucket.
    pub fn rgb(self) -> Rgb {
        let i = self.index();
        let channel = |level: usize| (level as u8) * STEP;
        Rgb::new(
            channel(i / (LEVELS * LEVELS)),
            channel((i / LEVELS) % LEVELS),
            channel(i % LEVELS),
        )
    }
}

/// Round to the nearest multiple of 16, saturating at 240.
pub fn quantize_channel(v: u8) -> u8 {
    let level = ((f64::from(v) / f64::from(STEP)).round() as usize).min(LEVELS - 1);
    (level as u8) * STEP
}

/// Fixed-size weight table indexed by [`BinKey`].
#[derive(Clone)]
pub struct WeightedBins {
    weights: Box<[f64; BIN_COUNT]>,
    occupied: usize,
}

impl Default for WeightedBins {
    fn default() -> Self {
        Self {
            weights: Box::new([0.0; BIN_COUNT]),
            occupied: 0,
        }
    }
}

impl std::fmt::Debug for WeightedBins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedBins")
            .field("occupied", &self.occupied)
            .finish()
    }
}

impl WeightedBins {
    pub fn add(&mut self, key: BinKey, weight: f64) {
        let slot = &mut self.weights[key.index()];
        if *slot == 0.0 {
            self.occupied += 1;
        }
        *slot += weight;
    }

    pub fn weight(&self, key: BinKey) -> f64 {
        self.weights[key.index()]
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Non-empty bins in key order.
    pub fn iter(&self) -> impl Iterator<Item = (BinKey, f64)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0.0)
            .map(|(i, &w)| (BinKey::from_index(i), w))
    }

    /// Non-empty bins by descending weight. Equal weights keep key order.
    pub fn ranked(&self) -> Vec<(BinKey, f64)> {
        let mut bins: Vec<_> = self.iter().collect();
        bins.sort_by(|a, b| b.1.total_cmp(&a.1));
        bins
    }
}

/// Weight of a pixel at `(x, y)` from its distance to the image center.
fn position_weight(x: u32, y: u32, width: u32, height: u32) -> f64 {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let distance = (f64::from(x) - cx).hypot(f64::from(y) - cy);
    let max_distance = cx.hypot(cy);
    1.0 - (distance / max_distance) * EDGE_FALLOFF
}

fn is_noise(hsl: &Hsl) -> bool {
    hsl.l < MIN_LIGHTNESS || hsl.l > MAX_LIGHTNESS || hsl.s < MIN_SATURATION
}

/// Bucket every opaque, chromatic pixel of `img`.
pub fn quantize(img: &RgbaImage) -> WeightedBins {
    let (width, height) = img.dimensions();
    let mut bins = WeightedBins::default();

    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a < MIN_ALPHA {
            continue;
        }

        let rgb = Rgb::new(r, g, b);
        let hsl = rgb.to_hsl();
        if is_noise(&hsl) {
            continue;
        }

        let saturation_weight = 1.0 + (hsl.s / 100.0) * SATURATION_BOOST;
        let weight = position_weight(x, y, width, height) * saturation_weight;
        bins.add(BinKey::from_rgb(rgb), weight);
    }

    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn channels_round_to_sixteen_and_clamp() {
        assert_eq!(quantize_channel(0), 0);
        assert_eq!(quantize_channel(7), 0);
        assert_eq!(quantize_channel(8), 16);
        assert_eq!(quantize_channel(100), 96);
        assert_eq!(quantize_channel(250), 240);
        assert_eq!(quantize_channel(255), 240);
    }

    #[test]
    fn bin_key_recovers_quantized_color() {
        let key = BinKey::from_rgb(Rgb::new(201, 33, 255));
        assert_eq!(key.rgb(), Rgb::new(208, 32, 240));
    }

    #[test]
    fn center_outweighs_corner() {
        assert!(position_weight(50, 50, 100, 100) > position_weight(0, 0, 100, 100));
        assert!((position_weight(0, 0, 100, 100) - 0.7).abs() < 1e-12);
        assert!((position_weight(50, 50, 100, 100) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn filters_transparent_gray_and_extremes() {
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([220, 30, 30, 255]));
        img.put_pixel(0, 0, Rgba([220, 30, 30, 10]));
        img.put_pixel(1, 0, Rgba([128, 128, 128, 255]));
        img.put_pixel(2, 0, Rgba([2, 2, 4, 255]));

        let bins = quantize(&img);
        assert_eq!(bins.len(), 1);
        let (key, _) = bins.iter().next().unwrap();
        assert_eq!(key.rgb(), Rgb::new(224, 32, 32));
    }

    #[test]
    fn saturated_pixels_weigh_more() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(0, 0, Rgba([150, 110, 110, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let ranked = quantize(&img).ranked();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.rgb(), Rgb::new(240, 0, 0));
    }

    #[test]
    fn saturation_boost_scales_weight() {
        let vivid = Rgb::new(255, 0, 0);
        let muted = Rgb::new(150, 110, 110);
        assert!(muted.to_hsl().s >= MIN_SATURATION);

        // a 1x1 image puts every pixel at the same distance from the center
        let single = |c: Rgb| {
            let img = RgbaImage::from_pixel(1, 1, Rgba([c.r, c.g, c.b, 255]));
            quantize(&img).weight(BinKey::from_rgb(c))
        };
        let boost = |c: Rgb| 1.0 + c.to_hsl().s / 100.0 * SATURATION_BOOST;

        assert!((single(vivid) - position_weight(0, 0, 1, 1) * 1.5).abs() < 1e-9);
        let ratio = single(vivid) / single(muted);
        assert!((ratio - boost(vivid) / boost(muted)).abs() < 1e-9);
        assert!(ratio > 1.0);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let mut bins = WeightedBins::default();
        bins.add(BinKey::from_rgb(Rgb::new(0, 0, 200)), 1.0);
        bins.add(BinKey::from_rgb(Rgb::new(200, 0, 0)), 1.0);
        bins.add(BinKey::from_rgb(Rgb::new(0, 200, 0)), 2.0);
        let keys: Vec<_> = bins.ranked().into_iter().map(|(k, _)| k.rgb()).collect();
        assert_eq!(
            keys,
            vec![Rgb::new(0, 208, 0), Rgb::new(0, 0, 208), Rgb::new(208, 0, 0)]
        );
    }

    #[test]
    fn fully_gray_image_yields_no_bins() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([120, 125, 122, 255]));
        assert!(quantize(&img).is_empty());
    }
}
