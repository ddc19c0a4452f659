//! Secondary palette generator consulted when the weighted histogram cannot
//! fill the palette on its own.

use std::collections::HashSet;

use image::RgbaImage;
use kmeans_colors::{Sort, get_kmeans};
use palette::{IntoColor, Lab, LinSrgb, Srgb};
use tracing::debug;

use crate::color::Rgb;

/// Upper bound on clusters; k-means indices are stored as `u8`.
const MAX_CLUSTERS: usize = 32;
const MIN_ALPHA: u8 = 128;

/// Produces up to `count` representative colors of an image, most prominent first.
pub trait PaletteSource {
    fn palette(&self, img: &RgbaImage, count: usize) -> Vec<Rgb>;
}

/// k-means in Lab space with a fixed seed, so repeated runs agree.
#[derive(Debug, Clone)]
pub struct KmeansPalette {
    pub max_iter: usize,
    pub converge: f32,
    pub seed: u64,
}

impl Default for KmeansPalette {
    fn default() -> Self {
        Self {
            max_iter: 20,
            converge: 1e-4,
            seed: 0,
        }
    }
}

impl PaletteSource for KmeansPalette {
    fn palette(&self, img: &RgbaImage, count: usize) -> Vec<Rgb> {
        let mut distinct = HashSet::new();
        let mut lab_pixels: Vec<Lab> = Vec::new();
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            if a < MIN_ALPHA {
                continue;
            }
            distinct.insert([r, g, b]);
            let linear: LinSrgb<f32> = Srgb::<u8>::new(r, g, b).into_format::<f32>().into_linear();
            lab_pixels.push(linear.into_color());
        }

        // k-means++ seeding needs at least k distinct points
        let k = count.min(distinct.len()).min(MAX_CLUSTERS);
        if k == 0 {
            return Vec::new();
        }
        if distinct.len() == 1 {
            return distinct.into_iter().map(|[r, g, b]| Rgb::new(r, g, b)).collect();
        }

        let kmeans = get_kmeans(k, self.max_iter, self.converge, false, &lab_pixels, self.seed);
        let mut clusters = Lab::sort_indexed_colors(&kmeans.centroids, &kmeans.indices);
        clusters.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        debug!(k, score = kmeans.score, "k-means palette");

        clusters
            .iter()
            .map(|c| {
                let linear: LinSrgb<f32> = c.centroid.into_color();
                let srgb: Srgb<f32> = Srgb::from_linear(linear);
                Rgb::from(srgb.into_format::<u8>())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn two_tone() -> RgbaImage {
        RgbaImage::from_fn(20, 10, |x, _| {
            if x < 15 {
                Rgba([30, 60, 200, 255])
            } else {
                Rgba([230, 180, 20, 255])
            }
        })
    }

    #[test]
    fn finds_both_clusters_largest_first() {
        let colors = KmeansPalette::default().palette(&two_tone(), 2);
        assert_eq!(colors.len(), 2);
        let close = |a: Rgb, b: Rgb| {
            a.r.abs_diff(b.r) <= 2 && a.g.abs_diff(b.g) <= 2 && a.b.abs_diff(b.b) <= 2
        };
        assert!(close(colors[0], Rgb::new(30, 60, 200)), "{:?}", colors);
        assert!(close(colors[1], Rgb::new(230, 180, 20)), "{:?}", colors);
    }

    #[test]
    fn caps_clusters_at_distinct_colors() {
        let colors = KmeansPalette::default().palette(&two_tone(), 8);
        assert!(colors.len() <= 2);
    }

    #[test]
    fn single_color_image_short_circuits() {
        let img = RgbaImage::from_pixel(5, 5, Rgba([10, 20, 30, 255]));
        assert_eq!(
            KmeansPalette::default().palette(&img, 4),
            vec![Rgb::new(10, 20, 30)]
        );
    }

    #[test]
    fn transparent_image_has_no_palette() {
        let img = RgbaImage::from_pixel(5, 5, Rgba([10, 20, 30, 0]));
        assert!(KmeansPalette::default().palette(&img, 4).is_empty());
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let img = two_tone();
        let source = KmeansPalette::default();
        assert_eq!(source.palette(&img, 4), source.palette(&img, 4));
    }
}
