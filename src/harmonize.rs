//! Gentle HSL clean-up that keeps every stop legible without losing the
//! cover's hue identity.

use crate::color::{Hsl, Palette, PaletteEntry};

/// Total hue spread allowed around the dominant hue.
const HUE_VARIATION: f64 = 15.0;

fn adjust_saturation(s: f64) -> f64 {
    if s < 20.0 {
        (s + 15.0).min(60.0)
    } else if s > 95.0 {
        (s - 5.0).max(85.0)
    } else {
        s
    }
}

fn adjust_lightness(l: f64) -> f64 {
    if l < 15.0 {
        (l + 10.0).max(20.0)
    } else if l > 85.0 {
        (l - 10.0).min(80.0)
    } else {
        l
    }
}

/// Harmonize each entry; order and length are preserved.
///
/// Non-dominant stops are re-centered on the dominant hue:
/// `h = h0 + (i - n/2) * (15 / n)`.
pub fn harmonize(palette: &Palette) -> Palette {
    let count = palette.len() as f64;
    let dominant_hue = palette.dominant().hsl.h;

    let adjusted = |index: usize, entry: &PaletteEntry| {
        let h = if index == 0 {
            entry.hsl.h
        } else {
            dominant_hue + (index as f64 - count / 2.0) * (HUE_VARIATION / count)
        };
        let hsl = Hsl::new(h, adjust_saturation(entry.hsl.s), adjust_lightness(entry.hsl.l));
        PaletteEntry::from_hsl(hsl, entry.weight)
    };

    palette.map(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn saturation_bounds() {
        assert_eq!(adjust_saturation(5.0), 20.0);
        assert_eq!(adjust_saturation(19.0), 34.0);
        assert_eq!(adjust_saturation(50.0), 50.0);
        assert_eq!(adjust_saturation(100.0), 95.0);
        assert_eq!(adjust_saturation(96.0), 91.0);
    }

    #[test]
    fn lightness_bounds() {
        assert_eq!(adjust_lightness(2.0), 20.0);
        assert_eq!(adjust_lightness(12.0), 22.0);
        assert_eq!(adjust_lightness(50.0), 50.0);
        assert_eq!(adjust_lightness(88.0), 78.0);
        assert_eq!(adjust_lightness(99.0), 80.0);
    }

    #[test]
    fn hues_recentered_on_dominant() {
        let palette = Palette::from_colors(&[
            Rgb::new(200, 40, 40),
            Rgb::new(40, 200, 40),
            Rgb::new(40, 40, 200),
            Rgb::new(200, 200, 40),
        ])
        .unwrap();
        let out = harmonize(&palette);
        assert_eq!(out.len(), 4);

        let hues: Vec<f64> = out.entries().iter().map(|e| e.hsl.h).collect();
        assert_eq!(hues[0], palette.dominant().hsl.h);
        assert!((hues[1] - 356.25).abs() < 1e-9);
        assert!((hues[2] - hues[0]).abs() < 1e-9);
        assert!((hues[3] - 3.75).abs() < 1e-9);
    }

    #[test]
    fn keeps_weights_and_order() {
        let mut palette = Palette::new(PaletteEntry::new(Rgb::new(30, 90, 200), 7.5));
        palette.push(PaletteEntry::new(Rgb::new(250, 250, 255), 2.0));
        let out = harmonize(&palette);
        assert_eq!(out.entries()[0].weight, 7.5);
        assert_eq!(out.entries()[1].weight, 2.0);
        assert!(out.entries()[1].hsl.l <= 80.0);
    }

    #[test]
    fn rgb_matches_adjusted_hsl() {
        let palette = Palette::from_colors(&[Rgb::new(10, 10, 12), Rgb::new(128, 120, 125)]).unwrap();
        for entry in harmonize(&palette).entries() {
            assert_eq!(entry.rgb, entry.hsl.to_rgb());
        }
    }
}
