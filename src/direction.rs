//! Chooses gradient geometry from the lightness and hue statistics of a palette.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Palette;

/// Hue spread above which the palette reads as "colorful" and goes radial.
const RADIAL_HUE_SPREAD: f64 = 100.0;
/// Lightness range above which the stops get a diagonal direction.
const CONTRAST_LIGHTNESS: f64 = 25.0;
/// Hues closer than this count as one.
const HUE_EPSILON: f64 = 0.5;

pub const ANGLE_LIGHT_TO_DARK: f64 = 135.0;
pub const ANGLE_DARK_TO_LIGHT: f64 = 45.0;
pub const ANGLE_FLAT: f64 = 90.0;

/// Focal point of a radial gradient.
pub const RADIAL_FOCUS: Anchor = Anchor::new(40.0, 30.0);

/// A point inside the card, as percentages from the left and top edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", self.x, self.y)
    }
}

/// Geometry of the primary gradient layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GradientKind {
    Linear { angle_degrees: f64 },
    Radial { focal: Anchor },
}

/// Largest gap between neighbouring hues on the color wheel, wrap-around gap
/// included. Fewer than two distinct hues have no spread.
pub fn hue_spread(hues: &[f64]) -> f64 {
    let mut sorted = hues.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|b, a| (*b - *a).abs() < HUE_EPSILON);
    if sorted.len() > 1 && 360.0 - sorted[sorted.len() - 1] + sorted[0] < HUE_EPSILON {
        sorted.pop();
    }

    if sorted.len() < 2 {
        return 0.0;
    }
    let (first, last) = (sorted[0], sorted[sorted.len() - 1]);

    let widest = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0, f64::max);
    widest.max(360.0 - last + first)
}

/// Pick linear or radial geometry for `palette`.
pub fn analyze(palette: &Palette) -> GradientKind {
    let entries = palette.entries();

    // achromatic stops have no meaningful hue
    let hues: Vec<f64> = entries
        .iter()
        .filter(|e| e.hsl.s > 0.0)
        .map(|e| e.hsl.h)
        .collect();
    if hue_spread(&hues) > RADIAL_HUE_SPREAD {
        return GradientKind::Radial {
            focal: RADIAL_FOCUS,
        };
    }

    let (min_l, max_l) = entries
        .iter()
        .map(|e| e.hsl.l)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| {
            (lo.min(l), hi.max(l))
        });
    let first_light = palette.dominant().hsl.l;
    let last_light = entries[entries.len() - 1].hsl.l;

    let angle_degrees = if max_l - min_l > CONTRAST_LIGHTNESS {
        if first_light > last_light {
            ANGLE_LIGHT_TO_DARK
        } else {
            ANGLE_DARK_TO_LIGHT
        }
    } else {
        ANGLE_FLAT
    };
    GradientKind::Linear { angle_degrees }
}
