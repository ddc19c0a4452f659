//! Greedy selection of a small, visually diverse palette from the weighted bins.
//!
//! The histogram pass picks the heaviest candidates that differ enough from
//! everything already chosen. When that leaves the palette short, an ordered
//! chain of tiers tops it up:
//!
//! 1. **contrast**: force in the candidate most different from the dominant color
//! 2. **secondary**: borrow colors from a [`PaletteSource`] under looser thresholds
//! 3. **complement**: synthesize the dominant color's complement
//!
//! Each tier is a pure function of the current palette and returns `None` when
//! it has nothing to contribute.

use image::RgbaImage;
use tracing::debug;

use crate::color::{Hsl, Palette, PaletteEntry, hue_distance};
use crate::fallback::PaletteSource;
use crate::quantize::WeightedBins;

/// Minimum differences for two colors to count as distinct. Exceeding any one
/// of them is enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub hue: f64,
    pub lightness: f64,
    pub saturation: f64,
}

/// Applied to histogram candidates.
pub const STRICT: Thresholds = Thresholds {
    hue: 40.0,
    lightness: 30.0,
    saturation: 25.0,
};

/// Applied to colors borrowed from the secondary source.
pub const RELAXED: Thresholds = Thresholds {
    hue: 35.0,
    lightness: 25.0,
    saturation: 20.0,
};

impl Thresholds {
    pub fn distinct(&self, a: &Hsl, b: &Hsl) -> bool {
        hue_distance(a.h, b.h) > self.hue
            || (a.l - b.l).abs() > self.lightness
            || (a.s - b.s).abs() > self.saturation
    }

    fn distinct_from_all(&self, hsl: &Hsl, palette: &Palette) -> bool {
        palette.entries().iter().all(|e| self.distinct(hsl, &e.hsl))
    }
}

/// Weighted difference used to rescue a palette with a single color.
fn contrast_score(a: &Hsl, b: &Hsl) -> f64 {
    hue_distance(a.h, b.h) * 0.5 + (a.l - b.l).abs() * 0.3 + (a.s - b.s).abs() * 0.2
}

/// A secondary palette generator together with the image it should look at.
#[derive(Clone, Copy)]
pub struct Secondary<'a> {
    pub source: &'a dyn PaletteSource,
    pub image: &'a RgbaImage,
}

/// Inputs every tier can consult.
pub struct Selection<'a> {
    candidates: Vec<PaletteEntry>,
    target: usize,
    secondary: Option<Secondary<'a>>,
}

type Tier = fn(&Selection<'_>, &Palette) -> Option<Palette>;

const TIERS: [(&str, Tier); 3] = [
    ("contrast", force_contrast),
    ("secondary", borrow_secondary),
    ("complement", synthesize_complement),
];

impl<'a> Selection<'a> {
    /// Takes the top `2 * target` bins as candidates.
    pub fn new(bins: &WeightedBins, target: usize, secondary: Option<Secondary<'a>>) -> Self {
        let target = target.max(1);
        let candidates = bins
            .ranked()
            .into_iter()
            .take(target.saturating_mul(2))
            .map(|(key, weight)| PaletteEntry::new(key.rgb(), weight))
            .collect();
        Self {
            candidates,
            target,
            secondary,
        }
    }

    pub fn candidates(&self) -> &[PaletteEntry] {
        &self.candidates
    }

    /// Run the greedy pass followed by the fallback tiers.
    pub fn select(&self) -> Palette {
        let Some(mut palette) = self.greedy() else {
            debug!("no chromatic pixels, using fallback palette");
            return Palette::fallback(self.target);
        };

        for (name, tier) in TIERS {
            if let Some(next) = tier(self, &palette) {
                debug!(tier = name, before = palette.len(), after = next.len(), "palette tier applied");
                palette = next;
            }
        }
        palette
    }

    fn greedy(&self) -> Option<Palette> {
        let (dominant, rest) = self.candidates.split_first()?;
        let mut palette = Palette::new(*dominant);
        for candidate in rest {
            if palette.len() >= self.target {
                break;
            }
            if STRICT.distinct_from_all(&candidate.hsl, &palette) {
                palette.push(*candidate);
            }
        }
        Some(palette)
    }
}

/// Convenience wrapper around [`Selection`].
pub fn select_palette(
    bins: &WeightedBins,
    target: usize,
    secondary: Option<Secondary<'_>>,
) -> Palette {
    Selection::new(bins, target, secondary).select()
}

fn force_contrast(sel: &Selection<'_>, palette: &Palette) -> Option<Palette> {
    if palette.len() >= 2 || sel.target < 2 || sel.candidates.len() < 2 {
        return None;
    }
    let main = palette.dominant().hsl;

    let mut best: Option<(&PaletteEntry, f64)> = None;
    for candidate in &sel.candidates[1..] {
        let score = contrast_score(&main, &candidate.hsl);
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((candidate, score));
        }
    }

    let (pick, _) = best?;
    let mut next = palette.clone();
    next.push(*pick);
    Some(next)
}

fn borrow_secondary(sel: &Selection<'_>, palette: &Palette) -> Option<Palette> {
    if palette.len() >= sel.target {
        return None;
    }
    let secondary = sel.secondary?;

    let mut next = palette.clone();
    for rgb in secondary.source.palette(secondary.image, sel.target.saturating_mul(2)) {
        if next.len() >= sel.target {
            break;
        }
        let entry = PaletteEntry::new(rgb, 0.0);
        if RELAXED.distinct_from_all(&entry.hsl, &next) {
            next.push(entry);
        }
    }

    (next.len() > palette.len()).then_some(next)
}

fn synthesize_complement(sel: &Selection<'_>, palette: &Palette) -> Option<Palette> {
    if palette.len() >= 2 || sel.target < 2 {
        return None;
    }
    let mut next = palette.clone();
    next.push(PaletteEntry::from_hsl(complement(&palette.dominant().hsl), 0.0));
    Some(next)
}

/// Opposite hue, with saturation and lightness pushed away from the original
/// and kept inside `[20, 80]`.
pub fn complement(hsl: &Hsl) -> Hsl {
    let s = if hsl.s > 50.0 { hsl.s - 30.0 } else { hsl.s + 30.0 };
    let l = if hsl.l > 50.0 { hsl.l - 40.0 } else { hsl.l + 40.0 };
    Hsl::new(hsl.h + 180.0, s.clamp(20.0, 80.0), l.clamp(20.0, 80.0))
}
