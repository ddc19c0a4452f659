//! Color primitives shared by every pipeline stage.
//!
//! RGB <-> HSL conversion is delegated to the `palette` crate; this module only
//! rescales into the degree / percent ranges the heuristics are written in.

use std::fmt;

use palette::{FromColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

type SrgbHsl = palette::Hsl<palette::encoding::Srgb, f64>;

/// Neutral palette used when an image has no usable chromatic pixels.
pub const FALLBACK_PALETTE: [Rgb; 4] = [
    Rgb::new(40, 90, 180),
    Rgb::new(80, 140, 220),
    Rgb::new(20, 60, 120),
    Rgb::new(100, 160, 200),
];

/// An 8-bit sRGB color sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hsl(self) -> Hsl {
        Hsl::from_rgb(self)
    }

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<Srgb<u8>> for Rgb {
    fn from(c: Srgb<u8>) -> Self {
        Self::new(c.red, c.green, c.blue)
    }
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: wrap_hue(h),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    pub fn from_rgb(c: Rgb) -> Self {
        let srgb: Srgb<f64> = Srgb::new(c.r, c.g, c.b).into_format();
        let hsl = SrgbHsl::from_color(srgb);
        Self::new(
            hsl.hue.into_positive_degrees(),
            hsl.saturation * 100.0,
            hsl.lightness * 100.0,
        )
    }

    pub fn to_rgb(self) -> Rgb {
        let hsl = SrgbHsl::new(self.h, self.s / 100.0, self.l / 100.0);
        let srgb = Srgb::<f64>::from_color(hsl);
        Rgb::new(
            to_channel(srgb.red),
            to_channel(srgb.green),
            to_channel(srgb.blue),
        )
    }
}

/// One palette color with the histogram weight it was selected with.
/// Colors that did not come from the histogram carry weight 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub rgb: Rgb,
    pub hsl: Hsl,
    pub weight: f64,
}

impl PaletteEntry {
    pub fn new(rgb: Rgb, weight: f64) -> Self {
        Self {
            rgb,
            hsl: rgb.to_hsl(),
            weight,
        }
    }

    /// Entry whose RGB is derived from an exact HSL value.
    pub fn from_hsl(hsl: Hsl, weight: f64) -> Self {
        Self {
            rgb: hsl.to_rgb(),
            hsl,
            weight,
        }
    }
}

/// Ordered, non-empty list of colors. The first entry is the dominant color
/// and the order becomes the gradient stop order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(dominant: PaletteEntry) -> Self {
        Self {
            entries: vec![dominant],
        }
    }

    /// `None` when `colors` is empty.
    pub fn from_colors(colors: &[Rgb]) -> Option<Self> {
        let (first, rest) = colors.split_first()?;
        let mut palette = Self::new(PaletteEntry::new(*first, 0.0));
        for &c in rest {
            palette.push(PaletteEntry::new(c, 0.0));
        }
        Some(palette)
    }

    /// The neutral [`FALLBACK_PALETTE`], cut to at most `count` colors.
    pub fn fallback(count: usize) -> Self {
        let count = count.clamp(1, FALLBACK_PALETTE.len());
        let mut palette = Self::new(PaletteEntry::new(FALLBACK_PALETTE[0], 0.0));
        for &c in &FALLBACK_PALETTE[1..count] {
            palette.push(PaletteEntry::new(c, 0.0));
        }
        palette
    }

    pub fn push(&mut self, entry: PaletteEntry) {
        self.entries.push(entry);
    }

    pub fn dominant(&self) -> &PaletteEntry {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.entries.iter().map(|e| e.rgb).collect()
    }

    /// Transform every entry, keeping order and length.
    pub fn map(&self, mut f: impl FnMut(usize, &PaletteEntry) -> PaletteEntry) -> Self {
        Self {
            entries: self.entries.iter().enumerate().map(|(i, e)| f(i, e)).collect(),
        }
    }

    /// Same entries reordered from lightest to darkest.
    pub fn sorted_by_lightness(&self) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.hsl.l.total_cmp(&a.hsl.l));
        Self { entries }
    }
}

fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Wrap any angle into `[0, 360)`.
pub fn wrap_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can land on 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest distance between two hues on the color wheel, in `[0, 180]`.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(360.0 - d)
}
