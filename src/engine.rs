//! End-to-end pipeline: sample, quantize, select, harmonize, analyze, emit.

use tracing::debug;

use crate::color::{Palette, Rgb};
use crate::direction;
use crate::error::Result;
use crate::fallback::KmeansPalette;
use crate::gradient::GradientDescription;
use crate::harmonize::harmonize;
use crate::quantize::quantize;
use crate::sampler::{self, PixelSource};
use crate::select::{Secondary, Selection};

/// Knobs for a single extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum number of palette colors (gradient stops). Values below 1 act as 1.
    pub color_count: usize,
    /// Longest side of the working sample.
    pub max_sample_side: u32,
    /// Consult k-means when the histogram cannot fill the palette.
    pub secondary_fallback: bool,
    /// Order stops light to dark instead of dominant first.
    pub sort_by_lightness: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            color_count: 4,
            max_sample_side: sampler::DEFAULT_MAX_SIDE,
            secondary_fallback: true,
            sort_by_lightness: false,
        }
    }
}

impl ExtractOptions {
    pub fn with_color_count(color_count: usize) -> Self {
        Self {
            color_count,
            ..Self::default()
        }
    }
}

/// Everything one extraction produced.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Palette as selected from the image, before harmonization.
    pub palette: Palette,
    /// Palette actually used for the gradient stops.
    pub harmonized: Palette,
    pub gradient: GradientDescription,
}

/// Stages 1-3: the diverse palette of `source`, dominant color first.
pub fn extract_palette<S: PixelSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
) -> Result<Palette> {
    let sample = sampler::sample(source, options.max_sample_side)?;
    let bins = quantize(&sample);
    debug!(
        width = sample.width(),
        height = sample.height(),
        bins = bins.len(),
        "quantized sample"
    );

    let kmeans = KmeansPalette::default();
    let secondary = options.secondary_fallback.then_some(Secondary {
        source: &kmeans,
        image: &sample,
    });
    let palette = Selection::new(&bins, options.color_count, secondary).select();
    debug!(colors = palette.len(), "palette selected");
    Ok(palette)
}

/// Stages 4-6 applied to an already selected palette.
pub fn gradient_for_palette(
    palette: &Palette,
    options: &ExtractOptions,
) -> (Palette, GradientDescription) {
    let mut harmonized = harmonize(palette);
    if options.sort_by_lightness {
        harmonized = harmonized.sorted_by_lightness();
    }
    let kind = direction::analyze(&harmonized);
    debug!(?kind, "gradient direction");
    let gradient = GradientDescription::new(&harmonized, kind);
    (harmonized, gradient)
}

/// Run the whole pipeline, keeping the intermediate palettes.
pub fn extract<S: PixelSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let palette = extract_palette(source, options)?;
    let (harmonized, gradient) = gradient_for_palette(&palette, options);
    Ok(Extraction {
        palette,
        harmonized,
        gradient,
    })
}

/// Gradient background for the image in `source`.
///
/// Fails only with [`Error::InvalidImage`](crate::Error::InvalidImage); every
/// other degenerate input falls back to a usable palette.
pub fn extract_gradient<S: PixelSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
) -> Result<GradientDescription> {
    extract(source, options).map(|e| e.gradient)
}

/// Gradient for an explicit list of colors, e.g. a user-picked palette.
/// An empty list uses the neutral fallback palette. Extra colors beyond
/// `color_count` are ignored.
pub fn gradient_from_colors(colors: &[Rgb], options: &ExtractOptions) -> GradientDescription {
    let count = options.color_count.max(1);
    let palette = Palette::from_colors(&colors[..colors.len().min(count)])
        .unwrap_or_else(|| Palette::fallback(count));
    gradient_for_palette(&palette, options).1
}
