//! Error types for the cover_gradient crate.

/// Failures surfaced to callers. Degenerate palettes never show up here; they are
/// absorbed by the selector's fallback tiers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pixel source has a zero dimension or a buffer that does not match it.
    #[error("invalid image ({width}x{height}): {reason}")]
    InvalidImage {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// Encoded image bytes could not be decoded.
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// A color string was not `RRGGBB` hex.
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),

    /// A stored gradient layer string could not be parsed back.
    #[error("malformed gradient layer: {0}")]
    ParseGradient(String),
}

pub type Result<T> = std::result::Result<T, Error>;
