//! Final two-layer gradient description and its CSS-like text encoding.
//!
//! The text form is what the card renderer paints and what gets persisted for
//! share links. [`GradientDescription::from_layers`] parses it back exactly, so
//! a stored card replays without touching the original image.

use serde::{Deserialize, Serialize};

use crate::color::{Palette, Rgb};
use crate::direction::{Anchor, GradientKind};
use crate::error::{Error, Result};

const LINEAR_ACCENT_ANCHOR: Anchor = Anchor::new(30.0, 20.0);
const RADIAL_ACCENT_ANCHOR: Anchor = Anchor::new(70.0, 80.0);
const LINEAR_ACCENT_OPACITY: f64 = 0.8;
const RADIAL_ACCENT_OPACITY: f64 = 0.6;
/// Radius (percent) at which the accent has faded out.
const ACCENT_FALLOFF: f64 = 70.0;

/// Suffix marking a lone stop that spans the whole gradient.
const SOLE_STOP_SPAN: &str = " 0% 100%";

/// Soft radial highlight painted with the dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccentLayer {
    pub anchor: Anchor,
    pub base_color: Rgb,
    pub opacity: f64,
    /// Radius in percent where the color reaches full transparency.
    pub falloff: f64,
}

impl AccentLayer {
    /// The accent sits opposite the primary layer's visual weight.
    pub fn for_kind(kind: &GradientKind, base_color: Rgb) -> Self {
        let (anchor, opacity) = match kind {
            GradientKind::Linear { .. } => (LINEAR_ACCENT_ANCHOR, LINEAR_ACCENT_OPACITY),
            GradientKind::Radial { .. } => (RADIAL_ACCENT_ANCHOR, RADIAL_ACCENT_OPACITY),
        };
        Self {
            anchor,
            base_color,
            opacity,
            falloff: ACCENT_FALLOFF,
        }
    }

    fn to_css(&self) -> String {
        let c = self.base_color;
        format!(
            "radial-gradient(ellipse at {}, rgba({}, {}, {}, {}), transparent {}%)",
            self.anchor, c.r, c.g, c.b, self.opacity, self.falloff
        )
    }

    fn parse(css: &str) -> Result<Self> {
        let args = call_args(css, "radial-gradient")?;
        let [shape, color, fade] = args.as_slice() else {
            return Err(malformed("accent layer needs shape, color and fade", css));
        };

        let anchor = shape
            .strip_prefix("ellipse at ")
            .ok_or_else(|| malformed("accent layer must be an ellipse", css))
            .and_then(parse_anchor)?;

        let channels = call_args(color, "rgba")?;
        let [r, g, b, opacity] = channels.as_slice() else {
            return Err(malformed("rgba() needs four components", color));
        };
        let base_color = Rgb::new(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?);
        let opacity = parse_number(opacity)?;

        let falloff = fade
            .strip_prefix("transparent ")
            .and_then(|f| f.strip_suffix('%'))
            .ok_or_else(|| malformed("accent fade must be `transparent N%`", fade))
            .and_then(parse_number)?;

        Ok(Self {
            anchor,
            base_color,
            opacity,
            falloff,
        })
    }
}

/// Engine output: primary multi-stop layer plus a decorative accent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDescription {
    pub kind: GradientKind,
    pub stops: Vec<Rgb>,
    pub decorative: AccentLayer,
}

/// Text encoding of both layers, ready to be assigned to CSS custom properties
/// or stored as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientLayers {
    pub primary: String,
    pub accent: String,
}

impl GradientDescription {
    /// Stops follow palette order; the accent uses the dominant color.
    pub fn new(palette: &Palette, kind: GradientKind) -> Self {
        Self {
            kind,
            stops: palette.colors(),
            decorative: AccentLayer::for_kind(&kind, palette.dominant().rgb),
        }
    }

    pub fn to_layers(&self) -> GradientLayers {
        let stops = match self.stops.as_slice() {
            [only] => format!("{only}{SOLE_STOP_SPAN}"),
            stops => stops
                .iter()
                .map(Rgb::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        };
        let primary = match self.kind {
            GradientKind::Linear { angle_degrees } => {
                format!("linear-gradient({angle_degrees}deg, {stops})")
            }
            GradientKind::Radial { focal } => {
                format!("radial-gradient(circle at {focal}, {stops})")
            }
        };
        GradientLayers {
            primary,
            accent: self.decorative.to_css(),
        }
    }

    /// Inverse of [`to_layers`](Self::to_layers).
    pub fn from_layers(layers: &GradientLayers) -> Result<Self> {
        let css = layers.primary.trim();
        let (kind, args) = if css.starts_with("linear-gradient(") {
            let args = call_args(css, "linear-gradient")?;
            let angle = args
                .first()
                .and_then(|a| a.strip_suffix("deg"))
                .ok_or_else(|| malformed("linear gradient needs an angle", css))?;
            let kind = GradientKind::Linear {
                angle_degrees: parse_number(angle)?,
            };
            (kind, args)
        } else {
            let args = call_args(css, "radial-gradient")?;
            let focal = args
                .first()
                .and_then(|a| a.strip_prefix("circle at "))
                .ok_or_else(|| malformed("radial gradient needs `circle at`", css))
                .and_then(parse_anchor)?;
            (GradientKind::Radial { focal }, args)
        };

        let stops = match &args[1..] {
            [] => return Err(malformed("no color stops", css)),
            [only] => {
                let color = only.strip_suffix(SOLE_STOP_SPAN).unwrap_or(*only);
                vec![parse_rgb(color)?]
            }
            many => many.iter().map(|s| parse_rgb(s)).collect::<Result<_>>()?,
        };

        Ok(Self {
            kind,
            stops,
            decorative: AccentLayer::parse(layers.accent.trim())?,
        })
    }
}

fn malformed(what: &str, input: &str) -> Error {
    Error::ParseGradient(format!("{what}: {input:?}"))
}

/// Arguments of `name(...)`, split on top-level commas and trimmed.
fn call_args<'a>(css: &'a str, name: &str) -> Result<Vec<&'a str>> {
    let inner = css
        .trim()
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed(&format!("expected {name}(...)"), css))?;

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unbalanced parentheses", css))?;
            }
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed("unbalanced parentheses", css));
    }
    args.push(inner[start..].trim());
    Ok(args)
}

fn parse_rgb(css: &str) -> Result<Rgb> {
    let channels = call_args(css, "rgb")?;
    let [r, g, b] = channels.as_slice() else {
        return Err(malformed("rgb() needs three components", css));
    };
    Ok(Rgb::new(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?))
}

fn parse_channel(s: &str) -> Result<u8> {
    s.parse().map_err(|_| malformed("invalid color channel", s))
}

fn parse_number(s: &str) -> Result<f64> {
    s.trim().parse().map_err(|_| malformed("invalid number", s))
}

fn parse_anchor(s: &str) -> Result<Anchor> {
    let mut parts = s.split_whitespace().map(|p| {
        p.strip_suffix('%')
            .ok_or_else(|| malformed("position must be a percentage", p))
            .and_then(parse_number)
    });
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(Anchor::new(x?, y?)),
        _ => Err(malformed("position needs two percentages", s)),
    }
}
