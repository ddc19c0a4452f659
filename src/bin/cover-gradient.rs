use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use cover_gradient::{ExtractOptions, Rgb, extract_bytes, gradient_from_colors};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Full description plus layer strings as JSON
    Json,
    /// The two CSS custom properties used by the card
    Css,
}

/// Derive lyric-card gradient backgrounds from cover images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input cover images
    #[arg(required_unless_present = "palette")]
    inputs: Vec<PathBuf>,

    /// Maximum number of palette colors / gradient stops
    #[arg(short = 'k', long, default_value_t = 4)]
    colors: usize,

    /// Longest side of the working sample
    #[arg(long, default_value_t = 200)]
    max_side: u32,

    /// Comma-separated hex colors to build the gradient from (skips extraction)
    #[arg(short = 'c', long)]
    palette: Option<String>,

    /// Disable the k-means palette fallback
    #[arg(long)]
    no_fallback: bool,

    /// Order stops light to dark instead of dominant first
    #[arg(long)]
    sort_by_lightness: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Css)]
    format: Format,

    /// Log pipeline details (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_gradient(
    label: &str,
    gradient: &cover_gradient::GradientDescription,
    format: Format,
) -> Result<()> {
    let layers = gradient.to_layers();
    match format {
        Format::Css => {
            println!("/* {label} */");
            println!("--g-linear: {};", layers.primary);
            println!("--g-radial: {};", layers.accent);
        }
        Format::Json => {
            let out = json!({
                "source": label,
                "gradient": gradient,
                "layers": layers,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.colors == 0 {
        bail!("--colors must be at least 1");
    }

    let options = ExtractOptions {
        color_count: args.colors,
        max_sample_side: args.max_side,
        secondary_fallback: !args.no_fallback,
        sort_by_lightness: args.sort_by_lightness,
    };

    if let Some(list) = &args.palette {
        let colors = list
            .split(',')
            .map(Rgb::from_hex)
            .collect::<cover_gradient::Result<Vec<_>>>()
            .context("parsing --palette")?;
        let gradient = gradient_from_colors(&colors, &options);
        return print_gradient("palette", &gradient, args.format);
    }

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let extraction = extract_bytes(&bytes, &options)
            .with_context(|| format!("extracting gradient from {}", input.display()))?;
        info!(
            path = %input.display(),
            colors = extraction.palette.len(),
            "extracted palette"
        );
        print_gradient(&input.display().to_string(), &extraction.gradient, args.format)?;
    }

    Ok(())
}
