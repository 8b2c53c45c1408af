//! File-based driver for the shikaku rectification pipeline.
//!
//! Mirrors the two pipeline operations as subcommands: `rectify` maps
//! a photographed document onto a flat square canvas from four corner
//! points, and `extract` cuts polygonal regions out of a rectified
//! image as a binarized scan.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shikaku_pipeline::{PipelineConfig, Point, Polygon, Quadrilateral};

/// Rectify photographed documents into flat, cropped, binarized scans.
#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Warp a photographed document onto a square canvas.
    Rectify {
        /// Input image path (PNG, JPEG, GIF, TIFF, BMP, WebP).
        input: PathBuf,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,

        /// The document's four corners as "X,Y" pairs in top-left,
        /// top-right, bottom-right, bottom-left order.
        #[arg(long, value_name = "X,Y", num_args = 4, required = true)]
        corners: Vec<String>,

        /// Side length of the square output canvas in pixels.
        #[arg(long, default_value_t = 800)]
        resolution: u32,
    },

    /// Extract polygon regions from a rectified image as a binary scan.
    Extract {
        /// Input image path (typically the output of `rectify`).
        input: PathBuf,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file holding the regions to keep, as an array of
        /// polygons: `[[{"x":0,"y":0}, ...], ...]`.
        #[arg(long, value_name = "FILE")]
        polygons: PathBuf,
    },
}

/// Parse an "X,Y" corner argument into a point.
fn parse_point(s: &str) -> Result<Point, String> {
    let (x_str, y_str) = s
        .split_once(',')
        .ok_or_else(|| format!("corner must be 'X,Y', got: '{s}'"))?;
    let x: f64 = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid corner X '{x_str}': {e}"))?;
    let y: f64 = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid corner Y '{y_str}': {e}"))?;
    Ok(Point::new(x, y))
}

fn run_rectify(
    input: &Path,
    output: &Path,
    corners: &[String],
    resolution: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let points = corners
        .iter()
        .map(|s| parse_point(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("--corners: {e}"))?;
    let quad = Quadrilateral::from_points(&points)?;

    eprintln!("Reading image from {}", input.display());
    let image_bytes = std::fs::read(input)?;

    let config = PipelineConfig {
        output_resolution: resolution,
        ..PipelineConfig::default()
    };
    eprintln!("Rectifying to {resolution}x{resolution}...");
    let result = shikaku_pipeline::rectify(&image_bytes, &quad, &config)?;

    eprintln!(
        "Saving {}x{} rectified image to {}",
        result.dimensions.width,
        result.dimensions.height,
        output.display(),
    );
    std::fs::write(output, result.png)?;
    eprintln!("Done.");
    Ok(())
}

fn run_extract(
    input: &Path,
    output: &Path,
    polygons_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Reading polygons from {}", polygons_path.display());
    let polygons_json = std::fs::read(polygons_path)?;
    // Deserialization runs the polygon vertex-count validation.
    let polygons: Vec<Polygon> = serde_json::from_slice(&polygons_json)?;
    eprintln!("Loaded {} polygon(s)", polygons.len());

    eprintln!("Reading image from {}", input.display());
    let image_bytes = std::fs::read(input)?;

    eprintln!("Extracting and binarizing...");
    let binary_png = shikaku_pipeline::extract(&image_bytes, &polygons)?;

    eprintln!("Saving binary scan to {}", output.display());
    std::fs::write(output, binary_png)?;
    eprintln!("Done.");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Rectify {
            input,
            output,
            corners,
            resolution,
        } => run_rectify(&input, &output, &corners, resolution),
        Command::Extract {
            input,
            output,
            polygons,
        } => run_extract(&input, &output, &polygons),
    }
}
