//! CLI Module
//!
//! Command-line interface for building and rendering synthetic scenes.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::layout::LayoutPattern;
use crate::spectrum::PeakDistribution;

/// Synthetic hyperspectral cube generator
#[derive(Parser, Debug)]
#[command(name = "hsi-synth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter scene file
    #[command(name = "init")]
    Init {
        /// Path of the scene file to create
        path: PathBuf,

        /// Number of spectral bands
        #[arg(short, long, default_value_t = crate::spectrum::DEFAULT_NUM_BANDS)]
        bands: usize,

        /// Number of classes, including the background
        #[arg(short, long, default_value_t = 1)]
        classes: usize,

        /// Canvas width in pixels
        #[arg(long, default_value_t = crate::project::DEFAULT_CANVAS_SIZE)]
        width: usize,

        /// Canvas height in pixels
        #[arg(long, default_value_t = crate::project::DEFAULT_CANVAS_SIZE)]
        height: usize,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print a spectrum generated from peaks
    #[command(name = "spectrum")]
    Spectrum {
        /// Peak as `position,amplitude,width` (repeatable)
        #[arg(short, long = "peak", value_parser = parse_peak)]
        peaks: Vec<PeakDistribution>,

        /// Number of spectral bands
        #[arg(short, long, default_value_t = crate::spectrum::DEFAULT_NUM_BANDS)]
        bands: usize,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Generate the scene layout and store it in the scene file
    #[command(name = "layout")]
    Layout {
        /// Path to the scene file
        scene: PathBuf,

        /// Layout pattern
        #[arg(short, long)]
        pattern: Option<LayoutPattern>,

        /// Seed for the random pattern
        #[arg(short, long)]
        seed: Option<u64>,

        /// Blend radius in pixels
        #[arg(short, long)]
        radius: Option<f64>,
    },

    /// Render the scene and export the cube
    #[command(name = "render")]
    Render {
        /// Path to the scene file
        scene: PathBuf,

        /// Output stem; `.raw`, `.hdr` and `.json` are written next to it
        #[arg(short, long)]
        output: PathBuf,

        /// Write 32-bit samples instead of 64-bit
        #[arg(long)]
        f32: bool,

        /// Skip degradation
        #[arg(long)]
        clean: bool,
    },

    /// Summarise a scene file
    #[command(name = "info")]
    Info {
        /// Path to the scene file
        scene: PathBuf,
    },
}

/// Parse `position,amplitude,width`
pub fn parse_peak(s: &str) -> std::result::Result<PeakDistribution, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected `position,amplitude,width`, got `{}`",
            s
        ));
    }
    let mut values = [0.0_f64; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse()
            .map_err(|e| format!("invalid number `{}`: {}", part, e))?;
    }
    PeakDistribution::new(values[0], values[1], values[2]).map_err(|e| e.to_string())
}
