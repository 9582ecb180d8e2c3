//! hsi-synth CLI - Synthetic Hyperspectral Cube Generator
//!
//! Command-line interface for building scenes and rendering cubes.

use anyhow::Context;
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use hsi_synth::cli::commands;
use hsi_synth::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("hsi-synth v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("hsi-synth v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Init {
            path,
            bands,
            classes,
            width,
            height,
            force,
        } => commands::init(&path, bands, classes, width, height, force)
            .with_context(|| format!("failed to create scene {}", path.display())),
        Commands::Spectrum { peaks, bands, json } => {
            commands::spectrum(&peaks, bands, json).context("failed to generate spectrum")
        }
        Commands::Layout {
            scene,
            pattern,
            seed,
            radius,
        } => commands::layout(&scene, pattern, seed, radius)
            .with_context(|| format!("failed to generate layout for {}", scene.display())),
        Commands::Render {
            scene,
            output,
            f32,
            clean,
        } => commands::render(&scene, &output, f32, clean)
            .with_context(|| format!("failed to render {}", scene.display())),
        Commands::Info { scene } => {
            commands::info(&scene).with_context(|| format!("failed to read {}", scene.display()))
        }
    }
}
