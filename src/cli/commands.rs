//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::error::{Result, SynthError};
use crate::export::{export_cube, ClassInfo, ExportFormat, SampleType};
use crate::layout::LayoutPattern;
use crate::project::ProjectState;
use crate::spectrum::{band_position, generate_spectrum, PeakDistribution, Rgb};

/// Colors handed out to starter classes after the background
const STARTER_PALETTE: [Rgb; 8] = [
    Rgb::new(230, 25, 75),
    Rgb::new(60, 180, 75),
    Rgb::new(0, 130, 200),
    Rgb::new(255, 225, 25),
    Rgb::new(245, 130, 48),
    Rgb::new(145, 30, 180),
    Rgb::new(70, 240, 240),
    Rgb::new(240, 50, 230),
];

/// Build a starter scene: the background plus `classes - 1` single-peak spectra
/// with peaks spread evenly across the spectral range.
pub fn starter_scene(
    bands: usize,
    classes: usize,
    width: usize,
    height: usize,
) -> Result<ProjectState> {
    if classes == 0 {
        return Err(SynthError::invalid("classes", "must be greater than 0"));
    }
    if width == 0 || height == 0 {
        return Err(SynthError::invalid(
            "canvas",
            format!("width and height must be greater than 0, got {}x{}", width, height),
        ));
    }

    let mut state = ProjectState::with_bands(bands)?;
    state.layout.width = width;
    state.layout.height = height;

    let extra = classes - 1;
    for i in 0..extra {
        let index = state.spectra.add_new()?;
        let spectrum = state.spectra.get_mut(index)?;
        spectrum.set_color(STARTER_PALETTE[i % STARTER_PALETTE.len()]);
        let position = (i + 1) as f64 / (extra + 1) as f64;
        spectrum.set_peaks(vec![PeakDistribution::new(position, 1.0, 0.05)?])?;
    }
    Ok(state)
}

/// Write a starter scene file.
pub fn init(
    path: &Path,
    bands: usize,
    classes: usize,
    width: usize,
    height: usize,
    force: bool,
) -> Result<()> {
    info!("Creating scene at: {}", path.display());

    if path.exists() && !force {
        return Err(SynthError::invalid(
            "path",
            format!("{} already exists (use --force to overwrite)", path.display()),
        ));
    }

    let mut state = starter_scene(bands, classes, width, height)?;
    state.save(path)?;

    println!("Scene created: {}", path.display());
    println!("Classes: {} | Bands: {} | Canvas: {}x{}", classes, bands, width, height);

    Ok(())
}

/// Print a spectrum generated from peaks.
pub fn spectrum(peaks: &[PeakDistribution], bands: usize, as_json: bool) -> Result<()> {
    info!("Generating spectrum: {} peaks, {} bands", peaks.len(), bands);

    if peaks.is_empty() {
        warn!("No peaks given, the spectrum is all zeros");
    }

    let values = generate_spectrum(peaks, bands)?;

    if as_json {
        println!("{}", serde_json::to_string(&values)?);
        return Ok(());
    }

    println!("{:>6}  {:>8}  {:>8}", "band", "x", "value");
    println!("{:-<26}", "");
    for (i, value) in values.iter().enumerate() {
        println!("{:>6}  {:>8.4}  {:>8.4}", i, band_position(i, bands), value);
    }

    Ok(())
}

/// Generate the layout and store it in the scene file.
pub fn layout(
    scene: &Path,
    pattern: Option<LayoutPattern>,
    seed: Option<u64>,
    radius: Option<f64>,
) -> Result<()> {
    info!("Generating layout for: {}", scene.display());

    let mut state = ProjectState::load(scene)?;
    if let Some(pattern) = pattern {
        state.layout.pattern = pattern;
    }
    if seed.is_some() {
        state.layout.seed = seed;
    }
    if let Some(radius) = radius {
        state.blend.radius = radius;
        state.validate()?;
    }
    if state.layout.pattern.is_random() && state.layout.seed.is_none() {
        warn!("Random layout without a seed will not be reproducible");
    }

    let counts = state.generate_layout()?.class_counts();
    state.save(scene)?;

    println!("Layout: {} ({}x{})", state.layout.pattern, state.layout.width, state.layout.height);
    for (index, count) in counts.iter().enumerate() {
        let name = state.spectra.get(index).map(|s| s.name()).unwrap_or("?");
        println!("  {:>3}  {:<24} {:>8} px", index, name, count);
    }

    Ok(())
}

/// Render the scene and export the cube.
pub fn render(scene: &Path, output: &Path, f32: bool, clean: bool) -> Result<()> {
    info!("Rendering scene: {}", scene.display());

    let state = ProjectState::load(scene)?;
    if state.grid().is_none() {
        warn!("Scene has no stored layout, generating one from its pattern");
    }

    let cube = if clean {
        state.render_clean()?
    } else {
        state.render()?
    };

    let format = ExportFormat {
        sample_type: if f32 {
            SampleType::Float32
        } else {
            SampleType::Float64
        },
    };
    let (paths, metadata) =
        export_cube(&cube, output, ClassInfo::from_spectra(&state.spectra), format)?;

    println!("Cube: {}x{}x{}", metadata.width, metadata.height, metadata.num_bands);
    println!("Range: [{:.4}, {:.4}]", metadata.min_value, metadata.max_value);
    println!("Raw: {}", paths.raw.display());
    println!("Header: {}", paths.header.display());
    println!("Metadata: {}", paths.metadata.display());
    println!("SHA-256: {}", metadata.sha256);

    Ok(())
}

/// Summarise a scene file.
pub fn info(scene: &Path) -> Result<()> {
    info!("Reading scene: {}", scene.display());

    let state = ProjectState::load(scene)?;

    println!("Scene: {}", scene.display());
    println!("Schema version: {}", state.schema_version);
    if let Some(modified) = state.modified_at {
        println!("Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("Bands: {}", state.num_bands());
    println!("{:-<60}", "");

    println!("Classes ({}):", state.spectra.len());
    for (index, spectrum) in state.spectra.iter().enumerate() {
        println!(
            "  {:>3}  {:<24} {}  {} peaks",
            index,
            spectrum.name(),
            spectrum.color().to_hex(),
            spectrum.peaks().len()
        );
    }

    println!("{:-<60}", "");
    let seed = state
        .layout
        .seed
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!(
        "Layout: {} {}x{} (seed: {})",
        state.layout.pattern, state.layout.width, state.layout.height, seed
    );
    match state.grid() {
        Some(grid) => {
            println!("Grid: stored, {} classes used", grid.class_counts().iter().filter(|&&c| c > 0).count());
            if let Err(e) = grid.validate_against(state.spectra.len()) {
                warn!("Stored grid will not render: {}", e);
            }
        }
        None => println!("Grid: not generated"),
    }
    println!("Blend: radius {} ({:?})", state.blend.radius, state.blend.kernel);

    let degradation = &state.degradation;
    if degradation.is_off() {
        println!("Degradation: off");
    } else {
        println!(
            "Degradation: noise {:?} ({:?}), blur radius {:?}",
            degradation.noise_amount, degradation.noise_model, degradation.blur_radius
        );
    }

    Ok(())
}
