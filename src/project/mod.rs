//! Project State
//!
//! Everything needed to rebuild a cube without asking the user again:
//! class spectra (name, color, peaks), band count, layout pattern and the
//! generated class grid, blend settings and degradation options.
//! Stored as JSON.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blend::{BlendKernel, LayoutBlender, DEFAULT_BLEND_RADIUS};
use crate::cube::{Cube, CubeAssembler};
use crate::degradation::{DegradationChain, DegradationConfig};
use crate::error::{Result, SynthError};
use crate::layout::{ImageLayout, LayoutGenerator, LayoutPattern};
use crate::spectrum::ClassSpectra;

/// Current project file schema version
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Canvas edge length used when a project does not specify one
pub const DEFAULT_CANVAS_SIZE: usize = 500;

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

fn default_canvas_size() -> usize {
    DEFAULT_CANVAS_SIZE
}

fn default_blend_radius() -> f64 {
    DEFAULT_BLEND_RADIUS
}

/// Layout settings and the grid generated from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default)]
    pub pattern: LayoutPattern,
    #[serde(default = "default_canvas_size")]
    pub width: usize,
    #[serde(default = "default_canvas_size")]
    pub height: usize,
    /// Seed for the random pattern; unseeded layouts differ per run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Last generated grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<ImageLayout>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            pattern: LayoutPattern::default(),
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            seed: None,
            grid: None,
        }
    }
}

/// Blend settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendSettings {
    #[serde(default = "default_blend_radius")]
    pub radius: f64,
    #[serde(default)]
    pub kernel: BlendKernel,
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLEND_RADIUS,
            kernel: BlendKernel::Uniform,
        }
    }
}

/// Complete project state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Schema version for future migrations
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Class spectra and the shared band count
    #[serde(default)]
    pub spectra: ClassSpectra,

    #[serde(default)]
    pub layout: LayoutSettings,

    #[serde(default)]
    pub blend: BlendSettings,

    #[serde(default)]
    pub degradation: DegradationConfig,

    /// Timestamp of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            spectra: ClassSpectra::default(),
            layout: LayoutSettings::default(),
            blend: BlendSettings::default(),
            degradation: DegradationConfig::default(),
            modified_at: None,
        }
    }
}

impl ProjectState {
    /// New project: background spectrum only, default band count
    pub fn new() -> Self {
        Self::default()
    }

    /// New project sampled at `num_bands` bands
    pub fn with_bands(num_bands: usize) -> Result<Self> {
        Ok(Self {
            spectra: ClassSpectra::new(num_bands)?,
            ..Self::default()
        })
    }

    pub fn num_bands(&self) -> usize {
        self.spectra.num_bands()
    }

    /// Resample every spectrum at a new band count
    pub fn set_num_bands(&mut self, num_bands: usize) -> Result<()> {
        self.spectra.set_num_bands(num_bands)
    }

    /// Back to a fresh project, keeping the band count and canvas size
    pub fn reset(&mut self) -> Result<()> {
        let num_bands = self.num_bands();
        let (width, height) = (self.layout.width, self.layout.height);
        *self = Self::default();
        self.spectra = ClassSpectra::new(num_bands)?;
        self.layout.width = width;
        self.layout.height = height;
        Ok(())
    }

    /// The generated grid, if any
    pub fn grid(&self) -> Option<&ImageLayout> {
        self.layout.grid.as_ref()
    }

    /// Generate the layout from the stored pattern and keep it.
    ///
    /// An existing grid of the same size is regenerated in place.
    pub fn generate_layout(&mut self) -> Result<&ImageLayout> {
        let settings = &mut self.layout;
        let num_classes = self.spectra.len();
        let mut generator = layout_generator(settings.seed);
        let same_size = matches!(
            &settings.grid,
            Some(grid) if grid.width() == settings.width && grid.height() == settings.height
        );
        match settings.grid.as_mut() {
            Some(grid) if same_size => {
                generator.generate_into(grid, settings.pattern, num_classes)?;
            }
            _ => {
                let grid = generator.generate(
                    settings.pattern,
                    settings.width,
                    settings.height,
                    num_classes,
                )?;
                settings.grid = Some(grid);
            }
        }
        tracing::info!(
            pattern = %settings.pattern,
            width = settings.width,
            height = settings.height,
            num_classes,
            "layout generated"
        );
        self.layout
            .grid
            .as_ref()
            .ok_or_else(|| SynthError::invalid("layout", "grid missing after generation"))
    }

    /// Check settings and grid shape.
    ///
    /// Class indices are not checked here: a grid may refer to spectra that
    /// were deleted since, which rendering reports as out of range.
    pub fn validate(&self) -> Result<()> {
        self.degradation.validate()?;
        LayoutBlender::with_kernel(self.blend.radius, self.blend.kernel)?;
        if let Some(grid) = &self.layout.grid {
            if grid.width() != self.layout.width || grid.height() != self.layout.height {
                return Err(SynthError::DimensionMismatch {
                    expected: format!("{}x{} grid", self.layout.width, self.layout.height),
                    actual: format!("{}x{} grid", grid.width(), grid.height()),
                });
            }
        }
        Ok(())
    }

    /// Build the cube without degradation
    pub fn render_clean(&self) -> Result<Cube> {
        self.render_with(None)
    }

    /// Build the cube: layout -> blend -> assemble -> degrade
    pub fn render(&self) -> Result<Cube> {
        let chain = DegradationChain::from_config(&self.degradation)?;
        self.render_with(Some(chain))
    }

    fn render_with(&self, chain: Option<DegradationChain>) -> Result<Cube> {
        self.validate()?;

        let generated;
        let grid = match &self.layout.grid {
            Some(grid) => grid,
            None => {
                tracing::info!(pattern = %self.layout.pattern, "no stored grid, generating one");
                generated = layout_generator(self.layout.seed).generate(
                    self.layout.pattern,
                    self.layout.width,
                    self.layout.height,
                    self.spectra.len(),
                )?;
                &generated
            }
        };

        let weights = LayoutBlender::with_kernel(self.blend.radius, self.blend.kernel)?.blend(grid)?;
        tracing::info!(radius = self.blend.radius, "layout blended");

        let mut assembler = CubeAssembler::new(self.num_bands())?;
        if let Some(chain) = chain {
            assembler = assembler.with_degradation(chain);
        }
        let cube = assembler.assemble(&weights, &self.spectra.band_vectors())?;
        tracing::info!(
            width = cube.width(),
            height = cube.height(),
            bands = cube.num_bands(),
            "cube assembled"
        );
        Ok(cube)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let state: ProjectState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Load a project file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let state = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), classes = state.spectra.len(), "project loaded");
        Ok(state)
    }

    /// Save to a project file, stamping the modification time
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.modified_at = Some(Utc::now());
        fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), "project saved");
        Ok(())
    }
}

fn layout_generator(seed: Option<u64>) -> LayoutGenerator {
    match seed {
        Some(seed) => LayoutGenerator::seeded(seed),
        None => LayoutGenerator::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{PeakDistribution, Rgb, Spectrum, DEFAULT_NUM_BANDS};
    use pretty_assertions::assert_eq;

    fn two_class_project() -> ProjectState {
        let mut state = ProjectState::with_bands(16).unwrap();
        state
            .spectra
            .get_mut(0)
            .unwrap()
            .add_peak(PeakDistribution::new(0.2, 1.0, 0.1).unwrap())
            .unwrap();
        state
            .spectra
            .push(
                Spectrum::with_peaks(
                    "Water",
                    Rgb::new(0, 0, 255),
                    vec![PeakDistribution::new(0.8, 0.6, 0.05).unwrap()],
                    16,
                )
                .unwrap(),
            )
            .unwrap();
        state.layout.width = 8;
        state.layout.height = 6;
        state
    }

    #[test]
    fn test_default_project() {
        let state = ProjectState::new();
        assert_eq!(state.num_bands(), DEFAULT_NUM_BANDS);
        assert_eq!(state.spectra.names(), vec!["Background"]);
        assert_eq!(state.layout.width, DEFAULT_CANVAS_SIZE);
        assert_eq!(state.blend.radius, 0.0);
        assert!(state.degradation.is_off());
    }

    #[test]
    fn test_generate_layout_is_stored() {
        let mut state = two_class_project();
        state.layout.pattern = LayoutPattern::VerticalStripes;
        let grid = state.generate_layout().unwrap().clone();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.class_at(0, 0), Some(0));
        assert_eq!(grid.class_at(7, 5), Some(1));
        assert_eq!(state.grid(), Some(&grid));
    }

    #[test]
    fn test_json_round_trip_reproduces_cube() {
        let mut state = two_class_project();
        state.layout.pattern = LayoutPattern::Random;
        state.layout.seed = Some(99);
        state.blend.radius = 1.5;
        state.generate_layout().unwrap();

        let restored = ProjectState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.render().unwrap(), state.render().unwrap());
    }

    #[test]
    fn test_render_without_grid_uses_seed() {
        let mut state = two_class_project();
        state.layout.pattern = LayoutPattern::Random;
        state.layout.seed = Some(5);
        let a = state.render().unwrap();
        let b = state.render().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), (8, 6, 16));
    }

    #[test]
    fn test_removed_spectrum_invalidates_grid() {
        let mut state = two_class_project();
        state.generate_layout().unwrap();
        state.spectra.remove(1).unwrap();
        let err = state.render().unwrap_err();
        assert_eq!(err.error_code(), "CLASS_INDEX_OUT_OF_RANGE");
    }

    #[test]
    fn test_reset_keeps_bands_and_canvas() {
        let mut state = two_class_project();
        state.generate_layout().unwrap();
        state.reset().unwrap();
        assert_eq!(state.spectra.len(), 1);
        assert_eq!(state.num_bands(), 16);
        assert_eq!(state.layout.width, 8);
        assert!(state.grid().is_none());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let state = ProjectState::from_json("{}").unwrap();
        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(state.num_bands(), DEFAULT_NUM_BANDS);
        assert_eq!(state.spectra.len(), 1);
    }

    #[test]
    fn test_invalid_blend_radius_rejected_on_load() {
        let json = r#"{"blend": {"radius": -2.0}}"#;
        assert!(ProjectState::from_json(json).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut state = two_class_project();
        state.generate_layout().unwrap();
        state.save(&path).unwrap();
        assert!(state.modified_at.is_some());
        let loaded = ProjectState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }
}
