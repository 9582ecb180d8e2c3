//! Layout patterns

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Spatial arrangement of classes over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPattern {
    /// Contiguous bands of rows, class index grows downwards
    #[default]
    HorizontalStripes,
    /// Contiguous bands of columns, class index grows to the right
    VerticalStripes,
    /// Near-square tiling of rectangular tiles
    Grid,
    /// Independent uniform class per pixel
    Random,
}

impl LayoutPattern {
    pub const ALL: [LayoutPattern; 4] = [
        LayoutPattern::HorizontalStripes,
        LayoutPattern::VerticalStripes,
        LayoutPattern::Grid,
        LayoutPattern::Random,
    ];

    /// Identifier used in scene files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPattern::HorizontalStripes => "horizontal-stripes",
            LayoutPattern::VerticalStripes => "vertical-stripes",
            LayoutPattern::Grid => "grid",
            LayoutPattern::Random => "random",
        }
    }

    /// Whether generating this pattern consumes randomness
    pub fn is_random(&self) -> bool {
        matches!(self, LayoutPattern::Random)
    }
}

impl fmt::Display for LayoutPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutPattern {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        LayoutPattern::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                SynthError::invalid(
                    "pattern",
                    format!(
                        "unknown layout pattern '{}' (expected horizontal-stripes, vertical-stripes, grid or random)",
                        s
                    ),
                )
            })
    }
}
