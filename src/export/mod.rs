//! Cube Export
//!
//! Writes a cube as an ENVI raw file plus header, and a JSON sidecar with
//! class names and a SHA-256 checksum of the raw data:
//! - `<stem>.raw`: little-endian samples, band-interleaved by pixel
//! - `<stem>.hdr`: ENVI header
//! - `<stem>.json`: `CubeMetadata`

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cube::Cube;
use crate::error::{Result, SynthError};
use crate::spectrum::ClassSpectra;

/// Sample type of the raw file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    /// 32-bit IEEE float (ENVI data type 4)
    Float32,
    /// 64-bit IEEE float (ENVI data type 5)
    #[default]
    Float64,
}

impl SampleType {
    /// ENVI `data type` code
    pub fn envi_code(&self) -> u8 {
        match self {
            SampleType::Float32 => 4,
            SampleType::Float64 => 5,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::Float32 => 4,
            SampleType::Float64 => 8,
        }
    }
}

/// Export format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFormat {
    #[serde(default)]
    pub sample_type: SampleType,
}

/// One class as recorded in the metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub index: usize,
    pub name: String,
    pub color: String,
}

impl ClassInfo {
    pub fn from_spectra(spectra: &ClassSpectra) -> Vec<ClassInfo> {
        spectra
            .iter()
            .enumerate()
            .map(|(index, s)| ClassInfo {
                index,
                name: s.name().to_string(),
                color: s.color().to_hex(),
            })
            .collect()
    }
}

/// JSON sidecar describing an exported cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeMetadata {
    pub width: usize,
    pub height: usize,
    pub num_bands: usize,
    pub interleave: String,
    pub sample_type: SampleType,
    pub byte_order: String,
    pub min_value: f64,
    pub max_value: f64,
    pub classes: Vec<ClassInfo>,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
    pub generator_version: String,
}

/// Files written for one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub raw: PathBuf,
    pub header: PathBuf,
    pub metadata: PathBuf,
}

impl ExportPaths {
    /// `<stem>.raw`, `<stem>.hdr`, `<stem>.json`
    pub fn from_stem(stem: &Path) -> Self {
        Self {
            raw: stem.with_extension("raw"),
            header: stem.with_extension("hdr"),
            metadata: stem.with_extension("json"),
        }
    }
}

/// ENVI header text for `cube`
pub fn envi_header(cube: &Cube, format: ExportFormat) -> String {
    let band_names: Vec<String> = (1..=cube.num_bands()).map(|b| format!("Band {}", b)).collect();
    format!(
        "ENVI\n\
         description = {{Synthetic hyperspectral cube}}\n\
         samples = {}\n\
         lines = {}\n\
         bands = {}\n\
         header offset = 0\n\
         file type = ENVI Standard\n\
         data type = {}\n\
         interleave = bip\n\
         byte order = 0\n\
         band names = {{{}}}\n",
        cube.width(),
        cube.height(),
        cube.num_bands(),
        format.sample_type.envi_code(),
        band_names.join(", ")
    )
}

/// Write the raw samples, returning the SHA-256 of the written bytes
fn write_raw(cube: &Cube, path: &Path, format: ExportFormat) -> Result<String> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut hasher = Sha256::new();
    for &value in cube.data() {
        match format.sample_type {
            SampleType::Float32 => {
                let bytes = (value as f32).to_le_bytes();
                hasher.update(bytes);
                writer.write_all(&bytes)?;
            }
            SampleType::Float64 => {
                let bytes = value.to_le_bytes();
                hasher.update(bytes);
                writer.write_all(&bytes)?;
            }
        }
    }
    writer.flush()?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Export `cube` next to `stem`
pub fn export_cube(
    cube: &Cube,
    stem: &Path,
    classes: Vec<ClassInfo>,
    format: ExportFormat,
) -> Result<(ExportPaths, CubeMetadata)> {
    let paths = ExportPaths::from_stem(stem);
    if let Some(parent) = paths.raw.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let sha256 = write_raw(cube, &paths.raw, format)?;
    fs::write(&paths.header, envi_header(cube, format))?;

    let (min_value, max_value) = cube.min_max();
    let metadata = CubeMetadata {
        width: cube.width(),
        height: cube.height(),
        num_bands: cube.num_bands(),
        interleave: "bip".to_string(),
        sample_type: format.sample_type,
        byte_order: "little_endian".to_string(),
        min_value,
        max_value,
        classes,
        sha256,
        created_at: Utc::now(),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    fs::write(&paths.metadata, serde_json::to_string_pretty(&metadata)?)?;

    tracing::info!(
        raw = %paths.raw.display(),
        bytes = cube.data().len() * format.sample_type.bytes_per_sample(),
        "cube exported"
    );
    Ok((paths, metadata))
}

/// Read a raw BIP file written by [`export_cube`]
pub fn read_raw(
    path: &Path,
    width: usize,
    height: usize,
    num_bands: usize,
    sample_type: SampleType,
) -> Result<Cube> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    let size = sample_type.bytes_per_sample();
    let expected = width * height * num_bands * size;
    if bytes.len() != expected {
        return Err(SynthError::DimensionMismatch {
            expected: format!("{} bytes", expected),
            actual: format!("{} bytes", bytes.len()),
        });
    }
    let data = bytes
        .chunks_exact(size)
        .map(|chunk| match sample_type {
            SampleType::Float32 => {
                f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64
            }
            SampleType::Float64 => f64::from_le_bytes([
                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
            ]),
        })
        .collect();
    Cube::from_vec(width, height, num_bands, data)
}

/// SHA-256 of a file, for verifying an export against its metadata
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
