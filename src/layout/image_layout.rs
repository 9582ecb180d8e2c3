//! Image layout grid
//!
//! A `width x height` grid of class indices stored row-major. `-1` marks
//! a pixel that has not been assigned a class yet.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/// Cell value of a pixel with no class
pub const UNASSIGNED: i32 = -1;

/// Per-pixel hard class assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ImageLayoutRecord", into = "ImageLayoutRecord")]
pub struct ImageLayout {
    width: usize,
    height: usize,
    class_index: Vec<i32>,
}

/// Serialized shape: rows of class indices, `class_index[y][x]`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImageLayoutRecord {
    width: usize,
    height: usize,
    class_index: Vec<Vec<i32>>,
}

impl TryFrom<ImageLayoutRecord> for ImageLayout {
    type Error = SynthError;

    fn try_from(record: ImageLayoutRecord) -> Result<Self> {
        let mut layout = ImageLayout::new(record.width, record.height)?;
        if record.class_index.len() != record.height {
            return Err(SynthError::DimensionMismatch {
                expected: format!("{} rows", record.height),
                actual: format!("{} rows", record.class_index.len()),
            });
        }
        for (y, row) in record.class_index.iter().enumerate() {
            if row.len() != record.width {
                return Err(SynthError::DimensionMismatch {
                    expected: format!("{} columns in row {}", record.width, y),
                    actual: format!("{} columns", row.len()),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                if value < UNASSIGNED {
                    return Err(SynthError::invalid(
                        format!("class_index[{}][{}]", y, x),
                        format!("must be -1 or a class index, got {}", value),
                    ));
                }
                layout.class_index[y * record.width + x] = value;
            }
        }
        Ok(layout)
    }
}

impl From<ImageLayout> for ImageLayoutRecord {
    fn from(layout: ImageLayout) -> Self {
        let class_index = layout
            .class_index
            .chunks(layout.width)
            .map(|row| row.to_vec())
            .collect();
        Self {
            width: layout.width,
            height: layout.height,
            class_index,
        }
    }
}

/// Reject zero-sized canvases
pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 {
        return Err(SynthError::invalid("width", "must be greater than 0"));
    }
    if height == 0 {
        return Err(SynthError::invalid("height", "must be greater than 0"));
    }
    Ok(())
}

impl ImageLayout {
    /// A fully unassigned layout
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            class_index: vec![UNASSIGNED; width * height],
        })
    }

    /// Build a layout from rows of class indices
    pub fn from_rows(rows: &[Vec<usize>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let record = ImageLayoutRecord {
            width,
            height,
            class_index: rows
                .iter()
                .map(|row| row.iter().map(|&c| c as i32).collect())
                .collect(),
        };
        Self::try_from(record)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_pixels(&self) -> usize {
        self.class_index.len()
    }

    /// Raw cell value at `(x, y)`, `-1` when unassigned
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.class_index[y * self.width + x]
    }

    /// Class at `(x, y)`, or `None` when unassigned
    #[inline]
    pub fn class_at(&self, x: usize, y: usize) -> Option<usize> {
        usize::try_from(self.get(x, y)).ok()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, class: usize) {
        self.class_index[y * self.width + x] = class as i32;
    }

    pub fn row(&self, y: usize) -> &[i32] {
        let start = y * self.width;
        &self.class_index[start..start + self.width]
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[i32] {
        &self.class_index
    }

    /// True once every pixel holds a class
    pub fn is_fully_assigned(&self) -> bool {
        self.class_index.iter().all(|&c| c != UNASSIGNED)
    }

    /// Mark every pixel unassigned again
    pub fn clear(&mut self) {
        self.class_index.fill(UNASSIGNED);
    }

    /// Change the canvas size, discarding every assignment
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        check_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        self.class_index = vec![UNASSIGNED; width * height];
        Ok(())
    }

    /// Largest class index in use
    pub fn max_class(&self) -> Option<usize> {
        self.class_index
            .iter()
            .filter_map(|&c| usize::try_from(c).ok())
            .max()
    }

    /// Number of pixels per class; slots run up to the largest class in use
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.max_class().map_or(0, |m| m + 1)];
        for class in self.class_index.iter().filter_map(|&c| usize::try_from(c).ok()) {
            counts[class] += 1;
        }
        counts
    }

    /// Check that every pixel is assigned to one of `num_classes` classes
    pub fn validate_against(&self, num_classes: usize) -> Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                match self.class_at(x, y) {
                    None => return Err(SynthError::UnassignedPixel { x, y }),
                    Some(index) if index >= num_classes => {
                        return Err(SynthError::ClassIndexOutOfRange {
                            index,
                            available: num_classes,
                            x,
                            y,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_is_unassigned() {
        let layout = ImageLayout::new(4, 3).unwrap();
        assert_eq!(layout.num_pixels(), 12);
        assert!(layout.cells().iter().all(|&c| c == UNASSIGNED));
        assert!(!layout.is_fully_assigned());
        assert_eq!(layout.class_at(0, 0), None);
        assert_eq!(layout.max_class(), None);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(ImageLayout::new(0, 3).is_err());
        assert!(ImageLayout::new(3, 0).is_err());
        assert!(ImageLayout::from_rows(&[]).is_err());
    }

    #[test]
    fn test_from_rows_and_counts() {
        let layout = ImageLayout::from_rows(&[vec![0, 0, 1], vec![2, 1, 1]]).unwrap();
        assert_eq!(layout.width(), 3);
        assert_eq!(layout.height(), 2);
        assert_eq!(layout.class_at(0, 1), Some(2));
        assert_eq!(layout.row(1), &[2, 1, 1]);
        assert_eq!(layout.class_counts(), vec![2, 3, 1]);
        assert!(layout.is_fully_assigned());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ImageLayout::from_rows(&[vec![0, 0], vec![1]]).unwrap_err();
        assert_eq!(err.error_code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn test_validate_against() {
        let mut layout = ImageLayout::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
        assert!(layout.validate_against(2).is_ok());
        assert!(matches!(
            layout.validate_against(1),
            Err(SynthError::ClassIndexOutOfRange {
                index: 1,
                available: 1,
                x: 1,
                y: 0
            })
        ));
        layout.clear();
        assert!(matches!(
            layout.validate_against(2),
            Err(SynthError::UnassignedPixel { x: 0, y: 0 })
        ));
    }

    #[test]
    fn test_serde_uses_nested_rows() {
        let layout = ImageLayout::from_rows(&[vec![0, 1], vec![1, 1]]).unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["class_index"], serde_json::json!([[0, 1], [1, 1]]));
        let restored: ImageLayout = serde_json::from_value(json).unwrap();
        assert_eq!(restored, layout);
    }

    #[test]
    fn test_serde_rejects_bad_cells() {
        let json = serde_json::json!({"width": 2, "height": 1, "class_index": [[0, -3]]});
        assert!(serde_json::from_value::<ImageLayout>(json).is_err());
    }

    #[test]
    fn test_resize_discards_assignments() {
        let mut layout = ImageLayout::from_rows(&[vec![0, 1]]).unwrap();
        layout.resize(3, 3).unwrap();
        assert_eq!(layout.num_pixels(), 9);
        assert!(!layout.is_fully_assigned());
    }
}
