//! Layout Module
//!
//! Spatial class layouts:
//! - `ImageLayout`: hard per-pixel class assignment
//! - `LayoutPattern`: the named arrangements
//! - `LayoutGenerator`: pattern -> layout, with injectable randomness

mod generator;
mod image_layout;
mod pattern;

pub use generator::{grid_shape, stripe_index, LayoutGenerator};
pub use image_layout::{ImageLayout, UNASSIGNED};
pub use pattern::LayoutPattern;
