//! # Render Bounds Module
//!
//! This module provides the axis-aligned culling bounds accumulated during a
//! section build. Every cell that contributed geometry or registered a block
//! entity extends the running box; the finalized bounds anchor the box to the
//! section's world position so the renderer can frustum-cull whole sections.

use cgmath::Point3;

use crate::world::slice::CHUNK_DIMENSION;

/// World-space axis-aligned bounds of a section's renderable content.
///
/// The box is inclusive on both ends and measured in whole blocks. An empty
/// section degrades to a zero-extent box at the section origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRenderBounds {
    /// Minimum corner, in world block coordinates
    pub min: Point3<i32>,
    /// Maximum corner, in world block coordinates (inclusive)
    pub max: Point3<i32>,
}

impl ChunkRenderBounds {
    /// Returns whether the bounds cover no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x
    }
}

/// Incrementally accumulates the bounds of one build.
///
/// `add_block` is called from the volume traversal with section-relative
/// coordinates; `build` is called exactly once at the end. Tolerates zero
/// `add_block` calls for sections with no renderable content.
pub struct BoundsBuilder {
    min: Point3<i32>,
    max: Point3<i32>,
}

impl BoundsBuilder {
    /// Creates a builder covering nothing.
    pub fn new() -> Self {
        BoundsBuilder {
            min: Point3::new(CHUNK_DIMENSION, CHUNK_DIMENSION, CHUNK_DIMENSION),
            max: Point3::new(-1, -1, -1),
        }
    }

    /// Extends the running box to contain the given section-relative block.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Coordinates relative to the section origin, 0 to 15
    pub fn add_block(&mut self, x: i32, y: i32, z: i32) {
        self.min.x = self.min.x.min(x);
        self.min.y = self.min.y.min(y);
        self.min.z = self.min.z.min(z);
        self.max.x = self.max.x.max(x);
        self.max.y = self.max.y.max(y);
        self.max.z = self.max.z.max(z);
    }

    /// Finalizes the bounds against the section's world-space origin.
    ///
    /// # Arguments
    /// * `origin` - World-space block position of the section's minimum corner
    ///
    /// # Returns
    /// World-space bounds containing every added block, or a zero-extent box
    /// at the origin if no block was ever added.
    pub fn build(&self, origin: Point3<i32>) -> ChunkRenderBounds {
        if self.max.x < self.min.x {
            return ChunkRenderBounds {
                min: origin,
                max: Point3::new(origin.x - 1, origin.y - 1, origin.z - 1),
            };
        }

        ChunkRenderBounds {
            min: Point3::new(
                origin.x + self.min.x,
                origin.y + self.min.y,
                origin.z + self.min.z,
            ),
            max: Point3::new(
                origin.x + self.max.x,
                origin.y + self.max.y,
                origin.z + self.max.z,
            ),
        }
    }
}

impl Default for BoundsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_degrades_to_empty_box() {
        let builder = BoundsBuilder::new();
        let bounds = builder.build(Point3::new(32, 0, -16));

        assert!(bounds.is_empty());
        assert_eq!(bounds.min, Point3::new(32, 0, -16));
    }

    #[test]
    fn bounds_are_tight_around_added_blocks() {
        let mut builder = BoundsBuilder::new();
        builder.add_block(3, 7, 1);
        builder.add_block(10, 2, 14);
        builder.add_block(5, 5, 5);

        let bounds = builder.build(Point3::new(0, 16, 0));
        assert_eq!(bounds.min, Point3::new(3, 18, 1));
        assert_eq!(bounds.max, Point3::new(10, 23, 14));
        assert!(!bounds.is_empty());
    }

    #[test]
    fn single_block_yields_unit_box() {
        let mut builder = BoundsBuilder::new();
        builder.add_block(0, 0, 0);

        let bounds = builder.build(Point3::new(0, 0, 0));
        assert_eq!(bounds.min, Point3::new(0, 0, 0));
        assert_eq!(bounds.max, Point3::new(0, 0, 0));
    }
}
