//! # World Slice Module
//!
//! This module provides the read-only world snapshot a build task works from.
//! A slice covers one 16x16x16 chunk section plus a one-block halo on every
//! side, so face culling can consult neighbors without ever touching live
//! world data.
//!
//! ## Memory Layout
//!
//! Block and fluid state are stored in flat "wrapped" arrays of
//! 18x18x18 cells, x fastest, then y, then z. Relative coordinates from -1 to
//! 16 on each axis are valid lookups; coordinate (-1, -1, -1) maps to array
//! index 0. The backing arrays are large enough (about 11 KiB of ids each)
//! that they are pooled and reused across builds rather than reallocated, see
//! [`super::slice_pool::WorldSlicePool`].
//!
//! ## Ownership
//!
//! A `WorldSlice` is leased to exactly one build task at a time. The slice
//! value itself is the lease: dropping it, on any exit path of the task,
//! returns the backing storage to the pool exactly once.

use cgmath::Point3;

use super::slice_pool::{SliceStorage, WorldSlicePool};
use super::{BlockEntityRef, BlockId, FluidId};

/// The dimension (width, height, depth) of a chunk section in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk section.
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk section.
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a slice including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// The number of cells in a wrapped 2D slice plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of cells in a wrapped slice.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;

/// Converts section-relative coordinates (-1 to 16 on each axis) into an index
/// into the wrapped slice arrays.
///
/// # Arguments
/// * `x`, `y`, `z` - Coordinates relative to the section origin
///
/// # Returns
/// The flat index into an 18x18x18 wrapped array.
#[inline]
pub fn wrapped_index(x: i32, y: i32, z: i32) -> usize {
    debug_assert!((-1..=CHUNK_DIMENSION).contains(&x));
    debug_assert!((-1..=CHUNK_DIMENSION).contains(&y));
    debug_assert!((-1..=CHUNK_DIMENSION).contains(&z));

    (x + 1) as usize
        + CHUNK_DIMENSION_WRAPPED * (y + 1) as usize
        + CHUNK_PLANE_SIZE_WRAPPED * (z + 1) as usize
}

/// Converts section-relative coordinates (0 to 15 on each axis) into a
/// compact index over the unwrapped 16x16x16 volume.
///
/// Used for the block entity snapshot and the opacity map, neither of which
/// covers the halo.
#[inline]
pub fn section_index(x: i32, y: i32, z: i32) -> usize {
    debug_assert!((0..CHUNK_DIMENSION).contains(&x));
    debug_assert!((0..CHUNK_DIMENSION).contains(&y));
    debug_assert!((0..CHUNK_DIMENSION).contains(&z));

    x as usize
        + (CHUNK_DIMENSION as usize) * y as usize
        + (CHUNK_PLANE_SIZE as usize) * z as usize
}

/// An immutable snapshot of block and fluid state for one chunk section plus
/// its one-block halo.
///
/// Produced by [`WorldSlicePool::acquire`] and owned by a single build task
/// for its lifetime. Dropping the slice returns its backing storage to the
/// pool, so release is guaranteed on completion, cancellation, and failure
/// alike.
pub struct WorldSlice {
    /// Pooled backing storage; `None` only transiently during drop
    storage: Option<SliceStorage>,
    /// World-space block position of the section's minimum corner
    origin: Point3<i32>,
    /// Section coordinates (block coordinates divided by the section dimension)
    section: Point3<i32>,
    /// Handle back to the owning pool, used to return the storage on drop
    pool: WorldSlicePool,
}

impl WorldSlice {
    /// Assembles a slice from filled storage. Only the pool creates slices.
    pub(crate) fn new(
        storage: SliceStorage,
        origin: Point3<i32>,
        section: Point3<i32>,
        pool: WorldSlicePool,
    ) -> Self {
        WorldSlice {
            storage: Some(storage),
            origin,
            section,
            pool,
        }
    }

    /// Returns the world-space block position of the section's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// Returns the section coordinates of this slice.
    pub fn section(&self) -> Point3<i32> {
        self.section
    }

    /// Returns the block state at section-relative coordinates.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Coordinates relative to the section origin, -1 to 16
    #[inline]
    pub fn block_relative(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.storage().blocks[wrapped_index(x, y, z)]
    }

    /// Returns the fluid state at section-relative coordinates.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Coordinates relative to the section origin, -1 to 16
    #[inline]
    pub fn fluid_relative(&self, x: i32, y: i32, z: i32) -> FluidId {
        self.storage().fluids[wrapped_index(x, y, z)]
    }

    /// Returns the snapshotted block entity at section-relative coordinates,
    /// if one was present when the slice was taken.
    ///
    /// The entity list of a section is short, so a linear scan beats a map.
    pub fn block_entity(&self, x: i32, y: i32, z: i32) -> Option<BlockEntityRef> {
        let index = section_index(x, y, z);
        self.storage()
            .entities
            .iter()
            .find(|(cell, _)| *cell as usize == index)
            .map(|(_, entity)| *entity)
    }

    /// Returns whether the backing storage has the expected wrapped shape.
    ///
    /// A mismatch means the snapshot was corrupted after acquisition and the
    /// build must fail rather than read out of bounds.
    pub fn is_well_formed(&self) -> bool {
        let storage = self.storage();
        storage.blocks.len() == CHUNK_SIZE_WRAPPED && storage.fluids.len() == CHUNK_SIZE_WRAPPED
    }

    #[inline]
    fn storage(&self) -> &SliceStorage {
        // The option is only emptied inside drop.
        self.storage.as_ref().unwrap()
    }
}

/// Damages a slice's backing storage so corruption handling can be exercised.
#[cfg(test)]
pub(crate) fn truncate_for_tests(mut slice: WorldSlice) -> WorldSlice {
    if let Some(storage) = slice.storage.as_mut() {
        storage.blocks.truncate(10);
    }
    slice
}

impl Drop for WorldSlice {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.pool.release(storage);
        }
    }
}
