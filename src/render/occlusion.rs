//! # Occlusion Module
//!
//! This module computes the face-to-face visibility relation of a chunk
//! section. During volume traversal every cell classified as a full opaque
//! cube is marked in a bit map; afterwards a flood fill over the remaining
//! cells determines which of the section's six outward faces are connected
//! through empty space.
//!
//! ## Algorithm
//!
//! The 16x16x16 grid restricted to non-opaque cells is partitioned into
//! connected components by an iterative flood fill. Each component records
//! the set of boundary faces it touches; every pair of faces touched by the
//! same component is marked mutually visible. The result is exact for the
//! snapshot it was computed from: a single-cell-wide tunnel is enough to
//! connect two faces. Correctness matters asymmetrically here, since a
//! missing pair makes the renderer skip sections that should be drawn while
//! a spurious pair only costs draw time, so anything not provably walled off
//! counts as connected.
//!
//! ## Performance
//!
//! The fill visits each of the 4096 cells at most once and uses fixed-size
//! bit maps and a reusable stack, so the whole computation is a small, flat
//! O(volume) pass at the end of a build.

use bitvec::prelude::BitVec;

use crate::world::slice::{section_index, CHUNK_DIMENSION, CHUNK_SIZE};
use crate::world::Facing;

/// A symmetric relation over the six section faces.
///
/// Bit `from * 6 + to` records that `to` is reachable from `from` through
/// non-opaque cells of the volume. The relation is stored in a single `u64`
/// so render data stays copyable and comparisons are cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilitySet {
    bits: u64,
}

impl VisibilitySet {
    /// Returns a set with no face pair visible.
    pub fn none() -> Self {
        VisibilitySet { bits: 0 }
    }

    /// Returns a set with every face pair visible.
    pub fn all() -> Self {
        let mut set = VisibilitySet::none();
        for from in Facing::all() {
            for to in Facing::all() {
                set.set_visible(from, to);
            }
        }
        set
    }

    /// Marks `from` and `to` as mutually visible.
    pub fn set_visible(&mut self, from: Facing, to: Facing) {
        self.bits |= 1u64 << (from as usize * 6 + to as usize);
        self.bits |= 1u64 << (to as usize * 6 + from as usize);
    }

    /// Returns whether `to` is visible from `from` through the volume.
    pub fn is_visible(&self, from: Facing, to: Facing) -> bool {
        self.bits & (1u64 << (from as usize * 6 + to as usize)) != 0
    }
}

/// Accumulates the opaque-cube map of one build and computes its visibility.
///
/// `set_opaque_cube` is called from the same traversal that emits geometry,
/// so the visibility relation always describes exactly the volume that was
/// meshed. `compute_visibility` is called once, after the full traversal.
pub struct OcclusionBuilder {
    /// One bit per section cell, set when the cell is a full opaque cube
    opaque: BitVec,
    /// Number of bits set, to short-circuit fully opaque volumes
    opaque_count: usize,
}

impl OcclusionBuilder {
    /// Creates a builder with every cell considered passable.
    pub fn new() -> Self {
        OcclusionBuilder {
            opaque: BitVec::repeat(false, CHUNK_SIZE as usize),
            opaque_count: 0,
        }
    }

    /// Marks the cell at section-relative coordinates as a full opaque cube.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Coordinates relative to the section origin, 0 to 15
    pub fn set_opaque_cube(&mut self, x: i32, y: i32, z: i32) {
        let index = section_index(x, y, z);
        if !self.opaque[index] {
            self.opaque.set(index, true);
            self.opaque_count += 1;
        }
    }

    /// Computes which pairs of section faces are connected through
    /// non-opaque cells.
    ///
    /// # Returns
    /// The symmetric [`VisibilitySet`] of the accumulated volume. A fully
    /// opaque volume reports no pair visible; an unobstructed volume reports
    /// every pair visible.
    pub fn compute_visibility(&self) -> VisibilitySet {
        let mut visibility = VisibilitySet::none();

        if self.opaque_count == CHUNK_SIZE as usize {
            return visibility;
        }

        let mut visited: BitVec = BitVec::repeat(false, CHUNK_SIZE as usize);
        let mut stack: Vec<u16> = Vec::with_capacity(CHUNK_SIZE as usize);

        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let index = section_index(x, y, z);
                    if visited[index] || self.opaque[index] {
                        continue;
                    }

                    let faces = self.flood_component(x, y, z, &mut visited, &mut stack);
                    mark_connected(&mut visibility, faces);
                }
            }
        }

        visibility
    }

    /// Flood-fills one connected component of non-opaque cells starting at
    /// the given cell, returning the bit set of boundary faces it touches.
    fn flood_component(
        &self,
        x: i32,
        y: i32,
        z: i32,
        visited: &mut BitVec,
        stack: &mut Vec<u16>,
    ) -> u8 {
        let mut faces = 0u8;

        visited.set(section_index(x, y, z), true);
        stack.push(pack_cell(x, y, z));

        while let Some(cell) = stack.pop() {
            let (cx, cy, cz) = unpack_cell(cell);
            faces |= boundary_faces(cx, cy, cz);

            for facing in Facing::all() {
                let offset = facing.offset();
                let (nx, ny, nz) = (cx + offset.x, cy + offset.y, cz + offset.z);
                if !(0..CHUNK_DIMENSION).contains(&nx)
                    || !(0..CHUNK_DIMENSION).contains(&ny)
                    || !(0..CHUNK_DIMENSION).contains(&nz)
                {
                    continue;
                }

                let neighbor = section_index(nx, ny, nz);
                if !visited[neighbor] && !self.opaque[neighbor] {
                    visited.set(neighbor, true);
                    stack.push(pack_cell(nx, ny, nz));
                }
            }
        }

        faces
    }
}

impl Default for OcclusionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Packs section-relative coordinates into a 16-bit cell id for the fill stack.
#[inline]
fn pack_cell(x: i32, y: i32, z: i32) -> u16 {
    (x | (y << 4) | (z << 8)) as u16
}

/// Unpacks a 16-bit cell id back into section-relative coordinates.
#[inline]
fn unpack_cell(cell: u16) -> (i32, i32, i32) {
    (
        (cell & 0xF) as i32,
        ((cell >> 4) & 0xF) as i32,
        ((cell >> 8) & 0xF) as i32,
    )
}

/// Returns the bit set of section faces the given cell lies on.
#[inline]
fn boundary_faces(x: i32, y: i32, z: i32) -> u8 {
    let mut faces = 0u8;
    if z == 0 {
        faces |= 1 << Facing::FRONT as u8;
    }
    if z == CHUNK_DIMENSION - 1 {
        faces |= 1 << Facing::BACK as u8;
    }
    if y == 0 {
        faces |= 1 << Facing::BOTTOM as u8;
    }
    if y == CHUNK_DIMENSION - 1 {
        faces |= 1 << Facing::TOP as u8;
    }
    if x == 0 {
        faces |= 1 << Facing::LEFT as u8;
    }
    if x == CHUNK_DIMENSION - 1 {
        faces |= 1 << Facing::RIGHT as u8;
    }
    faces
}

/// Marks every pair of faces in the given bit set as mutually visible.
fn mark_connected(visibility: &mut VisibilitySet, faces: u8) {
    for from in Facing::all() {
        if faces & (1 << from as u8) == 0 {
            continue;
        }
        for to in Facing::all() {
            if faces & (1 << to as u8) != 0 {
                visibility.set_visible(from, to);
            }
        }
    }
}
