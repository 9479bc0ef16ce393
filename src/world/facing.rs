//! # Facing Module
//!
//! This module defines the six faces of a voxel cell.
//! It provides the neighbor offsets used for face culling and the boundary
//! classification used by the section visibility graph.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Represents the six possible faces of a voxel cell.
///
/// Each variant is assigned a unique integer value for efficient storage; the
/// values index the per-face tables used during geometry emission and pack the
/// face-pair bits of a visibility set.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum Facing {
    /// The front face (facing negative Z)
    FRONT = 0,

    /// The back face (facing positive Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl Facing {
    /// Returns an array containing all six faces in a consistent order.
    ///
    /// This is useful for iterating over all possible faces of a cell.
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    ///
    /// # Returns
    /// An array containing all `Facing` variants.
    pub fn all() -> [Facing; 6] {
        [
            Facing::FRONT,
            Facing::BACK,
            Facing::BOTTOM,
            Facing::TOP,
            Facing::LEFT,
            Facing::RIGHT,
        ]
    }

    /// Converts an integer face index back to a `Facing`.
    ///
    /// # Arguments
    /// * `index` - The face index, 0 through 5
    ///
    /// # Panics
    /// Panics if the index does not correspond to a face.
    pub fn from_index(index: usize) -> Self {
        let facing_option = num::FromPrimitive::from_usize(index);
        facing_option.unwrap()
    }

    /// Returns the unit offset from a cell to its neighbor through this face.
    ///
    /// # Returns
    /// A `Vector3<i32>` with exactly one non-zero component.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Facing::FRONT => Vector3::new(0, 0, -1),
            Facing::BACK => Vector3::new(0, 0, 1),
            Facing::BOTTOM => Vector3::new(0, -1, 0),
            Facing::TOP => Vector3::new(0, 1, 0),
            Facing::LEFT => Vector3::new(-1, 0, 0),
            Facing::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Returns the face on the opposite side of the cell.
    pub fn opposite(self) -> Facing {
        match self {
            Facing::FRONT => Facing::BACK,
            Facing::BACK => Facing::FRONT,
            Facing::BOTTOM => Facing::TOP,
            Facing::TOP => Facing::BOTTOM,
            Facing::LEFT => Facing::RIGHT,
            Facing::RIGHT => Facing::LEFT,
        }
    }
}
