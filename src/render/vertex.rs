//! Vertex data structures for chunk meshing.
//!
//! This module defines the vertex format emitted by the build pipeline and
//! consumed by the GPU upload collaborator. The layout is plain-old-data so
//! finalized meshes can be uploaded with a single byte copy.

use cgmath::Point3;

/// A vertex in a chunk mesh.
///
/// Positions are relative to the chunk section's origin rather than absolute
/// world coordinates, because 32-bit floats lose precision at large world
/// distances; the renderer translates whole sections into place.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Facing Index: u32 (4 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChunkVertex {
    /// X coordinate relative to the section origin
    x: f32,
    /// Y coordinate relative to the section origin
    y: f32,
    /// Z coordinate relative to the section origin
    z: f32,
    /// Texture lookup index; the raw block or fluid state id, resolved by the host
    texture_index: u32,
    /// UV texture coordinates (normalized 0.0-1.0)
    tex_coords: [f32; 2],
    /// Index of the face this vertex belongs to, for normal reconstruction
    facing_index: u32,
}

impl ChunkVertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `pos` - Position relative to the section origin
    /// * `texture_index` - Texture lookup index for the emitting state
    /// * `u`, `v` - Texture coordinates
    /// * `facing_index` - Index of the face being emitted
    ///
    /// # Returns
    /// A new `ChunkVertex` instance
    pub fn new(pos: Point3<f32>, texture_index: u32, u: f32, v: f32, facing_index: u32) -> Self {
        ChunkVertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            texture_index,
            tex_coords: [u, v],
            facing_index,
        }
    }

    /// Returns the position of this vertex relative to the section origin.
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.x, self.y, self.z)
    }
}
