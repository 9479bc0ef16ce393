//! # Build Buffers Module
//!
//! This module provides the per-task scratch buffers geometry is emitted
//! into. Each render pass gets its own growable vertex and index builder,
//! created lazily the first time the pass receives geometry. A worker thread
//! owns one `ChunkBuildBuffers` and reuses it for every build it runs, so
//! buffer growth amortizes across a session instead of recurring per build.
//!
//! ## Coordinate Handling
//!
//! Vertices are emitted in unit-cube space and shifted by the current render
//! offset, which the rebuild task sets to each block's position relative to
//! the section origin before emitting that block. Keeping mesh coordinates
//! section-relative preserves float precision far from the world origin.

use cgmath::{Point3, Vector3};

use crate::core::error::BuildError;

use super::mesh::ChunkMeshData;
use super::pass::{RenderPass, RENDER_PASS_COUNT};
use super::vertex::ChunkVertex;
use crate::world::Facing;

/// A growable vertex and index buffer for a single render pass.
///
/// Quads are appended through [`PassBufferBuilder::push_quad`]; the builder
/// tracks the current render offset so callers emit in unit-cube space.
pub struct PassBufferBuilder {
    vertices: Vec<ChunkVertex>,
    indices: Vec<u32>,
    render_offset: Vector3<f32>,
}

impl PassBufferBuilder {
    fn new() -> Self {
        PassBufferBuilder {
            vertices: Vec::new(),
            indices: Vec::new(),
            render_offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Appends one quad to the buffer.
    ///
    /// Corners are given in unit-cube space in the order lower-left,
    /// lower-right, upper-left, upper-right as seen from outside the face;
    /// two counter-clockwise triangles are indexed per quad.
    ///
    /// # Arguments
    /// * `corners` - The four corner positions in ll, lr, ul, ur order
    /// * `uvs` - Texture coordinates per corner, same order
    /// * `texture_index` - Texture lookup index of the emitting state
    /// * `facing` - The face being emitted, recorded per vertex
    pub fn push_quad(
        &mut self,
        corners: [Point3<f32>; 4],
        uvs: [[f32; 2]; 4],
        texture_index: u32,
        facing: Facing,
    ) {
        let base = self.vertices.len() as u32;

        for (corner, uv) in corners.iter().zip(uvs.iter()) {
            self.vertices.push(ChunkVertex::new(
                *corner + self.render_offset,
                texture_index,
                uv[0],
                uv[1],
                facing as u32,
            ));
        }

        self.indices
            .extend_from_slice(&[base, base + 1, base + 3, base, base + 3, base + 2]);
    }

    /// Returns whether this pass has received any geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the number of vertices emitted so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// The full set of per-pass scratch buffers for one build task.
///
/// Lives on a worker thread for the worker's lifetime; `init` is called at
/// the start of every build to clear, not deallocate, the pass builders.
pub struct ChunkBuildBuffers {
    builders: [Option<PassBufferBuilder>; RENDER_PASS_COUNT],
    render_offset: Vector3<f32>,
}

impl ChunkBuildBuffers {
    /// Creates a buffer set with no pass builders allocated yet.
    pub fn new() -> Self {
        ChunkBuildBuffers {
            builders: [None, None, None],
            render_offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Resets all pass buffers to empty, keeping their capacity.
    pub fn init(&mut self) {
        for builder in self.builders.iter_mut().flatten() {
            builder.reset();
        }
        self.render_offset = Vector3::new(0.0, 0.0, 0.0);
    }

    /// Establishes the local coordinate origin for subsequently emitted quads.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Block position relative to the section origin
    pub fn set_render_offset(&mut self, x: i32, y: i32, z: i32) {
        self.render_offset = Vector3::new(x as f32, y as f32, z as f32);
    }

    /// Returns the writable buffer for a render pass, creating it lazily.
    ///
    /// # Arguments
    /// * `pass` - The render pass to emit into
    pub fn get(&mut self, pass: RenderPass) -> &mut PassBufferBuilder {
        let builder = self.builders[pass as usize].get_or_insert_with(PassBufferBuilder::new);
        builder.render_offset = self.render_offset;
        builder
    }

    /// Finalizes and returns the mesh for a pass, or `None` if the pass
    /// received no geometry.
    ///
    /// The builder itself stays usable for the next build; the mesh holds an
    /// exactly-sized copy of its contents.
    ///
    /// # Arguments
    /// * `pass` - The render pass to finalize
    ///
    /// # Errors
    /// [`BuildError::VertexOverflow`] if the pass holds more vertices than a
    /// 32-bit index can address.
    pub fn create_mesh(&self, pass: RenderPass) -> Result<Option<ChunkMeshData>, BuildError> {
        let builder = match &self.builders[pass as usize] {
            Some(builder) if !builder.is_empty() => builder,
            _ => return Ok(None),
        };

        if builder.vertices.len() > u32::MAX as usize {
            return Err(BuildError::VertexOverflow { pass });
        }

        Ok(Some(ChunkMeshData::new(
            builder.vertices.clone(),
            builder.indices.clone(),
        )))
    }
}

impl Default for ChunkBuildBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

    fn unit_corners() -> [Point3<f32>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn empty_pass_produces_no_mesh() {
        let buffers = ChunkBuildBuffers::new();
        for pass in RenderPass::all() {
            assert!(buffers.create_mesh(pass).unwrap().is_none());
        }
    }

    #[test]
    fn quads_are_indexed_as_two_triangles() {
        let mut buffers = ChunkBuildBuffers::new();
        buffers.init();
        let builder = buffers.get(RenderPass::OPAQUE);
        builder.push_quad(unit_corners(), UNIT_UVS, 7, Facing::FRONT);
        builder.push_quad(unit_corners(), UNIT_UVS, 7, Facing::BACK);

        let mesh = buffers.create_mesh(RenderPass::OPAQUE).unwrap().unwrap();
        assert_eq!(mesh.vertices().len(), 8);
        assert_eq!(mesh.indices().len(), 12);
        assert_eq!(&mesh.indices()[..6], &[0, 1, 3, 0, 3, 2]);
        assert_eq!(&mesh.indices()[6..], &[4, 5, 7, 4, 7, 6]);
    }

    #[test]
    fn render_offset_shifts_vertices() {
        let mut buffers = ChunkBuildBuffers::new();
        buffers.init();
        buffers.set_render_offset(3, 0, 15);
        buffers
            .get(RenderPass::CUTOUT)
            .push_quad(unit_corners(), UNIT_UVS, 1, Facing::TOP);

        let mesh = buffers.create_mesh(RenderPass::CUTOUT).unwrap().unwrap();
        assert_eq!(mesh.vertices()[0].position(), Point3::new(3.0, 0.0, 15.0));
        assert_eq!(mesh.vertices()[3].position(), Point3::new(4.0, 1.0, 15.0));
    }

    #[test]
    fn init_clears_previous_build() {
        let mut buffers = ChunkBuildBuffers::new();
        buffers.init();
        buffers
            .get(RenderPass::OPAQUE)
            .push_quad(unit_corners(), UNIT_UVS, 2, Facing::LEFT);
        assert!(buffers.create_mesh(RenderPass::OPAQUE).unwrap().is_some());

        buffers.init();
        assert!(buffers.create_mesh(RenderPass::OPAQUE).unwrap().is_none());
    }
}
