//! Finalized mesh data for a single render pass.

use super::vertex::ChunkVertex;

/// Immutable, finalized vertex data for one render pass of one section build.
///
/// Produced at most once per pass per build by
/// [`crate::render::buffers::ChunkBuildBuffers::create_mesh`]; a pass that
/// received no geometry produces no mesh at all. The vertex and index vectors
/// are exactly sized and never mutated after creation, so the upload
/// collaborator can map them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMeshData {
    vertices: Vec<ChunkVertex>,
    indices: Vec<u32>,
}

impl ChunkMeshData {
    /// Wraps finalized buffers. Only the build buffers create mesh data.
    pub(crate) fn new(vertices: Vec<ChunkVertex>, indices: Vec<u32>) -> Self {
        ChunkMeshData { vertices, indices }
    }

    /// Returns the finalized vertex data.
    pub fn vertices(&self) -> &[ChunkVertex] {
        &self.vertices
    }

    /// Returns the finalized index data.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the vertex data as raw bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the index data as raw bytes for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
