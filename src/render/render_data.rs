//! # Render Data Module
//!
//! This module provides the immutable result record of a successful section
//! build: one optional mesh per render pass, the block entity render list,
//! the culling bounds, and the face visibility relation. Exactly one
//! `ChunkRenderData` is produced per completed build; a cancelled build
//! produces none. After hand-off the record is owned by the section's render
//! container and never mutated.

use super::bounds::ChunkRenderBounds;
use super::mesh::ChunkMeshData;
use super::occlusion::VisibilitySet;
use super::pass::{RenderPass, RENDER_PASS_COUNT};
use crate::world::BlockEntityRef;

/// One entry of the block entity render list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntityInstance {
    /// The host's handle to the entity instance
    pub entity: BlockEntityRef,
    /// Whether the entity is drawn every frame regardless of section
    /// culling, because the host classified its renderer as global
    pub per_frame: bool,
}

/// The immutable aggregate result of one completed section build.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRenderData {
    meshes: [Option<ChunkMeshData>; RENDER_PASS_COUNT],
    block_entities: Vec<BlockEntityInstance>,
    bounds: ChunkRenderBounds,
    visibility: VisibilitySet,
}

impl ChunkRenderData {
    /// Returns the finalized mesh for a pass, if the pass had geometry.
    ///
    /// # Arguments
    /// * `pass` - The render pass to look up
    pub fn mesh(&self, pass: RenderPass) -> Option<&ChunkMeshData> {
        self.meshes[pass as usize].as_ref()
    }

    /// Returns the block entities that need custom rendering.
    pub fn block_entities(&self) -> &[BlockEntityInstance] {
        &self.block_entities
    }

    /// Returns the world-space culling bounds of the section's content.
    pub fn bounds(&self) -> ChunkRenderBounds {
        self.bounds
    }

    /// Returns the face-to-face visibility relation of the section.
    pub fn visibility(&self) -> VisibilitySet {
        self.visibility
    }

    /// Returns whether the build produced nothing renderable at all.
    pub fn is_empty(&self) -> bool {
        self.meshes.iter().all(Option::is_none) && self.block_entities.is_empty()
    }
}

/// Accumulates the pieces of a [`ChunkRenderData`] during a build.
///
/// Meshes and entities are added as the traversal discovers them; bounds and
/// visibility are computed from the same traversal and supplied once at
/// [`ChunkRenderDataBuilder::build`], so a partially accumulated record can
/// never escape.
pub struct ChunkRenderDataBuilder {
    meshes: [Option<ChunkMeshData>; RENDER_PASS_COUNT],
    block_entities: Vec<BlockEntityInstance>,
}

impl ChunkRenderDataBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        ChunkRenderDataBuilder {
            meshes: [None, None, None],
            block_entities: Vec::new(),
        }
    }

    /// Stores the finalized mesh for a pass.
    ///
    /// # Arguments
    /// * `pass` - The pass the mesh belongs to
    /// * `mesh` - The finalized mesh data
    pub fn set_mesh(&mut self, pass: RenderPass, mesh: ChunkMeshData) {
        self.meshes[pass as usize] = Some(mesh);
    }

    /// Appends a block entity to the render list.
    ///
    /// # Arguments
    /// * `entity` - The host's entity handle
    /// * `per_frame` - Whether the entity's renderer is global
    pub fn add_block_entity(&mut self, entity: BlockEntityRef, per_frame: bool) {
        self.block_entities.push(BlockEntityInstance { entity, per_frame });
    }

    /// Finalizes the record with the traversal's bounds and visibility.
    ///
    /// # Arguments
    /// * `bounds` - Finalized world-space culling bounds
    /// * `visibility` - Computed face visibility relation
    ///
    /// # Returns
    /// The immutable [`ChunkRenderData`] for hand-off to the main thread.
    pub fn build(self, bounds: ChunkRenderBounds, visibility: VisibilitySet) -> ChunkRenderData {
        ChunkRenderData {
            meshes: self.meshes,
            block_entities: self.block_entities,
            bounds,
            visibility,
        }
    }
}

impl Default for ChunkRenderDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}
