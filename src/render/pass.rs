//! # Render Pass Module
//!
//! This module defines the classification of chunk geometry by blending and
//! material behavior. Each pass owns its own build buffer and its own
//! finalized mesh, because the passes are drawn with different pipeline state
//! and cannot share draw buffers.

use num_derive::FromPrimitive;

/// Enumerates the render passes chunk geometry is partitioned into.
///
/// The integer values index the per-pass arrays of
/// [`crate::render::buffers::ChunkBuildBuffers`] and
/// [`crate::render::render_data::ChunkRenderData`]. The `FromPrimitive`
/// derive allows conversion from pass indices when iterating those arrays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum RenderPass {
    /// Fully opaque geometry, drawn first with depth writes.
    OPAQUE,

    /// Alpha-tested geometry such as foliage, no blending.
    CUTOUT,

    /// Alpha-blended geometry such as water and glass, drawn back to front.
    TRANSLUCENT,
}

/// The number of render passes.
pub const RENDER_PASS_COUNT: usize = 3;

impl RenderPass {
    /// Returns an array containing all passes in draw order.
    ///
    /// # Returns
    /// An array containing all `RenderPass` variants.
    pub fn all() -> [RenderPass; RENDER_PASS_COUNT] {
        [
            RenderPass::OPAQUE,
            RenderPass::CUTOUT,
            RenderPass::TRANSLUCENT,
        ]
    }

    /// Converts a pass index back to a `RenderPass`.
    ///
    /// # Arguments
    /// * `index` - The pass index, 0 through 2
    ///
    /// # Panics
    /// Panics if the index does not correspond to a pass.
    pub fn from_index(index: usize) -> Self {
        let pass_option = num::FromPrimitive::from_usize(index);
        pass_option.unwrap()
    }

    /// Returns whether geometry in this pass is blended.
    ///
    /// Blended passes need back-to-front draw ordering by the renderer; the
    /// mesher itself only records the classification.
    pub fn is_translucent(self) -> bool {
        self == RenderPass::TRANSLUCENT
    }
}
