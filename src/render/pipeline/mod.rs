//! # Render Pipeline Module
//!
//! This module contains the per-cell geometry emission logic. The pipeline is
//! stateless: both entry points are pure functions of the slice, the cell's
//! state, and the camera position captured at task creation, so they can be
//! called for every cell of a traversal, in any order, from whichever worker
//! thread runs the build.
//!
//! Face culling consults only the slice. A face is skipped when the slice
//! says the neighboring cell fully hides it, which for block geometry means
//! an opaque-cube neighbor and for fluid geometry additionally means a
//! neighbor holding the same fluid.

use cgmath::Point3;

use crate::render::buffers::PassBufferBuilder;
use crate::world::{BlockHost, BlockId, FluidId, WorldSlice};

mod block;
mod fluid;

pub use block::face_corners;

/// The stateless per-block geometry emitter used by build tasks.
///
/// Borrows the host classifier and carries the camera snapshot needed for
/// fluid surface detail. One pipeline value lives for one build.
pub struct ChunkRenderPipeline<'a> {
    host: &'a dyn BlockHost,
    camera: Point3<f32>,
}

impl<'a> ChunkRenderPipeline<'a> {
    /// Creates a pipeline over the given classifier and camera snapshot.
    ///
    /// # Arguments
    /// * `host` - State classification capabilities
    /// * `camera` - Camera position captured when the build task was created
    pub fn new(host: &'a dyn BlockHost, camera: Point3<f32>) -> Self {
        ChunkRenderPipeline { host, camera }
    }

    /// Attempts to emit the visible faces of one model-rendered block.
    ///
    /// # Arguments
    /// * `slice` - The snapshot the build is working from
    /// * `state` - The cell's block state
    /// * `x`, `y`, `z` - Cell coordinates relative to the section origin
    /// * `buffer` - The pass buffer to emit into
    /// * `use_occlusion` - Whether faces against opaque-cube neighbors are culled
    ///
    /// # Returns
    /// `true` if any geometry was emitted, so the caller can register the
    /// cell in the section bounds.
    pub fn render_block(
        &self,
        slice: &WorldSlice,
        state: BlockId,
        x: i32,
        y: i32,
        z: i32,
        buffer: &mut PassBufferBuilder,
        use_occlusion: bool,
    ) -> bool {
        block::render_block(self.host, slice, state, x, y, z, buffer, use_occlusion)
    }

    /// Attempts to emit the visible faces of one fluid cell.
    ///
    /// # Arguments
    /// * `slice` - The snapshot the build is working from
    /// * `fluid` - The cell's fluid state
    /// * `x`, `y`, `z` - Cell coordinates relative to the section origin
    /// * `buffer` - The pass buffer to emit into
    ///
    /// # Returns
    /// `true` if any geometry was emitted.
    pub fn render_fluid(
        &self,
        slice: &WorldSlice,
        fluid: FluidId,
        x: i32,
        y: i32,
        z: i32,
        buffer: &mut PassBufferBuilder,
    ) -> bool {
        fluid::render_fluid(self.host, self.camera, slice, fluid, x, y, z, buffer)
    }
}
