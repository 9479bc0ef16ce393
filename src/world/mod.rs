//! # World Module
//!
//! This module defines the boundary between the mesher and the host engine.
//! The mesher never interprets world data itself: block and fluid states are
//! opaque ids, and every classification the build pipeline needs (is this air,
//! does it render as a model, is it a full opaque cube, does it carry a block
//! entity) is answered by a host-provided [`BlockHost`] implementation.
//!
//! ## Key Components
//! - `BlockId` / `FluidId` / `BlockEntityRef`: opaque state handles
//! - `WorldView`: read access to live world data, used only while taking a snapshot
//! - `BlockHost`: state classification consulted from worker threads
//! - `WorldSlice` / `WorldSlicePool`: pooled read-only snapshots (see submodules)
//!
//! ## Threading
//! `WorldView` is only ever called on the thread that creates a build task, so
//! hosts are free to back it with thread-unsafe structures. `BlockHost` is
//! consulted from worker threads and must be `Send + Sync`.

use cgmath::Point3;
use num_derive::FromPrimitive;

pub mod facing;
pub mod slice;
pub mod slice_pool;

pub use facing::Facing;
pub use slice::WorldSlice;
pub use slice_pool::WorldSlicePool;

/// The underlying integer type used to represent block states in slice storage.
pub type BlockIdSize = u16;

/// An opaque handle to a host block state.
///
/// The mesher copies these into slices and hands them back to the host for
/// classification and render-pass selection. It attaches no meaning to the
/// value itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct BlockId(pub BlockIdSize);

/// An opaque handle to a host fluid state.
///
/// Like [`BlockId`], the value is only meaningful to the host. Whether a fluid
/// state is "empty" (no fluid in the cell) is answered by
/// [`BlockHost::is_empty_fluid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FluidId(pub BlockIdSize);

/// An opaque handle to a host block entity instance.
///
/// Captured into the slice snapshot at acquisition time and carried through to
/// the finished render data, where the host resolves it back to its own entity
/// object for per-frame rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockEntityRef(pub u64);

/// How a block state is drawn by the static chunk geometry path.
///
/// Fluids are classified separately through the fluid state attached to the
/// cell, so a single cell can contribute both model and fluid geometry
/// (waterlogged blocks).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum RenderKind {
    /// The block contributes cube geometry to the chunk mesh.
    MODEL,

    /// The block contributes no static geometry (air, pure entity blocks).
    INVISIBLE,
}

/// Read access to live world data.
///
/// Implemented by the host and consumed exactly once per build, on the thread
/// the task is created on, while [`WorldSlicePool::acquire`] copies the
/// section's neighborhood into pooled storage. After that the build never
/// touches the live world again, which is what makes cancellation and result
/// discard safe.
pub trait WorldView {
    /// Returns the block state at the given world-space block position.
    ///
    /// Positions one block outside the requested section are queried for the
    /// snapshot halo; out-of-world positions should return the host's air
    /// state rather than panic.
    fn block(&self, x: i32, y: i32, z: i32) -> BlockId;

    /// Returns the fluid state at the given world-space block position.
    fn fluid(&self, x: i32, y: i32, z: i32) -> FluidId;

    /// Enumerates the block entities inside the 16x16x16 section whose minimum
    /// corner is `min`, as world-space positions paired with entity handles.
    ///
    /// Engines keep these in small per-chunk maps, so enumeration is cheap.
    /// The halo is never queried.
    fn block_entities(&self, min: Point3<i32>) -> Vec<(Point3<i32>, BlockEntityRef)>;

    /// Bulk-copies the wrapped neighborhood starting at `min` into the given
    /// destination arrays, returning `true` on success.
    ///
    /// The destination layout is the slice's wrapped layout: 18 cells per
    /// axis, x fastest, then y, then z (see [`slice::CHUNK_DIMENSION_WRAPPED`]).
    /// The default implementation declines, which makes the pool fall back to
    /// per-cell copying through [`WorldView::block`] and [`WorldView::fluid`].
    /// Hosts with contiguous storage can override this; the pool only offers
    /// the fast path when the memory-intrinsics option is enabled.
    fn copy_section(
        &self,
        min: Point3<i32>,
        blocks: &mut [BlockId],
        fluids: &mut [FluidId],
    ) -> bool {
        let _ = (min, blocks, fluids);
        false
    }
}

/// State classification capabilities provided by the host.
///
/// These calls are made from worker threads for every non-air cell of every
/// build, so implementations should be cheap lookups (the host engine already
/// has these tables). No method may touch mutable world state.
pub trait BlockHost: Send + Sync {
    /// Returns whether the given block state is air.
    ///
    /// Air cells are skipped entirely during traversal.
    fn is_air(&self, state: BlockId) -> bool;

    /// Returns how the given block state is drawn by the chunk geometry path.
    fn render_kind(&self, state: BlockId) -> RenderKind;

    /// Returns the render pass the given block state's geometry belongs to.
    ///
    /// Only called for states classified as [`RenderKind::MODEL`].
    fn block_pass(&self, state: BlockId) -> crate::render::pass::RenderPass;

    /// Returns the render pass the given fluid state's geometry belongs to.
    fn fluid_pass(&self, fluid: FluidId) -> crate::render::pass::RenderPass;

    /// Returns whether the given fluid state represents "no fluid".
    fn is_empty_fluid(&self, fluid: FluidId) -> bool;

    /// Returns whether the given block state is a full opaque cube.
    ///
    /// This is the light- and path-blocking classification used both for face
    /// culling against neighbors and for the section visibility graph. It is
    /// independent of the state's rendered geometry.
    fn is_opaque_cube(&self, state: BlockId) -> bool;

    /// Returns whether the given block state carries a block entity.
    fn has_block_entity(&self, state: BlockId) -> bool;

    /// Returns whether a renderer exists for the given block entity.
    ///
    /// Entities without a renderer are silently excluded from the render list.
    fn has_entity_renderer(&self, entity: BlockEntityRef) -> bool;

    /// Returns whether the given block entity's renderer is global.
    ///
    /// Global renderers are drawn every frame regardless of section culling,
    /// so their entities are flagged accordingly in the render data.
    fn is_global_renderer(&self, entity: BlockEntityRef) -> bool {
        let _ = entity;
        false
    }
}
