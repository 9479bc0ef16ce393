//! # Rebuild Task Module
//!
//! This module contains the task that rebuilds all the meshes of one chunk
//! section. The result is handed to the main thread for upload to graphics
//! memory.
//!
//! The task takes a slice of the world on the thread it is created on. Since
//! these slices require rather large array allocations, they are pooled to
//! bound allocation churn; dropping the task returns its slice on every exit
//! path, completed, cancelled, or failed alike.

use cgmath::Point3;
use std::sync::Arc;

use crate::core::error::BuildError;
use crate::render::bounds::BoundsBuilder;
use crate::render::buffers::ChunkBuildBuffers;
use crate::render::occlusion::OcclusionBuilder;
use crate::render::pass::RenderPass;
use crate::render::pipeline::ChunkRenderPipeline;
use crate::render::render_data::{ChunkRenderData, ChunkRenderDataBuilder};
use crate::world::slice::CHUNK_DIMENSION;
use crate::world::{BlockHost, RenderKind, WorldSlice};

use super::task::{CancellationToken, ChunkBuildTask};

/// Rebuilds the meshes, bounds, visibility relation, and block entity list of
/// one chunk section from a leased world slice.
///
/// The traversal runs y-outer, z-middle, x-inner and polls cancellation once
/// per y slab; a cancelled build publishes nothing, so poll granularity is a
/// latency knob rather than a correctness one.
pub struct ChunkRebuildTask {
    /// The leased snapshot; returned to its pool when the task is dropped
    slice: WorldSlice,
    /// State classification capabilities, shared with every other build
    host: Arc<dyn BlockHost>,
    /// Camera position captured when the task was created
    camera: Point3<f32>,
}

impl ChunkRebuildTask {
    /// Creates a rebuild task over an already-acquired slice.
    ///
    /// # Arguments
    /// * `slice` - The snapshot to build from; the task takes ownership
    /// * `host` - State classification capabilities
    /// * `camera` - Camera position snapshot for fluid surface detail
    pub fn new(slice: WorldSlice, host: Arc<dyn BlockHost>, camera: Point3<f32>) -> Self {
        ChunkRebuildTask {
            slice,
            host,
            camera,
        }
    }
}

impl ChunkBuildTask for ChunkRebuildTask {
    fn section(&self) -> Point3<i32> {
        self.slice.section()
    }

    fn perform_build(
        &mut self,
        buffers: &mut ChunkBuildBuffers,
        cancellation: &CancellationToken,
    ) -> Result<Option<ChunkRenderData>, BuildError> {
        let section = self.slice.section();
        if !self.slice.is_well_formed() {
            return Err(BuildError::CorruptSlice {
                x: section.x,
                y: section.y,
                z: section.z,
            });
        }

        let mut render_data = ChunkRenderDataBuilder::new();
        let mut occluder = OcclusionBuilder::new();
        let mut bounds = BoundsBuilder::new();
        let pipeline = ChunkRenderPipeline::new(self.host.as_ref(), self.camera);

        buffers.init();

        for rel_y in 0..CHUNK_DIMENSION {
            if cancellation.is_cancelled() {
                return Ok(None);
            }

            for rel_z in 0..CHUNK_DIMENSION {
                for rel_x in 0..CHUNK_DIMENSION {
                    let state = self.slice.block_relative(rel_x, rel_y, rel_z);

                    if self.host.is_air(state) {
                        continue;
                    }

                    if self.host.render_kind(state) == RenderKind::MODEL {
                        buffers.set_render_offset(rel_x, rel_y, rel_z);

                        let pass = self.host.block_pass(state);
                        if pipeline.render_block(
                            &self.slice,
                            state,
                            rel_x,
                            rel_y,
                            rel_z,
                            buffers.get(pass),
                            true,
                        ) {
                            bounds.add_block(rel_x, rel_y, rel_z);
                        }
                    }

                    let fluid = self.slice.fluid_relative(rel_x, rel_y, rel_z);

                    if !self.host.is_empty_fluid(fluid) {
                        buffers.set_render_offset(rel_x, rel_y, rel_z);

                        let pass = self.host.fluid_pass(fluid);
                        if pipeline.render_fluid(
                            &self.slice,
                            fluid,
                            rel_x,
                            rel_y,
                            rel_z,
                            buffers.get(pass),
                        ) {
                            bounds.add_block(rel_x, rel_y, rel_z);
                        }
                    }

                    if self.host.has_block_entity(state) {
                        if let Some(entity) = self.slice.block_entity(rel_x, rel_y, rel_z) {
                            if self.host.has_entity_renderer(entity) {
                                render_data.add_block_entity(
                                    entity,
                                    self.host.is_global_renderer(entity),
                                );
                                bounds.add_block(rel_x, rel_y, rel_z);
                            }
                        }
                    }

                    if self.host.is_opaque_cube(state) {
                        occluder.set_opaque_cube(rel_x, rel_y, rel_z);
                    }
                }
            }
        }

        for pass in RenderPass::all() {
            if let Some(mesh) = buffers.create_mesh(pass)? {
                render_data.set_mesh(pass, mesh);
            }
        }

        Ok(Some(render_data.build(
            bounds.build(self.slice.origin()),
            occluder.compute_visibility(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::{TestHost, TestWorld, CUTOUT_BLOCK, ENTITY_BLOCK, STONE_BLOCK};
    use crate::world::{BlockEntityRef, Facing, FluidId, WorldSlicePool};

    fn build(
        world: &TestWorld,
        pool: &WorldSlicePool,
        section: Point3<i32>,
    ) -> Option<ChunkRenderData> {
        let slice = pool.acquire(world, section);
        let mut task = ChunkRebuildTask::new(
            slice,
            Arc::new(TestHost),
            Point3::new(128.0, 128.0, 128.0),
        );
        let mut buffers = ChunkBuildBuffers::new();
        task.perform_build(&mut buffers, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn empty_volume_produces_empty_result() {
        let world = TestWorld::new();
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        assert!(data.is_empty());
        assert!(data.bounds().is_empty());
        assert!(data.block_entities().is_empty());
        for pass in RenderPass::all() {
            assert!(data.mesh(pass).is_none());
        }
        // Nothing blocks the volume, so every face sees every other face.
        for from in Facing::all() {
            for to in Facing::all() {
                assert!(data.visibility().is_visible(from, to));
            }
        }
    }

    #[test]
    fn single_corner_block_scenario() {
        let mut world = TestWorld::new();
        world.set_block(0, 0, 0, STONE_BLOCK);
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        // Exactly the one pass for the block's material is populated.
        let mesh = data.mesh(RenderPass::OPAQUE).unwrap();
        assert!(data.mesh(RenderPass::CUTOUT).is_none());
        assert!(data.mesh(RenderPass::TRANSLUCENT).is_none());

        // Six exposed faces, four vertices each.
        assert_eq!(mesh.vertices().len(), 24);

        assert_eq!(data.bounds().min, Point3::new(0, 0, 0));
        assert_eq!(data.bounds().max, Point3::new(0, 0, 0));

        // One corner cell cannot wall off any pair of faces.
        for from in Facing::all() {
            for to in Facing::all() {
                assert!(data.visibility().is_visible(from, to));
            }
        }
    }

    #[test]
    fn interior_faces_are_culled_between_opaque_neighbors() {
        let mut world = TestWorld::new();
        world.set_block(4, 4, 4, STONE_BLOCK);
        world.set_block(5, 4, 4, STONE_BLOCK);
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();
        let mesh = data.mesh(RenderPass::OPAQUE).unwrap();

        // Two cubes sharing a face emit 10 faces, not 12.
        assert_eq!(mesh.vertices().len(), 40);
        assert_eq!(data.bounds().min, Point3::new(4, 4, 4));
        assert_eq!(data.bounds().max, Point3::new(5, 4, 4));
    }

    #[test]
    fn cutout_blocks_do_not_cull_or_occlude() {
        let mut world = TestWorld::new();
        world.set_block(8, 8, 8, CUTOUT_BLOCK);
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        let mesh = data.mesh(RenderPass::CUTOUT).unwrap();
        assert_eq!(mesh.vertices().len(), 24);
        assert!(data.mesh(RenderPass::OPAQUE).is_none());

        // A non-opaque block never enters the visibility graph.
        for from in Facing::all() {
            for to in Facing::all() {
                assert!(data.visibility().is_visible(from, to));
            }
        }
    }

    #[test]
    fn fluids_render_into_their_own_pass() {
        let mut world = TestWorld::new();
        world.set_fluid(3, 10, 3, FluidId(7));
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        assert!(data.mesh(RenderPass::TRANSLUCENT).is_some());
        assert!(data.mesh(RenderPass::OPAQUE).is_none());
        assert_eq!(data.bounds().min, Point3::new(3, 10, 3));
        assert_eq!(data.bounds().max, Point3::new(3, 10, 3));
    }

    #[test]
    fn entities_with_renderers_are_listed() {
        let mut world = TestWorld::new();
        world.set_block(1, 2, 3, ENTITY_BLOCK);
        world.set_entity(1, 2, 3, BlockEntityRef(10));
        // A second entity whose renderer does not exist is skipped silently.
        world.set_block(4, 5, 6, ENTITY_BLOCK);
        world.set_entity(4, 5, 6, BlockEntityRef(TestHost::UNRENDERED_ENTITY));
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        assert_eq!(data.block_entities().len(), 1);
        assert_eq!(data.block_entities()[0].entity, BlockEntityRef(10));
        assert!(!data.block_entities()[0].per_frame);
        // Only the rendered entity's cell is in the bounds.
        assert_eq!(data.bounds().min, Point3::new(1, 2, 3));
        assert_eq!(data.bounds().max, Point3::new(1, 2, 3));
    }

    #[test]
    fn global_entities_are_flagged_per_frame() {
        let mut world = TestWorld::new();
        world.set_block(0, 0, 0, ENTITY_BLOCK);
        world.set_entity(0, 0, 0, BlockEntityRef(TestHost::GLOBAL_ENTITY));
        let pool = WorldSlicePool::new(false);

        let data = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        assert_eq!(data.block_entities().len(), 1);
        assert!(data.block_entities()[0].per_frame);
    }

    #[test]
    fn cancellation_before_start_publishes_nothing() {
        let mut world = TestWorld::new();
        world.set_block(0, 0, 0, STONE_BLOCK);
        let pool = WorldSlicePool::new(false);

        let slice = pool.acquire(&world, Point3::new(0, 0, 0));
        let mut task = ChunkRebuildTask::new(
            slice,
            Arc::new(TestHost),
            Point3::new(0.0, 0.0, 0.0),
        );

        let token = CancellationToken::new();
        token.cancel();

        let mut buffers = ChunkBuildBuffers::new();
        let result = task.perform_build(&mut buffers, &token).unwrap();
        assert!(result.is_none());

        // The slice goes back to the pool exactly once, when the task drops.
        assert_eq!(pool.idle_count(), 0);
        drop(task);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn slice_returns_to_pool_after_completion() {
        let world = TestWorld::new();
        let pool = WorldSlicePool::new(false);

        assert_eq!(pool.idle_count(), 0);
        let data = build(&world, &pool, Point3::new(2, 0, -1));
        assert!(data.is_some());
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn rebuilding_the_same_volume_is_bit_identical() {
        let mut world = TestWorld::new();
        let seed = 0x5eed;
        fastrand::seed(seed);
        for _ in 0..200 {
            let (x, y, z) = (
                fastrand::i32(0..16),
                fastrand::i32(0..16),
                fastrand::i32(0..16),
            );
            match fastrand::u8(0..3) {
                0 => world.set_block(x, y, z, STONE_BLOCK),
                1 => world.set_block(x, y, z, CUTOUT_BLOCK),
                _ => world.set_fluid(x, y, z, FluidId(7)),
            }
        }
        let pool = WorldSlicePool::new(false);

        let first = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();
        let second = build(&world, &pool, Point3::new(0, 0, 0)).unwrap();

        for pass in RenderPass::all() {
            match (first.mesh(pass), second.mesh(pass)) {
                (Some(a), Some(b)) => {
                    assert_eq!(a.vertex_bytes(), b.vertex_bytes());
                    assert_eq!(a.index_bytes(), b.index_bytes());
                }
                (None, None) => {}
                _ => panic!("pass {:?} differs between identical builds", pass),
            }
        }
        assert_eq!(first.visibility(), second.visibility());
        assert_eq!(first.bounds(), second.bounds());
    }

    #[test]
    fn corrupt_slice_fails_the_build() {
        let world = TestWorld::new();
        let pool = WorldSlicePool::new(false);
        let slice = pool.acquire(&world, Point3::new(0, 0, 0));
        let slice = crate::world::slice::truncate_for_tests(slice);

        let mut task = ChunkRebuildTask::new(
            slice,
            Arc::new(TestHost),
            Point3::new(0.0, 0.0, 0.0),
        );
        let mut buffers = ChunkBuildBuffers::new();
        let result = task.perform_build(&mut buffers, &CancellationToken::new());

        assert!(matches!(result, Err(BuildError::CorruptSlice { .. })));
    }
}
