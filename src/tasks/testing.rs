//! Shared world and host fixtures for build and scheduler tests.

use std::collections::HashMap;

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use crate::render::pass::RenderPass;
use crate::world::slice::CHUNK_DIMENSION;
use crate::world::{BlockEntityRef, BlockId, FluidId, RenderKind, WorldView};

/// A plain opaque cube that renders in the opaque pass.
pub(crate) const STONE_BLOCK: BlockId = BlockId(1);
/// A non-opaque model block that renders in the cutout pass.
pub(crate) const CUTOUT_BLOCK: BlockId = BlockId(100);
/// An invisible block that carries a block entity.
pub(crate) const ENTITY_BLOCK: BlockId = BlockId(200);

/// Threshold above which Perlin noise is considered solid.
const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered empty.
const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// A sparse in-memory world for driving builds in tests.
pub(crate) struct TestWorld {
    blocks: HashMap<(i32, i32, i32), BlockId>,
    fluids: HashMap<(i32, i32, i32), FluidId>,
    entities: HashMap<(i32, i32, i32), BlockEntityRef>,
}

impl TestWorld {
    pub fn new() -> Self {
        TestWorld {
            blocks: HashMap::new(),
            fluids: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    /// Fills section (0, 0, 0) with Perlin-noise terrain, the same shape the
    /// engine's generated chunks have.
    pub fn perlin() -> Self {
        let perlin = Perlin::new(0);
        let mut world = TestWorld::new();

        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let sample = perlin.get([
                        x as f64 * PERLIN_SCALE_FACTOR,
                        y as f64 * PERLIN_SCALE_FACTOR,
                        z as f64 * PERLIN_SCALE_FACTOR,
                    ]);
                    if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                        world.set_block(x, y, z, STONE_BLOCK);
                    }
                }
            }
        }

        world
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, state: BlockId) {
        self.blocks.insert((x, y, z), state);
    }

    pub fn set_fluid(&mut self, x: i32, y: i32, z: i32, fluid: FluidId) {
        self.fluids.insert((x, y, z), fluid);
    }

    pub fn set_entity(&mut self, x: i32, y: i32, z: i32, entity: BlockEntityRef) {
        self.entities.insert((x, y, z), entity);
    }
}

impl WorldView for TestWorld {
    fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.blocks.get(&(x, y, z)).copied().unwrap_or(BlockId(0))
    }

    fn fluid(&self, x: i32, y: i32, z: i32) -> FluidId {
        self.fluids.get(&(x, y, z)).copied().unwrap_or(FluidId(0))
    }

    fn block_entities(&self, min: Point3<i32>) -> Vec<(Point3<i32>, BlockEntityRef)> {
        self.entities
            .iter()
            .filter(|((x, y, z), _)| {
                (min.x..min.x + CHUNK_DIMENSION).contains(x)
                    && (min.y..min.y + CHUNK_DIMENSION).contains(y)
                    && (min.z..min.z + CHUNK_DIMENSION).contains(z)
            })
            .map(|((x, y, z), entity)| (Point3::new(*x, *y, *z), *entity))
            .collect()
    }
}

/// A classifier with fixed id ranges: 0 is air, 1-99 are opaque cubes,
/// 100-199 are cutout models, 200 and up are invisible entity carriers.
pub(crate) struct TestHost;

impl TestHost {
    /// Entity id whose renderer lookup fails.
    pub const UNRENDERED_ENTITY: u64 = 99;
    /// Smallest entity id classified as globally rendered.
    pub const GLOBAL_ENTITY: u64 = 1000;
}

impl crate::world::BlockHost for TestHost {
    fn is_air(&self, state: BlockId) -> bool {
        state.0 == 0
    }

    fn render_kind(&self, state: BlockId) -> RenderKind {
        if (1..200).contains(&state.0) {
            RenderKind::MODEL
        } else {
            RenderKind::INVISIBLE
        }
    }

    fn block_pass(&self, state: BlockId) -> RenderPass {
        if state.0 >= 100 {
            RenderPass::CUTOUT
        } else {
            RenderPass::OPAQUE
        }
    }

    fn fluid_pass(&self, _fluid: FluidId) -> RenderPass {
        RenderPass::TRANSLUCENT
    }

    fn is_empty_fluid(&self, fluid: FluidId) -> bool {
        fluid.0 == 0
    }

    fn is_opaque_cube(&self, state: BlockId) -> bool {
        (1..100).contains(&state.0)
    }

    fn has_block_entity(&self, state: BlockId) -> bool {
        state.0 >= 200
    }

    fn has_entity_renderer(&self, entity: BlockEntityRef) -> bool {
        entity.0 != Self::UNRENDERED_ENTITY
    }

    fn is_global_renderer(&self, entity: BlockEntityRef) -> bool {
        entity.0 >= Self::GLOBAL_ENTITY
    }
}
