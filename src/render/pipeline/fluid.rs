//! Fluid face emission.
//!
//! Fluid cells render as slightly lowered columns: the surface of a fluid
//! exposed to air sits below the cell's top so the surface reads as liquid.
//! Faces shared with the same fluid are never emitted, and side faces hidden
//! behind opaque cubes are culled like block faces. The camera position
//! picks the tessellation detail of nearby surfaces and keeps the surface
//! front-facing when viewed from below.

use cgmath::Point3;

use crate::render::buffers::PassBufferBuilder;
use crate::world::{BlockHost, Facing, FluidId, WorldSlice};

use super::block::{face_corners, UNIT_FACE_UVS};

/// Height of a fluid surface exposed to air, in cell space.
pub(super) const FLUID_SURFACE_HEIGHT: f32 = 0.875;

/// Squared camera distance under which fluid surfaces are tessellated finer.
const FLUID_DETAIL_DISTANCE_SQ: f32 = 144.0;

/// Emits the visible faces of one fluid cell, returning whether anything was
/// emitted.
pub(super) fn render_fluid(
    host: &dyn BlockHost,
    camera: Point3<f32>,
    slice: &WorldSlice,
    fluid: FluidId,
    x: i32,
    y: i32,
    z: i32,
    buffer: &mut PassBufferBuilder,
) -> bool {
    let mut rendered = false;

    let fluid_above = slice.fluid_relative(x, y + 1, z) == fluid;
    // A column continues at full height below more of the same fluid.
    let surface = if fluid_above {
        1.0
    } else {
        FLUID_SURFACE_HEIGHT
    };

    for facing in Facing::all() {
        let offset = facing.offset();
        let (nx, ny, nz) = (x + offset.x, y + offset.y, z + offset.z);

        if slice.fluid_relative(nx, ny, nz) == fluid {
            continue;
        }
        if facing != Facing::TOP && host.is_opaque_cube(slice.block_relative(nx, ny, nz)) {
            continue;
        }

        if facing == Facing::TOP {
            emit_surface(camera, slice, fluid, x, y, z, surface, buffer);
        } else {
            emit_side(fluid, facing, surface, buffer);
        }
        rendered = true;
    }

    rendered
}

/// Emits the fluid surface, subdivided 2x2 near the camera and wound to face
/// the camera when seen from below.
fn emit_surface(
    camera: Point3<f32>,
    slice: &WorldSlice,
    fluid: FluidId,
    x: i32,
    y: i32,
    z: i32,
    surface: f32,
    buffer: &mut PassBufferBuilder,
) {
    let origin = slice.origin();
    let center = Point3::new(
        origin.x as f32 + x as f32 + 0.5,
        origin.y as f32 + y as f32 + surface,
        origin.z as f32 + z as f32 + 0.5,
    );

    let dx = camera.x - center.x;
    let dy = camera.y - center.y;
    let dz = camera.z - center.z;
    let distance_sq = dx * dx + dy * dy + dz * dz;

    let from_below = camera.y < center.y;
    let subdivisions = if distance_sq < FLUID_DETAIL_DISTANCE_SQ {
        2
    } else {
        1
    };

    let step = 1.0 / subdivisions as f32;
    for sz in 0..subdivisions {
        for sx in 0..subdivisions {
            let (x0, x1) = (sx as f32 * step, (sx + 1) as f32 * step);
            let (z0, z1) = (sz as f32 * step, (sz + 1) as f32 * step);

            let corners = [
                Point3::new(x0, surface, z1),
                Point3::new(x1, surface, z1),
                Point3::new(x0, surface, z0),
                Point3::new(x1, surface, z0),
            ];
            let uvs = [[x0, z1], [x1, z1], [x0, z0], [x1, z0]];

            if from_below {
                let flipped = [corners[1], corners[0], corners[3], corners[2]];
                let flipped_uvs = [uvs[1], uvs[0], uvs[3], uvs[2]];
                buffer.push_quad(flipped, flipped_uvs, fluid.0 as u32, Facing::TOP);
            } else {
                buffer.push_quad(corners, uvs, fluid.0 as u32, Facing::TOP);
            }
        }
    }
}

/// Emits a side or bottom face, clipping side faces to the surface height.
fn emit_side(fluid: FluidId, facing: Facing, surface: f32, buffer: &mut PassBufferBuilder) {
    let mut corners = face_corners(facing);
    let mut uvs = UNIT_FACE_UVS;

    for (corner, uv) in corners.iter_mut().zip(uvs.iter_mut()) {
        if corner.y == 1.0 {
            corner.y = surface;
            uv[1] = 1.0 - surface;
        }
    }

    buffer.push_quad(corners, uvs, fluid.0 as u32, facing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pass::RenderPass;
    use crate::render::buffers::ChunkBuildBuffers;
    use crate::world::{
        BlockEntityRef, BlockId, RenderKind, WorldSlicePool, WorldView,
    };

    struct FluidColumn {
        cells: Vec<(i32, i32, i32)>,
    }

    impl WorldView for FluidColumn {
        fn block(&self, _x: i32, _y: i32, _z: i32) -> BlockId {
            BlockId(0)
        }

        fn fluid(&self, x: i32, y: i32, z: i32) -> FluidId {
            if self.cells.contains(&(x, y, z)) {
                FluidId(1)
            } else {
                FluidId(0)
            }
        }

        fn block_entities(&self, _min: Point3<i32>) -> Vec<(Point3<i32>, BlockEntityRef)> {
            Vec::new()
        }
    }

    struct OpenHost;

    impl BlockHost for OpenHost {
        fn is_air(&self, state: BlockId) -> bool {
            state == BlockId(0)
        }

        fn render_kind(&self, _state: BlockId) -> RenderKind {
            RenderKind::INVISIBLE
        }

        fn block_pass(&self, _state: BlockId) -> RenderPass {
            RenderPass::OPAQUE
        }

        fn fluid_pass(&self, _fluid: FluidId) -> RenderPass {
            RenderPass::TRANSLUCENT
        }

        fn is_empty_fluid(&self, fluid: FluidId) -> bool {
            fluid == FluidId(0)
        }

        fn is_opaque_cube(&self, _state: BlockId) -> bool {
            false
        }

        fn has_block_entity(&self, _state: BlockId) -> bool {
            false
        }

        fn has_entity_renderer(&self, _entity: BlockEntityRef) -> bool {
            false
        }
    }

    fn emit_single_cell(camera: Point3<f32>) -> usize {
        let world = FluidColumn {
            cells: vec![(5, 5, 5)],
        };
        let pool = WorldSlicePool::new(false);
        let slice = pool.acquire(&world, Point3::new(0, 0, 0));

        let mut buffers = ChunkBuildBuffers::new();
        buffers.init();
        let buffer = buffers.get(RenderPass::TRANSLUCENT);
        let rendered = render_fluid(&OpenHost, camera, &slice, FluidId(1), 5, 5, 5, buffer);

        assert!(rendered);
        buffer.vertex_count()
    }

    #[test]
    fn isolated_cell_emits_six_faces_when_far() {
        // 6 quads of 4 vertices: top, bottom, and four clipped sides.
        let count = emit_single_cell(Point3::new(100.0, 50.0, 100.0));
        assert_eq!(count, 24);
    }

    #[test]
    fn nearby_surface_is_tessellated() {
        // The top face splits into 2x2 sub-quads near the camera.
        let count = emit_single_cell(Point3::new(5.5, 8.0, 5.5));
        assert_eq!(count, 36);
    }

    #[test]
    fn faces_between_same_fluid_are_culled() {
        let world = FluidColumn {
            cells: vec![(5, 5, 5), (5, 6, 5)],
        };
        let pool = WorldSlicePool::new(false);
        let slice = pool.acquire(&world, Point3::new(0, 0, 0));

        let mut buffers = ChunkBuildBuffers::new();
        buffers.init();
        let buffer = buffers.get(RenderPass::TRANSLUCENT);
        let rendered = render_fluid(
            &OpenHost,
            Point3::new(100.0, 100.0, 100.0),
            &slice,
            FluidId(1),
            5,
            5,
            5,
            buffer,
        );

        // The lower cell has fluid above it: no top face, five remain.
        assert!(rendered);
        assert_eq!(buffer.vertex_count(), 20);
    }
}
