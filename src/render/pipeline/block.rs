//! Block face emission.
//!
//! Emits unit cube faces for model-rendered blocks, culling faces whose
//! neighbor in the slice is a full opaque cube.

use cgmath::Point3;

use crate::render::buffers::PassBufferBuilder;
use crate::world::{BlockHost, BlockId, Facing, WorldSlice};

/// Texture coordinates of a full face, in ll, lr, ul, ur corner order.
pub(super) const UNIT_FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Returns the unit-cube corner positions of a face, in lower-left,
/// lower-right, upper-left, upper-right order as seen from outside the cell.
///
/// Indexed with the quad index pattern of
/// [`PassBufferBuilder::push_quad`], each table yields two
/// counter-clockwise triangles whose normal points out of the cell.
pub fn face_corners(facing: Facing) -> [Point3<f32>; 4] {
    match facing {
        Facing::FRONT => [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        Facing::BACK => [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ],
        Facing::BOTTOM => [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ],
        Facing::TOP => [
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ],
        Facing::LEFT => [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
        ],
        Facing::RIGHT => [
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 0.0),
        ],
    }
}

/// Emits the visible faces of one block, returning whether anything was emitted.
pub(super) fn render_block(
    host: &dyn BlockHost,
    slice: &WorldSlice,
    state: BlockId,
    x: i32,
    y: i32,
    z: i32,
    buffer: &mut PassBufferBuilder,
    use_occlusion: bool,
) -> bool {
    let mut rendered = false;

    for facing in Facing::all() {
        if use_occlusion {
            let offset = facing.offset();
            let neighbor = slice.block_relative(x + offset.x, y + offset.y, z + offset.z);
            if host.is_opaque_cube(neighbor) {
                continue;
            }
        }

        buffer.push_quad(face_corners(facing), UNIT_FACE_UVS, state.0 as u32, facing);
        rendered = true;
    }

    rendered
}
