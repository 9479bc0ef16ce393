//! Error types for the chunk mesher.

use thiserror::Error;

use crate::render::pass::RenderPass;

/// Failure classes a build task can hit.
///
/// Cancellation is deliberately not represented here; it is a normal
/// termination path, not an error. A failed build is reported once through
/// the result queue and never affects other in-flight builds or the
/// scheduler itself.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The leased snapshot no longer has the wrapped slice shape.
    #[error("world slice snapshot has the wrong shape for section ({x}, {y}, {z})")]
    CorruptSlice {
        /// Section x coordinate of the failing build
        x: i32,
        /// Section y coordinate of the failing build
        y: i32,
        /// Section z coordinate of the failing build
        z: i32,
    },

    /// A render pass accumulated more vertices than a 32-bit index can address.
    #[error("render pass {pass:?} exceeded the 32-bit index space")]
    VertexOverflow {
        /// The pass whose buffer overflowed
        pass: RenderPass,
    },
}
