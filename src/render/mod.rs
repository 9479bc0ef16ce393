//! # Render Module
//!
//! This module contains everything between raw block state and finished,
//! upload-ready mesh data: the render pass partitioning, the vertex format,
//! the per-task scratch buffers, the per-cell emission pipeline, and the
//! accumulators for bounds and face visibility that feed the final
//! [`render_data::ChunkRenderData`] record.
//!
//! # Architecture
//! - `pass`: classification of geometry by blending behavior
//! - `vertex` / `mesh`: the plain-old-data output format
//! - `buffers`: reusable per-pass scratch buffers owned by worker threads
//! - `pipeline`: stateless block and fluid face emission
//! - `bounds` / `occlusion`: accumulators filled by the volume traversal
//! - `render_data`: the immutable per-build result record

pub mod bounds;
pub mod buffers;
pub mod mesh;
pub mod occlusion;
pub mod pass;
pub mod pipeline;
pub mod render_data;
pub mod vertex;

pub use bounds::{BoundsBuilder, ChunkRenderBounds};
pub use buffers::ChunkBuildBuffers;
pub use mesh::ChunkMeshData;
pub use occlusion::{OcclusionBuilder, VisibilitySet};
pub use pass::RenderPass;
pub use pipeline::ChunkRenderPipeline;
pub use render_data::{BlockEntityInstance, ChunkRenderData, ChunkRenderDataBuilder};
pub use vertex::ChunkVertex;
