#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! An asynchronous chunk-mesh build pipeline for voxel engines.
//!
//! Given a 16x16x16 section of block data, this crate produces renderable
//! vertex buffers partitioned by render pass, a face-to-face visibility
//! relation for occlusion culling, world-space culling bounds, and the list
//! of block entities needing custom rendering. Builds run on worker threads,
//! can be cancelled at any point, and are safe to discard without corrupting
//! shared state.
//!
//! ## Key Modules
//!
//! * `core` - The shared concurrency primitive and the build error type
//! * `world` - The host capability boundary and pooled world snapshots
//! * `render` - Build buffers, the emission pipeline, and the result record
//! * `tasks` - The rebuild task and the worker-pool scheduler
//! * `options` - Persisted JSON configuration
//!
//! ## Architecture
//!
//! The pipeline never touches live world state from a worker. A build task
//! snapshots its section (plus a one-block halo) into a pooled [`world::WorldSlice`]
//! on the thread it is created on; from then on the task owns everything it
//! reads. The only cross-thread state is the slice pool's free list and the
//! task and result channels, which is what makes cancellation a matter of
//! dropping the task: its slice flows back to the pool on every exit path.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let options = MesherOptions::load(Path::new("config/mesher-options.json"));
//! let mut builder = ChunkBuilder::new(&options, host);
//!
//! // Each frame:
//! builder.set_camera_position(camera);
//! let task = builder.create_rebuild_task(&world, section);
//! let handle = builder.schedule(Box::new(task));
//!
//! for output in builder.drain_results() {
//!     match output {
//!         BuildOutput::Completed(result) => upload(result),
//!         BuildOutput::Cancelled { .. } => {}
//!         BuildOutput::Failed { section, error } => log::error!("{:?}: {}", section, error),
//!     }
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! The pipeline is built to keep a steady rebuild load allocation-free:
//! * Slice snapshots are pooled and their arrays reused across builds
//! * Scratch vertex buffers live per worker and are reset, not reallocated
//! * The visibility computation is one flat pass over fixed-size bit maps

use log::info;

pub mod core;
pub mod options;
pub mod render;
pub mod tasks;
pub mod world;

pub use options::MesherOptions;
pub use render::{ChunkMeshData, ChunkRenderBounds, ChunkRenderData, RenderPass, VisibilitySet};
pub use tasks::{BuildHandle, BuildOutput, ChunkBuildResult, ChunkBuilder, ChunkRebuildTask};
pub use world::{
    BlockEntityRef, BlockHost, BlockId, Facing, FluidId, RenderKind, WorldSlice, WorldSlicePool,
    WorldView,
};

/// Initializes the crate's logging output.
///
/// Builds an `env_logger` writing to stdout and filtered through the
/// `RUST_LOG` environment variable. Hosts that install their own `log`
/// backend can skip this; calling it after another backend is installed is
/// harmless.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();

    info!("Logger initialized");
}
