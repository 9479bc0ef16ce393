//! # Core Module
//!
//! This module provides the fundamental concurrency primitive shared by the
//! rest of the mesher. The slice pool's free list and the scheduler's camera
//! cell are the only pieces of state touched from more than one thread, and
//! both are wrapped in [`MtResource`].
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `BuildError`: The failure classes a build task can report
//!
//! ## Usage
//! ```rust
//! use voxel_mesher::core::MtResource;
//!
//! // Thread-safe resource
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod error;
pub mod mt_resource;

// Re-export for easier access
pub use error::BuildError;
pub use mt_resource::MtResource;
