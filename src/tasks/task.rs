//! # Task System Core Types
//!
//! This module defines the building blocks of the build scheduler: the task
//! trait worker threads execute, the cooperative cancellation token, and the
//! result types delivered back to the main thread.
//!
//! ## Task Lifecycle
//! 1. A task is created on the main thread, owning everything it needs
//!    (its world slice, its camera snapshot, its classifier handle)
//! 2. [`crate::tasks::ChunkBuilder::schedule`] pairs it with a fresh
//!    [`CancellationToken`] and hands back a [`BuildHandle`]
//! 3. A worker thread runs [`ChunkBuildTask::perform_build`]
//! 4. The worker wraps the outcome in a [`BuildOutput`] and sends it to the
//!    result queue, where the main thread consumes it
//!
//! ## Thread Safety
//! - Tasks must be `Send` to be transferred to a worker
//! - A task is exclusively owned by one worker from dispatch to completion
//! - Cancellation tokens are shared and may be flipped from any thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::Point3;

use crate::core::error::BuildError;
use crate::render::buffers::ChunkBuildBuffers;
use crate::render::render_data::ChunkRenderData;

/// A cooperative cancellation flag shared between a build handle and the
/// task it controls.
///
/// Cancellation is advisory: a running task stops at its next poll point and
/// releases its resources, but in-progress emission for the current cell is
/// never interrupted. Flipping the flag after completion has no effect.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of section-building work executed on a worker thread.
///
/// Implementations own all the data they need and must not touch live world
/// state; everything they read is frozen at creation time. The scratch
/// buffers are lent by the worker and reused across that worker's builds.
pub trait ChunkBuildTask: Send {
    /// Returns the section coordinates this task builds.
    fn section(&self) -> Point3<i32>;

    /// Runs the build to completion, cancellation, or failure.
    ///
    /// # Arguments
    /// * `buffers` - Worker-owned scratch buffers, already usable; the task
    ///   calls `init` before emitting
    /// * `cancellation` - Token to poll at slab boundaries
    ///
    /// # Returns
    /// - `Ok(Some(data))` with exactly one finished record on completion
    /// - `Ok(None)` when cancellation was observed; nothing was published
    /// - `Err(error)` on an unexpected failure
    fn perform_build(
        &mut self,
        buffers: &mut ChunkBuildBuffers,
        cancellation: &CancellationToken,
    ) -> Result<Option<ChunkRenderData>, BuildError>;
}

/// A completed build, pairing the section with its render data.
#[derive(Debug)]
pub struct ChunkBuildResult {
    /// Section coordinates the data belongs to
    pub section: Point3<i32>,
    /// The finished, immutable render data
    pub data: ChunkRenderData,
}

/// The outcome of one scheduled build, as delivered on the result queue.
///
/// Outcomes arrive in no particular order relative to scheduling. The
/// consumer is responsible for discarding outcomes for sections it has since
/// invalidated or rescheduled.
#[derive(Debug)]
pub enum BuildOutput {
    /// The task ran to completion and produced render data.
    Completed(ChunkBuildResult),

    /// The task observed cancellation and produced nothing.
    Cancelled {
        /// Section coordinates of the cancelled build
        section: Point3<i32>,
    },

    /// The task hit an unexpected failure and produced nothing.
    Failed {
        /// Section coordinates of the failed build
        section: Point3<i32>,
        /// What went wrong
        error: BuildError,
    },
}

impl BuildOutput {
    /// Returns the section coordinates this outcome belongs to.
    pub fn section(&self) -> Point3<i32> {
        match self {
            BuildOutput::Completed(result) => result.section,
            BuildOutput::Cancelled { section } => *section,
            BuildOutput::Failed { section, .. } => *section,
        }
    }
}

/// The caller's handle to a scheduled build.
///
/// The handle only carries the cancellation side of the contract; results
/// always flow through the scheduler's result queue. Callers replacing a
/// stale build for a section cancel its handle before scheduling the new one.
pub struct BuildHandle {
    section: Point3<i32>,
    token: CancellationToken,
}

impl BuildHandle {
    pub(crate) fn new(section: Point3<i32>, token: CancellationToken) -> Self {
        BuildHandle { section, token }
    }

    /// Returns the section coordinates of the scheduled build.
    pub fn section(&self) -> Point3<i32> {
        self.section
    }

    /// Requests cancellation of the build, before or during execution.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns whether cancellation has been requested through this handle.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear_and_latches() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());

        // Cancelling again is harmless.
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn handle_cancels_its_token() {
        let token = CancellationToken::new();
        let handle = BuildHandle::new(Point3::new(1, 2, 3), token.clone());

        assert_eq!(handle.section(), Point3::new(1, 2, 3));
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
    }
}
