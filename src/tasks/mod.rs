//! # Build Scheduler Module
//!
//! This module provides the scheduler that executes section builds
//! asynchronously across a pool of worker threads.
//!
//! ## Architecture Overview
//!
//! The scheduler consists of several key components:
//! - `ChunkBuilder`: Central coordinator owning the workers, the pending
//!   queue, the slice pool, and the camera position
//! - `ChunkBuildTask`: A unit of section-building work (see [`task`])
//! - `ChunkRebuildTask`: The standard full-rebuild task (see [`rebuild_task`])
//! - `BuildOutput`: A completed, cancelled, or failed outcome delivered back
//!   to the main thread
//!
//! ## Scheduling Model
//!
//! Each worker is an OS thread behind a dedicated task channel with a small
//! in-flight cap; builds are dispatched round-robin to even out load.
//! Builds that find every worker saturated wait in a FIFO queue drained by
//! `pump_pending()`. Every worker reports into one shared result channel
//! that the main thread drains with `drain_results()`, so results arrive on
//! a single queue but in no particular order relative to scheduling.
//!
//! ## Build Lifecycle
//! 1. The caller creates a task, usually via `create_rebuild_task()`, which
//!    snapshots the world slice and camera on the calling thread
//! 2. `schedule()` attaches a cancellation token and returns a [`task::BuildHandle`]
//! 3. A worker runs the task to completion, cancellation, or failure
//! 4. The worker releases the task's slice back to the pool, then reports
//! 5. The main thread consumes the outcome from `drain_results()`
//!
//! The scheduler guarantees nothing about one section being built only once;
//! a caller replacing a stale build cancels its handle first and discards
//! the stale result when it arrives.
//!
//! ## Performance Considerations
//! - **Task granularity**: One full section rebuild per task amortizes
//!   scheduling overhead without starving the queue
//! - **Memory**: Scratch buffers live per worker and slices are pooled, so a
//!   steady rebuild load settles into zero allocation churn
//! - **Blocking**: Nothing in the scheduler blocks the main thread; slice
//!   acquisition grows the pool rather than waiting for a free storage

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cgmath::Point3;
use log::{debug, info};

use crate::core::MtResource;
use crate::options::MesherOptions;
use crate::render::buffers::ChunkBuildBuffers;
use crate::world::{BlockHost, WorldSlicePool, WorldView};

pub mod rebuild_task;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use rebuild_task::ChunkRebuildTask;
pub use task::{BuildHandle, BuildOutput, CancellationToken, ChunkBuildResult, ChunkBuildTask};

/// Maximum number of builds in flight per worker channel.
///
/// This is set to 1 so the pending queue keeps control over dispatch order
/// until the last possible moment; cancelling a queued build never has to
/// race a worker that already pulled it off a deep channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// A task paired with the cancellation token its handle shares.
struct ScheduledBuild {
    task: Box<dyn ChunkBuildTask>,
    token: CancellationToken,
}

/// A worker's report: which channel freed up, and what the build produced.
struct WorkerReport {
    worker: usize,
    output: BuildOutput,
}

/// The sending half of one worker thread.
///
/// # Fields
/// - `task_sender`: Sends builds from the scheduler to the worker
/// - `num_tasks_in_flight`: Tracks builds dispatched but not yet reported
/// - `worker`: Handle to the worker thread, joined on shutdown
struct WorkerChannel {
    task_sender: Sender<ScheduledBuild>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates section builds.
///
/// The `ChunkBuilder` is responsible for:
/// - Creating and managing worker threads
/// - Distributing build tasks across available workers
/// - Queueing builds when all workers are busy
/// - Delivering build outcomes to the main thread
/// - Owning the world slice pool and the shared camera position
///
/// # Thread Safety
/// The builder itself lives on the main thread; only the slice pool, the
/// camera cell, and the channels inside it are shared with workers.
pub struct ChunkBuilder {
    channels: Vec<WorkerChannel>,
    result_receiver: Receiver<WorkerReport>,
    queued_builds: VecDeque<ScheduledBuild>,
    current_channel: usize,
    slice_pool: WorldSlicePool,
    camera_position: MtResource<Point3<f32>>,
    host: Arc<dyn BlockHost>,
}

impl ChunkBuilder {
    /// Creates a new `ChunkBuilder` and starts its worker threads.
    ///
    /// # Arguments
    /// * `options` - Persisted configuration; sizes the worker pool and gates
    ///   the slice pool's bulk-copy fast path
    /// * `host` - State classification capabilities shared with every build
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(options: &MesherOptions, host: Arc<dyn BlockHost>) -> Self {
        let worker_count = options.worker_thread_count();
        let (result_sender, result_receiver) = channel::<WorkerReport>();
        let mut channels = Vec::with_capacity(worker_count);

        for index in 0..worker_count {
            let (task_sender, task_receiver) = channel::<ScheduledBuild>();
            let result_sender = result_sender.clone();

            let worker = thread::Builder::new()
                .name(format!("chunk-builder-{}", index))
                .spawn(move || worker_loop(index, task_receiver, result_sender))
                .expect("failed to spawn chunk builder worker");

            channels.push(WorkerChannel {
                task_sender,
                num_tasks_in_flight: 0,
                worker: Some(worker),
            });
        }

        info!("started {} chunk builder workers", worker_count);

        ChunkBuilder {
            channels,
            result_receiver,
            queued_builds: VecDeque::new(),
            current_channel: 0,
            slice_pool: WorldSlicePool::new(options.advanced.use_memory_intrinsics),
            camera_position: MtResource::new(Point3::new(0.0, 0.0, 0.0)),
            host,
        }
    }

    /// Creates a full-rebuild task for a section.
    ///
    /// The world slice and the camera position are snapshotted on the calling
    /// thread, so the returned task owns everything it needs and the worker
    /// never touches live world state.
    ///
    /// # Arguments
    /// * `world` - Live world data, read only during this call
    /// * `section` - Section coordinates to rebuild
    ///
    /// # Returns
    /// A task ready to be passed to [`ChunkBuilder::schedule`].
    pub fn create_rebuild_task(
        &self,
        world: &dyn WorldView,
        section: Point3<i32>,
    ) -> ChunkRebuildTask {
        let slice = self.slice_pool.acquire(world, section);
        ChunkRebuildTask::new(slice, self.host.clone(), self.camera_position())
    }

    /// Schedules a build for execution.
    ///
    /// The build is dispatched to an idle worker immediately when possible
    /// and queued otherwise; queued builds are dispatched by
    /// [`ChunkBuilder::pump_pending`] as workers free up.
    ///
    /// # Arguments
    /// * `task` - The build to execute
    ///
    /// # Returns
    /// A [`BuildHandle`] that can cancel the build before or during execution.
    pub fn schedule(&mut self, task: Box<dyn ChunkBuildTask>) -> BuildHandle {
        let token = CancellationToken::new();
        let handle = BuildHandle::new(task.section(), token.clone());
        let build = ScheduledBuild { task, token };

        if self.channels.is_empty() {
            self.queued_builds.push_back(build);
            return handle;
        }

        match self.find_available_channel() {
            Some(channel_index) => match self.try_send_build(build, channel_index) {
                Ok(()) => {
                    self.current_channel = (channel_index + 1) % self.channels.len();
                }
                Err(build) => {
                    self.queued_builds.push_back(build);
                }
            },
            None => {
                debug!(
                    "all workers busy, queueing build for section {:?}",
                    handle.section()
                );
                self.queued_builds.push_back(build);
            }
        }

        handle
    }

    /// Dispatches queued builds to workers that have freed up.
    ///
    /// Called automatically by [`ChunkBuilder::drain_results`]; callers that
    /// schedule in bursts can also call it directly once per frame.
    pub fn pump_pending(&mut self) {
        if self.queued_builds.is_empty() {
            return;
        }

        match self.find_available_channel() {
            None => {} // No available workers, keep builds queued
            Some(mut channel_index) => {
                while let Some(build) = self.queued_builds.pop_front() {
                    match self.try_send_build(build, channel_index) {
                        Ok(()) => match self.find_available_channel() {
                            Some(next_index) => channel_index = next_index,
                            None => break,
                        },
                        Err(build) => {
                            // Channel is disconnected, put the build back and stop
                            self.queued_builds.push_front(build);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Collects every build outcome workers have reported since the last call.
    ///
    /// Must be called from the thread that owns the builder, typically once
    /// per frame. Freed worker slots are immediately refilled from the
    /// pending queue. Outcomes arrive in completion order, not scheduling
    /// order; the caller discards outcomes for sections it has invalidated.
    ///
    /// # Returns
    /// All available [`BuildOutput`] values, possibly none.
    pub fn drain_results(&mut self) -> Vec<BuildOutput> {
        let mut outputs = Vec::new();

        while let Ok(report) = self.result_receiver.try_recv() {
            self.channels[report.worker].num_tasks_in_flight -= 1;
            outputs.push(report.output);
        }

        if !outputs.is_empty() {
            self.pump_pending();
        }

        outputs
    }

    /// Updates the camera position read by subsequently created tasks.
    ///
    /// # Arguments
    /// * `position` - The camera position in world space
    pub fn set_camera_position(&self, position: Point3<f32>) {
        *self.camera_position.get_mut() = position;
    }

    /// Returns the camera position most recently set.
    pub fn camera_position(&self) -> Point3<f32> {
        *self.camera_position.get()
    }

    /// Returns the slice pool owned by this builder.
    pub fn slice_pool(&self) -> &WorldSlicePool {
        &self.slice_pool
    }

    /// Returns the number of builds waiting for a free worker.
    pub fn pending_count(&self) -> usize {
        self.queued_builds.len()
    }

    /// Returns the number of builds currently dispatched to workers.
    pub fn in_flight_count(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Stops all worker threads, letting in-flight builds finish first.
    ///
    /// Queued builds that were never dispatched are dropped, which returns
    /// their slices to the pool. Called automatically when the builder is
    /// dropped; calling it twice is harmless.
    pub fn stop_workers(&mut self) {
        for channel in self.channels.drain(..) {
            let WorkerChannel {
                task_sender,
                worker,
                ..
            } = channel;

            // Closing the channel ends the worker's receive loop.
            drop(task_sender);

            if let Some(worker) = worker {
                let _ = worker.join();
            }
        }

        self.queued_builds.clear();
    }

    /// Attempts to send a build to a specific worker channel.
    ///
    /// # Arguments
    /// * `build` - The build to dispatch
    /// * `channel_index` - Index of the target worker channel
    ///
    /// # Returns
    /// - `Ok(())` if the build was dispatched
    /// - `Err(build)` if the worker disconnected, returning the build for requeueing
    fn try_send_build(
        &mut self,
        build: ScheduledBuild,
        channel_index: usize,
    ) -> Result<(), ScheduledBuild> {
        match self.channels[channel_index].task_sender.send(build) {
            Ok(()) => {
                self.channels[channel_index].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(error) => Err(error.0),
        }
    }

    /// Finds a worker channel that can accept a new build.
    ///
    /// Implements round-robin selection starting from the last used channel,
    /// skipping channels at their in-flight cap.
    ///
    /// # Returns
    /// - `Some(index)` of an available channel
    /// - `None` if every channel is at capacity
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        if self
            .channels
            .iter()
            .all(|channel| channel.num_tasks_in_flight >= MAX_TASKS_IN_FLIGHT)
        {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }
}

impl Drop for ChunkBuilder {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

/// The body of one worker thread: receive builds, run them, report outcomes.
///
/// The worker owns its scratch buffers for its whole lifetime, so buffer
/// growth amortizes across every build it runs. The build (and with it the
/// leased slice) is dropped before the outcome is reported, so by the time
/// the main thread sees a result the slice is already back in the pool.
fn worker_loop(
    index: usize,
    task_receiver: Receiver<ScheduledBuild>,
    result_sender: Sender<WorkerReport>,
) {
    debug!("chunk builder worker {} started", index);

    let mut buffers = ChunkBuildBuffers::new();

    while let Ok(mut build) = task_receiver.recv() {
        let section = build.task.section();

        let output = match build.task.perform_build(&mut buffers, &build.token) {
            Ok(Some(data)) => BuildOutput::Completed(ChunkBuildResult { section, data }),
            Ok(None) => BuildOutput::Cancelled { section },
            Err(error) => BuildOutput::Failed { section, error },
        };

        drop(build);

        if result_sender
            .send(WorkerReport {
                worker: index,
                output,
            })
            .is_err()
        {
            break;
        }
    }

    debug!("chunk builder worker {} stopped", index);
}

#[cfg(test)]
mod tests {
    use super::testing::{TestHost, TestWorld, STONE_BLOCK};
    use super::*;
    use crate::render::pass::RenderPass;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    fn single_worker_options() -> MesherOptions {
        MesherOptions {
            worker_threads: 1,
            ..MesherOptions::default()
        }
    }

    fn drain_until(builder: &mut ChunkBuilder, count: usize) -> Vec<BuildOutput> {
        let mut outputs = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);

        while outputs.len() < count {
            builder.pump_pending();
            outputs.extend(builder.drain_results());
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {} outputs, got {}",
                count,
                outputs.len()
            );
            thread::sleep(Duration::from_millis(2));
        }

        outputs
    }

    #[test]
    fn build_completes_end_to_end() {
        let mut world = TestWorld::perlin();
        world.set_block(0, 0, 0, STONE_BLOCK);

        let mut builder = ChunkBuilder::new(&single_worker_options(), Arc::new(TestHost));
        let task = builder.create_rebuild_task(&world, Point3::new(0, 0, 0));
        let handle = builder.schedule(Box::new(task));
        assert_eq!(handle.section(), Point3::new(0, 0, 0));

        let outputs = drain_until(&mut builder, 1);
        match &outputs[0] {
            BuildOutput::Completed(result) => {
                assert_eq!(result.section, Point3::new(0, 0, 0));
                assert!(result.data.mesh(RenderPass::OPAQUE).is_some());
            }
            other => panic!("expected a completed build, got {:?}", other),
        }

        // The worker returned the slice before reporting.
        assert_eq!(builder.slice_pool().idle_count(), 1);
    }

    #[test]
    fn results_cover_every_scheduled_section_in_any_order() {
        let world = TestWorld::new();
        let options = MesherOptions {
            worker_threads: 4,
            ..MesherOptions::default()
        };
        let mut builder = ChunkBuilder::new(&options, Arc::new(TestHost));

        let mut scheduled = HashSet::new();
        for i in 0..12 {
            let section = Point3::new(i, 0, 0);
            let task = builder.create_rebuild_task(&world, section);
            builder.schedule(Box::new(task));
            scheduled.insert((section.x, section.y, section.z));
        }

        let outputs = drain_until(&mut builder, 12);
        let received: HashSet<_> = outputs
            .iter()
            .map(|output| {
                let section = output.section();
                (section.x, section.y, section.z)
            })
            .collect();

        assert_eq!(received, scheduled);
        assert_eq!(builder.pending_count(), 0);
        assert_eq!(builder.in_flight_count(), 0);
    }

    #[test]
    fn cancelled_builds_report_cancelled_and_release_slices() {
        let mut world = TestWorld::new();
        world.set_block(0, 0, 0, STONE_BLOCK);

        let mut builder = ChunkBuilder::new(&single_worker_options(), Arc::new(TestHost));

        // With one worker and an in-flight cap of one, later builds queue up
        // and can be cancelled before any worker touches them.
        let mut handles = Vec::new();
        for i in 0..6 {
            let task = builder.create_rebuild_task(&world, Point3::new(i, 0, 0));
            handles.push(builder.schedule(Box::new(task)));
        }
        for handle in &handles[1..] {
            handle.cancel();
        }

        let outputs = drain_until(&mut builder, 6);

        let cancelled = outputs
            .iter()
            .filter(|output| matches!(output, BuildOutput::Cancelled { .. }))
            .count();
        let completed = outputs
            .iter()
            .filter(|output| matches!(output, BuildOutput::Completed(_)))
            .count();

        assert_eq!(completed, 1);
        assert_eq!(cancelled, 5);

        // Every slice came back, whether its build completed or not.
        assert_eq!(builder.slice_pool().idle_count(), 6);
    }

    #[test]
    fn dropped_builder_releases_queued_slices() {
        let world = TestWorld::new();
        let mut builder = ChunkBuilder::new(&single_worker_options(), Arc::new(TestHost));
        let pool = builder.slice_pool().clone();

        for i in 0..4 {
            let task = builder.create_rebuild_task(&world, Point3::new(i, 0, 0));
            builder.schedule(Box::new(task));
        }

        drop(builder);
        assert_eq!(pool.idle_count(), 4);
    }

    #[test]
    fn camera_position_round_trips() {
        let builder = ChunkBuilder::new(&single_worker_options(), Arc::new(TestHost));
        builder.set_camera_position(Point3::new(1.5, -8.0, 64.0));
        assert_eq!(builder.camera_position(), Point3::new(1.5, -8.0, 64.0));
    }
}
