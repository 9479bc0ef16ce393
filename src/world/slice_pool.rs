//! # Slice Pool Module
//!
//! This module provides the bounded pool of reusable slice storages. Taking a
//! snapshot of a section's neighborhood needs two multi-kilobyte arrays; a
//! rebuild-heavy frame can run dozens of snapshots, so the backing arrays are
//! recycled instead of reallocated.
//!
//! ## Concurrency
//!
//! Acquisition happens on the thread a build task is created on; release
//! happens wherever the task is dropped, usually a worker thread. The free
//! list is therefore shared behind [`MtResource`]. Individual storages are
//! never shared: a storage is owned by exactly one [`WorldSlice`] between
//! acquire and release, and its contents are fully overwritten on the next
//! acquire, so no ordering guarantee is needed on which storage a lease gets.
//!
//! ## Growth
//!
//! An empty free list allocates a fresh storage rather than blocking the
//! caller. Storages released beyond [`MAX_POOLED_SLICES`] are dropped to keep
//! the pool's footprint bounded after load spikes.

use cgmath::Point3;
use log::debug;

use crate::core::MtResource;

use super::slice::{CHUNK_DIMENSION, CHUNK_SIZE_WRAPPED, section_index, wrapped_index};
use super::{BlockEntityRef, BlockId, FluidId, WorldSlice, WorldView};

/// Maximum number of idle storages retained by the pool.
///
/// Enough for every worker to hold a slice while a frame's worth of completed
/// builds waits for the main thread, without the pool acting as a leak after
/// a burst of rebuilds.
pub const MAX_POOLED_SLICES: usize = 32;

/// The reusable backing arrays for one slice.
pub(crate) struct SliceStorage {
    /// Wrapped block state array, 18x18x18
    pub blocks: Vec<BlockId>,
    /// Wrapped fluid state array, 18x18x18
    pub fluids: Vec<FluidId>,
    /// Block entities captured from the section, as (section cell index, handle)
    pub entities: Vec<(u16, BlockEntityRef)>,
}

impl SliceStorage {
    fn new() -> Self {
        SliceStorage {
            blocks: vec![BlockId::default(); CHUNK_SIZE_WRAPPED],
            fluids: vec![FluidId::default(); CHUNK_SIZE_WRAPPED],
            entities: Vec::new(),
        }
    }
}

/// A concurrent pool of [`SliceStorage`] values.
///
/// Cloning the pool produces another handle to the same free list, which is
/// how the handle travels inside each [`WorldSlice`] so the slice can return
/// its storage from whatever thread drops it.
pub struct WorldSlicePool {
    /// Idle storages ready for reuse
    free: MtResource<Vec<SliceStorage>>,
    /// Whether hosts may be offered the bulk-copy fast path
    use_memory_intrinsics: bool,
}

impl WorldSlicePool {
    /// Creates an empty pool.
    ///
    /// # Arguments
    /// * `use_memory_intrinsics` - Whether [`WorldView::copy_section`] may be
    ///   used to fill snapshots; gated by the persisted advanced option
    pub fn new(use_memory_intrinsics: bool) -> Self {
        WorldSlicePool {
            free: MtResource::new(Vec::new()),
            use_memory_intrinsics,
        }
    }

    /// Takes a snapshot of the section at the given section coordinates.
    ///
    /// Copies the wrapped 18x18x18 neighborhood of block and fluid state out
    /// of `world` into pooled storage (allocating a new storage only if the
    /// pool is empty) and captures the section's block entities.
    ///
    /// # Arguments
    /// * `world` - Live world data; only read during this call
    /// * `section` - Section coordinates of the volume to snapshot
    ///
    /// # Returns
    /// A [`WorldSlice`] leasing the filled storage. Dropping it returns the
    /// storage to this pool.
    pub fn acquire(&self, world: &dyn WorldView, section: Point3<i32>) -> WorldSlice {
        let mut storage = match self.free.get_mut().pop() {
            Some(storage) => storage,
            None => {
                debug!("slice pool empty, allocating a new storage");
                SliceStorage::new()
            }
        };

        let origin = Point3::new(
            section.x * CHUNK_DIMENSION,
            section.y * CHUNK_DIMENSION,
            section.z * CHUNK_DIMENSION,
        );

        self.fill(world, origin, &mut storage);

        WorldSlice::new(storage, origin, section, self.clone())
    }

    /// Returns a storage to the free list, dropping it if the pool is full.
    pub(crate) fn release(&self, storage: SliceStorage) {
        let mut free = self.free.get_mut();
        if free.len() < MAX_POOLED_SLICES {
            free.push(storage);
        }
    }

    /// Returns the number of idle storages currently pooled.
    pub fn idle_count(&self) -> usize {
        self.free.get().len()
    }

    fn fill(&self, world: &dyn WorldView, origin: Point3<i32>, storage: &mut SliceStorage) {
        let min = Point3::new(origin.x - 1, origin.y - 1, origin.z - 1);

        let copied = self.use_memory_intrinsics
            && world.copy_section(min, &mut storage.blocks, &mut storage.fluids);

        if !copied {
            for z in -1..=CHUNK_DIMENSION {
                for y in -1..=CHUNK_DIMENSION {
                    for x in -1..=CHUNK_DIMENSION {
                        let index = wrapped_index(x, y, z);
                        storage.blocks[index] =
                            world.block(origin.x + x, origin.y + y, origin.z + z);
                        storage.fluids[index] =
                            world.fluid(origin.x + x, origin.y + y, origin.z + z);
                    }
                }
            }
        }

        storage.entities.clear();
        for (position, entity) in world.block_entities(origin) {
            let relative = position - origin;
            storage.entities.push((
                section_index(relative.x, relative.y, relative.z) as u16,
                entity,
            ));
        }
    }
}

impl Clone for WorldSlicePool {
    fn clone(&self) -> Self {
        WorldSlicePool {
            free: self.free.clone(),
            use_memory_intrinsics: self.use_memory_intrinsics,
        }
    }
}
