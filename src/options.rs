//! # Options Module
//!
//! This module provides the mesher's persisted configuration. Options are
//! stored as a JSON file owned by the host application; the mesher reads them
//! once at startup and treats them as immutable for the session. Inside the
//! build pipeline the options only size the worker pool and gate the
//! memory-intrinsics capability flag consulted by the slice pool; everything
//! else about presentation lives with the host.

use std::fs;
use std::io;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

/// Persisted mesher configuration.
///
/// Unknown or missing fields fall back to their defaults so option files
/// survive version changes in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherOptions {
    /// Number of worker threads to run builds on; 0 selects one per logical CPU
    pub worker_threads: usize,
    /// Advanced switches that trade safety margins for speed
    pub advanced: AdvancedOptions,
}

/// Advanced option switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedOptions {
    /// Whether slice acquisition may use the host's bulk-copy fast path
    /// instead of per-cell state lookups
    pub use_memory_intrinsics: bool,
}

impl Default for MesherOptions {
    fn default() -> Self {
        MesherOptions {
            worker_threads: 0,
            advanced: AdvancedOptions::default(),
        }
    }
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        AdvancedOptions {
            use_memory_intrinsics: true,
        }
    }
}

impl MesherOptions {
    /// Loads options from the given JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or unparsable file
    /// is logged and also yields the defaults, so a damaged config can never
    /// keep the mesher from starting.
    ///
    /// # Arguments
    /// * `path` - Path of the options JSON file
    ///
    /// # Returns
    /// The loaded or defaulted options.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return MesherOptions::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(options) => options,
                Err(error) => {
                    warn!("could not parse options file {:?}: {}", path, error);
                    MesherOptions::default()
                }
            },
            Err(error) => {
                warn!("could not read options file {:?}: {}", path, error);
                MesherOptions::default()
            }
        }
    }

    /// Writes the options to the given JSON file.
    ///
    /// # Arguments
    /// * `path` - Path of the options JSON file
    ///
    /// # Errors
    /// Any I/O error from writing the file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, contents)
    }

    /// Resolves the configured worker count to a concrete thread count.
    ///
    /// # Returns
    /// The configured count, or one thread per logical CPU when set to 0.
    pub fn worker_thread_count(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(2)
        } else {
            self.worker_threads
        }
    }
}
