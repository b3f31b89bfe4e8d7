//! Snapshot persistence: addresses + distances reused across runs.
//!
//! The writer always emits a versioned envelope. The loader also accepts the
//! two older array shapes (with and without a leading timestamp) so data
//! files from earlier releases keep working.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::roster::Roster;
use crate::core::store::DistanceStore;

/// Schema version written by [`Snapshot::save`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// A loaded snapshot. `saved_at` is absent for the oldest files.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub saved_at: Option<DateTime<Utc>>,
    pub addresses: Roster,
    pub distances: DistanceStore,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionedSnapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    addresses: Roster,
    distances: DistanceStore,
}

/// On-disk shapes, newest first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Versioned(VersionedSnapshot),
    TimestampedTuple(DateTime<Utc>, Roster, DistanceStore),
    BareTuple(Roster, DistanceStore),
}

impl Snapshot {
    /// Load a snapshot, tolerating every shape this tool has ever written.
    pub fn load(path: &Path) -> Result<Snapshot> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::SourceUnavailable(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let file: SnapshotFile = serde_json::from_str(&raw).map_err(|e| {
            Error::SourceUnavailable(format!("corrupt snapshot {}: {e}", path.display()))
        })?;

        Ok(match file {
            SnapshotFile::Versioned(snapshot) => Snapshot {
                saved_at: Some(snapshot.saved_at),
                addresses: snapshot.addresses,
                distances: snapshot.distances,
            },
            SnapshotFile::TimestampedTuple(saved_at, addresses, distances) => Snapshot {
                saved_at: Some(saved_at),
                addresses,
                distances,
            },
            SnapshotFile::BareTuple(addresses, distances) => Snapshot {
                saved_at: None,
                addresses,
                distances,
            },
        })
    }

    /// Write the current addresses and distances in the versioned shape.
    ///
    /// Callers treat a failure here as best-effort: it is logged and the run
    /// still renders its table.
    pub fn save(path: &Path, addresses: &Roster, distances: &DistanceStore) -> Result<()> {
        let file = VersionedSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            addresses: addresses.clone(),
            distances: distances.clone(),
        };
        let raw = serde_json::to_string_pretty(&file).map_err(io::Error::from)?;
        fs::write(path, raw)?;
        Ok(())
    }
}
