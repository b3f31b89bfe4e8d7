//! Symmetric distance store and the cache-merging engine.
//!
//! The store records one fact per unordered pair and serves both directions
//! from it. A merge pass walks the generated pairs, reuses anything already
//! recorded (from this run or a loaded snapshot), and queries the oracle
//! only for pairs with no measurement at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::Result;
use crate::core::maps::DistanceOracle;
use crate::core::pairs::PairSet;
use crate::core::roster::Roster;

/// A recorded distance fact for one unordered pair.
///
/// Absence from the store means "not yet computed". A recorded zero is
/// reserved for co-located pairs and is never a measured value, so the two
/// stay distinguishable in memory while persisting as a plain `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// Two school names sharing one physical address.
    Colocated,
    /// Measured driving distance in miles, rounded up to the nearest tenth.
    Miles(f64),
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Distance::Colocated => serializer.serialize_f64(0.0),
            Distance::Miles(miles) => serializer.serialize_f64(*miles),
        }
    }
}

impl<'de> Deserialize<'de> for Distance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let miles = f64::deserialize(deserializer)?;
        if miles == 0.0 {
            Ok(Distance::Colocated)
        } else if miles > 0.0 {
            Ok(Distance::Miles(miles))
        } else {
            Err(de::Error::custom(format!("negative distance: {miles}")))
        }
    }
}

/// Round a distance in miles up to the nearest tenth.
///
/// Applied exactly once, when a fresh measurement is recorded. Cached values
/// are already rounded and must not pass through again: `ceil(x * 10) / 10`
/// can push an already-rounded value up a further tenth under IEEE-754.
pub fn round_up_to_tenth(miles: f64) -> f64 {
    (miles * 10.0).ceil() / 10.0
}

/// Progress callback function type, called with (pairs resolved, pairs total)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for a merge pass
#[derive(Default)]
pub struct MergeOptions {
    /// Optional progress callback
    pub progress: Option<ProgressCallback>,
}

/// Counters describing what a merge pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Pairs resolved by a fresh oracle query
    pub queried: u64,
    /// Pairs resolved from previously recorded values
    pub reused: u64,
    /// Cached pairs whose two stored directions disagreed
    pub conflicts: u64,
}

/// Pair-to-distance mapping, symmetric after every merge pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceStore {
    data: BTreeMap<String, BTreeMap<String, Distance>>,
}

impl DistanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded value for origin→dest, that direction only.
    fn directed(&self, origin: &str, dest: &str) -> Option<Distance> {
        self.data.get(origin).and_then(|row| row.get(dest)).copied()
    }

    /// Recorded value for an unordered pair, checking a→b before b→a.
    pub fn get(&self, a: &str, b: &str) -> Option<Distance> {
        self.directed(a, b).or_else(|| self.directed(b, a))
    }

    /// Record one symmetric fact.
    pub fn insert(&mut self, a: &str, b: &str, distance: Distance) {
        self.data
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), distance);
        self.data
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), distance);
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolve every pair in `pairs`, merging cached values with fresh
    /// oracle queries.
    ///
    /// Reuse checks origin→dest before dest→origin; when both directions are
    /// cached and disagree, the first-found value wins and the conflict is
    /// logged. The winning value is written back to both directions, so the
    /// store is symmetric afterwards. An oracle failure aborts the merge.
    ///
    /// A store that already covers every distinct pair performs zero oracle
    /// queries and is left unchanged apart from co-location sentinels.
    pub async fn merge(
        &mut self,
        pairs: &PairSet,
        roster: &Roster,
        oracle: &dyn DistanceOracle,
        options: &MergeOptions,
    ) -> Result<MergeStats> {
        let mut stats = MergeStats::default();
        let total = pairs.distinct.len() as u64;
        let mut resolved = 0u64;

        for (origin, dest) in &pairs.distinct {
            let known = match (self.directed(origin, dest), self.directed(dest, origin)) {
                (Some(forward), Some(reverse)) => {
                    if forward != reverse {
                        stats.conflicts += 1;
                        warn!(
                            "conflicting cached distances for {origin} <-> {dest}: \
                             {forward:?} != {reverse:?}, keeping the first"
                        );
                    }
                    Some(forward)
                }
                (Some(forward), None) => Some(forward),
                (None, Some(reverse)) => Some(reverse),
                (None, None) => None,
            };

            let distance = match known {
                Some(distance) => {
                    debug!("reusing recorded distance for {origin} <-> {dest}");
                    stats.reused += 1;
                    distance
                }
                None => {
                    let origin_addr = roster.address_of(origin)?;
                    let dest_addr = roster.address_of(dest)?;
                    let miles = oracle.query(origin_addr, dest_addr).await?;
                    stats.queried += 1;
                    Distance::Miles(round_up_to_tenth(miles))
                }
            };

            self.insert(origin, dest, distance);

            resolved += 1;
            if let Some(ref progress) = options.progress {
                progress(resolved, total);
            }
        }

        for (a, b) in &pairs.colocated {
            self.insert(a, b, Distance::Colocated);
        }

        Ok(stats)
    }
}
