//! # Schoolmiles
//!
//! Builds a symmetric matrix of shortest driving distances between a school
//! district's locations. Distances come from the Google Directions API and
//! are cached in a snapshot file, so re-runs only query pairs never measured
//! before. Schools sharing one physical address are detected and rendered as
//! not-applicable instead of being queried.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use schoolmiles::{generate_pairs, Roster};
//!
//! # fn main() -> schoolmiles::Result<()> {
//! let roster = Roster::from_csv_path(Path::new("schools.csv"))?;
//! let pairs = generate_pairs(&roster);
//! println!("{} pairs need a distance query", pairs.distinct.len());
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::error::{Error, Result};
pub use crate::core::maps::{
    CacheOnlyOracle, DistanceOracle, GoogleMapsOracle, MapsConfig, METERS_TO_MILES,
};
pub use crate::core::pairs::{generate_pairs, PairSet};
pub use crate::core::render::{category_grouping, render_matrix, write_table};
pub use crate::core::roster::{Category, Location, Roster};
pub use crate::core::snapshot::Snapshot;
pub use crate::core::store::{
    round_up_to_tenth, Distance, DistanceStore, MergeOptions, MergeStats, ProgressCallback,
};
