//! # Schoolmiles CLI
//!
//! Command-line interface for the schoolmiles library.
//! Compiles a table of shortest driving distances between a district's
//! schools, reusing a snapshot of previous measurements when one is given.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, warn};
use schoolmiles::{
    category_grouping, generate_pairs, render_matrix, write_table, CacheOnlyOracle,
    DistanceOracle, DistanceStore, Error, GoogleMapsOracle, MergeOptions, Result, Roster,
    Snapshot,
};

mod cli;

/// Command-line interface for schoolmiles
#[derive(Parser)]
#[command(name = "schoolmiles")]
#[command(about = "Driving-distance matrix generator for school districts")]
#[command(long_about = "Compiles a CSV table of shortest driving distances between schools:
  schoolmiles --in-file schools.csv --key $API_KEY --out-file table.csv
  schoolmiles --in-file schools.csv --key $API_KEY --out-file table.csv --data-out distances.json
  schoolmiles --data-in distances.json --out-file table.csv   # no API key needed

Distances already present in --data-in are never re-queried; schools sharing
one address render as 'X' instead of a measured distance.")]
#[command(version)]
struct Cli {
    /// CSV roster of schools (Name, Type, Street Address, City, State, Zip Code)
    #[arg(long)]
    in_file: Option<PathBuf>,

    /// Path for the rendered distance table (CSV)
    #[arg(long)]
    out_file: PathBuf,

    /// Google API key with Directions permissions
    #[arg(long)]
    key: Option<String>,

    /// Snapshot of addresses + distances from a previous run
    #[arg(long)]
    data_in: Option<PathBuf>,

    /// Where to store this run's addresses + distances
    #[arg(long)]
    data_out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Check flag combinations before any I/O.
fn validate_inputs(cli: &Cli) -> Result<()> {
    if cli.key.is_none() && cli.data_in.is_none() {
        return Err(Error::MissingApiKey);
    }
    if cli.in_file.is_none() && cli.data_in.is_none() {
        return Err(Error::MissingRoster);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr; conflict and duplicate warnings should
    // be visible without RUST_LOG set.
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli).await {
        error!("❌ {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        eprintln!("🚌 Schoolmiles v{} starting...", env!("CARGO_PKG_VERSION"));
    }

    validate_inputs(&cli)?;

    if cli.in_file.is_some() && cli.data_in.is_some() {
        warn!("ignoring the roster file because an input data file was specified");
    }

    let (mut roster, mut store) = if let Some(path) = &cli.data_in {
        let snapshot = Snapshot::load(path)?;
        if cli.verbose {
            if let Some(saved_at) = snapshot.saved_at {
                eprintln!("📂 Reusing distances saved {saved_at}");
            }
        }
        (snapshot.addresses, snapshot.distances)
    } else if let Some(path) = &cli.in_file {
        (Roster::from_csv_path(path)?, DistanceStore::new())
    } else {
        return Err(Error::MissingRoster);
    };

    // A snapshot written before any roster was parsed can carry an empty
    // address map; fall back to the CSV in that case.
    if roster.is_empty() {
        if let Some(path) = &cli.in_file {
            roster = Roster::from_csv_path(path)?;
        }
    }

    let pairs = generate_pairs(&roster);

    let oracle: Box<dyn DistanceOracle> = match &cli.key {
        Some(key) => Box::new(GoogleMapsOracle::new(key.clone())),
        None => Box::new(CacheOnlyOracle),
    };

    let progress = cli::ProgressManager::new(
        pairs.distinct.len() as u64,
        &format!("🗺️  Resolving {} pair distances", pairs.distinct.len()),
    );
    let options = MergeOptions {
        progress: Some(Arc::new({
            let pb = progress.pb.clone();
            move |resolved, total| {
                if pb.length().unwrap_or(0) != total {
                    pb.set_length(total);
                }
                pb.set_position(resolved);
            }
        })),
    };

    let stats = store.merge(&pairs, &roster, oracle.as_ref(), &options).await?;
    progress.pb.finish_and_clear();

    if cli.verbose {
        eprintln!(
            "✅ {} fresh queries, {} reused, {} conflicts",
            stats.queried, stats.reused, stats.conflicts
        );
    }

    if let Some(path) = &cli.data_out {
        // A failed snapshot write must not cost us the table.
        if let Err(e) = Snapshot::save(path, &roster, &store) {
            error!("failed to write snapshot {}: {e}", path.display());
        }
    }

    let grouping = category_grouping(&roster);
    let grid = render_matrix(&grouping, &store)?;
    write_table(&cli.out_file, &grid)?;

    eprintln!("📁 Distance table written to {}", cli.out_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(key: Option<&str>, in_file: Option<&str>, data_in: Option<&str>) -> Cli {
        Cli {
            in_file: in_file.map(PathBuf::from),
            out_file: PathBuf::from("table.csv"),
            key: key.map(String::from),
            data_in: data_in.map(PathBuf::from),
            data_out: None,
            verbose: false,
        }
    }

    #[test]
    fn test_validate_requires_key_or_data() {
        let err = validate_inputs(&cli(None, Some("schools.csv"), None)).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_validate_requires_roster_or_data() {
        let err = validate_inputs(&cli(Some("k"), None, None)).unwrap_err();
        assert!(matches!(err, Error::MissingRoster));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_validate_accepts_data_file_alone() {
        assert!(validate_inputs(&cli(None, None, Some("distances.json"))).is_ok());
    }

    #[test]
    fn test_validate_accepts_key_plus_roster() {
        assert!(validate_inputs(&cli(Some("k"), Some("schools.csv"), None)).is_ok());
    }
}
