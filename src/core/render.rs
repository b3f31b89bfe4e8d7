//! Category-grouped rendering of the distance matrix.
//!
//! Rows and columns follow the fixed category order, each category sorted
//! case-insensitively by school name. Diagonal cells and co-located pairs
//! both render as the same marker; the distinction only exists internally.

use std::io;
use std::path::Path;

use crate::core::error::{Error, Result};
use crate::core::roster::{Category, Roster};
use crate::core::store::{Distance, DistanceStore};

/// Marker for self cells and co-located pairs.
const NOT_APPLICABLE: &str = "X";

/// Partition school names by category in render order, each group sorted
/// case-insensitively.
pub fn category_grouping(roster: &Roster) -> Vec<Vec<String>> {
    Category::ALL
        .iter()
        .map(|category| {
            let mut group: Vec<String> = roster
                .iter()
                .filter(|(_, location)| location.category == *category)
                .map(|(name, _)| name.to_string())
                .collect();
            group.sort_by_key(|name| name.to_uppercase());
            group
        })
        .collect()
}

/// Build the square table: a header row with a leading blank cell, then one
/// row per school with its name in the first cell.
///
/// A distinct pair missing from the store means the merge did not cover the
/// grouping it was handed; that is an error, never a blank cell.
pub fn render_matrix(grouping: &[Vec<String>], store: &DistanceStore) -> Result<Vec<Vec<String>>> {
    let order: Vec<&str> = grouping.iter().flatten().map(String::as_str).collect();

    let mut grid = Vec::with_capacity(order.len() + 1);
    let mut header = Vec::with_capacity(order.len() + 1);
    header.push(String::new());
    header.extend(order.iter().map(|name| name.to_string()));
    grid.push(header);

    for row_name in &order {
        let mut row = Vec::with_capacity(order.len() + 1);
        row.push(row_name.to_string());
        for col_name in &order {
            row.push(cell(row_name, col_name, store)?);
        }
        grid.push(row);
    }

    Ok(grid)
}

fn cell(row: &str, col: &str, store: &DistanceStore) -> Result<String> {
    if row == col {
        return Ok(NOT_APPLICABLE.to_string());
    }
    match store.get(row, col) {
        Some(Distance::Colocated) => Ok(NOT_APPLICABLE.to_string()),
        Some(Distance::Miles(miles)) => Ok(format!("{miles:.1}")),
        None => Err(Error::SourceUnavailable(format!(
            "no distance recorded for {row} <-> {col}"
        ))),
    }
}

/// Write the rendered grid as a CSV file.
pub fn write_table(path: &Path, grid: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_io)?;
    for row in grid {
        writer.write_record(row).map_err(csv_io)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_io(err: csv::Error) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, err))
}
