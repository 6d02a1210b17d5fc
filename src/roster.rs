//! CSV roster decoding.
//!
//! Expected layout: a header row naming the `name`, `overall` and `position` columns (any order,
//! header names are matched case-insensitively), then one player per row. Cells are trimmed and
//! blank lines are skipped. Decoding does not validate values, that is the job of
//! [`crate::normalizer`].

use std::io::Read;

use tracing::{debug, instrument};

use crate::error::{BalanceError, BalanceResult};
use crate::normalizer::{RawPlayer, RawRating};

const NAME_COLUMN: &str = "name";
const OVERALL_COLUMN: &str = "overall";
const POSITION_COLUMN: &str = "position";

/// Column indices resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    overall: usize,
    position: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> BalanceResult<Columns> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(wanted))
                .ok_or_else(|| {
                    BalanceError::Validation(format!("CSV header is missing the '{wanted}' column"))
                })
        };

        Ok(Columns {
            name: find(NAME_COLUMN)?,
            overall: find(OVERALL_COLUMN)?,
            position: find(POSITION_COLUMN)?,
        })
    }
}

/// Decodes a CSV roster into raw rows.
///
/// # Errors
/// Returns [`BalanceError::Validation`] when the header lacks a required column, when the input
/// is not UTF-8, or when a row has a different number of cells than the header.
#[instrument(skip_all)]
pub fn read_csv_roster<R: Read>(reader: R) -> BalanceResult<Vec<RawPlayer>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let cell = |i: usize| record.get(i).unwrap_or_default().to_owned();
        rows.push(RawPlayer {
            name: cell(columns.name),
            overall: Some(RawRating::Text(cell(columns.overall))),
            position: cell(columns.position),
        });
    }

    debug!(rows = rows.len(), "decoded CSV roster");
    Ok(rows)
}

fn csv_error(err: csv::Error) -> BalanceError {
    match err.position() {
        Some(pos) => BalanceError::Validation(format!("invalid CSV at line {}: {err}", pos.line())),
        None => BalanceError::Validation(format!("invalid CSV: {err}")),
    }
}
