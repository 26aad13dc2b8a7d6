//! Remote map knowledge: cell reports fetched by place name.
//!
//! A report payload is UTF-8 text `"row,col,result"`. Commas, semicolons and
//! whitespace are all accepted as separators. `result` is the occupancy code
//! for the cell (0 = free, anything else = obstacle).

mod tcp;

pub use tcp::TcpMapFetcher;

use crate::error::{NavError, Result};
use crate::grid::Cell;

/// Occupancy knowledge for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellReport {
    pub cell: Cell,
    pub occupancy: i32,
}

/// Request/response source of cell reports.
pub trait MapFetch: Send {
    /// Fetch the report published under `place`.
    ///
    /// `Ok(None)` covers timeouts and empty answers: nothing to apply this
    /// cycle.
    fn fetch(&mut self, place: &str) -> Result<Option<CellReport>>;
}

/// Place name under which a cell's report is published.
pub fn place_name(cell: Cell) -> String {
    format!("{}_{}", cell.row, cell.col)
}

/// Decode a report payload.
pub fn decode_payload(payload: &str) -> Result<CellReport> {
    let fields: Vec<&str> = payload
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();

    let [row, col, result] = fields.as_slice() else {
        return Err(NavError::Protocol(format!(
            "expected 3 fields in report, got {}: {:?}",
            fields.len(),
            payload
        )));
    };

    let parse_index = |name: &str, value: &str| {
        value
            .parse::<usize>()
            .map_err(|e| NavError::Protocol(format!("bad {} {:?}: {}", name, value, e)))
    };

    let cell = Cell::new(parse_index("row", *row)?, parse_index("column", *col)?);
    let occupancy = result
        .parse::<i32>()
        .map_err(|e| NavError::Protocol(format!("bad result {:?}: {}", result, e)))?;

    Ok(CellReport { cell, occupancy })
}
