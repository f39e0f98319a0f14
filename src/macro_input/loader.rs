//! CSV loaders for the monthly macro grid and historical observed totals
//!
//! Expected layouts (header row required):
//!
//! ```text
//! macro:      month,r_3m,r_2y,r_5y,r_10y,inflation_m,nominal_gdp,primary_deficit
//! historical: month,total
//! ```
//!
//! Blank numeric cells parse to NaN so that `MacroSeries::validate` can
//! report the gap with its field and month; non-numeric garbage is a parse
//! error here. Rows must be consecutive months.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ModelError;
use crate::macro_input::{MacroPoint, MacroSeries, Month, ObservedSeries};

/// Load the monthly macro grid from a CSV file.
pub fn load_macro_csv(path: &Path) -> Result<MacroSeries, ModelError> {
    let file = File::open(path)?;
    load_macro_from_reader(file, &path.display().to_string())
}

/// Load the monthly macro grid from any reader (exposed for tests).
pub fn load_macro_from_reader<R: Read>(
    reader: R,
    context: &str,
) -> Result<MacroSeries, ModelError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut start: Option<Month> = None;
    let mut points = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() < 8 {
            return Err(ModelError::Parse {
                context: context.to_string(),
                row: row + 1,
                message: format!("expected 8 columns, found {}", record.len()),
            });
        }

        let month = parse_month(&record[0], context, row + 1)?;
        check_consecutive(&mut start, points.len(), month)?;

        points.push(MacroPoint {
            r_3m: parse_cell(&record[1], "r_3m", context, row + 1)?,
            r_2y: parse_cell(&record[2], "r_2y", context, row + 1)?,
            r_5y: parse_cell(&record[3], "r_5y", context, row + 1)?,
            r_10y: parse_cell(&record[4], "r_10y", context, row + 1)?,
            inflation_m: parse_cell(&record[5], "inflation_m", context, row + 1)?,
            nominal_gdp: parse_cell(&record[6], "nominal_gdp", context, row + 1)?,
            primary_deficit: parse_cell(&record[7], "primary_deficit", context, row + 1)?,
        });
    }

    let start = start.ok_or_else(|| {
        ModelError::config(format!("macro file {context} contains no data rows"))
    })?;
    Ok(MacroSeries::new(start, points))
}

/// Load historical observed monthly interest totals from a CSV file.
pub fn load_observed_csv(path: &Path) -> Result<ObservedSeries, ModelError> {
    let file = File::open(path)?;
    load_observed_from_reader(file, &path.display().to_string())
}

/// Load historical observed totals from any reader (exposed for tests).
pub fn load_observed_from_reader<R: Read>(
    reader: R,
    context: &str,
) -> Result<ObservedSeries, ModelError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut start: Option<Month> = None;
    let mut totals = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(ModelError::Parse {
                context: context.to_string(),
                row: row + 1,
                message: format!("expected 2 columns, found {}", record.len()),
            });
        }

        let month = parse_month(&record[0], context, row + 1)?;
        check_consecutive(&mut start, totals.len(), month)?;
        totals.push(parse_cell(&record[1], "total", context, row + 1)?);
    }

    let start = start.ok_or_else(|| {
        ModelError::config(format!("historical file {context} contains no data rows"))
    })?;
    Ok(ObservedSeries::new(start, totals))
}

fn parse_month(cell: &str, context: &str, row: usize) -> Result<Month, ModelError> {
    cell.parse().map_err(|_| ModelError::Parse {
        context: context.to_string(),
        row,
        message: format!("invalid month '{cell}', expected YYYY-MM"),
    })
}

/// Blank cells become NaN; validation downstream names the gap.
fn parse_cell(
    cell: &str,
    field: &'static str,
    context: &str,
    row: usize,
) -> Result<f64, ModelError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse().map_err(|_| ModelError::Parse {
        context: context.to_string(),
        row,
        message: format!("invalid value '{cell}' for {field}"),
    })
}

fn check_consecutive(
    start: &mut Option<Month>,
    rows_so_far: usize,
    month: Month,
) -> Result<(), ModelError> {
    match start {
        None => {
            *start = Some(month);
            Ok(())
        }
        Some(first) => {
            let expected = first.add_months(rows_so_far);
            if month != expected {
                Err(ModelError::MonthGap {
                    expected,
                    found: month,
                })
            } else {
                Ok(())
            }
        }
    }
}
