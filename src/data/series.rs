//! Loading daily series from CSV files.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use ndarray::{ArrayD, IxDyn};
use tracing::info;

use crate::{
    array::{Coord, LabeledArray},
    config::Settings,
};

/// Read a CSV with a date column followed by one or more value columns.
///
/// A single value column yields a `time` series; several yield a
/// `(time, <extra_dim>)` array labeled by column name. Empty cells and
/// `NaN` become missing values.
pub fn load_csv(path: &Path, settings: &Settings) -> Result<LabeledArray> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        bail!(
            "{} needs a date column and at least one value column",
            path.display()
        );
    }
    let columns: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut time = Vec::new();
    let mut values = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", line + 1))?;
        let stamp = record.get(0).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(stamp, &settings.date_format).with_context(|| {
            format!("row {}: '{stamp}' does not match {}", line + 1, settings.date_format)
        })?;
        time.push(date);
        for (col, name) in columns.iter().enumerate() {
            let cell = record.get(col + 1).unwrap_or_default().trim();
            values.push(parse_value(cell).with_context(|| {
                format!("row {}, column '{name}': invalid number '{cell}'", line + 1)
            })?);
        }
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("series")
        .to_string();
    info!(path = %path.display(), rows = time.len(), columns = columns.len(), "loaded series");

    let array = if columns.len() == 1 {
        LabeledArray::time_series(time, values)?
    } else {
        let data = ArrayD::from_shape_vec(IxDyn(&[time.len(), columns.len()]), values)?;
        LabeledArray::new(["time", settings.extra_dim.as_str()], data)?
            .with_coord("time", Coord::Time(time))?
            .with_coord(&settings.extra_dim, Coord::Label(columns))?
    };
    Ok(array.with_name(name))
}

fn parse_value(cell: &str) -> Result<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    Ok(cell.parse()?)
}
