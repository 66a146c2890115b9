//! Serialising arrays and group summaries for command output.

use std::io::Write;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    array::{Attrs, Coord, LabeledArray},
    grouping::Grouped,
};

/// JSON view of a labeled array. Missing values are `null`.
#[derive(Debug, Clone, Serialize)]
pub struct ArrayDto {
    pub name: Option<String>,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub coords: IndexMap<String, Coord>,
    pub attrs: Attrs,
    pub values: Vec<Option<f64>>,
}

impl From<&LabeledArray> for ArrayDto {
    fn from(array: &LabeledArray) -> Self {
        Self {
            name: array.name().map(String::from),
            dims: array.dims().to_vec(),
            shape: array.shape().to_vec(),
            coords: array.coords().clone(),
            attrs: array.attrs().clone(),
            values: array
                .data()
                .iter()
                .map(|&v| (!v.is_nan()).then_some(v))
                .collect(),
        }
    }
}

/// One row of a group-size summary.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSizeDto {
    pub key: String,
    pub count: usize,
}

pub fn group_sizes(grouped: &Grouped) -> Vec<GroupSizeDto> {
    let sizes = grouped.sizes();
    if grouped.keys().is_empty() {
        return sizes
            .into_iter()
            .map(|count| GroupSizeDto {
                key: "all".into(),
                count,
            })
            .collect();
    }
    grouped
        .keys()
        .iter()
        .zip(sizes)
        .map(|(key, count)| GroupSizeDto {
            key: key.to_string(),
            count,
        })
        .collect()
}

pub fn write_json<W: Write, T: Serialize>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Write one row per element: a column per dimension, then `value`.
pub fn write_array_csv<W: Write>(writer: W, array: &LabeledArray) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = array.dims().iter().map(String::as_str).collect();
    header.push("value");
    out.write_record(&header)?;
    for (index, value) in array.data().indexed_iter() {
        let mut row: Vec<String> = array
            .dims()
            .iter()
            .enumerate()
            .map(|(axis, dim)| {
                let pos = index[axis];
                array
                    .coord(dim)
                    .and_then(|coord| coord.label(pos))
                    .unwrap_or_else(|| pos.to_string())
            })
            .collect();
        row.push(if value.is_nan() {
            String::new()
        } else {
            value.to_string()
        });
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_rows_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}
