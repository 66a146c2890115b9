//! Grouped view of (possibly windowed) data and recombination of the
//! per-group results into one labeled output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{ArrayD, Axis, IxDyn};
use tracing::debug;

use super::{
    index::{coordinate, time_coordinate},
    Grouper, RESHAPE_ATTR, TIME_DIM, WINDOW_DIM,
};
use crate::{
    array::{Aggregation, Coord, Data, Dataset, LabeledArray},
    calendar::{Period, SEASON_LABELS},
    error::{GroupError, Result},
};

/// Data split into calendar groups along time.
///
/// Every array inside carries the `time` dimension; members of each group
/// are kept in time order and groups are sorted by key.
#[derive(Debug, Clone)]
pub struct Grouped {
    data: Data,
    period: Option<Period>,
    keys: Vec<i64>,
    members: Vec<Vec<usize>>,
    time: Vec<NaiveDate>,
    time_chunks: Option<Vec<usize>>,
}

impl Grouper {
    /// Window and group `input` so that elements of the same period are
    /// addressable together.
    ///
    /// Dataset entries without a `time` dimension are first spread back onto
    /// the time axis: entries carrying the period dimension contribute the row
    /// of each step's period, others are repeated. With `interp`, entries with
    /// numeric period labels are instead interpolated linearly at each step's
    /// [`group_coordinate`](Grouper::group_coordinate), wrapping around the
    /// year for months, weeks and seasons. Additional dimensions are left
    /// untouched.
    pub fn group(&self, input: impl Into<Data>) -> Result<Grouped> {
        let input = input.into();
        let (time, time_chunks) = reference_time(&input)?;
        let data = match input {
            Data::Array(array) => Data::Array(array),
            Data::Dataset(ds) => {
                let mut out = Dataset::new();
                for (name, array) in ds.iter() {
                    let array = if array.has_dim(TIME_DIM) {
                        array.clone()
                    } else {
                        debug!(var = name, "broadcasting variable onto time");
                        self.ungroup(array, &time)?
                    };
                    out.insert(name, array);
                }
                *out.attrs_mut() = ds.attrs().clone();
                Data::Dataset(out)
            }
        };
        let data = if self.window > 1 {
            data.map_arrays(|array| array.rolling_window(TIME_DIM, self.window, WINDOW_DIM))?
        } else {
            data
        };
        Ok(Grouped::new(data, self.prop, time, time_chunks))
    }

    fn ungroup(&self, array: &LabeledArray, time: &[NaiveDate]) -> Result<LabeledArray> {
        let time_coord = Coord::Time(time.to_vec());
        match self.prop {
            Some(period) if array.has_dim(period.name()) => {
                let dim = period.name();
                let coord = array.coord(dim).ok_or_else(|| {
                    GroupError::incompatible(format!("'{dim}' has no coordinate to match on"))
                })?;
                if self.interp {
                    if let Some(keys) = numeric_keys(coord) {
                        return interpolate(array, period, &keys, time);
                    }
                }
                let rows = time
                    .iter()
                    .map(|&date| key_row(coord, period, period.key(date)))
                    .collect::<Result<Vec<_>>>()?;
                array
                    .select(dim, &rows)?
                    .rename_dim(dim, TIME_DIM)?
                    .with_coord(TIME_DIM, time_coord)
            }
            _ => array.expand_dim(TIME_DIM, time_coord),
        }
    }
}

/// Time axis shared by every time-bearing input, with its chunk layout.
fn reference_time(input: &Data) -> Result<(Vec<NaiveDate>, Option<Vec<usize>>)> {
    let timed: Vec<&LabeledArray> = input
        .arrays()
        .into_iter()
        .filter(|array| array.has_dim(TIME_DIM))
        .collect();
    let first = timed.first().ok_or_else(|| {
        GroupError::incompatible(format!("no input has a '{TIME_DIM}' dimension"))
    })?;
    let time = time_coordinate(first)?;
    let window = first.len_of(WINDOW_DIM);
    for other in &timed[1..] {
        let other_time = time_coordinate(other)?;
        if other_time.len() != time.len() {
            return Err(GroupError::incompatible(format!(
                "time extents differ: {} and {}",
                time.len(),
                other_time.len()
            )));
        }
        if other_time != time {
            return Err(GroupError::incompatible("time coordinates differ"));
        }
        if let (Some(a), Some(b)) = (window, other.len_of(WINDOW_DIM)) {
            if a != b {
                return Err(GroupError::incompatible(format!(
                    "window extents differ: {a} and {b}"
                )));
            }
        }
    }
    let time_chunks = timed
        .iter()
        .filter_map(|array| {
            let axis = array.axis_of(TIME_DIM)?;
            array.chunks().map(|chunks| chunks[axis].clone())
        })
        .min_by_key(Vec::len);
    Ok((time.to_vec(), time_chunks))
}

/// Linear interpolation of `array` along the period dimension at the
/// continuous group coordinate of every step. Steps outside the labeled
/// range are `NaN`.
fn interpolate(
    array: &LabeledArray,
    period: Period,
    keys: &[f64],
    time: &[NaiveDate],
) -> Result<LabeledArray> {
    let dim = period.name();
    let mut points: Vec<(f64, usize)> = keys.iter().copied().zip(0..).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Err(GroupError::incompatible(format!("'{dim}' has no entries")));
    };
    if let Some(cycle) = cycle_length(period, keys) {
        points.insert(0, (last.0 - cycle, last.1));
        points.push((first.0 + cycle, first.1));
    }

    let mut lower = Vec::with_capacity(time.len());
    let mut upper = Vec::with_capacity(time.len());
    let mut weights = Vec::with_capacity(time.len());
    for &date in time {
        let target = coordinate(period, date, true);
        let next = points.partition_point(|p| p.0 <= target);
        let below = next.checked_sub(1).map(|i| points[i]);
        let (row0, row1, weight) = match (below, points.get(next)) {
            (Some((x0, r0)), Some(&(x1, r1))) => (r0, r1, (target - x0) / (x1 - x0)),
            (Some((x0, r0)), None) if x0 == target => (r0, r0, 0.0),
            _ => (first.1, first.1, f64::NAN),
        };
        lower.push(row0);
        upper.push(row1);
        weights.push(weight);
    }

    let time_coord = Coord::Time(time.to_vec());
    let along_time = |rows: &[usize]| -> Result<LabeledArray> {
        array
            .select(dim, rows)?
            .rename_dim(dim, TIME_DIM)?
            .with_coord(TIME_DIM, time_coord.clone())
    };
    let lower = along_time(&lower)?;
    let upper = along_time(&upper)?;
    let weights = LabeledArray::time_series(time.to_vec(), weights)?;
    let step = upper
        .sub_array(&lower)?
        .zip_with(&weights, |delta, w| if w == 0.0 { 0.0 } else { delta * w })?;
    let mut out = lower.add_array(&step)?;
    *out.attrs_mut() = array.attrs().clone();
    Ok(out)
}

fn numeric_keys(coord: &Coord) -> Option<Vec<f64>> {
    match coord {
        Coord::Int(keys) => Some(keys.iter().map(|&k| k as f64).collect()),
        Coord::Float(keys) => Some(keys.clone()),
        _ => None,
    }
}

/// Span of one cycle in key units, for periods that wrap around the year.
fn cycle_length(period: Period, keys: &[f64]) -> Option<f64> {
    match period {
        Period::Month => Some(12.0),
        Period::Week => Some(keys.iter().copied().fold(52.0, f64::max)),
        Period::Season => Some(4.0),
        Period::DayOfYear => None,
    }
}

fn key_row(coord: &Coord, period: Period, key: i64) -> Result<usize> {
    let row = match coord {
        Coord::Int(keys) => keys.iter().position(|&k| k == key),
        Coord::Float(keys) => keys.iter().position(|&k| k == key as f64),
        Coord::Label(labels) if period == Period::Season => labels
            .iter()
            .position(|label| SEASON_LABELS.get(key as usize) == Some(&label.as_str())),
        _ => None,
    };
    row.ok_or_else(|| GroupError::incompatible(format!("no '{period}' entry for key {key}")))
}

fn key_coord(period: Period, keys: &[i64]) -> Coord {
    match period {
        Period::Season => Coord::Label(
            keys.iter()
                .map(|&k| SEASON_LABELS[k as usize].to_string())
                .collect(),
        ),
        _ => Coord::Int(keys.to_vec()),
    }
}

impl Grouped {
    fn new(
        data: Data,
        period: Option<Period>,
        time: Vec<NaiveDate>,
        time_chunks: Option<Vec<usize>>,
    ) -> Self {
        let (keys, members) = match period {
            None => (Vec::new(), vec![(0..time.len()).collect()]),
            Some(period) => {
                let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
                for (i, &date) in time.iter().enumerate() {
                    groups.entry(period.key(date)).or_default().push(i);
                }
                groups.into_iter().unzip()
            }
        };
        Self {
            data,
            period,
            keys,
            members,
            time,
            time_chunks,
        }
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    /// Sorted period keys; empty for whole-series grouping.
    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of time steps in each group.
    pub fn sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// Time positions belonging to group `i`.
    pub fn members(&self, i: usize) -> Option<&[usize]> {
        self.members.get(i).map(Vec::as_slice)
    }

    /// The windowed, ungrouped data.
    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    /// Data of group `i`.
    pub fn get(&self, i: usize) -> Result<Data> {
        let members = self.members(i).ok_or_else(|| {
            GroupError::incompatible(format!("group {i} out of {}", self.len()))
        })?;
        self.data
            .map_arrays(|array| array.select(TIME_DIM, members))
    }

    /// Groups with their keys (`None` for whole-series grouping).
    pub fn iter(&self) -> impl Iterator<Item = Result<(Option<i64>, Data)>> + '_ {
        (0..self.len()).map(move |i| Ok((self.keys.get(i).copied(), self.get(i)?)))
    }

    /// Call `func` on every group and recombine the results.
    pub fn map<F>(&self, func: F, dims: &[String]) -> Result<Data>
    where
        F: Fn(&Data, &[String]) -> Result<Data>,
    {
        let outputs = (0..self.len())
            .map(|i| func(&self.get(i)?, dims))
            .collect::<Result<Vec<_>>>()?;
        self.combine(outputs)
    }

    /// Reduce every group over `dims` (those an array lacks are skipped).
    pub fn reduce<S: AsRef<str>>(&self, agg: Aggregation, dims: &[S]) -> Result<Data> {
        agg.validate()?;
        let dims: Vec<String> = dims.iter().map(|d| d.as_ref().to_string()).collect();
        self.map(
            |group, dims| {
                group.map_arrays(|array| {
                    let present: Vec<&String> =
                        dims.iter().filter(|d| array.has_dim(d)).collect();
                    array.reduce(&present, agg)
                })
            },
            &dims,
        )
    }

    pub fn count(&self) -> Result<Data> {
        self.reduce(Aggregation::Count, &[TIME_DIM])
    }

    pub fn mean(&self) -> Result<Data> {
        self.reduce(Aggregation::Mean, &[TIME_DIM])
    }

    pub fn sum(&self) -> Result<Data> {
        self.reduce(Aggregation::Sum, &[TIME_DIM])
    }

    pub fn min(&self) -> Result<Data> {
        self.reduce(Aggregation::Min, &[TIME_DIM])
    }

    pub fn max(&self) -> Result<Data> {
        self.reduce(Aggregation::Max, &[TIME_DIM])
    }

    fn combine(&self, outputs: Vec<Data>) -> Result<Data> {
        if outputs.is_empty() {
            return Err(GroupError::incompatible("no groups to combine"));
        }
        if outputs.iter().all(|out| matches!(out, Data::Array(_))) {
            let parts = outputs
                .into_iter()
                .map(Data::into_array)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Data::Array(self.combine_var(parts)?));
        }
        let datasets = outputs
            .into_iter()
            .map(Data::into_dataset)
            .collect::<Result<Vec<_>>>()?;
        let first = &datasets[0];
        if let Some(other) = datasets
            .iter()
            .find(|ds| {
                ds.len() != first.len() || ds.names().any(|name| first.get(name).is_none())
            })
        {
            return Err(GroupError::incompatible(format!(
                "groups returned different variables: {:?} and {:?}",
                first.names().collect::<Vec<_>>(),
                other.names().collect::<Vec<_>>()
            )));
        }
        let mut out = Dataset::new();
        for name in first.names() {
            let parts = datasets
                .iter()
                .map(|ds| {
                    ds.get(name).cloned().ok_or_else(|| {
                        GroupError::incompatible(format!("variable '{name}' missing from a group"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            out.insert(name, self.combine_var(parts)?);
        }
        *out.attrs_mut() = first.attrs().clone();
        Ok(Data::Dataset(out))
    }

    /// Reshape the per-group results of one variable.
    ///
    /// A result still carrying `time` goes back to its original positions; a
    /// result without it was reduced and is stacked along the period
    /// dimension. The reshape marker forces the stacked form, keeping the
    /// first step of each group.
    fn combine_var(&self, parts: Vec<LabeledArray>) -> Result<LabeledArray> {
        let marked = parts
            .iter()
            .any(|part| part.attrs().contains_key(RESHAPE_ATTR));
        let parts = if marked {
            parts
                .into_iter()
                .map(|part| {
                    let part = part.without_attr(RESHAPE_ATTR);
                    if part.has_dim(TIME_DIM) {
                        part.isel(TIME_DIM, 0)
                    } else {
                        Ok(part)
                    }
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            parts
        };
        match parts.first() {
            Some(first) if first.has_dim(TIME_DIM) => self.scatter(&parts),
            Some(_) => self.stack(parts),
            None => Err(GroupError::incompatible("no groups to combine")),
        }
    }

    fn stack(&self, parts: Vec<LabeledArray>) -> Result<LabeledArray> {
        match self.period {
            Some(period) => LabeledArray::stack(
                &parts,
                period.name(),
                Some(key_coord(period, &self.keys)),
            ),
            None => parts
                .into_iter()
                .next()
                .ok_or_else(|| GroupError::incompatible("no groups to combine")),
        }
    }

    fn scatter(&self, parts: &[LabeledArray]) -> Result<LabeledArray> {
        let first = &parts[0];
        let axis = first.axis(TIME_DIM)?;
        let mut shape = first.shape().to_vec();
        shape[axis] = self.time.len();
        let mut data = ArrayD::from_elem(IxDyn(&shape), f64::NAN);

        for (part, members) in parts.iter().zip(&self.members) {
            let part = part.transpose(first.dims())?;
            let mut expected = shape.clone();
            expected[axis] = members.len();
            if part.shape() != expected.as_slice() {
                return Err(GroupError::incompatible(format!(
                    "group result has shape {:?}, expected {:?}",
                    part.shape(),
                    expected
                )));
            }
            for (k, &pos) in members.iter().enumerate() {
                data.index_axis_mut(Axis(axis), pos)
                    .assign(&part.data().index_axis(Axis(axis), k));
            }
        }

        let mut coords = first.coords().clone();
        coords.insert(TIME_DIM.to_string(), Coord::Time(self.time.clone()));
        let chunks = first.chunks().cloned().map(|mut chunks| {
            chunks[axis] = self
                .time_chunks
                .clone()
                .unwrap_or_else(|| vec![self.time.len()]);
            chunks
        });
        Ok(LabeledArray::from_parts(
            first.name().map(String::from),
            first.dims().to_vec(),
            data,
            coords,
            first.attrs().clone(),
            chunks,
        ))
    }
}
