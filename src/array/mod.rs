//! In-memory labeled N-dimensional arrays with named dimensions.
//!
//! A [`LabeledArray`] pairs an `ndarray::ArrayD<f64>` with dimension names,
//! optional per-dimension coordinates, free-form attributes and an optional
//! chunk layout. Missing values are `NaN`. Operations never mutate their
//! receiver; they derive new arrays.

mod arith;
mod dataset;
mod reduce;
mod rolling;

use chrono::NaiveDate;
use indexmap::IndexMap;
use ndarray::{ArrayD, Axis, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{GroupError, Result};

pub use dataset::{Data, Dataset};
pub use reduce::Aggregation;

/// Ordered attribute metadata.
pub type Attrs = IndexMap<String, AttrValue>;

/// Chunk sizes along each dimension, in dimension order.
pub type Chunks = Vec<Vec<usize>>;

/// Attribute value stored on arrays and datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Coordinate labels along one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Time(Vec<NaiveDate>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Label(Vec<String>),
}

impl Coord {
    pub fn len(&self) -> usize {
        match self {
            Self::Time(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Label(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinate restricted to the given positions.
    pub fn select(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }
        match self {
            Self::Time(v) => Self::Time(pick(v, indices)),
            Self::Int(v) => Self::Int(pick(v, indices)),
            Self::Float(v) => Self::Float(pick(v, indices)),
            Self::Label(v) => Self::Label(pick(v, indices)),
        }
    }

    /// Text rendering of the label at `index`.
    pub fn label(&self, index: usize) -> Option<String> {
        match self {
            Self::Time(v) => v.get(index).map(|d| d.to_string()),
            Self::Int(v) => v.get(index).map(|i| i.to_string()),
            Self::Float(v) => v.get(index).map(|f| f.to_string()),
            Self::Label(v) => v.get(index).cloned(),
        }
    }
}

/// N-dimensional `f64` array with named dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    name: Option<String>,
    dims: Vec<String>,
    data: ArrayD<f64>,
    coords: IndexMap<String, Coord>,
    attrs: Attrs,
    chunks: Option<Chunks>,
}

impl LabeledArray {
    /// Wrap `data` with one name per axis.
    pub fn new<I, S>(dims: I, data: ArrayD<f64>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(GroupError::incompatible(format!(
                "{} dimension names for an array of rank {}",
                dims.len(),
                data.ndim()
            )));
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(GroupError::incompatible(format!(
                    "duplicate dimension '{dim}'"
                )));
            }
        }
        Ok(Self {
            name: None,
            dims,
            data,
            coords: IndexMap::new(),
            attrs: Attrs::new(),
            chunks: None,
        })
    }

    /// One-dimensional daily series along `time`.
    pub fn time_series(time: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if time.len() != values.len() {
            return Err(GroupError::incompatible(format!(
                "{} time stamps for {} values",
                time.len(),
                values.len()
            )));
        }
        let data = ArrayD::from_shape_vec(IxDyn(&[values.len()]), values)?;
        Self::new(["time"], data)?.with_coord("time", Coord::Time(time))
    }

    pub(crate) fn from_parts(
        name: Option<String>,
        dims: Vec<String>,
        data: ArrayD<f64>,
        coords: IndexMap<String, Coord>,
        attrs: Attrs,
        chunks: Option<Chunks>,
    ) -> Self {
        debug_assert_eq!(dims.len(), data.ndim());
        Self {
            name,
            dims,
            data,
            coords,
            attrs,
            chunks,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn without_attr(mut self, key: &str) -> Self {
        self.attrs.shift_remove(key);
        self
    }

    /// Attach a coordinate to an existing dimension.
    pub fn with_coord(mut self, dim: &str, coord: Coord) -> Result<Self> {
        let len = self.len_of(dim).ok_or_else(|| GroupError::missing_dim(dim))?;
        if coord.len() != len {
            return Err(GroupError::incompatible(format!(
                "coordinate of length {} for dimension '{dim}' of length {len}",
                coord.len()
            )));
        }
        self.coords.insert(dim.to_string(), coord);
        Ok(self)
    }

    /// Declare a chunk layout. `None` means a single chunk along that
    /// dimension; dimensions left out keep their current layout.
    pub fn chunked(mut self, spec: &[(&str, Option<usize>)]) -> Result<Self> {
        let mut chunks = self
            .chunks
            .take()
            .unwrap_or_else(|| whole_chunks(self.data.shape()));
        for (dim, size) in spec {
            let axis = self.axis(dim)?;
            let len = self.data.len_of(Axis(axis));
            chunks[axis] = match size {
                Some(0) => {
                    return Err(GroupError::config(format!(
                        "chunk size along '{dim}' must be positive"
                    )))
                }
                Some(size) => split_chunks(len, *size),
                None => vec![len],
            };
        }
        self.chunks = Some(chunks);
        Ok(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    pub fn coords(&self) -> &IndexMap<String, Coord> {
        &self.coords
    }

    pub fn coord(&self, dim: &str) -> Option<&Coord> {
        self.coords.get(dim)
    }

    /// Time stamps of the `time` dimension, if it carries a time coordinate.
    pub fn time(&self) -> Option<&[NaiveDate]> {
        match self.coords.get("time") {
            Some(Coord::Time(values)) => Some(values),
            _ => None,
        }
    }

    pub fn chunks(&self) -> Option<&Chunks> {
        self.chunks.as_ref()
    }

    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn axis(&self, dim: &str) -> Result<usize> {
        self.axis_of(dim).ok_or_else(|| GroupError::missing_dim(dim))
    }

    /// Axes of `dims`, in the given order. Each name may appear once.
    pub(crate) fn axes_of<S: AsRef<str>>(&self, dims: &[S]) -> Result<Vec<usize>> {
        let mut axes = Vec::with_capacity(dims.len());
        for dim in dims {
            let axis = self.axis(dim.as_ref())?;
            if axes.contains(&axis) {
                return Err(GroupError::incompatible(format!(
                    "dimension '{}' listed twice",
                    dim.as_ref()
                )));
            }
            axes.push(axis);
        }
        Ok(axes)
    }

    pub fn len_of(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.data.len_of(Axis(axis)))
    }

    /// Element at a full index, in dimension order.
    pub fn at(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.ndim() {
            return None;
        }
        self.data.get(IxDyn(index)).copied()
    }

    /// Flattened values in logical (row-major) order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Element-wise transform, keeping labels.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = self.clone();
        out.data.mapv_inplace(f);
        out
    }

    /// Take the given positions along `dim`.
    pub fn select(&self, dim: &str, indices: &[usize]) -> Result<Self> {
        let axis = self.axis(dim)?;
        let len = self.data.len_of(Axis(axis));
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(GroupError::incompatible(format!(
                "index {bad} out of bounds for dimension '{dim}' of length {len}"
            )));
        }
        let data = self.data.select(Axis(axis), indices);
        let mut coords = self.coords.clone();
        if let Some(coord) = coords.get_mut(dim) {
            *coord = coord.select(indices);
        }
        let chunks = self.chunks.clone().map(|mut chunks| {
            chunks[axis] = vec![indices.len()];
            chunks
        });
        Ok(Self::from_parts(
            self.name.clone(),
            self.dims.clone(),
            data,
            coords,
            self.attrs.clone(),
            chunks,
        ))
    }

    /// Take a single position along `dim` and drop that dimension.
    pub fn isel(&self, dim: &str, index: usize) -> Result<Self> {
        let axis = self.axis(dim)?;
        let len = self.data.len_of(Axis(axis));
        if index >= len {
            return Err(GroupError::incompatible(format!(
                "index {index} out of bounds for dimension '{dim}' of length {len}"
            )));
        }
        let data = self.data.index_axis(Axis(axis), index).to_owned();
        let mut dims = self.dims.clone();
        dims.remove(axis);
        let mut coords = self.coords.clone();
        coords.shift_remove(dim);
        let chunks = self.chunks.clone().map(|mut chunks| {
            chunks.remove(axis);
            chunks
        });
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            coords,
            self.attrs.clone(),
            chunks,
        ))
    }

    /// Rename a dimension, carrying its coordinate along.
    pub fn rename_dim(&self, from: &str, to: &str) -> Result<Self> {
        let axis = self.axis(from)?;
        if from != to && self.has_dim(to) {
            return Err(GroupError::incompatible(format!(
                "dimension '{to}' already exists"
            )));
        }
        let mut out = self.clone();
        out.dims[axis] = to.to_string();
        if let Some(coord) = out.coords.shift_remove(from) {
            out.coords.insert(to.to_string(), coord);
        }
        Ok(out)
    }

    /// Prepend a new dimension of `coord.len()` copies of this array.
    pub fn expand_dim(&self, dim: &str, coord: Coord) -> Result<Self> {
        if self.has_dim(dim) {
            return Err(GroupError::incompatible(format!(
                "dimension '{dim}' already exists"
            )));
        }
        let len = coord.len();
        let mut shape = vec![len];
        shape.extend_from_slice(self.shape());
        let data = self
            .data
            .view()
            .insert_axis(Axis(0))
            .broadcast(IxDyn(&shape))
            .ok_or_else(|| GroupError::incompatible(format!("cannot expand along '{dim}'")))?
            .to_owned();
        let mut dims = vec![dim.to_string()];
        dims.extend(self.dims.iter().cloned());
        let mut coords = IndexMap::new();
        coords.insert(dim.to_string(), coord);
        coords.extend(self.coords.clone());
        let chunks = self.chunks.clone().map(|mut chunks| {
            chunks.insert(0, vec![len]);
            chunks
        });
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            coords,
            self.attrs.clone(),
            chunks,
        ))
    }

    /// Reorder axes to match `order`, which must name every dimension once.
    pub fn transpose<S: AsRef<str>>(&self, order: &[S]) -> Result<Self> {
        if order.len() != self.ndim() {
            return Err(GroupError::incompatible(format!(
                "transpose needs {} dimensions, got {}",
                self.ndim(),
                order.len()
            )));
        }
        let axes = self.axes_of(order)?;
        if axes.iter().enumerate().all(|(i, &a)| i == a) {
            return Ok(self.clone());
        }
        let data = self
            .data
            .view()
            .permuted_axes(IxDyn(&axes))
            .as_standard_layout()
            .into_owned();
        let dims = axes.iter().map(|&a| self.dims[a].clone()).collect();
        let chunks = self
            .chunks
            .as_ref()
            .map(|chunks| axes.iter().map(|&a| chunks[a].clone()).collect());
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            self.coords.clone(),
            self.attrs.clone(),
            chunks,
        ))
    }

    /// Stack arrays sharing the same dimensions along a new leading `dim`.
    pub fn stack(parts: &[LabeledArray], dim: &str, coord: Option<Coord>) -> Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| GroupError::incompatible(format!("nothing to stack along '{dim}'")))?;
        if first.has_dim(dim) {
            return Err(GroupError::incompatible(format!(
                "dimension '{dim}' already exists"
            )));
        }
        let aligned = parts
            .iter()
            .map(|part| part.transpose(first.dims()))
            .collect::<Result<Vec<_>>>()?;
        if let Some(bad) = aligned.iter().find(|part| part.shape() != first.shape()) {
            return Err(GroupError::incompatible(format!(
                "cannot stack shapes {:?} and {:?} along '{dim}'",
                first.shape(),
                bad.shape()
            )));
        }
        let views: Vec<_> = aligned.iter().map(|part| part.data.view()).collect();
        let data = ndarray::stack(Axis(0), &views)?;

        let mut dims = vec![dim.to_string()];
        dims.extend(first.dims.iter().cloned());
        let mut coords = IndexMap::new();
        if let Some(coord) = coord {
            if coord.len() != parts.len() {
                return Err(GroupError::incompatible(format!(
                    "{} labels for {} stacked parts",
                    coord.len(),
                    parts.len()
                )));
            }
            coords.insert(dim.to_string(), coord);
        }
        coords.extend(first.coords.clone());
        let chunks = aligned.iter().any(LabeledArray::is_chunked).then(|| {
            let mut chunks = vec![vec![parts.len()]];
            chunks.extend(
                first
                    .chunks
                    .clone()
                    .unwrap_or_else(|| whole_chunks(first.shape())),
            );
            chunks
        });
        Ok(Self::from_parts(
            first.name.clone(),
            dims,
            data,
            coords,
            first.attrs.clone(),
            chunks,
        ))
    }
}

fn whole_chunks(shape: &[usize]) -> Chunks {
    shape.iter().map(|&len| vec![len]).collect()
}

fn split_chunks(len: usize, size: usize) -> Vec<usize> {
    if len == 0 {
        return vec![0];
    }
    let mut chunks = vec![size; len / size];
    if len % size != 0 {
        chunks.push(len % size);
    }
    chunks
}
