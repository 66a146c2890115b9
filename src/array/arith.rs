//! Element-wise arithmetic between arrays, broadcast by dimension name.

use ndarray::{ArrayD, IxDyn, Zip};

use super::{Attrs, LabeledArray};
use crate::error::{GroupError, Result};

impl LabeledArray {
    /// Combine two arrays element-wise. The result has this array's
    /// dimensions followed by any dimensions only `other` has. Shared
    /// dimensions must agree in length and coordinates.
    pub fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        let mut dims = self.dims.clone();
        dims.extend(other.dims.iter().filter(|d| !self.has_dim(d)).cloned());

        let mut shape = Vec::with_capacity(dims.len());
        for dim in &dims {
            if let (Some(a), Some(b)) = (self.len_of(dim), other.len_of(dim)) {
                if a != b {
                    return Err(GroupError::incompatible(format!(
                        "dimension '{dim}' has length {a} and {b}"
                    )));
                }
            }
            shape.push(self.len_of(dim).or_else(|| other.len_of(dim)).unwrap_or(1));
        }
        for (dim, coord) in &self.coords {
            if matches!(other.coords.get(dim), Some(theirs) if theirs != coord) {
                return Err(GroupError::incompatible(format!(
                    "coordinates along '{dim}' do not match"
                )));
            }
        }

        let lhs = self.aligned_to(&dims)?;
        let rhs = other.aligned_to(&dims)?;
        let broadcast_err =
            || GroupError::incompatible(format!("cannot broadcast to shape {shape:?}"));
        let lhs = lhs.broadcast(IxDyn(&shape)).ok_or_else(broadcast_err)?;
        let rhs = rhs.broadcast(IxDyn(&shape)).ok_or_else(broadcast_err)?;
        let data = Zip::from(lhs).and(rhs).map_collect(|&a, &b| op(a, b));

        let mut coords = self.coords.clone();
        for (dim, coord) in &other.coords {
            if !coords.contains_key(dim) {
                coords.insert(dim.clone(), coord.clone());
            }
        }
        let chunks = (self.is_chunked() || other.is_chunked()).then(|| {
            dims.iter()
                .zip(&shape)
                .map(|(dim, &len)| {
                    chunk_of(self, dim)
                        .or_else(|| chunk_of(other, dim))
                        .unwrap_or_else(|| vec![len])
                })
                .collect()
        });
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            coords,
            Attrs::new(),
            chunks,
        ))
    }

    pub fn add_array(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub_array(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn mul_array(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn div_array(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Data permuted into `dims` order with unit axes for absent dimensions.
    fn aligned_to(&self, dims: &[String]) -> Result<ArrayD<f64>> {
        let order: Vec<usize> = dims.iter().filter_map(|d| self.axis_of(d)).collect();
        let shape: Vec<usize> = dims.iter().map(|d| self.len_of(d).unwrap_or(1)).collect();
        Ok(self
            .data
            .view()
            .permuted_axes(IxDyn(&order))
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(&shape))?)
    }
}

fn chunk_of(array: &LabeledArray, dim: &str) -> Option<Vec<usize>> {
    let axis = array.axis_of(dim)?;
    array.chunks().map(|chunks| chunks[axis].clone())
}
