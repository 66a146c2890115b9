//! Centered rolling-window construction.

use ndarray::{ArrayD, Axis, IxDyn};

use super::LabeledArray;
use crate::error::{GroupError, Result};

impl LabeledArray {
    /// Expand `dim` into a trailing `window_dim` of length `window`.
    ///
    /// Position `w` along the window holds the value at offset
    /// `w - window / 2` from each step, so even windows lean towards the
    /// past. Samples falling outside the series are `NaN`.
    pub fn rolling_window(&self, dim: &str, window: usize, window_dim: &str) -> Result<Self> {
        if window == 0 {
            return Err(GroupError::config("window must be at least 1"));
        }
        if self.has_dim(window_dim) {
            return Err(GroupError::incompatible(format!(
                "dimension '{window_dim}' already exists"
            )));
        }
        let axis = self.axis(dim)?;
        let n = self.data.len_of(Axis(axis));
        let mut shape = self.shape().to_vec();
        shape.push(window);
        let last = shape.len() - 1;
        let half = (window / 2) as isize;

        let mut data = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
        for w in 0..window {
            let mut slab = data.index_axis_mut(Axis(last), w);
            for t in 0..n {
                let src = t as isize + w as isize - half;
                if src < 0 || src >= n as isize {
                    continue;
                }
                slab.index_axis_mut(Axis(axis), t)
                    .assign(&self.data.index_axis(Axis(axis), src as usize));
            }
        }

        let mut dims = self.dims.clone();
        dims.push(window_dim.to_string());
        let chunks = self.chunks.clone().map(|mut chunks| {
            chunks.push(vec![window]);
            chunks
        });
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            self.coords.clone(),
            self.attrs.clone(),
            chunks,
        ))
    }
}
