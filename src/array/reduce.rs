//! Named NaN-skipping reductions over one or more dimensions.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use ndarray::{Axis, IxDyn};

use super::{Attrs, LabeledArray};
use crate::error::{GroupError, Result};

/// Built-in reductions. All of them ignore `NaN` except `First` and `Last`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Mean,
    Sum,
    Min,
    Max,
    Median,
    /// Population standard deviation.
    Std,
    /// Population variance.
    Var,
    Count,
    First,
    Last,
    /// Linearly interpolated quantile, `q` in `[0, 1]`.
    Quantile(f64),
}

impl Aggregation {
    pub fn quantile(q: f64) -> Result<Self> {
        let agg = Self::Quantile(q);
        agg.validate()?;
        Ok(agg)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
            Self::Std => "std",
            Self::Var => "var",
            Self::Count => "count",
            Self::First => "first",
            Self::Last => "last",
            Self::Quantile(_) => "quantile",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Quantile(q) if !(0.0..=1.0).contains(q) => Err(GroupError::Unsupported(
                format!("quantile {q} outside [0, 1]"),
            )),
            _ => Ok(()),
        }
    }

    /// Reduce a sequence of values to one.
    pub fn apply<I: IntoIterator<Item = f64>>(&self, values: I) -> f64 {
        let mut values = values.into_iter();
        match self {
            Self::First => values.next().unwrap_or(f64::NAN),
            Self::Last => values.last().unwrap_or(f64::NAN),
            _ => self.apply_valid(values.filter(|v| !v.is_nan()).collect()),
        }
    }

    fn apply_valid(&self, valid: Vec<f64>) -> f64 {
        let n = valid.len() as f64;
        match self {
            Self::Count => n,
            Self::Sum => valid.iter().sum(),
            _ if valid.is_empty() => f64::NAN,
            Self::Mean => valid.iter().sum::<f64>() / n,
            Self::Min => valid.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Var => variance(&valid),
            Self::Std => variance(&valid).sqrt(),
            Self::Median => quantile(valid, 0.5),
            Self::Quantile(q) => quantile(valid, *q),
            Self::First => valid[0],
            Self::Last => valid[valid.len() - 1],
        }
    }
}

fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

fn quantile(mut values: Vec<f64>, q: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantile(q) => write!(f, "quantile({q})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Aggregation {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "median" => Ok(Self::Median),
            "std" => Ok(Self::Std),
            "var" => Ok(Self::Var),
            "count" => Ok(Self::Count),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "quantile" => Err(GroupError::Unsupported(
                "quantile needs a level, use Aggregation::quantile".into(),
            )),
            other => Err(GroupError::Unsupported(format!(
                "unknown aggregation '{other}'"
            ))),
        }
    }
}

impl LabeledArray {
    /// Reduce over `dims`, dropping them. Attributes are not kept.
    pub fn reduce<S: AsRef<str>>(&self, dims: &[S], agg: Aggregation) -> Result<Self> {
        agg.validate()?;
        let reduced = self.axes_of(dims)?;
        let kept: Vec<usize> = (0..self.ndim()).filter(|a| !reduced.contains(a)).collect();

        let mut order = kept.clone();
        order.extend(reduced.iter().copied());
        let mut flat_shape: Vec<usize> = kept.iter().map(|&a| self.shape()[a]).collect();
        let lane_len: usize = reduced.iter().map(|&a| self.shape()[a]).product();
        flat_shape.push(lane_len);

        let flat = self
            .data
            .view()
            .permuted_axes(IxDyn(&order))
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(&flat_shape))?;
        let data = flat.map_axis(Axis(kept.len()), |lane| agg.apply(lane.iter().copied()));

        let dims = kept.iter().map(|&a| self.dims[a].clone()).collect();
        let reduced_names: Vec<&str> = reduced.iter().map(|&a| self.dims[a].as_str()).collect();
        let coords: IndexMap<_, _> = self
            .coords
            .iter()
            .filter(|(dim, _)| !reduced_names.contains(&dim.as_str()))
            .map(|(dim, coord)| (dim.clone(), coord.clone()))
            .collect();
        let chunks = self
            .chunks
            .as_ref()
            .map(|chunks| kept.iter().map(|&a| chunks[a].clone()).collect());
        Ok(Self::from_parts(
            self.name.clone(),
            dims,
            data,
            coords,
            Attrs::new(),
            chunks,
        ))
    }

    pub fn mean<S: AsRef<str>>(&self, dims: &[S]) -> Result<Self> {
        self.reduce(dims, Aggregation::Mean)
    }

    pub fn count<S: AsRef<str>>(&self, dims: &[S]) -> Result<Self> {
        self.reduce(dims, Aggregation::Count)
    }

    /// Reduce every element to a single value.
    pub fn aggregate(&self, agg: Aggregation) -> f64 {
        agg.apply(self.data.iter().copied())
    }
}
