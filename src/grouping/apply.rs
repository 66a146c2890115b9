//! Grouped application of reductions and caller-supplied functions.

use std::fmt;

use tracing::{debug, instrument};

use super::{Grouper, TIME_DIM, WINDOW_DIM};
use crate::{
    array::{Aggregation, AttrValue, Data},
    error::{GroupError, Result},
};

/// Attribute a function sets on an output to request reshaping along the
/// period dimension, whatever its remaining dimensions.
pub const RESHAPE_ATTR: &str = "_group_apply_reshape";

type GroupFn<'f> = dyn Fn(&Data, &[String]) -> Result<Data> + 'f;

/// What [`Grouper::apply`] runs on every group.
///
/// Custom functions receive the group's data and the dimensions to reduce;
/// any extra arguments are whatever the closure captures.
pub enum Reduction<'f> {
    Named(Aggregation),
    Custom(&'f GroupFn<'f>),
}

impl Reduction<'_> {
    /// Built-in reduction by name, e.g. `"mean"`.
    pub fn named(name: &str) -> Result<Self> {
        Ok(Self::Named(name.parse()?))
    }
}

impl fmt::Debug for Reduction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(agg) => write!(f, "Named({agg})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Aggregation> for Reduction<'_> {
    fn from(agg: Aggregation) -> Self {
        Self::Named(agg)
    }
}

impl<'f, F> From<&'f F> for Reduction<'f>
where
    F: Fn(&Data, &[String]) -> Result<Data> + 'f,
{
    fn from(func: &'f F) -> Self {
        Self::Custom(func)
    }
}

impl Grouper {
    /// Dimensions a reduction acts over: `time`, the additional dimensions
    /// unless `main_only`, then `window` when windowed.
    pub fn compute_dims(&self, main_only: bool) -> Vec<String> {
        let mut dims = vec![TIME_DIM.to_string()];
        if !main_only {
            dims.extend(self.add_dims.iter().cloned());
        }
        if self.window > 1 {
            dims.push(WINDOW_DIM.to_string());
        }
        dims
    }

    /// Window, group, reduce and reshape `input`.
    ///
    /// Results that lost `time` gain the period dimension (or none when the
    /// grouper is whole-series); results that kept it come back in the
    /// input's time order. Any remaining window is cut to its center. The
    /// output is stamped with `group`, `group_compute_dims` and `group_window`.
    #[instrument(level = "debug", skip_all, fields(group = %self.name(), window = self.window))]
    pub fn apply<'f>(
        &self,
        func: impl Into<Reduction<'f>>,
        input: impl Into<Data>,
        main_only: bool,
    ) -> Result<Data> {
        let func = func.into();
        let input = input.into();
        let dims = self.compute_dims(main_only);
        if !main_only {
            self.check_add_dims(&input)?;
        }
        debug!(?func, ?dims, "applying grouped reduction");

        let grouped = self.group(input)?;
        let out = match func {
            Reduction::Named(agg) => grouped.reduce(agg, &dims)?,
            Reduction::Custom(func) => grouped.map(func, &dims)?,
        };

        let mut out = if self.window > 1 {
            let center = self.window / 2;
            out.map_arrays(|array| {
                if array.has_dim(WINDOW_DIM) {
                    array.isel(WINDOW_DIM, center)
                } else {
                    Ok(array.clone())
                }
            })?
        } else {
            out
        };
        out.set_attr("group", AttrValue::Text(self.name()));
        out.set_attr("group_compute_dims", AttrValue::List(dims));
        out.set_attr("group_window", AttrValue::Int(self.window as i64));
        Ok(out)
    }

    fn check_add_dims(&self, input: &Data) -> Result<()> {
        for array in input.arrays() {
            if !array.has_dim(TIME_DIM) {
                continue;
            }
            if let Some(dim) = self.add_dims.iter().find(|d| !array.has_dim(d)) {
                return Err(GroupError::incompatible(format!(
                    "additional dimension '{dim}' is absent from the input"
                )));
            }
        }
        Ok(())
    }
}
