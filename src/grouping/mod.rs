//! Calendar grouping of labeled arrays along time.
//!
//! A [`Grouper`] describes how to slice a series: by calendar period (or
//! not at all), optionally after expanding time into a centered rolling
//! window, and which extra dimensions a reduction should fold in. It is an
//! immutable value, so one instance can serve any number of `apply` calls,
//! from any number of threads.

mod apply;
mod grouped;
mod index;
mod params;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    calendar::Period,
    error::{GroupError, Result},
};

pub use apply::{Reduction, RESHAPE_ATTR};
pub use grouped::Grouped;
pub use params::ParamSet;

/// Name of the dimension every grouper slices.
pub const TIME_DIM: &str = "time";
/// Name of the dimension added by rolling-window construction.
pub const WINDOW_DIM: &str = "window";

/// Grouping specification: period, window, interpolation and extra dims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GrouperSpec", into = "GrouperSpec")]
pub struct Grouper {
    prop: Option<Period>,
    window: usize,
    interp: bool,
    add_dims: Vec<String>,
}

impl Grouper {
    /// Build a grouper from a group string such as `"time"` or `"time.month"`.
    pub fn new<I, S>(group: &str, window: usize, interp: bool, add_dims: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prop = parse_group(group)?;
        if window < 1 {
            return Err(GroupError::config(format!(
                "window must be at least 1, got {window}"
            )));
        }
        let add_dims: Vec<String> = add_dims.into_iter().map(Into::into).collect();
        for (i, dim) in add_dims.iter().enumerate() {
            if dim == TIME_DIM || dim == WINDOW_DIM {
                return Err(GroupError::config(format!(
                    "'{dim}' cannot be an additional dimension"
                )));
            }
            if add_dims[..i].contains(dim) {
                return Err(GroupError::config(format!(
                    "additional dimension '{dim}' listed twice"
                )));
            }
        }
        Ok(Self {
            prop,
            window,
            interp,
            add_dims,
        })
    }

    /// Grouper with no window, no interpolation and no extra dimensions.
    pub fn from_group(group: &str) -> Result<Self> {
        Self::new(group, 1, false, Vec::<String>::new())
    }

    pub fn with_window(self, window: usize) -> Result<Self> {
        Self::new(&self.name(), window, self.interp, self.add_dims)
    }

    pub fn with_interp(mut self, interp: bool) -> Self {
        self.interp = interp;
        self
    }

    pub fn with_add_dims<I, S>(self, add_dims: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(&self.name(), self.window, self.interp, add_dims)
    }

    /// Group string, e.g. `"time.month"`.
    pub fn name(&self) -> String {
        match self.prop {
            Some(period) => format!("{TIME_DIM}.{period}"),
            None => TIME_DIM.to_string(),
        }
    }

    /// Calendar sub-period, `None` for whole-series grouping.
    pub fn prop(&self) -> Option<Period> {
        self.prop
    }

    pub fn dim(&self) -> &'static str {
        TIME_DIM
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn interp(&self) -> bool {
        self.interp
    }

    pub fn add_dims(&self) -> &[String] {
        &self.add_dims
    }
}

fn parse_group(group: &str) -> Result<Option<Period>> {
    match group.split_once('.') {
        None if group == TIME_DIM => Ok(None),
        Some((TIME_DIM, prop)) => prop.parse().map(Some),
        _ => Err(GroupError::config(format!(
            "unsupported group '{group}', expected 'time' or 'time.<period>'"
        ))),
    }
}

impl fmt::Display for Grouper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grouper(group='{}', window={}, interp={}, add_dims={:?})",
            self.name(),
            self.window,
            self.interp,
            self.add_dims
        )
    }
}

impl FromStr for Grouper {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_group(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GrouperSpec {
    group: String,
    #[serde(default = "default_window")]
    window: usize,
    #[serde(default)]
    interp: bool,
    #[serde(default)]
    add_dims: Vec<String>,
}

fn default_window() -> usize {
    1
}

impl TryFrom<GrouperSpec> for Grouper {
    type Error = GroupError;

    fn try_from(spec: GrouperSpec) -> Result<Self> {
        Self::new(&spec.group, spec.window, spec.interp, spec.add_dims)
    }
}

impl From<Grouper> for GrouperSpec {
    fn from(grouper: Grouper) -> Self {
        Self {
            group: grouper.name(),
            window: grouper.window,
            interp: grouper.interp,
            add_dims: grouper.add_dims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_is_derived_from_group() {
        assert_eq!(Grouper::from_group("time").unwrap().prop(), None);
        assert_eq!(
            Grouper::from_group("time.dayofyear").unwrap().prop(),
            Some(Period::DayOfYear)
        );
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        for group in ["time.hour", "month", "lat.month", ""] {
            assert!(matches!(
                Grouper::from_group(group),
                Err(GroupError::Configuration(_))
            ));
        }
        assert!(matches!(
            Grouper::new("time", 0, false, Vec::<String>::new()),
            Err(GroupError::Configuration(_))
        ));
        assert!(Grouper::new("time", 1, false, ["lat", "lat"]).is_err());
    }

    #[test]
    fn display_lists_parameters() {
        let grouper = Grouper::new("time.month", 5, true, ["lat"]).unwrap();
        assert_eq!(
            grouper.to_string(),
            "Grouper(group='time.month', window=5, interp=true, add_dims=[\"lat\"])"
        );
    }

    #[test]
    fn json_fills_defaults_and_validates() {
        let grouper: Grouper = serde_json::from_str(r#"{"group": "time.week"}"#).unwrap();
        assert_eq!(grouper, Grouper::from_group("time.week").unwrap());

        let json = serde_json::to_value(&grouper).unwrap();
        assert_eq!(json["group"], "time.week");
        assert_eq!(json["window"], 1);

        assert!(serde_json::from_str::<Grouper>(r#"{"group": "time", "window": 0}"#).is_err());
    }
}
