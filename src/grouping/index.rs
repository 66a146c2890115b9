//! Per-step positions of a series relative to its grouping periods.

use chrono::NaiveDate;

use super::{Grouper, TIME_DIM};
use crate::{
    array::LabeledArray,
    calendar::Period,
    error::{GroupError, Result},
};

impl Grouper {
    /// How far into its period each time step lies.
    ///
    /// Whole-series grouping yields the 0-based ordinal of each step. Grouped
    /// series yield the 0-based position within the calendar period, or that
    /// position divided by the period length (in `[0, 1)`) when `interp` is set.
    pub fn get_index(&self, array: &LabeledArray) -> Result<LabeledArray> {
        let time = time_coordinate(array)?;
        let values = match self.prop {
            None => ordinals(time.len()),
            Some(period) => time
                .iter()
                .map(|&date| {
                    let (pos, len) = period.position(date);
                    if self.interp {
                        f64::from(pos) / f64::from(len)
                    } else {
                        f64::from(pos)
                    }
                })
                .collect(),
        };
        index_array(time, values)
    }

    /// Group coordinate of each time step, used to look per-group values up
    /// again along time.
    ///
    /// Without `interp` this is the period key (month 1-12, ISO week, day of
    /// year, season code). With `interp` it becomes continuous across period
    /// boundaries: `key - 0.5 + (position + 1) / length`, e.g. 3.5 on March 31.
    /// Day-of-year keys are already continuous and are returned unchanged.
    pub fn group_coordinate(&self, array: &LabeledArray) -> Result<LabeledArray> {
        let time = time_coordinate(array)?;
        let values = match self.prop {
            None => ordinals(time.len()),
            Some(period) => time
                .iter()
                .map(|&date| coordinate(period, date, self.interp))
                .collect(),
        };
        index_array(time, values)
    }
}

pub(crate) fn coordinate(period: Period, date: NaiveDate, interp: bool) -> f64 {
    let key = period.key(date) as f64;
    if !interp || period == Period::DayOfYear {
        return key;
    }
    let (pos, len) = period.position(date);
    key - 0.5 + f64::from(pos + 1) / f64::from(len)
}

pub(crate) fn time_coordinate(array: &LabeledArray) -> Result<&[NaiveDate]> {
    if !array.has_dim(TIME_DIM) {
        return Err(GroupError::incompatible(format!(
            "array has no '{TIME_DIM}' dimension"
        )));
    }
    array.time().ok_or_else(|| {
        GroupError::incompatible(format!("'{TIME_DIM}' has no date coordinate"))
    })
}

fn ordinals(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn index_array(time: &[NaiveDate], values: Vec<f64>) -> Result<LabeledArray> {
    Ok(LabeledArray::time_series(time.to_vec(), values)?.with_name(format!("{TIME_DIM}_group")))
}
