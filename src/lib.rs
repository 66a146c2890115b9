//! climgroup: calendar grouping of labeled daily series.
//!
//! ```text
//! climgroup
//! ├── array      labeled N-d arrays, datasets, reductions, rolling windows
//! ├── calendar   month / week / day-of-year / season keys
//! ├── grouping   Grouper: get_index, group, apply
//! ├── error      GroupError
//! ├── config     runtime settings (.env + environment)
//! ├── logging    tracing subscriber bootstrap
//! ├── data       CSV loading and output DTOs
//! └── cli        `climgroup` sub-commands
//! ```

pub mod array;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod grouping;
pub mod logging;

pub use array::{Aggregation, AttrValue, Coord, Data, Dataset, LabeledArray};
pub use error::{GroupError, Result};
pub use grouping::{Grouped, Grouper, Reduction};
