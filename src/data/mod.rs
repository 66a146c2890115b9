//! Tabular input and output around the grouping library.

pub mod export;
pub mod series;
