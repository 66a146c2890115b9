//! CLI entry-point running a named aggregation per calendar group.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::{OutputArgs, SeriesArgs};
use crate::{array::Aggregation, config::Settings, grouping::Grouper};

/// Args for the `apply` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub series: SeriesArgs,
    /// Aggregation: mean, sum, min, max, median, std, var, count, first,
    /// last or quantile.
    #[arg(long, default_value = "mean")]
    pub agg: String,
    /// Quantile level in [0, 1], required with `--agg quantile`.
    #[arg(long)]
    pub q: Option<f64>,
    /// Centered rolling window length.
    #[arg(long, default_value_t = 1)]
    pub window: usize,
    /// Extra dimensions folded into the reduction (comma separated).
    #[arg(long = "add-dim", value_delimiter = ',')]
    pub add_dims: Vec<String>,
    /// Reduce over time (and window) only, keeping the extra dimensions.
    #[arg(long)]
    pub main_only: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl Args {
    fn aggregation(&self) -> Result<Aggregation> {
        if self.agg == "quantile" {
            let q = self.q.context("--agg quantile needs --q")?;
            return Ok(Aggregation::quantile(q)?);
        }
        Ok(self.agg.parse()?)
    }
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let agg = args.aggregation()?;
    let array = args.series.load(settings)?;
    let grouper = Grouper::new(
        args.series.group_or_default(settings),
        args.window,
        false,
        args.add_dims.clone(),
    )?;
    let out = grouper.apply(agg, &array, args.main_only)?.into_array()?;
    info!(%grouper, %agg, shape = ?out.shape(), "applied grouped reduction");
    args.output.write_array(&out, settings)
}
