//! CLI entry-point printing where each step falls within its group.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{debug, instrument};

use super::{OutputArgs, SeriesArgs};
use crate::{config::Settings, grouping::Grouper};

/// Args for the `index` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub series: SeriesArgs,
    /// Scale positions to fractions of the period.
    #[arg(long)]
    pub interp: bool,
    /// Print the group coordinate (e.g. month number) instead of the
    /// position within the group.
    #[arg(long)]
    pub coordinate: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let array = args.series.load(settings)?;
    let grouper = Grouper::from_group(args.series.group_or_default(settings))?
        .with_interp(args.interp);
    let index = if args.coordinate {
        grouper.group_coordinate(&array)?
    } else {
        grouper.get_index(&array)?
    };
    debug!(%grouper, steps = index.len(), "computed index");
    args.output.write_array(&index, settings)
}
