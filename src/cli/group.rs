//! CLI entry-point listing the members of each calendar group.

use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::{OutputArgs, OutputFormat, SeriesArgs};
use crate::{config::Settings, data::export, grouping::Grouper};

/// Args for the `group` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub series: SeriesArgs,
    /// Centered rolling window length.
    #[arg(long, default_value_t = 1)]
    pub window: usize,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let array = args.series.load(settings)?;
    let grouper = Grouper::new(
        args.series.group_or_default(settings),
        args.window,
        false,
        Vec::<String>::new(),
    )?;
    let grouped = grouper.group(&array)?;
    info!(%grouper, groups = grouped.len(), "grouped series");

    let rows = export::group_sizes(&grouped);
    let mut writer = args.output.writer(settings)?;
    match args.output.format {
        OutputFormat::Json => {
            export::write_json(&mut writer, &rows)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => export::write_rows_csv(&mut writer, &rows)?,
    }
    writer.flush()?;
    Ok(())
}
