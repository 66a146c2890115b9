//! Command-line interface wiring for climgroup.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::{
    array::LabeledArray,
    config::Settings,
    data::{export, series},
};

pub mod apply;
pub mod group;
pub mod index;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Calendar grouping and grouped reductions over daily series",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: &Settings) -> Result<()> {
        match self.command {
            Commands::Group(args) => group::run(args, settings),
            Commands::Index(args) => index::run(args, settings),
            Commands::Apply(args) => apply::run(args, settings),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the member count of every calendar group.
    Group(group::Args),
    /// Print the per-step index within each group.
    Index(index::Args),
    /// Run a named aggregation per group.
    Apply(apply::Args),
}

/// Input and grouping options shared by every sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct SeriesArgs {
    /// CSV file: a date column followed by value columns.
    #[arg(long)]
    pub input: PathBuf,
    /// Grouping such as `time`, `time.month`, `time.week`, `time.dayofyear`.
    #[arg(long)]
    pub group: Option<String>,
}

impl SeriesArgs {
    pub fn load(&self, settings: &Settings) -> Result<LabeledArray> {
        series::load_csv(&self.input, settings)
    }

    pub fn group_or_default<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.group.as_deref().unwrap_or(&settings.default_group)
    }
}

/// Output encodings.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Where results go: stdout or a file under the outputs directory.
#[derive(Debug, Clone, ClapArgs)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Write to this file instead of stdout (relative to the outputs dir).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    pub fn writer(&self, settings: &Settings) -> Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => {
                let path = settings.join_output(path);
                create_parent(&path)?;
                let file = File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                info!(path = %path.display(), "writing output");
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }

    pub fn write_array(&self, array: &LabeledArray, settings: &Settings) -> Result<()> {
        let mut writer = self.writer(settings)?;
        match self.format {
            OutputFormat::Json => {
                export::write_json(&mut writer, &export::ArrayDto::from(array))?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => export::write_array_csv(&mut writer, array)?,
        }
        writer.flush()?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}
