//! Entry point wiring CLI dispatch to the grouping library.

use anyhow::Result;
use climgroup::{cli::Cli, config::Settings, logging};
use tracing::info;

fn main() -> Result<()> {
    let settings = Settings::load();
    logging::init_tracing(&settings.log_level)?;
    let cli = Cli::parse();

    info!(?cli, "starting command");
    cli.dispatch(&settings)
}
