use anyhow::{Context, bail};
use clap::Parser;
use daq_confgen::apps::{self, AppGenerator, FakeHsiApp, HsiReadoutApp, TimingApp, TriggerApp};
use daq_confgen::{Result, config, logging, render};
use serde::{Serialize, de::DeserializeOwned};

mod cli;

use cli::{Cli, Commands, OutputArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level, cli.log_format).map_err(anyhow::Error::msg)?;

    match cli.cmd {
        Commands::Timing { out, params } => run::<TimingApp, _>(&out, &params),
        Commands::HsiReadout { out, params } => run::<HsiReadoutApp, _>(&out, &params),
        Commands::FakeHsi { out, params } => run::<FakeHsiApp, _>(&out, &params),
        Commands::Trigger { out, params } => run::<TriggerApp, _>(&out, &params),
    }
}

fn run<A, O>(out: &OutputArgs, overrides: &O) -> Result<()>
where
    A: AppGenerator + Default + Serialize + DeserializeOwned,
    O: Serialize,
{
    if !out.output_path.is_dir() {
        bail!("output path {} is not a directory", out.output_path.display());
    }

    // 1) Layer defaults, config file, environment and flags.
    let app: A = config::load(out.config.as_deref(), overrides)
        .context("failed to load application parameters")?;

    // 2) Build the topology and the command sequence.
    let docs = apps::generate(&app).with_context(|| format!("{} generation failed", app.name()))?;

    // 3) Render and write in one step; nothing is written on failure.
    let json = render::render_json(&docs)?;
    let path = out.target(app.name());
    render::write_atomic(&path, &json)?;
    println!("'{}' generation completed.", path.display());
    Ok(())
}
