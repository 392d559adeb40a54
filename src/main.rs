mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use wallet_flow::config::{AppConfig, load_config};
use wallet_flow::controller::{Command, Controller};
use wallet_flow::io::{BatchSource, apply_batch, snapshot_json};
use wallet_flow::layout::LayoutKind;
use wallet_flow::logging::setup_tracing;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Wallet batch JSON to load on startup.
    input: Option<PathBuf>,
    /// Load the bundled sample batch instead of an input file.
    #[arg(long, conflicts_with = "input")]
    sample: bool,
    /// TOML file overriding layout and placement settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for node placement jitter.
    #[arg(long)]
    seed: Option<u64>,
    /// Layout to run once the batch is loaded.
    #[arg(long, value_enum)]
    layout: Option<LayoutKind>,
    /// Print the laid-out graph as JSON instead of opening the viewer.
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn source(&self) -> BatchSource {
        match (&self.input, self.sample) {
            (Some(path), _) => BatchSource::File(path.clone()),
            (None, true) => BatchSource::Sample,
            (None, false) => BatchSource::Empty,
        }
    }
}

fn run_headless(config: AppConfig, args: &Args) -> Result<()> {
    let source = args.source();
    let batch = source.load()?;
    let mut controller = Controller::new(config, args.seed);
    let report = apply_batch(&mut controller, batch);
    info!(source = %source.describe(), rejected = report.rejected.len(), "batch loaded");

    if let Some(kind) = args.layout {
        controller
            .apply(Command::Layout(kind))
            .with_context(|| format!("{} layout failed", kind.label()))?;
    }

    println!("{}", snapshot_json(&controller.snapshot())?);
    Ok(())
}

fn main() -> Result<()> {
    setup_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if args.headless {
        return run_headless(config, &args);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let settings = app::LoadSettings {
        source: args.source(),
        config,
        seed: args.seed,
        initial_layout: args.layout,
    };

    eframe::run_native(
        "wallet-flow",
        options,
        Box::new(move |cc| Ok(Box::new(app::WalletFlowApp::new(cc, settings)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
