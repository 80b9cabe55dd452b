mod app;
mod cli;
mod data;
mod error;
mod metrics;
mod state;
mod ui;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use app::PodiumApp;
use cli::Cli;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let criteria = cli.filter_criteria()?;

    if cli.headless {
        return cli::run_headless(&cli, &criteria);
    }

    let mut state = AppState::with_criteria(criteria);
    if cli.data_dir.is_dir() {
        state.load_dir(&cli.data_dir);
    } else {
        log::info!("{} not found, waiting for a folder", cli.data_dir.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Podium – Olympic Results",
        options,
        Box::new(|_cc| Ok(Box::new(PodiumApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
