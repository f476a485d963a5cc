//! Decoded Position Viewer - heatmap of decoded position probabilities
//!
//! Loads a decoded linear position data file, builds the heatmap pipeline
//! and runs the iced application.
//!
//! ## Command line
//!
//! `posdecode-viewer <data-file> [--config <path>]`
//!
//! Without `--config` the settings come from `~/.config/posdecode/config.yaml`
//! (defaults when missing).

mod app;
mod args;

use std::cell::RefCell;

use clap::Parser;
use iced::{Size, Task};
use posdecode_core::config::{default_config_path, load_config, PlotConfig};
use posdecode_core::{load_data, DecodedPositionPlot};

use app::{Message, ViewerApp};
use args::Args;

fn main() -> iced::Result {
    // Set RUST_LOG=debug for cache and scale level details
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path("config.yaml"));
    let config: PlotConfig = load_config(&config_path);

    let plot = match load_data(&args.data_file)
        .and_then(|data| DecodedPositionPlot::new(data, &config))
    {
        Ok(plot) => plot,
        Err(e) => {
            log::error!("Cannot open {:?}: {}", args.data_file, e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "posdecode-viewer starting with {:?} ({:.2}s - {:.2}s)",
        args.data_file,
        plot.data().start_time_sec(),
        plot.data().end_time_sec()
    );

    let title = format!("Decoded Position Viewer - {}", args.data_file.display());

    // The boot closure must be Fn even though iced calls it once
    let plot_cell = RefCell::new(Some(plot));

    iced::application(
        move || {
            let plot = plot_cell.borrow_mut().take().expect("plot already taken");
            (ViewerApp::new(plot, &config.playback), Task::none())
        },
        update,
        view,
    )
    .subscription(subscription)
    .theme(theme)
    .title(move |_: &ViewerApp| title.clone())
    .window_size(Size::new(1200.0, 800.0))
    .run()
}

/// Update function for iced
fn update(app: &mut ViewerApp, message: Message) -> Task<Message> {
    app.update(message)
}

/// View function for iced
fn view(app: &ViewerApp) -> iced::Element<'_, Message> {
    app.view()
}

/// Subscription function for iced
fn subscription(app: &ViewerApp) -> iced::Subscription<Message> {
    app.subscription()
}

/// Theme function for iced
fn theme(app: &ViewerApp) -> iced::Theme {
    app.theme()
}
