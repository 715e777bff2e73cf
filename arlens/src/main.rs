//! ArLens: point a camera at something and get it identified.
//!
//! Frames are sampled on a fixed cadence (or on demand), sent to a multimodal
//! model, and the answer is drawn over the live video.

mod capture;
mod config;
mod history;
mod i18n;
mod lens;
mod overlay;
mod scan;
mod state;
mod ui;

pub use config::{config, config_read};

fn main() -> eframe::Result {
    // Structured logging. Use `RUST_LOG=debug` etc.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let locale = config_read().locale.clone();
    i18n::init(locale.as_deref());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ArLens")
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native("ArLens", options, Box::new(|cc| Ok(Box::new(ui::ArLens::new(cc)))))
}
