//! Topper Guide - study notes browser and admin editor
//!
//! Browse chapter notes by board, class and subject. Admins manage the chapter
//! lists and edit chapter content, optionally drafted by a text-generation service.

mod app;
mod core;
mod ui;

use anyhow::Context;
use app::TopperGuideApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::AppConfig;
use crate::core::route::Route;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Topper Guide...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {:#}", e);
        AppConfig::default()
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start background runtime")?;

    // Optional start view, e.g. `/cbse/10/Physics/Optics`
    let initial_route = match std::env::args().nth(1) {
        Some(path) => Route::parse(&path).unwrap_or_else(|| {
            tracing::warn!("Unknown start path {:?}, opening home", path);
            Route::Home
        }),
        None => Route::Home,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Topper Guide"),
        ..Default::default()
    };

    eframe::run_native(
        "Topper Guide",
        native_options,
        Box::new(move |cc| Ok(Box::new(TopperGuideApp::new(cc, config, runtime, initial_route)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
