mod app;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use mountmagic::config::{SiteConfig, COPY_FEEDBACK_MS, SCROLL_DEBOUNCE_MS, SLIDE_INTERVAL_MS};

use crate::app::ViewerApp;

/// Desktop viewer for the MountMagic site.
#[derive(Debug, Parser)]
#[command(name = "mountmagic", version, about)]
struct Args {
    /// Page to open: a file path or an http(s) URL.
    #[arg(default_value = "site/index.html")]
    page: String,

    /// Hero carousel auto-advance period.
    #[arg(long, default_value_t = SLIDE_INTERVAL_MS)]
    slide_interval_ms: u64,

    /// Quiet period before off-screen videos are paused.
    #[arg(long, default_value_t = SCROLL_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// How long the copy button shows its confirmation.
    #[arg(long, default_value_t = COPY_FEEDBACK_MS)]
    copy_feedback_ms: u64,

    /// Load `data-src` images only when they scroll into view.
    #[arg(long)]
    lazy_images: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SiteConfig::default()
        .with_slide_interval(args.slide_interval_ms)
        .with_scroll_debounce(args.debounce_ms)
        .with_copy_feedback(args.copy_feedback_ms)
        .with_lazy_images(args.lazy_images);
    config.validate().context("invalid viewer options")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("MountMagic"),
        ..Default::default()
    };

    let location = args.page;
    eframe::run_native(
        "MountMagic",
        options,
        Box::new(move |cc| {
            let mut app = ViewerApp::new(location, config);
            app.navigate(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer stopped: {e}"))?;
    Ok(())
}
