//! `ViewerApp`: the top-level egui application state.
//!
//! Methods are split across the sibling sub-modules:
//!
//! - `navigation`: background page loading and binding
//! - `toolbar`: location bar and status
//! - `content`: page rendering, input forwarding and the page clock

pub mod content;
pub mod navigation;
pub mod toolbar;

use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use mountmagic::components::contact::Clipboard;
use mountmagic::components::media::SimulatedPlayback;
use mountmagic::config::SiteConfig;
use mountmagic::dom::NodeId;
use mountmagic::error::{ClipboardError, SiteError};
use mountmagic::net::fetch::LoadedPage;
use mountmagic::net::image::ImageLoader;
use mountmagic::page::{Page, PageEvent};

use content::FrameGeometry;

/// Clipboard writes queued for egui's platform output at the end of the
/// frame.
#[derive(Debug, Default)]
pub struct FrameClipboard {
    pub pending: Option<String>,
}

impl Clipboard for FrameClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError("nothing to copy".into()));
        }
        self.pending = Some(text.to_string());
        Ok(())
    }
}

pub struct ViewerApp {
    pub location: String,
    pub config: SiteConfig,
    pub page: Option<Page>,
    pub error: Option<String>,
    pub loading: bool,
    pub fetch_rx: Option<mpsc::Receiver<Result<LoadedPage, SiteError>>>,
    // Images
    pub image_loader: Option<ImageLoader>,
    pub image_textures: HashMap<String, egui::TextureHandle>,
    // Host collaborators
    pub geometry: FrameGeometry,
    pub playback: SimulatedPlayback,
    pub clipboard: FrameClipboard,
    // Frame-to-frame input state
    pub queued: Vec<PageEvent>,
    pub needs_load_event: bool,
    pub hovered: Option<NodeId>,
    pub scroll_request: Option<f32>,
    pub notices: Vec<String>,
    pub page_start: Instant,
    pub last_frame: Instant,
    pub dark_mode: bool,
}

impl ViewerApp {
    pub fn new(location: String, config: SiteConfig) -> Self {
        Self {
            location,
            config,
            page: None,
            error: None,
            loading: false,
            fetch_rx: None,
            image_loader: None,
            image_textures: HashMap::new(),
            geometry: FrameGeometry::default(),
            playback: SimulatedPlayback::new(),
            clipboard: FrameClipboard::default(),
            queued: Vec::new(),
            needs_load_event: false,
            hovered: None,
            scroll_request: None,
            notices: Vec::new(),
            page_start: Instant::now(),
            last_frame: Instant::now(),
            dark_mode: false,
        }
    }

    /// Milliseconds on the page clock.
    pub fn page_now_ms(&self) -> u64 {
        self.page_start.elapsed().as_millis() as u64
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_fetch();

        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        self.poll_images(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_content(ui, ctx);
        });

        self.draw_overlays(ctx);
        self.run_page(ctx);

        // keep the page clock moving without input
        ctx.request_repaint_after(std::time::Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clipboard_queues_text() {
        let mut clipboard = FrameClipboard::default();
        clipboard.write_text("+91 98765 43210").unwrap();
        assert_eq!(clipboard.pending.as_deref(), Some("+91 98765 43210"));
        assert!(clipboard.write_text("").is_err());
    }
}
