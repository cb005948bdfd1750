//! Page loading for `ViewerApp`.
//!
//! Markup is loaded on a worker thread (`net::fetch::load_page`) and bound
//! on the UI thread once it arrives; image assets then stream in through
//! the `ImageLoader`.

use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use mountmagic::components::media::SimulatedPlayback;
use mountmagic::dom::parser::parse_html;
use mountmagic::net::fetch::load_page;
use mountmagic::net::image::ImageLoader;
use mountmagic::page::{Page, PageEvent};

use super::content::FrameGeometry;
use super::ViewerApp;

impl ViewerApp {
    /// Start loading `self.location` in the background.
    pub fn navigate(&mut self, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);

        let location = self.location.trim().to_string();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = load_page(&location);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the fetch channel and bind the page when the markup arrives.
    pub fn check_fetch(&mut self) {
        let Some(rx) = &self.fetch_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.loading = false;
        self.fetch_rx = None;

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("{}", e);
                self.error = Some(e.to_string());
                self.page = None;
                return;
            }
        };

        let tree = parse_html(&loaded.markup, loaded.base.as_str());
        self.page_start = Instant::now();
        match Page::bind(tree, self.config.clone(), 0) {
            Ok(page) => {
                let mut loader = ImageLoader::new(loaded.base.clone());
                loader.request_batch(&image_sources(&page));
                self.image_loader = Some(loader);
                self.image_textures = HashMap::new();
                self.playback = SimulatedPlayback::new();
                self.geometry = FrameGeometry::default();
                self.queued.clear();
                self.notices.clear();
                self.hovered = None;
                self.scroll_request = Some(0.0);
                self.needs_load_event = true;
                self.page = Some(page);
                match loaded.status {
                    Some(status) => log::info!("opened {} ({})", loaded.base, status),
                    None => log::info!("opened {}", loaded.base),
                }
            }
            Err(e) => {
                log::error!("{}", e);
                self.error = Some(e.to_string());
                self.page = None;
            }
        }
    }

    /// Turn finished image loads into textures and report failures to the
    /// page so it can fall back to the placeholder.
    pub fn poll_images(&mut self, ctx: &egui::Context) {
        let (Some(loader), Some(page)) = (self.image_loader.as_mut(), self.page.as_ref()) else {
            return;
        };

        // sources change at runtime (placeholder fallback, lazy images)
        let sources = image_sources(page);
        for src in &sources {
            loader.request(src);
        }

        for failed in loader.poll() {
            let tree = page.tree();
            for img in tree.select("img").unwrap_or_default() {
                if tree.attr(img, "src") == Some(failed.as_str()) {
                    self.queued.push(PageEvent::ImageError(img));
                }
            }
        }

        for src in sources {
            if self.image_textures.contains_key(&src) {
                continue;
            }
            if let Some(data) = loader.get(&src) {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [data.width as usize, data.height as usize],
                    &data.rgba,
                );
                let tex = ctx.load_texture(format!("img_{}", src), image, egui::TextureOptions::LINEAR);
                self.image_textures.insert(src, tex);
            }
        }
    }
}

/// Every image source the page currently shows, video posters included.
fn image_sources(page: &Page) -> Vec<String> {
    let tree = page.tree();
    let mut sources: Vec<String> = tree
        .select("img[src], video[poster]")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| match tree.node(id).map(|n| n.tag.as_str()) {
            Some("video") => tree.attr(id, "poster"),
            _ => tree.attr(id, "src"),
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    sources.sort();
    sources.dedup();
    sources
}
