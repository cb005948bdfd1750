//! Page rendering and the host side of the page runtime.
//!
//! Each frame the page is drawn inside a scroll area, element rectangles
//! are measured into a [`FrameGeometry`], and the input gathered while
//! drawing is dispatched to the page together with the clock advance.

use std::collections::HashMap;
use std::time::Instant;

use eframe::egui;

use mountmagic::dom::NodeId;
use mountmagic::page::{Effect, Host, Key, PageEvent};
use mountmagic::viewport::{Geometry, Rect, Viewport};

use crate::ui::{self, RenderFrame, BRAND_GREEN};

use super::ViewerApp;

/// Element rectangles measured during the last frame, in viewport
/// coordinates.
#[derive(Debug, Clone)]
pub struct FrameGeometry {
    rects: HashMap<NodeId, Rect>,
    viewport: Viewport,
    scroll_y: f32,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            rects: HashMap::new(),
            viewport: Viewport::new(1280.0, 800.0),
            scroll_y: 0.0,
        }
    }
}

impl FrameGeometry {
    /// Store this frame's measurements. `visible` is the on-screen area of
    /// the scroll view; element rects are given in screen space.
    pub fn update(&mut self, screen_rects: &HashMap<NodeId, egui::Rect>, visible: egui::Rect, scroll_y: f32) {
        self.rects = screen_rects
            .iter()
            .map(|(id, r)| (*id, to_viewport(*r, visible)))
            .collect();
        self.viewport = Viewport::new(visible.width(), visible.height());
        self.scroll_y = scroll_y;
    }

    /// Viewport-space point for a screen position.
    pub fn contains(&self, id: NodeId, point: egui::Pos2, visible: egui::Rect) -> bool {
        let x = point.x - visible.min.x;
        let y = point.y - visible.min.y;
        self.rects
            .get(&id)
            .is_some_and(|r| x >= r.left && x <= r.right && y >= r.top && y <= r.bottom)
    }
}

fn to_viewport(r: egui::Rect, visible: egui::Rect) -> Rect {
    Rect::from_xywh(
        r.min.x - visible.min.x,
        r.min.y - visible.min.y,
        r.width(),
        r.height(),
    )
}

impl Geometry for FrameGeometry {
    fn bounding_box(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }
}

impl ViewerApp {
    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(page) = self.page.as_ref() else {
            ui.centered_and_justified(|ui| {
                if self.loading {
                    ui.spinner();
                } else if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 60), ui::truncate_str(err, 300));
                } else {
                    ui.label("No page loaded");
                }
            });
            return;
        };

        let mut scroll = egui::ScrollArea::vertical().auto_shrink([false, false]);
        if let Some(y) = self.scroll_request.take() {
            scroll = scroll.vertical_scroll_offset(y);
        }

        let mut frame = RenderFrame::new(page, &self.image_textures, &self.playback);
        let output = scroll.show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;
            ui::render_children(ui, &mut frame, page.tree().root());
        });

        let visible = output.inner_rect;
        let scroll_y = output.state.offset.y;
        let old_viewport = self.geometry.viewport();
        let old_scroll = self.geometry.scroll_y();
        self.geometry.update(&frame.rects, visible, scroll_y);
        self.queued.append(&mut frame.events);

        if (scroll_y - old_scroll).abs() > 0.5 {
            self.queued.push(PageEvent::Scroll { scroll_y });
        }
        if !self.needs_load_event && self.geometry.viewport() != old_viewport {
            self.queued.push(PageEvent::Resize);
        }

        // hover over a carousel pauses it
        let pointer = ctx.pointer_hover_pos();
        let containers: Vec<NodeId> = page.carousels().iter().filter_map(|c| c.container).collect();
        let now_over = containers.into_iter().find(|c| {
            pointer.is_some_and(|p| visible.contains(p) && self.geometry.contains(*c, p, visible))
        });
        if now_over != self.hovered {
            if let Some(old) = self.hovered {
                self.queued.push(PageEvent::MouseLeave(old));
            }
            if let Some(new) = now_over {
                self.queued.push(PageEvent::MouseEnter(new));
            }
            self.hovered = now_over;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.queued.push(PageEvent::KeyDown(Key::Escape));
        }
    }

    /// Logo lightbox and alert-style notices.
    pub fn draw_overlays(&mut self, ctx: &egui::Context) {
        if let Some(page) = self.page.as_ref() {
            if let Some(modal) = page.modal().copied().filter(|m| m.is_open(page.tree())) {
                let screen = ctx.screen_rect();
                egui::Area::new(egui::Id::new("logo_modal"))
                    .order(egui::Order::Foreground)
                    .fixed_pos(screen.min)
                    .show(ctx, |ui| {
                        let overlay = ui.allocate_rect(screen, egui::Sense::click());
                        ui.painter()
                            .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(200));

                        let size = egui::vec2(360.0, 360.0);
                        let image_rect = egui::Rect::from_center_size(screen.center(), size);
                        let src = page.tree().attr(modal.image, "src").unwrap_or_default();
                        let image = ui.allocate_rect(image_rect, egui::Sense::click());
                        match self.image_textures.get(src) {
                            Some(tex) => {
                                egui::Image::new(egui::load::SizedTexture::from_handle(tex))
                                    .paint_at(ui, image_rect);
                            }
                            None => {
                                ui.painter().rect_filled(image_rect, 8.0, BRAND_GREEN);
                            }
                        }

                        let close_rect = egui::Rect::from_min_size(
                            image_rect.right_top() + egui::vec2(8.0, -40.0),
                            egui::vec2(32.0, 32.0),
                        );
                        let close = ui.allocate_rect(close_rect, egui::Sense::click());
                        ui.painter().text(
                            close_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "\u{00D7}",
                            egui::FontId::proportional(28.0),
                            egui::Color32::WHITE,
                        );

                        if close.clicked() {
                            if let Some(button) = modal.close_button {
                                self.queued.push(PageEvent::Click(button));
                            }
                        } else if image.clicked() {
                            self.queued.push(PageEvent::Click(modal.image));
                        } else if overlay.clicked() {
                            self.queued.push(PageEvent::Click(modal.modal));
                        }
                    });
            }
        }

        if let Some(notice) = self.notices.first().cloned() {
            egui::Window::new("MountMagic")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.set_max_width(420.0);
                    ui.label(notice);
                    if ui.button("OK").clicked() {
                        self.notices.remove(0);
                    }
                });
        }
    }

    /// Dispatch this frame's input, move the page clock and apply effects.
    pub fn run_page(&mut self, ctx: &egui::Context) {
        if self.page.is_none() {
            return;
        }
        let now = Instant::now();
        self.playback
            .advance(now.duration_since(self.last_frame).as_secs_f32());
        self.last_frame = now;
        let now_ms = self.page_now_ms();
        let Some(page) = self.page.as_mut() else {
            return;
        };

        {
            let mut host = Host {
                geometry: &self.geometry,
                playback: &mut self.playback,
                clipboard: &mut self.clipboard,
            };
            if self.needs_load_event {
                self.needs_load_event = false;
                page.dispatch(PageEvent::Load, &mut host);
            }
            for event in self.queued.drain(..) {
                page.dispatch(event, &mut host);
            }
            page.advance_to(now_ms, &mut host);
        }

        for effect in page.take_effects() {
            match effect {
                Effect::Notice(text) => self.notices.push(text),
                Effect::ScrollTo { top, .. } => self.scroll_request = Some(top),
            }
        }
        if let Some(text) = self.clipboard.pending.take() {
            ctx.output_mut(|o| o.copied_text = text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_rects_become_viewport_rects() {
        let mut geometry = FrameGeometry::default();
        let visible = egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(1000.0, 700.0));
        let mut rects = HashMap::new();
        rects.insert(
            NodeId(3),
            egui::Rect::from_min_size(egui::pos2(10.0, 640.0), egui::vec2(200.0, 300.0)),
        );
        geometry.update(&rects, visible, 1200.0);

        let r = geometry.bounding_box(NodeId(3)).unwrap();
        assert_eq!((r.left, r.top, r.bottom), (10.0, 600.0, 900.0));
        assert_eq!(geometry.viewport(), Viewport::new(1000.0, 700.0));
        assert_eq!(geometry.document_top(NodeId(3)), Some(1800.0));
        assert!(geometry.contains(NodeId(3), egui::pos2(20.0, 700.0), visible));
        assert!(!geometry.contains(NodeId(3), egui::pos2(20.0, 20.0), visible));
    }
}
