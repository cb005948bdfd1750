//! Stateless helpers that turn the page's DOM into egui widgets.
//!
//! Rendering never mutates the page: widgets record their screen rectangle
//! and any input they receive in a [`RenderFrame`], and the app feeds both
//! back to the page after the frame.

use std::collections::HashMap;

use eframe::egui;

use mountmagic::components::media::{Playback, SimulatedPlayback};
use mountmagic::components::rotator::ACTIVE_CLASS;
use mountmagic::dom::css::parse_css_size;
use mountmagic::dom::{DomTree, NodeId, NodeType};
use mountmagic::page::{EventKind, Page, PageEvent};

pub const BRAND_GREEN: egui::Color32 = egui::Color32::from_rgb(0x2d, 0x50, 0x16);
pub const SKY_BLUE: egui::Color32 = egui::Color32::from_rgb(0x87, 0xce, 0xeb);
const LINK_BLUE: egui::Color32 = egui::Color32::from_rgb(0x2c, 0x5f, 0x7d);

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "link", "meta", "title", "noscript"];

/// Per-frame render state shared by the widget helpers.
pub struct RenderFrame<'a> {
    pub page: &'a Page,
    pub textures: &'a HashMap<String, egui::TextureHandle>,
    pub playback: &'a SimulatedPlayback,
    /// Screen rectangles of every element drawn this frame.
    pub rects: HashMap<NodeId, egui::Rect>,
    pub events: Vec<PageEvent>,
}

impl<'a> RenderFrame<'a> {
    pub fn new(
        page: &'a Page,
        textures: &'a HashMap<String, egui::TextureHandle>,
        playback: &'a SimulatedPlayback,
    ) -> Self {
        Self {
            page,
            textures,
            playback,
            rects: HashMap::new(),
            events: Vec::new(),
        }
    }

    fn tree(&self) -> &'a DomTree {
        self.page.tree()
    }

    fn clickable(&self, id: NodeId) -> bool {
        self.page.is_bound(EventKind::Click, id)
    }

    fn click(&mut self, id: NodeId) {
        self.events.push(PageEvent::Click(id));
    }
}

/// Render every child of `id` top to bottom.
pub fn render_children(ui: &mut egui::Ui, frame: &mut RenderFrame<'_>, id: NodeId) {
    let tree = frame.tree();
    let Some(node) = tree.node(id) else {
        return;
    };
    for child in &node.children {
        render_node(ui, frame, *child);
    }
}

pub fn render_node(ui: &mut egui::Ui, frame: &mut RenderFrame<'_>, id: NodeId) {
    let tree = frame.tree();
    let Some(node) = tree.node(id) else {
        return;
    };

    if node.node_type == NodeType::Text {
        let text = collapse_whitespace(&node.text);
        if !text.is_empty() {
            ui.label(text);
        }
        return;
    }
    if SKIPPED_TAGS.contains(&node.tag.as_str()) || tree.is_hidden(id) {
        return;
    }
    // drawn as an overlay by the app
    if frame.page.modal().is_some_and(|m| m.modal == id) {
        return;
    }
    if tree.has_class(id, "hero-slide") && !tree.has_class(id, ACTIVE_CLASS) {
        return;
    }

    let style = tree.style(id);
    let opacity = style.opacity();
    let shift = style.translate_y();

    let response = ui
        .scope(|ui| {
            ui.set_opacity(opacity);
            if shift > 0.0 {
                ui.add_space(shift);
            }
            render_element(ui, frame, id)
        })
        .response;
    frame.rects.insert(id, response.rect);
}

fn render_element(ui: &mut egui::Ui, frame: &mut RenderFrame<'_>, id: NodeId) {
    let tree = frame.tree();
    let Some(node) = tree.node(id) else {
        return;
    };
    let tag = node.tag.as_str();

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let size = match tag {
                "h1" => 30.0,
                "h2" => 24.0,
                _ => 18.0,
            };
            let text = display_text(tree, id);
            if !text.is_empty() {
                ui.add_space(size * 0.3);
                ui.label(egui::RichText::new(text).size(size).strong().color(BRAND_GREEN));
            }
        }
        "button" => {
            let label = display_text(tree, id);
            let mut button = egui::Button::new(label);
            if tree.has_class(id, "playing") {
                button = button.fill(SKY_BLUE);
            }
            if ui.add(button).clicked() {
                frame.click(id);
            }
        }
        "a" => {
            let text = display_text(tree, id);
            if !text.is_empty() {
                let rt = egui::RichText::new(text).color(LINK_BLUE).underline();
                if ui.add(egui::Label::new(rt).sense(egui::Sense::click())).clicked() {
                    frame.click(id);
                }
            }
        }
        "img" => render_image(ui, frame, id),
        "video" => render_video(ui, frame, id),
        _ if tree.has_class(id, "indicator") => {
            let active = tree.has_class(id, ACTIVE_CLASS);
            let (rect, response) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::click());
            let color = if active { BRAND_GREEN } else { egui::Color32::LIGHT_GRAY };
            ui.painter().circle_filled(rect.center(), 5.0, color);
            if response.clicked() {
                frame.click(id);
            }
        }
        _ if tree.has_class(id, "hamburger") => {
            let open = tree.has_class(id, ACTIVE_CLASS);
            if ui.button(if open { "\u{2715}" } else { "\u{2630}" }).clicked() {
                frame.click(id);
            }
        }
        _ if tree.has_class(id, "copy-feedback") => {
            if tree.has_class(id, "show") {
                ui.colored_label(BRAND_GREEN, display_text(tree, id));
            }
        }
        _ => {
            let has_elements = node
                .children
                .iter()
                .any(|c| tree.node(*c).is_some_and(|n| n.is_element()));
            if has_elements {
                let inner = ui.vertical(|ui| render_children(ui, frame, id));
                if frame.clickable(id) {
                    let response = ui.interact(
                        inner.response.rect,
                        egui::Id::new(("node", id.0)),
                        egui::Sense::click(),
                    );
                    if response.clicked() {
                        frame.click(id);
                    }
                }
            } else {
                let text = display_text(tree, id);
                if text.is_empty() {
                    return;
                }
                let sense = if frame.clickable(id) {
                    egui::Sense::click()
                } else {
                    egui::Sense::hover()
                };
                if ui.add(egui::Label::new(text).sense(sense)).clicked() {
                    frame.click(id);
                }
            }
        }
    }
}

/// Display height of an image from its `height` attribute.
fn image_height(tree: &DomTree, id: NodeId) -> f32 {
    tree.attr(id, "height")
        .and_then(parse_css_size)
        .unwrap_or(180.0)
}

fn render_image(ui: &mut egui::Ui, frame: &mut RenderFrame<'_>, id: NodeId) {
    let tree = frame.tree();
    let height = image_height(tree, id);
    let sense = if frame.clickable(id) {
        egui::Sense::click()
    } else {
        egui::Sense::hover()
    };

    let texture = tree.attr(id, "src").and_then(|src| frame.textures.get(src));
    let response = match texture {
        Some(tex) => {
            let size = tex.size_vec2();
            let scale = height / size.y.max(1.0);
            let width = (size.x * scale).min(ui.available_width());
            ui.add(
                egui::Image::new(egui::load::SizedTexture::from_handle(tex))
                    .fit_to_exact_size(egui::vec2(width, height))
                    .sense(sense),
            )
        }
        None => {
            let width = ui.available_width().min(height * 16.0 / 9.0);
            let (rect, response) = ui.allocate_exact_size(egui::vec2(width, height), sense);
            ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(225));
            let alt = tree.attr(id, "alt").unwrap_or("image");
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                alt,
                egui::FontId::proportional(13.0),
                egui::Color32::DARK_GRAY,
            );
            response
        }
    };
    if response.clicked() {
        frame.click(id);
    }
}

fn render_video(ui: &mut egui::Ui, frame: &mut RenderFrame<'_>, id: NodeId) {
    let tree = frame.tree();
    let width = ui.available_width().min(480.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, width * 9.0 / 16.0), egui::Sense::hover());

    let poster = tree.attr(id, "poster").and_then(|p| frame.textures.get(p));
    match poster {
        Some(tex) => {
            egui::Image::new(egui::load::SizedTexture::from_handle(tex)).paint_at(ui, rect);
        }
        None => {
            ui.painter().rect_filled(rect, 6.0, egui::Color32::from_gray(30));
        }
    }

    let status = if frame.playback.is_paused(id) {
        format!("paused {:.1}s", frame.playback.position(id))
    } else {
        format!("\u{25B6} playing {:.1}s", frame.playback.position(id))
    };
    ui.painter().text(
        rect.left_bottom() + egui::vec2(8.0, -8.0),
        egui::Align2::LEFT_BOTTOM,
        status,
        egui::FontId::monospace(13.0),
        egui::Color32::WHITE,
    );
}

/// Text of an element with runs of whitespace collapsed.
pub fn display_text(tree: &DomTree, id: NodeId) -> String {
    collapse_whitespace(&tree.text_content(id))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to `max_chars` characters, appending "..." when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
