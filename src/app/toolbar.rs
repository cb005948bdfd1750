//! Toolbar rendering for `ViewerApp`: location bar, reload, page clock
//! and dark-mode toggle.

use eframe::egui;

use super::ViewerApp;

impl ViewerApp {
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let response = ui.add_sized(
                [ui.available_width() - 260.0, 24.0],
                egui::TextEdit::singleline(&mut self.location)
                    .hint_text("Page path or URL...")
                    .font(egui::TextStyle::Monospace),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.navigate(ctx);
            }
            if ui
                .add_enabled(!self.loading, egui::Button::new("\u{21BB}"))
                .on_hover_text("Reload")
                .clicked()
            {
                self.navigate(ctx);
            }

            if self.loading {
                ui.spinner();
            } else if let Some(page) = &self.page {
                let playing = page.media().iter().filter(|m| m.user_intent_playing).count();
                let (loaded, pending) = self
                    .image_loader
                    .as_ref()
                    .map_or((0, 0), |l| (l.loaded_count(), l.pending_count()));
                let status = format!(
                    "t={:.1}s  timers={}  videos={}/{}  images={}+{}",
                    page.now_ms() as f64 / 1000.0,
                    page.pending_timers().len(),
                    playing,
                    page.media().len(),
                    loaded,
                    pending
                );
                ui.label(egui::RichText::new(status).monospace().small());
            }

            let dark_label = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(dark_label).clicked() {
                self.dark_mode = !self.dark_mode;
            }
        });
    }
}
