use eframe::egui::{self, Context};
use crate::ui::{UiComponent, UiContext, UiEvent, texture_or_spinner};

#[derive(Default)]
pub struct Lightbox {}

impl UiComponent for Lightbox {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let Some(url) = &ui_ctx.lightbox else {
            return;
        };

        let screen = ctx.available_rect();
        let mut open = true;
        egui::Window::new("Image")
            .open(&mut open)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .max_size(screen.size() * 0.85)
            .show(ctx, |ui| {
                let max = screen.size() * 0.8;
                texture_or_spinner(ui, ui_ctx.texture(url), max);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(url).small().weak());
                    if ui.small_button("📋").on_hover_text("Copy URL").clicked() {
                        ctx.copy_text(url.clone());
                    }
                });
            });

        if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ui_ctx.send_event(UiEvent::CloseLightbox);
        }
    }
}
