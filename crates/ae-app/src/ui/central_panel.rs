use eframe::egui::{self, Color32, Context, RichText};
use crate::job::WorkflowPhase;
use crate::ui::{UiComponent, UiContext, UiEvent, texture_or_spinner};

#[derive(Default)]
pub struct CentralPanel {}

impl CentralPanel {
    fn show_actions(ui: &mut egui::Ui, ui_ctx: &UiContext, url: &str) {
        ui.horizontal(|ui| {
            if ui.button("⬇ Download").clicked() {
                ui_ctx.send_event(UiEvent::DownloadImage);
            }
            if ui.button("🔗 Share").clicked() {
                ui_ctx.send_event(UiEvent::ShareImage);
            }
            if ui
                .add_enabled(ui_ctx.can_generate(), egui::Button::new("🔀 Variation"))
                .clicked()
            {
                ui_ctx.send_event(UiEvent::Variation);
            }
            if ui.button("🔍 View").clicked() {
                ui_ctx.send_event(UiEvent::OpenLightbox(url.to_string()));
            }
        });
    }
}

impl UiComponent for CentralPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::CentralPanel::default().show(ctx, |ui| {
            match &ui_ctx.phase {
                WorkflowPhase::Loading { .. } => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() / 3.0);
                        ui.add(egui::Spinner::new().size(48.0));
                        ui.add_space(10.0);
                        ui.label(RichText::new(ui_ctx.phase.label()).size(16.0).color(ui_ctx.phase.color()));
                    });
                }
                WorkflowPhase::Displaying { image_url } => {
                    Self::show_actions(ui, ui_ctx, image_url);
                    ui.add_space(8.0);
                    let max = ui.available_size();
                    ui.vertical_centered(|ui| {
                        texture_or_spinner(ui, ui_ctx.texture(image_url), max);
                    });
                }
                WorkflowPhase::Idle => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() / 3.0);
                        ui.label(
                            RichText::new("Your generated image will appear here")
                                .size(16.0)
                                .color(Color32::GRAY),
                        );
                        ui.label(
                            RichText::new("Describe what you want to see and press Generate.")
                                .small()
                                .color(Color32::GRAY),
                        );
                    });
                }
            }
        });
    }
}
