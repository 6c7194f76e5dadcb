use eframe::egui::{self, Color32, Context, RichText, TextEdit};
use ae_core::{AspectRatio, ModelType};
use crate::events::AppEvent;
use crate::ui::{UiComponent, UiContext, UiEvent};

const SUGGESTIONS: [&str; 6] = [
    "a red fox in snow",
    "a lighthouse on a cliff at sunset",
    "a cozy cabin in a misty forest",
    "a futuristic city skyline at night",
    "a bowl of ramen, studio lighting",
    "a dragon made of crystal",
];

#[derive(Default)]
pub struct SidePanel {
    pub prompt_text: String,
    pub selected_model: ModelType,
    pub selected_ratio: AspectRatio,
}

impl SidePanel {
    fn submit(&self, ui_ctx: &UiContext) {
        ui_ctx.send_event(UiEvent::Generate {
            prompt: self.prompt_text.clone(),
            model: self.selected_model,
            ratio: self.selected_ratio,
        });
    }
}

impl UiComponent for SidePanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::SidePanel::left("side_panel")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading(RichText::new("✨ Describe your image").size(16.0));
                ui.add_space(5.0);

                let text_edit = TextEdit::multiline(&mut self.prompt_text)
                    .desired_width(f32::INFINITY)
                    .desired_rows(4)
                    .hint_text("e.g., a red fox in snow, watercolor style...");
                ui.add(text_edit);
                ui.add_space(8.0);

                // === Model and ratio ===
                egui::ComboBox::from_label("Style")
                    .selected_text(format!("{} {}", self.selected_model.icon(), self.selected_model.name()))
                    .show_ui(ui, |ui| {
                        for model in ModelType::all() {
                            ui.selectable_value(
                                &mut self.selected_model,
                                model,
                                format!("{} {}", model.icon(), model.name()),
                            )
                            .on_hover_text(model.description());
                        }
                    });
                ui.label(
                    RichText::new(self.selected_model.description())
                        .small()
                        .color(Color32::LIGHT_BLUE),
                );

                egui::ComboBox::from_label("Aspect ratio")
                    .selected_text(self.selected_ratio.as_str())
                    .show_ui(ui, |ui| {
                        for ratio in AspectRatio::all() {
                            ui.selectable_value(&mut self.selected_ratio, ratio, ratio.as_str());
                        }
                    });
                ui.add_space(8.0);

                let generate_button = ui.add_enabled(
                    ui_ctx.can_generate(),
                    egui::Button::new(RichText::new("🎨 Generate").size(14.0))
                        .min_size(egui::vec2(ui.available_width(), 30.0)),
                );
                if generate_button.clicked() {
                    self.submit(ui_ctx);
                }

                if ui_ctx.is_authenticated() && !ui_ctx.payments.can_generate() {
                    ui.label(
                        RichText::new("You're out of credits. Buy more to keep generating.")
                            .small()
                            .color(Color32::from_rgb(239, 68, 68)),
                    );
                }

                if ui_ctx.phase.is_loading() {
                    ui.separator();
                    egui::Frame::new()
                        .fill(Color32::from_rgb(30, 50, 80))
                        .inner_margin(egui::Margin::same(10))
                        .corner_radius(egui::CornerRadius::same(5))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(RichText::new(ui_ctx.phase.label()).color(ui_ctx.phase.color()));
                            });
                            if ui.small_button("Cancel").clicked() {
                                ui_ctx.send_event(UiEvent::ResetGeneration);
                            }
                        });
                }

                ui.separator();

                ui.collapsing("💡 Try one of these", |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for suggestion in SUGGESTIONS {
                            if ui.button(suggestion).clicked() {
                                self.prompt_text = suggestion.to_string();
                            }
                        }
                    });
                });

                ui.separator();

                ui.collapsing("💭 Prompt Tips", |ui| {
                    ui.label("✓ Name the subject first");
                    ui.label("✓ Add lighting, mood and medium");
                    ui.label("✓ Pick the style that matches your idea");
                    ui.label("✗ Avoid long lists of unrelated things");
                });
            });
    }

    fn on_app_event(&mut self, e: &AppEvent) {
        if let AppEvent::SessionChanged(None) = e {
            self.prompt_text.clear();
        }
    }
}
