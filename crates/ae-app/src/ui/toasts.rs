use eframe::egui::{self, Color32, Context, RichText};
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct Toasts {}

impl UiComponent for Toasts {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        if ui_ctx.notifications.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 48.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for notification in ui_ctx.notifications.iter().rev() {
                    let response = egui::Frame::new()
                        .fill(notification.kind.color())
                        .corner_radius(egui::CornerRadius::same(6))
                        .inner_margin(egui::Margin::same(10))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(RichText::new(&notification.message).color(Color32::WHITE));
                        })
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_text("Click to dismiss");
                    if response.clicked() {
                        ui_ctx.send_event(UiEvent::DismissNotification(notification.id));
                    }
                    ui.add_space(6.0);
                }
            });
    }
}
