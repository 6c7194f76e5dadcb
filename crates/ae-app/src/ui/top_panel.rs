use eframe::egui::{self, Color32, Context, RichText};
use crate::payments::ModalKind;
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct TopPanel {}

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🎨 aeaiou");
                ui.separator();
                ui.label(RichText::new("Status:").color(Color32::LIGHT_BLUE));
                ui.label(RichText::new(ui_ctx.phase.label()).color(ui_ctx.phase.color()));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let Some(user) = &ui_ctx.user else {
                        if ui.button("Log in").clicked() {
                            ui_ctx.send_event(UiEvent::ShowLogin);
                        }
                        return;
                    };

                    if ui.button("Log out").clicked() {
                        ui_ctx.send_event(UiEvent::Logout);
                    }
                    ui.label(RichText::new(format!("👤 {}", user.username)).strong());
                    ui.separator();

                    if ui.button("⭐ Subscribe").clicked() {
                        ui_ctx.send_event(UiEvent::OpenPayment(ModalKind::Subscription));
                    }
                    if ui.button("💳 Buy Credits").clicked() {
                        ui_ctx.send_event(UiEvent::OpenPayment(ModalKind::Credits));
                    }

                    if let Some(plan) = &ui_ctx.payments.subscribed {
                        ui.label(RichText::new(format!("{} plan", plan)).color(Color32::GOLD));
                    }
                    match &ui_ctx.payments.balance {
                        Some(balance) => {
                            let color = if balance.can_generate() {
                                Color32::GREEN
                            } else {
                                Color32::RED
                            };
                            ui.label(
                                RichText::new(format!("{} credits", balance.available())).color(color),
                            )
                            .on_hover_text(format!("{} used of {}", balance.used(), balance.total()));
                        }
                        None => {
                            ui.label(RichText::new("… credits").color(Color32::GRAY));
                        }
                    }
                });
            });
        });
    }
}
