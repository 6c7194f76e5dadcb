use eframe::egui::{self, Color32, Context, RichText, TextEdit, Ui};
use crate::events::AppEvent;
use crate::payments::{ModalKind, PaymentSnapshot};
use crate::ui::{UiComponent, UiContext, UiEvent};

/// Stripe's test payment method, handy against a test-mode backend
const TEST_PAYMENT_METHOD: &str = "pm_card_visa";

#[derive(Default)]
pub struct PaymentWindow {
    payment_method: String,
}

impl PaymentWindow {
    fn show_packages(ui: &mut Ui, ui_ctx: &UiContext, payments: &PaymentSnapshot) {
        if payments.packages.is_empty() {
            ui.label(RichText::new("No credit packages available").color(Color32::GRAY));
            return;
        }
        for (i, package) in payments.packages.iter().enumerate() {
            let selected = payments.modal.selected == Some(i);
            let text = format!(
                "{}  ·  {} credits  ·  ${:.2}",
                package.name, package.credits, package.price
            );
            if ui.selectable_label(selected, text).clicked() {
                ui_ctx.send_event(UiEvent::SelectOffer(i));
            }
        }
    }

    fn show_plans(ui: &mut Ui, ui_ctx: &UiContext, payments: &PaymentSnapshot) {
        if payments.plans.is_empty() {
            ui.label(RichText::new("No subscription plans available").color(Color32::GRAY));
            return;
        }
        for (i, plan) in payments.plans.iter().enumerate() {
            let selected = payments.modal.selected == Some(i);
            let text = format!("{}  ·  ${:.2}/{}", plan.name, plan.price, plan.billing_cycle);
            let response = ui.selectable_label(selected, text);
            if response.clicked() {
                ui_ctx.send_event(UiEvent::SelectOffer(i));
            }
            if let Some(credits) = plan.credits_per_cycle {
                ui.label(
                    RichText::new(format!("  {} credits per {}", credits, plan.billing_cycle))
                        .small()
                        .color(Color32::GRAY),
                );
            }
            for feature in &plan.features {
                ui.label(RichText::new(format!("  ✓ {}", feature)).small());
            }
        }
    }
}

impl UiComponent for PaymentWindow {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let payments = &ui_ctx.payments;
        let Some(kind) = payments.modal.kind else {
            return;
        };

        let mut open = true;
        egui::Window::new(kind.title())
            .id(egui::Id::new("payment_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                match kind {
                    ModalKind::Credits => Self::show_packages(ui, ui_ctx, payments),
                    ModalKind::Subscription => Self::show_plans(ui, ui_ctx, payments),
                }
                ui.separator();

                if kind.takes_payment_method() {
                    ui.horizontal(|ui| {
                        ui.label("Payment method");
                        ui.add(
                            TextEdit::singleline(&mut self.payment_method)
                                .hint_text(TEST_PAYMENT_METHOD)
                                .desired_width(200.0),
                        );
                    });
                }

                if let Some(error) = &payments.modal.error {
                    ui.label(RichText::new(error).color(Color32::RED));
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let label = kind.action_label();
                    let ready = !payments.modal.submitting && payments.modal.selected.is_some();
                    if ui.add_enabled(ready, egui::Button::new(label)).clicked() {
                        let payment_method = self.payment_method.trim().to_string();
                        ui_ctx.send_event(match kind {
                            ModalKind::Credits => UiEvent::PurchaseCredits { payment_method },
                            ModalKind::Subscription => UiEvent::Subscribe,
                        });
                    }
                    if payments.modal.submitting {
                        ui.spinner();
                        ui.label("Processing...");
                    }
                    if ui.button("Close").clicked() {
                        ui_ctx.send_event(UiEvent::ClosePayment);
                    }
                });
            });

        if !open {
            ui_ctx.send_event(UiEvent::ClosePayment);
        }
    }

    fn on_app_event(&mut self, e: &AppEvent) {
        if let AppEvent::SessionChanged(None) = e {
            self.payment_method.clear();
        }
    }
}
