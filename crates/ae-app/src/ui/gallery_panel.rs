use eframe::egui::{self, Color32, Context, RichText, Ui};
use ae_core::Owner;
use crate::events::AppEvent;
use crate::gallery::{CardAction, ContainerState, GalleryCard};
use crate::ui::{UiComponent, UiContext, UiEvent, texture_or_spinner};

const THUMBNAIL: f32 = 160.0;

pub struct GalleryPanel {
    show_panel: bool,
}

impl Default for GalleryPanel {
    fn default() -> Self {
        Self { show_panel: true }
    }
}

impl GalleryPanel {
    fn show_card(ui: &mut Ui, ui_ctx: &UiContext, card: &GalleryCard) {
        egui::Frame::new()
            .fill(Color32::from_gray(30))
            .corner_radius(egui::CornerRadius::same(5))
            .inner_margin(egui::Margin::same(8))
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(60)))
            .show(ui, |ui| {
                ui.set_width(THUMBNAIL);
                ui.vertical(|ui| {
                    texture_or_spinner(
                        ui,
                        ui_ctx.texture(&card.item.image_url),
                        egui::vec2(THUMBNAIL, THUMBNAIL),
                    );
                    ui.label(RichText::new(card.item.title()).strong())
                        .on_hover_text(&card.item.prompt);
                    ui.label(
                        RichText::new(card.item.timestamp_label())
                            .small()
                            .color(Color32::GRAY),
                    );

                    ui.horizontal(|ui| {
                        for action in &card.actions {
                            match action {
                                CardAction::View => {
                                    if ui.small_button("🔍 View").clicked() {
                                        ui_ctx.send_event(UiEvent::OpenLightbox(card.item.image_url.clone()));
                                    }
                                }
                                CardAction::SaveToPersonal => {
                                    if ui.small_button("💾 Save").clicked() {
                                        ui_ctx.send_event(UiEvent::SaveToPersonal(card.item.clone()));
                                    }
                                }
                            }
                        }
                    });
                });
            });
    }

    fn show_container(ui: &mut Ui, ui_ctx: &UiContext, state: &ContainerState) {
        match state {
            ContainerState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading images...");
                });
            }
            ContainerState::Empty(message) => {
                ui.label(RichText::new(message).color(Color32::GRAY));
            }
            ContainerState::Error(message) => {
                ui.label(RichText::new(format!("⚠ {}", message)).color(Color32::RED));
            }
            ContainerState::Cards(cards) => {
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for card in cards {
                            Self::show_card(ui, ui_ctx, card);
                        }
                    });
                });
            }
        }
    }
}

impl UiComponent for GalleryPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::bottom("gallery_panel")
            .resizable(true)
            .default_height(290.0)
            .show_animated(ctx, self.show_panel, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("🖼 Gallery");
                    ui.separator();

                    let tab = ui_ctx.gallery_tab;
                    if ui.selectable_label(tab == Owner::Public, "Public").clicked() {
                        ui_ctx.send_event(UiEvent::ShowGallery(Owner::Public));
                    }
                    if ui.selectable_label(tab == Owner::Personal, "My Images").clicked() {
                        ui_ctx.send_event(UiEvent::ShowGallery(Owner::Personal));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("▾ Hide").clicked() {
                            self.show_panel = false;
                        }
                        if ui.button("⟳ Refresh").clicked() {
                            ui_ctx.send_event(UiEvent::RefreshGallery(tab));
                        }
                        ui.label(
                            RichText::new(format!("{} images", ui_ctx.gallery(tab).cards().len()))
                                .small()
                                .color(Color32::GRAY),
                        );
                    });
                });
                ui.separator();

                Self::show_container(ui, ui_ctx, ui_ctx.gallery(ui_ctx.gallery_tab));
            });

        if !self.show_panel {
            egui::TopBottomPanel::bottom("gallery_toggle").show(ctx, |ui| {
                if ui.button("🖼 Show gallery").clicked() {
                    self.show_panel = true;
                }
            });
        }
    }

    fn on_app_event(&mut self, e: &AppEvent) {
        if let AppEvent::GalleryUpdated(_) = e {
            self.show_panel = true;
        }
    }
}
