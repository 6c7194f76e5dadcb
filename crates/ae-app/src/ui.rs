mod auth_window;
mod central_panel;
mod gallery_panel;
mod lightbox;
mod payment_window;
mod side_panel;
mod toasts;
mod top_panel;

pub use auth_window::AuthWindow;
pub use central_panel::CentralPanel;
pub use gallery_panel::GalleryPanel;
pub use lightbox::Lightbox;
pub use payment_window::PaymentWindow;
pub use side_panel::SidePanel;
pub use toasts::Toasts;
pub use top_panel::TopPanel;

use std::collections::{HashMap, HashSet};
use eframe::egui::{self, Context, TextureHandle};
use uuid::Uuid;
use ae_core::{AspectRatio, GalleryItem, ModelType, Owner, User};
use crate::events::{AeEvent, AppEvent, EventProxy};
use crate::gallery::ContainerState;
use crate::job::WorkflowPhase;
use crate::notifications::Notification;
use crate::payments::{ModalKind, PaymentSnapshot};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Generate {
        prompt: String,
        model: ModelType,
        ratio: AspectRatio,
    },
    Variation,
    ResetGeneration,
    DownloadImage,
    ShareImage,
    OpenLightbox(String),
    CloseLightbox,

    // Gallery
    ShowGallery(Owner),
    RefreshGallery(Owner),
    SaveToPersonal(GalleryItem),

    // Account
    ShowLogin,
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
    },
    Logout,

    // Payments
    OpenPayment(ModalKind),
    ClosePayment,
    SelectOffer(usize),
    PurchaseCredits {
        payment_method: String,
    },
    Subscribe,

    DismissNotification(Uuid),
}

pub enum TextureSlot {
    Loading,
    Ready(TextureHandle),
    Failed(String),
}

/// Read-only view of application state handed to every component each frame
pub struct UiContext {
    pub phase: WorkflowPhase,
    pub user: Option<User>,
    pub payments: PaymentSnapshot,
    pub gallery_tab: Owner,
    pub public_gallery: ContainerState,
    pub personal_gallery: ContainerState,
    pub current_image: Option<String>,
    pub lightbox: Option<String>,
    pub notifications: Vec<Notification>,
    pub textures: HashMap<String, TextureSlot>,
    events: EventProxy,
}

impl UiContext {
    pub fn new(events: EventProxy) -> Self {
        Self {
            phase: WorkflowPhase::Idle,
            user: None,
            payments: PaymentSnapshot::default(),
            gallery_tab: Owner::Public,
            public_gallery: ContainerState::Loading,
            personal_gallery: ContainerState::Loading,
            current_image: None,
            lightbox: None,
            notifications: Vec::new(),
            textures: HashMap::new(),
            events,
        }
    }

    pub fn send_event(&self, event: UiEvent) {
        self.events.send_event(AeEvent::Ui(event));
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Generation is blocked while one is running or the user ran out of credits
    pub fn can_generate(&self) -> bool {
        !self.phase.is_loading() && (!self.is_authenticated() || self.payments.can_generate())
    }

    pub fn texture(&self, url: &str) -> Option<&TextureSlot> {
        self.textures.get(url)
    }

    pub fn gallery(&self, owner: Owner) -> &ContainerState {
        match owner {
            Owner::Public => &self.public_gallery,
            Owner::Personal => &self.personal_gallery,
        }
    }

    /// Drops textures no card, lightbox or current image refers to anymore
    pub fn prune_textures(&mut self) -> usize {
        let in_use: HashSet<&str> = self
            .public_gallery
            .cards()
            .iter()
            .chain(self.personal_gallery.cards())
            .map(|card| card.item.image_url.as_str())
            .chain(self.lightbox.as_deref())
            .chain(self.current_image.as_deref())
            .collect();

        let before = self.textures.len();
        self.textures.retain(|url, _| in_use.contains(url.as_str()));
        before - self.textures.len()
    }
}

pub trait UiComponent: Send {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext);

    fn on_app_event(&mut self, _e: &AppEvent) {}
}

pub struct UiState {
    components: Vec<Box<dyn UiComponent>>,
    pub(crate) ui_ctx: UiContext,
}

impl UiState {
    pub fn new(events: EventProxy) -> Self {
        Self {
            components: Vec::new(),
            ui_ctx: UiContext::new(events),
        }
    }

    pub fn draw(&mut self, ctx: &Context) {
        for component in self.components.iter_mut() {
            component.show(ctx, &self.ui_ctx);
        }
    }

    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn on_app_event(&mut self, e: &AppEvent) {
        for component in self.components.iter_mut() {
            component.on_app_event(e);
        }
    }
}

/// Shows a texture slot at most `max` large, with a spinner while it loads
pub(crate) fn texture_or_spinner(ui: &mut egui::Ui, slot: Option<&TextureSlot>, max: egui::Vec2) {
    match slot {
        Some(TextureSlot::Ready(texture)) => {
            ui.add(
                egui::Image::new(texture)
                    .max_size(max)
                    .maintain_aspect_ratio(true)
                    .corner_radius(egui::CornerRadius::same(6)),
            );
        }
        Some(TextureSlot::Failed(reason)) => {
            ui.allocate_ui(max, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0))
                        .on_hover_text(reason);
                });
            });
        }
        Some(TextureSlot::Loading) | None => {
            ui.allocate_ui(max, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            });
        }
    }
}
