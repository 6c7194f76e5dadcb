use std::sync::{Arc, OnceLock};
use eframe::egui;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use ae_core::{CreditBalance, GalleryItem, Owner, User};
use crate::backend::images::LoadedImage;
use crate::error::AppError;
use crate::job::WorkflowPhase;
use crate::notifications::Notification;
use crate::ui::UiEvent;

#[derive(Debug, Clone)]
pub enum AeEvent {
    Ui(UiEvent),
    App(AppEvent),
    Gen(GenEvent),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Notify(Notification),
    SessionChanged(Option<User>),
    LoginRequired,
    GalleryUpdated(Owner),
    CreditsUpdated(CreditBalance),
    PaymentsChanged,
    ThumbnailLoaded {
        url: String,
        result: Result<LoadedImage, AppError>,
    },
}

#[derive(Debug, Clone)]
pub enum GenEvent {
    Phase(WorkflowPhase),
    ImageReady {
        item: GalleryItem,
        image: LoadedImage,
    },
}

/// Sending half of the channel background tasks use to reach the UI thread.
/// Every send also wakes the UI once a context has been attached.
#[derive(Clone)]
pub struct EventProxy {
    tx: UnboundedSender<AeEvent>,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl EventProxy {
    pub fn channel() -> (Self, UnboundedReceiver<AeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let proxy = Self {
            tx,
            repaint: Arc::new(OnceLock::new()),
        };
        (proxy, rx)
    }

    pub fn attach(&self, ctx: egui::Context) {
        let _ = self.repaint.set(ctx);
    }

    pub fn send_event(&self, event: AeEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
            return;
        }
        if let Some(ctx) = self.repaint.get() {
            ctx.request_repaint();
        }
    }

    pub fn push_app(&self, event: AppEvent) {
        self.send_event(AeEvent::App(event));
    }

    pub fn push_gen(&self, event: GenEvent) {
        self.send_event(AeEvent::Gen(event));
    }

    pub fn notify(&self, notification: Notification) {
        self.push_app(AppEvent::Notify(notification));
    }

    pub fn notify_error(&self, err: &AppError) {
        self.notify(Notification::from(err));
    }
}
