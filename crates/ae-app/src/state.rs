use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use ae_core::{GalleryItem, Owner};
use crate::auth::storage::{FileStorage, KeyValueStore, MemoryStorage};
use crate::auth::AuthManager;
use crate::backend::api::{CardDetails, ImageLoader};
use crate::backend::card::StripeConfirmation;
use crate::backend::images::{HttpImageLoader, LoadedImage};
use crate::backend::ApiClient;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::events::{AeEvent, AppEvent, EventProxy, GenEvent};
use crate::gallery::{GalleryRenderer, GalleryService};
use crate::generator::{Generator, PollSettings};
use crate::notifications::{Notification, Notifications};
use crate::payments::{ModalKind, PaymentController};
use crate::ui;
use crate::ui::{TextureSlot, UiEvent, UiState};

pub struct AppState {
    pub ui: UiState,
    rx: UnboundedReceiver<AeEvent>,
    events: EventProxy,
    runtime: Handle,

    generator: Generator,
    auth: AuthManager,
    gallery: GalleryService,
    payments: PaymentController,
    loader: Arc<dyn ImageLoader>,

    notifications: Notifications,
}

fn open_storage(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let Some(dir) = &config.data_dir else {
        info!("No data directory configured, session will not persist");
        return Arc::new(MemoryStorage::default());
    };
    match FileStorage::open(dir) {
        Ok(storage) => {
            debug!(path = %storage.path().display(), "Opened session storage");
            Arc::new(storage)
        }
        Err(e) => {
            warn!("Falling back to in-memory session storage: {}", e);
            Arc::new(MemoryStorage::default())
        }
    }
}

impl AppState {
    pub fn new(config: &AppConfig, runtime: Handle, ctx: &egui::Context) -> anyhow::Result<Self> {
        let (events, rx) = EventProxy::channel();
        events.attach(ctx.clone());

        let api = Arc::new(ApiClient::new(config)?);
        let loader: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::new(api.http().clone()));
        let card = Arc::new(StripeConfirmation::new(
            api.http().clone(),
            &config.stripe_api_base,
            config.stripe_publishable_key.clone(),
        ));

        let renderer = GalleryRenderer::default();
        let auth = AuthManager::new(api.clone(), open_storage(config), events.clone());
        let generator = Generator::new(
            api.clone(),
            loader.clone(),
            renderer.clone(),
            events.clone(),
            PollSettings::from(config),
            runtime.clone(),
        );
        let gallery = GalleryService::new(
            api.clone(),
            loader.clone(),
            auth.clone(),
            renderer,
            events.clone(),
        );
        let payments = PaymentController::new(api, card, auth.clone(), events.clone());

        let mut ui_state = UiState::new(events.clone());
        ui_state.add_component(Box::new(ui::TopPanel::default()));
        ui_state.add_component(Box::new(ui::SidePanel::default()));
        ui_state.add_component(Box::new(ui::GalleryPanel::default()));
        ui_state.add_component(Box::new(ui::CentralPanel::default()));
        ui_state.add_component(Box::new(ui::AuthWindow::default()));
        ui_state.add_component(Box::new(ui::PaymentWindow::default()));
        ui_state.add_component(Box::new(ui::Lightbox::default()));
        ui_state.add_component(Box::new(ui::Toasts::default()));

        let state = Self {
            ui: ui_state,
            rx,
            events,
            runtime,
            generator,
            auth,
            gallery,
            payments,
            loader,
            notifications: Notifications::default(),
        };
        state.startup();

        Ok(state)
    }

    /// Restores the saved session, then loads the public gallery.
    /// Account data follows from the `SessionChanged` a restore emits.
    fn startup(&self) {
        let auth = self.auth.clone();
        let gallery = self.gallery.clone();
        self.runtime.spawn(async move {
            let restored = auth.restore_session().await;
            info!(restored, "Session restore finished");

            if let Err(e) = gallery.load_public().await {
                warn!("Initial gallery load failed: {}", e);
            }
        });
    }

    fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.runtime.spawn(async move {
            if let Err(e) = task.await {
                warn!(task = label, "Background task failed: {}", e);
            }
        });
    }

    pub fn push_event(&self, event: AppEvent) {
        self.events.push_app(event);
    }

    /// Runs once per frame: drains pending events, refreshes the view state
    /// and draws every component
    pub fn update(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                AeEvent::Ui(e) => self.on_ui_event(ctx, e),
                AeEvent::App(e) => self.on_app_event(ctx, e),
                AeEvent::Gen(e) => self.on_gen_event(ctx, e),
            }
        }

        let now = Instant::now();
        self.notifications.prune(now);
        self.sync_ui();
        self.ensure_textures();

        self.ui.draw(ctx);

        if let Some(wait) = self.notifications.next_expiry(now) {
            ctx.request_repaint_after(wait);
        }
    }

    fn sync_ui(&mut self) {
        let renderer = self.gallery.renderer();
        let ui_ctx = &mut self.ui.ui_ctx;
        ui_ctx.user = self.auth.user();
        ui_ctx.payments = self.payments.snapshot();
        ui_ctx.public_gallery = renderer.snapshot(Owner::Public);
        ui_ctx.personal_gallery = renderer.snapshot(Owner::Personal);
        ui_ctx.notifications = self.notifications.visible().cloned().collect();
    }

    /// Releases textures nothing shows, then starts a background load for every
    /// card or lightbox image without a texture
    fn ensure_textures(&mut self) {
        let dropped = self.ui.ui_ctx.prune_textures();
        if dropped > 0 {
            debug!(dropped, "Released unused textures");
        }

        let ui_ctx = &self.ui.ui_ctx;
        let wanted: Vec<String> = ui_ctx
            .public_gallery
            .cards()
            .iter()
            .chain(ui_ctx.personal_gallery.cards())
            .map(|card| &card.item.image_url)
            .chain(ui_ctx.lightbox.as_ref())
            .filter(|url| !ui_ctx.textures.contains_key(url.as_str()))
            .cloned()
            .collect();

        for url in wanted {
            if self.ui.ui_ctx.textures.contains_key(&url) {
                continue;
            }
            self.ui.ui_ctx.textures.insert(url.clone(), TextureSlot::Loading);

            let loader = self.loader.clone();
            let events = self.events.clone();
            self.runtime.spawn(async move {
                let result = loader.load(&url).await;
                events.push_app(AppEvent::ThumbnailLoaded { url, result });
            });
        }
    }

    fn store_texture(&mut self, ctx: &egui::Context, image: &LoadedImage) {
        let pixels = egui::ColorImage::from_rgba_unmultiplied(image.size, &image.rgba);
        let texture = ctx.load_texture(&image.url, pixels, egui::TextureOptions::LINEAR);
        self.ui
            .ui_ctx
            .textures
            .insert(image.url.clone(), TextureSlot::Ready(texture));
    }

    pub fn on_ui_event(&mut self, ctx: &egui::Context, event: UiEvent) {
        match event {
            UiEvent::Generate { prompt, model, ratio } => {
                if self.auth.is_authenticated() && !self.payments.snapshot().can_generate() {
                    self.events
                        .notify(Notification::error("You're out of credits. Buy more to keep generating."));
                    if self.payments.open_modal(ModalKind::Credits).is_ok() {
                        let payments = self.payments.clone();
                        self.spawn("load_offerings", async move { payments.load_offerings().await });
                    }
                    return;
                }
                // Failures are reported by the generator itself
                let _ = self.generator.submit_prompt(&prompt, model, ratio);
            }
            UiEvent::Variation => {
                let _ = self.generator.variation();
            }
            UiEvent::ResetGeneration => {
                self.generator.reset();
                self.ui.ui_ctx.current_image = None;
            }
            UiEvent::DownloadImage => self.download_image(),
            UiEvent::ShareImage => match &self.ui.ui_ctx.current_image {
                Some(url) => {
                    ctx.copy_text(url.clone());
                    self.events
                        .notify(Notification::success("Image URL copied to clipboard"));
                }
                None => self.events.notify(Notification::error("No image to share yet")),
            },
            UiEvent::OpenLightbox(url) => self.ui.ui_ctx.lightbox = Some(url),
            UiEvent::CloseLightbox => self.ui.ui_ctx.lightbox = None,

            UiEvent::ShowGallery(owner) => {
                if owner == Owner::Personal && !self.auth.is_authenticated() {
                    self.gallery.prompt_login("Please log in to view your images");
                    return;
                }
                self.ui.ui_ctx.gallery_tab = owner;
                self.load_gallery(owner);
            }
            UiEvent::RefreshGallery(owner) => self.load_gallery(owner),
            UiEvent::SaveToPersonal(item) => self.save_to_personal(item),

            UiEvent::ShowLogin => self.push_event(AppEvent::LoginRequired),
            UiEvent::Login { username, password } => {
                let auth = self.auth.clone();
                self.spawn("login", async move {
                    auth.login(&username, &password).await.map(|_| ())
                });
            }
            UiEvent::Register {
                username,
                email,
                password,
            } => {
                let auth = self.auth.clone();
                self.spawn("register", async move {
                    auth.register(&username, &email, &password).await.map(|_| ())
                });
            }
            UiEvent::Logout => self.auth.logout(),

            UiEvent::OpenPayment(kind) => {
                if self.payments.open_modal(kind).is_ok() {
                    let payments = self.payments.clone();
                    self.spawn("load_offerings", async move { payments.load_offerings().await });
                }
            }
            UiEvent::ClosePayment => self.payments.close_modal(),
            UiEvent::SelectOffer(index) => self.payments.select(index),
            UiEvent::PurchaseCredits { payment_method } => {
                let payments = self.payments.clone();
                self.spawn("purchase_credits", async move {
                    payments
                        .purchase_credits(&CardDetails { payment_method })
                        .await
                });
            }
            UiEvent::Subscribe => {
                let payments = self.payments.clone();
                self.spawn("subscribe", async move { payments.subscribe().await });
            }

            UiEvent::DismissNotification(id) => self.notifications.dismiss(id),
        }
    }

    fn load_gallery(&self, owner: Owner) {
        let gallery = self.gallery.clone();
        match owner {
            Owner::Public => self.spawn("load_public", async move { gallery.load_public().await }),
            Owner::Personal => {
                self.spawn("load_personal", async move { gallery.load_personal().await })
            }
        }
    }

    fn save_to_personal(&self, item: GalleryItem) {
        let gallery = self.gallery.clone();
        self.spawn("save_to_personal", async move {
            gallery.save_to_personal(&item).await
        });
    }

    fn download_image(&self) {
        let Some(image) = self.generator.current_image() else {
            self.events
                .notify(Notification::error("No image to download yet"));
            return;
        };

        let events = self.events.clone();
        let extension = image.extension();
        let file_name = format!("aeaiou-{}.{}", Utc::now().timestamp_millis(), extension);
        self.runtime.spawn(async move {
            let Some(handle) = rfd::AsyncFileDialog::new()
                .set_title("Save Image")
                .set_file_name(&file_name)
                .add_filter("Image", &[extension])
                .save_file()
                .await
            else {
                debug!("Download cancelled");
                return;
            };

            match handle.write(image.encoded.as_slice()).await {
                Ok(()) => {
                    info!(path = %handle.path().display(), "Saved image");
                    events.notify(Notification::success("Image downloaded successfully"));
                }
                Err(e) => {
                    warn!("Failed to save image: {}", e);
                    events.notify_error(&AppError::Storage(e.to_string()));
                }
            }
        });
    }

    pub fn on_app_event(&mut self, ctx: &egui::Context, event: AppEvent) {
        self.ui.on_app_event(&event);

        match event {
            AppEvent::Notify(notification) => self.notifications.push(notification),
            AppEvent::SessionChanged(user) => {
                self.gallery.renderer().set_personalize(user.is_some());
                match user {
                    Some(user) => {
                        info!(username = %user.username, "Signed in");
                        let payments = self.payments.clone();
                        self.spawn("load_account", async move {
                            let (offers, credits) =
                                tokio::join!(payments.load_offerings(), payments.refresh_credits());
                            offers.and(credits.map(|_| ()))
                        });
                    }
                    None => {
                        info!("Signed out");
                        self.payments.clear();
                        if self.ui.ui_ctx.gallery_tab == Owner::Personal {
                            self.ui.ui_ctx.gallery_tab = Owner::Public;
                        }
                    }
                }
            }
            AppEvent::ThumbnailLoaded { url, result } => match result {
                Ok(image) => self.store_texture(ctx, &image),
                Err(e) => {
                    debug!(%url, "Thumbnail failed to load: {}", e);
                    self.ui
                        .ui_ctx
                        .textures
                        .insert(url, TextureSlot::Failed(e.to_string()));
                }
            },
            AppEvent::CreditsUpdated(balance) => {
                debug!(available = balance.available(), "Credit balance updated");
            }
            AppEvent::LoginRequired | AppEvent::GalleryUpdated(_) | AppEvent::PaymentsChanged => {}
        }
    }

    pub fn on_gen_event(&mut self, ctx: &egui::Context, event: GenEvent) {
        match event {
            GenEvent::Phase(phase) => {
                debug!(phase = %phase.label(), "Workflow phase changed");
                self.ui.ui_ctx.phase = phase;
            }
            GenEvent::ImageReady { item, image } => {
                self.store_texture(ctx, &image);
                self.ui.ui_ctx.current_image = Some(item.image_url);

                if self.auth.is_authenticated() {
                    let payments = self.payments.clone();
                    self.spawn("refresh_credits", async move {
                        payments.refresh_credits().await.map(|_| ())
                    });
                }
            }
        }
    }
}
