use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use ae_core::{GalleryItem, Owner};
use crate::auth::AuthManager;
use crate::backend::api::{GalleryApi, ImageLoader, ImageUpload};
use crate::error::AppError;
use crate::events::{AppEvent, EventProxy};
use crate::notifications::Notification;

pub const PUBLIC_PLACEHOLDER: &str = "No images in the gallery yet";
pub const PERSONAL_PLACEHOLDER: &str = "You haven't saved any images yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    View,
    SaveToPersonal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryCard {
    pub item: GalleryItem,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContainerState {
    #[default]
    Loading,
    Empty(String),
    Error(String),
    Cards(Vec<GalleryCard>),
}

impl ContainerState {
    pub fn cards(&self) -> &[GalleryCard] {
        match self {
            ContainerState::Cards(cards) => cards,
            _ => &[],
        }
    }
}

fn placeholder(owner: Owner) -> &'static str {
    match owner {
        Owner::Public => PUBLIC_PLACEHOLDER,
        Owner::Personal => PERSONAL_PLACEHOLDER,
    }
}

fn card(item: GalleryItem, personalize: bool) -> GalleryCard {
    let mut actions = vec![CardAction::View];
    if personalize && item.owner == Owner::Public {
        actions.push(CardAction::SaveToPersonal);
    }
    GalleryCard { item, actions }
}

#[derive(Default)]
struct RendererState {
    containers: HashMap<Owner, ContainerState>,
    personalize: bool,
}

/// Holds what each gallery container currently shows. The UI reads
/// snapshots every frame.
#[derive(Clone, Default)]
pub struct GalleryRenderer {
    state: Arc<Mutex<RendererState>>,
}

impl GalleryRenderer {
    fn lock(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the container with one card per item, newest first
    pub fn render(&self, owner: Owner, mut items: Vec<GalleryItem>) {
        let mut state = self.lock();
        let personalize = state.personalize;
        let content = if items.is_empty() {
            ContainerState::Empty(placeholder(owner).to_string())
        } else {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            ContainerState::Cards(items.into_iter().map(|item| card(item, personalize)).collect())
        };
        state.containers.insert(owner, content);
    }

    pub fn render_error(&self, owner: Owner, message: impl Into<String>) {
        self.lock()
            .containers
            .insert(owner, ContainerState::Error(message.into()));
    }

    pub fn set_loading(&self, owner: Owner) {
        self.lock().containers.insert(owner, ContainerState::Loading);
    }

    /// Puts a freshly generated image at the front of its container
    pub fn prepend(&self, item: GalleryItem) {
        let mut state = self.lock();
        let personalize = state.personalize;
        let owner = item.owner;
        let new_card = card(item, personalize);

        let container = state.containers.entry(owner).or_default();
        match container {
            ContainerState::Cards(cards) => cards.insert(0, new_card),
            other => *other = ContainerState::Cards(vec![new_card]),
        }
    }

    /// Toggles the save action on public cards, following the session
    pub fn set_personalize(&self, personalize: bool) {
        let mut state = self.lock();
        if state.personalize == personalize {
            return;
        }
        state.personalize = personalize;
        for cards in state.containers.values_mut().filter_map(|c| match c {
            ContainerState::Cards(cards) => Some(cards),
            _ => None,
        }) {
            for entry in cards.iter_mut() {
                *entry = card(entry.item.clone(), personalize);
            }
        }
    }

    pub fn snapshot(&self, owner: Owner) -> ContainerState {
        self.lock().containers.get(&owner).cloned().unwrap_or_default()
    }
}

/// Fetches gallery listings into the renderer and saves images to the
/// signed-in user's collection
#[derive(Clone)]
pub struct GalleryService {
    api: Arc<dyn GalleryApi>,
    loader: Arc<dyn ImageLoader>,
    auth: AuthManager,
    renderer: GalleryRenderer,
    events: EventProxy,
}

impl GalleryService {
    pub fn new(
        api: Arc<dyn GalleryApi>,
        loader: Arc<dyn ImageLoader>,
        auth: AuthManager,
        renderer: GalleryRenderer,
        events: EventProxy,
    ) -> Self {
        Self {
            api,
            loader,
            auth,
            renderer,
            events,
        }
    }

    pub fn renderer(&self) -> &GalleryRenderer {
        &self.renderer
    }

    pub async fn load_public(&self) -> Result<(), AppError> {
        self.renderer.set_personalize(self.auth.is_authenticated());
        self.renderer.set_loading(Owner::Public);

        match self.api.public_gallery().await {
            Ok(images) => {
                debug!(count = images.len(), "Loaded public gallery");
                let items = images.into_iter().map(|img| img.into_item(Owner::Public)).collect();
                self.renderer.render(Owner::Public, items);
                self.events.push_app(AppEvent::GalleryUpdated(Owner::Public));
                Ok(())
            }
            Err(e) => {
                let err = AppError::Gallery(e.describe("Failed to load gallery"));
                warn!("{}", err);
                self.renderer.render_error(Owner::Public, err.to_string());
                self.events.push_app(AppEvent::GalleryUpdated(Owner::Public));
                Err(err)
            }
        }
    }

    /// Requires a session. Without one the user is asked to log in and
    /// nothing is fetched.
    pub async fn load_personal(&self) -> Result<(), AppError> {
        let Some(token) = self.auth.token() else {
            let message = "Please log in to view your images";
            self.prompt_login(message);
            return Err(AppError::Auth(message.into()));
        };
        self.renderer.set_loading(Owner::Personal);

        match self.api.user_images(&token).await {
            Ok(images) => {
                debug!(count = images.len(), "Loaded personal images");
                let items = images
                    .into_iter()
                    .map(|img| img.into_item(Owner::Personal))
                    .collect();
                self.renderer.render(Owner::Personal, items);
                self.events.push_app(AppEvent::GalleryUpdated(Owner::Personal));
                Ok(())
            }
            Err(e) => {
                let err = AppError::Gallery(e.describe("Failed to load your images"));
                warn!("{}", err);
                self.renderer.render_error(Owner::Personal, err.to_string());
                self.events.push_app(AppEvent::GalleryUpdated(Owner::Personal));
                if e.is_unauthorized() {
                    self.auth.logout();
                }
                Err(err)
            }
        }
    }

    /// Copies an image into the user's collection as a private upload
    pub async fn save_to_personal(&self, item: &GalleryItem) -> Result<(), AppError> {
        let Some(token) = self.auth.token() else {
            let message = "Please log in to save images";
            self.prompt_login(message);
            return Err(AppError::Auth(message.into()));
        };

        let result = self.upload(&token, item).await;
        match &result {
            Ok(()) => {
                info!(url = item.image_url.as_str(), "Saved image to personal gallery");
                self.events
                    .notify(Notification::success("Image saved to your gallery"));
                // a failed reload is rendered in the container itself
                let _ = self.load_personal().await;
            }
            Err(err) => self.events.notify_error(err),
        }
        result
    }

    async fn upload(&self, token: &str, item: &GalleryItem) -> Result<(), AppError> {
        let image = self.loader.load(&item.image_url).await?;
        let upload = ImageUpload {
            bytes: image.encoded.as_ref().clone(),
            file_name: format!("aeaiou-{}.{}", item.created_at.timestamp_millis(), image.extension()),
            mime: image.mime,
            prompt: item.prompt.clone(),
            is_public: false,
        };
        self.api
            .upload_user_image(token, upload)
            .await
            .map_err(|e| AppError::Gallery(e.describe("Failed to save image")))
    }

    pub fn prompt_login(&self, message: &str) {
        self.events.push_app(AppEvent::LoginRequired);
        self.events.notify(Notification::info(message));
    }
}
