pub mod storage;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};
use ae_core::{Session, User, ValidationError};
use crate::backend::api::AuthApi;
use crate::error::AppError;
use crate::events::{AppEvent, EventProxy};
use crate::notifications::Notification;
use self::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "aeaiou_auth_token";
pub const USER_KEY: &str = "aeaiou_user";

struct Inner {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStore>,
    events: EventProxy,
    session: RwLock<Option<Session>>,
}

/// Owns the current session and mirrors it into durable storage
#[derive(Clone)]
pub struct AuthManager {
    inner: Arc<Inner>,
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

impl AuthManager {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn KeyValueStore>, events: EventProxy) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                storage,
                events,
                session: RwLock::new(None),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().as_ref().is_some_and(|s| !s.token.is_empty())
    }

    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let result = self.try_login(username, password).await;
        match &result {
            Ok(user) => self
                .inner
                .events
                .notify(Notification::success(format!("Logged in as {}", user.username))),
            Err(err) => self.inner.events.notify_error(err),
        }
        result
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = required(username, "Username")?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }

        let response = self
            .inner
            .api
            .login(username, password)
            .await
            .map_err(|e| AppError::Auth(e.describe("Login failed")))?;
        let session = Session::from(response);
        let user = session.user.clone();

        self.store(&session);
        *self.write() = Some(session);
        info!(username = user.username.as_str(), "Logged in");
        self.inner
            .events
            .push_app(AppEvent::SessionChanged(Some(user.clone())));
        Ok(user)
    }

    /// Creates the account, then signs in with the same credentials
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        if let Err(err) = self.try_register(username, email, password).await {
            self.inner.events.notify_error(&err);
            return Err(err);
        }
        info!("Registered new account");
        self.login(username, password).await
    }

    async fn try_register(&self, username: &str, email: &str, password: &str) -> Result<(), AppError> {
        let username = required(username, "Username")?;
        let email = required(email, "Email")?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }
        self.inner
            .api
            .register(username, email, password)
            .await
            .map_err(|e| AppError::Auth(e.describe("Registration failed")))
    }

    /// Picks up a persisted session and checks it is still accepted.
    /// Anything that cannot be revalidated is logged out.
    pub async fn restore_session(&self) -> bool {
        let Some(token) = self.inner.storage.get(TOKEN_KEY) else {
            return false;
        };
        let stored_user = self
            .inner
            .storage
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Stored user is unreadable: {}", e);
                    None
                }
            });
        if stored_user.is_none() {
            self.logout();
            return false;
        }

        match self.inner.api.whoami(&token).await {
            Ok(user) => {
                let session = Session { token, user };
                self.store(&session);
                let user = session.user.clone();
                *self.write() = Some(session);
                info!(username = user.username.as_str(), "Session restored");
                self.inner
                    .events
                    .push_app(AppEvent::SessionChanged(Some(user)));
                true
            }
            Err(e) => {
                warn!("Stored session rejected: {}", e.describe("Session check failed"));
                self.logout();
                false
            }
        }
    }

    /// Forgets the session in memory and on disk. Safe to call repeatedly.
    pub fn logout(&self) {
        let previous = self.write().take();

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.inner.storage.remove(key) {
                warn!(key, "Failed to clear stored session: {}", e);
            }
        }

        if previous.is_some() {
            info!("Logged out");
            self.inner.events.push_app(AppEvent::SessionChanged(None));
        }
    }

    fn store(&self, session: &Session) {
        let stored = serde_json::to_string(&session.user)
            .map_err(AppError::from)
            .and_then(|user| {
                self.inner.storage.set(TOKEN_KEY, &session.token)?;
                self.inner.storage.set(USER_KEY, &user)
            });
        if let Err(e) = stored {
            warn!("Session kept for this run only: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use ae_core::session::{AuthResponse, UserId};
    use crate::backend::ApiError;
    use super::storage::{FileStorage, MemoryStorage};

    fn fox() -> User {
        User {
            id: UserId::Number(7),
            username: "fox".into(),
            email: "fox@example.com".into(),
        }
    }

    struct FakeAuth {
        valid_token: &'static str,
        registered: Mutex<Vec<String>>,
        whoami_calls: AtomicUsize,
    }

    impl FakeAuth {
        fn new(valid_token: &'static str) -> Arc<Self> {
            Arc::new(Self {
                valid_token,
                registered: Mutex::new(Vec::new()),
                whoami_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
            if username == "fox" && password == "hunter2" {
                return Ok(AuthResponse {
                    token: self.valid_token.into(),
                    user: fox(),
                });
            }
            Err(ApiError::Status {
                status: 401,
                message: Some("Invalid username or password".into()),
            })
        }

        async fn register(&self, username: &str, _email: &str, _password: &str) -> Result<(), ApiError> {
            self.registered.lock().unwrap().push(username.to_string());
            Ok(())
        }

        async fn whoami(&self, token: &str) -> Result<User, ApiError> {
            self.whoami_calls.fetch_add(1, Ordering::SeqCst);
            if token == self.valid_token {
                Ok(fox())
            } else {
                Err(ApiError::Status {
                    status: 401,
                    message: None,
                })
            }
        }
    }

    fn manager(api: Arc<FakeAuth>, storage: Arc<dyn KeyValueStore>) -> AuthManager {
        let (events, _rx) = EventProxy::channel();
        AuthManager::new(api, storage, events)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let storage = Arc::new(MemoryStorage::default());
        let auth = manager(FakeAuth::new("tok_1"), storage.clone());

        let user = auth.login("fox", "hunter2").await.unwrap();

        assert_eq!(user, fox());
        assert!(auth.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok_1"));
        let stored: User = serde_json::from_str(&storage.get(USER_KEY).unwrap()).unwrap();
        assert_eq!(stored, fox());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(TOKEN_KEY, "old").unwrap();
        let auth = manager(FakeAuth::new("tok_1"), storage.clone());

        let err = auth.login("fox", "wrong").await.unwrap_err();

        assert_eq!(err, AppError::Auth("Invalid username or password".into()));
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_blank_username_is_validation_error() {
        let auth = manager(FakeAuth::new("tok_1"), Arc::new(MemoryStorage::default()));
        let err = auth.login("  ", "hunter2").await.unwrap_err();
        assert_eq!(err, AppError::Validation(ValidationError::MissingField("Username")));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let api = FakeAuth::new("tok_1");
        let auth = manager(api.clone(), Arc::new(MemoryStorage::default()));

        auth.register("fox", "fox@example.com", "hunter2").await.unwrap();

        assert_eq!(*api.registered.lock().unwrap(), vec!["fox".to_string()]);
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let storage = Arc::new(MemoryStorage::default());
        let auth = manager(FakeAuth::new("tok_1"), storage.clone());
        auth.login("fox", "hunter2").await.unwrap();

        auth.logout();
        auth.logout();

        assert!(!auth.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
            let auth = manager(FakeAuth::new("tok_1"), storage);
            auth.login("fox", "hunter2").await.unwrap();
        }

        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let auth = manager(FakeAuth::new("tok_1"), storage);
        assert!(auth.restore_session().await);
        assert_eq!(auth.user(), Some(fox()));
        assert_eq!(auth.token().as_deref(), Some("tok_1"));
    }

    #[tokio::test]
    async fn test_restore_with_revoked_token_logs_out() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(TOKEN_KEY, "revoked").unwrap();
        storage
            .set(USER_KEY, &serde_json::to_string(&fox()).unwrap())
            .unwrap();
        let auth = manager(FakeAuth::new("tok_1"), storage.clone());

        assert!(!auth.restore_session().await);
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_with_corrupt_user_skips_network() {
        let api = FakeAuth::new("tok_1");
        let storage = Arc::new(MemoryStorage::default());
        storage.set(TOKEN_KEY, "tok_1").unwrap();
        storage.set(USER_KEY, "not json").unwrap();
        let auth = manager(api.clone(), storage.clone());

        assert!(!auth.restore_session().await);
        assert_eq!(api.whoami_calls.load(Ordering::SeqCst), 0);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_announces_session_once() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(TOKEN_KEY, "tok_1").unwrap();
        storage.set(USER_KEY, &serde_json::to_string(&fox()).unwrap()).unwrap();
        let (events, mut rx) = EventProxy::channel();
        let auth = AuthManager::new(FakeAuth::new("tok_1"), storage, events);

        assert!(auth.restore_session().await);

        let mut announced = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let crate::events::AeEvent::App(AppEvent::SessionChanged(user)) = event {
                announced.push(user);
            }
        }
        assert_eq!(announced, vec![Some(fox())]);
    }
}
