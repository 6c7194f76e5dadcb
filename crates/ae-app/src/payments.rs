use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use ae_core::credits::{PaymentIntentRequest, SubscriptionRequest};
use ae_core::{CreditBalance, CreditPackage, SubscriptionPlan, ValidationError};
use crate::auth::AuthManager;
use crate::backend::api::{CardConfirmation, CardDetails, PaymentsApi};
use crate::error::AppError;
use crate::events::{AppEvent, EventProxy};
use crate::notifications::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Credits,
    Subscription,
}

impl ModalKind {
    pub fn title(&self) -> &'static str {
        match self {
            ModalKind::Credits => "Buy Credits",
            ModalKind::Subscription => "Subscribe",
        }
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            ModalKind::Credits => "Pay",
            ModalKind::Subscription => "Subscribe",
        }
    }

    /// Only credit purchases confirm a card; subscriptions are settled by the backend.
    pub fn takes_payment_method(&self) -> bool {
        matches!(self, ModalKind::Credits)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentModal {
    pub kind: Option<ModalKind>,
    pub selected: Option<usize>,
    pub submitting: bool,
    pub error: Option<String>,
}

impl PaymentModal {
    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }
}

/// Everything the payment UI draws, copied out once per frame
#[derive(Debug, Clone, Default)]
pub struct PaymentSnapshot {
    pub packages: Vec<CreditPackage>,
    pub plans: Vec<SubscriptionPlan>,
    pub balance: Option<CreditBalance>,
    pub modal: PaymentModal,
    pub subscribed: Option<String>,
}

impl PaymentSnapshot {
    /// Signed-in users with a known balance of zero cannot generate
    pub fn can_generate(&self) -> bool {
        self.balance.as_ref().is_none_or(CreditBalance::can_generate)
    }
}

#[derive(Default)]
struct PaymentState {
    /// Token the cached offerings were fetched with
    offers_for: Option<String>,
    packages: Vec<CreditPackage>,
    plans: Vec<SubscriptionPlan>,
    balance: Option<CreditBalance>,
    modal: PaymentModal,
    subscribed: Option<String>,
}

enum Purchase {
    Credits(CreditPackage),
    Subscription(SubscriptionPlan),
}

#[derive(Clone)]
pub struct PaymentController {
    api: Arc<dyn PaymentsApi>,
    card: Arc<dyn CardConfirmation>,
    auth: AuthManager,
    events: EventProxy,
    state: Arc<Mutex<PaymentState>>,
    /// Held across the offerings fetch so concurrent loads share one request
    offers_gate: Arc<tokio::sync::Mutex<()>>,
}

impl PaymentController {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        card: Arc<dyn CardConfirmation>,
        auth: AuthManager,
        events: EventProxy,
    ) -> Self {
        Self {
            api,
            card,
            auth,
            events,
            state: Arc::new(Mutex::new(PaymentState::default())),
            offers_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PaymentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn changed(&self) {
        self.events.push_app(AppEvent::PaymentsChanged);
    }

    fn require_token(&self, message: &str) -> Result<String, AppError> {
        self.auth.token().ok_or_else(|| {
            self.events.push_app(AppEvent::LoginRequired);
            AppError::Auth(message.to_string())
        })
    }

    pub fn snapshot(&self) -> PaymentSnapshot {
        let state = self.lock();
        PaymentSnapshot {
            packages: state.packages.clone(),
            plans: state.plans.clone(),
            balance: state.balance,
            modal: state.modal.clone(),
            subscribed: state.subscribed.clone(),
        }
    }

    /// Fetches packages and plans once per session token
    pub async fn load_offerings(&self) -> Result<(), AppError> {
        let token = self.require_token("Please log in to see credit packages")?;
        let _gate = self.offers_gate.lock().await;
        if self.lock().offers_for.as_deref() == Some(token.as_str()) {
            debug!("Payment offerings already cached");
            return Ok(());
        }

        let (packages, plans) = tokio::join!(
            self.api.credit_packages(&token),
            self.api.subscription_plans(&token)
        );
        let (packages, plans) = match (packages, plans) {
            (Ok(packages), Ok(plans)) => (packages, plans),
            (Err(e), _) | (_, Err(e)) => {
                let err = AppError::Payment(e.describe("Failed to load payment options"));
                warn!("{}", err);
                self.events.notify_error(&err);
                return Err(err);
            }
        };

        debug!(packages = packages.len(), plans = plans.len(), "Loaded payment offerings");
        {
            let mut state = self.lock();
            state.packages = packages;
            state.plans = plans;
            state.offers_for = Some(token);
        }
        self.changed();
        Ok(())
    }

    pub async fn refresh_credits(&self) -> Result<CreditBalance, AppError> {
        let token = self.require_token("Please log in to see your credits")?;
        let balance = self
            .api
            .user_credits(&token)
            .await
            .map_err(|e| AppError::Payment(e.describe("Failed to load credits")))?;

        debug!(available = balance.available(), "Credit balance updated");
        self.lock().balance = Some(balance);
        self.events.push_app(AppEvent::CreditsUpdated(balance));
        Ok(balance)
    }

    pub fn open_modal(&self, kind: ModalKind) -> Result<(), AppError> {
        if !self.auth.is_authenticated() {
            let err = AppError::Auth("Please log in to purchase credits".into());
            self.events.push_app(AppEvent::LoginRequired);
            self.events.notify(Notification::info(err.to_string()));
            return Err(err);
        }
        self.lock().modal = PaymentModal {
            kind: Some(kind),
            ..PaymentModal::default()
        };
        self.changed();
        Ok(())
    }

    pub fn close_modal(&self) {
        self.lock().modal = PaymentModal::default();
        self.changed();
    }

    pub fn select(&self, index: usize) {
        let mut state = self.lock();
        let available = match state.modal.kind {
            Some(ModalKind::Credits) => state.packages.len(),
            Some(ModalKind::Subscription) => state.plans.len(),
            None => 0,
        };
        if index < available && !state.modal.submitting {
            state.modal.selected = Some(index);
            state.modal.error = None;
        }
    }

    /// Picks the selected offering and marks the modal busy. Only one
    /// purchase can be in flight.
    fn begin(&self, kind: ModalKind) -> Result<Purchase, AppError> {
        let mut state = self.lock();
        if state.modal.kind != Some(kind) {
            return Err(ValidationError::NothingSelected.into());
        }
        if state.modal.submitting {
            return Err(AppError::Payment("A payment is already being processed".into()));
        }

        let index = state.modal.selected;
        let purchase = match kind {
            ModalKind::Credits => index
                .and_then(|i| state.packages.get(i).cloned())
                .map(Purchase::Credits),
            ModalKind::Subscription => index
                .and_then(|i| state.plans.get(i).cloned())
                .map(Purchase::Subscription),
        };
        let Some(purchase) = purchase else {
            let err = AppError::from(ValidationError::NothingSelected);
            state.modal.error = Some(err.to_string());
            return Err(err);
        };

        state.modal.submitting = true;
        state.modal.error = None;
        Ok(purchase)
    }

    fn fail(&self, err: &AppError) {
        warn!("Payment failed: {}", err);
        {
            let mut state = self.lock();
            state.modal.submitting = false;
            state.modal.error = Some(err.to_string());
        }
        self.changed();
        self.events.notify_error(err);
    }

    async fn succeed(&self, message: String) {
        if let Err(e) = self.refresh_credits().await {
            warn!("Credits not refreshed after payment: {}", e);
        }
        self.close_modal();
        info!("{}", message);
        self.events.notify(Notification::success(message));
    }

    pub async fn purchase_credits(&self, card: &CardDetails) -> Result<(), AppError> {
        if card.payment_method.trim().is_empty() {
            let err = AppError::from(ValidationError::MissingField("Payment method"));
            self.lock().modal.error = Some(err.to_string());
            self.changed();
            return Err(err);
        }
        let token = self.require_token("Please log in to purchase credits")?;
        let package = match self.begin(ModalKind::Credits)? {
            Purchase::Credits(package) => package,
            Purchase::Subscription(_) => return Err(ValidationError::NothingSelected.into()),
        };
        self.changed();

        match self.charge(&token, &package, card).await {
            Ok(()) => {
                self.succeed(format!("Purchased {} credits", package.credits)).await;
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn charge(&self, token: &str, package: &CreditPackage, card: &CardDetails) -> Result<(), AppError> {
        let intent = self
            .api
            .create_payment_intent(token, &PaymentIntentRequest::for_package(package))
            .await
            .map_err(|e| AppError::Payment(e.describe("Failed to start payment")))?;

        let confirmation = self
            .card
            .confirm(&intent, card)
            .await
            .map_err(|e| AppError::Payment(e.describe("Payment failed")))?;
        if !confirmation.succeeded() {
            let message = confirmation
                .error
                .unwrap_or_else(|| format!("Payment not completed ({})", confirmation.status));
            return Err(AppError::Payment(message));
        }
        Ok(())
    }

    pub async fn subscribe(&self) -> Result<(), AppError> {
        let token = self.require_token("Please log in to subscribe")?;
        let plan = match self.begin(ModalKind::Subscription)? {
            Purchase::Subscription(plan) => plan,
            Purchase::Credits(_) => return Err(ValidationError::NothingSelected.into()),
        };
        self.changed();

        let response = self
            .api
            .create_subscription(&token, &SubscriptionRequest::for_plan(&plan))
            .await;
        match response {
            Ok(subscription) => {
                let name = subscription.plan.name;
                self.lock().subscribed = Some(name.clone());
                self.succeed(format!("Subscribed to the {} plan", name)).await;
                Ok(())
            }
            Err(e) => {
                let err = AppError::Payment(e.describe("Failed to create subscription"));
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Drops everything tied to the previous session
    pub fn clear(&self) {
        *self.lock() = PaymentState::default();
        self.changed();
    }
}
