use async_trait::async_trait;
use ae_core::credits::{PaymentIntentRequest, PaymentIntentResponse, SubscriptionRequest, SubscriptionResponse};
use ae_core::gallery::GalleryImage;
use ae_core::job::JobCreateResponse;
use ae_core::session::AuthResponse;
use ae_core::{CreditBalance, CreditPackage, GenerationRequest, JobStatusResponse, SubscriptionPlan, User};
use crate::backend::ApiError;
use crate::backend::images::LoadedImage;
use crate::error::AppError;

#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn submit_job(&self, request: &GenerationRequest) -> Result<JobCreateResponse, ApiError>;
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError>;
    async fn whoami(&self, token: &str) -> Result<User, ApiError>;
}

/// Image file sent to `POST /user-images`
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
    pub prompt: String,
    pub is_public: bool,
}

#[async_trait]
pub trait GalleryApi: Send + Sync {
    async fn public_gallery(&self) -> Result<Vec<GalleryImage>, ApiError>;
    async fn user_images(&self, token: &str) -> Result<Vec<GalleryImage>, ApiError>;
    async fn upload_user_image(&self, token: &str, upload: ImageUpload) -> Result<(), ApiError>;
}

#[async_trait]
pub trait PaymentsApi: Send + Sync {
    async fn credit_packages(&self, token: &str) -> Result<Vec<CreditPackage>, ApiError>;
    async fn subscription_plans(&self, token: &str) -> Result<Vec<SubscriptionPlan>, ApiError>;
    async fn user_credits(&self, token: &str) -> Result<CreditBalance, ApiError>;
    async fn create_payment_intent(
        &self,
        token: &str,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ApiError>;
    async fn create_subscription(
        &self,
        token: &str,
        request: &SubscriptionRequest,
    ) -> Result<SubscriptionResponse, ApiError>;
}

/// Fetches and decodes an image so it can be shown or re-uploaded
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<LoadedImage, AppError>;
}

/// Card details as entered in the payment modal. Tokenization stays with the
/// payment provider, so only an already-issued payment method id is carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDetails {
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub status: String,
    pub error: Option<String>,
}

impl PaymentConfirmation {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.status == "succeeded"
    }
}

/// Third-party card confirmation step of a payment intent
#[async_trait]
pub trait CardConfirmation: Send + Sync {
    async fn confirm(
        &self,
        intent: &PaymentIntentResponse,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, ApiError>;
}
