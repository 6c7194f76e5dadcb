pub mod api;
pub mod card;
pub mod images;
mod routes;
mod schemas;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use ae_core::credits::{PaymentIntentRequest, PaymentIntentResponse, SubscriptionRequest, SubscriptionResponse};
use ae_core::gallery::GalleryImage;
use ae_core::job::{ApiMessage, JobCreateResponse};
use ae_core::session::{AuthResponse, LoginRequest, RegisterRequest};
use ae_core::{CreditBalance, CreditPackage, GenerationRequest, JobStatusResponse, SubscriptionPlan, User};
use crate::config::AppConfig;
use self::api::{AuthApi, GalleryApi, GenerationApi, ImageUpload, PaymentsApi};
use self::schemas::GalleryListing;

/// Failure talking to the backend, before it is given a user-facing meaning
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP {status}")]
    Status { status: u16, message: Option<String> },
    #[error("{0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }

    /// Backend message when there is one, otherwise `fallback` with whatever
    /// detail is known
    pub fn describe(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { status, message: None } => format!("{} (HTTP {})", fallback, status),
            ApiError::Transport(detail) => format!("{}: {}", fallback, detail),
            ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// reqwest client for the aeaiou REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = http_client(config)?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        read_json(response).await
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        check_status(response).await.map(|_| ())
    }
}

fn http_client(config: &AppConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(concat!("aeaiou-desktop/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build the HTTP client")
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&body)
        .ok()
        .and_then(|m| m.text());
    debug!(status = status.as_u16(), "Backend returned an error status");

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl GenerationApi for ApiClient {
    async fn submit_job(&self, request: &GenerationRequest) -> Result<JobCreateResponse, ApiError> {
        Self::send(self.http.post(self.url(routes::GENERATE)).json(request)).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        Self::send(self.http.get(self.url(&routes::status(job_id)))).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest { username, password };
        Self::send(self.http.post(self.url(routes::LOGIN)).json(&body)).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        Self::send_empty(self.http.post(self.url(routes::REGISTER)).json(&body)).await
    }

    async fn whoami(&self, token: &str) -> Result<User, ApiError> {
        Self::send(self.http.get(self.url(routes::ME)).bearer_auth(token)).await
    }
}

#[async_trait]
impl GalleryApi for ApiClient {
    async fn public_gallery(&self) -> Result<Vec<GalleryImage>, ApiError> {
        let listing: GalleryListing = Self::send(self.http.get(self.url(routes::GALLERY))).await?;
        Ok(listing.into_images())
    }

    async fn user_images(&self, token: &str) -> Result<Vec<GalleryImage>, ApiError> {
        let listing: GalleryListing =
            Self::send(self.http.get(self.url(routes::USER_IMAGES)).bearer_auth(token)).await?;
        Ok(listing.into_images())
    }

    async fn upload_user_image(&self, token: &str, upload: ImageUpload) -> Result<(), ApiError> {
        let file = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("prompt", upload.prompt)
            .text("is_public", upload.is_public.to_string());

        Self::send_empty(
            self.http
                .post(self.url(routes::USER_IMAGES))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }
}

#[async_trait]
impl PaymentsApi for ApiClient {
    async fn credit_packages(&self, token: &str) -> Result<Vec<CreditPackage>, ApiError> {
        Self::send(self.http.get(self.url(routes::CREDIT_PACKAGES)).bearer_auth(token)).await
    }

    async fn subscription_plans(&self, token: &str) -> Result<Vec<SubscriptionPlan>, ApiError> {
        Self::send(self.http.get(self.url(routes::SUBSCRIPTION_PLANS)).bearer_auth(token)).await
    }

    async fn user_credits(&self, token: &str) -> Result<CreditBalance, ApiError> {
        Self::send(self.http.get(self.url(routes::USER_CREDITS)).bearer_auth(token)).await
    }

    async fn create_payment_intent(
        &self,
        token: &str,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ApiError> {
        Self::send(
            self.http
                .post(self.url(routes::PAYMENT_INTENT))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    async fn create_subscription(
        &self,
        token: &str,
        request: &SubscriptionRequest,
    ) -> Result<SubscriptionResponse, ApiError> {
        Self::send(
            self.http
                .post(self.url(routes::SUBSCRIPTIONS))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prefers_backend_message() {
        let err = ApiError::Status {
            status: 402,
            message: Some("Not enough credits".into()),
        };
        assert_eq!(err.describe("Failed to generate image"), "Not enough credits");
    }

    #[test]
    fn test_describe_fallbacks() {
        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(
            err.describe("Failed to generate image"),
            "Failed to generate image (HTTP 500)"
        );
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(
            err.describe("Failed to check job status"),
            "Failed to check job status: connection refused"
        );
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::Status { status: 401, message: None }.is_unauthorized());
        assert!(!ApiError::Transport("timeout".into()).is_unauthorized());
    }

    #[test]
    fn test_urls_join_base() {
        let config = AppConfig {
            api_base_url: "http://localhost:8000/api/v1/".into(),
            ..AppConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url(&routes::status("job_42")),
            "http://localhost:8000/api/v1/status/job_42"
        );
    }

    #[test]
    fn test_client_built_from_defaults() {
        let config = AppConfig::default();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url, config.api_base_url.trim_end_matches('/'));
        assert!(client.url(routes::LOGIN).starts_with("https://"));
    }
}
