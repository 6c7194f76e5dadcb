use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;
use crate::backend::ApiError;
use crate::backend::api::ImageLoader;
use crate::error::AppError;

/// A fetched image, decoded to RGBA for display and kept encoded for
/// download and re-upload
#[derive(Clone)]
pub struct LoadedImage {
    pub url: String,
    pub size: [usize; 2],
    pub rgba: Arc<Vec<u8>>,
    pub encoded: Arc<Vec<u8>>,
    pub mime: &'static str,
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("url", &self.url)
            .field("size", &self.size)
            .field("bytes", &self.encoded.len())
            .field("mime", &self.mime)
            .finish()
    }
}

impl PartialEq for LoadedImage {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.size == other.size && self.encoded == other.encoded
    }
}

impl LoadedImage {
    pub fn extension(&self) -> &'static str {
        match self.mime {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

pub fn decode(url: &str, bytes: Vec<u8>) -> Result<LoadedImage, AppError> {
    let mime = image::guess_format(&bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png");
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| AppError::ImageLoad(format!("Failed to decode the generated image: {}", e)))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];

    Ok(LoadedImage {
        url: url.to_string(),
        size,
        rgba: Arc::new(rgba.into_raw()),
        encoded: Arc::new(bytes),
        mime,
    })
}

pub struct HttpImageLoader {
    http: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: None,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<LoadedImage, AppError> {
        let bytes = self
            .fetch(url)
            .await
            .map_err(|e| AppError::ImageLoad(e.describe("Failed to fetch the generated image")))?;
        debug!(url, bytes = bytes.len(), "Fetched image");

        let url = url.to_string();
        tokio::task::spawn_blocking(move || decode(&url, bytes))
            .await
            .map_err(|e| AppError::ImageLoad(format!("Image decode task failed: {}", e)))?
    }
}
