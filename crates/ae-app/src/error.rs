use thiserror::Error;
use ae_core::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Submission(String),
    #[error("{0}")]
    Poll(String),
    #[error("{0}")]
    Generation(String),
    #[error("{0}")]
    ImageLoad(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Gallery(String),
    #[error("{0}")]
    Payment(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Text shown in the notification toast
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            other => format!("Error: {}", other),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        assert_eq!(
            AppError::from(ValidationError::EmptyPrompt).user_message(),
            "Please enter a prompt"
        );
        assert_eq!(
            AppError::Generation("Image generation failed".into()).user_message(),
            "Error: Image generation failed"
        );
    }
}
