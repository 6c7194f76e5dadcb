use serde::{Deserialize, Serialize};

/// Server-side state of a generation job.
///
/// The backend sends plain strings; anything outside the four known values
/// is kept verbatim in `Unknown` so callers can log it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Pending => "⏳",
            Self::Processing => "⚡",
            Self::Completed => "✅",
            Self::Failed => "❌",
            Self::Unknown(_) => "❔",
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" | "queued" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Pending => "pending".into(),
            JobStatus::Processing => "processing".into(),
            JobStatus::Completed => "completed".into(),
            JobStatus::Failed => "failed".into(),
            JobStatus::Unknown(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobCreateResponse {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobResult {
    pub image_url: String,
}

/// Read-only projection of a job returned by `GET /status/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JobStatusResponse {
    pub fn image_url(&self) -> Option<&str> {
        self.result
            .as_ref()
            .map(|r| r.image_url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Backend-provided explanation, preferring `error` over `message`
    pub fn failure_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Error body the backend sends with non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiMessage {
    pub fn text(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.trim().is_empty()) {
            return Some(message.clone());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}
