use eframe::egui::Color32;
use ae_core::JobStatus;

/// What the generation area of the UI is doing right now
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Loading {
        job_id: Option<String>,
        status: Option<JobStatus>,
    },
    Displaying {
        image_url: String,
    },
}

impl WorkflowPhase {
    pub fn submitting() -> Self {
        Self::Loading {
            job_id: None,
            status: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn label(&self) -> String {
        match self {
            Self::Idle => "Ready".into(),
            Self::Loading { job_id: None, .. } => "Submitting...".into(),
            Self::Loading {
                status: Some(JobStatus::Completed),
                ..
            } => "Loading image...".into(),
            Self::Loading {
                status: Some(JobStatus::Processing),
                ..
            } => "Generating...".into(),
            Self::Loading { .. } => "Waiting in queue...".into(),
            Self::Displaying { .. } => "Done".into(),
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Self::Idle => Color32::GRAY,
            Self::Loading { status, .. } => status
                .as_ref()
                .map(status_color)
                .unwrap_or(Color32::LIGHT_BLUE),
            Self::Displaying { .. } => Color32::GREEN,
        }
    }
}

pub fn status_color(status: &JobStatus) -> Color32 {
    match status {
        JobStatus::Pending => Color32::GRAY,
        JobStatus::Processing => Color32::YELLOW,
        JobStatus::Completed => Color32::GREEN,
        JobStatus::Failed => Color32::RED,
        JobStatus::Unknown(_) => Color32::LIGHT_GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(WorkflowPhase::submitting().label(), "Submitting...");
        let polling = WorkflowPhase::Loading {
            job_id: Some("job_42".into()),
            status: Some(JobStatus::Processing),
        };
        assert!(polling.is_loading());
        assert_eq!(polling.label(), "Generating...");
        assert!(!WorkflowPhase::Idle.is_loading());
    }
}
