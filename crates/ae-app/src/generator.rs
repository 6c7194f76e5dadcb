use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use ae_core::{AspectRatio, GalleryItem, GenerationRequest, JobStatus, ModelType, Owner, ValidationError};
use crate::backend::api::{GenerationApi, ImageLoader};
use crate::backend::images::LoadedImage;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::events::{EventProxy, GenEvent};
use crate::gallery::GalleryRenderer;
use crate::job::WorkflowPhase;
use crate::notifications::Notification;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl From<&AppConfig> for PollSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }
    }
}

#[derive(Debug, Clone)]
struct CurrentJob {
    id: Option<String>,
    request: GenerationRequest,
}

#[derive(Default)]
struct WorkflowState {
    phase: WorkflowPhase,
    current_job: Option<CurrentJob>,
    current_image: Option<LoadedImage>,
    polls: HashMap<String, watch::Sender<bool>>,
    /// Bumped on every submit and reset so late results of an abandoned
    /// generation are dropped
    epoch: u64,
}

enum PollOutcome {
    Completed(String),
    Failed(AppError),
}

struct Inner {
    api: Arc<dyn GenerationApi>,
    loader: Arc<dyn ImageLoader>,
    gallery: GalleryRenderer,
    events: EventProxy,
    settings: PollSettings,
    runtime: Handle,
    state: Mutex<WorkflowState>,
}

/// Drives one generation from submission through polling to display.
/// Cheap to clone, all clones share the same workflow.
#[derive(Clone)]
pub struct Generator {
    inner: Arc<Inner>,
}

impl Generator {
    pub fn new(
        api: Arc<dyn GenerationApi>,
        loader: Arc<dyn ImageLoader>,
        gallery: GalleryRenderer,
        events: EventProxy,
        settings: PollSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                loader,
                gallery,
                events,
                settings,
                runtime,
                state: Mutex::new(WorkflowState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorkflowState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state().phase.clone()
    }

    pub fn current_image(&self) -> Option<LoadedImage> {
        self.state().current_image.clone()
    }

    pub fn current_request(&self) -> Option<GenerationRequest> {
        self.state().current_job.as_ref().map(|job| job.request.clone())
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        self.state().polls.contains_key(job_id)
    }

    pub fn active_polls(&self) -> usize {
        self.state().polls.len()
    }

    /// Validates the form input and submits it. Validation failures are
    /// reported to the user and never reach the network.
    pub fn submit_prompt(
        &self,
        prompt: &str,
        model: ModelType,
        ratio: AspectRatio,
    ) -> Result<JoinHandle<Result<String, AppError>>, AppError> {
        let submitted = GenerationRequest::new(prompt, model, ratio)
            .map_err(AppError::from)
            .and_then(|request| self.submit(request));

        if let Err(err) = &submitted {
            warn!("Generation not submitted: {}", err);
            self.inner.events.notify_error(err);
        }
        submitted
    }

    /// Resubmits the current request with a variation marker on the prompt
    pub fn variation(&self) -> Result<JoinHandle<Result<String, AppError>>, AppError> {
        let request = self
            .current_request()
            .ok_or(ValidationError::EmptyPrompt)?
            .variation();
        self.inner
            .events
            .notify(Notification::info("Creating a variation of this image..."));

        let submitted = self.submit(request);
        if let Err(err) = &submitted {
            self.inner.events.notify_error(err);
        }
        submitted
    }

    /// Enters `Loading` before returning, then posts the request and polls
    /// the resulting job in the background. The task resolves to the job id.
    pub fn submit(
        &self,
        request: GenerationRequest,
    ) -> Result<JoinHandle<Result<String, AppError>>, AppError> {
        let epoch = {
            let mut state = self.state();
            if state.phase.is_loading() {
                return Err(ValidationError::GenerationInProgress.into());
            }
            state.epoch += 1;
            state.phase = WorkflowPhase::submitting();
            state.current_job = Some(CurrentJob {
                id: None,
                request: request.clone(),
            });
            state.epoch
        };
        self.emit_phase(WorkflowPhase::submitting());

        info!(
            model = request.model_type().id(),
            ratio = request.aspect_ratio().as_str(),
            "Submitting generation"
        );

        let this = self.clone();
        Ok(self
            .inner
            .runtime
            .spawn(async move { this.run_submission(epoch, request).await }))
    }

    async fn run_submission(&self, epoch: u64, request: GenerationRequest) -> Result<String, AppError> {
        let job_id = match self.inner.api.submit_job(&request).await {
            Ok(created) => created.job_id,
            Err(e) => {
                let err = AppError::Submission(e.describe("Failed to generate image"));
                self.fail(epoch, &err);
                return Err(err);
            }
        };
        info!(%job_id, "Generation job accepted");

        let phase = {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!(%job_id, "Generation was reset before the job was accepted");
                return Ok(job_id);
            }
            if let Some(job) = state.current_job.as_mut() {
                job.id = Some(job_id.clone());
            }
            state.phase = WorkflowPhase::Loading {
                job_id: Some(job_id.clone()),
                status: Some(JobStatus::Pending),
            };
            state.phase.clone()
        };
        self.emit_phase(phase);

        self.poll(&job_id);
        Ok(job_id)
    }

    /// Starts polling `job_id` unless it is already being polled.
    /// Returns whether a new polling task was started.
    pub fn poll(&self, job_id: &str) -> bool {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let epoch = {
            let mut state = self.state();
            if state.polls.contains_key(job_id) {
                debug!(%job_id, "Already polling job");
                return false;
            }
            state.polls.insert(job_id.to_string(), cancel_tx);
            state.epoch
        };

        let this = self.clone();
        let job_id = job_id.to_string();
        self.inner
            .runtime
            .spawn(async move { this.poll_loop(epoch, job_id, cancel_rx).await });
        true
    }

    async fn poll_loop(self, epoch: u64, job_id: String, mut cancel: watch::Receiver<bool>) {
        let PollSettings {
            interval,
            max_attempts,
        } = self.inner.settings;
        let mut attempts = 0u32;

        let outcome = loop {
            if attempts >= max_attempts {
                break PollOutcome::Failed(AppError::Poll(format!(
                    "Timed out waiting for the image after {} status checks",
                    attempts
                )));
            }
            attempts += 1;

            let response = self.inner.api.job_status(&job_id).await;
            if *cancel.borrow() {
                debug!(%job_id, "Polling cancelled");
                return;
            }

            match response {
                Ok(status) => match &status.status {
                    JobStatus::Completed => match status.image_url() {
                        Some(url) => {
                            self.update_status(epoch, &job_id, JobStatus::Completed);
                            break PollOutcome::Completed(url.to_string());
                        }
                        None => {
                            break PollOutcome::Failed(AppError::Generation(
                                "Job completed without an image".into(),
                            ));
                        }
                    },
                    JobStatus::Failed => {
                        let message = status
                            .failure_message()
                            .unwrap_or("Image generation failed")
                            .to_string();
                        break PollOutcome::Failed(AppError::Generation(message));
                    }
                    JobStatus::Unknown(raw) => {
                        warn!(%job_id, status = raw.as_str(), "Unrecognized job status, still polling");
                    }
                    active => self.update_status(epoch, &job_id, active.clone()),
                },
                Err(e) => {
                    break PollOutcome::Failed(AppError::Poll(e.describe("Failed to check job status")));
                }
            }

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(interval) => false,
                changed = cancel.changed() => changed.is_err(),
            };
            if cancelled || *cancel.borrow() {
                debug!(%job_id, "Polling cancelled");
                return;
            }
        };

        self.finish_poll(&job_id);
        match outcome {
            PollOutcome::Completed(url) => {
                debug!(%job_id, attempts, "Job completed");
                // failures are already reported by display
                let _ = self.display_for(epoch, &url).await;
            }
            PollOutcome::Failed(err) => self.fail(epoch, &err),
        }
    }

    fn finish_poll(&self, job_id: &str) {
        self.state().polls.remove(job_id);
    }

    fn update_status(&self, epoch: u64, job_id: &str, status: JobStatus) {
        let phase = {
            let mut state = self.state();
            if state.epoch != epoch {
                return;
            }
            match &mut state.phase {
                WorkflowPhase::Loading {
                    job_id: Some(current),
                    status: current_status,
                } if current.as_str() == job_id => {
                    if current_status.as_ref() == Some(&status) {
                        return;
                    }
                    *current_status = Some(status);
                }
                _ => return,
            }
            state.phase.clone()
        };
        self.emit_phase(phase);
    }

    /// Loads `url` and shows it as the result of the current generation
    pub async fn display_image(&self, url: &str) -> Result<(), AppError> {
        let epoch = self.state().epoch;
        self.display_for(epoch, url).await
    }

    async fn display_for(&self, epoch: u64, url: &str) -> Result<(), AppError> {
        let image = match self.inner.loader.load(url).await {
            Ok(image) => image,
            Err(err) => {
                self.fail(epoch, &err);
                return Err(err);
            }
        };

        let item = {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!(url, "Discarding image of an abandoned generation");
                return Ok(());
            }
            let prompt = state
                .current_job
                .as_ref()
                .map(|job| job.request.prompt().to_string())
                .unwrap_or_default();
            state.phase = WorkflowPhase::Displaying {
                image_url: url.to_string(),
            };
            state.current_image = Some(image.clone());
            GalleryItem::new(url, prompt, Owner::Public)
        };

        info!(url, "Displaying generated image");
        self.inner.gallery.prepend(item.clone());
        self.emit_phase(WorkflowPhase::Displaying {
            image_url: url.to_string(),
        });
        self.inner.events.push_gen(GenEvent::ImageReady { item, image });
        self.inner
            .events
            .notify(Notification::success("Your image is ready"));
        Ok(())
    }

    /// Cancels every live poll and returns to `Idle`
    pub fn reset(&self) {
        let cancelled = {
            let mut state = self.state();
            let polls: Vec<_> = state.polls.drain().collect();
            for (_, cancel) in &polls {
                let _ = cancel.send(true);
            }
            state.epoch += 1;
            state.phase = WorkflowPhase::Idle;
            state.current_job = None;
            polls.len()
        };
        info!(cancelled, "Generation reset");
        self.emit_phase(WorkflowPhase::Idle);
    }

    fn fail(&self, epoch: u64, err: &AppError) {
        {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!("Ignoring failure of an abandoned generation: {}", err);
                return;
            }
            state.phase = WorkflowPhase::Idle;
        }
        error!("Generation failed: {}", err);
        self.emit_phase(WorkflowPhase::Idle);
        self.inner.events.notify_error(err);
    }

    fn emit_phase(&self, phase: WorkflowPhase) {
        self.inner.events.push_gen(GenEvent::Phase(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use tokio::sync::mpsc::UnboundedReceiver;
    use ae_core::JobStatusResponse;
    use ae_core::job::{JobCreateResponse, JobResult};
    use crate::backend::ApiError;
    use crate::events::{AeEvent, AppEvent};
    use crate::gallery::ContainerState;
    use crate::notifications::NotificationKind;

    const INTERVAL: Duration = Duration::from_millis(2000);

    fn status(status: JobStatus, image_url: Option<&str>) -> JobStatusResponse {
        JobStatusResponse {
            job_id: Some("job_42".into()),
            status,
            result: image_url.map(|url| JobResult {
                image_url: url.to_string(),
            }),
            error: None,
            message: None,
        }
    }

    #[derive(Default)]
    struct FakeApi {
        submit: Mutex<Option<Result<JobCreateResponse, ApiError>>>,
        statuses: Mutex<VecDeque<Result<JobStatusResponse, ApiError>>>,
        submits: AtomicUsize,
        polls: AtomicUsize,
    }

    impl FakeApi {
        fn accepting(statuses: Vec<Result<JobStatusResponse, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                submit: Mutex::new(Some(Ok(JobCreateResponse {
                    job_id: "job_42".into(),
                }))),
                statuses: Mutex::new(statuses.into()),
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl GenerationApi for FakeApi {
        async fn submit_job(&self, _request: &GenerationRequest) -> Result<JobCreateResponse, ApiError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            self.submit.lock().unwrap().clone().unwrap_or(Err(ApiError::Status {
                status: 500,
                message: None,
            }))
        }

        async fn job_status(&self, _job_id: &str) -> Result<JobStatusResponse, ApiError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(status(JobStatus::Processing, None)))
        }
    }

    #[derive(Default)]
    struct FakeLoader {
        fail: bool,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl ImageLoader for FakeLoader {
        async fn load(&self, url: &str) -> Result<LoadedImage, AppError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::ImageLoad("Failed to fetch the generated image".into()));
            }
            Ok(LoadedImage {
                url: url.to_string(),
                size: [1, 1],
                rgba: Arc::new(vec![0, 0, 0, 255]),
                encoded: Arc::new(vec![1, 2, 3]),
                mime: "image/png",
            })
        }
    }

    struct Harness {
        generator: Generator,
        api: Arc<FakeApi>,
        loader: Arc<FakeLoader>,
        gallery: GalleryRenderer,
        rx: UnboundedReceiver<AeEvent>,
    }

    impl Harness {
        fn new(api: Arc<FakeApi>, loader: FakeLoader, max_attempts: u32) -> Self {
            let (events, rx) = EventProxy::channel();
            let gallery = GalleryRenderer::default();
            let loader = Arc::new(loader);
            let generator = Generator::new(
                api.clone(),
                loader.clone(),
                gallery.clone(),
                events,
                PollSettings {
                    interval: INTERVAL,
                    max_attempts,
                },
                Handle::current(),
            );
            Self {
                generator,
                api,
                loader,
                gallery,
                rx,
            }
        }

        fn phases(&mut self) -> Vec<WorkflowPhase> {
            let mut out = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                if let AeEvent::Gen(GenEvent::Phase(phase)) = event {
                    out.push(phase);
                }
            }
            out
        }

        fn notifications(&mut self) -> Vec<(NotificationKind, String)> {
            let mut out = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                if let AeEvent::App(AppEvent::Notify(n)) = event {
                    out.push((n.kind, n.message));
                }
            }
            out
        }
    }

    async fn settle() {
        tokio::time::sleep(INTERVAL * 10).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_prompt_never_hits_network() {
        let mut h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);

        let err = h
            .generator
            .submit_prompt("   ", ModelType::Sketch, AspectRatio::Square)
            .unwrap_err();
        settle().await;

        assert_eq!(err, AppError::Validation(ValidationError::EmptyPrompt));
        assert_eq!(h.api.submits.load(Ordering::SeqCst), 0);
        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert_eq!(
            h.notifications(),
            vec![(NotificationKind::Error, "Please enter a prompt".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_red_fox_reaches_gallery() {
        let api = FakeApi::accepting(vec![
            Ok(status(JobStatus::Processing, None)),
            Ok(status(JobStatus::Processing, None)),
            Ok(status(JobStatus::Completed, Some("https://cdn/x.png"))),
        ]);
        let mut h = Harness::new(api, FakeLoader::default(), 150);

        let task = h
            .generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        assert!(h.generator.phase().is_loading());

        assert_eq!(task.await.unwrap().unwrap(), "job_42");
        settle().await;

        assert_eq!(h.api.polls.load(Ordering::SeqCst), 3);
        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.generator.phase(),
            WorkflowPhase::Displaying {
                image_url: "https://cdn/x.png".into()
            }
        );
        assert_eq!(h.generator.active_polls(), 0);

        let ContainerState::Cards(cards) = h.gallery.snapshot(Owner::Public) else {
            panic!("public gallery should show cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].item.image_url, "https://cdn/x.png");
        assert_eq!(cards[0].item.title(), "a red fox in snow");
        assert!(h
            .notifications()
            .contains(&(NotificationKind::Success, "Your image is ready".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_never_loads_image() {
        let mut failed = status(JobStatus::Failed, None);
        failed.error = Some("NSFW content detected".into());
        let mut h = Harness::new(FakeApi::accepting(vec![Ok(failed)]), FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Realistic, AspectRatio::Square)
            .unwrap()
            .await
            .unwrap()
            .unwrap();
        settle().await;

        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 0);
        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert!(h.notifications().contains(&(
            NotificationKind::Error,
            "Error: NSFW content detected".to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_error_uses_backend_message() {
        let api = Arc::new(FakeApi {
            submit: Mutex::new(Some(Err(ApiError::Status {
                status: 402,
                message: Some("Not enough credits".into()),
            }))),
            ..FakeApi::default()
        });
        let mut h = Harness::new(api, FakeLoader::default(), 150);

        let result = h
            .generator
            .submit_prompt("a lighthouse", ModelType::Artistic, AspectRatio::Wide)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(result, Err(AppError::Submission("Not enough credits".into())));
        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 0);
        assert!(h
            .notifications()
            .contains(&(NotificationKind::Error, "Error: Not enough credits".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_loading_is_rejected() {
        let h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);

        let first = h
            .generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square);
        let second = h
            .generator
            .submit_prompt("a blue fox", ModelType::Sketch, AspectRatio::Square);

        assert!(first.is_ok());
        assert_eq!(
            second.unwrap_err(),
            AppError::Validation(ValidationError::GenerationInProgress)
        );
        h.generator.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_poll_is_noop() {
        let h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);

        assert!(h.generator.poll("job_42"));
        assert!(!h.generator.poll("job_42"));
        assert_eq!(h.generator.active_polls(), 1);

        tokio::time::sleep(INTERVAL / 2).await;
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 1);
        h.generator.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_returns_to_idle() {
        let api = FakeApi::accepting(vec![
            Ok(status(JobStatus::Pending, None)),
            Err(ApiError::Transport("connection reset".into())),
        ]);
        let mut h = Harness::new(api, FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Anime, AspectRatio::Tall)
            .unwrap();
        settle().await;

        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 2);
        assert_eq!(h.generator.active_polls(), 0);
        assert!(h.notifications().contains(&(
            NotificationKind::Error,
            "Error: Failed to check job status: connection reset".to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_load_failure_never_displays() {
        let api = FakeApi::accepting(vec![Ok(status(JobStatus::Completed, Some("https://cdn/x.png")))]);
        let loader = FakeLoader {
            fail: true,
            ..FakeLoader::default()
        };
        let h = Harness::new(api, loader, 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Fantasy, AspectRatio::Square)
            .unwrap();
        settle().await;

        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert!(h.generator.current_image().is_none());
        assert!(matches!(h.gallery.snapshot(Owner::Public), ContainerState::Loading));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_without_url_is_generation_error() {
        let api = FakeApi::accepting(vec![Ok(status(JobStatus::Completed, None))]);
        let mut h = Harness::new(api, FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        settle().await;

        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 0);
        assert!(h.notifications().contains(&(
            NotificationKind::Error,
            "Error: Job completed without an image".to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_is_capped() {
        let unknown = (0..10)
            .map(|_| Ok(status(JobStatus::Unknown("warming_up".into()), None)))
            .collect();
        let h = Harness::new(FakeApi::accepting(unknown), FakeLoader::default(), 3);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        settle().await;

        assert_eq!(h.api.polls.load(Ordering::SeqCst), 3);
        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert_eq!(h.generator.active_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_polling() {
        let h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap()
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(INTERVAL / 2).await;
        assert!(h.generator.is_polling("job_42"));

        h.generator.reset();
        let polled = h.api.polls.load(Ordering::SeqCst);
        settle().await;

        assert_eq!(h.api.polls.load(Ordering::SeqCst), polled);
        assert_eq!(h.generator.phase(), WorkflowPhase::Idle);
        assert_eq!(h.generator.active_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_variation_suffixes_prompt() {
        let api = FakeApi::accepting(vec![Ok(status(JobStatus::Completed, Some("https://cdn/x.png")))]);
        let h = Harness::new(api, FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        settle().await;

        h.generator.variation().unwrap();
        assert_eq!(
            h.generator.current_request().unwrap().prompt(),
            "a red fox in snow (variation)"
        );
        h.generator.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_image_replaces_current_image() {
        let mut h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);

        h.generator.display_image("https://cdn/y.png").await.unwrap();

        assert_eq!(h.loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.generator.phase(),
            WorkflowPhase::Displaying {
                image_url: "https://cdn/y.png".into()
            }
        );
        assert_eq!(
            h.generator.current_image().map(|image| image.url),
            Some("https://cdn/y.png".to_string())
        );
        assert_eq!(h.gallery.snapshot(Owner::Public).cards().len(), 1);
        assert!(h
            .notifications()
            .contains(&(NotificationKind::Success, "Your image is ready".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_checked_once_per_interval() {
        let h = Harness::new(FakeApi::accepting(vec![]), FakeLoader::default(), 150);
        let tick = Duration::from_millis(1);

        assert!(h.generator.poll("job_42"));

        tokio::time::sleep(INTERVAL - tick).await;
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(tick * 2).await;
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(h.api.polls.load(Ordering::SeqCst), 3);

        h.generator.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_shows_image_loading() {
        let api = FakeApi::accepting(vec![Ok(status(JobStatus::Completed, Some("https://cdn/x.png")))]);
        let mut h = Harness::new(api, FakeLoader::default(), 150);

        h.generator
            .submit_prompt("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        settle().await;

        let labels: Vec<String> = h.phases().iter().map(WorkflowPhase::label).collect();
        assert_eq!(
            labels,
            vec!["Submitting...", "Waiting in queue...", "Loading image...", "Done"]
        );
    }
}
