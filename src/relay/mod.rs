use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::languages;
use crate::media::{MediaError, MediaStore, StoredFile, UploadGuard};
use crate::pipeline::{PipelineError, TranslationPipeline, TranslationResult};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no file uploaded")]
    NoFileProvided,

    #[error("unsupported target language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid multipart request: {0}")]
    Multipart(String),

    #[error("upload rate limit exceeded")]
    RateLimited,

    #[error("translation workers are shut down")]
    ShuttingDown,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// An upload that has already been written to the media store.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub stored: StoredFile,
    pub target_lang: String,
}

/// Bridges stored uploads to the translation pipeline.
///
/// At most `max_concurrent_jobs` pipeline runs are in flight; further
/// uploads wait for a slot. Uploads whose run fails are deleted.
pub struct TranslationRelay {
    pipeline: Arc<dyn TranslationPipeline>,
    media: MediaStore,
    slots: Semaphore,
    limiter: Option<DirectRateLimiter>,
}

impl TranslationRelay {
    pub fn new(
        pipeline: Arc<dyn TranslationPipeline>,
        media: MediaStore,
        max_concurrent_jobs: usize,
        upload_rate_per_minute: u32,
    ) -> Self {
        // 0 disables the rate limit
        let limiter = NonZeroU32::new(upload_rate_per_minute)
            .map(|rate| RateLimiter::direct(Quota::per_minute(rate)));

        Self {
            pipeline,
            media,
            slots: Semaphore::new(max_concurrent_jobs.max(1)),
            limiter,
        }
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Admission check, done before any bytes are written to disk.
    pub fn admit(&self) -> Result<(), RelayError> {
        match &self.limiter {
            Some(limiter) if limiter.check().is_err() => {
                warn!("Upload rejected by rate limiter");
                Err(RelayError::RateLimited)
            }
            _ => Ok(()),
        }
    }

    /// Stops handing out pipeline slots. Requests still waiting for one
    /// fail with `ShuttingDown`; runs already holding a slot finish.
    pub fn close(&self) {
        info!("Closing translation slots");
        self.slots.close();
    }

    /// Runs the pipeline for a stored upload. The upload is deleted when the
    /// run fails or when this future is dropped before it completes.
    pub async fn translate(&self, request: UploadRequest) -> Result<TranslationResult, RelayError> {
        let guard = UploadGuard::new(request.stored.clone());
        match self.run(request).await {
            Ok(result) => {
                guard.keep();
                Ok(result)
            }
            Err(e) => {
                warn!("Translation of {} failed: {}", guard.stored().name, e);
                Err(e)
            }
        }
    }

    async fn run(&self, request: UploadRequest) -> Result<TranslationResult, RelayError> {
        if !languages::is_supported(&request.target_lang) {
            return Err(RelayError::UnsupportedLanguage(request.target_lang));
        }

        info!(
            "Processing: {} as {} (target language: {})",
            request.original_name.as_deref().unwrap_or("<unnamed>"),
            request.stored.name,
            request.target_lang
        );

        let queued = Instant::now();
        let _permit = self.slots.acquire().await.map_err(|_| RelayError::ShuttingDown)?;
        if queued.elapsed().as_millis() > 0 {
            info!("{} waited {}ms for a translation slot", request.stored.name, queued.elapsed().as_millis());
        }

        let result = self
            .pipeline
            .translate(&request.stored.path, &request.target_lang)
            .await?;

        info!(
            "Translation of {} finished (success: {}, output: {})",
            request.stored.name,
            result.success(),
            result.output_file().unwrap_or("-")
        );
        Ok(result)
    }
}
