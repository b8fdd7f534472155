//! Image fetchers and the worker loop that drives them

use super::{FetchResult, ImageCandidate, SourceTask};
use crate::network::HttpClient;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Fetches and decodes a single image
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImageCandidate, FetchError>;
}

/// Fetches images over HTTP and decodes them with the `image` crate
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: HttpClient,
}

impl HttpImageFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageCandidate, FetchError> {
        url::Url::parse(url)?;

        let response = self.client.get(url).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }

        let body = response.body;
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&body)).await??;

        Ok(ImageCandidate::new(url, image))
    }
}

/// Run one task, converting any failure into `FetchResult::Absent`.
///
/// Failures are logged here and never retried.
pub async fn fetch_or_absent(fetcher: &dyn ImageFetcher, task: &SourceTask) -> FetchResult {
    debug!("Fetching image {} (position {})", task.url, task.position);

    match fetcher.fetch(&task.url).await {
        Ok(candidate) => FetchResult::Image(candidate),
        Err(e) => {
            error!("Error fetching image from {}: {}", task.url, e);
            FetchResult::Absent {
                url: task.url.clone(),
            }
        }
    }
}

/// Shared, pre-loaded queue of pending tasks
pub(crate) type TaskQueue = Arc<Mutex<mpsc::Receiver<SourceTask>>>;

/// Pull tasks until the queue drains or quit is broadcast.
///
/// A task already dequeued when quit fires still runs to completion; its
/// result goes into a sink that may no longer be read.
pub(crate) async fn run_worker(
    id: usize,
    fetcher: Arc<dyn ImageFetcher>,
    queue: TaskQueue,
    results: mpsc::Sender<FetchResult>,
    mut quit: watch::Receiver<bool>,
) {
    loop {
        if *quit.borrow() {
            debug!("Image fetcher {} quitting", id);
            return;
        }

        let task = tokio::select! {
            biased;
            _ = quit.changed() => {
                debug!("Image fetcher {} quitting", id);
                return;
            }
            task = next_task(&queue) => task,
        };

        let Some(task) = task else {
            debug!("Image fetcher {} found queue drained", id);
            return;
        };

        let result = fetch_or_absent(fetcher.as_ref(), &task).await;

        // Result queue is sized to the task count, so only a closed window fails here
        if results.try_send(result).is_err() {
            debug!("Window closed, dropping late result for {}", task.url);
        }
    }
}

async fn next_task(queue: &TaskQueue) -> Option<SourceTask> {
    queue.lock().await.recv().await
}
