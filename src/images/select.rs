//! Fan-out of candidate URLs and the time-bounded best-image window

use super::fetcher::{run_worker, TaskQueue};
use super::{
    FetchResult, ImageCandidate, ImageFetcher, ImageFilter, ImageSummary, SelectConfig, Selection,
    SourceTask,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::Instant;
use tracing::debug;

/// Select the best image among `urls` within `config.timeout`.
///
/// All URLs are queued up front and drained by `config.workers` fetchers.
/// When the window closes, a quit signal stops fetchers from taking more
/// work; requests already in flight finish into a channel nobody reads.
/// Never fails: on timeout the partial result collected so far is returned.
pub async fn select_best_image(
    urls: &[String],
    fetcher: Arc<dyn ImageFetcher>,
    config: &SelectConfig,
) -> Selection {
    if urls.is_empty() {
        debug!("No candidate images to select from");
        return Selection::default();
    }

    let expected = urls.len();

    let (task_tx, task_rx) = mpsc::channel(expected);
    for (position, url) in urls.iter().enumerate() {
        if task_tx.try_send(SourceTask::new(url.clone(), position)).is_err() {
            break;
        }
    }
    drop(task_tx);
    let queue: TaskQueue = Arc::new(Mutex::new(task_rx));

    let (result_tx, result_rx) = mpsc::channel(expected);
    let (quit_tx, quit_rx) = watch::channel(false);

    let workers = config.workers.clamp(1, expected);
    for id in 0..workers {
        tokio::spawn(run_worker(
            id,
            fetcher.clone(),
            queue.clone(),
            result_tx.clone(),
            quit_rx.clone(),
        ));
    }
    drop(result_tx);

    debug!(
        "Selecting best of {} images with {} fetchers",
        expected, workers
    );

    AggregationWindow::new(expected, config.timeout, config.filter)
        .run(result_rx, &quit_tx)
        .await
}

/// Collector for one selection pass.
///
/// Owned by the task running the collection loop; fetchers only ever see
/// the sending half of the result channel.
#[derive(Debug)]
pub struct AggregationWindow {
    deadline: Instant,
    expected: usize,
    received: usize,
    filter: ImageFilter,
    best: Option<ImageCandidate>,
    candidates: Vec<ImageSummary>,
}

impl AggregationWindow {
    pub fn new(expected: usize, timeout: Duration, filter: ImageFilter) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            expected,
            received: 0,
            filter,
            best: None,
            candidates: Vec::new(),
        }
    }

    /// Fold one result into the window.
    ///
    /// Every decoded image is recorded as a candidate; only filtered ones
    /// compete for best, and an equal area never displaces the incumbent.
    pub fn accept(&mut self, result: FetchResult) {
        self.received += 1;

        let candidate = match result {
            FetchResult::Image(candidate) => candidate,
            FetchResult::Absent { url } => {
                debug!("No image from {}", url);
                return;
            }
        };

        self.candidates.push(candidate.summary());

        if !self.filter.accepts(candidate.width, candidate.height) {
            debug!(
                "Rejected {} ({}x{})",
                candidate.url, candidate.width, candidate.height
            );
            return;
        }

        let current = self.best.as_ref().map(|b| b.area).unwrap_or(0);
        if candidate.area > current {
            debug!("New best image {} (area {})", candidate.url, candidate.area);
            self.best = Some(candidate);
        }
    }

    /// Whether every expected result has arrived
    pub fn is_complete(&self) -> bool {
        self.received >= self.expected
    }

    /// Collect results until complete, the producers are gone, or the deadline passes
    pub async fn run(
        mut self,
        mut results: mpsc::Receiver<FetchResult>,
        quit: &watch::Sender<bool>,
    ) -> Selection {
        let deadline = tokio::time::sleep_until(self.deadline);
        tokio::pin!(deadline);

        let mut timed_out = false;

        while !self.is_complete() {
            tokio::select! {
                result = results.recv() => match result {
                    Some(result) => self.accept(result),
                    None => break,
                },
                _ = &mut deadline => {
                    debug!(
                        "Image search timed out with {} of {} results",
                        self.received, self.expected
                    );
                    timed_out = true;
                    break;
                }
            }
        }

        quit.send_replace(true);

        self.finish(timed_out)
    }

    fn finish(self, timed_out: bool) -> Selection {
        Selection {
            best: self.best,
            candidates: self.candidates,
            timed_out,
        }
    }
}
