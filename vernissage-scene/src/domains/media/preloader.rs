//! Bounded-concurrency image preloader
//!
//! Requests wait in a priority queue (higher first, insertion order among
//! equals) and at most `max_concurrent` loads run at once. Every URL has at
//! most one pending load; later callers share its future. Loads never fail
//! from the caller's point of view: a failed fetch or decode resolves to
//! `None`.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use priority_queue::PriorityQueue;
use tokio::sync::oneshot;

use super::loader::ImageLoader;
use super::{ImageHandle, Result};

/// Future returned by [`ImagePreloader::preload`]; cloneable, resolves to
/// the decoded image or `None`.
pub type PreloadFuture = Shared<BoxFuture<'static, Option<ImageHandle>>>;

/// Queue priority: caller priority first, then earlier submissions.
type QueueKey = (u32, Reverse<u64>);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloaderStats {
    pub cached: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub fetches_issued: u64,
    pub failures: u64,
}

#[derive(Clone)]
pub struct ImagePreloader {
    inner: Arc<Inner>,
}

struct Inner {
    loader: Arc<dyn ImageLoader>,
    max_concurrent: usize,
    // Completed images by URL, kept until dispose
    completed: DashMap<String, ImageHandle>,
    state: Mutex<QueueState>,
}

struct Pending {
    shared: PreloadFuture,
    sender: Option<oneshot::Sender<Option<ImageHandle>>>,
}

#[derive(Default)]
struct QueueState {
    queue: PriorityQueue<String, QueueKey>,
    // Queued and loading URLs
    pending: HashMap<String, Pending>,
    active: usize,
    peak_active: usize,
    next_seq: u64,
    fetches_issued: u64,
    failures: u64,
    // Bumped by dispose so stale completions can be recognised
    generation: u64,
}

impl std::fmt::Debug for ImagePreloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreloader")
            .field("loader", &self.inner.loader)
            .field("max_concurrent", &self.inner.max_concurrent)
            .field("stats", &self.stats())
            .finish()
    }
}

fn resolved(value: Option<ImageHandle>) -> PreloadFuture {
    futures::future::ready(value).boxed().shared()
}

impl ImagePreloader {
    pub fn new(loader: Arc<dyn ImageLoader>, max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                max_concurrent: max_concurrent.max(1),
                completed: DashMap::new(),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent
    }

    /// Previously completed image, if any.
    pub fn cached(&self, url: &str) -> Option<ImageHandle> {
        self.inner.completed.get(url).map(|entry| entry.value().clone())
    }

    /// Request `url` with the given priority (higher is served first).
    ///
    /// Loads are spawned on the current tokio runtime.
    pub fn preload(&self, url: &str, priority: u32) -> PreloadFuture {
        let priority = priority.max(1);

        if let Some(hit) = self.cached(url) {
            return resolved(Some(hit));
        }

        let shared = {
            let mut state = self.inner.state.lock();

            // A load may have completed between the lookup above and the lock
            if let Some(hit) = self.cached(url) {
                return resolved(Some(hit));
            }

            let existing = state.pending.get(url).map(|p| p.shared.clone());
            if let Some(shared) = existing {
                if let Some(&(current, seq)) = state.queue.get_priority(url)
                    && priority > current
                {
                    log::trace!(
                        "Upgrading preload priority for {url} from {current} to {priority}"
                    );
                    state.queue.change_priority(url, (priority, seq));
                }
                return shared;
            }

            let (sender, receiver) = oneshot::channel();
            // A dropped sender (dispose) resolves waiters to None
            let shared = receiver.map(|result| result.unwrap_or(None)).boxed().shared();

            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(url.to_string(), (priority, Reverse(seq)));
            state.pending.insert(
                url.to_string(),
                Pending {
                    shared: shared.clone(),
                    sender: Some(sender),
                },
            );
            shared
        };

        self.pump();
        shared
    }

    /// Start queued loads until the concurrency cap is reached.
    fn pump(&self) {
        let launches: Vec<(String, u64)> = {
            let mut state = self.inner.state.lock();
            let mut launches = Vec::new();
            while state.active < self.inner.max_concurrent {
                let Some((url, _)) = state.queue.pop() else {
                    break;
                };
                state.active += 1;
                state.fetches_issued += 1;
                state.peak_active = state.peak_active.max(state.active);
                launches.push((url, state.generation));
            }
            launches
        };

        if launches.is_empty() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("Image preloader has no async runtime: {err}");
                for (url, generation) in launches {
                    self.complete(&url, generation, None);
                }
                return;
            }
        };

        for (url, generation) in launches {
            let this = self.clone();
            runtime.spawn(async move {
                let result = this.fetch(&url).await;
                let handle = match result {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        log::warn!("Image preload failed for {url}: {err}");
                        None
                    }
                };
                this.complete(&url, generation, handle);
            });
        }
    }

    async fn fetch(&self, url: &str) -> Result<ImageHandle> {
        let bytes = self.inner.loader.load(url).await?;
        ImageHandle::decode(url, &bytes)
    }

    fn complete(&self, url: &str, generation: u64, handle: Option<ImageHandle>) {
        let sender = {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                log::trace!("Dropping preload result for {url} after dispose");
                return;
            }
            state.active = state.active.saturating_sub(1);
            match &handle {
                Some(handle) => {
                    self.inner.completed.insert(url.to_string(), handle.clone());
                }
                None => state.failures += 1,
            }
            state.pending.remove(url).and_then(|mut p| p.sender.take())
        };

        if let Some(sender) = sender {
            // Nobody waiting is fine
            let _ = sender.send(handle);
        }

        self.pump();
    }

    pub fn stats(&self) -> PreloaderStats {
        let state = self.inner.state.lock();
        PreloaderStats {
            cached: self.inner.completed.len(),
            queued: state.queue.len(),
            in_flight: state.active,
            peak_in_flight: state.peak_active,
            fetches_issued: state.fetches_issued,
            failures: state.failures,
        }
    }

    /// Clear the cache, the queue and the in-flight map.
    ///
    /// Loads already running are abandoned, not aborted; their results are
    /// dropped when they arrive. Waiting callers resolve to `None`.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        state.queue.clear();
        state.pending.clear();
        state.active = 0;
        self.inner.completed.clear();
        log::debug!("Image preloader disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::media::ImagePipelineError;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    fn png_bytes() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 10, 10, 255]))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// Loader whose loads block until the test releases permits.
    #[derive(Debug)]
    struct GatedLoader {
        gate: Semaphore,
        calls: Mutex<Vec<String>>,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GatedLoader {
        fn new() -> Self {
            Self {
                gate: Semaphore::new(0),
                calls: Mutex::new(Vec::new()),
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ImageLoader for GatedLoader {
        async fn load(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().push(url.to_string());
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.gate.acquire().await.unwrap().forget();
            self.current.fetch_sub(1, Ordering::SeqCst);
            if url.ends_with("missing.png") {
                return Err(ImagePipelineError::Status {
                    status: 404,
                    url: url.to_string(),
                });
            }
            Ok(png_bytes())
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn concurrent_requests_for_one_url_share_a_fetch() {
        let loader = Arc::new(GatedLoader::new());
        let preloader = ImagePreloader::new(loader.clone(), 3);

        let waiters: Vec<_> = (0..5)
            .map(|_| preloader.preload("https://cdn.test/a.png", 1))
            .collect();
        settle().await;
        loader.gate.add_permits(1);

        let results = futures::future::join_all(waiters).await;
        assert_eq!(loader.calls.lock().len(), 1);
        let first = results[0].clone().unwrap();
        assert!(results.iter().all(|r| r.as_ref().unwrap().same_image(&first)));

        // Completed images are served from cache without another fetch
        let again = preloader.preload("https://cdn.test/a.png", 1).await.unwrap();
        assert!(again.same_image(&first));
        assert_eq!(preloader.stats().fetches_issued, 1);
    }

    #[tokio::test]
    async fn never_exceeds_max_concurrent() {
        let loader = Arc::new(GatedLoader::new());
        let preloader = ImagePreloader::new(loader.clone(), 3);

        let waiters: Vec<_> = (0..10)
            .map(|i| preloader.preload(&format!("https://cdn.test/{i}.png"), 1 + i % 3))
            .collect();
        settle().await;

        assert_eq!(loader.current.load(Ordering::SeqCst), 3);
        assert_eq!(preloader.stats().in_flight, 3);
        assert_eq!(preloader.stats().queued, 7);

        for _ in 0..10 {
            loader.gate.add_permits(1);
            settle().await;
            assert!(preloader.stats().in_flight <= 3);
        }

        let results = futures::future::join_all(waiters).await;
        assert!(results.iter().all(Option::is_some));
        assert_eq!(loader.peak.load(Ordering::SeqCst), 3);
        assert_eq!(preloader.stats().peak_in_flight, 3);
    }

    #[tokio::test]
    async fn serves_higher_priority_first_then_insertion_order() {
        let loader = Arc::new(GatedLoader::new());
        let preloader = ImagePreloader::new(loader.clone(), 1);

        let a = preloader.preload("https://cdn.test/a.png", 1);
        settle().await;
        let b = preloader.preload("https://cdn.test/b.png", 1);
        let c = preloader.preload("https://cdn.test/c.png", 5);
        let d = preloader.preload("https://cdn.test/d.png", 5);
        // Re-requesting b at a higher priority moves it ahead of c and d
        let e = preloader.preload("https://cdn.test/e.png", 2);
        let b_again = preloader.preload("https://cdn.test/b.png", 9);

        loader.gate.add_permits(6);
        futures::future::join_all([a, b, c, d, e, b_again]).await;

        let calls = loader.calls.lock().clone();
        let order: Vec<&str> = calls
            .iter()
            .map(|u| u.trim_start_matches("https://cdn.test/"))
            .collect();
        assert_eq!(order, ["a.png", "b.png", "c.png", "d.png", "e.png"]);
    }

    #[tokio::test]
    async fn failures_resolve_to_none_and_are_not_cached() {
        let loader = Arc::new(GatedLoader::new());
        let preloader = ImagePreloader::new(loader.clone(), 2);
        loader.gate.add_permits(2);

        let url = "https://cdn.test/missing.png";
        assert!(preloader.preload(url, 1).await.is_none());
        assert!(preloader.cached(url).is_none());
        assert!(preloader.preload(url, 1).await.is_none());
        assert_eq!(loader.calls.lock().len(), 2);
        assert_eq!(preloader.stats().failures, 2);
    }

    #[tokio::test]
    async fn dispose_clears_state_and_drops_late_results() {
        let loader = Arc::new(GatedLoader::new());
        let preloader = ImagePreloader::new(loader.clone(), 1);

        let running = preloader.preload("https://cdn.test/a.png", 1);
        let queued = preloader.preload("https://cdn.test/b.png", 1);
        settle().await;

        preloader.dispose();
        assert_eq!(preloader.stats().queued, 0);
        assert_eq!(preloader.stats().in_flight, 0);
        assert!(queued.await.is_none());

        loader.gate.add_permits(1);
        assert!(running.await.is_none());
        settle().await;
        assert!(preloader.cached("https://cdn.test/a.png").is_none());
    }
}
