//! Shared fakes for the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use url::Url;
use vernissage_model::{ArtworkId, ArtworkRef, ArtworkSet};
use vernissage_scene::domains::interaction::{NavigationRequest, Navigator};
use vernissage_scene::domains::media::{ImageLoader, ImagePipelineError};
use vernissage_scene::domains::scene::LayoutKind;
use vernissage_scene::infra::config::SceneConfig;
use vernissage_scene::infra::device::Viewport;
use vernissage_scene::{Gallery, RenderEnvironment, SceneServices};

pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Serves a small PNG for every URL except the ones marked missing.
#[derive(Debug, Default)]
pub struct FakeLoader {
    missing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeLoader {
    pub fn with_missing(urls: &[&str]) -> Self {
        Self {
            missing: urls.iter().map(|u| u.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageLoader for FakeLoader {
    async fn load(&self, url: &str) -> Result<Vec<u8>, ImagePipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.missing.contains(url) {
            return Err(ImagePipelineError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(16, 12, Rgba([40, 120, 200, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| ImagePipelineError::Decode(err.to_string()))?;
        Ok(bytes)
    }
}

/// Navigator that records every request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    requests: Mutex<Vec<NavigationRequest>>,
}

impl RecordingNavigator {
    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, request: NavigationRequest) {
        self.requests.lock().push(request);
    }
}

/// Deterministic config: fixed seed, no glitches, no construction delay.
pub fn test_config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.rng_seed = Some(7);
    config.animation.glitch_probability = 0.0;
    config.media.construction_delay_ms = 0;
    config.media.fallback_texture_size = 48;
    config
}

pub fn image_url(id: u64) -> String {
    format!("https://images.test/art/{id}.png")
}

pub fn artwork(id: u64, with_image: bool) -> ArtworkRef {
    let url = with_image.then(|| Url::parse(&image_url(id)).expect("valid test url"));
    ArtworkRef::new(
        ArtworkId::from(id),
        format!("Work {id}"),
        url,
        Some("Test Student".to_string()),
    )
}

pub fn dataset(count: u64) -> ArtworkSet {
    (1..=count).map(|id| artwork(id, true)).collect()
}

pub fn desktop() -> Viewport {
    Viewport::new(1920, 1080, 1.0)
}

pub struct Harness {
    pub gallery: Gallery,
    pub loader: Arc<FakeLoader>,
    pub navigator: Arc<RecordingNavigator>,
    pub now_ms: f64,
}

impl Harness {
    pub async fn mount(
        dataset: ArtworkSet,
        layout: LayoutKind,
        config: SceneConfig,
        loader: FakeLoader,
    ) -> Self {
        let loader = Arc::new(loader);
        let navigator = Arc::new(RecordingNavigator::default());
        let services = SceneServices::new(loader.clone(), &config, navigator.clone());
        let gallery = Gallery::mount(
            RenderEnvironment::new(desktop()),
            dataset,
            layout,
            services,
            &config,
        )
        .await
        .expect("graphics available");
        Self {
            gallery,
            loader,
            navigator,
            now_ms: 1_000.0,
        }
    }

    /// Run `frames` frames spaced `step_ms` apart, letting texture tasks
    /// make progress between them.
    pub async fn run(&mut self, frames: usize, step_ms: f64) {
        for _ in 0..frames {
            self.gallery.frame(self.now_ms);
            self.now_ms += step_ms;
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Run at 60 fps for `seconds` of scene time.
    pub async fn run_for(&mut self, seconds: f64) {
        let frames = (seconds * 1000.0 / FRAME_MS).ceil() as usize;
        self.run(frames, FRAME_MS).await;
    }
}
