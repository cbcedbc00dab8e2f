//! Gallery facade
//!
//! [`Gallery`] is what an embedding page talks to: it mounts a scene for an
//! artwork dataset, is driven one animation frame at a time, forwards
//! pointer input and is torn down with [`Gallery::dispose`]. The services it
//! depends on (image loading, texture cache, navigation) are constructed by
//! the caller and passed in.

use std::sync::Arc;

use glam::Vec2;
use vernissage_model::ArtworkSet;

use crate::domains::interaction::{InteractionRouter, Navigator, TransitionHandle};
use crate::domains::media::{
    FallbackPainter, ImageLoader, ImagePreloader, TextureCache,
};
use crate::domains::performance::{
    HeapProbe, NoHeapProbe, PerformanceLevel, PerformanceMonitor,
};
use crate::domains::scene::{
    Camera, DrawItem, EntityId, FrameView, LayoutKind, RenderSurface, SceneComposer,
    TickReport,
};
use crate::infra::config::SceneConfig;
use crate::infra::device::{DeviceClass, DevicePreset, Viewport};
use crate::infra::rng::SceneRng;

/// What the host page knows about where the scene would be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEnvironment {
    /// False for server-side rendering or when no graphics context exists.
    pub graphics_available: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
}

impl RenderEnvironment {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            graphics_available: true,
            viewport,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Environment without a graphics context.
    pub fn unavailable() -> Self {
        Self {
            graphics_available: false,
            viewport: Viewport::new(1, 1, 1.0),
            user_agent: None,
        }
    }
}

/// Services a scene depends on, owned by whoever mounts the gallery.
#[derive(Debug)]
pub struct SceneServices {
    pub textures: TextureCache,
    pub navigator: Arc<dyn Navigator>,
    pub heap_probe: Box<dyn HeapProbe>,
}

impl SceneServices {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        config: &SceneConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let preloader = ImagePreloader::new(loader, config.media.max_concurrent_loads);
        let painter = FallbackPainter::new(
            config.media.fallback_texture_size,
            config.media.font_path.as_deref(),
        );
        Self {
            textures: TextureCache::new(
                config.media.texture_cache_capacity,
                preloader,
                painter,
            ),
            navigator,
            heap_probe: Box::new(NoHeapProbe),
        }
    }

    pub fn with_heap_probe(mut self, probe: Box<dyn HeapProbe>) -> Self {
        self.heap_probe = probe;
        self
    }

    pub fn preloader(&self) -> &ImagePreloader {
        self.textures.preloader()
    }
}

/// Outcome of one [`Gallery::frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Scene seconds since the first frame.
    pub scene_time_s: f64,
    pub skipped: bool,
    pub level: PerformanceLevel,
    pub batch_size: usize,
    pub tick: TickReport,
    pub hovered: Option<EntityId>,
    pub scene_opacity: f32,
    pub draw_count: usize,
    pub transitioning: bool,
}

#[derive(Debug)]
pub struct Gallery {
    environment: RenderEnvironment,
    device_class: DeviceClass,
    dataset: ArtworkSet,
    textures: TextureCache,
    composer: SceneComposer,
    camera: Camera,
    monitor: PerformanceMonitor,
    router: InteractionRouter,
    origin_ms: Option<f64>,
    last_frame_ms: Option<f64>,
    scene_time_s: f64,
    scene_opacity: f32,
    frames: u64,
    draw_list: Vec<DrawItem>,
    disposed: bool,
}

impl Gallery {
    /// Mount a scene. Returns `None` without doing any work when graphics
    /// are unavailable; otherwise waits the construction delay so the host
    /// can paint first, then composes the scene.
    pub async fn mount(
        environment: RenderEnvironment,
        dataset: ArtworkSet,
        layout: LayoutKind,
        services: SceneServices,
        config: &SceneConfig,
    ) -> Option<Gallery> {
        if !environment.graphics_available {
            log::info!("Graphics unavailable; gallery scene not mounted");
            return None;
        }

        let delay = config.media.construction_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let SceneServices {
            textures,
            navigator,
            heap_probe,
        } = services;

        let mut rng = SceneRng::from_seed_option(config.rng_seed);
        let device_class = DeviceClass::detect(
            &environment.viewport,
            environment.user_agent.as_deref(),
            &config.device,
        );
        let preset = device_class.preset();
        log::debug!(
            "Mounting {layout:?} gallery on {device_class:?} ({}x{} @{:.1})",
            environment.viewport.width,
            environment.viewport.height,
            preset.render_pixel_ratio(&environment.viewport)
        );

        let mut composer =
            SceneComposer::new(layout, preset, config, textures.clone(), rng.fork());
        composer.generate(&dataset);
        let camera = composer.initial_camera(&environment.viewport);
        let monitor = PerformanceMonitor::with_probe(
            config.performance.clone(),
            rng.fork(),
            heap_probe,
        );
        let router = InteractionRouter::new(
            config.interaction.clone(),
            config.animation.clone(),
            navigator,
        );

        Some(Gallery {
            environment,
            device_class,
            dataset,
            textures,
            composer,
            camera,
            monitor,
            router,
            origin_ms: None,
            last_frame_ms: None,
            scene_time_s: 0.0,
            scene_opacity: 1.0,
            frames: 0,
            draw_list: Vec::new(),
            disposed: false,
        })
    }

    /// Run one animation frame at `now_ms` (monotonic milliseconds). The
    /// first frame starts the entrance timeline.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        if self.disposed {
            return self.report(true, TickReport::default(), None);
        }

        let origin = *self.origin_ms.get_or_insert_with(|| {
            self.composer.start_sequence(0.0);
            now_ms
        });
        let delta_s = self
            .last_frame_ms
            .map(|last| ((now_ms - last) / 1000.0).max(0.0) as f32)
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);
        self.scene_time_s = (now_ms - origin) / 1000.0;
        self.frames += 1;

        self.monitor.update(now_ms);
        let skipped = self.monitor.should_skip_frame();
        let tick = if skipped {
            TickReport::default()
        } else {
            self.composer.tick(
                self.scene_time_s,
                delta_s,
                &mut self.camera,
                &self.monitor,
            )
        };

        let hovered = self.router.update(
            now_ms,
            self.monitor.level(),
            &self.camera,
            &mut self.composer,
        );
        self.scene_opacity =
            self.router
                .advance_transition(self.scene_time_s, &self.camera, &mut self.composer);
        self.draw_list = self.composer.draw_list(self.scene_opacity);

        self.report(skipped, tick, hovered)
    }

    fn report(
        &self,
        skipped: bool,
        tick: TickReport,
        hovered: Option<EntityId>,
    ) -> FrameReport {
        FrameReport {
            frame: self.frames,
            scene_time_s: self.scene_time_s,
            skipped,
            level: self.monitor.level(),
            batch_size: self.monitor.get_batch_size(),
            tick,
            hovered,
            scene_opacity: self.scene_opacity,
            draw_count: self.draw_list.len(),
            transitioning: self.router.is_transitioning(),
        }
    }

    /// Hand the latest frame to a surface.
    pub fn present(&self, surface: &mut dyn RenderSurface) {
        if self.disposed {
            return;
        }
        let backdrop_opacity =
            self.composer.backdrop().opacity(self.scene_time_s) * self.scene_opacity;
        surface.present(&FrameView {
            camera: &self.camera,
            backdrop_opacity,
            items: &self.draw_list,
        });
    }

    pub fn draw_list(&self) -> &[DrawItem] {
        &self.draw_list
    }

    pub fn resize(&mut self, viewport: Viewport, surface: Option<&mut dyn RenderSurface>) {
        self.environment.viewport = viewport;
        self.camera.resize(&viewport);
        if let Some(surface) = surface {
            surface.resize(&viewport, self.preset().render_pixel_ratio(&viewport));
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.router.pointer_move(x, y, &self.environment.viewport);
    }

    pub fn pointer_leave(&mut self) {
        self.router.pointer_leave(&mut self.composer);
    }

    /// Click at the current pointer position.
    pub fn pointer_down(&mut self) -> Option<TransitionHandle> {
        if self.disposed {
            return None;
        }
        self.router
            .click(self.scene_time_s, &self.composer, &self.dataset)
    }

    /// Touch input at pixel coordinates.
    pub fn tap(&mut self, x: f32, y: f32) -> Option<TransitionHandle> {
        if self.disposed {
            return None;
        }
        self.router.tap(
            Vec2::new(x, y),
            self.scene_time_s,
            &self.environment.viewport,
            &self.camera,
            &mut self.composer,
            &self.dataset,
        )
    }

    /// Restore the scene after returning from a detail view.
    pub fn reset_transition(&mut self) {
        self.router.reset_transition(&mut self.composer);
    }

    pub fn dataset(&self) -> &ArtworkSet {
        &self.dataset
    }

    /// The live dataset. Planes whose artwork is removed stay on screen but
    /// no longer respond to clicks.
    pub fn dataset_mut(&mut self) -> &mut ArtworkSet {
        &mut self.dataset
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn viewport(&self) -> &Viewport {
        &self.environment.viewport
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    pub fn preset(&self) -> &DevicePreset {
        self.composer.preset()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tear down the scene, the texture cache and the preloader. A second
    /// call does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.router.reset_transition(&mut self.composer);
        self.composer.dispose();
        self.draw_list.clear();
        self.textures.close();
        self.textures.preloader().dispose();
        log::info!("Gallery disposed after {} frames", self.frames);
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.dispose();
    }
}
