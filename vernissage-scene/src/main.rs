use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use env_logger::{Builder, Target};
use log::LevelFilter;
use vernissage_model::{ArtworkId, ArtworkRef, ArtworkSet};
use vernissage_scene::domains::interaction::LogNavigator;
use vernissage_scene::domains::media::HttpImageLoader;
use vernissage_scene::domains::performance::SystemHeapProbe;
use vernissage_scene::domains::scene::{HeadlessSurface, LayoutKind, RenderSurface};
use vernissage_scene::infra::config::SceneConfig;
use vernissage_scene::infra::device::Viewport;
use vernissage_scene::{Gallery, RenderEnvironment, SceneServices};

const DEMO_SECONDS_ENV: &str = "VERNISSAGE_DEMO_SECONDS";
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("vernissage_scene", LevelFilter::Debug)
        .init();
}

fn parse_layout(raw: &str) -> anyhow::Result<LayoutKind> {
    match raw.to_ascii_lowercase().as_str() {
        "building" => Ok(LayoutKind::Building),
        "wall" => Ok(LayoutKind::Wall),
        "preview" => Ok(LayoutKind::Preview),
        other => bail!("unknown layout '{other}' (expected building, wall or preview)"),
    }
}

/// Artworks without images; every plane gets a synthesized texture.
fn demo_dataset(count: u64) -> ArtworkSet {
    (1..=count)
        .map(|n| {
            ArtworkRef::new(
                ArtworkId::from(n),
                format!("Study No. {n}"),
                None,
                Some(format!("Student {}", n % 7 + 1)),
            )
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let config = SceneConfig::from_environment().context("loading scene configuration")?;

    let mut args = std::env::args().skip(1);
    let dataset = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading artworks from {path}"))?;
            ArtworkSet::from_json_str(&json).with_context(|| format!("parsing {path}"))?
        }
        None => demo_dataset(48),
    };
    let layout = match args.next() {
        Some(raw) => parse_layout(&raw)?,
        None => LayoutKind::Building,
    };
    let seconds: f64 = match std::env::var(DEMO_SECONDS_ENV) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{DEMO_SECONDS_ENV} must be a number"))?,
        Err(_) => 5.0,
    };

    let loader = HttpImageLoader::new(config.media.http_timeout(), config.media.http_max_retries)?;
    let services = SceneServices::new(Arc::new(loader), &config, Arc::new(LogNavigator))
        .with_heap_probe(Box::new(SystemHeapProbe::new()));

    let viewport = Viewport::new(1920, 1080, 1.0);
    log::info!(
        "Mounting {layout:?} scene with {} artworks for {seconds:.1}s",
        dataset.len()
    );
    let Some(mut gallery) = Gallery::mount(
        RenderEnvironment::new(viewport),
        dataset,
        layout,
        services,
        &config,
    )
    .await
    else {
        bail!("scene could not be mounted");
    };

    let mut surface = HeadlessSurface::default();
    surface.resize(&viewport, gallery.preset().render_pixel_ratio(&viewport));

    let started = Instant::now();
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    let mut last_report = 0.0;
    loop {
        ticker.tick().await;
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        if now_ms > seconds * 1000.0 {
            break;
        }
        let report = gallery.frame(now_ms);
        gallery.present(&mut surface);

        if now_ms - last_report >= 1000.0 {
            last_report = now_ms;
            let cache = gallery.textures().stats();
            log::info!(
                "t={:.1}s level={} fps={:.1} drawn={} textured={} cache={}/{} live_textures={}",
                report.scene_time_s,
                report.level,
                gallery.monitor().snapshot().avg_fps,
                report.draw_count,
                surface.last_textured_count,
                cache.entries,
                cache.capacity,
                cache.live_textures,
            );
        }
    }

    log::info!(
        "Presented {} frames; preloader {:?}",
        surface.frames_presented,
        gallery.textures().preloader().stats()
    );
    gallery.dispose();
    Ok(())
}
