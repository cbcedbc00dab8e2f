mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::{FakeLoader, Harness, artwork, dataset, desktop, image_url, test_config};
use vernissage_model::ArtworkSet;
use vernissage_scene::domains::interaction::LogNavigator;
use vernissage_scene::domains::media::{TextureSource, TextureVariant};
use vernissage_scene::domains::performance::PerformanceLevel;
use vernissage_scene::domains::scene::{HeadlessSurface, LayoutKind, Tier};
use vernissage_scene::infra::device::DeviceClass;
use vernissage_scene::{Gallery, RenderEnvironment, SceneServices};

#[tokio::test]
async fn desktop_building_composes_sixty_distinct_planes() {
    let mut harness =
        Harness::mount(dataset(100), LayoutKind::Building, test_config(), FakeLoader::default())
            .await;

    let planes = harness.gallery.composer().entities();
    assert_eq!(planes.len(), 60);
    let ids: HashSet<_> = planes.iter().map(|p| p.id()).collect();
    assert_eq!(ids.len(), 60);
    let artworks: HashSet<_> = planes.iter().map(|p| p.artwork_id().clone()).collect();
    assert_eq!(artworks.len(), 60);

    harness.run_for(0.5).await;
    assert!(harness.gallery.draw_list().len() <= 60);
}

#[tokio::test]
async fn sixty_records_fill_every_building_tier_once() {
    let records = dataset(60);
    let expected: HashSet<_> = records.iter().map(|art| art.id.clone()).collect();
    let harness =
        Harness::mount(records, LayoutKind::Building, test_config(), FakeLoader::default()).await;
    assert_eq!(harness.gallery.viewport(), &desktop());
    assert_eq!(harness.gallery.device_class(), DeviceClass::Desktop);

    let planes = harness.gallery.composer().entities();
    assert_eq!(planes.len(), 60);
    let artworks: HashSet<_> = planes.iter().map(|p| p.artwork_id().clone()).collect();
    assert_eq!(artworks, expected);

    let count = |tier: Tier| planes.iter().filter(|p| p.tier() == tier).count();
    assert_eq!(count(Tier::Wall), 32);
    assert_eq!(count(Tier::Wing), 16);
    assert_eq!(count(Tier::Foundation), 12);
    assert_eq!(count(Tier::Gallery), 0);
}

#[tokio::test]
async fn missing_image_gets_synthesized_caption_texture() {
    let mut config = test_config();
    config.media.photo_display_ratio = 1.0;
    let loader = FakeLoader::with_missing(&[image_url(2).as_str()]);
    let mut harness = Harness::mount(dataset(3), LayoutKind::Wall, config, loader).await;

    for _ in 0..30 {
        harness.run(1, common::FRAME_MS).await;
        if harness.gallery.composer().entities().iter().all(|p| p.texture().is_some()) {
            break;
        }
    }

    let planes = harness.gallery.composer().entities();
    assert!(planes.iter().all(|p| p.texture().is_some()));
    for plane in planes {
        let texture = plane.texture().expect("textured");
        assert_eq!(texture.variant(), TextureVariant::Photo);
        if plane.artwork_id().as_str() == "2" {
            assert_eq!(texture.source(), TextureSource::Synthesized);
            assert_eq!(texture.caption(), Some("Work 2 / Test Student"));
        } else {
            assert_eq!(texture.source(), TextureSource::Image);
        }
    }
    assert_eq!(harness.gallery.textures().preloader().stats().failures, 1);
}

#[tokio::test]
async fn artwork_without_url_never_hits_the_loader() {
    let set: ArtworkSet = vec![artwork(1, false), artwork(2, false)].into_iter().collect();
    let mut harness =
        Harness::mount(set, LayoutKind::Wall, test_config(), FakeLoader::default()).await;
    harness.run(10, common::FRAME_MS).await;

    assert_eq!(harness.loader.calls(), 0);
    assert!(
        harness
            .gallery
            .composer()
            .entities()
            .iter()
            .all(|p| p.texture().is_some_and(|t| t.is_synthesized()))
    );
}

#[tokio::test]
async fn sustained_slow_frames_degrade_to_low() {
    let mut harness =
        Harness::mount(dataset(60), LayoutKind::Building, test_config(), FakeLoader::default())
            .await;

    harness.run(21, 100.0).await;
    let report = harness.gallery.frame(harness.now_ms);

    assert_eq!(report.level, PerformanceLevel::Low);
    assert!(report.batch_size < 20);
    assert_eq!(harness.gallery.monitor().get_update_multiplier(), 0.5);
}

#[tokio::test]
async fn scheduler_reaches_every_plane() {
    let mut harness =
        Harness::mount(dataset(45), LayoutKind::Wall, test_config(), FakeLoader::default()).await;
    harness.run_for(4.0).await;

    let planes = harness.gallery.composer().entities();
    assert_eq!(planes.len(), 45);
    assert!(planes.iter().all(|p| p.entrance_complete()));
    assert!(planes.iter().all(|p| p.update_count() > 0 && p.local_time() > 0.0));
}

#[tokio::test]
async fn unavailable_graphics_mounts_nothing() {
    let config = test_config();
    let loader = std::sync::Arc::new(FakeLoader::default());
    let services =
        SceneServices::new(loader.clone(), &config, std::sync::Arc::new(LogNavigator));
    let gallery = Gallery::mount(
        RenderEnvironment::unavailable(),
        dataset(10),
        LayoutKind::Building,
        services,
        &config,
    )
    .await;

    assert!(gallery.is_none());
    assert_eq!(loader.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn mount_waits_for_construction_delay() {
    let mut config = test_config();
    config.media.construction_delay_ms = 100;
    let services = SceneServices::new(
        std::sync::Arc::new(FakeLoader::default()),
        &config,
        std::sync::Arc::new(LogNavigator),
    );

    let started = tokio::time::Instant::now();
    let gallery = Gallery::mount(
        RenderEnvironment::new(desktop()),
        dataset(4),
        LayoutKind::Preview,
        services,
        &config,
    )
    .await;

    assert!(gallery.is_some());
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn mobile_user_agent_uses_smaller_preset() {
    let config = test_config();
    let services = SceneServices::new(
        std::sync::Arc::new(FakeLoader::default()),
        &config,
        std::sync::Arc::new(LogNavigator),
    );
    let environment = RenderEnvironment::new(desktop())
        .with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile");
    let gallery = Gallery::mount(environment, dataset(100), LayoutKind::Building, services, &config)
        .await
        .expect("mounted");

    assert_eq!(gallery.composer().entities().len(), gallery.preset().building_capacity());
    assert!(gallery.composer().entities().len() < 60);
}

#[tokio::test]
async fn present_hands_frames_to_the_surface() {
    let mut harness =
        Harness::mount(dataset(12), LayoutKind::Wall, test_config(), FakeLoader::default()).await;
    let mut surface = HeadlessSurface::default();

    harness.gallery.resize(desktop(), Some(&mut surface));
    harness.run_for(3.0).await;
    harness.gallery.present(&mut surface);

    assert_eq!(surface.frames_presented, 1);
    assert_eq!(surface.physical_size, (1920, 1080));
    assert_eq!(surface.last_item_count, harness.gallery.draw_list().len());
    assert!(surface.last_item_count > 0);
}

#[tokio::test]
async fn dispose_releases_everything_and_is_idempotent() {
    let mut harness =
        Harness::mount(dataset(20), LayoutKind::Wall, test_config(), FakeLoader::default()).await;
    harness.run_for(1.0).await;

    harness.gallery.dispose();
    harness.gallery.dispose();
    tokio::task::yield_now().await;

    assert!(harness.gallery.is_disposed());
    assert!(harness.gallery.composer().entities().is_empty());
    assert!(harness.gallery.draw_list().is_empty());
    let stats = harness.gallery.textures().stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.live_textures, 0);
    assert_eq!(harness.gallery.textures().preloader().stats().cached, 0);

    let report = harness.gallery.frame(harness.now_ms + 16.0);
    assert!(report.skipped);
    assert_eq!(report.draw_count, 0);
}
