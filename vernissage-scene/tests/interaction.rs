mod common;

use common::{FRAME_MS, FakeLoader, Harness, dataset, desktop, test_config};
use glam::Vec2;
use vernissage_scene::domains::scene::{EntityId, LayoutKind};

/// Mount a six-plane wall and let the entrance and the dolly finish.
async fn settled_wall() -> Harness {
    let mut harness =
        Harness::mount(dataset(6), LayoutKind::Wall, test_config(), FakeLoader::default()).await;
    harness.run_for(5.0).await;
    harness
}

fn screen_position(harness: &Harness, index: usize) -> Vec2 {
    let plane = &harness.gallery.composer().entities()[index];
    harness
        .gallery
        .camera()
        .world_to_screen(plane.position(), &desktop())
        .expect("plane in front of the camera")
}

async fn hover(harness: &mut Harness, index: usize) -> EntityId {
    let at = screen_position(harness, index);
    harness.gallery.pointer_move(at.x, at.y);
    harness.run(6, FRAME_MS).await;
    harness.gallery.router().hovered().expect("pointer over a plane")
}

#[tokio::test]
async fn hover_follows_the_pointer() {
    let mut harness = settled_wall().await;
    let hovered = hover(&mut harness, 2).await;

    let plane = harness.gallery.composer().entity(hovered).expect("plane exists");
    assert!(plane.is_hovered());
    assert_eq!(
        harness
            .gallery
            .composer()
            .entities()
            .iter()
            .filter(|p| p.is_hovered())
            .count(),
        1
    );

    harness.gallery.pointer_leave();
    assert_eq!(harness.gallery.router().hovered(), None);
    assert!(!harness.gallery.composer().entities().iter().any(|p| p.is_hovered()));
}

#[tokio::test]
async fn click_plays_transition_then_navigates() {
    let mut harness = settled_wall().await;
    let hovered = hover(&mut harness, 1).await;
    let artwork = harness
        .gallery
        .composer()
        .entity(hovered)
        .expect("plane exists")
        .artwork_id()
        .clone();

    let handle = harness.gallery.pointer_down().expect("transition starts");
    assert_eq!(handle.entity(), hovered);
    assert!(harness.gallery.pointer_down().is_none(), "second click is ignored");

    harness.run_for(0.3).await;
    assert!(harness.navigator.requests().is_empty());
    assert!(harness.gallery.router().is_transitioning());

    harness.run_for(1.5).await;
    let requests = harness.navigator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].artwork_id, artwork);
    assert_eq!(requests[0].route, format!("/art/{artwork}"));

    let finished = handle.finished().await.expect("completed, not cancelled");
    assert_eq!(finished, requests[0]);

    let report = harness.gallery.frame(harness.now_ms);
    assert_eq!(report.scene_opacity, 0.0);
    assert!(harness.gallery.router().is_settled());
    assert!(harness.gallery.pointer_down().is_none());

    harness.gallery.reset_transition();
    let report = harness.gallery.frame(harness.now_ms + FRAME_MS);
    assert_eq!(report.scene_opacity, 1.0);
    assert_eq!(harness.navigator.requests().len(), 1);
}

#[tokio::test]
async fn removed_artwork_click_is_a_no_op() {
    let mut harness = settled_wall().await;
    let hovered = hover(&mut harness, 3).await;
    let artwork = harness
        .gallery
        .composer()
        .entity(hovered)
        .expect("plane exists")
        .artwork_id()
        .clone();

    assert!(harness.gallery.dataset_mut().remove(&artwork).is_some());
    assert!(harness.gallery.pointer_down().is_none());

    harness.run_for(2.0).await;
    assert!(harness.navigator.requests().is_empty());
    assert!(!harness.gallery.router().is_transitioning());
    assert!(
        harness
            .gallery
            .draw_list()
            .iter()
            .any(|item| item.entity == hovered),
        "plane stays on screen"
    );
}

#[tokio::test]
async fn tap_picks_and_clicks_at_once() {
    let mut harness = settled_wall().await;
    let at = screen_position(&harness, 4);

    let handle = harness.gallery.tap(at.x, at.y).expect("tap hits a plane");
    harness.run_for(1.5).await;

    assert_eq!(harness.navigator.requests().len(), 1);
    assert!(handle.finished().await.is_some());
}

#[tokio::test]
async fn cancelled_transition_resolves_to_none() {
    let mut harness = settled_wall().await;
    hover(&mut harness, 0).await;
    let handle = harness.gallery.pointer_down().expect("transition starts");
    harness.run_for(0.2).await;

    harness.gallery.reset_transition();
    assert!(handle.finished().await.is_none());

    harness.run_for(1.5).await;
    assert!(harness.navigator.requests().is_empty());
}

#[tokio::test]
async fn tap_on_empty_space_does_nothing() {
    let mut harness = settled_wall().await;
    assert!(harness.gallery.tap(2.0, 2.0).is_none());
    assert_eq!(harness.gallery.router().hovered(), None);
}
