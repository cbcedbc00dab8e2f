//! Draw lists and presentation surfaces.
//!
//! The engine does not own a GPU context. Each frame it produces a list of
//! [`DrawItem`]s that a [`RenderSurface`] presents however it likes.

use std::sync::Arc;

use glam::Mat4;

use crate::domains::media::Texture;
use crate::domains::scene::camera::Camera;
use crate::domains::scene::entity::{EntityId, LodLevel};
use crate::infra::device::Viewport;

#[derive(Debug, Clone)]
pub struct DrawItem {
    pub entity: EntityId,
    /// Model matrix, unit quad scaled to the plane size.
    pub transform: Mat4,
    pub opacity: f32,
    pub texture: Option<Arc<Texture>>,
    pub lod: LodLevel,
    pub edge_opacity: f32,
    pub glow_opacity: f32,
}

/// Everything a surface needs to present one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub backdrop_opacity: f32,
    pub items: &'a [DrawItem],
}

pub trait RenderSurface: Send + std::fmt::Debug {
    fn resize(&mut self, viewport: &Viewport, pixel_ratio: f32);
    fn present(&mut self, frame: &FrameView<'_>);
}

/// Surface that only records what it was asked to draw.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    pub frames_presented: u64,
    pub last_item_count: usize,
    pub last_textured_count: usize,
    pub physical_size: (u32, u32),
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, viewport: &Viewport, pixel_ratio: f32) {
        self.physical_size = (
            (viewport.width as f32 * pixel_ratio).round() as u32,
            (viewport.height as f32 * pixel_ratio).round() as u32,
        );
    }

    fn present(&mut self, frame: &FrameView<'_>) {
        self.frames_presented += 1;
        self.last_item_count = frame.items.len();
        self.last_textured_count = frame
            .items
            .iter()
            .filter(|item| item.texture.is_some())
            .count();
    }
}
