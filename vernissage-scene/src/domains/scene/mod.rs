//! Scene graph: planes, layouts, camera and the update scheduler.

pub mod backdrop;
pub mod camera;
pub mod composer;
pub mod entity;
pub mod layout;
pub mod render;
pub mod transitions;

pub use backdrop::Backdrop;
pub use camera::{Camera, Ray, screen_to_ndc};
pub use composer::{SceneComposer, TickReport};
pub use entity::{EntityId, LodLevel, PlaneTuning, Presentation, Tier, WorkPlane};
pub use layout::{LayoutKind, LayoutSlot};
pub use render::{DrawItem, FrameView, HeadlessSurface, RenderSurface};
pub use transitions::{EasingFunction, Tween};
