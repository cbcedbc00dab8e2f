//! Pointer input, the full-screen transition and navigation hand-off.

pub mod fullscreen;
pub mod navigation;
pub mod router;

pub use fullscreen::{FullscreenTransition, TransitionHandle, TransitionPhase};
pub use navigation::{ChannelNavigator, LogNavigator, NavigationRequest, Navigator};
pub use router::InteractionRouter;
