//! Navigation hand-off to the embedding application.

use tokio::sync::mpsc;
use vernissage_model::{ArtworkId, ArtworkRef};

/// Request to open an artwork's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub artwork_id: ArtworkId,
    pub route: String,
}

impl NavigationRequest {
    pub fn for_artwork(artwork: &ArtworkRef) -> Self {
        Self {
            artwork_id: artwork.id.clone(),
            route: artwork.detail_route(),
        }
    }
}

/// External router. The scene never routes by itself.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    fn navigate(&self, request: NavigationRequest);
}

/// Navigator that only logs, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, request: NavigationRequest) {
        log::info!("Navigate to {} (artwork {})", request.route, request.artwork_id);
    }
}

/// Navigator that forwards requests over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<NavigationRequest>,
}

impl ChannelNavigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, request: NavigationRequest) {
        if self.sender.send(request).is_err() {
            log::warn!("Navigation receiver dropped; request discarded");
        }
    }
}
