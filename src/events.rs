//! In-process notifications for UI coordination.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Notifications carry no payload beyond what is already in persisted state,
/// except color selection which carries the chosen variant index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    ReservationStarted,
    ReservationExpired,
    ReservationCleared,
    ColorSelected { index: usize },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: StoreEvent) {
        // Sending only fails when nobody is listening.
        if self.sender.send(event).is_err() {
            tracing::trace!(?event, "event dropped, no listeners");
        }
    }

    /// Sync the variant gallery with the color picked at `index`.
    pub fn select_color(&self, index: usize) {
        self.publish(StoreEvent::ColorSelected { index });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_listeners_is_silent() {
        let bus = EventBus::default();
        bus.publish(StoreEvent::ReservationStarted);
    }

    #[tokio::test]
    async fn subscribers_receive_color_selection() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.select_color(2);

        assert_eq!(rx.recv().await.ok(), Some(StoreEvent::ColorSelected { index: 2 }));
    }
}
