//! Checkout reservation window.
//!
//! A reservation is advisory: it lives only in the local key-value slot and
//! expires lazily, i.e. every read compares `expires_at` with the clock and
//! discards a stale reservation on the spot. [`ReservationWatcher`] is the
//! single owner of the once-per-second poll that announces expiry.

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

use crate::{
    clock::Clock,
    events::{EventBus, StoreEvent},
    models::{CartLine, Reservation},
    storage::{KeyValueStore, load_json, save_json},
};

pub const RESERVATION_STORAGE_KEY: &str = "cart_reservation";
pub const RESERVATION_WINDOW_MINUTES: i64 = 15;
pub const POLL_INTERVAL: StdDuration = StdDuration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    /// Under five minutes left.
    Low,
    /// Under two minutes left.
    Critical,
}

impl Urgency {
    pub fn for_remaining(remaining: Duration) -> Self {
        let minutes = remaining.num_minutes();
        if minutes < 2 {
            Urgency::Critical
        } else if minutes < 5 {
            Urgency::Low
        } else {
            Urgency::Normal
        }
    }
}

/// `MM:SS`, truncating partial seconds.
pub fn format_remaining(remaining: Duration) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[derive(Debug, Clone)]
pub struct ReservationManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    window: Duration,
}

impl ReservationManager {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            store,
            clock,
            events,
            window: Duration::minutes(RESERVATION_WINDOW_MINUTES),
        }
    }

    pub fn with_duration(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn start_reservation(&self, items: Vec<CartLine>) -> Reservation {
        let now = self.clock.now();
        let reservation = Reservation {
            start_time: now,
            expires_at: now + self.window,
            items,
        };

        self.persist(&reservation);
        tracing::debug!(expires_at = %reservation.expires_at, "reservation started");
        self.events.publish(StoreEvent::ReservationStarted);

        reservation
    }

    /// The active reservation, or `None` if absent or expired. An expired
    /// reservation is removed from storage by this call.
    pub fn get_reservation(&self) -> Option<Reservation> {
        let reservation = self.peek()?;
        if reservation.is_expired(self.clock.now()) {
            self.clear_reservation();
            return None;
        }
        Some(reservation)
    }

    pub fn has_active_reservation(&self) -> bool {
        self.get_reservation().is_some()
    }

    pub fn remaining_time(&self) -> Duration {
        self.get_reservation()
            .map(|reservation| reservation.remaining(self.clock.now()))
            .unwrap_or_else(Duration::zero)
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::for_remaining(self.remaining_time())
    }

    /// Push expiry to a full window from now; does nothing without an active
    /// reservation.
    pub fn extend_reservation(&self) -> Option<Reservation> {
        let mut reservation = self.get_reservation()?;
        reservation.expires_at = self.clock.now() + self.window;
        self.persist(&reservation);
        Some(reservation)
    }

    pub fn clear_reservation(&self) {
        if let Err(err) = self.store.remove(RESERVATION_STORAGE_KEY) {
            tracing::warn!(error = %err, "failed to clear reservation");
        }
    }

    /// Stored reservation without the expiry check.
    fn peek(&self) -> Option<Reservation> {
        load_json(self.store.as_ref(), RESERVATION_STORAGE_KEY)
    }

    fn persist(&self, reservation: &Reservation) {
        if let Err(err) = save_json(self.store.as_ref(), RESERVATION_STORAGE_KEY, reservation) {
            tracing::warn!(error = %err, "failed to persist reservation");
        }
    }
}

/// Polls the reservation and announces expiry.
///
/// Expiry is signalled at most once per reservation seen by this watcher.
/// Two watchers over the same storage can both signal, so listeners must
/// treat `ReservationExpired` as idempotent.
#[derive(Debug)]
pub struct ReservationWatcher {
    manager: ReservationManager,
    last_expires_at: Option<DateTime<Utc>>,
}

impl ReservationWatcher {
    pub fn new(manager: ReservationManager) -> Self {
        Self {
            manager,
            last_expires_at: None,
        }
    }

    /// One tick of the countdown. Returns the time left, or `None` once no
    /// reservation is active.
    pub fn poll(&mut self) -> Option<Duration> {
        let now = self.manager.clock.now();

        match self.manager.peek() {
            Some(reservation) if reservation.remaining(now) > Duration::zero() => {
                self.last_expires_at = Some(reservation.expires_at);
                Some(reservation.remaining(now))
            }
            Some(_) => {
                self.manager.clear_reservation();
                self.signal_expired();
                None
            }
            None => {
                // Someone else may have discarded it lazily after it ran out.
                if self.last_expires_at.is_some_and(|expires_at| expires_at <= now) {
                    self.signal_expired();
                }
                self.last_expires_at = None;
                None
            }
        }
    }

    pub fn spawn(mut self, period: StdDuration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }

    fn signal_expired(&mut self) {
        self.last_expires_at = None;
        tracing::info!("reservation expired");
        self.manager.events.publish(StoreEvent::ReservationExpired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(Duration::seconds(900)), "15:00");
        assert_eq!(format_remaining(Duration::milliseconds(65_999)), "01:05");
        assert_eq!(format_remaining(Duration::seconds(-3)), "00:00");
    }

    #[test]
    fn urgency_thresholds() {
        assert_eq!(Urgency::for_remaining(Duration::minutes(10)), Urgency::Normal);
        assert_eq!(Urgency::for_remaining(Duration::seconds(299)), Urgency::Low);
        assert_eq!(Urgency::for_remaining(Duration::seconds(119)), Urgency::Critical);
    }
}
