//! Graceful shutdown controller with in-flight session tracking.
//!
//! Streaming sessions and request workers register themselves through
//! RAII guards; on shutdown the server stops admitting new sessions and
//! grants in-flight ones a bounded grace period to finish. Health state
//! transitions are lock-free via `ArcSwap`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Server health state, transitioned by the shutdown controller.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Server is initializing (not yet admitting sessions).
    Starting,
    /// Server is fully operational.
    Ready,
    /// Server is draining in-flight sessions; new ones are refused.
    Draining,
    /// All in-flight sessions have completed.
    Stopped,
}

/// Coordinates graceful shutdown across the server.
///
/// 1. The ingestion pipeline checks [`is_draining()`](Self::is_draining)
///    before admitting a session
/// 2. Each session holds a [`SessionGuard`] for its lifetime
/// 3. [`trigger_shutdown()`](Self::trigger_shutdown) moves to Draining
///    and notifies all listeners
/// 4. [`wait_for_drain()`](Self::wait_for_drain) blocks until in-flight
///    sessions complete or the grace period expires
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a new controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            in_flight: Arc::new(AtomicU64::new(0)),
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    /// Transitions to `Ready`, allowing sessions to be admitted.
    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Returns the current health state.
    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Whether shutdown has been triggered (or completed).
    #[must_use]
    pub fn is_draining(&self) -> bool {
        matches!(
            self.health_state(),
            HealthState::Draining | HealthState::Stopped
        )
    }

    /// Returns a receiver notified when shutdown is triggered.
    ///
    /// Long-running tasks select on this alongside their main loop to
    /// begin teardown.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Initiates graceful shutdown: transitions to `Draining` and
    /// signals every shutdown receiver. New sessions are refused from
    /// this point on.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
        // Ignore send errors -- receivers may have been dropped
        let _ = self.shutdown_signal.send(true);
    }

    /// Creates an RAII guard tracking one in-flight session.
    ///
    /// The counter is decremented when the guard drops, even if the
    /// session task panics.
    #[must_use]
    pub fn session_guard(&self) -> SessionGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        SessionGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Returns the number of in-flight sessions.
    #[must_use]
    pub fn active_sessions(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits for all in-flight sessions to complete, up to `grace`.
    ///
    /// Returns `true` and transitions to `Stopped` when the last session
    /// finishes inside the grace period; returns `false` (state remains
    /// `Draining`) when the period expires first, after which the caller
    /// force-closes the transport.
    pub async fn wait_for_drain(&self, grace: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + grace;

        loop {
            if self.in_flight.load(Ordering::Relaxed) == 0 {
                self.health_state.store(Arc::new(HealthState::Stopped));
                return true;
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }

            // Poll at 10ms intervals to avoid busy-waiting
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that decrements the in-flight session counter on drop.
#[derive(Debug)]
pub struct SessionGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_transitions() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);
        assert!(!controller.is_draining());

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);
        assert!(controller.is_draining());
    }

    #[test]
    fn session_guards_track_in_flight_count() {
        let controller = ShutdownController::new();
        assert_eq!(controller.active_sessions(), 0);

        let guard1 = controller.session_guard();
        let guard2 = controller.session_guard();
        assert_eq!(controller.active_sessions(), 2);

        drop(guard1);
        assert_eq!(controller.active_sessions(), 1);
        drop(guard2);
        assert_eq!(controller.active_sessions(), 0);
    }

    #[tokio::test]
    async fn shutdown_receiver_notified() {
        let controller = ShutdownController::new();
        let mut rx = controller.shutdown_receiver();
        assert!(!*rx.borrow());

        controller.trigger_shutdown();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn drain_completes_when_sessions_finish() {
        let controller = ShutdownController::new();
        controller.set_ready();

        let guard = controller.session_guard();
        controller.trigger_shutdown();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        let drained = controller.wait_for_drain(Duration::from_secs(2)).await;
        assert!(drained);
        assert_eq!(controller.health_state(), HealthState::Stopped);

        release.await.unwrap();
    }

    #[tokio::test]
    async fn drain_times_out_with_stuck_session() {
        let controller = ShutdownController::new();
        controller.set_ready();

        let _guard = controller.session_guard();
        controller.trigger_shutdown();

        let drained = controller.wait_for_drain(Duration::from_millis(50)).await;
        assert!(!drained);
        // State stays Draining so the caller knows to force-close.
        assert_eq!(controller.health_state(), HealthState::Draining);
    }
}
