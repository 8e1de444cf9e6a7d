//! Optimistic toggles with rollback
//!
//! The visible value flips as soon as the user acts. While the backend call is
//! in flight the toggle refuses another change; on failure the previous value
//! is restored.
//!
//! ```text
//! Idle ──begin──▶ Pending ──commit──▶ Committed
//!                    │
//!                    └──rollback──▶ RolledBack
//! ```

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::PlatformError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TogglePhase<T> {
    Idle,
    Pending { previous: T },
    Committed,
    RolledBack,
}

#[derive(Debug, thiserror::Error)]
pub enum ToggleError {
    #[error("A change is already in flight")]
    InFlight,

    #[error("No change is in flight")]
    NotPending,

    #[error(transparent)]
    Backend(#[from] PlatformError),
}

/// Toggle state machine, free of any I/O
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticToggle<T> {
    value: T,
    phase: TogglePhase<T>,
}

impl<T: Clone> OptimisticToggle<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            phase: TogglePhase::Idle,
        }
    }

    /// Value to render, optimistic while pending
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn phase(&self) -> &TogglePhase<T> {
        &self.phase
    }

    /// The control should be disabled while this is true
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, TogglePhase::Pending { .. })
    }

    /// Show `next` immediately and wait for the backend
    pub fn begin(&mut self, next: T) -> Result<(), ToggleError> {
        if self.is_pending() {
            return Err(ToggleError::InFlight);
        }
        let previous = std::mem::replace(&mut self.value, next);
        self.phase = TogglePhase::Pending { previous };
        Ok(())
    }

    pub fn commit(&mut self) -> Result<(), ToggleError> {
        if !self.is_pending() {
            return Err(ToggleError::NotPending);
        }
        self.phase = TogglePhase::Committed;
        Ok(())
    }

    /// Restore the value from before `begin`
    pub fn rollback(&mut self) -> Result<(), ToggleError> {
        match std::mem::replace(&mut self.phase, TogglePhase::RolledBack) {
            TogglePhase::Pending { previous } => {
                self.value = previous;
                Ok(())
            }
            other => {
                self.phase = other;
                Err(ToggleError::NotPending)
            }
        }
    }
}

/// Persists a toggle's value
#[async_trait]
pub trait ToggleBackend<T>: Send + Sync {
    async fn apply(&self, value: &T) -> Result<(), PlatformError>;
}

fn lock_state<T>(state: &Mutex<OptimisticToggle<T>>) -> MutexGuard<'_, OptimisticToggle<T>> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Rolls a pending change back if the `set` future is dropped before the
/// backend answers
struct PendingGuard<'a, T: Clone> {
    state: &'a Mutex<OptimisticToggle<T>>,
    armed: bool,
}

impl<T: Clone> PendingGuard<'_, T> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T: Clone> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed && lock_state(self.state).rollback().is_ok() {
            warn!("Toggle abandoned before the backend answered, rolled back");
        }
    }
}

/// Drives an [`OptimisticToggle`] against a backend
pub struct ToggleController<T, B> {
    state: Mutex<OptimisticToggle<T>>,
    backend: B,
}

impl<T, B> ToggleController<T, B>
where
    T: Clone + Send + Sync + std::fmt::Debug,
    B: ToggleBackend<T>,
{
    pub fn new(initial: T, backend: B) -> Self {
        Self {
            state: Mutex::new(OptimisticToggle::new(initial)),
            backend,
        }
    }

    fn lock(&self) -> MutexGuard<'_, OptimisticToggle<T>> {
        lock_state(&self.state)
    }

    pub fn value(&self) -> T {
        self.lock().value().clone()
    }

    pub fn phase(&self) -> TogglePhase<T> {
        self.lock().phase().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    /// Apply `next` optimistically; commit on success, roll back on failure.
    ///
    /// Returns the value left showing. A call made while another is in flight
    /// is rejected with [`ToggleError::InFlight`] and changes nothing.
    /// Dropping the returned future mid-flight restores the previous value.
    pub async fn set(&self, next: T) -> Result<T, ToggleError> {
        self.lock().begin(next.clone())?;
        let mut guard = PendingGuard {
            state: &self.state,
            armed: true,
        };

        let outcome = self.backend.apply(&next).await;
        guard.disarm();

        let mut state = self.lock();
        match outcome {
            Ok(()) => {
                state.commit()?;
                debug!(value = ?next, "Toggle committed");
                Ok(state.value().clone())
            }
            Err(err) => {
                state.rollback()?;
                warn!(error = %err, restored = ?state.value(), "Toggle rolled back");
                Err(ToggleError::Backend(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;

    #[test]
    fn test_state_machine_transitions() {
        let mut toggle = OptimisticToggle::new(false);
        assert_eq!(toggle.phase(), &TogglePhase::Idle);

        toggle.begin(true).unwrap();
        assert!(toggle.is_pending());
        assert!(*toggle.value());
        assert!(matches!(toggle.begin(false), Err(ToggleError::InFlight)));

        toggle.commit().unwrap();
        assert_eq!(toggle.phase(), &TogglePhase::Committed);
        assert!(*toggle.value());

        toggle.begin(false).unwrap();
        toggle.rollback().unwrap();
        assert_eq!(toggle.phase(), &TogglePhase::RolledBack);
        assert!(*toggle.value());
    }

    #[test]
    fn test_commit_without_begin_fails() {
        let mut toggle = OptimisticToggle::new(1);
        assert!(matches!(toggle.commit(), Err(ToggleError::NotPending)));
        assert!(matches!(toggle.rollback(), Err(ToggleError::NotPending)));
        assert_eq!(toggle.phase(), &TogglePhase::Idle);
    }

    struct GatedBackend {
        gate: Arc<Notify>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ToggleBackend<bool> for GatedBackend {
        async fn apply(&self, _value: &bool) -> Result<(), PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail.load(Ordering::SeqCst) {
                Err(PlatformError::Network("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn controller(fail: bool) -> (Arc<ToggleController<bool, GatedBackend>>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = GatedBackend {
            gate: Arc::clone(&gate),
            fail: AtomicBool::new(fail),
            calls: AtomicUsize::new(0),
        };
        (Arc::new(ToggleController::new(false, backend)), gate)
    }

    async fn wait_pending(ctrl: &ToggleController<bool, GatedBackend>) {
        while !ctrl.is_pending() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected_while_pending() {
        let (ctrl, gate) = controller(false);
        let first = tokio::spawn({
            let ctrl = Arc::clone(&ctrl);
            async move { ctrl.set(true).await }
        });
        wait_pending(&ctrl).await;

        assert!(ctrl.value());
        assert!(matches!(ctrl.set(false).await, Err(ToggleError::InFlight)));

        gate.notify_one();
        assert!(first.await.unwrap().unwrap());
        assert_eq!(ctrl.phase(), TogglePhase::Committed);
        assert_eq!(ctrl.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_rolls_back() {
        let (ctrl, gate) = controller(true);
        let pending = tokio::spawn({
            let ctrl = Arc::clone(&ctrl);
            async move { ctrl.set(true).await }
        });
        wait_pending(&ctrl).await;
        assert!(ctrl.value());

        gate.notify_one();
        let result = pending.await.unwrap();
        assert!(matches!(result, Err(ToggleError::Backend(PlatformError::Network(_)))));
        assert!(!ctrl.value());
        assert_eq!(ctrl.phase(), TogglePhase::RolledBack);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_change_rolls_back() {
        let (ctrl, gate) = controller(false);

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(100), ctrl.set(true)).await;
        assert!(abandoned.is_err());
        assert!(!ctrl.is_pending());
        assert!(!ctrl.value());
        assert_eq!(ctrl.phase(), TogglePhase::RolledBack);

        // The control is usable again
        let retry = tokio::spawn({
            let ctrl = Arc::clone(&ctrl);
            async move { ctrl.set(true).await }
        });
        wait_pending(&ctrl).await;
        gate.notify_one();
        assert!(retry.await.unwrap().unwrap());
        assert_eq!(ctrl.phase(), TogglePhase::Committed);
        assert_eq!(ctrl.backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequential_changes_last_write_wins() {
        let (ctrl, gate) = controller(false);
        for next in [true, false, true] {
            let task = tokio::spawn({
                let ctrl = Arc::clone(&ctrl);
                async move { ctrl.set(next).await }
            });
            wait_pending(&ctrl).await;
            gate.notify_one();
            task.await.unwrap().unwrap();
        }
        assert!(ctrl.value());
    }
}
