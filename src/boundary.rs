//! Error boundary policy
//!
//! A boundary catches failures from the subtree it wraps and decides what the
//! user may do next. Resets are counted; once `max_retries` resets have failed
//! the only remaining option is a full reload.

use std::fmt;

use tracing::{error, warn};

use crate::config::BoundarySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLevel {
    /// Wraps a single widget or section
    Component,
    /// Wraps a whole page
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Retry,
    Reload,
}

/// What the fallback UI should offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOptions {
    pub suggested: RecoveryAction,
    pub can_retry: bool,
    pub can_reload: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub struct ErrorBoundary {
    level: BoundaryLevel,
    max_retries: u32,
    resets: u32,
    last_error: Option<String>,
}

impl ErrorBoundary {
    pub fn new(level: BoundaryLevel, max_retries: u32) -> Self {
        Self {
            level,
            max_retries,
            resets: 0,
            last_error: None,
        }
    }

    pub fn from_settings(level: BoundaryLevel, settings: &BoundarySettings) -> Self {
        Self::new(level, settings.max_retries)
    }

    pub fn level(&self) -> BoundaryLevel {
        self.level
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    fn retries_left(&self) -> bool {
        self.resets < self.max_retries
    }

    /// Record a failure from the wrapped subtree
    pub fn catch(&mut self, err: &dyn fmt::Display) -> RecoveryOptions {
        let message = err.to_string();
        match self.level {
            BoundaryLevel::Critical => error!(resets = self.resets, error = %message, "Page failed"),
            BoundaryLevel::Component => warn!(resets = self.resets, error = %message, "Component failed"),
        }
        self.last_error = Some(message);
        self.options()
    }

    pub fn options(&self) -> RecoveryOptions {
        let can_retry = self.retries_left();
        let can_reload = self.level == BoundaryLevel::Critical || !can_retry;
        RecoveryOptions {
            suggested: if can_retry {
                RecoveryAction::Retry
            } else {
                RecoveryAction::Reload
            },
            can_retry,
            can_reload,
            message: match self.level {
                BoundaryLevel::Critical => "This page failed to load.",
                BoundaryLevel::Component => "This section failed to load.",
            },
        }
    }

    /// User asked to try again. Returns `Reload` once resets are exhausted.
    pub fn reset(&mut self) -> RecoveryAction {
        if !self.retries_left() {
            warn!(max_retries = self.max_retries, "Retries exhausted, reload required");
            return RecoveryAction::Reload;
        }
        self.resets += 1;
        self.last_error = None;
        RecoveryAction::Retry
    }

    /// The subtree rendered cleanly
    pub fn render_succeeded(&mut self) {
        self.resets = 0;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;

    #[test]
    fn test_component_offers_retry_until_exhausted() {
        let mut boundary = ErrorBoundary::new(BoundaryLevel::Component, 2);
        let err = PlatformError::Server("boom".to_string());

        for _ in 0..2 {
            let opts = boundary.catch(&err);
            assert!(opts.can_retry);
            assert!(!opts.can_reload);
            assert_eq!(boundary.reset(), RecoveryAction::Retry);
        }

        let opts = boundary.catch(&err);
        assert_eq!(opts.suggested, RecoveryAction::Reload);
        assert!(!opts.can_retry);
        assert!(opts.can_reload);
        assert_eq!(boundary.reset(), RecoveryAction::Reload);
        assert_eq!(boundary.resets(), 2);
        assert!(boundary.has_error());
    }

    #[test]
    fn test_critical_always_offers_reload() {
        let mut boundary = ErrorBoundary::new(BoundaryLevel::Critical, 3);
        let opts = boundary.catch(&"render failed");
        assert!(opts.can_retry);
        assert!(opts.can_reload);
        assert_eq!(opts.message, "This page failed to load.");
    }

    #[test]
    fn test_success_clears_counter() {
        let mut boundary = ErrorBoundary::new(BoundaryLevel::Component, 1);
        boundary.catch(&"first");
        boundary.reset();
        boundary.render_succeeded();
        assert_eq!(boundary.resets(), 0);
        assert!(boundary.last_error().is_none());

        assert!(boundary.catch(&"second").can_retry);
    }

    #[test]
    fn test_zero_retries_goes_straight_to_reload() {
        let mut boundary = ErrorBoundary::from_settings(
            BoundaryLevel::Component,
            &BoundarySettings { max_retries: 0 },
        );
        assert_eq!(boundary.catch(&"x").suggested, RecoveryAction::Reload);
    }
}
