//! Palco - community engagement for a cultural events platform
//!
//! Users earn points for qualifying actions (checking in at an event, posting a
//! review). Points are kept in an append-only ledger; levels, streaks, badges
//! and rankings are derived from it.
//!
//! ## Layers
//!
//! - [`ledger`]: points ledger, attendance and profile storage (SQLite)
//! - [`gamification`]: level tiers, badge unlocks, global and monthly rankings
//! - [`curation`]: editorial criteria and sponsored-placement disclosure
//! - [`social`]: optimistic attendance/save toggles
//! - [`validation`]: username and slug rules, debounced availability checks
//! - [`boundary`]: retry/reload policy for failing UI sections

pub mod boundary;
pub mod config;
pub mod curation;
pub mod error;
pub mod gamification;
pub mod ledger;
pub mod social;
pub mod validation;

pub use error::{PlatformError, Result};
