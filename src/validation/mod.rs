//! Identifier validation for usernames and event slugs

mod debounce;
mod rules;

pub use debounce::{Availability, AvailabilityBackend, DebouncedChecker, StoreAvailability};
pub use rules::{
    slugify, validate_slug, validate_username, CheckField, SLUG_MAX_LEN, SLUG_MIN_LEN,
    USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
