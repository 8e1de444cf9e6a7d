//! User and event registration commands

use anyhow::{bail, Result};
use tracing::info;

use palco::config::Config;
use palco::curation::HighlightType;
use palco::ledger::{DirectoryStore, EventRecord, Profile};
use palco::PlatformError;
use palco::validation::{slugify, validate_slug, validate_username};

/// Create or update a user's public profile
pub fn user_command(
    config: &Config,
    user_id: &str,
    username: &str,
    display_name: Option<String>,
    avatar_url: Option<String>,
) -> Result<()> {
    validate_username(username)?;

    let store = super::open_store(config)?;
    store.upsert_profile(&Profile {
        user_id: user_id.to_string(),
        username: username.to_string(),
        display_name,
        avatar_url,
    })?;

    info!(user_id, username, "Profile saved");
    println!("Saved @{}", username);
    Ok(())
}

/// Create or update an event; the slug is derived from the title when omitted
pub fn event_command(
    config: &Config,
    event_id: &str,
    title: &str,
    slug: Option<String>,
    highlight: Option<&str>,
) -> Result<()> {
    let slug = slug.unwrap_or_else(|| slugify(title));
    validate_slug(&slug)?;

    let highlight_type = match highlight {
        None => None,
        Some(h) => match HighlightType::from_str(h) {
            Some(t) => Some(t),
            None => bail!("Unknown highlight type: {} (expected curatorial or vitrine)", h),
        },
    };

    let store = super::open_store(config)?;
    let current_slug = existing_slug(store.as_ref(), event_id)?;
    if current_slug.as_deref() != Some(slug.as_str()) && store.slug_taken(&slug)? {
        bail!("Slug already taken: {}", slug);
    }

    store.upsert_event(&EventRecord {
        id: event_id.to_string(),
        slug: slug.clone(),
        title: title.to_string(),
        highlight_type,
    })?;

    println!("Saved event {} ({})", event_id, slug);
    Ok(())
}

/// Slug currently stored for an event; None when the event is new
fn existing_slug<S: DirectoryStore + ?Sized>(
    store: &S,
    event_id: &str,
) -> palco::Result<Option<String>> {
    match store.event(event_id) {
        Ok(event) => Ok(Some(event.slug)),
        Err(PlatformError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palco::config::RewardSettings;
    use palco::error::ErrorKind;
    use palco::gamification::LevelTable;
    use palco::ledger::SqliteStore;

    /// Directory whose event lookup always hits a server error
    struct BrokenDirectory;

    impl DirectoryStore for BrokenDirectory {
        fn upsert_profile(&self, _profile: &Profile) -> palco::Result<()> {
            Ok(())
        }

        fn upsert_event(&self, _event: &EventRecord) -> palco::Result<()> {
            Ok(())
        }

        fn event(&self, _event_id: &str) -> palco::Result<EventRecord> {
            Err(PlatformError::Server("disk I/O error".to_string()))
        }

        fn username_taken(&self, _username: &str) -> palco::Result<bool> {
            Ok(false)
        }

        fn slug_taken(&self, _slug: &str) -> palco::Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_existing_slug_for_known_and_new_events() {
        let store =
            SqliteStore::open_in_memory(LevelTable::default(), RewardSettings::default()).unwrap();
        store
            .upsert_event(&EventRecord {
                id: "ev-1".to_string(),
                slug: "samba-no-cais".to_string(),
                title: "Samba no Cais".to_string(),
                highlight_type: None,
            })
            .unwrap();

        assert_eq!(
            existing_slug(&store, "ev-1").unwrap().as_deref(),
            Some("samba-no-cais")
        );
        assert_eq!(existing_slug(&store, "ev-2").unwrap(), None);
    }

    #[test]
    fn test_existing_slug_propagates_server_errors() {
        let err = existing_slug(&BrokenDirectory, "ev-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }
}
