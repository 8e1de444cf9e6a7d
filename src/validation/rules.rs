//! Format rules for user-chosen identifiers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlatformError, Result};

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 80;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug pattern"));

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_.]*$").expect("valid username pattern"));

/// Which identifier is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckField {
    Username,
    Slug,
}

impl CheckField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckField::Username => "username",
            CheckField::Slug => "slug",
        }
    }

    pub fn validate(&self, value: &str) -> Result<()> {
        match self {
            CheckField::Username => validate_username(value),
            CheckField::Slug => validate_slug(value),
        }
    }
}

pub fn validate_slug(slug: &str) -> Result<()> {
    let len = slug.chars().count();
    if !(SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&len) {
        return Err(PlatformError::validation(
            "slug",
            format!("must be {}-{} characters", SLUG_MIN_LEN, SLUG_MAX_LEN),
        ));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(PlatformError::validation(
            "slug",
            "use lowercase letters, digits and single hyphens",
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(PlatformError::validation(
            "username",
            format!(
                "must be {}-{} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(PlatformError::validation(
            "username",
            "start with a letter; use lowercase letters, digits, '_' or '.'",
        ));
    }
    Ok(())
}

/// Build a slug from a free-form title.
///
/// Accented Latin letters are folded to ASCII, every other run of
/// non-alphanumerics becomes one hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(c);
        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(folded);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.chars().count() > SLUG_MAX_LEN {
        slug = slug.chars().take(SLUG_MAX_LEN).collect();
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_valid_slugs() {
        for slug in ["abc", "samba-no-cais", "festa-2025", &"a".repeat(80)] {
            assert!(validate_slug(slug).is_ok(), "{slug}");
        }
    }

    #[test]
    fn test_invalid_slugs() {
        for slug in ["ab", "-abc", "abc-", "a--b", "Abc", "abc def", "açaí", &"a".repeat(81)] {
            let err = validate_slug(slug).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{slug}");
        }
    }

    #[test]
    fn test_usernames() {
        assert!(validate_username("ana").is_ok());
        assert!(validate_username("ana.maria_92").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("9ana").is_err());
        assert!(validate_username("_ana").is_err());
        assert!(validate_username("Ana").is_err());
        assert!(validate_username("ana-maria").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Samba no Cais!"), "samba-no-cais");
        assert_eq!(slugify("  Festa Junina — São João  "), "festa-junina-sao-joao");
        assert_eq!(slugify("Ação & Reação"), "acao-reacao");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_output_validates() {
        let slug = slugify(&"Noite de Forró ".repeat(20));
        assert!(slug.chars().count() <= SLUG_MAX_LEN);
        assert!(validate_slug(&slug).is_ok());
    }

    #[test]
    fn test_check_field_dispatch() {
        assert!(CheckField::Slug.validate("samba-no-cais").is_ok());
        assert!(CheckField::Username.validate("samba-no-cais").is_err());
    }
}
