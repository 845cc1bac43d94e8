//! Parsing helpers for admin form submissions.
//!
//! Admin forms post every field as a string. These helpers turn them into
//! typed values: blank optional fields become `None`, JSON-encoded id lists
//! are decoded leniently and slugs are normalized before they are stored.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};
use folio_common::{AppError, AppResult};
use folio_db::entities::ContentStatus;

/// Trim a field, mapping blank values to `None`.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a mandatory field, rejecting missing or blank values.
pub fn required(value: Option<String>, field: &str) -> AppResult<String> {
    non_empty(value).ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn percent_decode(value: &str) -> Cow<'_, str> {
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}

/// Normalize a slug for storage: trimmed and never percent-encoded.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    let mut slug = raw.trim().to_string();
    // Double-encoded input shows up when slugs are copied out of browser URLs.
    for _ in 0..2 {
        let decoded = percent_decode(&slug).into_owned();
        if decoded == slug {
            break;
        }
        slug = decoded;
    }
    slug.trim().to_string()
}

/// Read and normalize a mandatory slug field.
pub fn required_slug(value: Option<String>) -> AppResult<String> {
    let slug = normalize_slug(&required(value, "Slug")?);
    if slug.is_empty() {
        return Err(AppError::Validation("Slug is required".to_string()));
    }
    Ok(slug)
}

/// Alternative spellings of a requested slug, excluding the slug itself.
///
/// Covers the request decoded once and twice, each also with `+` read as a
/// space.
#[must_use]
pub fn slug_variants(requested: &str) -> Vec<String> {
    let once = percent_decode(requested).into_owned();
    let twice = percent_decode(&once).into_owned();

    let mut variants: Vec<String> = Vec::with_capacity(6);
    for candidate in [requested.to_string(), once, twice] {
        let spaced = candidate.replace('+', " ");
        for value in [candidate, spaced] {
            if value != requested && !variants.contains(&value) {
                variants.push(value);
            }
        }
    }
    variants
}

/// Decode a JSON array of ids sent in a single form field.
///
/// Returns `None` when the field is absent, blank or malformed, which leaves
/// the associations it describes untouched. `[]` yields an empty list.
#[must_use]
pub fn parse_id_list(raw: Option<&str>, field: &str) -> Option<Vec<String>> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(values) => Some(
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        ),
        Err(e) => {
            tracing::warn!(field, error = %e, "Ignoring malformed list field");
            None
        }
    }
}

/// Parse the `status` field. A missing value means draft.
pub fn parse_status(raw: Option<&str>) -> AppResult<ContentStatus> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(ContentStatus::Draft),
        Some(value) => value
            .parse()
            .map_err(|e: folio_db::entities::status::UnknownStatus| {
                AppError::Validation(e.to_string())
            }),
    }
}

/// Parse a checkbox-style flag.
#[must_use]
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Parse an optional non-negative integer field.
pub fn parse_optional_int(raw: Option<&str>, field: &str) -> AppResult<Option<i32>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} must be a whole number"))),
    }
}

/// Publication timestamp to store after a write.
///
/// An existing timestamp is kept. Otherwise it is set to `now` only when the
/// entity is being published.
#[must_use]
pub fn resolve_published_at(
    status: ContentStatus,
    stored: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    match stored {
        Some(published_at) => Some(published_at),
        None if status == ContentStatus::Published => Some(now),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(
            non_empty(Some(" https://github.com/me ".to_string())),
            Some("https://github.com/me".to_string())
        );
    }

    #[test]
    fn test_required() {
        assert!(matches!(
            required(Some(String::new()), "Title"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(required(Some("Folio".into()), "Title").unwrap(), "Folio");
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("  my-project "), "my-project");
        assert_eq!(normalize_slug("caf%C3%A9"), "café");
        assert_eq!(normalize_slug("caf%25C3%25A9"), "café");
        assert_eq!(normalize_slug("100%"), "100%");
    }

    #[test]
    fn test_slug_variants() {
        let variants = slug_variants("caf%25C3%25A9+cr%C3%A8me");
        assert!(variants.contains(&"caf%C3%A9+crème".to_string()));
        assert!(variants.contains(&"café+crème".to_string()));
        assert!(variants.contains(&"café crème".to_string()));
        assert!(!variants.contains(&"caf%25C3%25A9+cr%C3%A8me".to_string()));
    }

    #[test]
    fn test_slug_variants_plain_slug() {
        assert!(slug_variants("plain-slug").is_empty());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(None, "tags"), None);
        assert_eq!(parse_id_list(Some(""), "tags"), None);
        assert_eq!(parse_id_list(Some("not json"), "tags"), None);
        assert_eq!(parse_id_list(Some("[]"), "tags"), Some(vec![]));
        assert_eq!(
            parse_id_list(Some(r#"["a", " b ", ""]"#), "tags"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), ContentStatus::Draft);
        assert_eq!(
            parse_status(Some("published")).unwrap(),
            ContentStatus::Published
        );
        assert!(matches!(
            parse_status(Some("live")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("on")));
        assert!(parse_flag(Some("TRUE")));
        assert!(!parse_flag(Some("off")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int(Some(""), "n").unwrap(), None);
        assert_eq!(parse_optional_int(Some(" 7 "), "n").unwrap(), Some(7));
        assert!(parse_optional_int(Some("seven"), "n").is_err());
        assert!(parse_optional_int(Some("-1"), "n").is_err());
    }

    #[test]
    fn test_publish_sets_timestamp_once() {
        let now = Utc::now().fixed_offset();
        let earlier = now - Duration::days(3);

        assert_eq!(
            resolve_published_at(ContentStatus::Published, None, now),
            Some(now)
        );
        assert_eq!(
            resolve_published_at(ContentStatus::Published, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(resolve_published_at(ContentStatus::Draft, None, now), None);
        assert_eq!(
            resolve_published_at(ContentStatus::Archived, Some(earlier), now),
            Some(earlier)
        );
    }
}
