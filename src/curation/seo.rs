//! Search/social metadata for highlighted events
//!
//! Sponsored placements always carry the advertising disclosure, both in the
//! visible description and in the structured metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::{CurationCriteria, HighlightType};

pub const ADVERTISING_LABEL: &str = "Advertising";

const DESCRIPTION_MAX_CHARS: usize = 155;

/// The event fields metadata is built from
#[derive(Debug, Clone, Default)]
pub struct HighlightedEvent {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub highlight_type: Option<HighlightType>,
    /// Advertiser shown for vitrine placements
    pub sponsor: Option<String>,
    pub criteria: CurationCriteria,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    /// schema.org Event JSON-LD
    pub structured_data: Value,
}

impl SeoMetadata {
    pub fn for_event(event: &HighlightedEvent) -> Self {
        let base = truncate_chars(event.description.trim(), DESCRIPTION_MAX_CHARS);

        let description = match event.highlight_type {
            Some(HighlightType::Vitrine) => format!("{} · {}", ADVERTISING_LABEL, base),
            Some(HighlightType::Curatorial) => format!(
                "{} ({}/{} curation criteria) · {}",
                HighlightType::Curatorial.label(),
                event.criteria.score(),
                super::CRITERIA_COUNT,
                base
            ),
            None => base.clone(),
        };

        let mut data = json!({
            "@context": "https://schema.org",
            "@type": "Event",
            "name": event.title,
            "description": description,
            "identifier": event.slug,
        });

        if let Some(starts_at) = event.starts_at {
            data["startDate"] = json!(starts_at.to_rfc3339());
        }
        if let Some(venue) = &event.venue_name {
            data["location"] = json!({ "@type": "Place", "name": venue });
        }

        match event.highlight_type {
            Some(HighlightType::Vitrine) => {
                data["sponsor"] = json!({
                    "@type": "Organization",
                    "name": event.sponsor.as_deref().unwrap_or(ADVERTISING_LABEL),
                });
                data["disclaimer"] = json!(ADVERTISING_LABEL);
                data["keywords"] = json!([ADVERTISING_LABEL.to_lowercase()]);
            }
            Some(HighlightType::Curatorial) => {
                data["additionalProperty"] = json!([{
                    "@type": "PropertyValue",
                    "name": "curation_score",
                    "value": event.criteria.score(),
                }]);
            }
            None => {}
        }

        Self {
            title: event.title.clone(),
            description,
            structured_data: data,
        }
    }

    /// Whether both the text and the metadata carry the advertising disclosure
    pub fn discloses_advertising(&self) -> bool {
        self.description.contains(ADVERTISING_LABEL)
            && self.structured_data.get("disclaimer").and_then(Value::as_str)
                == Some(ADVERTISING_LABEL)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
