//! Curation command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use palco::config::Config;
use palco::curation::{CriterionKey, CurationCriteria, HighlightType, HighlightedEvent, SeoMetadata};

/// Highlighted event as written by a curator
#[derive(Debug, Deserialize)]
struct CurationInput {
    title: String,
    slug: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    venue_name: Option<String>,
    #[serde(default)]
    highlight_type: Option<HighlightType>,
    #[serde(default)]
    sponsor: Option<String>,
    #[serde(default)]
    criteria: serde_json::Value,
}

/// Render the curation summary and metadata for an event JSON file
pub fn curation_command(config: &Config, path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: CurationInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let event = HighlightedEvent {
        criteria: CurationCriteria::from_json(&input.criteria),
        title: input.title,
        slug: input.slug,
        description: input.description,
        starts_at: input.starts_at,
        venue_name: input.venue_name,
        highlight_type: input.highlight_type,
        sponsor: input.sponsor,
    };
    let seo = SeoMetadata::for_event(&event);

    if json {
        println!("{}", serde_json::to_string_pretty(&seo)?);
        return Ok(());
    }

    println!("{}", event.title);
    if let Some(kind) = event.highlight_type {
        println!("  Highlight: {}", kind.label());
    }
    println!("  Score:     {}/{}", event.criteria.score(), CriterionKey::all().len());

    let chips = event.criteria.chips(config.curation.max_chips);
    if !chips.labels.is_empty() {
        let mut line = chips.labels.join(" · ");
        if chips.overflow > 0 {
            line.push_str(&format!(" +{}", chips.overflow));
        }
        println!("  Chips:     {}", line);
    }

    println!("\nCriteria:");
    for key in CriterionKey::all() {
        let c = event.criteria.get(*key);
        println!("  [{}] {:<22} {}", if c.checked { "x" } else { " " }, key.label(), c.note);
    }

    println!("\nDescription: {}", seo.description);
    Ok(())
}
