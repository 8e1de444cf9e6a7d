//! Editorial curation of highlighted events
//!
//! Curators check off up to eight fixed criteria per event. The score is the
//! number of checked criteria; the display shows a few of them as chips.

mod seo;

pub use seo::{HighlightedEvent, SeoMetadata, ADVERTISING_LABEL};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Note used for criteria the curator never filled in
pub const NOT_INFORMED: &str = "not informed";

/// Number of fixed criteria
pub const CRITERIA_COUNT: usize = 8;

/// Classification of a highlighted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightType {
    /// Editorially selected
    Curatorial,
    /// Paid placement
    #[serde(alias = "sponsored")]
    Vitrine,
}

impl HighlightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curatorial => "curatorial",
            Self::Vitrine => "vitrine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "curatorial" => Some(Self::Curatorial),
            "vitrine" | "sponsored" => Some(Self::Vitrine),
            _ => None,
        }
    }

    /// Label shown on the event card
    pub fn label(&self) -> &'static str {
        match self {
            Self::Curatorial => "Curator's pick",
            Self::Vitrine => ADVERTISING_LABEL,
        }
    }

    pub fn is_sponsored(&self) -> bool {
        matches!(self, Self::Vitrine)
    }
}

/// The eight curation criteria, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKey {
    CulturalRelevance,
    Lineup,
    DiversityInclusion,
    LocalImpact,
    CuratorialCoherence,
    AudienceExperience,
    CityConnection,
    EngagementPotential,
}

impl CriterionKey {
    pub fn all() -> &'static [CriterionKey; CRITERIA_COUNT] {
        &[
            Self::CulturalRelevance,
            Self::Lineup,
            Self::DiversityInclusion,
            Self::LocalImpact,
            Self::CuratorialCoherence,
            Self::AudienceExperience,
            Self::CityConnection,
            Self::EngagementPotential,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CulturalRelevance => "cultural_relevance",
            Self::Lineup => "lineup",
            Self::DiversityInclusion => "diversity_inclusion",
            Self::LocalImpact => "local_impact",
            Self::CuratorialCoherence => "curatorial_coherence",
            Self::AudienceExperience => "audience_experience",
            Self::CityConnection => "city_connection",
            Self::EngagementPotential => "engagement_potential",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CulturalRelevance => "Cultural relevance",
            Self::Lineup => "Strong lineup",
            Self::DiversityInclusion => "Diversity & inclusion",
            Self::LocalImpact => "Local impact",
            Self::CuratorialCoherence => "Curatorial coherence",
            Self::AudienceExperience => "Audience experience",
            Self::CityConnection => "City connection",
            Self::EngagementPotential => "Engagement potential",
        }
    }
}

/// One curator judgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationCriterion {
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub note: String,
}

impl Default for CurationCriterion {
    fn default() -> Self {
        Self {
            checked: false,
            note: NOT_INFORMED.to_string(),
        }
    }
}

/// All eight criteria of an event. Missing input criteria are unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationCriteria {
    criteria: [CurationCriterion; CRITERIA_COUNT],
}

/// Satisfied criteria labels for chips, plus the collapsed remainder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipList {
    pub labels: Vec<&'static str>,
    pub overflow: usize,
}

impl CurationCriteria {
    /// Build from loosely shaped curator input keyed by criterion name.
    /// Unknown keys are ignored.
    pub fn from_map(input: HashMap<String, CurationCriterion>) -> Self {
        let mut out = Self::default();
        for (key, criterion) in input {
            match CriterionKey::from_str(&key) {
                Some(k) => out.set(k, criterion),
                None => debug!(key = %key, "Ignoring unknown curation criterion"),
            }
        }
        out
    }

    /// Parse curator JSON (`{"lineup": {"checked": true, "note": "..."}}`).
    /// Null or non-object input yields all criteria unchecked.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let input = object
            .iter()
            .filter_map(|(k, v)| {
                serde_json::from_value::<CurationCriterion>(v.clone())
                    .ok()
                    .map(|c| (k.clone(), c))
            })
            .collect();
        Self::from_map(input)
    }

    pub fn set(&mut self, key: CriterionKey, criterion: CurationCriterion) {
        self.criteria[key as usize] = criterion;
    }

    pub fn get(&self, key: CriterionKey) -> &CurationCriterion {
        &self.criteria[key as usize]
    }

    /// Number of checked criteria, in [0, 8]
    pub fn score(&self) -> u8 {
        self.criteria.iter().filter(|c| c.checked).count() as u8
    }

    /// Checked criteria in display order
    pub fn satisfied(&self) -> Vec<CriterionKey> {
        CriterionKey::all()
            .iter()
            .copied()
            .filter(|k| self.get(*k).checked)
            .collect()
    }

    /// At most `max` chip labels; the rest is reported as overflow
    pub fn chips(&self, max: usize) -> ChipList {
        let satisfied = self.satisfied();
        let overflow = satisfied.len().saturating_sub(max);
        ChipList {
            labels: satisfied.iter().take(max).map(|k| k.label()).collect(),
            overflow,
        }
    }

    /// Serialize back to curator JSON with every criterion present
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = CriterionKey::all()
            .iter()
            .map(|k| {
                let c = self.get(*k);
                (
                    k.as_str().to_string(),
                    serde_json::json!({ "checked": c.checked, "note": c.note }),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
