//! Level tiers and the level resolver
//!
//! Tiers are sorted by their point threshold and tile `[0, ∞)`: the first
//! tier starts at 0 and every later tier strictly raises the threshold, so any
//! non-negative total maps to exactly one tier.

use serde::{Deserialize, Serialize};

/// One named band of cumulative points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    pub min_points: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl LevelTier {
    pub fn new(min_points: i64, name: &str, icon: &str, color: &str) -> Self {
        Self {
            min_points,
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// Built-in tiers: (threshold, name, icon, color)
const DEFAULT_TIERS: &[(i64, &str, &str, &str)] = &[
    (0, "Bronze", "🥉", "#CD7F32"),
    (1000, "Silver", "🥈", "#A8A9AD"),
    (2500, "Gold", "🥇", "#D4AF37"),
    (5000, "Platinum", "💠", "#5B8FA8"),
    (10000, "Diamond", "💎", "#6FD3F5"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelTableError {
    #[error("Level table must contain at least one tier")]
    Empty,

    #[error("First tier must start at 0 points, found {0}")]
    FirstTierNotZero(i64),

    #[error("Tier '{name}' threshold {min_points} is not above the previous tier")]
    NotAscending { name: String, min_points: i64 },
}

/// Validated, ordered list of tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    tiers: Vec<LevelTier>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS
                .iter()
                .map(|(min, name, icon, color)| LevelTier::new(*min, name, icon, color))
                .collect(),
        }
    }
}

/// Resolved level for a point total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    /// 1-based tier index
    pub level: u32,
    pub current: LevelTier,
    /// None at max level
    pub next: Option<LevelTier>,
    /// Percentage toward `next`, in [0, 100]; 100 at max level
    pub progress_pct: f64,
    /// 0 at max level
    pub points_to_next: i64,
}

impl LevelProgress {
    pub fn is_max_level(&self) -> bool {
        self.next.is_none()
    }
}

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_name: String,
}

impl LevelTable {
    pub fn new(tiers: Vec<LevelTier>) -> Result<Self, LevelTableError> {
        let first = tiers.first().ok_or(LevelTableError::Empty)?;
        if first.min_points != 0 {
            return Err(LevelTableError::FirstTierNotZero(first.min_points));
        }
        for pair in tiers.windows(2) {
            if pair[1].min_points <= pair[0].min_points {
                return Err(LevelTableError::NotAscending {
                    name: pair[1].name.clone(),
                    min_points: pair[1].min_points,
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[LevelTier] {
        &self.tiers
    }

    pub fn max_level(&self) -> u32 {
        self.tiers.len() as u32
    }

    /// 1-based level for a total. Negative totals sit in the first tier.
    pub fn level_for(&self, total_points: i64) -> u32 {
        // Highest tier whose threshold is <= total; tier 0 always matches
        let idx = self
            .tiers
            .iter()
            .rposition(|t| total_points >= t.min_points)
            .unwrap_or(0);
        idx as u32 + 1
    }

    /// Resolve the current tier, the next tier and the progress between them
    pub fn resolve(&self, total_points: i64) -> LevelProgress {
        let level = self.level_for(total_points);
        let idx = (level - 1) as usize;
        let current = self.tiers[idx].clone();
        let next = self.tiers.get(idx + 1).cloned();

        let (progress_pct, points_to_next) = match &next {
            Some(next_tier) => {
                let span = (next_tier.min_points - current.min_points) as f64;
                let into = (total_points - current.min_points).max(0) as f64;
                let pct = (into / span * 100.0).clamp(0.0, 100.0);
                (pct, next_tier.min_points - total_points.max(current.min_points))
            }
            None => (100.0, 0),
        };

        LevelProgress {
            level,
            current,
            next,
            progress_pct,
            points_to_next,
        }
    }

    /// Level up caused by moving from `old_total` to `new_total`, if any
    pub fn level_up(&self, old_total: i64, new_total: i64) -> Option<LevelUp> {
        let old_level = self.level_for(old_total);
        let new_level = self.level_for(new_total);
        (new_level > old_level).then(|| LevelUp {
            old_level,
            new_level,
            new_name: self.tiers[(new_level - 1) as usize].name.clone(),
        })
    }
}
