//! Ranking aggregation
//!
//! Orders users by total or monthly points and assigns dense ranks: tied
//! users share a rank and the next distinct score gets `tied_rank + 1`
//! (500, 500, 300 ranks as 1, 1, 2). Ties are ordered by user id so the
//! ordering never flickers between refreshes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ledger::{Profile, UserPoints};

/// Which point field a ranking orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingType {
    Global,
    Monthly,
}

impl RankingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "global" => Some(Self::Global),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Global => "All-time ranking",
            Self::Monthly => "Monthly ranking",
        }
    }

    /// The score this ranking orders by
    pub fn score(&self, points: &UserPoints) -> i64 {
        match self {
            Self::Global => points.total_points,
            Self::Monthly => points.monthly_points,
        }
    }
}

/// One row of a ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingUser {
    pub user_id: String,
    pub total_points: i64,
    pub monthly_points: i64,
    pub level: u32,
    pub current_streak: u32,
    pub rank: u32,
    pub profile: Option<Profile>,
}

/// Top rows plus the viewer's own row when it falls outside them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingWindow {
    pub top: Vec<RankingUser>,
    pub viewer: Option<RankingUser>,
}

/// A fully ranked snapshot of one ranking type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    kind: RankingType,
    entries: Vec<RankingUser>,
    positions: HashMap<String, usize>,
}

impl Ranking {
    /// Rank every row. Profiles are attached where known.
    pub fn build(kind: RankingType, rows: &[UserPoints], profiles: &HashMap<String, Profile>) -> Self {
        let mut sorted: Vec<&UserPoints> = rows.iter().collect();
        sorted.sort_by(|a, b| {
            kind.score(b)
                .cmp(&kind.score(a))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let mut entries = Vec::with_capacity(sorted.len());
        let mut rank = 0u32;
        let mut prev_score = None;
        for row in sorted {
            let score = kind.score(row);
            if prev_score != Some(score) {
                rank += 1;
                prev_score = Some(score);
            }
            entries.push(RankingUser {
                user_id: row.user_id.clone(),
                total_points: row.total_points,
                monthly_points: row.monthly_points,
                level: row.level,
                current_streak: row.current_streak,
                rank,
                profile: profiles.get(&row.user_id).cloned(),
            });
        }

        let positions = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.user_id.clone(), i))
            .collect();

        Self {
            kind,
            entries,
            positions,
        }
    }

    pub fn kind(&self) -> RankingType {
        self.kind
    }

    pub fn entries(&self) -> &[RankingUser] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `n` rows
    pub fn top(&self, n: usize) -> &[RankingUser] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Row for a user anywhere in the ranking
    pub fn entry_for(&self, user_id: &str) -> Option<&RankingUser> {
        self.positions.get(user_id).map(|&i| &self.entries[i])
    }

    /// Rank of a user anywhere in the ranking. None only if the user has no points row.
    pub fn rank_of(&self, user_id: &str) -> Option<u32> {
        self.entry_for(user_id).map(|e| e.rank)
    }

    /// Top `n` rows, plus the viewer's row if it is not among them
    pub fn window(&self, n: usize, viewer_id: Option<&str>) -> RankingWindow {
        let top = self.top(n).to_vec();
        let viewer = viewer_id
            .filter(|id| !top.iter().any(|e| e.user_id == *id))
            .and_then(|id| self.entry_for(id).cloned());
        RankingWindow { top, viewer }
    }
}
