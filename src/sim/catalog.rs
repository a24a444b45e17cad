//! Tier catalog
//!
//! Ordered tier definitions loaded once per session. Index 0 is the smallest
//! seed; the last index is `max_tier` and can no longer merge.

use serde::{Deserialize, Serialize};

/// Index into the tier catalog
pub type Tier = usize;

/// One tier of seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDef {
    pub name: String,
    /// Points awarded when a seed of this tier scores or is created by a merge
    pub score: u64,
    /// Collider radius handed to the physics collaborator
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    0.25
}

/// Immutable, ordered list of tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierCatalog {
    tiers: Vec<TierDef>,
}

impl Default for TierCatalog {
    fn default() -> Self {
        let names = ["sprout", "acorn", "walnut", "coconut", "pumpkin"];
        Self::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| TierDef {
                    name: (*name).to_string(),
                    score: 1 << i,
                    radius: 0.2 + 0.08 * i as f32,
                })
                .collect(),
        )
    }
}

impl TierCatalog {
    pub fn new(tiers: Vec<TierDef>) -> Self {
        Self { tiers }
    }

    /// Build a catalog from bare score values (radius defaults per tier)
    pub fn from_scores(scores: &[u64]) -> Self {
        Self::new(
            scores
                .iter()
                .enumerate()
                .map(|(i, &score)| TierDef {
                    name: format!("tier-{i}"),
                    score,
                    radius: default_radius(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Highest tier index, `None` for an empty catalog
    pub fn max_tier(&self) -> Option<Tier> {
        self.tiers.len().checked_sub(1)
    }

    pub fn get(&self, tier: Tier) -> Option<&TierDef> {
        self.tiers.get(tier)
    }

    /// Score value of a tier (0 for an unknown tier)
    pub fn score(&self, tier: Tier) -> u64 {
        self.get(tier).map(|t| t.score).unwrap_or(0)
    }

    pub fn radius(&self, tier: Tier) -> f32 {
        self.get(tier).map(|t| t.radius).unwrap_or_else(default_radius)
    }

    /// Whether a seed of `tier` may still merge into `tier + 1`
    pub fn can_merge(&self, tier: Tier) -> bool {
        self.max_tier().is_some_and(|max| tier < max)
    }

    /// Exclusive upper bound of tiers that may spawn directly into the hand.
    ///
    /// The two highest tiers are reserved for merges; tiny catalogs still
    /// spawn tier 0.
    pub fn spawnable_tiers(&self) -> Tier {
        self.tiers.len().saturating_sub(2).max(1)
    }

    /// A session needs at least two tiers to have anything to merge into
    pub fn is_playable(&self) -> bool {
        self.tiers.len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_scores_double() {
        let catalog = TierCatalog::default();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.max_tier(), Some(4));
        let scores: Vec<u64> = (0..5).map(|t| catalog.score(t)).collect();
        assert_eq!(scores, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_can_merge_stops_at_max_tier() {
        let catalog = TierCatalog::from_scores(&[1, 2, 4]);
        assert!(catalog.can_merge(0));
        assert!(catalog.can_merge(1));
        assert!(!catalog.can_merge(2));
        assert!(!TierCatalog::from_scores(&[]).can_merge(0));
    }

    #[test]
    fn test_spawnable_tiers() {
        assert_eq!(TierCatalog::from_scores(&[1, 2, 4, 8, 16]).spawnable_tiers(), 3);
        assert_eq!(TierCatalog::from_scores(&[1, 2]).spawnable_tiers(), 1);
        assert!(!TierCatalog::from_scores(&[1]).is_playable());
    }

    #[test]
    fn test_catalog_json_is_a_plain_list() {
        let json = r#"[{"name":"a","score":3},{"name":"b","score":9,"radius":0.5}]"#;
        let catalog: TierCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.score(1), 9);
        assert_eq!(catalog.radius(0), 0.25);
        assert_eq!(catalog.radius(1), 0.5);
    }
}
