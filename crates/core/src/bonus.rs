//! Capacity bonus model - contributions, categories and capacity results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a contribution combines with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusKind {
    /// Absolute credits/hour, summed
    Flat,
    /// Fraction applied once to the flat total (0.05 = +5%)
    Percent,
}

/// Origin category of a contribution, for grouped display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusCategory {
    /// Base capacity of the location
    Baseline,
    /// Structures such as factories
    Buildings,
    /// Terrain, astro type, orbit
    Location,
    /// Researched technologies
    Tech,
    /// Assigned commander
    Commander,
    /// Anything unmatched
    Other,
}

impl BonusCategory {
    /// All categories in display order.
    pub const ALL: [BonusCategory; 6] = [
        BonusCategory::Baseline,
        BonusCategory::Buildings,
        BonusCategory::Location,
        BonusCategory::Tech,
        BonusCategory::Commander,
        BonusCategory::Other,
    ];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BonusCategory::Baseline => "baseline",
            BonusCategory::Buildings => "buildings",
            BonusCategory::Location => "location",
            BonusCategory::Tech => "tech",
            BonusCategory::Commander => "commander",
            BonusCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for BonusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a capacity breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusContribution {
    /// Display label, not used in computation
    pub source: String,

    /// Flat or percent
    pub kind: BonusKind,

    /// Credits/hour for flat, fraction for percent
    pub value: f64,

    /// Category tag when the upstream already classified it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BonusCategory>,
}

impl BonusContribution {
    /// A flat credits/hour contribution.
    pub fn flat(source: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            kind: BonusKind::Flat,
            value,
            category: None,
        }
    }

    /// A percentage contribution given as a fraction.
    pub fn percent(source: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            kind: BonusKind::Percent,
            value,
            category: None,
        }
    }

    /// Tag with an explicit category.
    pub fn with_category(mut self, category: BonusCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Final capacity with the contributions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResult {
    /// Final capacity value
    pub value: f64,

    /// Contributions, in upstream order
    #[serde(default)]
    pub breakdown: Vec<BonusContribution>,
}

/// Capacity kinds reported by the capacity query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityKind {
    /// Building construction
    Construction,
    /// Unit production
    Production,
    /// Research
    Research,
}

impl CapacityKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityKind::Construction => "construction",
            CapacityKind::Production => "production",
            CapacityKind::Research => "research",
        }
    }
}

impl std::fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity query response: pre-aggregated results per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityReport(BTreeMap<CapacityKind, CapacityResult>);

impl CapacityReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one kind.
    pub fn insert(&mut self, kind: CapacityKind, result: CapacityResult) {
        self.0.insert(kind, result);
    }

    /// Look up one kind.
    pub fn get(&self, kind: CapacityKind) -> Option<&CapacityResult> {
        self.0.get(&kind)
    }

    /// Iterate kinds in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (CapacityKind, &CapacityResult)> {
        self.0.iter().map(|(kind, result)| (*kind, result))
    }

    /// Whether no kind was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_serde_names() {
        let json = r#"{"source":"Robotic Factories","kind":"flat","value":12}"#;
        let parsed: BonusContribution = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, BonusContribution::flat("Robotic Factories", 12.0));

        let tagged = BonusContribution::percent("Commander", 0.05)
            .with_category(BonusCategory::Commander);
        let json = serde_json::to_string(&tagged).unwrap();
        assert!(json.contains(r#""kind":"percent""#));
        assert!(json.contains(r#""category":"commander""#));
    }

    #[test]
    fn test_category_order_is_display_order() {
        let names: Vec<_> = BonusCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            ["baseline", "buildings", "location", "tech", "commander", "other"]
        );
    }

    #[test]
    fn test_capacity_report_deserializes_per_kind() {
        let json = r#"{
            "construction": {"value": 132, "breakdown": [
                {"source": "Base", "kind": "flat", "value": 100}
            ]},
            "research": {"value": 40}
        }"#;
        let report: CapacityReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.get(CapacityKind::Construction).unwrap().value, 132.0);
        assert!(report.get(CapacityKind::Research).unwrap().breakdown.is_empty());
        assert!(report.get(CapacityKind::Production).is_none());

        let kinds: Vec<_> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, [CapacityKind::Construction, CapacityKind::Research]);
    }
}
