//! Breakdown classification.
//!
//! Maps each contribution to exactly one [`BonusCategory`]. An explicit
//! category tag from the server wins; otherwise the source label goes
//! through a [`BonusClassifier`]. Labels nothing matches land in
//! [`BonusCategory::Other`].

use attrition_core::{BonusCategory, BonusContribution};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Errors building a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// Rule pattern failed to compile
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// Rule table failed to parse
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Maps a source label to a category.
pub trait BonusClassifier: Send + Sync {
    /// Category for a source label. Must be deterministic.
    fn classify_source(&self, source: &str) -> BonusCategory;
}

/// One rule: a case-insensitive pattern and the category it selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRule {
    /// Regular expression matched against the source label
    pub pattern: String,
    /// Category assigned on match
    pub category: BonusCategory,
}

impl ClassifierRule {
    fn new(pattern: &str, category: BonusCategory) -> Self {
        Self {
            pattern: pattern.to_string(),
            category,
        }
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Rules in priority order
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        use BonusCategory::*;

        Self {
            rules: vec![
                ClassifierRule::new(r"^\s*base(line)?\b", Baseline),
                ClassifierRule::new(r"commander", Commander),
                ClassifierRule::new(r"\btech(nology|nologies)?\b", Tech),
                ClassifierRule::new(r"cybernetic|computer|artificial intelligence|\bai\b", Tech),
                ClassifierRule::new(r"factor(y|ies)|shipyard|refiner(y|ies)|plants?\b", Buildings),
                ClassifierRule::new(r"\blab(s|oratory|oratories)?\b|building|structure", Buildings),
                ClassifierRule::new(r"planet|moon|asteroid|astro|terrain|orbit|location", Location),
                ClassifierRule::new(r"fertility|metal|gas\b|crystal|solar", Location),
            ],
        }
    }
}

/// Rule-table classifier.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<(Regex, BonusCategory)>,
}

impl RuleClassifier {
    /// Compile a rule table. Fails on the first invalid pattern.
    pub fn new(rules: &ClassifierRules) -> Result<Self, ClassificationError> {
        let rules = rules
            .rules
            .iter()
            .map(|rule| Ok((compile(&rule.pattern)?, rule.category)))
            .collect::<Result<Vec<_>, ClassificationError>>()?;
        Ok(Self { rules })
    }

    /// Compile a rule table from JSON (`{"rules": [{"pattern", "category"}]}`).
    pub fn from_json(json: &str) -> Result<Self, ClassificationError> {
        let rules: ClassifierRules = serde_json::from_str(json)?;
        Self::new(&rules)
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty (everything classifies as other).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        let rules = ClassifierRules::default()
            .rules
            .into_iter()
            .filter_map(|rule| match compile(&rule.pattern) {
                Ok(re) => Some((re, rule.category)),
                Err(e) => {
                    warn!("Skipping built-in rule: {}", e);
                    None
                }
            })
            .collect();
        Self { rules }
    }
}

impl BonusClassifier for RuleClassifier {
    fn classify_source(&self, source: &str) -> BonusCategory {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(source))
            .map(|(_, category)| *category)
            .unwrap_or(BonusCategory::Other)
    }
}

fn compile(pattern: &str) -> Result<Regex, ClassificationError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ClassificationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// A breakdown grouped into the six display buckets.
///
/// Every input contribution appears in exactly one bucket, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedBreakdown {
    /// Base capacity lines
    pub baseline: Vec<BonusContribution>,
    /// Building lines
    pub buildings: Vec<BonusContribution>,
    /// Location lines
    pub location: Vec<BonusContribution>,
    /// Technology lines
    pub tech: Vec<BonusContribution>,
    /// Commander lines
    pub commander: Vec<BonusContribution>,
    /// Everything else
    pub other: Vec<BonusContribution>,
}

impl ClassifiedBreakdown {
    /// Contributions in one bucket.
    pub fn bucket(&self, category: BonusCategory) -> &[BonusContribution] {
        match category {
            BonusCategory::Baseline => &self.baseline,
            BonusCategory::Buildings => &self.buildings,
            BonusCategory::Location => &self.location,
            BonusCategory::Tech => &self.tech,
            BonusCategory::Commander => &self.commander,
            BonusCategory::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, category: BonusCategory) -> &mut Vec<BonusContribution> {
        match category {
            BonusCategory::Baseline => &mut self.baseline,
            BonusCategory::Buildings => &mut self.buildings,
            BonusCategory::Location => &mut self.location,
            BonusCategory::Tech => &mut self.tech,
            BonusCategory::Commander => &mut self.commander,
            BonusCategory::Other => &mut self.other,
        }
    }

    /// Buckets in display order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (BonusCategory, &[BonusContribution])> + '_ {
        BonusCategory::ALL
            .into_iter()
            .map(move |category| (category, self.bucket(category)))
    }

    /// Total number of contributions across buckets.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Category of a single contribution.
pub fn category_of(contribution: &BonusContribution, classifier: &dyn BonusClassifier) -> BonusCategory {
    contribution
        .category
        .unwrap_or_else(|| classifier.classify_source(&contribution.source))
}

/// Group a breakdown by category.
pub fn classify(
    breakdown: &[BonusContribution],
    classifier: &dyn BonusClassifier,
) -> ClassifiedBreakdown {
    let mut grouped = ClassifiedBreakdown::default();
    for contribution in breakdown {
        grouped
            .bucket_mut(category_of(contribution, classifier))
            .push(contribution.clone());
    }
    grouped
}
