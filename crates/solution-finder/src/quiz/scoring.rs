use super::answers::AnswerStore;
use super::catalog::{CatalogError, ProductCatalog};
use super::domain::Product;
use super::rules::ScoringRuleTable;
use crate::config::{QuizConfig, DEFAULT_MATCH_CALIBRATION, DEFAULT_RESULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Points one answered (question, answer) pair gave a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub question: String,
    pub answer: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductScore {
    pub key: String,
    /// Sum of contribution points, saturating at `u64::MAX`.
    pub score: u64,
    pub contributions: Vec<ScoreContribution>,
}

/// Result of one scoring pass: every catalog product, in catalog order,
/// including the ones that stayed at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    scores: Vec<ProductScore>,
}

impl ScoreSheet {
    pub fn get(&self, key: &str) -> Option<u64> {
        self.product(key).map(|entry| entry.score)
    }

    pub fn product(&self, key: &str) -> Option<&ProductScore> {
        self.scores.iter().find(|entry| entry.key == key)
    }

    pub fn scores(&self) -> &[ProductScore] {
        &self.scores
    }

    pub fn positive(&self) -> impl Iterator<Item = &ProductScore> {
        self.scores.iter().filter(|entry| entry.score > 0)
    }

    pub fn total(&self) -> u64 {
        self.scores
            .iter()
            .fold(0u64, |total, entry| total.saturating_add(entry.score))
    }
}

/// Scores every catalog product against the answers recorded so far.
///
/// Each pass builds a fresh sheet starting from zero, so passes never share
/// accumulator state. Unknown (question, answer) pairs add nothing, as do
/// rules naming products outside the catalog.
pub fn score(
    answers: &AnswerStore,
    rules: &ScoringRuleTable,
    catalog: &ProductCatalog,
) -> ScoreSheet {
    let mut scores: Vec<ProductScore> = catalog
        .products()
        .iter()
        .map(|product| ProductScore {
            key: product.key.clone(),
            score: 0,
            contributions: Vec::new(),
        })
        .collect();

    for (question, answer) in answers.iter() {
        let Some(weights) = rules.lookup(question, answer) else {
            trace!(question, answer, "answer carries no scoring rule");
            continue;
        };

        for (product_key, points) in weights {
            match catalog.position(product_key) {
                Some(index) => {
                    let entry = &mut scores[index];
                    entry.score = entry.score.saturating_add(u64::from(*points));
                    entry.contributions.push(ScoreContribution {
                        question: question.to_string(),
                        answer: answer.to_string(),
                        points: *points,
                    });
                }
                None => {
                    trace!(product = %product_key, "rule references product outside catalog")
                }
            }
        }
    }

    debug!(
        answered = answers.len(),
        products = scores.len(),
        "scoring pass complete"
    );
    ScoreSheet { scores }
}

/// How many recommendations to keep and how to normalise their match percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub limit: usize,
    /// Score treated as a perfect match. Heuristic calibration, not a maximum.
    pub calibration: u32,
}

impl RankingPolicy {
    pub fn new(limit: usize, calibration: u32) -> Result<Self, CatalogError> {
        if limit == 0 {
            return Err(CatalogError::InvalidSettings(
                "result limit must be at least 1".to_string(),
            ));
        }
        if calibration == 0 {
            return Err(CatalogError::InvalidSettings(
                "match calibration must be positive".to_string(),
            ));
        }
        Ok(Self { limit, calibration })
    }

    /// `min(100, round(score / calibration * 100))`.
    pub fn match_percent(&self, score: u64) -> u8 {
        let percent = (score as f64 / f64::from(self.calibration) * 100.0).round();
        percent.min(100.0) as u8
    }
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            calibration: DEFAULT_MATCH_CALIBRATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    pub rank: usize,
    pub score: u64,
    pub match_percent: u8,
    /// Only the first entry is primary. It is rendered differently but scored the same.
    pub is_primary: bool,
}

impl Recommendation {
    pub fn rank_label(&self) -> String {
        if self.is_primary {
            "Best Match".to_string()
        } else {
            format!("#{}", self.rank)
        }
    }
}

/// Ranked products for a finished quiz. Empty when nothing scored above zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationList {
    entries: Vec<Recommendation>,
}

impl RecommendationList {
    pub fn primary(&self) -> Option<&Recommendation> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recommendation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecommendationList {
    type Item = &'a Recommendation;
    type IntoIter = std::slice::Iter<'a, Recommendation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Keeps positive scores, orders them by score with catalog order breaking
/// ties, and truncates to the policy limit.
pub fn rank(
    scores: &ScoreSheet,
    catalog: &ProductCatalog,
    policy: &RankingPolicy,
) -> RecommendationList {
    let mut ranked: Vec<(usize, &Product, u64)> = scores
        .positive()
        .filter_map(|entry| {
            let position = catalog.position(&entry.key)?;
            Some((position, &catalog.products()[position], entry.score))
        })
        .collect();

    ranked.sort_by_key(|(position, _, score)| (Reverse(*score), *position));
    ranked.truncate(policy.limit);

    let entries = ranked
        .into_iter()
        .enumerate()
        .map(|(index, (_, product, score))| Recommendation {
            product: product.clone(),
            rank: index + 1,
            score,
            match_percent: policy.match_percent(score),
            is_primary: index == 0,
        })
        .collect();

    RecommendationList { entries }
}

/// Catalog, rules and ranking policy bundled for repeated use. Cheap to clone
/// and safe to share between independent quiz sessions.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<ProductCatalog>,
    rules: Arc<ScoringRuleTable>,
    policy: RankingPolicy,
}

impl ScoringEngine {
    pub fn new(catalog: ProductCatalog, rules: ScoringRuleTable, policy: RankingPolicy) -> Self {
        Self {
            catalog: Arc::new(catalog),
            rules: Arc::new(rules),
            policy,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            ProductCatalog::standard(),
            ScoringRuleTable::standard(),
            RankingPolicy::default(),
        )
    }

    /// Builds an engine from configuration, falling back to the built-in
    /// catalog and rules when no path is set.
    pub fn from_config(config: &QuizConfig) -> Result<Self, CatalogError> {
        let policy = RankingPolicy::new(config.result_limit, config.match_calibration)?;
        let catalog = match &config.catalog_path {
            Some(path) => ProductCatalog::from_path(path)?,
            None => ProductCatalog::standard(),
        };
        let rules = match &config.rules_path {
            Some(path) => ScoringRuleTable::from_path(path)?,
            None => ScoringRuleTable::standard(),
        };

        for product in rules.dangling_products(&catalog) {
            warn!(%product, "scoring rule references a product missing from the catalog");
        }

        Ok(Self::new(catalog, rules, policy))
    }

    pub fn score(&self, answers: &AnswerStore) -> ScoreSheet {
        score(answers, &self.rules, &self.catalog)
    }

    pub fn rank(&self, scores: &ScoreSheet) -> RecommendationList {
        rank(scores, &self.catalog, &self.policy)
    }

    pub fn recommend(&self, answers: &AnswerStore) -> RecommendationList {
        self.rank(&self.score(answers))
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }
}
