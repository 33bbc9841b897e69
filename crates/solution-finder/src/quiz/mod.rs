//! Solution-finder quiz: answers, static catalog data, scoring, and the wizard.

mod answers;
mod catalog;
mod controller;
pub mod domain;
mod questionnaire;
mod rules;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use answers::AnswerStore;
pub use catalog::{CatalogError, ProductCatalog};
pub use controller::{
    QuizController, QuizEvent, QuizObserver, WizardView, FINISH_LABEL, NEXT_LABEL,
};
pub use domain::{AnswerOption, Product, Question, QuizError, WizardAction, WizardPhase};
pub use questionnaire::Questionnaire;
pub use rules::{ProductWeights, ScoringRuleTable};
pub use scoring::{
    rank, score, ProductScore, RankingPolicy, Recommendation, RecommendationList,
    ScoreContribution, ScoreSheet, ScoringEngine,
};
