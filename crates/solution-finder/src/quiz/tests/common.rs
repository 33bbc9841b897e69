use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::quiz::{
    AnswerStore, Product, ProductCatalog, QuizController, QuizError, QuizObserver, RankingPolicy,
    ScoringEngine, ScoringRuleTable, WizardView,
};
use crate::quiz::{Question, Questionnaire};

pub(super) fn answers(pairs: &[(&str, &str)]) -> AnswerStore {
    pairs.iter().copied().collect()
}

pub(super) fn reference_answers() -> [(&'static str, &'static str); 5] {
    [
        ("facilityType", "hospital"),
        ("orgSize", "enterprise"),
        ("primaryNeed", "lab-automation"),
        ("currentSystem", "legacy"),
        ("region", "uae"),
    ]
}

/// Three products that can be driven into ties on purpose.
pub(super) fn tie_catalog() -> ProductCatalog {
    ProductCatalog::new(vec![
        Product::new("alpha", "Alpha", "First", "declared first", "alpha.html"),
        Product::new("beta", "Beta", "Second", "declared second", "beta.html"),
        Product::new("gamma", "Gamma", "Third", "declared third", "gamma.html"),
    ])
    .expect("unique keys")
}

pub(super) fn tie_rules() -> ScoringRuleTable {
    let json = r#"{
        "size": {
            "even": {"gamma": 5, "beta": 5, "alpha": 5},
            "skewed": {"gamma": 9, "alpha": 2}
        },
        "need": {
            "beta-only": {"beta": 4}
        }
    }"#;
    ScoringRuleTable::from_json_reader(json.as_bytes()).expect("rules parse")
}

pub(super) fn two_step_controller() -> QuizController {
    let questionnaire = Questionnaire::new(vec![
        Question::new("size", "How big?")
            .with_option("even", "Even")
            .with_option("skewed", "Skewed"),
        Question::new("need", "What for?").with_option("beta-only", "Beta"),
    ])
    .expect("valid questionnaire");
    let engine = ScoringEngine::new(tie_catalog(), tie_rules(), RankingPolicy::default());
    QuizController::new(Arc::new(questionnaire), engine)
}

/// Drives the standard quiz through every reference answer.
pub(super) fn completed_controller() -> QuizController {
    let mut controller = QuizController::standard();
    for (question, value) in reference_answers() {
        controller
            .select_answer(question, value)
            .expect("reference answer accepted");
    }
    controller
}

#[derive(Default)]
pub(super) struct RecordedEvents {
    pub(super) views: Vec<WizardView>,
    pub(super) rejections: Vec<QuizError>,
}

#[derive(Clone, Default)]
pub(super) struct RecordingObserver {
    pub(super) events: Rc<RefCell<RecordedEvents>>,
}

impl QuizObserver for RecordingObserver {
    fn state_changed(&mut self, view: &WizardView) {
        self.events.borrow_mut().views.push(view.clone());
    }

    fn transition_rejected(&mut self, error: &QuizError) {
        self.events.borrow_mut().rejections.push(error.clone());
    }
}
