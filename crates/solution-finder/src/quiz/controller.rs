use super::answers::AnswerStore;
use super::domain::{Question, QuizError, WizardAction, WizardPhase};
use super::questionnaire::Questionnaire;
use super::scoring::{RecommendationList, ScoringEngine};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub const NEXT_LABEL: &str = "Next";
pub const FINISH_LABEL: &str = "See Results";

/// Discrete UI events the controller understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Choosing an option records it and moves on in one step.
    SelectAnswer { question: String, value: String },
    Next,
    Previous,
    Restart,
}

/// Snapshot handed to the presentation layer after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub phase: WizardPhase,
    pub current_step: usize,
    pub total_steps: usize,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub next_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationList>,
}

/// Subscriber for controller notifications.
pub trait QuizObserver {
    fn state_changed(&mut self, view: &WizardView);

    /// Called when a transition is refused, e.g. to prompt for a missing answer.
    fn transition_rejected(&mut self, _error: &QuizError) {}
}

/// Step wizard over a questionnaire.
///
/// Starts at step 1 with no answers. Each successful `advance` commits the
/// current step's answer and moves forward; leaving the last step completes
/// the quiz and ranks the catalog. Rejected transitions leave every field
/// untouched.
pub struct QuizController {
    questionnaire: Arc<Questionnaire>,
    engine: ScoringEngine,
    phase: WizardPhase,
    answers: AnswerStore,
    recommendations: Option<RecommendationList>,
    observers: Vec<Box<dyn QuizObserver>>,
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizController")
            .field("phase", &self.phase)
            .field("answers", &self.answers)
            .field("recommendations", &self.recommendations)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl QuizController {
    pub fn new(questionnaire: Arc<Questionnaire>, engine: ScoringEngine) -> Self {
        Self {
            questionnaire,
            engine,
            phase: WizardPhase::Step(1),
            answers: AnswerStore::new(),
            recommendations: None,
            observers: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(Questionnaire::standard()), ScoringEngine::standard())
    }

    pub fn subscribe(&mut self, observer: Box<dyn QuizObserver>) {
        self.observers.push(observer);
    }

    pub fn handle(&mut self, event: QuizEvent) -> Result<WizardPhase, QuizError> {
        match event {
            QuizEvent::SelectAnswer { question, value } => self.select_answer(&question, &value),
            QuizEvent::Next => self.advance(),
            QuizEvent::Previous => self.retreat(),
            QuizEvent::Restart => Ok(self.restart()),
        }
    }

    /// Validates the current step and moves forward, completing the quiz
    /// after the last step.
    pub fn advance(&mut self) -> Result<WizardPhase, QuizError> {
        let step = match self.phase {
            WizardPhase::Step(step) => step,
            WizardPhase::Completed => {
                return self.reject(QuizError::InvalidTransition {
                    state: self.phase,
                    action: WizardAction::Advance,
                })
            }
        };

        let question = self.question_at(step);
        let Some(value) = self.answers.get(&question.key).map(str::to_owned) else {
            let error = QuizError::IncompleteStep {
                step,
                question: question.key.clone(),
            };
            return self.reject(error);
        };

        Ok(self.commit_and_advance(step, value))
    }

    /// Records a selection for the current step and advances immediately.
    pub fn select_answer(
        &mut self,
        question_key: &str,
        value: &str,
    ) -> Result<WizardPhase, QuizError> {
        let step = match self.phase {
            WizardPhase::Step(step) => step,
            WizardPhase::Completed => {
                return self.reject(QuizError::InvalidTransition {
                    state: self.phase,
                    action: WizardAction::SelectAnswer,
                })
            }
        };

        let Some(selected) = self.questionnaire.get(question_key) else {
            return self.reject(QuizError::UnknownQuestion(question_key.to_string()));
        };

        let expected = self.question_at(step);
        if selected.key != expected.key {
            let error = QuizError::QuestionMismatch {
                expected: expected.key.clone(),
                selected: selected.key.clone(),
            };
            return self.reject(error);
        }

        if !selected.allows(value) {
            let error = QuizError::InvalidAnswer {
                question: selected.key.clone(),
                value: value.to_string(),
            };
            return self.reject(error);
        }

        Ok(self.commit_and_advance(step, value.to_string()))
    }

    /// Steps back one question. Recorded answers are kept.
    pub fn retreat(&mut self) -> Result<WizardPhase, QuizError> {
        match self.phase {
            WizardPhase::Step(step) if step > 1 => {
                self.phase = WizardPhase::Step(step - 1);
                debug!(from = step, to = step - 1, "quiz stepped back");
                self.notify();
                Ok(self.phase)
            }
            state => self.reject(QuizError::InvalidTransition {
                state,
                action: WizardAction::Retreat,
            }),
        }
    }

    /// Clears answers and results and returns to step 1. Valid from any state.
    pub fn restart(&mut self) -> WizardPhase {
        self.answers.reset();
        self.recommendations = None;
        self.phase = WizardPhase::Step(1);
        debug!("quiz restarted");
        self.notify();
        self.phase
    }

    fn commit_and_advance(&mut self, step: usize, value: String) -> WizardPhase {
        let key = self.question_at(step).key.clone();
        debug!(step, question = %key, answer = %value, "answer committed");
        self.answers.set(key, value);

        if step >= self.total_steps() {
            let recommendations = self.engine.recommend(&self.answers);
            debug!(
                recommended = recommendations.len(),
                primary = recommendations.primary().map(|r| r.product.key.as_str()),
                "quiz completed"
            );
            self.recommendations = Some(recommendations);
            self.phase = WizardPhase::Completed;
        } else {
            self.phase = WizardPhase::Step(step + 1);
        }

        self.notify();
        self.phase
    }

    fn reject(&mut self, error: QuizError) -> Result<WizardPhase, QuizError> {
        debug!(phase = %self.phase, %error, "transition rejected");
        for observer in &mut self.observers {
            observer.transition_rejected(&error);
        }
        Err(error)
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.view();
        for observer in &mut self.observers {
            observer.state_changed(&view);
        }
    }

    fn question_at(&self, step: usize) -> &Question {
        &self.questionnaire.questions()[step - 1]
    }

    pub fn view(&self) -> WizardView {
        let question = self.current_question().cloned();
        let selected = question
            .as_ref()
            .and_then(|question| self.answers.get(&question.key))
            .map(str::to_owned);
        let on_last_step = self.current_step() == self.total_steps();

        WizardView {
            phase: self.phase,
            current_step: self.current_step(),
            total_steps: self.total_steps(),
            progress: self.progress(),
            question,
            selected,
            previous_enabled: matches!(self.phase, WizardPhase::Step(step) if step > 1),
            next_enabled: !self.is_completed(),
            next_label: if on_last_step { FINISH_LABEL } else { NEXT_LABEL },
            recommendations: self.recommendations.clone(),
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    /// 1-indexed step; stays on the last step once completed.
    pub fn current_step(&self) -> usize {
        match self.phase {
            WizardPhase::Step(step) => step,
            WizardPhase::Completed => self.total_steps(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.questionnaire.total_steps()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            WizardPhase::Step(step) => Some(self.question_at(step)),
            WizardPhase::Completed => None,
        }
    }

    /// `(n - 1) / total` on step `n`, `1.0` once completed.
    pub fn progress(&self) -> f64 {
        match self.phase {
            WizardPhase::Step(step) => (step - 1) as f64 / self.total_steps() as f64,
            WizardPhase::Completed => 1.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == WizardPhase::Completed
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn recommendations(&self) -> Option<&RecommendationList> {
        self.recommendations.as_ref()
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }
}
