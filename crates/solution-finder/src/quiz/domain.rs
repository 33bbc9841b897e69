use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog entry. Everything except `key` is display metadata the scorer
/// never looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub key: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

impl Product {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
}

/// One wizard step: a question key plus its permissible answers in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(AnswerOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    pub fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "step")]
pub enum WizardPhase {
    Step(usize),
    Completed,
}

impl fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardPhase::Step(step) => write!(f, "step {step}"),
            WizardPhase::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardAction {
    Advance,
    Retreat,
    SelectAnswer,
}

impl WizardAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::SelectAnswer => "select answer",
        }
    }
}

/// Rejected transitions. The controller state is untouched whenever one of
/// these is returned, and `restart` is always available afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("step {step} ({question}) has no answer selected")]
    IncompleteStep { step: usize, question: String },
    #[error("cannot {} from {state}", .action.label())]
    InvalidTransition {
        state: WizardPhase,
        action: WizardAction,
    },
    #[error("question '{0}' is not part of this quiz")]
    UnknownQuestion(String),
    #[error("question '{selected}' is not on the current step (expected '{expected}')")]
    QuestionMismatch { expected: String, selected: String },
    #[error("'{value}' is not a permissible answer for '{question}'")]
    InvalidAnswer { question: String, value: String },
}
