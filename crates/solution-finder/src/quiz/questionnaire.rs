use super::catalog::CatalogError;
use super::domain::Question;
use crate::config::QuizConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Ordered questions, one per wizard step. Step `n` shows `questions[n - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::EmptyQuestionnaire);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.key.as_str()) {
                return Err(CatalogError::DuplicateQuestion(question.key.clone()));
            }
            if question.options.is_empty() {
                return Err(CatalogError::QuestionWithoutOptions(question.key.clone()));
            }
        }

        Ok(Self { questions })
    }

    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    /// Reads a JSON array of questions, or an object with a `questions` array.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: QuestionnaireDocument = serde_json::from_reader(reader)?;
        let questions = match document {
            QuestionnaireDocument::List(questions) => questions,
            QuestionnaireDocument::Wrapped { questions } => questions,
        };
        Self::new(questions)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_config(config: &QuizConfig) -> Result<Self, CatalogError> {
        match &config.questionnaire_path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.questions.len()
    }

    /// Question for a 1-indexed step.
    pub fn step(&self, step: usize) -> Option<&Question> {
        step.checked_sub(1).and_then(|index| self.questions.get(index))
    }

    pub fn get(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.key == key)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionnaireDocument {
    List(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

fn standard_questions() -> Vec<Question> {
    vec![
        Question::new("facilityType", "What type of facility do you operate?")
            .with_option("hospital", "Hospital")
            .with_option("clinic", "Clinic / Outpatient Center")
            .with_option("lab", "Laboratory")
            .with_option("pharmacy", "Pharmacy")
            .with_option("veterinary", "Veterinary Clinic"),
        Question::new("orgSize", "How large is your organization?")
            .with_option("small", "Small (1-20 staff)")
            .with_option("medium", "Medium (21-100 staff)")
            .with_option("large", "Large (101-500 staff)")
            .with_option("enterprise", "Enterprise (500+ staff)"),
        Question::new("primaryNeed", "What is your primary need?")
            .with_option("patient-management", "Patient Management")
            .with_option("lab-automation", "Lab Automation")
            .with_option("pharmacy", "Pharmacy Operations")
            .with_option("telemedicine", "Telemedicine")
            .with_option("quality", "Quality & Accreditation"),
        Question::new("currentSystem", "What system do you use today?")
            .with_option("paper", "Paper-based")
            .with_option("legacy", "Legacy software")
            .with_option("upgrade", "Modern system, looking to extend")
            .with_option("new", "New facility, no system yet"),
        Question::new("region", "Where are you located?")
            .with_option("uae", "United Arab Emirates")
            .with_option("saudi", "Saudi Arabia")
            .with_option("qatar", "Qatar")
            .with_option("kuwait", "Kuwait")
            .with_option("bahrain", "Bahrain")
            .with_option("other", "Other"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_questionnaire_has_five_steps_in_order() {
        let questionnaire = Questionnaire::standard();
        assert_eq!(questionnaire.total_steps(), 5);
        let keys: Vec<&str> = questionnaire
            .questions()
            .iter()
            .map(|q| q.key.as_str())
            .collect();
        assert_eq!(
            keys,
            ["facilityType", "orgSize", "primaryNeed", "currentSystem", "region"]
        );
        assert_eq!(
            questionnaire.step(5).map(|q| q.key.as_str()),
            Some("region")
        );
        assert!(questionnaire.step(0).is_none());
        assert!(questionnaire.step(6).is_none());
    }

    #[test]
    fn rejects_questions_without_options() {
        let err = Questionnaire::new(vec![Question::new("region", "Where?")])
            .expect_err("no options");
        assert!(matches!(err, CatalogError::QuestionWithoutOptions(key) if key == "region"));
    }

    #[test]
    fn loads_questionnaire_from_json() {
        let json = r#"{"questions":[{"key":"budget","prompt":"Budget?","options":[{"value":"low","label":"Low"},{"value":"high","label":"High"}]}]}"#;
        let questionnaire = Questionnaire::from_reader(json.as_bytes()).expect("parses");
        assert_eq!(questionnaire.total_steps(), 1);
        let budget = questionnaire.step(1).expect("first step");
        assert!(budget.allows("high"));
        assert!(!budget.allows("medium"));
    }

    #[test]
    fn rejects_empty_questionnaire() {
        assert!(matches!(
            Questionnaire::new(Vec::new()),
            Err(CatalogError::EmptyQuestionnaire)
        ));
    }
}
