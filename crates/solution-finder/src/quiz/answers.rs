use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current answer per question key. At most one value per key; writes overwrite.
///
/// No validation happens here. The controller checks values against the
/// questionnaire before calling [`AnswerStore::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    answers: BTreeMap<String, String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_key: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(question_key.into(), value.into());
    }

    pub fn get(&self, question_key: &str) -> Option<&str> {
        self.answers.get(question_key).map(String::as_str)
    }

    pub fn contains(&self, question_key: &str) -> bool {
        self.answers.contains_key(question_key)
    }

    pub fn reset(&mut self) {
        self.answers.clear();
    }

    /// Owned copy of every answer, detached from later writes to the store.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.answers.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers
            .iter()
            .map(|(question, answer)| (question.as_str(), answer.as_str()))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (question, answer) in iter {
            store.set(question, answer);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_previous_answer() {
        let mut store = AnswerStore::new();
        store.set("orgSize", "small");
        store.set("orgSize", "enterprise");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("orgSize"), Some("enterprise"));
    }

    #[test]
    fn get_reports_unset_questions() {
        let store = AnswerStore::new();
        assert_eq!(store.get("region"), None);
        assert!(!store.contains("region"));
    }

    #[test]
    fn entries_is_a_snapshot() {
        let mut store = AnswerStore::new();
        store.set("facilityType", "lab");
        let snapshot = store.entries();
        store.set("facilityType", "clinic");
        store.set("region", "uae");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("facilityType").map(String::as_str), Some("lab"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut store: AnswerStore = [("facilityType", "hospital"), ("region", "qatar")]
            .into_iter()
            .collect();
        store.reset();
        assert!(store.is_empty());
    }
}
