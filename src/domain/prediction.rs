// ============================================================
// Layer 3 — Prediction Domain Types
// ============================================================
// The shape of a predictions file, shared by anything that
// produces predictions and by the scorer that consumes them:
//
//   [
//     { "qa_id": 1, "question": "What is it?",
//       "candidates": [ {"answer": "A dog."}, {"answer": "A cat."} ] },
//     ...
//   ]
//
// Candidates are ranked most-confident first. The optional
// question string is carried for readability and ignored by
// scoring.

use serde::{Deserialize, Serialize};

use crate::domain::qa_pair::QaId;

/// One ranked candidate answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub answer: String,
}

/// Predictions for a single QA pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub qa_id: QaId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    pub candidates: Vec<Candidate>,
}

impl PredictionEntry {
    /// Build an entry from ranked answer strings
    pub fn new<S: Into<String>>(qa_id: QaId, answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            qa_id,
            question:   None,
            candidates: answers
                .into_iter()
                .map(|a| Candidate { answer: a.into() })
                .collect(),
        }
    }

    /// Attach the question text (builder style)
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// The first `k` candidate answers
    pub fn top_k(&self, k: usize) -> impl Iterator<Item = &str> {
        self.candidates.iter().take(k).map(|c| c.answer.as_str())
    }
}
