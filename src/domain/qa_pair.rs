// ============================================================
// Layer 3 — QaPair Domain Type
// ============================================================
// One question about an image, its ground-truth answer and the
// distractor answers used to build multiple-choice tests.
//
// Example (Visual7W "telling" style):
//   question:         "What color is the bus?"
//   answer:           "Red."
//   multiple_choices: ["Blue.", "Green.", "White."]
//   type:             "what"
//
// Token sequences are derived on demand and cached in a OnceCell:
// the first call to ensure_tokens() computes them, every later
// call returns the very same value.

use serde::{Deserialize, Deserializer, Serialize};
use std::cell::OnceCell;

use crate::data::tokenizer::{tokenize, TextKind};
use crate::domain::error::Result;

/// Dataset-wide unique QA pair identifier
pub type QaId = u64;

/// A question/answer record as stored in the dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPair {
    /// Unique within the whole dataset
    pub qa_id: QaId,

    /// The question text, ending with '?'
    pub question: String,

    /// Ground-truth answer, ending with '.' (absent when withheld).
    /// Pointing datasets answer with a numeric box id instead.
    #[serde(default, deserialize_with = "answer_text", skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Distractor answers for multiple-choice tests
    #[serde(default, deserialize_with = "choice_texts", skip_serializing_if = "Option::is_none")]
    pub multiple_choices: Option<Vec<String>>,

    /// Explicit category label, used by labelled dataset variants
    #[serde(default, rename = "type", alias = "category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip)]
    tokens: OnceCell<QaTokens>,
}

/// An answer as written in the file: text, or a box id
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Text(String),
    Id(serde_json::Number),
}

impl From<AnswerValue> for String {
    fn from(v: AnswerValue) -> Self {
        match v {
            AnswerValue::Text(t) => t,
            AnswerValue::Id(n)   => n.to_string(),
        }
    }
}

fn answer_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<AnswerValue>::deserialize(d)?.map(String::from))
}

fn choice_texts<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<Vec<String>>, D::Error> {
    Ok(Option::<Vec<AnswerValue>>::deserialize(d)?
        .map(|choices| choices.into_iter().map(String::from).collect()))
}

/// Token sequences derived from a QaPair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaTokens {
    /// Question tokens, ending with "?"
    pub question: Vec<String>,

    /// Answer tokens, ending with "." (None when there is no answer)
    pub answer: Option<Vec<String>>,

    /// One token sequence per distractor, parallel to multiple_choices
    pub choices: Vec<Vec<String>>,
}

impl QaTokens {
    fn derive(pair: &QaPair) -> Result<Self> {
        let question = tokenize(&pair.question, TextKind::Question)?;
        let answer = pair
            .answer
            .as_deref()
            .map(|a| tokenize(a, TextKind::Answer))
            .transpose()?;
        let choices = pair
            .multiple_choices
            .iter()
            .flatten()
            .map(|c| tokenize(c, TextKind::Answer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { question, answer, choices })
    }

    /// Question tokens followed by answer tokens
    pub fn combined(&self) -> Vec<&str> {
        self.question
            .iter()
            .chain(self.answer.iter().flatten())
            .map(String::as_str)
            .collect()
    }
}

impl QaPair {
    /// Create a new QaPair with no distractors and no category
    pub fn new(qa_id: QaId, question: impl Into<String>, answer: Option<&str>) -> Self {
        Self {
            qa_id,
            question:         question.into(),
            answer:           answer.map(str::to_string),
            multiple_choices: None,
            category:         None,
            tokens:           OnceCell::new(),
        }
    }

    /// Attach a distractor list (builder style)
    pub fn with_choices<S: Into<String>>(mut self, choices: impl IntoIterator<Item = S>) -> Self {
        self.multiple_choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Attach an explicit category label (builder style)
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Derive and cache the token sequences, or return the cached ones.
    ///
    /// # Errors
    /// `VqaError::Format` if the question, answer or any distractor
    /// lacks its terminal punctuation. Nothing is cached on failure.
    pub fn ensure_tokens(&self) -> Result<&QaTokens> {
        if let Some(tokens) = self.tokens.get() {
            return Ok(tokens);
        }
        let derived = QaTokens::derive(self)?;
        Ok(self.tokens.get_or_init(|| derived))
    }

    /// Cached tokens, if ensure_tokens() has already succeeded
    pub fn tokens(&self) -> Option<&QaTokens> {
        self.tokens.get()
    }

    /// Cached answer tokens, if derived and an answer exists
    pub fn answer_tokens(&self) -> Option<&[String]> {
        self.tokens.get().and_then(|t| t.answer.as_deref())
    }

    /// First normalised token of the question ("What's up?" → "what")
    pub fn leading_word(&self) -> Option<String> {
        tokenize(&self.question, TextKind::Plain).ok()?.into_iter().next()
    }

    /// Number of distractors (0 when the field is absent)
    pub fn choice_count(&self) -> usize {
        self.multiple_choices.as_ref().map_or(0, Vec::len)
    }
}
