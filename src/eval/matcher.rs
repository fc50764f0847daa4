// ============================================================
// Layer 5 — Answer Matching
// ============================================================
// Decides whether a ranked candidate list hits the ground truth.
//
// Two policies, chosen per dataset variant:
//
//   Tokens           candidate gets a trailing '.' if missing, is
//                    tokenized as an answer and compared with the
//                    pair's cached answer tokens.
//                      "a dog"  → ["a", "dog", "."]  == "A dog."  ✓
//
//   CaseInsensitive  both strings lower-cased, compared directly.
//                      "a dog." == "A dog."  ✓
//                      "a dog"  == "A dog."  ✗
//
// On well-formed, period-terminated answers the two agree.
// A pair without a ground-truth answer cannot be compared at all
// and yields None.

use serde::{Deserialize, Serialize};

use crate::data::tokenizer::tokenize_candidate;
use crate::domain::error::Result;
use crate::domain::qa_pair::QaPair;

/// How a candidate answer is compared with the ground truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMatching {
    /// Exact token-sequence equality after answer tokenization
    Tokens,
    /// Lower-cased string equality
    CaseInsensitive,
}

impl AnswerMatching {
    /// Whether any of `candidates` matches the pair's answer.
    ///
    /// Returns `Ok(None)` when the pair has no answer to compare with.
    pub fn any_match<'c>(
        self,
        pair:       &QaPair,
        candidates: impl IntoIterator<Item = &'c str>,
    ) -> Result<Option<bool>> {
        match self {
            AnswerMatching::Tokens => {
                let Some(expected) = pair.ensure_tokens()?.answer.as_deref() else {
                    return Ok(None);
                };
                for candidate in candidates {
                    if tokenize_candidate(candidate)? == expected {
                        return Ok(Some(true));
                    }
                }
                Ok(Some(false))
            }
            AnswerMatching::CaseInsensitive => {
                let Some(answer) = pair.answer.as_deref() else {
                    return Ok(None);
                };
                let expected = answer.to_lowercase();
                Ok(Some(
                    candidates
                        .into_iter()
                        .any(|c| c.to_lowercase() == expected),
                ))
            }
        }
    }
}
