// ============================================================
// Layer 4 — Multiple-Choice Builder
// ============================================================
// Renders a QA pair as a multiple-choice test: the correct answer
// mixed in with its distractors, and the position it ended up at.
//
// How positions are assigned:
//   With an answer and m distractors there are n = m + 1 slots.
//   Slot id 0 is reserved for the answer, slot id k > 0 is
//   distractor k - 1.
//
//     ids:        [0, 1, 2, 3]          (identity)
//     shuffled:   [2, 0, 3, 1]
//     candidates: [d1, ANSWER, d2, d0]  → selection = 1
//
//   Without an answer there is no reserved slot: the m distractors
//   are permuted on their own and no selection is recorded.
//
// Invariant: candidates[selection] == answer whenever both exist.
//
// A pair with no multiple_choices field has no multiple-choice
// rendering at all; build() returns None and the view carries
// the bare pair.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::qa_pair::{QaPair, QaTokens};

/// A QA pair rendered as an ordered list of candidates
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleChoice<'a> {
    /// Candidate answers in presentation order
    pub candidates: Vec<&'a str>,

    /// Token sequence of each candidate, parallel to `candidates`
    /// (present when the pair had been tokenized)
    pub tokens: Option<Vec<&'a [String]>>,

    /// Position of the correct answer, when the pair has one
    pub selection: Option<usize>,
}

impl<'a> MultipleChoice<'a> {
    /// The candidate at the selection position
    pub fn selected(&self) -> Option<&'a str> {
        self.selection.map(|i| self.candidates[i])
    }
}

/// A QA pair together with its multiple-choice rendering, if any
#[derive(Debug, Clone)]
pub struct MultipleChoiceView<'a> {
    pub qa_pair: &'a QaPair,
    pub choices: Option<MultipleChoice<'a>>,
}

/// Build the candidate list for `pair`.
///
/// `tokens` should be the pair's own cached tokens; when given,
/// candidate token sequences are filled in alongside the strings.
/// `rng` is only drawn from when `shuffle` is set.
pub fn build<'a, R: Rng + ?Sized>(
    pair:    &'a QaPair,
    tokens:  Option<&'a QaTokens>,
    shuffle: bool,
    rng:     &mut R,
) -> Option<MultipleChoice<'a>> {
    let choices = pair.multiple_choices.as_ref()?;
    let answer  = pair.answer.as_deref();

    // Slot 0 is the answer only when there is one
    let offset = usize::from(answer.is_some());
    let mut order: Vec<usize> = (0..choices.len() + offset).collect();
    if shuffle {
        order.shuffle(rng);
    }

    let mut candidates  = Vec::with_capacity(order.len());
    let mut cand_tokens = tokens.map(|_| Vec::with_capacity(order.len()));
    let mut selection   = None;

    for (pos, &slot) in order.iter().enumerate() {
        match answer {
            Some(a) if slot == 0 => {
                candidates.push(a);
                selection = Some(pos);
                if let (Some(out), Some(t)) = (cand_tokens.as_mut(), tokens) {
                    out.push(t.answer.as_deref().unwrap_or_default());
                }
            }
            _ => {
                let d = slot - offset;
                candidates.push(choices[d].as_str());
                if let (Some(out), Some(t)) = (cand_tokens.as_mut(), tokens) {
                    out.push(t.choices[d].as_slice());
                }
            }
        }
    }

    Some(MultipleChoice { candidates, tokens: cand_tokens, selection })
}
