// ============================================================
// Layer 5 — Question Categories
// ============================================================
// Assigns each scored question to a category for the accuracy
// breakdown. Two sources, chosen per dataset variant:
//
//   Lexical   the question's first word, when it is one of the
//             six W's: what / where / when / who / why / how
//             ("Where is the cat?" → "where", "Is it red?" → none)
//
//   Explicit  the pair's own `type` field, whatever it says
//
// CategoryTally keeps running correct/total counts per category
// in a stable order: the fixed W order for lexical categories,
// first-seen order for explicit ones.

use serde::{Deserialize, Serialize};

use crate::domain::qa_pair::QaPair;
use crate::eval::report::{CategoryAccuracy, Tally};

/// The lexical question categories, in report order
pub const QUESTION_WORDS: [&str; 6] = ["what", "where", "when", "who", "why", "how"];

/// Where a question's category comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Leading question word
    Lexical,
    /// The pair's explicit category field
    Explicit,
}

impl CategorySource {
    /// Category of `pair`, if it has one under this source
    pub fn categorize(self, pair: &QaPair) -> Option<String> {
        match self {
            CategorySource::Lexical => pair
                .leading_word()
                .filter(|w| QUESTION_WORDS.contains(&w.as_str())),
            CategorySource::Explicit => pair.category.clone(),
        }
    }
}

/// Running per-category counters
#[derive(Debug, Clone)]
pub struct CategoryTally {
    source:  CategorySource,
    entries: Vec<(String, Tally)>,
}

impl CategoryTally {
    pub fn new(source: CategorySource) -> Self {
        let entries = match source {
            CategorySource::Lexical => QUESTION_WORDS
                .iter()
                .map(|w| (w.to_string(), Tally::default()))
                .collect(),
            CategorySource::Explicit => Vec::new(),
        };
        Self { source, entries }
    }

    /// Count one scored pair
    pub fn record(&mut self, pair: &QaPair, correct: bool) {
        let Some(category) = self.source.categorize(pair) else {
            return;
        };
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, tally)) => tally.record(correct),
            None => {
                let mut tally = Tally::default();
                tally.record(correct);
                self.entries.push((category, tally));
            }
        }
    }

    /// Final per-category accuracies; empty categories are omitted
    pub fn finish(self) -> Vec<CategoryAccuracy> {
        self.entries
            .into_iter()
            .filter_map(|(category, tally)| {
                tally.accuracy().ok().map(|accuracy| CategoryAccuracy {
                    category,
                    correct: tally.correct,
                    total: tally.total,
                    accuracy,
                })
            })
            .collect()
    }
}
