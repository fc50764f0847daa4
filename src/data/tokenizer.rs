// ============================================================
// Layer 4 — Text Tokenizer
// ============================================================
// Turns a raw question or answer string into the normalised
// word sequence every other component compares against.
//
// Rules (applied in order):
//   1. Questions must end with '?', answers with '.'.
//      A missing terminator means the source data is corrupt,
//      so it is an error, never silently repaired.
//   2. Drop that final punctuation character
//   3. Lower-case the remainder
//   4. Every non-alphanumeric character becomes a separator
//   5. Split on whitespace
//   6. Re-append the punctuation as its own final token
//
// Example:
//   "Is this red?"  →  ["is", "this", "red", "?"]
//   "A red ball."   →  ["a", "red", "ball", "."]
//
// The function is pure: same input and kind, same output.
// The scorer relies on this for exact token-sequence matching.

use crate::domain::error::{Result, VqaError};

/// What kind of text is being tokenized, which decides the
/// required terminal punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Must end with '?'
    Question,
    /// Must end with '.'
    Answer,
    /// No punctuation requirement and no synthetic final token
    Plain,
}

impl TextKind {
    /// The punctuation this kind of text must end with, if any
    pub fn terminal(self) -> Option<char> {
        match self {
            TextKind::Question => Some('?'),
            TextKind::Answer   => Some('.'),
            TextKind::Plain    => None,
        }
    }
}

/// Tokenize `text` according to `kind`.
///
/// # Errors
/// Returns `VqaError::Format` when a question does not end with '?'
/// or an answer does not end with '.'.
pub fn tokenize(text: &str, kind: TextKind) -> Result<Vec<String>> {
    let body = match kind.terminal() {
        Some(p) => text.strip_suffix(p).ok_or_else(|| VqaError::Format {
            text:     text.to_string(),
            expected: p,
        })?,
        None => text,
    };

    let normalised: String = body
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<String> = normalised
        .split_whitespace()
        .map(str::to_string)
        .collect();

    if let Some(p) = kind.terminal() {
        tokens.push(p.to_string());
    }

    Ok(tokens)
}

/// Tokenize a free-form answer candidate, adding the trailing
/// period first when the predictor left it off.
pub fn tokenize_candidate(answer: &str) -> Result<Vec<String>> {
    if answer.ends_with('.') {
        tokenize(answer, TextKind::Answer)
    } else {
        tokenize(&format!("{answer}."), TextKind::Answer)
    }
}
