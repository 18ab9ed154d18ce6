//! Answer substitution: filling a template's placeholders with player answers.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, error};

use crate::core::placeholder::{missing_indices, required_indices};
use crate::core::token::{segments, Segment};
use crate::schema::prompt::{format_indices, PromptIndex};

/// Answers supplied during playback, keyed by prompt index.
pub type AnswerSet = BTreeMap<PromptIndex, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    /// An answer is blank after trimming. Carries the lowest such index.
    #[error("no answer given for prompt {}", .0.token())]
    InputEmpty(PromptIndex),
    /// The text uses placeholders the answers do not cover. Callers that
    /// validated the template first never see this.
    #[error("answers do not cover placeholders: {}", format_indices(.missing))]
    TemplateInvalid { missing: BTreeSet<PromptIndex> },
}

impl SubstitutionError {
    /// True for conditions the player can fix by filling in a field.
    pub fn is_user_error(&self) -> bool {
        matches!(self, SubstitutionError::InputEmpty(_))
    }
}

/// Replace every `{k}` in `text` with the trimmed answer for `k`.
///
/// Checks run in order: every placeholder in `text` must have an answer,
/// then every answer must be non-blank (lowest index reported first).
/// Output is built in one pass over the original text, so placeholder-like
/// text inside an answer is never substituted again.
pub fn substitute(answers: &AnswerSet, text: &str) -> Result<String, SubstitutionError> {
    let keys: BTreeSet<PromptIndex> = answers.keys().copied().collect();
    let missing = missing_indices(&keys, &required_indices(text));
    if !missing.is_empty() {
        error!(
            missing = %format_indices(&missing),
            "substitution attempted with incomplete answer set"
        );
        return Err(SubstitutionError::TemplateInvalid { missing });
    }

    if let Some((index, _)) = answers.iter().find(|(_, answer)| answer.trim().is_empty()) {
        debug!(index = %index, "blank answer");
        return Err(SubstitutionError::InputEmpty(*index));
    }

    let mut output = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Placeholder {
                digits,
                index: Some(index),
                ..
            } if is_literal_token(digits) => match answers.get(&index) {
                Some(answer) => output.push_str(answer.trim()),
                None => output.push_str(segment.as_str()),
            },
            other => output.push_str(other.as_str()),
        }
    }
    Ok(output)
}

/// Answers replace the exact token `{k}`, so `{01}` is left alone even
/// though it counts toward the required set.
fn is_literal_token(digits: &str) -> bool {
    digits.len() == 1 || !digits.starts_with('0')
}
