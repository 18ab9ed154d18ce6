//! Placeholder extraction and template validation.

use std::collections::BTreeSet;

use crate::core::token::segments;
use crate::schema::prompt::PromptIndex;

/// The distinct placeholder indices referenced in `text`.
pub fn required_indices(text: &str) -> BTreeSet<PromptIndex> {
    segments(text).filter_map(|s| s.index()).collect()
}

/// The indices referenced by a title and body together.
pub fn all_required_indices(title: &str, body: &str) -> BTreeSet<PromptIndex> {
    let mut indices = required_indices(title);
    indices.extend(required_indices(body));
    indices
}

/// True if every placeholder in `text` has a key in `input_keys`.
pub fn is_valid(input_keys: &BTreeSet<PromptIndex>, text: &str) -> bool {
    required_indices(text).is_subset(input_keys)
}

/// Required indices with no corresponding input key.
pub fn missing_indices(
    input_keys: &BTreeSet<PromptIndex>,
    required: &BTreeSet<PromptIndex>,
) -> BTreeSet<PromptIndex> {
    required.difference(input_keys).copied().collect()
}

/// Input keys that neither the title nor the body references.
///
/// These are harmless but usually indicate a prompt the author forgot to
/// delete.
pub fn unused_input_keys(
    input_keys: &BTreeSet<PromptIndex>,
    title: &str,
    body: &str,
) -> BTreeSet<PromptIndex> {
    let required = all_required_indices(title, body);
    input_keys.difference(&required).copied().collect()
}
