//! Prompt indices and helpers for displaying sets of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Newtype wrapper for the number inside a `{N}` placeholder.
///
/// Serialized transparently, so a map keyed by `PromptIndex` is written
/// with plain decimal keys (`"1"`, `"2"`, ...) in JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PromptIndex(pub u32);

impl PromptIndex {
    /// The placeholder token for this index, e.g. `{3}`.
    pub fn token(&self) -> String {
        format!("{{{}}}", self.0)
    }
}

impl From<u32> for PromptIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PromptIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a set of indices as their tokens, separated by commas:
/// `{1, 2}` becomes `"{1}, {2}"`. An empty set renders as an empty string.
pub fn format_indices(indices: &BTreeSet<PromptIndex>) -> String {
    indices
        .iter()
        .map(PromptIndex::token)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_wraps_in_braces() {
        assert_eq!(PromptIndex(7).token(), "{7}");
        assert_eq!(PromptIndex(0).token(), "{0}");
    }

    #[test]
    fn format_sorted_and_joined() {
        let set: BTreeSet<PromptIndex> = [3, 1, 2].into_iter().map(PromptIndex).collect();
        assert_eq!(format_indices(&set), "{1}, {2}, {3}");
    }

    #[test]
    fn format_empty() {
        assert_eq!(format_indices(&BTreeSet::new()), "");
    }

    #[test]
    fn serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&PromptIndex(12)).unwrap(), "12");
        let back: PromptIndex = serde_json::from_str("12").unwrap();
        assert_eq!(back, PromptIndex(12));
    }
}
