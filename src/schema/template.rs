//! The story template entity and its persisted record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::placeholder::{all_required_indices, missing_indices, unused_input_keys};
use crate::core::substitution::{substitute, AnswerSet, SubstitutionError};
use crate::schema::prompt::{format_indices, PromptIndex};

/// File suffix for stored templates.
pub const FLUKE_EXTENSION: &str = ".fluke";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("undefined placeholders used in the story: {}", format_indices(.missing))]
    Invalid { missing: BTreeSet<PromptIndex> },
    #[error("template filename is empty")]
    EmptyFilename,
    #[error("template filename '{0}' must be a plain file name")]
    InvalidFilename(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON serialization error: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Trim `name` and append the `.fluke` suffix if it is missing.
///
/// The result is always a single file name: separators, `.`/`..` and
/// absolute or drive-prefixed paths are rejected.
pub fn canonical_filename(name: &str) -> Result<String, TemplateError> {
    let name = name.trim();
    if name.is_empty() || name == FLUKE_EXTENSION {
        return Err(TemplateError::EmptyFilename);
    }
    if !is_plain_file_name(name) {
        return Err(TemplateError::InvalidFilename(name.to_string()));
    }
    if name.ends_with(FLUKE_EXTENSION) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{FLUKE_EXTENSION}"))
    }
}

/// True if `name` is exactly one normal path component on every platform.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\', ':']) || name == "." || name == ".." {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// The on-disk shape of a template, before validation.
///
/// `body` also accepts the older field name `story`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub filename: String,
    pub title: String,
    pub inputs: BTreeMap<PromptIndex, String>,
    #[serde(alias = "story")]
    pub body: String,
}

impl StoryRecord {
    /// Parse a record without checking its placeholders.
    pub fn from_json(json: &str) -> Result<StoryRecord, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A validated story template: every placeholder in the title and body has
/// a prompt. Immutable once built; editing produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoryRecord", into = "StoryRecord")]
pub struct StoryTemplate {
    filename: String,
    title: String,
    inputs: BTreeMap<PromptIndex, String>,
    body: String,
}

impl StoryTemplate {
    /// Build a template, rejecting any placeholder without a prompt.
    ///
    /// Prompts that no placeholder uses are allowed and only logged.
    pub fn new(
        filename: impl AsRef<str>,
        title: impl Into<String>,
        inputs: BTreeMap<PromptIndex, String>,
        body: impl Into<String>,
    ) -> Result<StoryTemplate, TemplateError> {
        let filename = canonical_filename(filename.as_ref())?;
        let title = title.into();
        let body = body.into();

        let keys: BTreeSet<PromptIndex> = inputs.keys().copied().collect();
        let missing = missing_indices(&keys, &all_required_indices(&title, &body));
        if !missing.is_empty() {
            debug!(filename = %filename, missing = %format_indices(&missing), "rejected template");
            return Err(TemplateError::Invalid { missing });
        }

        let unused = unused_input_keys(&keys, &title, &body);
        if !unused.is_empty() {
            warn!(filename = %filename, unused = %format_indices(&unused), "template has unused prompts");
        }

        Ok(StoryTemplate {
            filename,
            title,
            inputs,
            body,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn inputs(&self) -> &BTreeMap<PromptIndex, String> {
        &self.inputs
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn input_keys(&self) -> BTreeSet<PromptIndex> {
        self.inputs.keys().copied().collect()
    }

    /// Prompts defined but never referenced.
    pub fn unused_input_keys(&self) -> BTreeSet<PromptIndex> {
        unused_input_keys(&self.input_keys(), &self.title, &self.body)
    }

    /// Fill in title and body with `answers`.
    ///
    /// `answers` is expected to carry one entry per prompt; the lowest
    /// blank answer is reported as `InputEmpty`.
    pub fn substitute(&self, answers: &AnswerSet) -> Result<Story, SubstitutionError> {
        let title = substitute(answers, &self.title)?;
        let body = substitute(answers, &self.body)?;
        Ok(Story { title, body })
    }

    pub fn from_json(json: &str) -> Result<StoryTemplate, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Indented JSON, the `.fluke` file format.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_ron(input: &str) -> Result<StoryTemplate, TemplateError> {
        Ok(ron::from_str(input)?)
    }

    pub fn to_ron(&self) -> Result<String, TemplateError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

impl TryFrom<StoryRecord> for StoryTemplate {
    type Error = TemplateError;

    fn try_from(record: StoryRecord) -> Result<Self, Self::Error> {
        StoryTemplate::new(record.filename, record.title, record.inputs, record.body)
    }
}

impl From<StoryTemplate> for StoryRecord {
    fn from(template: StoryTemplate) -> Self {
        StoryRecord {
            filename: template.filename,
            title: template.title,
            inputs: template.inputs,
            body: template.body,
        }
    }
}

/// A finished story: the template's title and body with answers filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub body: String,
}

impl Story {
    /// Plain text for saving or copying: the title, a blank line, the body.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }
}
