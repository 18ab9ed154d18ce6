//! Authoring session: the mutable editing state behind a template.
//!
//! A session starts either empty (`New`) or from a loaded template (`Bound`
//! to its filename). A new session is bound only once its first save has
//! reached the store; later saves reuse that filename. Prompt indices come from a counter the
//! session owns, so each editing session numbers its prompts independently.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::placeholder::{all_required_indices, missing_indices, unused_input_keys};
use crate::schema::prompt::PromptIndex;
use crate::schema::template::{canonical_filename, StoryTemplate, TemplateError};
use crate::store::{FlukeStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a filename is required for the first save")]
    FilenameRequired,
    #[error("title, body and every prompt must be filled in before saving")]
    Incomplete,
    #[error("no prompt with index {0}")]
    UnknownPrompt(PromptIndex),
    #[error("prompt indices exhausted")]
    IndicesExhausted,
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether the session has a storage filename yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    New,
    Bound(String),
}

/// One editable prompt row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRow {
    pub index: PromptIndex,
    pub prompt: String,
}

/// Result of checking the current edit state before a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveCheck {
    /// Placeholders with no prompt. Saving fails while non-empty.
    pub undefined: BTreeSet<PromptIndex>,
    /// Prompts no placeholder refers to. The caller may ask for confirmation.
    pub unused: BTreeSet<PromptIndex>,
}

impl SaveCheck {
    pub fn is_blocking(&self) -> bool {
        !self.undefined.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    state: SessionState,
    title: String,
    body: String,
    rows: Vec<PromptRow>,
    last_index: u32,
    modified: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// A blank session with a single empty prompt row numbered 1.
    pub fn new() -> Self {
        EditorSession {
            state: SessionState::New,
            title: String::new(),
            body: String::new(),
            rows: vec![PromptRow {
                index: PromptIndex(1),
                prompt: String::new(),
            }],
            last_index: 1,
            modified: false,
        }
    }

    /// Edit an existing template. Numbering continues after its highest index.
    pub fn open(template: &StoryTemplate) -> Self {
        let rows: Vec<PromptRow> = template
            .inputs()
            .iter()
            .map(|(index, prompt)| PromptRow {
                index: *index,
                prompt: prompt.clone(),
            })
            .collect();
        let last_index = rows.iter().map(|r| r.index.0).max().unwrap_or(0);
        debug!(filename = template.filename(), rows = rows.len(), "opened template for editing");

        EditorSession {
            state: SessionState::Bound(template.filename().to_string()),
            title: template.title().to_string(),
            body: template.body().to_string(),
            rows,
            last_index,
            modified: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn filename(&self) -> Option<&str> {
        match &self.state {
            SessionState::Bound(name) => Some(name),
            SessionState::New => None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn rows(&self) -> &[PromptRow] {
        &self.rows
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Append a blank prompt row and return its index.
    pub fn add_prompt(&mut self) -> Result<PromptIndex, SessionError> {
        let next = self
            .last_index
            .checked_add(1)
            .ok_or(SessionError::IndicesExhausted)?;
        self.last_index = next;
        let index = PromptIndex(next);
        self.rows.push(PromptRow {
            index,
            prompt: String::new(),
        });
        self.modified = true;
        Ok(index)
    }

    /// Remove the rows with the given indices. Returns how many were removed.
    ///
    /// Removed indices are not reused.
    pub fn remove_prompts(&mut self, indices: &[PromptIndex]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !indices.contains(&row.index));
        let removed = before - self.rows.len();
        if removed > 0 {
            self.modified = true;
        }
        removed
    }

    pub fn set_prompt(
        &mut self,
        index: PromptIndex,
        prompt: impl Into<String>,
    ) -> Result<(), SessionError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.index == index)
            .ok_or(SessionError::UnknownPrompt(index))?;
        row.prompt = prompt.into();
        self.modified = true;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.modified = true;
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.modified = true;
    }

    /// True while the title, the body, or any prompt is blank.
    pub fn is_incomplete(&self) -> bool {
        self.title.trim().is_empty()
            || self.body.trim().is_empty()
            || self.rows.iter().any(|row| row.prompt.trim().is_empty())
    }

    /// Whether a save would be worthwhile: there are unsaved edits and
    /// nothing is blank.
    pub fn can_save(&self) -> bool {
        self.modified && !self.is_incomplete()
    }

    pub fn inputs(&self) -> BTreeMap<PromptIndex, String> {
        self.rows
            .iter()
            .map(|row| (row.index, row.prompt.clone()))
            .collect()
    }

    /// Compare the placeholders in use against the defined prompts.
    pub fn check(&self) -> SaveCheck {
        let keys: BTreeSet<PromptIndex> = self.rows.iter().map(|row| row.index).collect();
        let required = all_required_indices(&self.title, &self.body);
        SaveCheck {
            undefined: missing_indices(&keys, &required),
            unused: unused_input_keys(&keys, &self.title, &self.body),
        }
    }

    /// Build the template a save would write, without touching the session.
    ///
    /// A `New` session needs `destination`, which is canonicalized. A `Bound`
    /// session ignores it. Title and body are trimmed.
    pub fn snapshot(&self, destination: Option<&str>) -> Result<StoryTemplate, SessionError> {
        if self.is_incomplete() {
            return Err(SessionError::Incomplete);
        }

        let filename = match &self.state {
            SessionState::Bound(name) => name.clone(),
            SessionState::New => {
                let destination = destination.ok_or(SessionError::FilenameRequired)?;
                canonical_filename(destination)?
            }
        };

        Ok(StoryTemplate::new(
            &filename,
            self.title.trim(),
            self.inputs(),
            self.body.trim(),
        )?)
    }

    /// Record that `template` has been persisted: bind to its filename and
    /// clear the modified flag.
    pub fn mark_saved(&mut self, template: &StoryTemplate) {
        if self.state == SessionState::New {
            info!(filename = template.filename(), "session bound to file");
        }
        self.state = SessionState::Bound(template.filename().to_string());
        self.modified = false;
    }

    /// Snapshot, write to `store`, then mark saved.
    ///
    /// The session only changes once the write has succeeded.
    pub fn save(
        &mut self,
        store: &FlukeStore,
        destination: Option<&str>,
    ) -> Result<StoryTemplate, SessionError> {
        let template = self.snapshot(destination)?;
        store.save(&template)?;
        self.mark_saved(&template);
        Ok(template)
    }
}
