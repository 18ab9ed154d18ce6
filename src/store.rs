//! Filesystem storage for `.fluke` templates and finished stories.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::schema::template::{
    is_plain_file_name, Story, StoryTemplate, TemplateError, FLUKE_EXTENSION,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("'{0}' is not a file name inside the store")]
    OutsideStore(String),
    #[error("'{0}' does not end with .fluke")]
    MissingExtension(String),
    #[error("could not load '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: TemplateError,
    },
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

/// A directory of `.fluke` files.
#[derive(Debug, Clone)]
pub struct FlukeStore {
    dir: PathBuf,
}

impl FlukeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.fluke_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path of `filename` in this store. `filename` must be a single
    /// file name; anything that could resolve outside the directory is refused.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_file_name(filename) {
            return Err(StoreError::OutsideStore(filename.to_string()));
        }
        Ok(self.dir.join(filename))
    }

    /// Write `template` to `<dir>/<filename>`, replacing any existing file.
    /// Creates the directory if needed. Returns the written path.
    pub fn save(&self, template: &StoryTemplate) -> Result<PathBuf, StoreError> {
        let path = self.path_for(template.filename())?;
        self.ensure_dir()?;
        let json = template.to_json()?;
        std::fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "saved template");
        Ok(path)
    }

    /// Read and validate `<dir>/<name>`. `name` must carry the `.fluke` suffix.
    pub fn load(&self, name: &str) -> Result<StoryTemplate, StoreError> {
        if !name.ends_with(FLUKE_EXTENSION) {
            return Err(StoreError::MissingExtension(name.to_string()));
        }
        let path = self.path_for(name)?;
        let json = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let template = StoryTemplate::from_json(&json).map_err(|source| StoreError::Load {
            name: name.to_string(),
            source,
        })?;
        debug!(path = %path.display(), prompts = template.inputs().len(), "loaded template");
        Ok(template)
    }

    /// Write the rendered story text to an arbitrary path.
    pub fn save_story(story: &Story, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, story.render()).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "saved story");
        Ok(())
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.is_file() {
            return Err(StoreError::NotADirectory(self.dir.clone()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::prompt::PromptIndex;
    use std::collections::BTreeMap;

    fn sample() -> StoryTemplate {
        let inputs: BTreeMap<_, _> = [(PromptIndex(1), "A name".to_string())].into_iter().collect();
        StoryTemplate::new("sample", "{1}", inputs, "Hello {1}").unwrap()
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlukeStore::new(dir.path().join("nested"));
        let path = store.save(&sample()).unwrap();
        assert!(path.ends_with("sample.fluke"));
        assert_eq!(store.load("sample.fluke").unwrap(), sample());
    }

    #[test]
    fn load_requires_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlukeStore::new(dir.path());
        assert!(matches!(store.load("sample"), Err(StoreError::MissingExtension(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlukeStore::new(dir.path());
        assert!(matches!(store.load("nope.fluke"), Err(StoreError::Io { .. })));
    }

    #[test]
    fn malformed_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.fluke"), "{ not json").unwrap();
        let store = FlukeStore::new(dir.path());
        assert!(matches!(store.load("bad.fluke"), Err(StoreError::Load { .. })));
    }

    #[test]
    fn dir_that_is_a_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("flukes");
        std::fs::write(&file, "").unwrap();
        let store = FlukeStore::new(&file);
        assert!(matches!(store.save(&sample()), Err(StoreError::NotADirectory(_))));
    }

    #[test]
    fn path_for_refuses_escaping_names() {
        let store = FlukeStore::new("flukes");
        for name in ["../escaped.fluke", "a/b.fluke", "/tmp/x.fluke", "..", "."] {
            assert!(
                matches!(store.path_for(name), Err(StoreError::OutsideStore(_))),
                "expected {name:?} to be refused"
            );
        }
        assert_eq!(
            store.path_for("ok.fluke").unwrap(),
            PathBuf::from("flukes").join("ok.fluke")
        );
    }

    #[test]
    fn load_outside_store_refused() {
        let root = tempfile::tempdir().unwrap();
        let store = FlukeStore::new(root.path().join("flukes"));
        store.save(&sample()).unwrap();
        std::fs::copy(
            root.path().join("flukes").join("sample.fluke"),
            root.path().join("outside.fluke"),
        )
        .unwrap();
        assert!(matches!(
            store.load("../outside.fluke"),
            Err(StoreError::OutsideStore(_))
        ));
    }

    #[test]
    fn story_written_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let story = Story {
            title: "T".to_string(),
            body: "B".to_string(),
        };
        FlukeStore::save_story(&story, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "T\n\nB");
    }
}
