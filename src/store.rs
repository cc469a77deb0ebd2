//! In-memory file store partitioned per environment.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::environment::{Environment, File};
use crate::error::Result;

/// Filename to content map consumed by the document generator.
pub type FileContents = BTreeMap<String, String>;

/// Holds the ordered file set of every environment.
#[derive(Debug, Clone)]
pub struct FileStore {
    sets: HashMap<Environment, Vec<File>>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    /// Creates a store holding every environment's default files.
    pub fn new() -> Self {
        let sets = Environment::ALL
            .iter()
            .map(|env| (*env, env.default_files()))
            .collect();
        Self { sets }
    }

    /// Returns the ordered files of an environment.
    pub fn files(&self, env: Environment) -> &[File] {
        self.sets.get(&env).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns a file by name.
    pub fn file(&self, env: Environment, name: &str) -> Option<&File> {
        self.files(env).iter().find(|f| f.name == name)
    }

    /// Replaces a file's content.
    ///
    /// Returns `false` without changing anything when `name` is not part of
    /// the environment's set.
    pub fn set_content(&mut self, env: Environment, name: &str, text: impl Into<String>) -> bool {
        let Some(file) = self
            .sets
            .get_mut(&env)
            .and_then(|files| files.iter_mut().find(|f| f.name == name))
        else {
            tracing::debug!(environment = %env, file = %name, "ignoring edit for unknown file");
            return false;
        };
        file.content = text.into();
        true
    }

    /// Returns the filename to content map of an environment.
    pub fn contents(&self, env: Environment) -> FileContents {
        self.files(env)
            .iter()
            .map(|f| (f.name.clone(), f.content.clone()))
            .collect()
    }

    /// Writes a content map back into an environment's set.
    ///
    /// Names outside the set are ignored.
    pub fn commit(&mut self, env: Environment, contents: &FileContents) {
        for (name, text) in contents {
            self.set_content(env, name, text.clone());
        }
    }

    /// Replaces contents from files found under `dir`.
    ///
    /// Each file of the environment is looked up at its relative name; files
    /// that do not exist on disk keep their current content. Returns the
    /// names that were loaded.
    pub async fn overlay_dir(&mut self, env: Environment, dir: &Path) -> Result<Vec<String>> {
        let names: Vec<String> = self.files(env).iter().map(|f| f.name.clone()).collect();
        let mut loaded = Vec::new();

        for name in names {
            let path = dir.join(&name);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    self.set_content(env, &name, text);
                    loaded.push(name);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = ?path, "no override on disk, keeping content");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(environment = %env, dir = ?dir, loaded = loaded.len(), "overlaid files from directory");
        Ok(loaded)
    }
}
