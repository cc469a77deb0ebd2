//! Starter files for a practice question.
//!
//! A starter names an environment and overrides the contents of some of its
//! fixed files, e.g. the HTML skeleton a question hands to the candidate.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Validate, ValidationResult};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::store::FileStore;

/// Starter contents for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Starter {
    /// Starter name.
    pub name: String,

    /// Description shown next to the editor.
    #[serde(default)]
    pub description: String,

    /// Environment the files belong to.
    #[serde(default)]
    pub environment: Environment,

    /// File name to content overrides.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Starter {
    /// Loads a starter from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the starter's contents into `store`.
    ///
    /// Fails without touching the store if the starter is invalid.
    pub fn apply(&self, store: &mut FileStore) -> Result<()> {
        self.validate().into_result()?;

        store.commit(self.environment, &self.files);
        tracing::info!(
            starter = %self.name,
            environment = %self.environment,
            files = self.files.len(),
            "applied starter"
        );
        Ok(())
    }
}

impl Validate for Starter {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.name.trim().is_empty() {
            result.add_error("starter name cannot be empty");
        }

        for name in self.files.keys() {
            if !self.environment.has_file(name) {
                result.add_error(format!(
                    "starter file '{}' is not part of the {} environment",
                    name, self.environment
                ));
            }
        }

        if self.files.is_empty() {
            result.add_warning(format!("starter '{}' overrides no files", self.name));
        }

        result
    }
}
