//! Preview configuration and validation.
//!
//! Configuration is read from TOML and validated before a session starts
//! to catch unusable settings early.

use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::document::DocumentTemplate;
use crate::error::{Error, Result};
use crate::relay::DEFAULT_TIMESTAMP_FORMAT;
use crate::sandbox::{SandboxPolicy, KNOWN_SANDBOX_TOKENS};

/// Validation result containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merges another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Trait for validatable configuration types.
pub trait Validate {
    /// Validates the configuration and returns any issues found.
    fn validate(&self) -> ValidationResult;
}

/// Console pane settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// chrono format string for entry timestamps.
    pub timestamp_format: String,
    /// Whether the console pane starts visible.
    pub visible: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            visible: true,
        }
    }
}

/// Complete preview configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub document: DocumentTemplate,
    pub sandbox: SandboxPolicy,
    pub console: ConsoleConfig,
}

impl PreviewConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        toml::from_str(&content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Validate for DocumentTemplate {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // CSP must be set, and must fit inside a quoted attribute
        if self.csp.trim().is_empty() {
            result.add_error("document.csp cannot be empty");
        }
        if self.csp.contains(['"', '<', '>']) {
            result.add_error("document.csp cannot contain '\"', '<' or '>'");
        }

        for src in &self.react_scripts {
            // Script URLs are placed in src="..."
            if src.contains(['"', '<', '>']) {
                result.add_error(format!(
                    "react script '{}' cannot contain '\"', '<' or '>'",
                    src
                ));
            }
            if !src.starts_with("https://") {
                result.add_warning(format!("react script '{}' is not served over https", src));
            }
        }

        // Without the runtime scripts the react environment cannot run
        if self.react_scripts.is_empty() {
            result.add_warning("no react scripts configured, the react environment will not run");
        }

        if let Some(proxy) = &self.proxy_url {
            // The proxy prefix is embedded in an inline script
            if proxy.to_lowercase().contains("</script") {
                result.add_error(format!("proxy_url '{}' cannot contain '</script'", proxy));
            }
            if !proxy.starts_with("https://") {
                result.add_warning(format!("proxy_url '{}' is not served over https", proxy));
            }
        }

        result
    }
}

impl Validate for SandboxPolicy {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Previews are script-driven
        if !self.allows_scripts() {
            result.add_error("sandbox.tokens must include 'allow-scripts' for previews to run");
        }

        // Unknown tokens are ignored by browsers, so only warn
        for token in &self.tokens {
            if !KNOWN_SANDBOX_TOKENS.contains(&token.as_str()) {
                result.add_warning(format!("unknown sandbox token '{}'", token));
            }
        }

        result
    }
}

impl Validate for ConsoleConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Every specifier must be one chrono understands
        if self.timestamp_format.trim().is_empty() {
            result.add_error("console.timestamp_format cannot be empty");
        } else if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            result.add_error(format!(
                "console.timestamp_format '{}' is not a valid format string",
                self.timestamp_format
            ));
        }

        result
    }
}

impl Validate for PreviewConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = self.document.validate();
        result.merge(self.sandbox.validate());
        result.merge(self.console.validate());
        result
    }
}
