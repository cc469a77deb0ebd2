//! Sandbox restrictions applied to the rendering surface.

use serde::{Deserialize, Serialize};

/// Sandbox tokens the rendering surface understands.
pub const KNOWN_SANDBOX_TOKENS: &[&str] = &[
    "allow-downloads",
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
    "allow-storage-access-by-user-activation",
    "allow-top-navigation",
    "allow-top-navigation-by-user-activation",
    "allow-top-navigation-to-custom-protocols",
];

/// Restrictions for the isolated rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    /// Tokens placed in the `sandbox` attribute.
    pub tokens: Vec<String>,
    /// Permissions policy placed in the `allow` attribute.
    pub allow: Option<String>,
}

impl Default for SandboxPolicy {
    /// Scripts, same-origin, forms, downloads, popups and modals.
    fn default() -> Self {
        Self {
            tokens: vec![
                "allow-scripts".to_string(),
                "allow-same-origin".to_string(),
                "allow-forms".to_string(),
                "allow-downloads".to_string(),
                "allow-popups".to_string(),
                "allow-modals".to_string(),
            ],
            allow: Some("cross-origin-isolated".to_string()),
        }
    }
}

impl SandboxPolicy {
    /// Value of the `sandbox` attribute.
    pub fn sandbox_attribute(&self) -> String {
        self.tokens.join(" ")
    }

    /// Returns true if scripts may run inside the surface.
    pub fn allows_scripts(&self) -> bool {
        self.tokens.iter().any(|t| t == "allow-scripts")
    }

    /// Builds an iframe element that loads `document` through `srcdoc`.
    pub fn iframe(&self, document: &str) -> String {
        let mut tag = format!(
            "<iframe sandbox=\"{}\"",
            escape_attribute(&self.sandbox_attribute())
        );
        if let Some(allow) = &self.allow {
            tag.push_str(&format!(" allow=\"{}\"", escape_attribute(allow)));
        }
        tag.push_str(&format!(" srcdoc=\"{}\"></iframe>", escape_attribute(document)));
        tag
    }
}

/// Escapes text for use inside a double-quoted HTML attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
