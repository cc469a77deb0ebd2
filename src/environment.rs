//! Preview environments and their fixed file sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Source language of a file, used for editor highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    Javascript,
}

/// A single editable source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Path-like name, unique within its environment.
    pub name: String,
    /// Language of the content.
    pub language: Language,
    /// Current content.
    pub content: String,
}

impl File {
    /// Creates a file with the given name, language and content.
    pub fn new(name: impl Into<String>, language: Language, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language,
            content: content.into(),
        }
    }
}

/// A named preset of files and runtime scaffolding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Plain HTML/CSS/JS.
    #[default]
    Vanilla,
    /// React 18 with in-browser JSX transpilation.
    React,
}

impl Environment {
    /// All environments in selector order.
    pub const ALL: [Environment; 2] = [Environment::Vanilla, Environment::React];

    /// Lowercase tag used on the wire and in configuration.
    pub fn tag(&self) -> &'static str {
        match self {
            Environment::Vanilla => "vanilla",
            Environment::React => "react",
        }
    }

    /// Human-readable label for environment selectors.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Vanilla => "Vanilla JavaScript",
            Environment::React => "React",
        }
    }

    /// Returns the default files for this environment, in display order.
    pub fn default_files(&self) -> Vec<File> {
        match self {
            Environment::Vanilla => vec![
                File::new("index.html", Language::Html, VANILLA_INDEX_HTML),
                File::new("style.css", Language::Css, ""),
                File::new("index.js", Language::Javascript, ""),
            ],
            Environment::React => vec![
                File::new("public/index.html", Language::Html, REACT_INDEX_HTML),
                File::new("src/App.js", Language::Javascript, REACT_APP_JS),
                File::new("src/index.js", Language::Javascript, REACT_INDEX_JS),
                File::new("src/style.css", Language::Css, ""),
            ],
        }
    }

    /// Returns true if `name` is one of this environment's fixed files.
    pub fn has_file(&self, name: &str) -> bool {
        self.default_files().iter().any(|f| f.name == name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vanilla" => Ok(Environment::Vanilla),
            "react" => Ok(Environment::React),
            other => Err(Error::UnknownEnvironment(other.to_string())),
        }
    }
}

const VANILLA_INDEX_HTML: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>Vanilla JS App</title>\n</head>\n<body>\n  <div id=\"app\"></div>\n</body>\n</html>";

const REACT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>React App</title>
</head>
<body>
  <div id="root"></div>
</body>
</html>"#;

const REACT_APP_JS: &str = r#"function App() {
  return (
    <div>
      <h1>Hello from React!</h1>
    </div>
  );
}"#;

const REACT_INDEX_JS: &str = r#"const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_files_are_the_html_css_js_trio() {
        let names: Vec<_> = Environment::Vanilla
            .default_files()
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(names, vec!["index.html", "style.css", "index.js"]);
    }

    #[test]
    fn react_files_start_with_public_index() {
        let files = Environment::React.default_files();

        assert_eq!(files.len(), 4);
        assert_eq!(files[0].name, "public/index.html");
        assert_eq!(files[0].language, Language::Html);
        assert!(files[1].content.contains("Hello from React!"));
        assert!(files[2].content.contains("ReactDOM.createRoot"));
    }

    #[test]
    fn environment_parses_from_tag() {
        assert_eq!("vanilla".parse::<Environment>().unwrap(), Environment::Vanilla);
        assert_eq!(" React ".parse::<Environment>().unwrap(), Environment::React);
        assert!(matches!(
            "svelte".parse::<Environment>(),
            Err(Error::UnknownEnvironment(tag)) if tag == "svelte"
        ));
    }

    #[test]
    fn environment_serializes_to_lowercase() {
        let json = serde_json::to_string(&Environment::React).unwrap();
        assert_eq!(json, "\"react\"");
        assert_eq!(Environment::React.to_string(), "react");
        assert_eq!(Environment::Vanilla.label(), "Vanilla JavaScript");
    }

    #[test]
    fn has_file_only_matches_fixed_names() {
        assert!(Environment::React.has_file("src/App.js"));
        assert!(!Environment::React.has_file("index.js"));
        assert!(!Environment::Vanilla.has_file("src/App.js"));
    }
}
