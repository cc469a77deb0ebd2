//! Document generation for the isolated renderer.
//!
//! Assembles a self-contained HTML document from an environment's file
//! contents. Generation is pure string templating: the same template,
//! environment and contents always produce byte-identical output.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::sandbox::escape_attribute;
use crate::store::FileContents;

/// Content-Security-Policy injected into every generated document.
pub const DEFAULT_CSP: &str = "default-src * 'unsafe-inline' 'unsafe-eval' data: blob:; connect-src * 'unsafe-inline' 'unsafe-eval' data: blob:;";

/// Proxy prefix used by the `fetchWithProxy` helper.
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw?url=";

/// Runtime scripts loaded by the react environment, in load order.
pub const DEFAULT_REACT_SCRIPTS: &[&str] = &[
    "https://cdnjs.cloudflare.com/ajax/libs/react/18.2.0/umd/react.development.js",
    "https://cdnjs.cloudflare.com/ajax/libs/react-dom/18.2.0/umd/react-dom.development.js",
    "https://cdnjs.cloudflare.com/ajax/libs/babel-standalone/7.22.5/babel.min.js",
];

/// Forwards console calls and uncaught errors to the parent context while
/// keeping the original console behaviour.
const CONSOLE_BRIDGE: &str = r#"(function () {
  var target = window.console;
  ['log', 'error', 'warn'].forEach(function (kind) {
    var original = target[kind].bind(target);
    target[kind] = function () {
      var args = Array.prototype.slice.call(arguments);
      window.parent.postMessage({ type: 'console', logType: kind, message: args.join(' ') }, '*');
      original.apply(null, args);
    };
  });
  window.onerror = function (message, source, lineno, colno) {
    window.parent.postMessage({
      type: 'console',
      logType: 'error',
      message: 'Error: ' + message + ' at line ' + lineno + ':' + colno
    }, '*');
  };
})();"#;

/// Template settings that vary per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTemplate {
    /// Content-Security-Policy meta value.
    pub csp: String,
    /// Prefix for `fetchWithProxy`; the helper is omitted when `None`.
    pub proxy_url: Option<String>,
    /// Script URLs loaded ahead of the react bundle.
    pub react_scripts: Vec<String>,
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            csp: DEFAULT_CSP.to_string(),
            proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            react_scripts: DEFAULT_REACT_SCRIPTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DocumentTemplate {
    /// Renders the document for an environment.
    pub fn render(&self, env: Environment, contents: &FileContents) -> String {
        match env {
            Environment::Vanilla => self.render_vanilla(contents),
            Environment::React => self.render_react(contents),
        }
    }

    fn render_vanilla(&self, contents: &FileContents) -> String {
        let html = lookup(contents, "index.html");
        let css = lookup(contents, "style.css");
        let js = lookup(contents, "index.js");

        format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n{head}  </head>\n  <body>\n{html}\n    <script>{js}</script>\n  </body>\n</html>\n",
            head = self.head(css, &[]),
        )
    }

    fn render_react(&self, contents: &FileContents) -> String {
        let css = lookup(contents, "src/style.css");
        let app = lookup(contents, "src/App.js");
        let index = lookup(contents, "src/index.js");

        format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n{head}  </head>\n  <body>\n    <div id=\"root\"></div>\n    <script type=\"text/babel\" data-presets=\"react\">\nconst {{ useState, useEffect }} = React;\n\n{app}\n{index}\n    </script>\n  </body>\n</html>\n",
            head = self.head(css, &self.react_scripts),
        )
    }

    fn head(&self, css: &str, scripts: &[String]) -> String {
        let mut head = String::new();
        head.push_str("    <meta charset=\"utf-8\">\n");
        // Configured values land in attributes, user CSS does not.
        head.push_str(&format!(
            "    <meta http-equiv=\"Content-Security-Policy\" content=\"{}\">\n",
            escape_attribute(&self.csp)
        ));
        head.push_str(&format!("    <style>{css}</style>\n"));
        for src in scripts {
            head.push_str(&format!(
                "    <script src=\"{}\"></script>\n",
                escape_attribute(src)
            ));
        }
        head.push_str("    <script>\n");
        if let Some(proxy) = &self.proxy_url {
            head.push_str(&proxy_helper(proxy));
            head.push('\n');
        }
        head.push_str(CONSOLE_BRIDGE);
        head.push_str("\n    </script>\n");
        head
    }
}

/// Generates the document for an environment with the default template.
pub fn generate(env: Environment, contents: &FileContents) -> String {
    DocumentTemplate::default().render(env, contents)
}

fn lookup<'a>(contents: &'a FileContents, name: &str) -> &'a str {
    contents.get(name).map(String::as_str).unwrap_or("")
}

fn proxy_helper(proxy_url: &str) -> String {
    // `</` inside an inline script would close the element early.
    let proxy = serde_json::to_string(proxy_url)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/");
    format!(
        r#"window.fetchWithProxy = function (url, options) {{
  options = options || {{}};
  return fetch({proxy} + encodeURIComponent(url), options).catch(function (error) {{
    console.error('Proxy fetch error:', error);
    return fetch(url, options);
  }});
}};"#
    )
}
