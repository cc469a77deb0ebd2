//! Renderer binding: published snapshots feed an isolated rendering surface.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::policy::SandboxPolicy;
use crate::environment::Environment;
use crate::error::{Error, Result};

/// A generated document published for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Monotonic publication counter; bumps on every publish, refreshes included.
    pub generation: u64,
    /// Environment the document was generated for.
    pub environment: Environment,
    /// Complete document assigned as the surface's srcdoc.
    pub document: Arc<str>,
}

/// A rendering surface that fully replaces its content on every load.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Replaces the surface's content with the snapshot's document.
    async fn load(&self, snapshot: &Snapshot) -> Result<()>;

    /// Returns the name of this renderer.
    fn name(&self) -> &str;
}

/// Feeds every published snapshot to `renderer` until the publisher drops.
///
/// The current snapshot is loaded immediately. Snapshots published while a
/// load is in flight collapse into the latest one. Load failures are logged
/// and do not stop the binding. Resolves to the number of successful loads.
pub fn bind<R: Renderer + 'static>(
    renderer: Arc<R>,
    mut snapshots: watch::Receiver<Snapshot>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut loads = 0;
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            match renderer.load(&snapshot).await {
                Ok(()) => {
                    loads += 1;
                    tracing::debug!(
                        renderer = renderer.name(),
                        generation = snapshot.generation,
                        "loaded snapshot"
                    );
                }
                Err(e) => {
                    tracing::warn!(renderer = renderer.name(), error = %e, "renderer failed to load snapshot");
                }
            }

            if snapshots.changed().await.is_err() {
                tracing::debug!(renderer = renderer.name(), loads, "publisher dropped, unbinding");
                return loads;
            }
        }
    })
}

/// Renderer that keeps every loaded snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    loads: Mutex<Vec<Snapshot>>,
}

impl MemoryRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all snapshots loaded so far, oldest first.
    pub async fn loads(&self) -> Vec<Snapshot> {
        self.loads.lock().await.clone()
    }

    /// Returns the snapshot currently shown.
    pub async fn current(&self) -> Option<Snapshot> {
        self.loads.lock().await.last().cloned()
    }
}

#[async_trait]
impl Renderer for MemoryRenderer {
    async fn load(&self, snapshot: &Snapshot) -> Result<()> {
        self.loads.lock().await.push(snapshot.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Renderer that writes a host page embedding the sandboxed surface.
///
/// The page carries the document in the iframe's `srcdoc` and mirrors
/// relayed console messages into the host page's own console.
#[derive(Debug, Clone)]
pub struct HostPageRenderer {
    path: PathBuf,
    policy: SandboxPolicy,
}

impl HostPageRenderer {
    /// Creates a renderer writing to `path` with the given sandbox policy.
    pub fn new(path: impl Into<PathBuf>, policy: SandboxPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    /// Returns the output path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Builds the host page for a document.
    pub fn page(&self, document: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>Preview</title>\n    <style>html, body, iframe {{ margin: 0; width: 100%; height: 100%; border: none; }}</style>\n  </head>\n  <body>\n    {iframe}\n    <script>\n{listener}\n    </script>\n  </body>\n</html>\n",
            iframe = self.policy.iframe(document),
            listener = HOST_LISTENER,
        )
    }
}

const HOST_LISTENER: &str = r#"window.addEventListener('message', function (event) {
  if (event.data && event.data.type === 'console') {
    var kind = event.data.logType || 'log';
    (console[kind] || console.log).call(console, '[preview]', event.data.message);
  }
});"#;

#[async_trait]
impl Renderer for HostPageRenderer {
    async fn load(&self, snapshot: &Snapshot) -> Result<()> {
        let page = self.page(&snapshot.document);
        tokio::fs::write(&self.path, page)
            .await
            .map_err(|e| Error::Render {
                renderer: self.name().to_string(),
                reason: format!("{}: {}", self.path.display(), e),
            })?;

        tracing::info!(
            path = ?self.path,
            generation = snapshot.generation,
            environment = %snapshot.environment,
            "wrote preview host page"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "host-page"
    }
}
