//! Preview session controller.
//!
//! A [`Session`] owns the file store, the active environment and file, the
//! console log and the relay. Every change to file contents or environment
//! regenerates the document and publishes it as a new [`Snapshot`]; bound
//! renderers pick it up through their watch subscription.

use tokio::sync::watch;

use crate::config::{PreviewConfig, Validate};
use crate::document::DocumentTemplate;
use crate::environment::{Environment, File};
use crate::error::Result;
use crate::relay::{ConsoleLog, ConsoleLogEntry, MessageRelay, RelaySender};
use crate::sandbox::Snapshot;
use crate::store::{FileContents, FileStore};

/// Lifecycle state of a session.
///
/// Refreshes and environment switches are transitions that always land
/// back in `Editing`; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing has happened since the session started.
    #[default]
    Idle,
    /// At least one edit, refresh or switch has happened.
    Editing,
}

/// Explicit session state for one preview editor.
pub struct Session {
    id: String,
    template: DocumentTemplate,
    store: FileStore,
    environment: Environment,
    edits: FileContents,
    active: String,
    state: SessionState,
    console: ConsoleLog,
    console_visible: bool,
    relay: MessageRelay,
    publisher: watch::Sender<Snapshot>,
}

impl Session {
    /// Creates a session over the default file sets.
    ///
    /// The configuration is used as given; callers that load it from
    /// untrusted sources should go through [`Session::try_new`].
    pub fn new(config: &PreviewConfig) -> Self {
        Self::with_store(config, FileStore::new())
    }

    /// Validates `config` and creates a session over `store`.
    ///
    /// Fails with [`crate::Error::Config`] on validation errors; warnings are
    /// logged.
    pub fn try_new(config: &PreviewConfig, store: FileStore) -> Result<Self> {
        for warning in config.validate().into_result()? {
            tracing::warn!(%warning, "configuration warning");
        }
        Ok(Self::with_store(config, store))
    }

    /// Creates a session over an existing store, starting in the vanilla
    /// environment. The configuration is not validated.
    pub fn with_store(config: &PreviewConfig, store: FileStore) -> Self {
        let environment = Environment::default();
        let edits = store.contents(environment);
        let active = first_file_name(&store, environment);
        let template = config.document.clone();

        let document = template.render(environment, &edits);
        let (publisher, _) = watch::channel(Snapshot {
            generation: 0,
            environment,
            document: document.into(),
        });

        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session = %id, environment = %environment, "started preview session");

        Self {
            id,
            template,
            store,
            environment,
            edits,
            active,
            state: SessionState::Idle,
            console: ConsoleLog::new(),
            console_visible: config.console.visible,
            relay: MessageRelay::new(config.console.timestamp_format.clone()),
            publisher,
        }
    }

    /// Returns the unique session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the selected environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the selected environment's files with their current contents.
    pub fn files(&self) -> Vec<File> {
        self.store
            .files(self.environment)
            .iter()
            .map(|f| self.with_edits(f))
            .collect()
    }

    /// Returns the current content of a file in the selected environment.
    pub fn content(&self, name: &str) -> Option<&str> {
        self.edits.get(name).map(String::as_str)
    }

    /// Returns the file bound to the editing surface.
    pub fn active_file(&self) -> Option<File> {
        self.store
            .file(self.environment, &self.active)
            .map(|f| self.with_edits(f))
    }

    /// Binds another file of the selected environment to the editing surface.
    ///
    /// Returns `false` and keeps the current file if `name` is not in the set.
    pub fn select_file(&mut self, name: &str) -> bool {
        if self.store.file(self.environment, name).is_none() {
            return false;
        }
        self.active = name.to_string();
        true
    }

    /// Replaces the active file's content.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        let active = self.active.clone();
        self.set_content(&active, text)
    }

    /// Replaces a file's content in the selected environment and republishes.
    ///
    /// Unknown names are a silent no-op returning `false`.
    pub fn set_content(&mut self, name: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        // Store first so a later switch saves the same content
        if !self.store.set_content(self.environment, name, text.clone()) {
            return false;
        }

        self.edits.insert(name.to_string(), text);
        self.state = SessionState::Editing;
        self.publish();
        true
    }

    /// Switches to another environment.
    ///
    /// Current edits are saved into the outgoing environment first. The
    /// incoming environment's first file becomes active and the console is
    /// cleared.
    pub fn switch_environment(&mut self, environment: Environment) {
        // Save edits before the buffer is replaced
        let outgoing = self.environment;
        self.store.commit(outgoing, &self.edits);

        // Load the incoming set with its first file active
        self.environment = environment;
        self.edits = self.store.contents(environment);
        self.active = first_file_name(&self.store, environment);

        // Output of the previous document does not carry over
        self.reset_console();
        self.state = SessionState::Editing;

        tracing::info!(
            session = %self.id,
            from = %outgoing,
            to = %environment,
            "switched environment"
        );
        self.publish();
    }

    /// Re-assigns the current document to the renderer and clears the console.
    pub fn refresh(&mut self) {
        self.reset_console();
        self.state = SessionState::Editing;
        tracing::debug!(session = %self.id, "refreshing preview");
        self.publish();
    }

    /// Empties the console log without touching any file.
    pub fn clear_console(&mut self) {
        self.reset_console();
    }

    /// Returns whether the console pane is shown.
    pub fn console_visible(&self) -> bool {
        self.console_visible
    }

    /// Shows or hides the console pane. Relaying continues while hidden.
    pub fn toggle_console(&mut self) -> bool {
        self.console_visible = !self.console_visible;
        self.console_visible
    }

    /// Returns the console log.
    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    /// Returns a handle for posting renderer messages into this session.
    pub fn relay_sender(&self) -> RelaySender {
        self.relay.sender()
    }

    /// Appends every pending relayed console message to the log.
    pub fn pump(&mut self) -> usize {
        self.relay.drain_into(&mut self.console)
    }

    /// Waits for the next relayed console message and appends it.
    pub async fn next_console_entry(&mut self) -> Option<ConsoleLogEntry> {
        self.relay.recv_into(&mut self.console).await
    }

    /// Subscribes a renderer to published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.publisher.borrow().clone()
    }

    /// Returns a copy of the underlying store with current edits saved.
    pub fn store(&self) -> FileStore {
        let mut store = self.store.clone();
        store.commit(self.environment, &self.edits);
        store
    }

    fn with_edits(&self, file: &File) -> File {
        let mut file = file.clone();
        if let Some(text) = self.edits.get(&file.name) {
            file.content = text.clone();
        }
        file
    }

    fn reset_console(&mut self) {
        // Anything already queued belongs to the log being cleared.
        self.relay.drain_into(&mut self.console);
        self.console.clear();
    }

    fn publish(&mut self) {
        let document = self.template.render(self.environment, &self.edits);
        let generation = self.publisher.borrow().generation + 1;

        tracing::debug!(
            session = %self.id,
            environment = %self.environment,
            generation,
            bytes = document.len(),
            "publishing snapshot"
        );

        self.publisher.send_replace(Snapshot {
            generation,
            environment: self.environment,
            document: document.into(),
        });
    }
}

fn first_file_name(store: &FileStore, environment: Environment) -> String {
    store
        .files(environment)
        .first()
        .map(|f| f.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::generate;
    use crate::relay::LogKind;

    fn session() -> Session {
        Session::new(&PreviewConfig::default())
    }

    #[test]
    fn session_starts_idle_in_vanilla() {
        let session = session();

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.environment(), Environment::Vanilla);
        assert_eq!(session.active_file().unwrap().name, "index.html");
        assert_eq!(session.snapshot().generation, 0);
        assert!(session.console().is_empty());
        assert!(session.console_visible());
    }

    #[test]
    fn edit_targets_active_file_and_republishes() {
        let mut session = session();
        assert!(session.select_file("index.js"));

        assert!(session.edit("console.log(\"hi\")"));

        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.content("index.js"), Some("console.log(\"hi\")"));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, 1);
        assert!(snapshot.document.contains("<script>console.log(\"hi\")</script>"));
    }

    #[test]
    fn unknown_file_edit_is_noop() {
        let mut session = session();
        let before = session.snapshot();

        assert!(!session.set_content("src/App.js", "x"));
        assert!(!session.select_file("missing.js"));

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.active_file().unwrap().name, "index.html");
    }

    #[test]
    fn snapshot_matches_pure_generation() {
        let mut session = session();
        session.set_content("style.css", "p { margin: 0 }");

        let mut contents = FileStore::new().contents(Environment::Vanilla);
        contents.insert("style.css".to_string(), "p { margin: 0 }".to_string());

        assert_eq!(&*session.snapshot().document, generate(Environment::Vanilla, &contents));
    }

    #[test]
    fn switch_selects_first_file_and_clears_console() {
        let mut session = session();
        session.relay_sender().console(LogKind::Log, "before").unwrap();
        session.pump();
        assert_eq!(session.console().len(), 1);

        session.switch_environment(Environment::React);

        assert_eq!(session.environment(), Environment::React);
        assert_eq!(session.active_file().unwrap().name, "public/index.html");
        assert!(session.console().is_empty());
        assert_eq!(session.snapshot().environment, Environment::React);
    }

    #[test]
    fn switch_discards_queued_messages() {
        let mut session = session();
        session.relay_sender().console(LogKind::Warn, "stale").unwrap();

        session.switch_environment(Environment::React);

        assert_eq!(session.pump(), 0);
        assert!(session.console().is_empty());
    }

    #[test]
    fn refresh_republishes_same_document() {
        let mut session = session();
        let before = session.snapshot();

        session.refresh();

        let after = session.snapshot();
        assert_eq!(after.generation, before.generation + 1);
        assert_eq!(after.document, before.document);
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[test]
    fn try_new_rejects_injectable_config() {
        let mut config = PreviewConfig::default();
        config.document.react_scripts = vec!["https://cdn.example/a.js\" onerror=\"x".to_string()];

        let result = Session::try_new(&config, FileStore::new());
        assert!(matches!(result, Err(crate::Error::Config(msg)) if msg.contains("react script")));
    }

    #[test]
    fn try_new_accepts_default_config() {
        let session = Session::try_new(&PreviewConfig::default(), FileStore::new()).unwrap();

        assert_eq!(session.environment(), Environment::Vanilla);
    }

    #[test]
    fn toggle_console_flips_visibility() {
        let mut session = session();

        assert!(!session.toggle_console());
        assert!(session.toggle_console());
    }

    #[test]
    fn store_includes_unsaved_edits() {
        let mut session = session();
        session.set_content("index.js", "let x = 1;");

        let store = session.store();
        assert_eq!(store.file(Environment::Vanilla, "index.js").unwrap().content, "let x = 1;");
    }
}
