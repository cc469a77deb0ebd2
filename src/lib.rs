//! Sandbox Preview - composes isolated previews from edited file sets.
//!
//! This library keeps per-environment HTML/CSS/JS files, turns them into a
//! self-contained document for a sandboxed rendering surface, and relays
//! the surface's console output back into an ordered log.

pub mod config;
pub mod document;
pub mod environment;
pub mod error;
pub mod relay;
pub mod sandbox;
pub mod session;
pub mod starter;
pub mod store;

pub use config::{ConsoleConfig, PreviewConfig, Validate, ValidationResult};
pub use document::{generate, DocumentTemplate};
pub use environment::{Environment, File, Language};
pub use error::{Error, Result};
pub use relay::{
    ConsoleLog, ConsoleLogEntry, ConsoleMessage, LogKind, MessageRelay, RelaySender,
};
pub use sandbox::{bind, HostPageRenderer, MemoryRenderer, Renderer, SandboxPolicy, Snapshot};
pub use session::{Session, SessionState};
pub use starter::Starter;
pub use store::{FileContents, FileStore};
