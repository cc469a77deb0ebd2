//! Isolated rendering surface.
//!
//! This module provides the [`SandboxPolicy`] describing the surface's
//! restrictions and the [`Renderer`] trait fed by published [`Snapshot`]s,
//! with a file-backed [`HostPageRenderer`] and an in-memory [`MemoryRenderer`].

mod policy;
mod renderer;

pub use policy::{escape_attribute, SandboxPolicy, KNOWN_SANDBOX_TOKENS};
pub use renderer::{bind, HostPageRenderer, MemoryRenderer, Renderer, Snapshot};
