//! Session binding domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier returned by the upload endpoint.
///
/// Binds subsequent questions to one ingested document. The client never
/// interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tracks whether the conversation is scoped to an uploaded document.
///
/// Only the conversation controller mutates a binding; it resets the
/// transcript in the same step so the transcript never shows turns that
/// belong to another handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionBinding {
    bound_handle: Option<SessionHandle>,
}

impl SessionBinding {
    /// Creates an unbound binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a binding restored from persisted state.
    pub fn restored(handle: Option<SessionHandle>) -> Self {
        Self {
            bound_handle: handle,
        }
    }

    /// Binds to `handle`, replacing any previous one.
    pub fn bind(&mut self, handle: SessionHandle) {
        self.bound_handle = Some(handle);
    }

    /// Clears the handle.
    pub fn unbind(&mut self) {
        self.bound_handle = None;
    }

    pub fn current(&self) -> Option<&SessionHandle> {
        self.bound_handle.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.bound_handle.is_some()
    }
}
