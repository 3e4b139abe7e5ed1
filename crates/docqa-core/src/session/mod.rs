//! Session domain module.
//!
//! A session is the server-side scope created by a document upload. This
//! module holds the opaque handle identifying it and the binding that records
//! which session, if any, the conversation is currently scoped to.

mod binding;

pub use binding::{SessionBinding, SessionHandle};
