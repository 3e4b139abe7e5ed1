//! Remote collaborators for the DocQA client.
//!
//! `DocQaApiClient` speaks to the real upload and question endpoints;
//! `StubCoordinator` answers locally for offline use. `build_coordinators`
//! picks one from the configured backend mode.

pub mod api_client;
pub mod factory;
pub mod stub;

pub use crate::api_client::DocQaApiClient;
pub use crate::factory::{Coordinators, build_coordinators};
pub use crate::stub::StubCoordinator;
