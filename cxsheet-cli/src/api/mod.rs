//! Dialogflow CX agent access
//!
//! Models for the v3beta1 REST representation, the [`AgentService`] seam the
//! batch pipeline talks to, OAuth token sources and the HTTP client.

pub mod auth;
pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod models;
pub mod service;

pub use auth::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};
pub use client::DialogflowClient;
pub use models::{
    AgentPath, AutoExpansionMode, EntityKind, EntityType, EntityValue, ExcludedPhrase, Intent,
    IntentParameter, Part, ResourceKind, TrainingPhrase, location_of,
};
pub use service::{AgentService, Resource};
