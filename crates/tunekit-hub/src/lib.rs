//! Tunekit Hub
//!
//! Publishing support for trained artifacts:
//! - Model card generation from typed fields (`ModelCard`)
//! - A registry transport trait (`HubClient`) with a REST implementation
//! - The publish flow (card + repo creation + recursive upload)

pub mod card;
pub mod client;
pub mod error;
pub mod publish;

pub use card::ModelCard;
pub use client::{resolve_token, HttpHubClient, HubClient};
pub use error::{HubError, HubResult};
pub use publish::{publish, PublishReport, PublishSpec};
