//! Repository-hosting API module
//!
//! This module contains:
//! - The repository-bound client and its identity
//! - Typed request bodies for each resource operation
//! - Typed views of the list responses

mod client;
mod models;
mod payloads;

pub use client::{RepositoryClient, ResourceIdentity};
pub use models::{Repository, Tag, TagCommit};
pub use payloads::{NewIssue, NewRepository, NewTag, RepositoryUpdate, TagObjectType, Tagger};

use crate::config::ApiConfig;
use crate::transport::Transport;
use std::sync::Arc;

/// Builds a client bound to the owner/repository named in `[api]`
pub fn client_from_config(transport: Arc<dyn Transport>, config: &ApiConfig) -> RepositoryClient {
    RepositoryClient::new(
        transport,
        config.base_url.clone(),
        ResourceIdentity::new(config.owner.clone(), config.repository.clone()),
    )
}
