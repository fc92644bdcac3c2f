//! Completion provider clients.

pub mod cerebras;
pub mod mock;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::CompletionError;

/// Low-level completion provider abstraction.
///
/// Implementors execute a single system+user chat exchange and return the raw
/// model text. Prompt construction and response normalization live above this
/// seam, in `generator`.
#[async_trait]
pub trait CompletionClient: Send + Sync + Debug {
    async fn complete(&self, system: String, user: String) -> Result<String, CompletionError>;

    /// Clone this client into a boxed trait object.
    fn clone_box(&self) -> Box<dyn CompletionClient>;
}

impl Clone for Box<dyn CompletionClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl CompletionClient for Box<dyn CompletionClient> {
    async fn complete(&self, system: String, user: String) -> Result<String, CompletionError> {
        self.as_ref().complete(system, user).await
    }

    fn clone_box(&self) -> Box<dyn CompletionClient> {
        self.as_ref().clone_box()
    }
}

pub use cerebras::{CerebrasClient, CerebrasConfig};
pub use mock::{MockClient, MockHandle};
