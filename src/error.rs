use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum GsmartError {
   #[error("{0}")]
   Validation(#[from] ValidationError),

   #[error(transparent)]
   Transport(#[from] TransportError),

   #[error("Invalid provider: {0}")]
   UnknownProvider(String),

   #[error("No API key found for {0}")]
   MissingCredential(String),

   #[error("Configuration error: {0}")]
   Config(String),

   #[error("Failed to render prompt template: {0}")]
   Template(#[from] tera::Error),

   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("Failed to serialize credentials: {0}")]
   TomlError(#[from] toml::ser::Error),

   #[error("Clipboard error: {0}")]
   ClipboardError(#[from] arboard::Error),

   #[error("Prompt error: {0}")]
   PromptError(#[from] dialoguer::Error),

   #[error("{0}")]
   Other(String),
}

/// Failure of a single remote call made by a provider adapter.
///
/// Every variant is retryable from the orchestrator's point of view; adapters
/// never decide retry policy themselves.
#[derive(Debug, Error)]
pub enum TransportError {
   #[error("HTTP error: {0}")]
   Http(#[from] reqwest::Error),

   #[error("API request failed (HTTP {status}): {body}")]
   Status { status: u16, body: String },

   #[error("Failed to decode response: {0}")]
   Decode(String),

   #[error("{0} returned no text")]
   EmptyResponse(&'static str),
}

pub type Result<T> = std::result::Result<T, GsmartError>;
