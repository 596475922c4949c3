//! Conventional commit message generation backed by remote LLM providers.
//!
//! The library validates a staged diff, renders the prompt, looks up the
//! stored API key and calls the selected provider with retry. The `gsmart`
//! binary adds git plumbing and the interactive flow on top.
pub mod config;
pub mod credentials;
pub mod error;
pub mod generate;
pub mod git;
pub mod provider;
pub mod retry;
pub mod select;
pub mod style;
pub mod templates;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::Settings;
pub use credentials::CredentialStore;
pub use error::{GsmartError, Result, TransportError};
pub use generate::CommitGenerator;
pub use select::{Selection, select_provider};
pub use templates::build_prompt;
pub use types::{GenerationRequest, GenerationResult, ProviderId};
pub use validation::{estimate_tokens, validate_changes};
