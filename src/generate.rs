//! Commit message generation: validation, credential lookup, prompt
//! construction and provider calls with retry.

use crate::{
   config::Settings,
   credentials::CredentialStore,
   error::{GsmartError, Result},
   provider::{AdapterFactory, HttpAdapterFactory},
   retry::retry_with_backoff,
   templates::build_prompt,
   types::{GenerationRequest, GenerationResult, ProviderId},
   validation::validate_changes,
};

/// Drives a [`GenerationRequest`] to a [`GenerationResult`].
pub struct CommitGenerator {
   store:    CredentialStore,
   settings: Settings,
   factory:  Box<dyn AdapterFactory>,
}

impl CommitGenerator {
   /// Generator backed by the real HTTP adapters.
   pub fn new(store: CredentialStore, settings: Settings) -> Self {
      let factory = Box::new(HttpAdapterFactory::new(settings.clone()));
      Self::with_factory(store, settings, factory)
   }

   /// Generator using a caller-supplied adapter factory.
   pub fn with_factory(
      store: CredentialStore,
      settings: Settings,
      factory: Box<dyn AdapterFactory>,
   ) -> Self {
      Self { store, settings, factory }
   }

   /// Generate a commit message. Every failure is reported as
   /// [`GenerationResult::Failure`].
   pub fn generate_commit_message(&self, request: &GenerationRequest) -> GenerationResult {
      let max_tokens = request.max_tokens.unwrap_or(self.settings.max_tokens);
      if let Err(e) = validate_changes(&request.changes, Some(max_tokens)) {
         tracing::debug!(error = %e, "changes rejected");
         return GenerationResult::failure(GsmartError::from(e).to_string());
      }

      let id = match request.provider.parse::<ProviderId>() {
         Ok(id) => id,
         Err(e) => return GenerationResult::failure(e.to_string()),
      };

      let api_key = self.store.get(id.as_str());
      if api_key.is_empty() {
         let missing = GsmartError::MissingCredential(id.to_string());
         return GenerationResult::failure(missing.to_string());
      }

      match self.call_provider(id, &api_key, request) {
         Ok(text) => GenerationResult::success(text.trim()),
         Err(e) => {
            tracing::error!(provider = %id, error = %e, "generation failed");
            GenerationResult::failure(format!("{id} - {e}"))
         },
      }
   }

   fn call_provider(
      &self,
      id: ProviderId,
      api_key: &str,
      request: &GenerationRequest,
   ) -> Result<String> {
      let adapter = self.factory.create(id, api_key)?;

      let mut prompt = build_prompt(&request.branch, &request.changes)?;
      if let Some(instruction) = &request.custom_instruction {
         prompt = prompt.with_additional_instructions(instruction);
      }

      tracing::debug!(
         provider = %id,
         model = adapter.model(),
         prompt_len = prompt.user.len(),
         "sending generation request"
      );

      let text = retry_with_backoff(&self.settings.retry_policy(), |attempt| {
         tracing::debug!(provider = %id, attempt, "calling provider");
         adapter.generate(&prompt.system, &prompt.user)
      })?;
      Ok(text)
   }
}
