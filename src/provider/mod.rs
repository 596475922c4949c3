//! Provider adapters: one configured client per remote text-generation
//! service behind the [`Provider`] trait.

mod anthropic;
mod chat_completions;
mod google;
pub mod registry;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

pub use self::{
   anthropic::AnthropicProvider,
   chat_completions::ChatCompletionsProvider,
   google::GoogleProvider,
   registry::{PROVIDERS, ProviderDescriptor, by_identifier, list_active},
};
use crate::{
   config::Settings,
   error::{Result, TransportError},
   types::ProviderId,
};

/// Uniform contract over remote text-generation services.
///
/// `generate` performs exactly one remote call and reports every failure as a
/// [`TransportError`]; retrying is the caller's business.
pub trait Provider: Send + Sync {
   fn id(&self) -> ProviderId;

   /// Fixed model identifier sent with every request
   fn model(&self) -> &str;

   fn generate(&self, system: &str, user: &str) -> std::result::Result<String, TransportError>;
}

/// Builds the adapter for a provider once a credential is known.
pub trait AdapterFactory: Send + Sync {
   fn create(&self, id: ProviderId, api_key: &str) -> Result<Box<dyn Provider>>;
}

/// Factory for the real HTTP adapters.
#[derive(Debug, Clone, Default)]
pub struct HttpAdapterFactory {
   settings: Settings,
}

impl HttpAdapterFactory {
   pub const fn new(settings: Settings) -> Self {
      Self { settings }
   }
}

impl AdapterFactory for HttpAdapterFactory {
   fn create(&self, id: ProviderId, api_key: &str) -> Result<Box<dyn Provider>> {
      create_adapter(id, api_key, &self.settings)
   }
}

/// Construct the adapter registered for `id`.
///
/// The match is exhaustive over [`ProviderId`], so a provider cannot be added
/// to the registry without an adapter.
pub fn create_adapter(
   id: ProviderId,
   api_key: &str,
   settings: &Settings,
) -> Result<Box<dyn Provider>> {
   let client = build_client(settings)?;
   let base_url = settings.base_url(id);

   let adapter: Box<dyn Provider> = match id {
      ProviderId::OpenAi => Box::new(ChatCompletionsProvider::openai(client, api_key, base_url)),
      ProviderId::Anthropic => Box::new(AnthropicProvider::new(client, api_key, base_url)),
      ProviderId::Google => Box::new(GoogleProvider::new(client, api_key, base_url)),
      ProviderId::Mistral => Box::new(ChatCompletionsProvider::mistral(client, api_key, base_url)),
      ProviderId::Fireworks => {
         Box::new(ChatCompletionsProvider::fireworks(client, api_key, base_url))
      },
      ProviderId::PlataformIa => {
         Box::new(ChatCompletionsProvider::plataformia(client, api_key, base_url))
      },
   };

   tracing::debug!(provider = %id, model = adapter.model(), "initialized provider adapter");
   Ok(adapter)
}

/// Build HTTP client with timeouts from settings
fn build_client(settings: &Settings) -> std::result::Result<Client, TransportError> {
   Client::builder()
      .timeout(settings.request_timeout())
      .connect_timeout(settings.connect_timeout())
      .build()
      .map_err(TransportError::Http)
}

/// Join a base URL and an endpoint path without doubling slashes.
fn endpoint(base_url: &str, path: &str) -> String {
   format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Send a prepared request and decode a successful JSON body.
///
/// Non-2xx statuses become [`TransportError::Status`] carrying the body text.
fn send_json<T: DeserializeOwned>(
   request: RequestBuilder,
) -> std::result::Result<T, TransportError> {
   let response = request.send()?;
   let status = response.status();

   if !status.is_success() {
      let body = response
         .text()
         .unwrap_or_else(|_| "Unknown error".to_string());
      return Err(TransportError::Status { status: status.as_u16(), body });
   }

   let body = response.text()?;
   serde_json::from_str(&body).map_err(|e| {
      TransportError::Decode(format!(
         "{e}. Response was: {}",
         body.chars().take(200).collect::<String>()
      ))
   })
}
