use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, endpoint, send_json};
use crate::{error::TransportError, types::ProviderId};

#[derive(Debug, Serialize)]
struct Message<'a> {
   role:    &'static str,
   content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
   model:       &'a str,
   messages:    [Message<'a>; 2],
   #[serde(skip_serializing_if = "Option::is_none")]
   temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
   #[serde(default)]
   choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

/// Adapter for services exposing an OpenAI-style `/chat/completions`
/// endpoint (OpenAI, Mistral, Fireworks AI, PlataformIA).
pub struct ChatCompletionsProvider {
   id:          ProviderId,
   label:       &'static str,
   model:       &'static str,
   temperature: Option<f32>,
   base_url:    String,
   api_key:     String,
   client:      Client,
}

impl ChatCompletionsProvider {
   fn new(
      id: ProviderId,
      label: &'static str,
      model: &'static str,
      temperature: Option<f32>,
      base_url: &str,
      client: Client,
      api_key: &str,
   ) -> Self {
      Self {
         id,
         label,
         model,
         temperature,
         base_url: base_url.to_string(),
         api_key: api_key.to_string(),
         client,
      }
   }

   pub fn openai(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self::new(
         ProviderId::OpenAi,
         "OpenAI",
         "gpt-4o-mini",
         Some(0.7),
         base_url.unwrap_or("https://api.openai.com/v1"),
         client,
         api_key,
      )
   }

   pub fn mistral(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self::new(
         ProviderId::Mistral,
         "Mistral",
         "mistral-large-latest",
         None,
         base_url.unwrap_or("https://api.mistral.ai/v1"),
         client,
         api_key,
      )
   }

   pub fn fireworks(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self::new(
         ProviderId::Fireworks,
         "Fireworks AI",
         "accounts/fireworks/models/llama-v3p1-70b-instruct",
         None,
         base_url.unwrap_or("https://api.fireworks.ai/inference/v1"),
         client,
         api_key,
      )
   }

   pub fn plataformia(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self::new(
         ProviderId::PlataformIa,
         "PlataformIA",
         "radiance",
         None,
         base_url.unwrap_or("https://apigateway.avangenio.net"),
         client,
         api_key,
      )
   }
}

impl Provider for ChatCompletionsProvider {
   fn id(&self) -> ProviderId {
      self.id
   }

   fn model(&self) -> &str {
      self.model
   }

   fn generate(&self, system: &str, user: &str) -> Result<String, TransportError> {
      tracing::info!(provider = self.label, model = self.model, "calling chat completions API");

      let request = ChatRequest {
         model:       self.model,
         messages:    [
            Message { role: "system", content: system },
            Message { role: "user", content: user },
         ],
         temperature: self.temperature,
      };

      let response: ChatResponse = send_json(
         self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request),
      )
      .inspect_err(|e| tracing::error!(provider = self.label, error = %e, "API error"))?;

      let text = response
         .choices
         .into_iter()
         .next()
         .and_then(|choice| choice.message.content)
         .filter(|content| !content.trim().is_empty())
         .ok_or(TransportError::EmptyResponse(self.label))?;

      tracing::info!(provider = self.label, len = text.len(), "API call successful");
      Ok(text)
   }
}

#[cfg(test)]
mod tests {
   use mockito::{Matcher, Server};
   use serde_json::json;

   use super::*;

   fn completion(content: &str) -> String {
      json!({
         "id": "chatcmpl-1",
         "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
      })
      .to_string()
   }

   #[test]
   fn test_openai_request_shape_and_text() {
      let mut server = Server::new();
      let mock = server
         .mock("POST", "/chat/completions")
         .match_header("authorization", "Bearer sk-test")
         .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "messages": [
               { "role": "system", "content": "sys" },
               { "role": "user", "content": "usr" }
            ]
         })))
         .with_status(200)
         .with_header("content-type", "application/json")
         .with_body(completion("feat(api): add endpoint\n"))
         .create();

      let provider = ChatCompletionsProvider::openai(Client::new(), "sk-test", Some(&server.url()));
      let text = provider.generate("sys", "usr").unwrap();

      assert_eq!(text, "feat(api): add endpoint\n");
      mock.assert();
   }

   #[test]
   fn test_mistral_omits_temperature() {
      let mut server = Server::new();
      let mock = server
         .mock("POST", "/chat/completions")
         .match_body(Matcher::Json(json!({
            "model": "mistral-large-latest",
            "messages": [
               { "role": "system", "content": "s" },
               { "role": "user", "content": "u" }
            ]
         })))
         .with_status(200)
         .with_body(completion("fix: correct typo"))
         .create();

      let provider = ChatCompletionsProvider::mistral(Client::new(), "m-key", Some(&server.url()));
      assert_eq!(provider.generate("s", "u").unwrap(), "fix: correct typo");
      mock.assert();
   }

   #[test]
   fn test_error_status_is_reported() {
      let mut server = Server::new();
      server
         .mock("POST", "/chat/completions")
         .with_status(429)
         .with_body("rate limited")
         .create();

      let provider = ChatCompletionsProvider::fireworks(Client::new(), "k", Some(&server.url()));
      match provider.generate("s", "u") {
         Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
         },
         other => panic!("expected status error, got {other:?}"),
      }
   }

   #[test]
   fn test_empty_choices_is_an_error() {
      let mut server = Server::new();
      server
         .mock("POST", "/chat/completions")
         .with_status(200)
         .with_body(json!({ "choices": [] }).to_string())
         .create();

      let provider = ChatCompletionsProvider::plataformia(Client::new(), "k", Some(&server.url()));
      assert!(matches!(
         provider.generate("s", "u"),
         Err(TransportError::EmptyResponse("PlataformIA"))
      ));
   }

   #[test]
   fn test_malformed_body_is_a_decode_error() {
      let mut server = Server::new();
      server
         .mock("POST", "/chat/completions")
         .with_status(200)
         .with_body("<html>gateway</html>")
         .create();

      let provider = ChatCompletionsProvider::openai(Client::new(), "k", Some(&server.url()));
      assert!(matches!(provider.generate("s", "u"), Err(TransportError::Decode(_))));
   }
}
