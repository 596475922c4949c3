use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, endpoint, send_json};
use crate::{error::TransportError, types::ProviderId};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-5-haiku-20241022";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
   model:      &'static str,
   max_tokens: u32,
   system:     &'a str,
   messages:   [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
   role:    &'static str,
   content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
   #[serde(default)]
   content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
   #[serde(rename = "type")]
   kind: String,
   #[serde(default)]
   text: Option<String>,
}

/// Adapter for the Anthropic Messages API.
pub struct AnthropicProvider {
   base_url: String,
   api_key:  String,
   client:   Client,
}

impl AnthropicProvider {
   pub fn new(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self {
         base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
         api_key: api_key.to_string(),
         client,
      }
   }
}

impl Provider for AnthropicProvider {
   fn id(&self) -> ProviderId {
      ProviderId::Anthropic
   }

   fn model(&self) -> &str {
      MODEL
   }

   fn generate(&self, system: &str, user: &str) -> Result<String, TransportError> {
      tracing::info!(model = MODEL, "calling Anthropic API");

      let request = MessagesRequest {
         model: MODEL,
         max_tokens: MAX_TOKENS,
         system,
         messages: [UserMessage { role: "user", content: user }],
      };

      let response: MessagesResponse = send_json(
         self
            .client
            .post(endpoint(&self.base_url, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request),
      )
      .inspect_err(|e| tracing::error!(error = %e, "Anthropic API error"))?;

      let text = response
         .content
         .into_iter()
         .filter(|block| block.kind == "text")
         .filter_map(|block| block.text)
         .collect::<String>();

      if text.trim().is_empty() {
         return Err(TransportError::EmptyResponse("Anthropic"));
      }

      tracing::info!(len = text.len(), "Anthropic API call successful");
      Ok(text)
   }
}

#[cfg(test)]
mod tests {
   use mockito::{Matcher, Server};
   use serde_json::json;

   use super::*;

   #[test]
   fn test_messages_request_and_text_blocks() {
      let mut server = Server::new();
      let mock = server
         .mock("POST", "/messages")
         .match_header("x-api-key", "ak-test")
         .match_header("anthropic-version", API_VERSION)
         .match_body(Matcher::Json(json!({
            "model": MODEL,
            "max_tokens": 1024,
            "system": "sys",
            "messages": [{ "role": "user", "content": "usr" }]
         })))
         .with_status(200)
         .with_body(
            json!({
               "id": "msg_1",
               "type": "message",
               "content": [
                  { "type": "text", "text": "docs(readme): " },
                  { "type": "text", "text": "update install steps" }
               ],
               "stop_reason": "end_turn"
            })
            .to_string(),
         )
         .create();

      let provider = AnthropicProvider::new(Client::new(), "ak-test", Some(&server.url()));
      assert_eq!(provider.generate("sys", "usr").unwrap(), "docs(readme): update install steps");
      mock.assert();
   }

   #[test]
   fn test_auth_failure_carries_body() {
      let mut server = Server::new();
      server
         .mock("POST", "/messages")
         .with_status(401)
         .with_body(r#"{"type":"error","error":{"type":"authentication_error"}}"#)
         .create();

      let provider = AnthropicProvider::new(Client::new(), "bad", Some(&server.url()));
      let err = provider.generate("s", "u").unwrap_err();
      assert!(err.to_string().contains("HTTP 401"));
      assert!(err.to_string().contains("authentication_error"));
   }

   #[test]
   fn test_no_text_block_is_an_error() {
      let mut server = Server::new();
      server
         .mock("POST", "/messages")
         .with_status(200)
         .with_body(json!({ "content": [{ "type": "tool_use", "id": "t1" }] }).to_string())
         .create();

      let provider = AnthropicProvider::new(Client::new(), "k", Some(&server.url()));
      assert!(matches!(provider.generate("s", "u"), Err(TransportError::EmptyResponse(_))));
   }
}
