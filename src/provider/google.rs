use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, endpoint, send_json};
use crate::{error::TransportError, types::ProviderId};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Serialize, Deserialize)]
struct Part {
   #[serde(default)]
   text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
   system_instruction: SystemInstruction,
   contents:           [Content; 1],
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
   parts: [Part; 1],
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
   #[serde(default, skip_serializing_if = "Option::is_none")]
   role:  Option<String>,
   #[serde(default)]
   parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
   #[serde(default)]
   candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
   content: Option<Content>,
}

/// Adapter for the Gemini `generateContent` endpoint.
pub struct GoogleProvider {
   base_url: String,
   api_key:  String,
   client:   Client,
}

impl GoogleProvider {
   pub fn new(client: Client, api_key: &str, base_url: Option<&str>) -> Self {
      Self {
         base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
         api_key: api_key.to_string(),
         client,
      }
   }
}

impl Provider for GoogleProvider {
   fn id(&self) -> ProviderId {
      ProviderId::Google
   }

   fn model(&self) -> &str {
      MODEL
   }

   fn generate(&self, system: &str, user: &str) -> Result<String, TransportError> {
      tracing::info!(model = MODEL, "calling Google AI API");

      let request = GenerateContentRequest {
         system_instruction: SystemInstruction { parts: [Part { text: system.to_string() }] },
         contents:           [Content {
            role:  Some("user".to_string()),
            parts: vec![Part { text: user.to_string() }],
         }],
      };

      let response: GenerateContentResponse = send_json(
         self
            .client
            .post(endpoint(&self.base_url, &format!("models/{MODEL}:generateContent")))
            .header("x-goog-api-key", &self.api_key)
            .json(&request),
      )
      .inspect_err(|e| tracing::error!(error = %e, "Google AI API error"))?;

      let text = response
         .candidates
         .into_iter()
         .next()
         .and_then(|candidate| candidate.content)
         .map(|content| {
            content
               .parts
               .into_iter()
               .map(|part| part.text)
               .collect::<String>()
         })
         .filter(|text| !text.trim().is_empty())
         .ok_or(TransportError::EmptyResponse("Google AI"))?;

      tracing::info!(len = text.len(), "Google AI API call successful");
      Ok(text)
   }
}

#[cfg(test)]
mod tests {
   use mockito::{Matcher, Server};
   use serde_json::json;

   use super::*;

   #[test]
   fn test_generate_content_request_and_parts() {
      let mut server = Server::new();
      let mock = server
         .mock("POST", "/models/gemini-2.0-flash-exp:generateContent")
         .match_header("x-goog-api-key", "g-key")
         .match_body(Matcher::Json(json!({
            "systemInstruction": { "parts": [{ "text": "sys" }] },
            "contents": [{ "role": "user", "parts": [{ "text": "usr" }] }]
         })))
         .with_status(200)
         .with_body(
            json!({
               "candidates": [{
                  "content": { "role": "model", "parts": [{ "text": "perf(db): cache lookups" }] },
                  "finishReason": "STOP"
               }]
            })
            .to_string(),
         )
         .create();

      let provider = GoogleProvider::new(Client::new(), "g-key", Some(&server.url()));
      assert_eq!(provider.generate("sys", "usr").unwrap(), "perf(db): cache lookups");
      mock.assert();
   }

   #[test]
   fn test_blocked_prompt_without_candidates() {
      let mut server = Server::new();
      server
         .mock("POST", Matcher::Any)
         .with_status(200)
         .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
         .create();

      let provider = GoogleProvider::new(Client::new(), "g-key", Some(&server.url()));
      assert!(matches!(provider.generate("s", "u"), Err(TransportError::EmptyResponse(_))));
   }

   #[test]
   fn test_server_error_is_reported() {
      let mut server = Server::new();
      server.mock("POST", Matcher::Any).with_status(503).with_body("overloaded").create();

      let provider = GoogleProvider::new(Client::new(), "g-key", Some(&server.url()));
      assert!(matches!(
         provider.generate("s", "u"),
         Err(TransportError::Status { status: 503, .. })
      ));
   }
}
