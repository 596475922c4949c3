//! Static catalog of supported providers.

use crate::types::ProviderId;

/// Display metadata for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
   pub id:          ProviderId,
   pub title:       &'static str,
   pub description: &'static str,
   pub active:      bool,
}

/// Every supported provider, in presentation order.
pub const PROVIDERS: &[ProviderDescriptor] = &[
   ProviderDescriptor {
      id:          ProviderId::OpenAi,
      title:       "OpenAI",
      description: "GPT models served by the OpenAI API.",
      active:      true,
   },
   ProviderDescriptor {
      id:          ProviderId::Anthropic,
      title:       "Anthropic",
      description: "Claude models served by the Anthropic Messages API.",
      active:      true,
   },
   ProviderDescriptor {
      id:          ProviderId::Google,
      title:       "Google AI",
      description: "Gemini models served by the Google Generative Language API.",
      active:      true,
   },
   ProviderDescriptor {
      id:          ProviderId::Mistral,
      title:       "Mistral",
      description: "Mistral models served by La Plateforme.",
      active:      true,
   },
   ProviderDescriptor {
      id:          ProviderId::Fireworks,
      title:       "Fireworks AI",
      description: "Open-weight models hosted on Fireworks AI inference.",
      active:      true,
   },
   ProviderDescriptor {
      id:          ProviderId::PlataformIa,
      title:       "PlataformIA",
      description: "Cuban AI platform with OpenAI-compatible APIs for developers.",
      active:      true,
   },
];

/// Active providers in registry order.
pub fn list_active() -> Vec<&'static ProviderDescriptor> {
   PROVIDERS.iter().filter(|p| p.active).collect()
}

/// Look up a descriptor by its identifier string.
pub fn by_identifier(id: &str) -> Option<&'static ProviderDescriptor> {
   PROVIDERS.iter().find(|p| p.id.as_str() == id)
}
