use std::collections::BTreeMap;

use crate::provider::registry::{ProviderDescriptor, by_identifier, list_active};

/// Outcome of provider selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
   /// Use this provider
   Use(&'static ProviderDescriptor),
   /// No usable provider (unknown, inactive or without a key)
   None,
   /// Several providers have keys; let the user pick one
   Ask(Vec<&'static ProviderDescriptor>),
}

/// Choose the provider for a generation.
///
/// `credentials` maps provider identifiers to stored (non-empty) keys. A
/// requested provider is honored only when it is active and has a key. With
/// no request, a single candidate is used directly and several candidates
/// resolve to the first in registry order when `non_interactive`.
pub fn select_provider(
   requested: Option<&str>,
   credentials: &BTreeMap<String, String>,
   non_interactive: bool,
) -> Selection {
   let has_key = |id: &str| credentials.get(id).is_some_and(|key| !key.is_empty());

   if let Some(requested) = requested {
      return match by_identifier(requested) {
         Some(descriptor) if descriptor.active && has_key(requested) => Selection::Use(descriptor),
         _ => {
            tracing::debug!(provider = requested, "requested provider unavailable");
            Selection::None
         },
      };
   }

   let mut candidates: Vec<_> = list_active()
      .into_iter()
      .filter(|descriptor| has_key(descriptor.id.as_str()))
      .collect();

   match candidates.len() {
      0 => Selection::None,
      1 => Selection::Use(candidates.remove(0)),
      _ if non_interactive => Selection::Use(candidates.remove(0)),
      _ => Selection::Ask(candidates),
   }
}
