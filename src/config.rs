use std::{
   collections::HashMap,
   path::{Path, PathBuf},
   time::Duration,
};

use serde::Deserialize;

use crate::{
   error::{GsmartError, Result},
   retry::RetryPolicy,
   types::ProviderId,
   validation::DEFAULT_MAX_TOKENS,
};

/// Directory name under the platform config home
pub const APP_DIR_NAME: &str = "gsmart";

/// Tunables file inside the config directory (never written by gsmart)
pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
   /// HTTP request timeout in seconds
   pub request_timeout_secs: u64,

   /// HTTP connection timeout in seconds
   pub connect_timeout_secs: u64,

   /// Total attempts per provider call (first call included)
   pub max_retries:        u32,
   pub initial_backoff_ms: u64,
   pub max_backoff_ms:     u64,

   /// Token limit for input validation (approx 4 chars/token)
   pub max_tokens: usize,

   /// Per-provider API base URL overrides, keyed by provider identifier
   pub base_urls: HashMap<String, String>,
}

impl Default for Settings {
   fn default() -> Self {
      Self {
         request_timeout_secs: 120,
         connect_timeout_secs: 30,
         max_retries:          3,
         initial_backoff_ms:   4000,
         max_backoff_ms:       10000,
         max_tokens:           DEFAULT_MAX_TOKENS,
         base_urls:            HashMap::new(),
      }
   }
}

impl Settings {
   /// Load settings for a config directory.
   ///
   /// `GSMART_SETTINGS` points at an explicit file; otherwise
   /// `<dir>/settings.toml` is read when present. Environment overrides are
   /// applied last:
   /// - `GSMART_MAX_TOKENS` overrides `max_tokens`
   /// - `GSMART_<PROVIDER>_BASE_URL` overrides a provider's base URL
   pub fn load(config_dir: &Path) -> Result<Self> {
      let path = std::env::var_os("GSMART_SETTINGS")
         .map_or_else(|| config_dir.join(SETTINGS_FILE), PathBuf::from);

      let mut settings = if path.exists() {
         Self::from_file(&path)?
      } else {
         tracing::debug!(path = %path.display(), "no settings file, using defaults");
         Self::default()
      };

      settings.apply_env_overrides(|key| std::env::var(key).ok());
      Ok(settings)
   }

   /// Load settings from a specific file (no environment overrides).
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path).map_err(|e| {
         GsmartError::Config(format!("Failed to read {}: {e}", path.display()))
      })?;
      toml::from_str(&contents)
         .map_err(|e| GsmartError::Config(format!("Failed to parse {}: {e}", path.display())))
   }

   /// Apply environment overrides through `lookup` (injectable for tests).
   pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
      if let Some(raw) = lookup("GSMART_MAX_TOKENS") {
         match raw.trim().parse::<usize>() {
            Ok(max) if max > 0 => self.max_tokens = max,
            _ => tracing::warn!(value = %raw, "ignoring invalid GSMART_MAX_TOKENS"),
         }
      }

      for id in ProviderId::ALL {
         let key = format!("GSMART_{}_BASE_URL", id.as_str().to_uppercase());
         if let Some(url) = lookup(&key).filter(|url| !url.trim().is_empty()) {
            self.base_urls.insert(id.as_str().to_string(), url);
         }
      }
   }

   /// Base URL override for a provider, if any.
   pub fn base_url(&self, id: ProviderId) -> Option<&str> {
      self.base_urls.get(id.as_str()).map(String::as_str)
   }

   pub const fn request_timeout(&self) -> Duration {
      Duration::from_secs(self.request_timeout_secs)
   }

   pub const fn connect_timeout(&self) -> Duration {
      Duration::from_secs(self.connect_timeout_secs)
   }

   pub const fn retry_policy(&self) -> RetryPolicy {
      RetryPolicy {
         max_attempts:    self.max_retries,
         initial_backoff: Duration::from_millis(self.initial_backoff_ms),
         max_backoff:     Duration::from_millis(self.max_backoff_ms),
      }
   }
}

/// Resolve the config directory from the process environment.
///
/// Priority: `GSMART_CONFIG_DIR`, `$XDG_CONFIG_HOME/gsmart`,
/// `$HOME/.config/gsmart`, then `%USERPROFILE%\.config\gsmart`.
pub fn default_config_dir() -> Result<PathBuf> {
   let var = |key: &str| std::env::var_os(key).map(PathBuf::from);
   resolve_config_dir(
      var("GSMART_CONFIG_DIR"),
      var("XDG_CONFIG_HOME"),
      var("HOME").or_else(|| var("USERPROFILE")),
   )
   .ok_or_else(|| {
      GsmartError::Config(
         "No config directory found (set GSMART_CONFIG_DIR, XDG_CONFIG_HOME or HOME)".to_string(),
      )
   })
}

/// Pure resolution of the config directory from candidate locations.
/// Empty values count as unset.
pub fn resolve_config_dir(
   explicit: Option<PathBuf>,
   xdg_config_home: Option<PathBuf>,
   home: Option<PathBuf>,
) -> Option<PathBuf> {
   let non_empty = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());

   if let Some(dir) = non_empty(explicit) {
      return Some(dir);
   }
   if let Some(xdg) = non_empty(xdg_config_home) {
      return Some(xdg.join(APP_DIR_NAME));
   }
   non_empty(home).map(|home| home.join(".config").join(APP_DIR_NAME))
}
