//! Per-provider API keys persisted in `<config dir>/config.toml`.
//!
//! Layout is one table per provider identifier with a single `key` field:
//!
//! ```toml
//! [openai]
//! key = "sk-..."
//! ```
//!
//! Tables gsmart does not know about are kept on partial updates.

use std::{
   collections::BTreeMap,
   io::Write,
   path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use toml::{Table, Value};

use crate::{
   config::default_config_dir,
   error::{GsmartError, Result},
   types::ProviderId,
};

/// Credentials file inside the config directory
pub const CREDENTIALS_FILE: &str = "config.toml";

const KEY_FIELD: &str = "key";

/// File-backed credential store with its directory fixed at construction.
#[derive(Debug, Clone)]
pub struct CredentialStore {
   dir:  PathBuf,
   path: PathBuf,
}

impl CredentialStore {
   /// Store rooted at `dir`. Nothing is created until the first write.
   pub fn open(dir: impl Into<PathBuf>) -> Self {
      let dir = dir.into();
      let path = dir.join(CREDENTIALS_FILE);
      Self { dir, path }
   }

   /// Store rooted at the resolved default config directory.
   pub fn open_default() -> Result<Self> {
      Ok(Self::open(default_config_dir()?))
   }

   pub fn dir(&self) -> &Path {
      &self.dir
   }

   pub fn path(&self) -> &Path {
      &self.path
   }

   /// Persist `secret` for `provider`, replacing any previous value.
   /// A blank secret clears the provider instead.
   pub fn set(&self, provider: &str, secret: &str) -> Result<()> {
      if secret.trim().is_empty() {
         return self.clear(provider);
      }

      let mut table = self.load();
      let mut section = Table::new();
      section.insert(KEY_FIELD.to_string(), Value::String(secret.to_string()));
      table.insert(provider.to_string(), Value::Table(section));
      self.save(&table)?;

      tracing::debug!(provider, path = %self.path.display(), "stored API key");
      Ok(())
   }

   /// Secret for `provider`, or an empty string when none is stored.
   pub fn get(&self, provider: &str) -> String {
      lookup(&self.load(), provider).unwrap_or_default()
   }

   /// Remove the secret for `provider`. Clearing an absent key is a no-op.
   pub fn clear(&self, provider: &str) -> Result<()> {
      let mut table = self.load();
      if table.remove(provider).is_none() {
         return Ok(());
      }
      self.save(&table)?;
      tracing::debug!(provider, "cleared API key");
      Ok(())
   }

   /// Remove every stored secret and delete the backing file.
   pub fn clear_all(&self) -> Result<()> {
      match std::fs::remove_file(&self.path) {
         Ok(()) => {
            tracing::debug!(path = %self.path.display(), "removed credentials file");
            Ok(())
         },
         Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
         Err(e) => Err(e.into()),
      }
   }

   /// Every registered provider with a non-empty secret.
   pub fn all(&self) -> BTreeMap<String, String> {
      let table = self.load();
      ProviderId::ALL
         .iter()
         .filter_map(|id| lookup(&table, id.as_str()).map(|key| (id.as_str().to_string(), key)))
         .collect()
   }

   /// Read the backing file. Missing, unreadable or corrupt files read as
   /// empty.
   fn load(&self) -> Table {
      let contents = match std::fs::read_to_string(&self.path) {
         Ok(contents) => contents,
         Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Table::new(),
         Err(e) => {
            tracing::warn!(
               path = %self.path.display(),
               error = %e,
               "cannot read credentials, ignoring"
            );
            return Table::new();
         },
      };

      toml::from_str(&contents).unwrap_or_else(|e| {
         tracing::warn!(
            path = %self.path.display(),
            error = %e,
            "corrupt credentials file, ignoring"
         );
         Table::new()
      })
   }

   /// Atomically replace the backing file with `table`.
   fn save(&self, table: &Table) -> Result<()> {
      std::fs::create_dir_all(&self.dir).map_err(|e| {
         GsmartError::Config(format!("Failed to create directory {}: {e}", self.dir.display()))
      })?;

      let contents = toml::to_string(table)?;
      let mut file = NamedTempFile::new_in(&self.dir)?;
      file.write_all(contents.as_bytes())?;
      file.as_file().sync_all()?;
      file.persist(&self.path).map_err(|e| {
         GsmartError::Config(format!("Failed to write {}: {}", self.path.display(), e.error))
      })?;
      Ok(())
   }
}

fn lookup(table: &Table, provider: &str) -> Option<String> {
   table
      .get(provider)?
      .get(KEY_FIELD)?
      .as_str()
      .filter(|key| !key.is_empty())
      .map(str::to_string)
}
