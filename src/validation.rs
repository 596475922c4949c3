//! Input checks run before any provider is contacted, plus a light check of
//! the generated header.

use thiserror::Error;

use crate::types::CommitType;

/// Default maximum tokens accepted for a change payload
pub const DEFAULT_MAX_TOKENS: usize = 8000;

/// Approximate characters per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Minimum characters (after trimming) in a change payload
pub const MIN_CHANGES_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
   #[error("No changes to commit. Please stage some changes first.")]
   NoChanges,

   #[error("Changes are too short ({chars} characters). Please make more substantial changes.")]
   TooShort { chars: usize },

   #[error(
      "Changes are too large (approximately {tokens} tokens). Maximum allowed: {max} \
       tokens.\nPlease commit in smaller chunks or increase the token limit."
   )]
   TooLarge { tokens: usize, max: usize },
}

/// Estimate the token count of `text` (4 characters ≈ 1 token).
pub fn estimate_tokens(text: &str) -> usize {
   text.chars().count() / CHARS_PER_TOKEN
}

/// Validate a change payload.
///
/// Rules are checked in order and the first failure wins: empty, too short,
/// too large. `max_tokens` of `None` or `Some(0)` means
/// [`DEFAULT_MAX_TOKENS`].
pub fn validate_changes(changes: &str, max_tokens: Option<usize>) -> Result<(), ValidationError> {
   let max_tokens = max_tokens
      .filter(|&max| max > 0)
      .unwrap_or(DEFAULT_MAX_TOKENS);

   let trimmed = changes.trim();
   if trimmed.is_empty() {
      tracing::debug!("validation failed: no changes provided");
      return Err(ValidationError::NoChanges);
   }

   // The length check ignores surrounding blanks; the message reports the
   // payload as given.
   if trimmed.chars().count() < MIN_CHANGES_LENGTH {
      let chars = changes.chars().count();
      tracing::debug!(chars, "validation failed: changes too short");
      return Err(ValidationError::TooShort { chars });
   }

   let tokens = estimate_tokens(changes);
   if tokens > max_tokens {
      tracing::debug!(tokens, max_tokens, "validation failed: changes too large");
      return Err(ValidationError::TooLarge { tokens, max: max_tokens });
   }

   tracing::debug!(chars = changes.chars().count(), tokens, max_tokens, "validation passed");
   Ok(())
}

/// Check that the first line of `message` has the shape
/// `<type>(<scope>): <description>` with a known type.
///
/// Generation never fails on this; callers use it to warn.
pub fn check_commit_header(message: &str) -> Result<(), String> {
   let header = message.lines().next().unwrap_or_default().trim();
   if header.is_empty() {
      return Err("message is empty".to_string());
   }

   let (prefix, description) = header
      .split_once(": ")
      .ok_or_else(|| format!("missing ': ' separator in '{header}'"))?;

   if description.trim().is_empty() {
      return Err("description is empty".to_string());
   }

   let prefix = prefix.strip_suffix('!').unwrap_or(prefix);
   let commit_type = match prefix.split_once('(') {
      Some((commit_type, rest)) => {
         let scope = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("unterminated scope in '{prefix}'"))?;
         if scope.trim().is_empty() || scope.contains(['(', ')']) {
            return Err(format!("invalid scope '{scope}'"));
         }
         commit_type
      },
      None => prefix,
   };

   if CommitType::parse(commit_type).is_none() {
      return Err(format!(
         "unknown commit type '{commit_type}' (expected one of: {})",
         CommitType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
      ));
   }

   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_validate_empty_changes() {
      assert_eq!(validate_changes("", None), Err(ValidationError::NoChanges));
      assert_eq!(validate_changes("   \n\t  ", None), Err(ValidationError::NoChanges));
   }

   #[test]
   fn test_validate_too_short() {
      for input in ["a", "abc", "  123456789  "] {
         let err = validate_changes(input, None).unwrap_err();
         assert!(matches!(err, ValidationError::TooShort { .. }), "{input:?} -> {err:?}");
      }
   }

   #[test]
   fn test_validate_too_short_reports_count() {
      // Surrounding blanks are ignored by the check but counted in the message.
      let err = validate_changes("  short ", None).unwrap_err();
      assert_eq!(err, ValidationError::TooShort { chars: 8 });
      assert!(err.to_string().contains("(8 characters)"));

      let err = validate_changes("héllo", None).unwrap_err();
      assert_eq!(err, ValidationError::TooShort { chars: 5 });
   }

   #[test]
   fn test_validate_exactly_min_length_passes() {
      assert!(validate_changes("0123456789", None).is_ok());
      assert!(validate_changes("  0123456789\n", None).is_ok());
   }

   #[test]
   fn test_validate_too_large() {
      let changes = "x".repeat(8001 * 4);
      let err = validate_changes(&changes, None).unwrap_err();
      assert_eq!(err, ValidationError::TooLarge { tokens: 8001, max: 8000 });
      let message = err.to_string();
      assert!(message.contains("8001"));
      assert!(message.contains("8000"));
   }

   #[test]
   fn test_validate_at_token_limit_passes() {
      let changes = "x".repeat(8000 * 4 + 3);
      assert!(validate_changes(&changes, None).is_ok());
   }

   #[test]
   fn test_validate_custom_max_tokens() {
      let changes = "y".repeat(404);
      assert_eq!(
         validate_changes(&changes, Some(100)),
         Err(ValidationError::TooLarge { tokens: 101, max: 100 })
      );
      assert!(validate_changes(&changes, Some(101)).is_ok());
   }

   #[test]
   fn test_validate_zero_max_tokens_uses_default() {
      let changes = "z".repeat(400);
      assert!(validate_changes(&changes, Some(0)).is_ok());
   }

   #[test]
   fn test_estimate_tokens() {
      assert_eq!(estimate_tokens(""), 0);
      assert_eq!(estimate_tokens("abc"), 0);
      assert_eq!(estimate_tokens("abcd"), 1);
      assert_eq!(estimate_tokens(&"a".repeat(41)), 10);
      assert_eq!(estimate_tokens("日本語の"), 1);
      assert_eq!(estimate_tokens(&"é".repeat(20_000)), 5000);
   }

   #[test]
   fn test_validate_counts_characters_not_bytes() {
      // 40000 bytes but 20000 characters.
      let accented = "é".repeat(20_000);
      assert!(validate_changes(&accented, None).is_ok());

      let emoji = "\u{1F600}".repeat(8000 * 4);
      assert!(validate_changes(&emoji, None).is_ok());

      let over = "é".repeat(8001 * 4);
      assert_eq!(
         validate_changes(&over, None),
         Err(ValidationError::TooLarge { tokens: 8001, max: 8000 })
      );
   }

   #[test]
   fn test_check_commit_header_valid() {
      assert!(check_commit_header("feat(auth): add login functionality with OAuth").is_ok());
      assert!(check_commit_header("revert: remove feature flag").is_ok());
      assert!(check_commit_header("fix(api)!: drop legacy endpoint\n\nbody text").is_ok());
   }

   #[test]
   fn test_check_commit_header_invalid() {
      assert!(check_commit_header("").is_err());
      assert!(check_commit_header("added a thing").is_err());
      assert!(check_commit_header("feature(ui): add button").is_err());
      assert!(check_commit_header("feat(ui: add button").is_err());
      assert!(check_commit_header("feat(): add button").is_err());
      assert!(check_commit_header("feat: ").is_err());
   }
}
