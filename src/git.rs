use std::{
   collections::BTreeSet,
   path::{Path, PathBuf},
   process::{Command, Output},
};

use crate::error::{GsmartError, Result};

/// One entry of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStatus {
   /// Two-letter status code with surrounding blanks removed (`M`, `??`, `R`)
   pub status:        String,
   pub file_name:     String,
   /// Path relative to the repository root
   pub path:          String,
   /// Source path of a rename or copy
   pub original_path: Option<String>,
}

impl GitStatus {
   /// Renamed or copied entries carry a second path.
   pub fn has_original_path(status: &str) -> bool {
      let status = status.trim_start();
      status.starts_with('R') || status.starts_with('C')
   }

   /// Label for file pickers: `old → new` for renames, else the file name.
   pub fn label(&self) -> String {
      match &self.original_path {
         Some(original) => format!("{original} \u{2192} {}", self.path),
         None => self.file_name.clone(),
      }
   }
}

/// Every path touched by `entries`, rename sources included, deduplicated.
pub fn paths_to_stage(entries: &[GitStatus]) -> Vec<String> {
   entries
      .iter()
      .flat_map(|entry| std::iter::once(&entry.path).chain(entry.original_path.as_ref()))
      .cloned()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
}

fn git(args: &[&str], dir: &str) -> Result<Output> {
   Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .map_err(|e| GsmartError::GitError(format!("Failed to run git {}: {e}", args.join(" "))))
}

/// Run git and return stdout, failing on a non-zero exit.
fn git_stdout(args: &[&str], dir: &str) -> Result<String> {
   let output = git(args, dir)?;
   if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      let command = args.join(" ");
      return Err(GsmartError::GitError(format!("git {command} failed: {}", stderr.trim())));
   }
   Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Current branch name; empty outside a repository or on a detached HEAD.
pub fn current_branch(dir: &str) -> String {
   git_stdout(&["branch", "--show-current"], dir)
      .map(|out| out.trim().to_string())
      .unwrap_or_else(|e| {
         tracing::debug!(error = %e, "no current branch");
         String::new()
      })
}

/// Diff of staged changes; empty when nothing is staged or git fails.
pub fn staged_diff(dir: &str) -> String {
   git_stdout(&["diff", "--cached"], dir)
      .map(|out| out.trim().to_string())
      .unwrap_or_else(|e| {
         tracing::warn!(error = %e, "cannot read staged changes");
         String::new()
      })
}

/// Working tree status of every changed file.
pub fn status(dir: &str) -> Result<Vec<GitStatus>> {
   let output = git_stdout(&["status", "--porcelain", "-z"], dir)?;
   Ok(parse_porcelain(&output))
}

/// Parse NUL-separated `git status --porcelain -z` output.
///
/// Entries look like `XY path`; renames and copies are followed by a second
/// NUL-terminated field holding the source path.
pub fn parse_porcelain(output: &str) -> Vec<GitStatus> {
   let mut entries = output.split('\0').filter(|entry| !entry.is_empty());
   let mut statuses = Vec::new();

   while let Some(entry) = entries.next() {
      if entry.len() < 3 || !entry.is_char_boundary(2) {
         continue;
      }

      let code = &entry[..2];
      let status = match code.trim() {
         "" => code.to_string(),
         trimmed => trimmed.to_string(),
      };
      let path = entry.get(3..).unwrap_or_default().to_string();

      let original_path = if GitStatus::has_original_path(code) {
         entries.next().map(str::to_string)
      } else {
         None
      };

      let file_name = Path::new(&path)
         .file_name()
         .map_or_else(|| path.clone(), |name| name.to_string_lossy().to_string());

      statuses.push(GitStatus { status, file_name, path, original_path });
   }

   statuses
}

/// Stage `paths` (relative to the repository root). Duplicates are dropped.
pub fn stage(paths: &[String], dir: &str) -> Result<()> {
   if paths.is_empty() {
      return Ok(());
   }

   let root = PathBuf::from(git_stdout(&["rev-parse", "--show-toplevel"], dir)?.trim());
   let unique: BTreeSet<String> = paths
      .iter()
      .map(|path| root.join(path).to_string_lossy().to_string())
      .collect();

   let mut args = vec!["add", "--"];
   args.extend(unique.iter().map(String::as_str));
   let root = root.to_string_lossy();
   git_stdout(&args, &root)?;

   tracing::debug!(count = unique.len(), "staged files");
   Ok(())
}

/// Commit staged changes with `message`.
pub fn commit(message: &str, dir: &str) -> Result<()> {
   let output = git(&["commit", "-m", message], dir)?;

   if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);
      return Err(GsmartError::GitError(format!(
         "Git commit failed:\nstderr: {}\nstdout: {}",
         stderr.trim(),
         stdout.trim()
      )));
   }

   tracing::info!("committed staged changes");
   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_parse_porcelain_basic() {
      let statuses = parse_porcelain(" M src/main.rs\0?? notes.txt\0A  docs/guide.md\0");
      assert_eq!(statuses.len(), 3);

      assert_eq!(statuses[0].status, "M");
      assert_eq!(statuses[0].path, "src/main.rs");
      assert_eq!(statuses[0].file_name, "main.rs");
      assert_eq!(statuses[0].original_path, None);

      assert_eq!(statuses[1].status, "??");
      assert_eq!(statuses[1].path, "notes.txt");

      assert_eq!(statuses[2].status, "A");
      assert_eq!(statuses[2].file_name, "guide.md");
   }

   #[test]
   fn test_parse_porcelain_rename_consumes_source() {
      let statuses = parse_porcelain("R  src/new.rs\0src/old.rs\0 D gone.txt\0");
      assert_eq!(statuses.len(), 2);

      assert_eq!(statuses[0].status, "R");
      assert_eq!(statuses[0].path, "src/new.rs");
      assert_eq!(statuses[0].original_path.as_deref(), Some("src/old.rs"));

      assert_eq!(statuses[1].status, "D");
      assert_eq!(statuses[1].path, "gone.txt");
   }

   #[test]
   fn test_parse_porcelain_copy_and_mixed_code() {
      let statuses = parse_porcelain("C  b.rs\0a.rs\0MM both.rs\0");
      assert_eq!(statuses[0].original_path.as_deref(), Some("a.rs"));
      assert_eq!(statuses[1].status, "MM");
      assert_eq!(statuses[1].original_path, None);
   }

   #[test]
   fn test_parse_porcelain_paths_with_spaces() {
      let statuses = parse_porcelain("?? dir with space/file name.txt\0");
      assert_eq!(statuses[0].path, "dir with space/file name.txt");
      assert_eq!(statuses[0].file_name, "file name.txt");
   }

   #[test]
   fn test_parse_porcelain_empty_and_garbage() {
      assert!(parse_porcelain("").is_empty());
      assert!(parse_porcelain("\0\0").is_empty());
      assert!(parse_porcelain("M\0").is_empty());
   }

   #[test]
   fn test_has_original_path() {
      assert!(GitStatus::has_original_path("R "));
      assert!(GitStatus::has_original_path("C"));
      assert!(!GitStatus::has_original_path(" M"));
      assert!(!GitStatus::has_original_path("??"));
   }

   #[test]
   fn test_label_and_paths_to_stage() {
      let statuses = parse_porcelain("R  src/new.rs\0src/old.rs\0 M src/lib.rs\0?? src/lib.rs\0");
      assert_eq!(statuses[0].label(), "src/old.rs \u{2192} src/new.rs");
      assert_eq!(statuses[1].label(), "lib.rs");

      assert_eq!(paths_to_stage(&statuses), ["src/lib.rs", "src/new.rs", "src/old.rs"]);
      assert!(paths_to_stage(&[]).is_empty());
   }

   #[test]
   fn test_outside_repository_degrades() {
      let dir = tempfile::tempdir().unwrap();
      let dir = dir.path().to_string_lossy().to_string();
      assert_eq!(current_branch(&dir), "");
      assert_eq!(staged_diff(&dir), "");
   }
}
