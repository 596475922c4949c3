use std::{fmt, str::FromStr};

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::error::GsmartError;

// === Commit types ===

/// Conventional commit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
   Feat,
   Fix,
   Docs,
   Style,
   Refactor,
   Perf,
   Test,
   Build,
   Ci,
   Chore,
   Revert,
}

impl CommitType {
   /// All types, in the order they are presented to models.
   pub const ALL: [Self; 11] = [
      Self::Feat,
      Self::Fix,
      Self::Docs,
      Self::Style,
      Self::Refactor,
      Self::Perf,
      Self::Test,
      Self::Build,
      Self::Ci,
      Self::Chore,
      Self::Revert,
   ];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Feat => "feat",
         Self::Fix => "fix",
         Self::Docs => "docs",
         Self::Style => "style",
         Self::Refactor => "refactor",
         Self::Perf => "perf",
         Self::Test => "test",
         Self::Build => "build",
         Self::Ci => "ci",
         Self::Chore => "chore",
         Self::Revert => "revert",
      }
   }

   /// Worked example message for this type.
   pub const fn example(self) -> &'static str {
      match self {
         Self::Feat => "feat(auth): add login functionality with OAuth",
         Self::Fix => "fix(api): resolve undefined response in user endpoint",
         Self::Docs => "docs(readme): update installation instructions",
         Self::Style => "style(components): format code according to style guide",
         Self::Refactor => "refactor(utils): simplify error handling logic",
         Self::Perf => "perf(queries): optimize database lookups",
         Self::Test => "test(auth): add unit tests for authentication flow",
         Self::Build => "build(deps): update dependency versions",
         Self::Ci => "ci(github): add workflow for automated testing",
         Self::Chore => "chore(release): prepare v1.2.0 release",
         Self::Revert => "revert: remove feature flag for beta functionality",
      }
   }

   /// Case-sensitive lookup; conventional types are lowercase.
   pub fn parse(s: &str) -> Option<Self> {
      Self::ALL.into_iter().find(|t| t.as_str() == s)
   }
}

impl fmt::Display for CommitType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

// === Providers ===

/// Identifier of a supported remote text-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
   OpenAi,
   Anthropic,
   Google,
   Mistral,
   Fireworks,
   PlataformIa,
}

impl ProviderId {
   pub const ALL: [Self; 6] = [
      Self::OpenAi,
      Self::Anthropic,
      Self::Google,
      Self::Mistral,
      Self::Fireworks,
      Self::PlataformIa,
   ];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::OpenAi => "openai",
         Self::Anthropic => "anthropic",
         Self::Google => "google",
         Self::Mistral => "mistral",
         Self::Fireworks => "fireworks",
         Self::PlataformIa => "plataformia",
      }
   }
}

impl fmt::Display for ProviderId {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl FromStr for ProviderId {
   type Err = GsmartError;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      Self::ALL
         .into_iter()
         .find(|id| id.as_str() == s)
         .ok_or_else(|| GsmartError::UnknownProvider(s.to_string()))
   }
}

// === Generation ===

/// One commit-message generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
   pub branch:             String,
   pub changes:            String,
   /// Extra instructions appended to the user prompt
   pub custom_instruction: Option<String>,
   /// Provider identifier as given by the caller (may be unknown)
   pub provider:           String,
   /// Overrides the configured token limit for input validation
   pub max_tokens:         Option<usize>,
}

impl GenerationRequest {
   pub fn new(
      provider: impl Into<String>,
      branch: impl Into<String>,
      changes: impl Into<String>,
   ) -> Self {
      Self {
         branch: branch.into(),
         changes: changes.into(),
         provider: provider.into(),
         ..Default::default()
      }
   }

   pub fn with_custom_instruction(mut self, instruction: impl Into<String>) -> Self {
      self.custom_instruction = Some(instruction.into());
      self
   }

   pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
      self.max_tokens = Some(max_tokens);
      self
   }
}

/// Outcome of a generation. Failures are data, never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
   Success { text: String },
   Failure { message: String },
}

impl GenerationResult {
   pub fn success(text: impl Into<String>) -> Self {
      Self::Success { text: text.into() }
   }

   pub fn failure(message: impl Into<String>) -> Self {
      Self::Failure { message: message.into() }
   }

   pub const fn is_success(&self) -> bool {
      matches!(self, Self::Success { .. })
   }
}

/// System and user instructions sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
   pub system: String,
   pub user:   String,
}

impl RenderedPrompt {
   /// Append caller instructions under an "Additional instructions" heading.
   /// Blank instructions leave the prompt unchanged.
   pub fn with_additional_instructions(mut self, instructions: &str) -> Self {
      if !instructions.trim().is_empty() {
         self.user = format!("{}\n\nAdditional instructions:\n{instructions}", self.user);
      }
      self
   }
}

// === CLI ===

#[derive(Parser, Debug, Default)]
#[command(
   name = "gsmart",
   version,
   about = "Git Smart - AI-powered commit message generator",
   long_about = None
)]
pub struct Args {
   /// Enable debug logging
   #[arg(long, global = true)]
   pub debug: bool,

   /// Options for the default `generate` command
   #[command(flatten)]
   pub generate: GenerateArgs,

   #[command(subcommand)]
   pub command: Option<Command>,
}

impl Args {
   /// Subcommand to run; bare `gsmart` means `generate`.
   pub fn into_command(self) -> Command {
      self.command.unwrap_or(Command::Generate(self.generate))
   }
}

#[derive(Subcommand, Debug)]
pub enum Command {
   /// Generate a commit message based on staged changes (default)
   Generate(GenerateArgs),

   /// Store an API key for a provider
   Login {
      /// Provider to log in to (prompted when omitted)
      #[arg(long, short = 'P')]
      provider: Option<String>,
   },

   /// Remove the stored API key for a provider
   Logout {
      /// Provider identifier
      provider: String,
   },

   /// Reset all API keys and remove configuration
   Reset {
      /// Force reset without confirmation
      #[arg(long, short = 'f')]
      force: bool,
   },

   /// List supported providers and whether a key is stored
   Providers,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
   /// Additional prompt instructions for generating the commit message
   #[arg(long, short = 'p', default_value = "")]
   pub prompt: String,

   /// AI provider to use (openai, anthropic, google, mistral, fireworks,
   /// plataformia)
   #[arg(long, short = 'P')]
   pub provider: Option<String>,

   /// Automatically stage and commit without prompting
   #[arg(long, short = 'y')]
   pub yes: bool,

   /// Maximum tokens for input validation (default: 8000)
   #[arg(long, short = 't')]
   pub max_tokens: Option<usize>,

   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: String,
}

impl Default for GenerateArgs {
   fn default() -> Self {
      Self {
         prompt:     String::new(),
         provider:   None,
         yes:        false,
         max_tokens: None,
         dir:        ".".to_string(),
      }
   }
}
