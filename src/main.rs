use std::process::ExitCode;

use arboard::Clipboard;
use clap::Parser;
use dialoguer::{Confirm, MultiSelect, Password, Select, theme::ColorfulTheme};
use gsmart::{
   config::Settings,
   credentials::CredentialStore,
   error::{GsmartError, Result},
   generate::CommitGenerator,
   git,
   provider::registry::{PROVIDERS, ProviderDescriptor, by_identifier, list_active},
   select::{Selection, select_provider},
   style::{self, icons},
   types::{Args, Command, GenerateArgs, GenerationRequest, GenerationResult, ProviderId},
   validation::check_commit_header,
};
use tracing_subscriber::EnvFilter;

/// What to do with a generated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
   Commit,
   Copy,
   Regenerate,
   Nothing,
}

impl Action {
   const ALL: [Self; 4] = [Self::Commit, Self::Copy, Self::Regenerate, Self::Nothing];

   const fn label(self) -> &'static str {
      match self {
         Self::Commit => "Commit",
         Self::Copy => "Copy message to clipboard",
         Self::Regenerate => "Regenerate message",
         Self::Nothing => "Do nothing",
      }
   }
}

/// Logs go to stderr: `--debug` forces debug, otherwise `RUST_LOG` or `warn`.
fn init_tracing(debug: bool) {
   let filter = if debug {
      EnvFilter::new("debug")
   } else {
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
   };

   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_target(false)
      .init();
}

fn theme() -> ColorfulTheme {
   ColorfulTheme::default()
}

fn copy_to_clipboard(text: &str) -> Result<()> {
   let mut clipboard = Clipboard::new()?;
   clipboard.set_text(text)?;
   Ok(())
}

fn print_copied() {
   let done = format!("{} Message copied to clipboard", icons::CLIPBOARD);
   println!("{}", style::success(&done));
}

fn pick_provider(
   prompt: &str,
   candidates: &[&'static ProviderDescriptor],
) -> Result<Option<&'static ProviderDescriptor>> {
   let titles: Vec<&str> = candidates.iter().map(|p| p.title).collect();
   let choice = Select::with_theme(&theme())
      .with_prompt(prompt)
      .items(&titles)
      .default(0)
      .interact_opt()?;
   Ok(choice.map(|idx| candidates[idx]))
}

/// Staged diff, staging files first when nothing is staged yet. `None` means
/// there is nothing to describe and the user has been told why.
fn collect_changes(args: &GenerateArgs) -> Result<Option<String>> {
   let changes = git::staged_diff(&args.dir);
   if !changes.is_empty() {
      return Ok(Some(changes));
   }

   let statuses = git::status(&args.dir)?;
   if statuses.is_empty() {
      println!("{}", style::error("No changes found. Please make some changes to your code."));
      return Ok(None);
   }

   let selected = if args.yes {
      statuses
   } else {
      let labels: Vec<String> = statuses
         .iter()
         .map(|entry| format!("{} {}", style::dim(&format!("{:>2}", entry.status)), entry.label()))
         .collect();
      let picked = MultiSelect::with_theme(&theme())
         .with_prompt("Select files to stage")
         .items(&labels)
         .interact_opt()?
         .unwrap_or_default();
      if picked.is_empty() {
         println!("{}", style::error("No files selected."));
         return Ok(None);
      }
      picked.into_iter().map(|idx| statuses[idx].clone()).collect()
   };

   git::stage(&git::paths_to_stage(&selected), &args.dir)?;
   println!("{}", style::dim("Files staged successfully"));

   let changes = git::staged_diff(&args.dir);
   Ok((!changes.is_empty()).then_some(changes))
}

fn commit_or_copy(message: &str, dir: &str) -> Result<()> {
   match git::commit(message, dir) {
      Ok(()) => {
         let done = format!("{} Changes committed successfully", icons::SUCCESS);
         println!("{}", style::success(&done));
         Ok(())
      },
      Err(e) => {
         tracing::warn!(error = %e, "commit failed, copying message instead");
         println!("{}", style::error("Failed to commit changes."));
         copy_to_clipboard(message)?;
         print_copied();
         Ok(())
      },
   }
}

fn run_generate(args: &GenerateArgs, store: &CredentialStore, settings: Settings) -> Result<()> {
   tracing::info!(
      provider = ?args.provider,
      max_tokens = ?args.max_tokens,
      yes = args.yes,
      "starting generation"
   );

   let Some(changes) = collect_changes(args)? else {
      return Ok(());
   };
   let branch = git::current_branch(&args.dir);
   tracing::debug!(branch = %branch, "current branch");

   let descriptor = match select_provider(args.provider.as_deref(), &store.all(), args.yes) {
      Selection::Use(descriptor) => descriptor,
      Selection::Ask(candidates) => match pick_provider("Select an AI provider", &candidates)? {
         Some(descriptor) => descriptor,
         None => {
            println!("{}", style::error("No provider selected."));
            return Ok(());
         },
      },
      Selection::None if args.provider.is_none() => {
         return Err(GsmartError::Other(
            "No API keys found. Please run `gsmart login` to add your API key.".to_string(),
         ));
      },
      Selection::None => {
         return Err(GsmartError::Other(
            "No valid provider found. Please check your API keys.".to_string(),
         ));
      },
   };

   if args.provider.is_some() {
      println!("{}", style::success(&format!("Using provider: {}", descriptor.title)));
   }

   let generator = CommitGenerator::new(store.clone(), settings);
   let mut request = GenerationRequest::new(descriptor.id.as_str(), branch, changes)
      .with_custom_instruction(args.prompt.clone());
   if let Some(max_tokens) = args.max_tokens {
      request = request.with_max_tokens(max_tokens);
   }

   let spinner_message = format!(
      "{} Generating commit message with {}...",
      icons::ROBOT,
      style::provider(descriptor.title)
   );

   loop {
      let result = style::with_spinner(
         &spinner_message,
         || generator.generate_commit_message(&request),
         GenerationResult::is_success,
      );

      let message = match result {
         GenerationResult::Success { text } => text,
         GenerationResult::Failure { message } => return Err(GsmartError::Other(message)),
      };

      let width = style::term_width();
      let mut lines = message.lines();
      println!("\n{}", style::separator(width));
      println!("{}", style::commit_header(lines.next().unwrap_or_default()));
      for line in lines {
         println!("{line}");
      }
      println!("{}\n", style::separator(width));

      if let Err(problem) = check_commit_header(&message) {
         style::warn(&format!("Message does not follow the conventional format: {problem}"));
      }

      let action = if args.yes {
         Action::Commit
      } else {
         let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
         let choice = Select::with_theme(&theme())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_opt()?;
         match choice {
            Some(idx) => Action::ALL[idx],
            None => {
               println!("{}", style::error("No action selected. Doing nothing."));
               return Ok(());
            },
         }
      };
      tracing::debug!(?action, "selected action");

      match action {
         Action::Commit => return commit_or_copy(&message, &args.dir),
         Action::Copy => {
            copy_to_clipboard(&message)?;
            print_copied();
            return Ok(());
         },
         Action::Regenerate => {
            tracing::info!("regenerating message");
         },
         Action::Nothing => {
            println!("{}", style::warning("No action taken"));
            return Ok(());
         },
      }
   }
}

fn run_login(provider: Option<&str>, store: &CredentialStore) -> Result<()> {
   let descriptor = match provider {
      Some(id) => match by_identifier(id).filter(|d| d.active) {
         Some(descriptor) => descriptor,
         None => return Err(GsmartError::UnknownProvider(id.to_string())),
      },
      None => match pick_provider("Select a provider", &list_active())? {
         Some(descriptor) => descriptor,
         None => {
            println!("{}", style::error("No provider selected"));
            return Ok(());
         },
      },
   };

   let api_key = Password::with_theme(&theme())
      .with_prompt(format!("Enter your {} API key", descriptor.title))
      .interact()?;

   store.set(descriptor.id.as_str(), api_key.trim())?;
   println!("{}", style::success(&format!("{} API key saved successfully", icons::SUCCESS)));
   println!("{}", style::dim(&format!("Stored in {}", store.path().display())));
   Ok(())
}

fn run_logout(provider: &str, store: &CredentialStore) -> Result<()> {
   let id: ProviderId = provider.parse()?;
   if store.get(id.as_str()).is_empty() {
      println!("{}", style::warning(&format!("No API key stored for {id}")));
      return Ok(());
   }
   store.clear(id.as_str())?;
   println!("{}", style::success(&format!("{} Removed API key for {id}", icons::SUCCESS)));
   Ok(())
}

fn run_reset(force: bool, store: &CredentialStore) -> Result<()> {
   if !force {
      let confirmed = Confirm::with_theme(&theme())
         .with_prompt("Are you sure you want to reset the configuration?")
         .default(false)
         .interact()?;
      if !confirmed {
         println!("{}", style::error("Operation cancelled"));
         return Ok(());
      }
   }

   store.clear_all()?;
   println!("{}", style::success(&format!("{} Configuration reset successfully", icons::SUCCESS)));
   Ok(())
}

fn run_providers(store: &CredentialStore) {
   let keys = store.all();
   println!("{}", style::bold("Providers"));
   println!("{}", style::separator(style::term_width().min(60)));
   for descriptor in PROVIDERS {
      let status = if keys.contains_key(descriptor.id.as_str()) {
         style::success(icons::SUCCESS)
      } else {
         style::dim(icons::BULLET)
      };
      let inactive = if descriptor.active { "" } else { " (inactive)" };
      println!(
         "{status} {:<12} {}{inactive}  {}",
         descriptor.id.as_str(),
         style::provider(descriptor.title),
         style::dim(descriptor.description)
      );
   }
}

fn run(args: Args) -> Result<()> {
   let store = CredentialStore::open_default()?;

   match args.into_command() {
      Command::Generate(generate) => {
         let settings = Settings::load(store.dir())?;
         run_generate(&generate, &store, settings)
      },
      Command::Login { provider } => run_login(provider.as_deref(), &store),
      Command::Logout { provider } => run_logout(&provider, &store),
      Command::Reset { force } => run_reset(force, &store),
      Command::Providers => {
         run_providers(&store);
         Ok(())
      },
   }
}

fn main() -> ExitCode {
   dotenvy::dotenv().ok();
   let args = Args::parse();
   init_tracing(args.debug);

   match run(args) {
      Ok(()) => ExitCode::SUCCESS,
      Err(e) => {
         tracing::debug!(error = ?e, "command failed");
         eprintln!("{} {}", style::error(icons::ERROR), style::error(&e.to_string()));
         ExitCode::FAILURE
      },
   }
}
