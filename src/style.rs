//! Terminal output helpers for the CLI.
//!
//! Colors are disabled when `NO_COLOR` is set or stdout cannot show them.

use std::{
   io::{self, Write},
   sync::{OnceLock, mpsc},
   thread,
   time::Duration,
};

use owo_colors::{OwoColorize, Style};

static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      if std::env::var_os("NO_COLOR").is_some() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

fn paint(s: &str, style: Style) -> String {
   if colors_enabled() {
      s.style(style).to_string()
   } else {
      s.to_string()
   }
}

pub fn success(s: &str) -> String {
   paint(s, Style::new().green().bold())
}

pub fn warning(s: &str) -> String {
   paint(s, Style::new().yellow())
}

pub fn error(s: &str) -> String {
   paint(s, Style::new().red().bold())
}

pub fn info(s: &str) -> String {
   paint(s, Style::new().cyan())
}

pub fn dim(s: &str) -> String {
   paint(s, Style::new().dimmed())
}

pub fn bold(s: &str) -> String {
   paint(s, Style::new().bold())
}

/// Provider names (magenta).
pub fn provider(s: &str) -> String {
   paint(s, Style::new().magenta())
}

/// Color the `type(scope)` prefix of a conventional header. Anything that
/// does not look like one is returned unstyled.
pub fn commit_header(header: &str) -> String {
   let Some((prefix, description)) = header.split_once(": ") else {
      return header.to_string();
   };

   let breaking = prefix.ends_with('!');
   let prefix = prefix.trim_end_matches('!');
   let bang = if breaking { error("!") } else { String::new() };

   match prefix.split_once('(') {
      Some((kind, scope)) if scope.ends_with(')') => {
         let scope = &scope[..scope.len() - 1];
         format!(
            "{}({}){bang}: {description}",
            paint(kind, Style::new().blue().bold()),
            info(scope)
         )
      },
      None => format!("{}{bang}: {description}", paint(prefix, Style::new().blue().bold())),
      Some(_) => header.to_string(),
   }
}

/// Print a warning on stderr after clearing any spinner line.
pub fn warn(msg: &str) {
   print!("\r\x1b[K");
   io::stdout().flush().ok();
   eprintln!("{} {}", warning(icons::WARNING), warning(msg));
}

/// Terminal width, capped at 100 columns.
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(100)
}

pub fn separator(width: usize) -> String {
   dim(&HORIZONTAL.to_string().repeat(width))
}

const HORIZONTAL: char = '\u{2500}';

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const BULLET: &str = "\u{2022}";
   pub const CLIPBOARD: &str = "\u{1F4CB}";
   pub const ROBOT: &str = "\u{1F916}";
}

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run `f` behind a spinner. `succeeded` picks the final icon. Without color
/// support the message is printed once and no spinner thread is started.
pub fn with_spinner<F, T>(message: &str, f: F, succeeded: impl FnOnce(&T) -> bool) -> T
where
   F: FnOnce() -> T,
{
   if !colors_enabled() {
      println!("{message}");
      return f();
   }

   let (tx, rx) = mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      for frame in SPINNER_FRAMES.iter().cycle() {
         match rx.try_recv() {
            Ok(ok) => {
               let icon = if ok {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               print!("\r\x1b[K{icon} {msg}\n");
               io::stdout().flush().ok();
               break;
            },
            Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {},
         }
         print!("\r{} {msg}", frame.cyan());
         io::stdout().flush().ok();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(succeeded(&result)).ok();
   spinner.join().ok();
   result
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_separator_width() {
      let line = separator(12);
      assert_eq!(line.matches(HORIZONTAL).count(), 12);
   }

   #[test]
   fn test_commit_header_keeps_text() {
      // Whatever the color state, the visible text is unchanged.
      let strip = |s: String| {
         let mut out = String::new();
         let mut chars = s.chars();
         while let Some(c) = chars.next() {
            if c == '\x1b' {
               for c in chars.by_ref() {
                  if c == 'm' {
                     break;
                  }
               }
            } else {
               out.push(c);
            }
         }
         out
      };
      assert_eq!(strip(commit_header("feat(api): add endpoint")), "feat(api): add endpoint");
      assert_eq!(strip(commit_header("fix!: drop v1")), "fix!: drop v1");
      assert_eq!(commit_header("no header here"), "no header here");
   }

   #[test]
   fn test_with_spinner_returns_value() {
      let value = with_spinner("working", || 42, |v| *v == 42);
      assert_eq!(value, 42);
   }
}
