use std::sync::LazyLock;

use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

use crate::{
   error::Result,
   types::{CommitType, RenderedPrompt},
};

/// Embedded prompts folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

const SYSTEM_TEMPLATE: &str = "system.md";
const USER_TEMPLATE: &str = "user.md";

/// Tera instance holding every embedded template.
static TERA: LazyLock<Tera> = LazyLock::new(|| {
   let mut tera = Tera::default();

   for file in Prompts::iter() {
      let Some(embedded_file) = Prompts::get(file.as_ref()) else {
         continue;
      };
      match std::str::from_utf8(embedded_file.data.as_ref()) {
         Ok(content) => {
            if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
               tracing::error!(
                  template = %file,
                  error = %e,
                  "failed to register embedded template"
               );
            }
         },
         Err(e) => {
            tracing::error!(template = %file, error = %e, "embedded template is not valid UTF-8");
         },
      }
   }

   // Prompts are plain text, never HTML
   tera.autoescape_on(vec![]);
   tera
});

#[derive(Serialize)]
struct TypeExample {
   name:    &'static str,
   example: &'static str,
}

fn base_context() -> Context {
   let mut context = Context::new();
   let type_names: Vec<&str> = CommitType::ALL.iter().map(|t| t.as_str()).collect();
   let types: Vec<TypeExample> = CommitType::ALL
      .iter()
      .map(|t| TypeExample { name: t.as_str(), example: t.example() })
      .collect();
   context.insert("type_names", &type_names);
   context.insert("types", &types);
   context
}

/// Render the system and user instructions for a branch and change payload.
///
/// Output depends only on the inputs: the branch and changes are inserted
/// verbatim and nothing else varies between calls.
pub fn build_prompt(branch: &str, changes: &str) -> Result<RenderedPrompt> {
   let mut context = base_context();
   context.insert("branch", branch);
   context.insert("changes", changes);

   let system = TERA.render(SYSTEM_TEMPLATE, &context)?;
   let user = TERA.render(USER_TEMPLATE, &context)?;

   Ok(RenderedPrompt { system: system.trim_end().to_string(), user: user.trim_end().to_string() })
}
