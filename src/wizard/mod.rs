pub mod prompt;
pub mod state;

pub use prompt::{run_wizard, PromptTarget, Prompter};
pub use state::{ProfileDraft, Step, Wizard};
