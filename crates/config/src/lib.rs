//! Settings for the loan intake agent
//!
//! All knobs live in one YAML file with serde defaults, so the workspace
//! runs with no file present. Token sets and the region gazetteer default
//! to the production values; endpoints default to a local
//! OpenAI-compatible server.

mod settings;

pub use settings::{
    ConfigError, DialogueSettings, EmailSettings, LlmSettings, Settings,
};
