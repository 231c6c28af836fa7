/*!
 * Prompt Perfect - Assemble LLM prompts from source files
 *
 * This library renders an ASCII tree of a project that honours gitignore
 * rules, and concatenates selected files into a fenced, token-counted prompt
 * for use as context for Large Language Models.
 */

pub mod assembler;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod matcher;
pub mod report;
pub mod settings;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use assembler::{
    AutoConfirm, Confirm, Document, DocumentContent, DocumentSource, FileDocuments, Prompt,
    PromptAssembler, StdinConfirm,
};
pub use config::Config;
pub use error::{PromptError, Result};
pub use matcher::IgnoreMatcher;
pub use report::{PromptReport, ReportFormat, Reporter};
pub use settings::{Settings, SettingsCommand, SettingsStore};
pub use tree::{generate_tree, DepthLimit, TreeBuilder, TreeRenderer};
pub use types::{NodeKind, TreeNode};
pub use utils::{count_tokens, format_file_size};
pub use writer::{Destination, OutputWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
