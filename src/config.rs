/*!
 * Configuration handling for prompt-perfect
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;

use crate::error::{PromptError, Result};
use crate::matcher::{IgnoreMatcher, IGNORE_FILE};
use crate::settings::{Settings, SettingsCommand};
use crate::tree::DepthLimit;
use crate::writer::Destination;
use crate::{bail, ensure};

/// Command-line arguments for prompt-perfect
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "prompt-perfect",
    version = env!("CARGO_PKG_VERSION"),
    about = "Assemble an LLM prompt from source files",
    long_about = "Concatenates the given files into fenced blocks, optionally prefixed by an ASCII tree of the project, and writes the prompt to stdout, a file, or the clipboard."
)]
pub struct Args {
    /// Files to include in the prompt
    pub files: Vec<String>,

    /// Project root used for the tree, ignore rules and relative paths
    #[clap(long, default_value = ".")]
    pub root: String,

    /// Prefix the prompt with an ASCII tree of the project
    #[clap(long)]
    pub tree: bool,

    /// Show only the given files in the tree instead of the whole project
    #[clap(long, requires = "tree")]
    pub tree_documents_only: bool,

    /// Tree depth limit (-1 for unlimited, 0 for the root only)
    #[clap(long, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Comma-separated list of extra gitignore-style patterns
    #[clap(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Extra gitignore-style files to load after the root .gitignore
    #[clap(long)]
    pub ignore_file: Vec<String>,

    /// Refuse prompts longer than the token limit
    #[clap(long)]
    pub limit_prompt_length: bool,

    /// Token limit used with --limit-prompt-length
    #[clap(long)]
    pub max_tokens: Option<usize>,

    /// Copy the prompt to the system clipboard
    #[clap(long, conflicts_with = "no_clip")]
    pub clip: bool,

    /// Do not copy the prompt even if the settings ask for it
    #[clap(long)]
    pub no_clip: bool,

    /// Instructions appended after the files
    #[clap(long)]
    pub instructions: Option<String>,

    /// Write the prompt to this file instead of stdout
    #[clap(long, short)]
    pub output: Option<String>,

    /// Include large files without asking
    #[clap(long, short)]
    pub yes: bool,

    /// Path to the settings file
    #[clap(long)]
    pub settings: Option<String>,

    /// Store the effective settings and exit
    #[clap(long, conflicts_with_all = ["show_settings", "reset_settings"])]
    pub save_settings: bool,

    /// Print the stored settings and exit
    #[clap(long, conflicts_with = "reset_settings")]
    pub show_settings: bool,

    /// Delete the stored settings and exit
    #[clap(long)]
    pub reset_settings: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[clap(short, long)]
    pub quiet: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project root
    pub root: PathBuf,

    /// Documents to include, in command-line order
    pub documents: Vec<PathBuf>,

    /// Whether to render the project tree
    pub include_tree: bool,

    /// Whether the tree lists only the documents
    pub tree_documents_only: bool,

    /// Settings after command-line overrides
    pub settings: Settings,

    /// Extra ignore patterns
    pub ignore_patterns: Vec<String>,

    /// Extra ignore files
    pub ignore_files: Vec<PathBuf>,

    /// Where to write the prompt
    pub destination: Destination,

    /// Include large files without asking
    pub assume_yes: bool,
}

impl Config {
    /// Merge command-line arguments over stored settings
    pub fn from_args(args: Args, stored: Settings) -> Self {
        let mut settings = stored;

        if let Some(depth) = args.depth {
            settings.tree_depth_limit = DepthLimit::from(depth);
        }
        if args.limit_prompt_length {
            settings.limit_prompt_length = true;
        }
        if let Some(max_tokens) = args.max_tokens {
            settings.max_tokens = max_tokens;
        }
        if args.clip {
            settings.auto_copy_to_clipboard = true;
        }
        if args.no_clip {
            settings.auto_copy_to_clipboard = false;
        }
        if let Some(instructions) = args.instructions {
            settings.additional_instructions = instructions;
        }

        Self {
            root: PathBuf::from(args.root),
            documents: args.files.into_iter().map(PathBuf::from).collect(),
            include_tree: args.tree,
            tree_documents_only: args.tree_documents_only,
            settings,
            ignore_patterns: args.ignore,
            ignore_files: args.ignore_file.into_iter().map(PathBuf::from).collect(),
            destination: args
                .output
                .map(|p| Destination::File(PathBuf::from(p)))
                .unwrap_or(Destination::Stdout),
            assume_yes: args.yes,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.settings.limit_prompt_length || self.settings.max_tokens > 0,
            InvalidArgument,
            "Token limit must be greater than zero when limiting prompt length"
        );

        ensure!(
            self.root.is_dir(),
            Config,
            "Project root is not a directory: {}",
            self.root.display()
        );

        for document in &self.documents {
            if !document.exists() {
                return Err(PromptError::PathNotFound {
                    path: document.clone(),
                });
            }
        }

        if let Destination::File(path) = &self.destination {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    bail!(Config, "Output directory not found: {}", parent.display());
                }
            }
        }

        for ignore_file in &self.ignore_files {
            ensure!(
                ignore_file.is_file(),
                Config,
                "Ignore file not found: {}",
                ignore_file.display()
            );
        }

        Ok(())
    }

    /// Make the root and document paths absolute and canonical
    ///
    /// Ignore matching and relative display paths compare against the
    /// canonical root, so documents must use the same form.
    pub fn canonicalize(&mut self) -> Result<()> {
        self.root = canonical(&self.root)?;
        self.documents = self
            .documents
            .iter()
            .map(|doc| canonical(doc))
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// Ignore rules for the root: its `.gitignore`, extra files, then patterns
    ///
    /// Malformed lines in files are skipped; a malformed pattern given on the
    /// command line is an error.
    pub fn ignore_matcher(&self) -> Result<IgnoreMatcher> {
        let mut builder = IgnoreMatcher::builder(&self.root);
        builder.add_file(self.root.join(IGNORE_FILE))?;
        for file in &self.ignore_files {
            builder.add_file(file)?;
        }
        for pattern in &self.ignore_patterns {
            builder.add_line(pattern)?;
        }

        if builder.skipped() > 0 {
            log::warn!("Skipped {} malformed ignore rules", builder.skipped());
        }
        Ok(builder.build())
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| PromptError::from_io(path, e))
}

/// Settings command requested on the command line, if any
pub fn settings_command(args: &Args, effective: &Settings) -> Option<SettingsCommand> {
    if args.save_settings {
        Some(SettingsCommand::Save(effective.clone()))
    } else if args.show_settings {
        Some(SettingsCommand::Show)
    } else if args.reset_settings {
        Some(SettingsCommand::Reset)
    } else {
        None
    }
}
