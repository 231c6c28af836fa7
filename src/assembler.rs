/*!
 * Prompt assembly
 *
 * Combines an optional source tree with the content of the open documents
 * into fenced blocks, then applies the configured length limit.
 */

use std::fmt;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::error::{PromptError, Result};
use crate::matcher::IgnoreMatcher;
use crate::settings::Settings;
use crate::tree::{generate_tree, TreeBuilder};
use crate::utils::{count_tokens, display_path, format_megabytes};

/// Files above this size need explicit confirmation
pub const LARGE_FILE_BYTES: usize = 1024 * 1024;

/// What a document holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// UTF-8 text
    Text(String),
    /// The path is not a regular file
    NotAFile,
    /// The file is not valid UTF-8
    Binary,
}

/// One open document
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub content: DocumentContent,
}

impl Document {
    pub fn text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: DocumentContent::Text(text.into()),
        }
    }
}

/// Supplies the documents to include
pub trait DocumentSource {
    fn documents(&self) -> Result<Vec<Document>>;
}

/// Documents read from a list of file paths
#[derive(Debug, Clone)]
pub struct FileDocuments {
    paths: Vec<PathBuf>,
}

impl FileDocuments {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DocumentSource for FileDocuments {
    fn documents(&self) -> Result<Vec<Document>> {
        self.paths.iter().map(|path| read_document(path)).collect()
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let metadata = fs::metadata(path).map_err(|e| PromptError::from_io(path, e))?;
    if !metadata.is_file() {
        return Ok(Document {
            path: path.to_path_buf(),
            content: DocumentContent::NotAFile,
        });
    }

    let bytes = fs::read(path).map_err(|e| PromptError::from_io(path, e))?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => DocumentContent::Text(text),
        Err(_) => DocumentContent::Binary,
    };
    Ok(Document {
        path: path.to_path_buf(),
        content,
    })
}

/// Asks the user a yes/no question
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// Fixed answer, for `--yes` and tests
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        log::debug!("{} -> {}", message, if self.0 { "yes" } else { "no" });
        self.0
    }
}

/// Asks on the terminal; a non-interactive stdin always answers no
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            log::warn!("{} Not asking, stdin is not a terminal.", message);
            return false;
        }

        eprint!("{} [y/N] ", message);
        if let Err(e) = io::stderr().flush() {
            log::debug!("Failed to flush stderr: {}", e);
        }

        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// Why a document was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAFile,
    NotUtf8,
    Ignored,
    Declined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAFile => "not a file",
            Self::NotUtf8 => "not UTF-8 text",
            Self::Ignored => "ignored",
            Self::Declined => "large file declined",
        };
        f.write_str(text)
    }
}

/// Document that made it into the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedDocument {
    pub path: String,
    pub bytes: usize,
    pub lines: usize,
    pub chars: usize,
    pub tokens: usize,
}

/// Document left out, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: SkipReason,
}

/// The assembled prompt and what went into it
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub tree_included: bool,
    pub included: Vec<IncludedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub tokens: usize,
}

/// Builds prompts for one project root
pub struct PromptAssembler<'a> {
    matcher: &'a IgnoreMatcher,
    settings: &'a Settings,
    confirm: &'a dyn Confirm,
    include_tree: bool,
    tree_documents_only: bool,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(matcher: &'a IgnoreMatcher, settings: &'a Settings, confirm: &'a dyn Confirm) -> Self {
        Self {
            matcher,
            settings,
            confirm,
            include_tree: false,
            tree_documents_only: false,
        }
    }

    /// Prefix the prompt with the project tree
    pub fn with_tree(mut self, include_tree: bool) -> Self {
        self.include_tree = include_tree;
        self
    }

    /// Show only the given documents as files in the tree
    pub fn with_documents_only_tree(mut self, documents_only: bool) -> Self {
        self.tree_documents_only = documents_only;
        self
    }

    fn render_tree(&self, documents: &[Document]) -> Result<String> {
        let mut builder = TreeBuilder::new(self.matcher, self.settings.tree_depth_limit);
        if self.tree_documents_only {
            builder = builder.with_allow_list(documents.iter().map(|d| d.path.clone()));
        }
        generate_tree(&builder)
    }

    /// Assemble the prompt from `documents`, in order
    pub fn assemble(&self, documents: &[Document]) -> Result<Prompt> {
        let root = self.matcher.root();
        log::debug!(
            "Assembling prompt from {} documents (tree: {})",
            documents.len(),
            self.include_tree
        );

        let mut text = String::new();
        let mut tree_included = false;

        if self.include_tree {
            let tree = self.render_tree(documents)?;
            text.push_str(&format!(
                "```Source Tree\n{}\n```\n\n",
                tree.trim_end_matches('\n')
            ));
            tree_included = true;
        }

        let mut included = Vec::new();
        let mut skipped = Vec::new();

        for document in documents {
            let shown = display_path(root, &document.path);
            let skip = |reason| SkippedDocument {
                path: shown.clone(),
                reason,
            };

            let content = match &document.content {
                DocumentContent::Text(content) => content,
                DocumentContent::NotAFile => {
                    skipped.push(skip(SkipReason::NotAFile));
                    continue;
                }
                DocumentContent::Binary => {
                    skipped.push(skip(SkipReason::NotUtf8));
                    continue;
                }
            };

            if self.matcher.is_ignored_abs(&document.path, false) {
                log::debug!("Skipping ignored document {}", shown);
                skipped.push(skip(SkipReason::Ignored));
                continue;
            }

            let bytes = content.len();
            if bytes > LARGE_FILE_BYTES {
                let question = format!(
                    "Large file detected: {} ({} MB). Include it?",
                    shown,
                    format_megabytes(bytes)
                );
                if !self.confirm.confirm(&question) {
                    skipped.push(skip(SkipReason::Declined));
                    continue;
                }
            }

            text.push_str(&format!("```{}\n{}\n```\n\n", shown, content));
            included.push(IncludedDocument {
                path: shown,
                bytes,
                lines: content.lines().count(),
                chars: content.chars().count(),
                tokens: count_tokens(content),
            });
        }

        if !self.settings.additional_instructions.is_empty() {
            text.push_str(&format!(
                "Additional Instructions:\n{}\n",
                self.settings.additional_instructions
            ));
        }

        let tokens = count_tokens(&text);
        if self.settings.limit_prompt_length && tokens > self.settings.max_tokens {
            return Err(PromptError::TokenLimitExceeded {
                required: tokens,
                limit: self.settings.max_tokens,
            });
        }

        log::debug!(
            "Prompt ready: {} documents, {} skipped, {} tokens",
            included.len(),
            skipped.len(),
            tokens
        );

        Ok(Prompt {
            text,
            tree_included,
            included,
            skipped,
            tokens,
        })
    }

    /// Read documents from `source` and assemble them
    pub fn assemble_from(&self, source: &dyn DocumentSource) -> Result<Prompt> {
        let documents = source.documents()?;
        self.assemble(&documents)
    }
}
