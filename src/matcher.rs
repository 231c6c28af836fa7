/*!
 * Gitignore-style path exclusion
 *
 * Rules are compiled once with the `ignore` crate and then queried with paths
 * relative to the traversal root. The `.git` directory is always excluded.
 */

use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{PromptError, Result};

/// Name of the version-control directory that is never shown
pub const VCS_DIR: &str = ".git";

/// Name of the ignore file read from the traversal root
pub const IGNORE_FILE: &str = ".gitignore";

/// Answers whether a root-relative path is excluded
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    root: PathBuf,
    rules: Gitignore,
}

impl IgnoreMatcher {
    /// Start building a matcher for `root`
    pub fn builder(root: impl AsRef<Path>) -> IgnoreMatcherBuilder {
        IgnoreMatcherBuilder::new(root.as_ref())
    }

    /// Matcher with only the built-in `.git` exclusion
    pub fn empty(root: impl AsRef<Path>) -> Self {
        Self::builder(root).build()
    }

    /// Load the root's `.gitignore` if present
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut builder = Self::builder(root);
        builder.add_file(root.join(IGNORE_FILE))?;
        Ok(builder.build())
    }

    /// Root the rules are anchored to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check a path relative to the root
    ///
    /// A file below an excluded directory stays excluded even if a later
    /// negation names the file itself.
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() {
            return false;
        }

        if relative_path.has_root() {
            log::debug!(
                "Refusing to match non-relative path {}",
                relative_path.display()
            );
            return false;
        }

        if relative_path
            .components()
            .any(|c| c == Component::Normal(VCS_DIR.as_ref()))
        {
            return true;
        }

        // Ancestors first, shallowest to deepest
        let mut ancestors: Vec<&Path> = relative_path
            .ancestors()
            .skip(1)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        if let Some(dir) = ancestors
            .into_iter()
            .find(|dir| self.rules.matched(dir, true).is_ignore())
        {
            log::trace!(
                "Ignored through parent {}: {}",
                dir.display(),
                relative_path.display()
            );
            return true;
        }

        let matched = self.rules.matched(relative_path, is_dir).is_ignore();
        if matched {
            log::trace!("Ignored by rules: {}", relative_path.display());
        }
        matched
    }

    /// Check an absolute path; paths outside the root are never ignored
    pub fn is_ignored_abs(&self, path: &Path, is_dir: bool) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(relative) => self.is_ignored(relative, is_dir),
            Err(_) => {
                log::debug!("{} is outside {}", path.display(), self.root.display());
                false
            }
        }
    }
}

/// Collects rule sets before compiling them
pub struct IgnoreMatcherBuilder {
    root: PathBuf,
    inner: GitignoreBuilder,
    skipped: usize,
}

impl IgnoreMatcherBuilder {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            inner: GitignoreBuilder::new(root),
            skipped: 0,
        }
    }

    /// Add a single rule, rejecting malformed globs
    pub fn add_line(&mut self, line: &str) -> Result<&mut Self> {
        self.inner
            .add_line(None, line)
            .map_err(|e| PromptError::InvalidIgnorePattern {
                pattern: line.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self)
    }

    /// Add rules from gitignore-formatted text, skipping malformed lines
    pub fn add_source(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            if let Err(e) = self.add_line(line) {
                log::warn!("Skipping ignore rule: {}", e);
                self.skipped += 1;
            }
        }
        self
    }

    /// Add rules from a file; a missing file adds nothing
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("Loading ignore rules from {}", path.display());
                Ok(self.add_source(&text))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No ignore file at {}", path.display());
                Ok(self)
            }
            Err(e) => Err(PromptError::from_io(path, e)),
        }
    }

    /// Number of lines rejected so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Compile the collected rules
    pub fn build(&self) -> IgnoreMatcher {
        let rules = match self.inner.build() {
            Ok(rules) => rules,
            Err(e) => {
                // Lines were validated one by one, so this only trips on
                // whole-set failures; fall back to no user rules.
                log::warn!("Failed to compile ignore rules: {}", e);
                Gitignore::empty()
            }
        };
        IgnoreMatcher {
            root: self.root.clone(),
            rules,
        }
    }
}
