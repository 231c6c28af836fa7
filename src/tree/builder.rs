/*!
 * Depth-limited directory traversal producing a `TreeNode` tree
 */

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PromptError, Result};
use crate::matcher::IgnoreMatcher;
use crate::types::TreeNode;

/// Maximum number of levels shown below the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthLimit {
    /// Descend without limit
    #[default]
    Unlimited,
    /// Show at most this many levels below the root
    Levels(usize),
}

impl DepthLimit {
    /// Whether a node at `depth` (root = 0) may be emitted
    pub fn allows(&self, depth: usize) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Levels(max) => depth <= *max,
        }
    }

    /// Signed form used in settings: -1 means unlimited
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Levels(n) => i64::try_from(*n).unwrap_or(i64::MAX),
        }
    }
}

impl From<i64> for DepthLimit {
    fn from(value: i64) -> Self {
        usize::try_from(value)
            .map(Self::Levels)
            .unwrap_or(Self::Unlimited)
    }
}

impl fmt::Display for DepthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Levels(n) => write!(f, "{}", n),
        }
    }
}

/// Builds the filtered tree for one root
pub struct TreeBuilder<'a> {
    root: PathBuf,
    matcher: &'a IgnoreMatcher,
    depth_limit: DepthLimit,
    allow_list: Option<HashSet<PathBuf>>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder; rules are anchored at the matcher's root
    pub fn new(matcher: &'a IgnoreMatcher, depth_limit: DepthLimit) -> Self {
        Self {
            root: matcher.root().to_path_buf(),
            matcher,
            depth_limit,
            allow_list: None,
        }
    }

    /// Only emit files whose absolute path is in `paths`
    ///
    /// Directories below the root are kept only when they lead to at least
    /// one listed file.
    pub fn with_allow_list(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.allow_list = Some(paths.into_iter().collect());
        self
    }

    /// Walk the root and return its tree, or `None` if the root is excluded
    pub fn build(&self) -> Result<Option<TreeNode>> {
        log::debug!(
            "Building tree for {} (depth limit: {})",
            self.root.display(),
            self.depth_limit
        );
        let metadata = fs::metadata(&self.root).map_err(|e| PromptError::from_io(&self.root, e))?;
        self.build_node(&self.root, metadata.is_dir(), 0)
    }

    fn build_node(&self, path: &Path, is_dir: bool, depth: usize) -> Result<Option<TreeNode>> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if self.matcher.is_ignored(relative, is_dir) {
            log::trace!("Excluded: {}", relative.display());
            return Ok(None);
        }

        if !self.depth_limit.allows(depth) {
            return Ok(None);
        }

        let name = node_name(path);
        if !is_dir {
            if let Some(allowed) = &self.allow_list {
                if !allowed.contains(path) {
                    return Ok(None);
                }
            }
            return Ok(Some(TreeNode::file(name)));
        }

        let mut children = Vec::new();
        // Children past the limit would all be cut, so skip reading them
        if self.depth_limit.allows(depth + 1) {
            for (entry_path, entry_is_dir) in self.read_entries(path)? {
                if let Some(child) = self.build_node(&entry_path, entry_is_dir, depth + 1)? {
                    children.push(child);
                }
            }
        }

        if depth > 0 && children.is_empty() && self.allow_list.is_some() {
            return Ok(None);
        }

        Ok(Some(TreeNode::directory(name, children)))
    }

    /// Immediate entries of `dir` in enumeration order, with their kind
    ///
    /// The kind comes from the directory listing and symlinks are reported
    /// as non-directories. Entries that cannot be read are logged and left
    /// out, so an unreadable directory shows up empty.
    fn read_entries(&self, dir: &Path) -> Result<Vec<(PathBuf, bool)>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            match entry {
                Ok(entry) => {
                    let is_dir = entry.file_type().is_dir() && !entry.path_is_symlink();
                    entries.push((entry.into_path(), is_dir));
                }
                Err(e) => {
                    let failed = e.path().unwrap_or(dir).to_path_buf();
                    match e.into_io_error() {
                        Some(io_err) if io_err.kind() == io::ErrorKind::PermissionDenied => {
                            log::warn!("Cannot read {}, skipping: {}", failed.display(), io_err);
                        }
                        Some(io_err) => return Err(PromptError::from_io(failed, io_err)),
                        None => {
                            return Err(PromptError::Unexpected(format!(
                                "Failed to enumerate {}",
                                failed.display()
                            )))
                        }
                    }
                }
            }
        }
        Ok(entries)
    }
}

/// Final path component as display text
fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
