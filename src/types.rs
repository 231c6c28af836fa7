/*!
 * Core types and data structures for prompt-perfect
 */

/// Kind of filesystem entry kept in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular file (symlinks are shown as files and never followed)
    File,
    /// Directory with its retained entries, in enumeration order
    Directory(Vec<TreeNode>),
}

/// One filesystem entry retained for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Final path segment
    pub name: String,
    /// File or directory
    pub kind: NodeKind,
}

impl TreeNode {
    /// Create a file node
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
        }
    }

    /// Create a directory node
    pub fn directory(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory(children),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    /// Children of a directory; empty for files
    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            NodeKind::Directory(children) => children,
            NodeKind::File => &[],
        }
    }

    /// Depth of the deepest node below this one (0 for a leaf)
    pub fn max_depth(&self) -> usize {
        self.children()
            .iter()
            .map(|child| child.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::count).sum::<usize>()
    }
}
