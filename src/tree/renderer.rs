/*!
 * ASCII rendering of a `TreeNode` tree
 */

use crate::types::TreeNode;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders trees with box-drawing glyphs
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeRenderer;

impl TreeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the whole tree; every line ends with a newline
    ///
    /// An absent tree (for example an excluded root) renders as an empty
    /// string.
    pub fn render(&self, root: Option<&TreeNode>) -> String {
        let Some(root) = root else {
            return String::new();
        };

        let mut out = String::new();
        out.push_str(&root.name);
        out.push('\n');
        self.render_children(root.children(), "", &mut out);
        out
    }

    fn render_children(&self, children: &[TreeNode], prefix: &str, out: &mut String) {
        for (index, child) in children.iter().enumerate() {
            let is_last = index + 1 == children.len();

            out.push_str(prefix);
            out.push_str(if is_last { CORNER } else { BRANCH });
            out.push_str(&child.name);
            out.push('\n');

            if child.is_dir() {
                let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
                self.render_children(child.children(), &child_prefix, out);
            }
        }
    }
}
