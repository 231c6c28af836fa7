/*!
 * Directory tree construction and rendering
 */

mod builder;
mod renderer;

pub use builder::{DepthLimit, TreeBuilder};
pub use renderer::TreeRenderer;

use crate::error::Result;

/// Build and render a tree in one call
///
/// The trailing newline of the last line is kept; callers embedding the
/// tree in a larger block trim it.
pub fn generate_tree(builder: &TreeBuilder<'_>) -> Result<String> {
    let tree = builder.build()?;
    if let Some(root) = &tree {
        log::debug!(
            "Tree has {} nodes, {} levels deep",
            root.count(),
            root.max_depth()
        );
    }
    Ok(TreeRenderer::new().render(tree.as_ref()))
}
