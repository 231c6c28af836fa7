/*!
 * Tests for prompt-perfect functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

use crate::assembler::{AutoConfirm, FileDocuments, PromptAssembler};
use crate::error::PromptError;
use crate::matcher::IgnoreMatcher;
use crate::settings::Settings;
use crate::tree::{generate_tree, DepthLimit, TreeBuilder};

// Helper creating `<tmp>/workspace` so rendered root names are stable
fn setup_workspace() -> io::Result<(TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("workspace");
    fs::create_dir(&root)?;
    Ok((temp_dir, root))
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())
}

fn tree(matcher: &IgnoreMatcher, depth: i64) -> String {
    generate_tree(&TreeBuilder::new(matcher, DepthLimit::from(depth))).expect("tree should build")
}

#[test]
fn test_two_files_at_depth_one() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("text.txt"), "hello")?;
    File::create(root.join("binary.bin"))?.write_all(&[0u8, 1, 2, 3])?;

    let output = tree(&IgnoreMatcher::empty(&root), 1);
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "workspace");
    assert!(lines[1].starts_with("├── "));
    assert!(lines[2].starts_with("└── "));

    let mut names: Vec<&str> = lines[1..]
        .iter()
        .filter_map(|l| l.strip_prefix("├── ").or_else(|| l.strip_prefix("└── ")))
        .collect();
    names.sort();
    assert_eq!(names, vec!["binary.bin", "text.txt"]);
    Ok(())
}

#[test]
fn test_empty_root_renders_its_name() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    let output = tree(&IgnoreMatcher::empty(&root), -1);
    assert_eq!(output.trim(), "workspace");
    Ok(())
}

#[test]
fn test_ignored_file_is_absent() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("included.txt"), "in")?;
    write_file(&root.join("ignored.txt"), "out")?;

    let mut builder = IgnoreMatcher::builder(&root);
    builder.add_source("ignored.txt\n");
    let output = tree(&builder.build(), -1);

    assert_eq!(output, "workspace\n└── included.txt\n");
    Ok(())
}

#[test]
fn test_nested_folders_cut_at_depth_two() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("folder1").join("folder2").join("file.txt"), "x")?;

    let output = tree(&IgnoreMatcher::empty(&root), 2);
    assert_eq!(output, "workspace\n└── folder1\n    └── folder2\n");
    Ok(())
}

#[test]
fn test_sample_tree_from_disk() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("root");
    write_file(&root.join("folder1").join("file2.txt"), "2")?;
    write_file(&root.join("file1.txt"), "1")?;

    let output = tree(&IgnoreMatcher::empty(&root), -1);

    // Sibling order follows the filesystem, so accept either enumeration
    let file_first = "root\n├── file1.txt\n└── folder1\n    └── file2.txt\n";
    let folder_first = "root\n├── folder1\n│   └── file2.txt\n└── file1.txt\n";
    assert!(
        output == file_first || output == folder_first,
        "unexpected tree:\n{}",
        output
    );
    Ok(())
}

#[test]
fn test_empty_folder_is_kept() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    fs::create_dir(root.join("folder"))?;
    write_file(&root.join("file.txt"), "x")?;

    let output = tree(&IgnoreMatcher::empty(&root), -1);
    assert!(
        output == "workspace\n├── folder\n└── file.txt\n"
            || output == "workspace\n├── file.txt\n└── folder\n",
        "unexpected tree:\n{}",
        output
    );
    Ok(())
}

#[test]
fn test_depth_limit_bounds_every_node() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("a").join("b").join("c").join("d").join("e.txt"), "x")?;
    write_file(&root.join("a").join("side.txt"), "x")?;
    let matcher = IgnoreMatcher::empty(&root);

    for depth in 0..7usize {
        let node = TreeBuilder::new(&matcher, DepthLimit::Levels(depth))
            .build()
            .expect("tree should build")
            .expect("root is never excluded");
        assert!(node.max_depth() <= depth, "depth {} exceeded", depth);
        assert_eq!(node.max_depth(), depth.min(5));
    }

    let unlimited = TreeBuilder::new(&matcher, DepthLimit::Unlimited)
        .build()
        .expect("tree should build")
        .expect("root is never excluded");
    assert_eq!(unlimited.max_depth(), 5);
    Ok(())
}

#[test]
fn test_git_directory_is_never_shown() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join(".git").join("config"), "[core]")?;
    write_file(&root.join("main.rs"), "fn main() {}")?;

    let output = tree(&IgnoreMatcher::empty(&root), -1);
    assert_eq!(output, "workspace\n└── main.rs\n");
    Ok(())
}

#[test]
fn test_root_gitignore_is_honoured() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join(".gitignore"), "*.log\nbuild/\n!build/keep.txt\n")?;
    write_file(&root.join("debug.log"), "noise")?;
    write_file(&root.join("build").join("keep.txt"), "x")?;
    write_file(&root.join("src").join("lib.rs"), "")?;

    let matcher = IgnoreMatcher::from_root(&root).expect("matcher should load");
    let output = tree(&matcher, -1);

    assert!(output.contains("src"));
    assert!(output.contains("lib.rs"));
    assert!(output.contains(".gitignore"));
    assert!(!output.contains("debug.log"));
    assert!(!output.contains("build"));
    assert!(!output.contains("keep.txt"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() -> io::Result<()> {
    let (tmp, root) = setup_workspace()?;
    write_file(&tmp.path().join("target").join("inside.txt"), "x")?;
    std::os::unix::fs::symlink(tmp.path().join("target"), root.join("link"))?;

    let output = tree(&IgnoreMatcher::empty(&root), -1);
    assert_eq!(output, "workspace\n└── link\n");
    Ok(())
}

#[test]
fn test_missing_root_is_reported() {
    let matcher = IgnoreMatcher::empty("/definitely/not/here/workspace");
    let result = TreeBuilder::new(&matcher, DepthLimit::Unlimited).build();
    assert!(matches!(result, Err(PromptError::PathNotFound { .. })));
}

#[test]
fn test_rendering_is_idempotent() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("a").join("b.txt"), "x")?;
    write_file(&root.join("c.txt"), "x")?;
    let matcher = IgnoreMatcher::empty(&root);

    assert_eq!(tree(&matcher, -1), tree(&matcher, -1));
    Ok(())
}

#[test]
fn test_prompt_with_source_tree() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    let main_rs = root.join("src").join("main.rs");
    write_file(&main_rs, "fn main() {}")?;

    let matcher = IgnoreMatcher::from_root(&root).expect("matcher should load");
    let settings = Settings {
        additional_instructions: "Find the bug.".to_string(),
        ..Settings::default()
    };
    let confirm = AutoConfirm(false);
    let prompt = PromptAssembler::new(&matcher, &settings, &confirm)
        .with_tree(true)
        .assemble_from(&FileDocuments::new(vec![main_rs]))
        .expect("prompt should assemble");

    assert_eq!(
        prompt.text,
        "```Source Tree\nworkspace\n└── src\n    └── main.rs\n```\n\n\
         ```src/main.rs\nfn main() {}\n```\n\n\
         Additional Instructions:\nFind the bug.\n"
    );
    assert!(prompt.tree_included);
    assert_eq!(prompt.included.len(), 1);
    Ok(())
}

#[test]
fn test_prompt_tree_respects_depth_setting() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("src").join("main.rs"), "fn main() {}")?;

    let matcher = IgnoreMatcher::empty(&root);
    let settings = Settings {
        tree_depth_limit: DepthLimit::Levels(0),
        ..Settings::default()
    };
    let confirm = AutoConfirm(false);
    let prompt = PromptAssembler::new(&matcher, &settings, &confirm)
        .with_tree(true)
        .assemble(&[])
        .expect("prompt should assemble");

    assert_eq!(prompt.text, "```Source Tree\nworkspace\n```\n\n");
    assert!(prompt.included.is_empty());
    Ok(())
}

#[test]
fn test_allow_list_prunes_unrelated_directories() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    let main_rs = root.join("src").join("main.rs");
    write_file(&main_rs, "fn main() {}")?;
    write_file(&root.join("docs").join("guide").join("readme.md"), "# Guide")?;
    write_file(&root.join("Cargo.toml"), "")?;

    let matcher = IgnoreMatcher::empty(&root);
    let builder = TreeBuilder::new(&matcher, DepthLimit::Unlimited).with_allow_list(vec![main_rs]);
    let output = generate_tree(&builder).expect("tree should build");

    assert_eq!(output, "workspace\n└── src\n    └── main.rs\n");
    Ok(())
}

#[test]
fn test_allow_list_keeps_root_without_matches() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("docs").join("readme.md"), "# Docs")?;

    let matcher = IgnoreMatcher::empty(&root);
    let builder = TreeBuilder::new(&matcher, DepthLimit::Unlimited)
        .with_allow_list(vec![root.join("missing.rs")]);
    assert_eq!(generate_tree(&builder).expect("tree should build"), "workspace\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_shown_empty() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let (_tmp, root) = setup_workspace()?;
    let locked = root.join("locked");
    write_file(&locked.join("secret.txt"), "x")?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Privileged users read through permission bits
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let result = generate_tree(&TreeBuilder::new(&IgnoreMatcher::empty(&root), DepthLimit::Unlimited));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    assert_eq!(result.expect("tree should build"), "workspace\n└── locked\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unsearchable_directory_does_not_abort() -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let (_tmp, root) = setup_workspace()?;
    let listed_only = root.join("listed");
    write_file(&listed_only.join("sub").join("deep.txt"), "x")?;
    write_file(&listed_only.join("note.txt"), "x")?;
    fs::set_permissions(&listed_only, fs::Permissions::from_mode(0o444))?;

    if fs::metadata(listed_only.join("note.txt")).is_ok() {
        fs::set_permissions(&listed_only, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let result = generate_tree(&TreeBuilder::new(&IgnoreMatcher::empty(&root), DepthLimit::Unlimited));
    fs::set_permissions(&listed_only, fs::Permissions::from_mode(0o755))?;

    let output = result.expect("tree should build");
    assert!(output.starts_with("workspace\n└── listed\n"));
    assert!(!output.contains("deep.txt"));
    Ok(())
}

#[test]
fn test_depth_one_shows_directories_bare() -> io::Result<()> {
    let (_tmp, root) = setup_workspace()?;
    write_file(&root.join("outer").join("inner").join("file.txt"), "x")?;

    let output = tree(&IgnoreMatcher::empty(&root), 1);
    assert_eq!(output, "workspace\n└── outer\n");
    Ok(())
}
