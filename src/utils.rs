/*!
 * Utility functions for prompt-perfect
 */

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace separating word tokens
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Approximate token count: pieces left after splitting on whitespace runs
///
/// Leading or trailing whitespace produces an empty piece that is still
/// counted, so an empty string counts as one.
pub fn count_tokens(text: &str) -> usize {
    WHITESPACE.split(text).count()
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Size in mebibytes with two decimals, e.g. `1.50`
pub fn format_megabytes(size: usize) -> String {
    format!("{:.2}", size as f64 / 1024.0 / 1024.0)
}

/// Path shown to the user: relative to `root` when inside it
pub fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        _ => path.to_string_lossy().to_string(),
    }
}

/// Shorten `text` from the left so it fits in `max_len` characters
pub fn truncate_left(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let tail: String = text.chars().skip(len - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("one two  three"), 3);
        assert_eq!(count_tokens("one\ntwo\tthree\n"), 4);
        assert_eq!(count_tokens(""), 1);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(1024 * 1024 * 3 / 2), "1.50");
    }

    #[test]
    fn test_display_path() {
        let root = Path::new("/work/project");
        assert_eq!(
            display_path(root, Path::new("/work/project/src/main.rs")),
            "src/main.rs"
        );
        assert_eq!(display_path(root, Path::new("/tmp/notes.md")), "/tmp/notes.md");
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("short", 10), "short");
        assert_eq!(truncate_left("a/very/long/path.rs", 10), "...path.rs");
    }
}
