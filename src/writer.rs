/*!
 * Prompt output for prompt-perfect
 */

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::error::{PromptError, Result};

/// Where the prompt text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes prompts to their destination
pub struct OutputWriter {
    destination: Destination,
}

impl OutputWriter {
    pub fn new(destination: Destination) -> Self {
        Self { destination }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Write the prompt text unchanged
    pub fn write(&self, text: &str) -> Result<()> {
        match &self.destination {
            Destination::Stdout => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                Self::write_to(&mut out, text)?;
            }
            Destination::File(path) => {
                let file = File::create(path).map_err(|e| PromptError::from_io(path, e))?;
                let mut out = BufWriter::new(file);
                Self::write_to(&mut out, text)?;
                log::info!("Prompt written to {}", path.display());
            }
        }
        Ok(())
    }

    fn write_to<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_to_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("prompt.md");
        let writer = OutputWriter::new(Destination::File(path.clone()));
        writer.write("```a.txt\nhi\n```\n\n")?;
        assert_eq!(fs::read_to_string(&path)?, "```a.txt\nhi\n```\n\n");
        Ok(())
    }

    #[test]
    fn test_write_into_missing_dir_fails() -> Result<()> {
        let dir = tempdir()?;
        let writer = OutputWriter::new(Destination::File(dir.path().join("no").join("p.md")));
        assert!(matches!(
            writer.write("x"),
            Err(PromptError::PathNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_destination_display() {
        assert_eq!(Destination::Stdout.to_string(), "stdout");
        assert_eq!(
            Destination::File(PathBuf::from("out/p.md")).to_string(),
            "out/p.md"
        );
    }
}
