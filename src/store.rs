//! Note persistence for the application.
//!
//! The composer hands each completed note to a callback; the binary's
//! callback appends it here. The component itself never touches storage.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::data_dir;

use notavoz_core::APP_NAME;

/// Divider written between notes.
const NOTE_DIVIDER: &str = "\n\n---\n\n";

/// Default path for the notes file.
pub fn default_notes_path() -> Result<PathBuf> {
    let data_dir = data_dir().context("Failed to retrieve data directory")?;
    Ok(data_dir.join(APP_NAME).join("notes.md"))
}

/// Append one note to the notes file, creating it and its parent
/// directories on first use.
pub fn append_note(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create notes directory at {:?}", parent))?;
    }

    let mut body = String::with_capacity(content.len() + NOTE_DIVIDER.len());
    if path.exists() {
        body.push_str(NOTE_DIVIDER);
    }
    body.push_str(content);

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open notes file at {:?}", path))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("Failed to append note to {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_first_note_has_no_divider() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("notes.md");

        append_note(&path, "comprar pão").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "comprar pão");
    }

    #[test]
    fn test_notes_are_separated_by_divider() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("notes.md");

        append_note(&path, "first").unwrap();
        append_note(&path, "second").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\n\n---\n\nsecond");
    }

    #[test]
    fn test_parent_directories_are_created() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("notes.md");

        append_note(&path, "note").unwrap();

        assert!(path.exists());
    }
}
