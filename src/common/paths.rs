//! Configuration and fixture paths

use std::io;
use std::path::PathBuf;

/// Name used for the config directory and the fixture directory
const APP_NAME: &str = "piperag-e2e";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/piperag-e2e/`
/// - macOS: `~/Library/Application Support/piperag-e2e/`
/// - Windows: `%APPDATA%\piperag-e2e\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Directory holding the transient upload fixture
///
/// Shared by every run on the machine. Two concurrent runs would write the
/// same file, which is fine for a single-instance harness.
pub fn fixture_dir() -> PathBuf {
    std::env::temp_dir().join(APP_NAME)
}

/// Path of the upload fixture with the given file name
pub fn fixture_path(filename: &str) -> PathBuf {
    fixture_dir().join(filename)
}

/// Ensure the fixture directory exists
pub fn ensure_fixture_dir() -> io::Result<()> {
    let dir = fixture_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_path_is_under_temp_dir() {
        let path = fixture_path("test.txt");
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("piperag-e2e/test.txt"));
    }

    #[test]
    fn test_ensure_fixture_dir_creates_directory() {
        ensure_fixture_dir().unwrap();
        assert!(fixture_dir().is_dir());
        // Idempotent once the directory exists
        ensure_fixture_dir().unwrap();
    }

    #[test]
    fn test_config_path_file_name() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.toml"));
        }
    }
}
