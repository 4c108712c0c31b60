use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Abstraction over file system operations for testing
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace a file's contents so that readers never see a partial write
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Real file system implementation using std::fs
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        // Same directory as the target so the final rename never crosses devices
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_write_atomic_replaces_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.pot");
        let fs = RealFileSystem;

        fs.write_atomic(&path, "first").unwrap();
        fs.write_atomic(&path, "second").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary files should not be left behind");
    }

    #[test]
    fn test_real_write_atomic_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing/out.pot");
        assert!(RealFileSystem.write_atomic(&path, "x").is_err());
    }

    #[test]
    fn test_in_memory_file_system() {
        use mock::InMemoryFileSystem;

        let fs = InMemoryFileSystem::new();
        fs.add_file("src/app.js", "gettext('a')");

        assert!(fs.has_dir("src"));
        assert_eq!(
            fs.read_to_string(Path::new("src/app.js")).unwrap(),
            "gettext('a')"
        );
        assert!(fs.read_to_string(Path::new("src/other.js")).is_err());

        fs.write_atomic(Path::new("out.pot"), "x").unwrap();
        assert_eq!(fs.get_file("out.pot").as_deref(), Some("x"));

        fs.deny_writes("locked.pot");
        assert!(fs.write_atomic(Path::new("locked.pot"), "x").is_err());
    }
}
