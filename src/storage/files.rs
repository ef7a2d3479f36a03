use crate::storage::StorageResult;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Writes `content` to `path` only if it differs from what is already there
///
/// Parent directories are created as needed. The comparison is byte-for-byte.
///
/// # Returns
///
/// * `Ok(true)` - The file was created or replaced
/// * `Ok(false)` - The file already held exactly this content
pub fn write_if_changed(path: &Path, content: &str) -> StorageResult<bool> {
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => {
            debug!("Unchanged: {}", path.display());
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(true)
}

/// Reads a text file, replacing invalid UTF-8
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read_text_lossy(path: &Path) -> StorageResult<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_if_changed_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.txt");

        assert!(write_if_changed(&path, "hello\n").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_if_changed_skips_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        assert!(write_if_changed(&path, "one").unwrap());
        assert!(!write_if_changed(&path, "one").unwrap());
        assert!(write_if_changed(&path, "two").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_read_text_lossy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bytes.html");
        assert!(read_text_lossy(&path).unwrap().is_none());

        fs::write(&path, b"ok \xff").unwrap();
        assert_eq!(read_text_lossy(&path).unwrap().unwrap(), "ok \u{fffd}");
    }
}
