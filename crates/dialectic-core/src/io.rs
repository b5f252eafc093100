use crate::error::{DialecticError, Result};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Readers never observe a half-written counters or config file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Append text to a file, creating it if it doesn't exist.
pub fn append_text(path: &Path, text: &str) -> Result<()> {
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

/// Join a relative `target` onto `base`, refusing anything that could land
/// outside of it.
///
/// Absolute paths, drive prefixes and `..` segments are rejected; `.` segments
/// are dropped. An empty target is rejected as well.
pub fn join_within(base: &Path, target: &str) -> Result<PathBuf> {
    let mut out = base.to_path_buf();
    let mut pushed = false;
    for component in Path::new(target).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DialecticError::PathEscape(target.to_string()));
            }
        }
    }
    if !pushed {
        return Err(DialecticError::PathEscape(target.to_string()));
    }
    Ok(out)
}

/// Ensure the parent directory of `path` exists, then append `text`.
///
/// Returns `true` when the file was created by this call. New files get
/// `header` written before `text`, in a single write. If that write fails the
/// new file is removed again, so an error never leaves a header-only file
/// behind. Appends to an existing file are not rolled back.
pub fn ensure_dir_then_append(path: &Path, header: &str, text: &str) -> Result<bool> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let created = !path.exists();
    if created {
        let mut f = std::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)?;
        let mut block = String::with_capacity(header.len() + text.len());
        block.push_str(header);
        block.push_str(text);
        if let Err(e) = f.write_all(block.as_bytes()) {
            drop(f);
            let _ = std::fs::remove_file(path);
            return Err(e.into());
        }
    } else {
        append_text(path, text)?;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counters.json");
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/config.yaml");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn join_within_accepts_nested_relative_paths() {
        let base = Path::new("/docs");
        let joined = join_within(base, "./rules/security_rules.md").unwrap();
        assert_eq!(joined, PathBuf::from("/docs/rules/security_rules.md"));
    }

    #[test]
    fn join_within_rejects_parent_segments() {
        let base = Path::new("/docs");
        assert!(matches!(
            join_within(base, "rules/../../etc/passwd"),
            Err(DialecticError::PathEscape(_))
        ));
    }

    #[test]
    fn join_within_rejects_absolute_and_empty() {
        let base = Path::new("/docs");
        assert!(join_within(base, "/etc/passwd").is_err());
        assert!(join_within(base, "").is_err());
        assert!(join_within(base, "./.").is_err());
    }

    #[test]
    fn ensure_dir_then_append_creates_then_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plans/log.md");

        let created = ensure_dir_then_append(&path, "# Log\n\n", "one\n").unwrap();
        assert!(created);
        let created = ensure_dir_then_append(&path, "# Log\n\n", "two\n").unwrap();
        assert!(!created);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Log\n\none\ntwo\n"
        );
    }

    #[test]
    fn ensure_dir_then_append_leaves_nothing_on_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("plans"), "not a dir").unwrap();
        let path = dir.path().join("plans/log.md");

        assert!(ensure_dir_then_append(&path, "# Log\n\n", "one\n").is_err());
        assert!(!path.exists());
    }
}
