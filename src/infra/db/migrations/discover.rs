//! Migration file discovery.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::MIGRATION_FILE_EXTENSION;
use crate::infra::db::error::BootstrapError;

/// A migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name, the ledger key
    pub filename: String,
    pub path: PathBuf,
}

/// List the `*.sql` files of `dir` in apply order.
///
/// Apply order is byte-wise lexicographic order of the filename, so files
/// must be named with zero-padded numeric or date prefixes. Directories and
/// files with any other extension are ignored.
pub async fn discover(dir: &Path) -> Result<Vec<MigrationFile>, BootstrapError> {
    let discovery_error = |source: io::Error| BootstrapError::Discovery {
        dir: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(discovery_error)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(discovery_error)? {
        let path = entry.path();
        if path.extension() != Some(OsStr::new(MIGRATION_FILE_EXTENSION)) {
            continue;
        }

        let metadata = tokio::fs::metadata(&path).await.map_err(discovery_error)?;
        if !metadata.is_file() {
            continue;
        }

        let filename = entry.file_name().into_string().map_err(|name| {
            discovery_error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("migration filename {:?} is not valid UTF-8", name),
            ))
        })?;

        files.push(MigrationFile { filename, path });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    tracing::debug!(
        dir = %dir.display(),
        count = files.len(),
        "Discovered migration files"
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(files: &[MigrationFile]) -> Vec<&str> {
        files.iter().map(|f| f.filename.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sorted_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0010_late.sql", "0002_b.sql", "0001_a.sql", "20240101_x.sql"] {
            std::fs::write(dir.path().join(name), "SELECT 1;").unwrap();
        }

        let files = discover(dir.path()).await.unwrap();
        assert_eq!(
            names(&files),
            vec!["0001_a.sql", "0002_b.sql", "0010_late.sql", "20240101_x.sql"]
        );
    }

    #[tokio::test]
    async fn test_ignores_other_extensions_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();
        std::fs::write(dir.path().join("0002_draft.sql.bak"), "SELECT 2;").unwrap();
        std::fs::write(dir.path().join("0003_upper.SQL"), "SELECT 3;").unwrap();
        std::fs::create_dir(dir.path().join("0004_dir.sql")).unwrap();

        let files = discover(dir.path()).await.unwrap();
        assert_eq!(names(&files), vec!["0001_init.sql"]);
        assert_eq!(files[0].path, dir.path().join("0001_init.sql"));
    }

    #[tokio::test]
    async fn test_empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = discover(&missing).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Discovery { dir, .. } if dir == missing));
    }

    #[tokio::test]
    async fn test_discovery_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0002_b.sql", "0001_a.sql"] {
            std::fs::write(dir.path().join(name), "SELECT 1;").unwrap();
        }

        let first = discover(dir.path()).await.unwrap();
        let second = discover(dir.path()).await.unwrap();
        assert_eq!(first, second);
    }
}
