use std::path::{Path, PathBuf};

const MEMORY_URL: &str = "sqlite::memory:";

/// Where learner progress is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressDb {
    Memory,
    File(PathBuf),
}

impl ProgressDb {
    /// Accepts `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare path.
    ///
    /// Relative paths are resolved against `base`. Returns `None` for an
    /// empty path.
    pub fn parse(raw: &str, base: &Path) -> Option<Self> {
        let raw = raw.trim();
        if raw == MEMORY_URL {
            return Some(Self::Memory);
        }

        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);
        if path.is_empty() {
            return None;
        }

        let path = Path::new(path);
        Some(Self::File(if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }))
    }

    /// Connection URL for the storage layer.
    pub fn url(&self) -> String {
        match self {
            Self::Memory => MEMORY_URL.to_owned(),
            Self::File(path) => format!("sqlite://{}", path.display()),
        }
    }

    /// Create the database file and its directory if missing.
    ///
    /// The pool opens existing files only.
    pub fn ensure_exists(&self) -> std::io::Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(())
    }
}
