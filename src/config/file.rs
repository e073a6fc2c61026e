//! Access to the on-disk project configuration file.

use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::ResolveError;

/// Reads the project configuration file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigFileSource: Send + Sync {
    /// Returns the file contents, or `None` when no file exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ConfigFileRead`] when the file exists but
    /// cannot be read.
    async fn read_config_file(&self, path: &Utf8Path) -> Result<Option<String>, ResolveError>;
}

/// [`ConfigFileSource`] that resolves relative paths against a working
/// directory.
#[derive(Debug, Clone)]
pub struct WorkspaceConfigFiles {
    root: Utf8PathBuf,
}

impl WorkspaceConfigFiles {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the working directory relative paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

#[async_trait]
impl ConfigFileSource for WorkspaceConfigFiles {
    async fn read_config_file(&self, path: &Utf8Path) -> Result<Option<String>, ResolveError> {
        let full_path = self.root.join(path);
        let display_path = path.to_string();

        tokio::task::spawn_blocking(move || read_optional(&full_path))
            .await
            .map_err(|error| ResolveError::ConfigFileRead {
                path: display_path,
                message: format!("blocking read task failed: {error}"),
            })?
    }
}

fn read_optional(path: &Utf8Path) -> Result<Option<String>, ResolveError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ResolveError::ConfigFileRead {
        path: path.to_string(),
        message: "path has no file name".to_owned(),
    })?;

    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(read_error(path, &error)),
    };

    match dir.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(read_error(path, &error)),
    }
}

fn read_error(path: &Utf8Path, error: &io::Error) -> ResolveError {
    ResolveError::ConfigFileRead {
        path: path.to_string(),
        message: error.to_string(),
    }
}
