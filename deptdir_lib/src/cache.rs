//! On-disk cache of downloaded pages.
//!
//! A page is fetched once and stored verbatim; later runs reuse the stored
//! copy unless told to overwrite it. Files are written to a temporary sibling
//! and renamed into place, so a destination either holds a complete download
//! or does not exist.

use std::path::{Path, PathBuf};

use deptdir_fetch::{Client, FetchRequest};
use tracing::{debug, info};

use crate::error::DeptDirError;

/// What to do when the output of a step already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingPolicy {
    /// Keep the existing file and skip the step.
    Skip,
    /// Redo the step and replace the file.
    Overwrite,
}

impl ExistingPolicy {
    pub fn overwrite(force: bool) -> Self {
        if force {
            Self::Overwrite
        } else {
            Self::Skip
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The destination already existed; nothing was downloaded.
    Hit(PathBuf),
    /// The page was downloaded to the destination.
    Fetched(PathBuf),
}

impl CacheOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Hit(path) | Self::Fetched(path) => path,
        }
    }
}

/// Download cache in front of the paced fetch client.
pub struct FetchCache {
    client: Client,
}

impl FetchCache {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Stores the response to `request` at `destination`, unless `destination`
    /// exists and `policy` is [`ExistingPolicy::Skip`].
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        destination: &Path,
        policy: ExistingPolicy,
    ) -> Result<CacheOutcome, DeptDirError> {
        if policy == ExistingPolicy::Skip && exists(destination).await? {
            debug!(path = %destination.display(), "cache hit");
            return Ok(CacheOutcome::Hit(destination.to_path_buf()));
        }

        let body = self.client.fetch(request).await?;
        write_atomic(destination, &body).await?;
        info!(request = %request, path = %destination.display(), bytes = body.len(), "downloaded");
        Ok(CacheOutcome::Fetched(destination.to_path_buf()))
    }
}

pub(crate) async fn exists(path: &Path) -> Result<bool, DeptDirError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DeptDirError::io(path, e))
}

/// Writes `contents` to a temporary sibling of `path`, then renames it over `path`.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DeptDirError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DeptDirError::io(parent, e))?;
    }
    let temp = temp_sibling(path);
    if let Err(e) = tokio::fs::write(&temp, contents).await {
        return Err(DeptDirError::io(&temp, e));
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(DeptDirError::io(path, e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}
