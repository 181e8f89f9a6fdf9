//! Per-page record artifacts.
//!
//! One JSON object per line, keys in the order `name`, `title`, `email`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cache::{exists, write_atomic, ExistingPolicy};
use crate::error::DeptDirError;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// The artifact already existed and was left untouched.
    Skipped(PathBuf),
}

#[derive(Debug, Clone, Copy)]
pub struct RecordWriter {
    policy: ExistingPolicy,
}

impl RecordWriter {
    pub fn new(policy: ExistingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ExistingPolicy {
        self.policy
    }

    /// Writes `records` to `path`, replacing it atomically.
    ///
    /// With [`ExistingPolicy::Skip`] an existing `path` is not opened at all.
    pub async fn write(&self, records: &[Record], path: &Path) -> Result<WriteOutcome, DeptDirError> {
        if self.policy == ExistingPolicy::Skip && exists(path).await? {
            debug!(path = %path.display(), "artifact exists, skipping");
            return Ok(WriteOutcome::Skipped(path.to_path_buf()));
        }
        let body = to_json_lines(records, path)?;
        write_atomic(path, body.as_bytes()).await?;
        info!(path = %path.display(), records = records.len(), "wrote records");
        Ok(WriteOutcome::Written(path.to_path_buf()))
    }
}

/// Serializes records one per line; `path` only labels errors.
pub fn to_json_lines(records: &[Record], path: &Path) -> Result<String, DeptDirError> {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        let line = serde_json::to_string(record).map_err(|source| DeptDirError::Record {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Reads an artifact written by [`RecordWriter::write`]. Blank lines are ignored.
pub async fn read_records(path: &Path) -> Result<Vec<Record>, DeptDirError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DeptDirError::io(path, e))?;
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| DeptDirError::Record {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RoleTag;

    fn sample() -> Vec<Record> {
        vec![
            Record {
                name: "Jane Doe".into(),
                title: RoleTag::Phd,
                email: Some("jdoe@x.edu".into()),
            },
            Record {
                name: "Ann Lee".into(),
                title: RoleTag::MasterAlumni,
                email: None,
            },
        ]
    }

    #[test]
    fn json_lines_keep_key_order_and_omit_missing_email() {
        let text = to_json_lines(&sample(), Path::new("page-1.txt")).unwrap();
        assert_eq!(
            text,
            "{\"name\":\"Jane Doe\",\"title\":\"phd\",\"email\":\"jdoe@x.edu\"}\n\
             {\"name\":\"Ann Lee\",\"title\":\"master-alumni\"}\n"
        );
    }

    #[test]
    fn empty_page_is_an_empty_file() {
        assert_eq!(to_json_lines(&[], Path::new("page-1.txt")).unwrap(), "");
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phd").join("page-1.txt");
        let writer = RecordWriter::new(ExistingPolicy::Overwrite);

        let outcome = writer.write(&sample(), &path).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written(path.clone()));
        assert_eq!(read_records(&path).await.unwrap(), sample());
    }

    #[tokio::test]
    async fn skip_leaves_existing_artifact_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-1.txt");
        std::fs::write(&path, "previous run\n").unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let writer = RecordWriter::new(ExistingPolicy::Skip);
        let outcome = writer.write(&sample(), &path).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run\n");
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[tokio::test]
    async fn overwrite_replaces_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-1.txt");
        std::fs::write(&path, "previous run\n").unwrap();

        RecordWriter::new(ExistingPolicy::Overwrite)
            .write(&sample()[..1], &path)
            .await
            .unwrap();
        assert_eq!(read_records(&path).await.unwrap(), sample()[..1].to_vec());
    }

    #[tokio::test]
    async fn read_reports_the_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-1.txt");
        std::fs::write(&path, "{\"name\":\"A B\",\"title\":\"phd\"}\n{\"name\":\"C\",\"title\":\"dean\"}\n").unwrap();

        match read_records(&path).await.unwrap_err() {
            DeptDirError::Record { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }
}
