//! File-backed document storage for the CLI.

use anyhow::{anyhow, Context, Result};
use sitecraft_document::Document;
use sitecraft_editor::Persistence;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

pub fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Document::from_json(&content).with_context(|| format!("Invalid document {}", path.display()))
}

/// Write through a sibling temp file so a failed write never truncates the
/// document.
pub fn write_document(path: &Path, document: &Document) -> Result<()> {
    write_json(path, &document.to_json()?)
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Queues document snapshots for a background writer.
///
/// `save` only serializes and enqueues; the file is written on the writer
/// thread, which skips snapshots superseded before it got to them.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    snapshots: Sender<String>,
}

/// Owns the writer thread of a [`FileStore`].
#[derive(Debug)]
pub struct SaveWriter {
    worker: JoinHandle<Result<usize>>,
}

impl FileStore {
    pub fn spawn(path: impl Into<PathBuf>) -> Result<(Self, SaveWriter)> {
        let path = path.into();
        let (snapshots, queue) = channel();
        let target = path.clone();
        let worker = thread::Builder::new()
            .name("sitecraft-save".to_string())
            .spawn(move || write_latest(&target, queue))
            .context("Failed to start document writer")?;
        Ok((Self { path, snapshots }, SaveWriter { worker }))
    }
}

impl Persistence for FileStore {
    fn save(&mut self, document: &Document) -> Result<()> {
        let json = document.to_json()?;
        self.snapshots
            .send(json)
            .map_err(|_| anyhow!("Writer for {} has stopped", self.path.display()))?;
        tracing::trace!(path = %self.path.display(), "Queued document snapshot");
        Ok(())
    }
}

impl SaveWriter {
    /// Wait for queued snapshots to land. The store must be dropped first,
    /// otherwise this blocks forever. Returns the number of files written.
    pub fn finish(self) -> Result<usize> {
        self.worker
            .join()
            .map_err(|_| anyhow!("Document writer panicked"))?
    }
}

fn write_latest(path: &Path, queue: Receiver<String>) -> Result<usize> {
    let mut writes = 0;
    while let Ok(mut json) = queue.recv() {
        while let Ok(newer) = queue.try_recv() {
            json = newer;
        }
        write_json(path, &json)?;
        writes += 1;
        tracing::debug!(path = %path.display(), writes, "Saved document");
    }
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let doc = Document::blank("shop");

        write_document(&path, &doc).unwrap();
        let loaded = load_document(&path).unwrap();

        assert!(loaded.same_content(&doc));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_writes_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let (mut store, writer) = FileStore::spawn(&path).unwrap();

        store.save(&Document::blank("site")).unwrap();
        store.save(&Document::blank("shop")).unwrap();
        drop(store);

        let writes = writer.finish().unwrap();
        assert!((1..=2).contains(&writes));
        assert_eq!(load_document(&path).unwrap().namespace(), "shop");
    }

    #[test]
    fn test_writer_reports_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("site.json");
        let (mut store, writer) = FileStore::spawn(&path).unwrap();

        store.save(&Document::blank("site")).unwrap();
        drop(store);

        let err = writer.finish().unwrap_err();
        assert!(err.to_string().contains("site.json.tmp"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
