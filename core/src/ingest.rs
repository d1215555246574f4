//! Concurrent ingest of a batch of files
//!
//! Each file is read and parsed in its own task; only registration into the
//! shared [`Batch`] happens under the lock. The batch is handed back once
//! every task has been joined, so callers never observe a partial state.

use crate::error::{ParseFailure, Result};
use crate::model::StudyDictionary;
use crate::parser::{parse_bytes, ParseOutcome};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;

/// A byte stream with a display name
pub struct SourceFile<R> {
    pub name: String,
    pub reader: R,
}

impl<R> SourceFile<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

impl SourceFile<File> {
    /// Opens a file on disk, named by its path
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        Ok(Self::new(path.display().to_string(), file))
    }
}

/// A file left out of the batch, and why
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct IgnoredFile {
    pub name: String,
    pub reason: String,
}

/// Settled result of one ingest
#[derive(Debug, Default)]
pub struct Batch {
    pub studies: StudyDictionary,
    pub ignored: Vec<IgnoredFile>,
    /// Directory index files seen (and skipped)
    pub directory_files: Vec<String>,
}

impl Batch {
    fn ignore(&mut self, name: String, reason: String) {
        warn!("Ignoring {}: {}", name, reason);
        self.ignored.push(IgnoredFile { name, reason });
    }

    /// Single registration point for one parsed file
    fn accept(&mut self, name: String, outcome: std::result::Result<ParseOutcome, ParseFailure>) {
        match outcome {
            Ok(ParseOutcome::File(parsed)) => match self.studies.register(&name, parsed) {
                Ok(()) => debug!("Registered {}", name),
                Err(e) => self.ignore(name, e.to_string()),
            },
            Ok(ParseOutcome::DirectoryIndex) => {
                debug!("Skipping directory index {}", name);
                self.directory_files.push(name);
            }
            Err(failure) => self.ignore(name, failure.to_string()),
        }
    }
}

/// Reads, parses and registers every file concurrently
///
/// Per-file failures never abort the batch; they end up in
/// [`Batch::ignored`] with their reason.
///
/// # Arguments
///
/// * `files` - Named byte streams to ingest
pub async fn ingest<R>(files: Vec<SourceFile<R>>) -> Batch
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let shared = Arc::new(Mutex::new(Batch::default()));
    let total = files.len();

    let mut tasks = Vec::with_capacity(total);
    for file in files {
        let name = file.name.clone();
        let batch = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            let SourceFile { name, mut reader } = file;
            let mut buffer = Vec::new();
            if let Err(e) = reader.read_to_end(&mut buffer).await {
                batch.lock().await.ignore(name, format!("IO error: {}", e));
                return;
            }

            // Parse outside of the lock
            let outcome = parse_bytes(&buffer);

            batch.lock().await.accept(name, outcome);
        });
        tasks.push((name, task));
    }

    for (name, task) in tasks {
        if let Err(e) = task.await {
            shared
                .lock()
                .await
                .ignore(name, format!("Task failed: {}", e));
        }
    }

    let batch = match Arc::try_unwrap(shared) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => {
            let mut guard = shared.lock().await;
            std::mem::take(&mut *guard)
        }
    };
    info!(
        "Ingested {} files: {} instances in {} studies, {} ignored",
        total,
        batch.studies.instance_count(),
        batch.studies.len(),
        batch.ignored.len()
    );
    batch
}

/// Ingests files and, recursively, the contents of directories
///
/// # Errors
///
/// Returns an I/O error if one of `paths` (or a directory below it) cannot
/// be listed. Files that cannot be opened are ignored instead.
pub async fn ingest_paths(paths: &[PathBuf]) -> Result<Batch> {
    let mut files = Vec::new();
    for path in paths {
        collect_files(path, &mut files).await?;
    }

    let mut sources = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for path in files {
        match SourceFile::<File>::open(&path).await {
            Ok(source) => sources.push(source),
            Err(e) => unreadable.push(IgnoredFile {
                name: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let mut batch = ingest(sources).await;
    for ignored in unreadable {
        batch.ignore(ignored.name, ignored.reason);
    }
    Ok(batch)
}

async fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !fs::metadata(path).await?.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(entry_path);
            } else {
                found.push(entry_path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(())
}
