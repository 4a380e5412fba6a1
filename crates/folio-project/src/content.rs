//! [`ContentStore`] — async access to the content files under a project root.

use std::{
  io,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use folio_core::details::FileStat;
use tokio::{fs, io::AsyncWriteExt as _};

/// Outcome of reading an entity's content file.
#[derive(Debug)]
pub enum Loaded {
  Read { text: String, stat: FileStat },
  Missing,
  /// The file is there but could not be read. The error is kept so the two
  /// degraded outcomes can be told apart in logs.
  Unreadable(io::Error),
}

/// Filesystem access scoped to one project root.
#[derive(Debug, Clone)]
pub struct ContentStore {
  root: PathBuf,
}

impl ContentStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Absolute form of a project-relative path. Absolute inputs are returned
  /// unchanged.
  pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf { self.root.join(path) }

  /// Current size and mtime of `path`, or `None` if nothing is there.
  pub async fn stat(&self, path: &Path) -> io::Result<Option<FileStat>> {
    match fs::metadata(path).await {
      Ok(meta) => Ok(Some(file_stat(&meta)?)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Read `path` as text, capturing its mtime at the moment of reading.
  ///
  /// Invalid UTF-8 is replaced rather than treated as a read failure.
  pub async fn load(&self, path: &Path) -> Loaded {
    let meta = match fs::metadata(path).await {
      Ok(meta) => meta,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Loaded::Missing,
      Err(e) => return Loaded::Unreadable(e),
    };
    let stat = match file_stat(&meta) {
      Ok(stat) => stat,
      Err(e) => return Loaded::Unreadable(e),
    };
    match fs::read(path).await {
      Ok(bytes) => Loaded::Read {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        stat,
      },
      Err(e) if e.kind() == io::ErrorKind::NotFound => Loaded::Missing,
      Err(e) => Loaded::Unreadable(e),
    }
  }

  /// Write `contents` to `path`, creating parent directories. An existing
  /// file is left untouched; returns whether a file was written.
  pub async fn create_file(&self, path: &Path, contents: &str) -> io::Result<bool> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }
    let mut file = match fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(path)
      .await
    {
      Ok(file) => file,
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
      Err(e) => return Err(e),
    };
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(true)
  }

  /// Remove a file. Already gone is fine.
  pub async fn remove_file(&self, path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }

  /// Remove a directory and everything below it. Already gone is fine.
  pub async fn remove_dir(&self, path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path).await {
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}

fn file_stat(meta: &std::fs::Metadata) -> io::Result<FileStat> {
  Ok(FileStat {
    mtime: DateTime::<Utc>::from(meta.modified()?),
    len:   meta.len(),
  })
}
