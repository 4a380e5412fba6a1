//! Error type for `folio-project`.

use std::path::PathBuf;

use folio_core::entity::EntityRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A validation failure the caller should show to the user.
  #[error(transparent)]
  Core(folio_core::Error),

  #[error("store error: {0}")]
  Store(folio_store_sqlite::Error),

  #[error("i/o error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{} is not a folio project: {} is missing", root.display(), missing.display())]
  InvalidProject { root: PathBuf, missing: PathBuf },

  #[error("a project already exists at {}", .0.display())]
  AlreadyExists(PathBuf),

  #[error("no project is open")]
  NoProjectOpen,

  #[error("{0} has no content file")]
  NoContentPath(EntityRef),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<folio_core::Error> for Error {
  fn from(e: folio_core::Error) -> Self { Self::Core(e) }
}

/// Domain failures raised inside the store surface as [`Error::Core`], so
/// callers match one variant whichever layer detected them.
impl From<folio_store_sqlite::Error> for Error {
  fn from(e: folio_store_sqlite::Error) -> Self {
    match e {
      folio_store_sqlite::Error::Core(core) => Self::Core(core),
      other => Self::Store(other),
    }
  }
}
