//! [`Session`] — the process-wide holder of the current project.

use std::path::PathBuf;

use folio_core::event::ProjectEvent;
use tokio::sync::broadcast;

use crate::{Error, Project, ProjectLayout, Result};

/// Events buffered per subscriber before slow receivers start lagging.
const EVENT_CAPACITY: usize = 64;

/// At most one open [`Project`], plus the event channel that outlives it.
///
/// Subscribers obtained from [`Session::subscribe`] keep receiving events
/// across project switches.
pub struct Session {
  events:  broadcast::Sender<ProjectEvent>,
  project: Option<Project>,
}

impl Default for Session {
  fn default() -> Self { Self::new() }
}

impl Session {
  pub fn new() -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self { events, project: None }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> { self.events.subscribe() }

  /// Create a project at `root` and make it current, closing any project
  /// that was open.
  pub async fn create_project(
    &mut self,
    root: impl Into<PathBuf>,
    layout: ProjectLayout,
  ) -> Result<&Project> {
    self.close_project();
    let project = Project::create(root, layout, self.events.clone()).await?;
    Ok(&*self.project.insert(project))
  }

  /// Open the project at `root` and make it current, closing any project
  /// that was open.
  pub async fn open_project(
    &mut self,
    root: impl Into<PathBuf>,
    layout: ProjectLayout,
  ) -> Result<&Project> {
    self.close_project();
    let project = Project::open(root, layout, self.events.clone()).await?;
    Ok(&*self.project.insert(project))
  }

  /// Close the current project. Returns `false` if none was open.
  pub fn close_project(&mut self) -> bool {
    match self.project.take() {
      Some(project) => {
        project.close();
        true
      }
      None => false,
    }
  }

  /// The current project, or [`Error::NoProjectOpen`].
  pub fn project(&self) -> Result<&Project> { self.project.as_ref().ok_or(Error::NoProjectOpen) }

  pub fn is_open(&self) -> bool { self.project.is_some() }
}
