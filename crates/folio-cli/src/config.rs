//! `folio.toml` plus `FOLIO_*` environment overrides.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use folio_project::ProjectLayout;
use serde::Deserialize;

/// Shape of the merged configuration.
#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
  /// Project directory used when `--project` is not given.
  #[serde(default)]
  pub project: Option<PathBuf>,
  #[serde(default)]
  pub layout:  ProjectLayout,
}

impl CliConfig {
  /// Read `path` if it exists, then layer `FOLIO_*` variables on top
  /// (`FOLIO_PROJECT`, `FOLIO_LAYOUT__WORLD_DIR`, ...).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }

  /// The project root: the command line wins over the config.
  pub fn project_root(&self, cli: Option<&Path>) -> Option<PathBuf> {
    cli
      .map(Path::to_path_buf)
      .or_else(|| self.project.clone())
      .map(|p| expand_tilde(&p))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> CliConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn partial_layout_keeps_defaults() {
    let cfg = parse(
      r#"
        project = "/books/saga"

        [layout]
        world_dir = "lore"
      "#,
    );
    assert_eq!(cfg.project, Some(PathBuf::from("/books/saga")));
    assert_eq!(cfg.layout.world_dir, PathBuf::from("lore"));
    assert_eq!(cfg.layout.narrative_dir, PathBuf::from("narrative"));
    assert_eq!(cfg.layout.database_file, PathBuf::from("project.sqlite"));
  }

  #[test]
  fn empty_config_is_all_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.project, None);
    assert_eq!(cfg.layout, ProjectLayout::default());
  }

  #[test]
  fn command_line_project_wins() {
    let cfg = parse(r#"project = "/from/config""#);
    assert_eq!(
      cfg.project_root(Some(Path::new("/from/cli"))),
      Some(PathBuf::from("/from/cli"))
    );
    assert_eq!(cfg.project_root(None), Some(PathBuf::from("/from/config")));
  }

  #[test]
  fn tilde_expands_only_as_prefix() {
    let plain = Path::new("/abs/~/x");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/novel")), PathBuf::from(home).join("novel"));
    }
  }
}
