use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rwgt_core::errors::{ErrorInfo, RwgtError};

fn io_error(code: &str, path: &Path, err: std::io::Error) -> RwgtError {
    RwgtError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Scratch directory shared by all evaluation passes of a session.
///
/// Each row gets its own sub-directory, so artefacts of one pass never
/// overwrite those of another. The workspace only ever deletes its own
/// `pass_NNN` directories, and the root only when it created the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    created_root: bool,
}

impl Workspace {
    /// Parameter card file name inside a pass directory.
    pub const CARD_FILE: &'static str = "param_card.dat";

    /// Creates the workspace root if necessary. An existing directory is
    /// used as is and never removed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, RwgtError> {
        let root = root.into();
        let created_root = !root.exists();
        fs::create_dir_all(&root).map_err(|err| io_error("workspace-create", &root, err))?;
        Ok(Self { root, created_root })
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory reserved for evaluation row `row`; passes are numbered from one.
    pub fn pass_dir(&self, row: usize) -> PathBuf {
        self.root.join(format!("pass_{:03}", row + 1))
    }

    /// Creates and returns the directory of row `row`, removing stale content.
    pub fn prepare_pass(&self, row: usize) -> Result<PathBuf, RwgtError> {
        let dir = self.pass_dir(row);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|err| io_error("workspace-clean", &dir, err))?;
        }
        fs::create_dir_all(&dir).map_err(|err| io_error("workspace-create", &dir, err))?;
        Ok(dir)
    }

    /// Path of the rendered parameter card for row `row`.
    pub fn card_path(&self, row: usize) -> PathBuf {
        self.pass_dir(row).join(Self::CARD_FILE)
    }

    /// Deletes the pass directories of rows `0..rows`.
    ///
    /// The root itself is removed only when this workspace created it and
    /// nothing else was left inside it.
    pub fn remove(self, rows: usize) -> Result<(), RwgtError> {
        debug!("removing {rows} pass directories from {}", self.root.display());
        for row in 0..rows {
            let dir = self.pass_dir(row);
            if dir.exists() {
                fs::remove_dir_all(&dir).map_err(|err| io_error("workspace-remove", &dir, err))?;
            }
        }
        if !self.created_root {
            return Ok(());
        }
        let mut entries =
            fs::read_dir(&self.root).map_err(|err| io_error("workspace-remove", &self.root, err))?;
        if entries.next().is_none() {
            fs::remove_dir(&self.root).map_err(|err| io_error("workspace-remove", &self.root, err))?;
        } else {
            debug!("workspace {} holds other files; keeping it", self.root.display());
        }
        Ok(())
    }
}
