//! Per-job working directories.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};

/// A uniquely named directory under the storage root, owned by one job.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, including on early return and unwinding. [`CureWorkspace::close`]
/// does the same but reports failures.
#[derive(Debug)]
pub struct CureWorkspace {
    dir: TempDir,
}

impl CureWorkspace {
    /// Create a fresh workspace under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> WorkerResult<Self> {
        std::fs::create_dir_all(root).map_err(WorkerError::Workspace)?;
        let dir = Builder::new()
            .prefix("cure-")
            .tempdir_in(root)
            .map_err(WorkerError::Workspace)?;
        debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a new empty subdirectory for one URL's downloads.
    pub fn url_dir(&self) -> WorkerResult<PathBuf> {
        let dir = self.dir.path().join(Uuid::new_v4().to_string());
        std::fs::create_dir(&dir).map_err(WorkerError::Workspace)?;
        Ok(dir)
    }

    /// Remove the workspace now.
    pub fn close(self) -> WorkerResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(WorkerError::Workspace)?;
        debug!("Removed workspace {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_workspace_is_created_under_root() {
        let root = tempfile::tempdir().unwrap();
        let workspace = CureWorkspace::create(root.path()).unwrap();
        assert!(workspace.path().starts_with(root.path()));
        assert!(workspace
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("cure-"));
    }

    #[test]
    fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let workspace = CureWorkspace::create(&nested).unwrap();
        assert!(workspace.path().is_dir());
    }

    #[test]
    fn test_workspaces_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let a = CureWorkspace::create(root.path()).unwrap();
        let b = CureWorkspace::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.url_dir().unwrap(), a.url_dir().unwrap());
    }

    #[test]
    fn test_drop_removes_contents() {
        let root = tempfile::tempdir().unwrap();
        {
            let workspace = CureWorkspace::create(root.path()).unwrap();
            let url_dir = workspace.url_dir().unwrap();
            std::fs::write(url_dir.join("output00001.mp4"), b"x").unwrap();
        }
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn test_close_removes_contents() {
        let root = tempfile::tempdir().unwrap();
        let workspace = CureWorkspace::create(root.path()).unwrap();
        std::fs::write(workspace.url_dir().unwrap().join("a.webm"), b"x").unwrap();
        workspace.close().unwrap();
        assert_eq!(entries(root.path()), 0);
    }
}
