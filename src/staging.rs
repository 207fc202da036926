use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Collects a stage's artifacts beside their destinations and moves them into
/// place together once every artifact has been produced.
///
/// Dropping an uncommitted stage removes whatever it staged.
pub struct Staging {
    name: String,
    dirs: Vec<PathBuf>,
    entries: Vec<(PathBuf, PathBuf)>,
    committed: bool,
}

impl Staging {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dirs: Vec::new(),
            entries: Vec::new(),
            committed: false,
        }
    }

    /// Reserves a staged path for `target`, keeping its file name and extension.
    pub fn stage(&mut self, target: &Path) -> Result<PathBuf> {
        let file_name = target.file_name().ok_or_else(|| {
            Error::output_write(
                target,
                io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
            )
        })?;
        let parent = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let dir = parent.join(format!(".{}-staging", self.name));
        if !self.dirs.contains(&dir) {
            match fs::create_dir(&dir) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(Error::output_write(&dir, err)),
            }
            self.dirs.push(dir.clone());
        }

        let staged = dir.join(file_name);
        self.entries.push((staged.clone(), target.to_path_buf()));
        Ok(staged)
    }

    /// Moves every staged artifact onto its target.
    ///
    /// Existing targets are set aside first. If any move fails, the artifacts
    /// installed so far are removed and the previous targets are put back.
    pub fn commit(mut self) -> Result<()> {
        let mut backups = Vec::new();
        for (staged, target) in &self.entries {
            if !target.exists() {
                continue;
            }
            let backup = backup_path(staged);
            if let Err(err) = fs::rename(target, &backup) {
                restore(&backups);
                return Err(Error::output_write(target, err));
            }
            backups.push((backup, target.clone()));
        }

        let mut installed = Vec::new();
        for (staged, target) in &self.entries {
            if let Err(err) = fs::rename(staged, target) {
                for installed in installed {
                    let _ = fs::remove_file(installed);
                }
                restore(&backups);
                return Err(Error::output_write(target, err));
            }
            installed.push(target);
        }

        for (backup, _) in &backups {
            let _ = fs::remove_file(backup);
        }
        for (_, target) in &self.entries {
            info!(path = %target.display(), "Wrote artifact");
        }
        self.committed = true;
        self.remove_dirs();
        Ok(())
    }

    fn remove_dirs(&self) {
        for dir in &self.dirs {
            if let Err(err) = fs::remove_dir(dir) {
                debug!(path = %dir.display(), %err, "Staging directory left behind");
            }
        }
    }
}

fn backup_path(staged: &Path) -> PathBuf {
    let mut name = staged.file_name().unwrap_or_default().to_os_string();
    name.push(".previous");
    staged.with_file_name(name)
}

fn restore(backups: &[(PathBuf, PathBuf)]) {
    for (backup, target) in backups {
        if let Err(err) = fs::rename(backup, target) {
            warn!(
                path = %target.display(),
                backup = %backup.display(),
                %err,
                "Unable to restore previous artifact"
            );
        }
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (staged, _) in &self.entries {
            let _ = fs::remove_file(staged);
        }
        self.remove_dirs();
    }
}
