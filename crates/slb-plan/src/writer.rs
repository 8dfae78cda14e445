//! Script persistence
//!
//! Both scripts of a run land in `<root>/build-<ddmmyyHHMMSS>/` or not at
//! all: they are written into a hidden staging directory next to the
//! destination which is then renamed into place.

use crate::render::{ScriptSet, DISABLE_SCRIPT, ENABLE_SCRIPT};
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Timestamp format of build directory names
pub const BUILD_DIR_FORMAT: &str = "%d%m%y%H%M%S";

/// Script writing errors
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Filesystem operation failed
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A build directory with the same timestamp already exists
    #[error("build directory already exists: {0}")]
    Exists(PathBuf),
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes script sets under a root directory
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    root: PathBuf,
}

impl ScriptWriter {
    /// Create writer for `root` (created on demand)
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build directory for a timestamp
    #[must_use]
    pub fn build_dir<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.root.join(format!("build-{}", at.format(BUILD_DIR_FORMAT)))
    }

    /// Write both scripts stamped with the current local time
    pub fn write_now(&self, scripts: &ScriptSet) -> Result<PathBuf, WriteError> {
        self.write(scripts, &Local::now())
    }

    /// Write both scripts into the build directory for `at`
    ///
    /// Returns the build directory.
    pub fn write<Tz: TimeZone>(&self, scripts: &ScriptSet, at: &DateTime<Tz>) -> Result<PathBuf, WriteError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let target = self.build_dir(at);
        if target.exists() {
            return Err(WriteError::Exists(target));
        }

        fs::create_dir_all(&self.root).map_err(|e| WriteError::io(&self.root, e))?;

        let staging = self.staging_dir(&target);
        let result = stage(&staging, scripts)
            .and_then(|()| fs::rename(&staging, &target).map_err(|e| WriteError::io(&target, e)));

        if let Err(e) = result {
            if staging.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    warn!(path = %staging.display(), error = %cleanup, "failed to remove staging directory");
                }
            }
            return Err(e);
        }

        info!("done - scripts built in {}", target.display());
        Ok(target)
    }

    fn staging_dir(&self, target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.root.join(format!(".{name}.{}.tmp", std::process::id()))
    }
}

fn stage(staging: &Path, scripts: &ScriptSet) -> Result<(), WriteError> {
    fs::create_dir(staging).map_err(|e| WriteError::io(staging, e))?;

    for (name, contents) in [(DISABLE_SCRIPT, &scripts.disable), (ENABLE_SCRIPT, &scripts.enable)] {
        let path = staging.join(name);
        fs::write(&path, contents).map_err(|e| WriteError::io(&path, e))?;
    }

    Ok(())
}
