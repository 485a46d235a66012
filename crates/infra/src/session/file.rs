//! JSON file session store
//!
//! The whole session is rewritten on every save: the new contents go to a
//! sibling temporary file that is then renamed over the old one. On Unix the
//! file is created readable by the owner only.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use moneybird_core::SessionStore;
use moneybird_domain::{MoneybirdError, Result, SessionState};
use tracing::debug;

use crate::errors::InfraError;

/// Session persisted as a JSON document.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no session file yet");
            return Ok(SessionState::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(io_error)?;
        if contents.trim().is_empty() {
            return Ok(SessionState::default());
        }

        serde_json::from_str(&contents).map_err(|err| {
            MoneybirdError::Storage(format!(
                "session file {} is not valid JSON: {err}",
                self.path.display()
            ))
        })
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let temp_path = self.temp_path();
        write_private(&temp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .map_err(io_error)?;

        debug!(path = %self.path.display(), stage = %state.stage(), "session saved");
        Ok(())
    }
}

fn io_error(err: std::io::Error) -> MoneybirdError {
    InfraError::from(err).into()
}

fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
