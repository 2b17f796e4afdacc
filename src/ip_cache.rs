use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::atomic_file;

/// Outcome of comparing the current IP with the cached one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpChange {
    Unchanged,
    /// `previous` is `None` when nothing was cached yet.
    Changed { previous: Option<String> },
}

impl IpChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, IpChange::Changed { .. })
    }
}

/// Last-seen IP, kept as a single line in a text file.
#[derive(Debug, Clone)]
pub struct IpCache {
    path: PathBuf,
}

impl IpCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached IP, or `None` if the file is missing or blank.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .next()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Compares `current_ip` with the cache and stores `current_ip`.
    pub fn check_and_update(&self, current_ip: &str) -> Result<IpChange> {
        let previous = self.load()?;
        self.store(current_ip)?;

        if previous.as_deref() == Some(current_ip) {
            Ok(IpChange::Unchanged)
        } else {
            log::debug!("IP changed from {:?} to {}", previous, current_ip);
            Ok(IpChange::Changed { previous })
        }
    }

    /// Puts back the value returned by a previous `check_and_update`.
    pub fn restore(&self, previous: Option<&str>) -> Result<()> {
        match previous {
            Some(ip) => self.store(ip),
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }

    fn store(&self, ip: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        atomic_file::write(&self.path, format!("{}\n", ip).as_bytes())
    }
}
