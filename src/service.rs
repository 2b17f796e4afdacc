use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Restarts the FileWave client so it picks up new preferences.
pub trait ClientService {
    fn restart(&self) -> Result<()>;
}

/// The Windows client service, bounced with `net stop` / `net start`.
#[derive(Debug, Clone)]
pub struct WindowsService {
    pub name: String,
}

impl ClientService for WindowsService {
    fn restart(&self) -> Result<()> {
        run_logged(Command::new("net").args([OsStr::new("stop"), OsStr::new(&self.name)]))?;
        run_logged(Command::new("net").args([OsStr::new("start"), OsStr::new(&self.name)]))?;
        Ok(())
    }
}

/// The macOS client, restarted through `fwcontrol client restart`.
#[derive(Debug, Clone)]
pub struct Fwcontrol {
    pub path: PathBuf,
}

impl ClientService for Fwcontrol {
    fn restart(&self) -> Result<()> {
        let output = run_logged(Command::new(&self.path).args(["client", "restart"]))?;
        log::info!(
            "Client restart status:\n{}",
            String::from_utf8_lossy(&output.stdout).trim_end()
        );
        Ok(())
    }
}

/// The client control for this platform.
#[cfg(windows)]
pub fn for_platform(settings: &Settings) -> Box<dyn ClientService> {
    Box::new(WindowsService {
        name: settings.service_name.clone(),
    })
}

/// The client control for this platform.
#[cfg(not(windows))]
pub fn for_platform(settings: &Settings) -> Box<dyn ClientService> {
    Box::new(Fwcontrol {
        path: settings.fwcontrol_path.clone(),
    })
}

/// Runs a command to completion and logs how it went.
///
/// A non-zero exit is only logged; failing to start the command is an error.
pub fn run_logged(command: &mut Command) -> Result<Output> {
    let shown = format!("{:?}", command);
    log::debug!("Running {}", shown);

    let output = command.output().map_err(|source| Error::Command {
        command: shown.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.success() {
        log::debug!("{} exited with {}", shown, output.status);
    } else {
        log::warn!("{} exited with {}", shown, output.status);
    }
    if !stdout.trim().is_empty() {
        log::debug!("{} stdout:\n{}", shown, stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        log::warn!("{} stderr:\n{}", shown, stderr.trim_end());
    }

    Ok(output)
}
