use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Target, WriteStyle};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Sets up the global logger: append to the configured log file at the
/// configured level, with `RUST_LOG` applied on top.
///
/// Falls back to stderr if the log file cannot be opened.
pub fn init(settings: &Settings) -> Result<()> {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(settings.log_level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    let file_error = match open_append(&settings.log_path) {
        Ok(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
            None
        }
        Err(e) => Some(e),
    };

    builder
        .try_init()
        .map_err(|e| Error::Config(format!("logger already set: {}", e)))?;

    if let Some(e) = file_error {
        log::warn!(
            "Cannot open log file {}: {}; logging to stderr",
            settings.log_path.display(),
            e
        );
    }
    Ok(())
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
