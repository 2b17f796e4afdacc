use std::path::PathBuf;

use thiserror::Error;

use crate::prefs::FieldKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unable to resolve {host}: {source}")]
    RendezvousLookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to reach {host} on port {port}: {source}")]
    RendezvousUnreachable {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read booster map {}: {source}", .path.display())]
    MapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed booster map: {0}")]
    MapParse(#[from] serde_json::Error),

    #[error("Preference field {0} is missing")]
    MissingField(String),

    #[error("Preference field {name} should be {expected:?}")]
    FieldType { name: String, expected: FieldKind },

    #[error("Plist error: {0}")]
    Plist(#[from] plist::Error),

    #[error("Plist {} has no top-level dictionary", .0.display())]
    PlistRoot(PathBuf),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Command {command} could not be run: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
