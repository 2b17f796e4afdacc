//! Centralized configuration for file paths, addresses, and other static constants.
//!
//! The constants are the defaults; [`Settings`] carries the values actually used
//! by a run and can be overridden from the environment (or a `.env` file).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;

use crate::error::{Error, Result};

/// **File Paths:** where the selector keeps its state and finds the client config.
pub mod path {
    /// Directory holding the IP cache and the booster map.
    pub const BASE_DIR: &str = "/usr/local/sbin/matw_scripts/booster_selector";
    /// File name of the last-seen IP cache (inside `BASE_DIR`).
    pub const IP_CACHE_FILE: &str = "local_ip.txt";
    /// File name of the location → subnets/boosters map (inside `BASE_DIR`).
    pub const BOOSTER_MAP_FILE: &str = "booster_map.json";
    /// FileWave client property list on macOS.
    pub const FWCLD_PLIST: &str = "/usr/local/etc/fwcld.plist";
    /// Append-only log file.
    pub const LOG_FILE: &str = "/var/log/booster_selector.log";
}

/// **Rendezvous:** the host we connect to in order to learn our routable address.
pub mod rendezvous {
    /// FileWave admin server.
    pub const HOST: &str = "filewave-admin.matw.matthewsintl.com";
    /// FileWave admin port.
    pub const PORT: u16 = 20015;
    /// Connect timeout per resolved address (seconds).
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// **Booster Preferences:** fixed values written into the client configuration.
pub mod booster {
    /// Number of booster slots the client understands.
    pub const SLOTS: usize = 5;
    /// Host written into a slot with no booster.
    pub const UNSET_HOST: &str = "no.booster.set";
    /// Port written into a slot with no booster.
    pub const UNSET_PORT: u32 = 0;
    /// Port the client uses to talk to a booster.
    pub const PORT: u32 = 20013;
    /// Publish port, only meaningful for the first booster.
    pub const PUBLISH_PORT: u32 = 20003;
    /// Routing flag is always enabled.
    pub const ROUTING: bool = true;
}

/// **Client:** the FileWave client whose configuration we rewrite.
pub mod client {
    /// Registry key under `HKEY_LOCAL_MACHINE` on Windows.
    pub const REGISTRY_KEY: &str = r"Software\Wow6432Node\FileWave\WinClient";
    /// Windows service name.
    pub const SERVICE_NAME: &str = "FileWave Client";
    /// Control helper on macOS.
    pub const FWCONTROL: &str = "/usr/local/bin/fwcontrol";
}

/// **Environment Variables:** optional overrides for [`Settings`](super::Settings).
pub mod vars {
    pub const BASE_DIR: &str = "BOOSTER_SELECTOR_BASE_DIR";
    pub const IP_CACHE: &str = "BOOSTER_SELECTOR_IP_CACHE";
    pub const BOOSTER_MAP: &str = "BOOSTER_SELECTOR_BOOSTER_MAP";
    pub const PLIST: &str = "BOOSTER_SELECTOR_PLIST";
    pub const REGISTRY_KEY: &str = "BOOSTER_SELECTOR_REGISTRY_KEY";
    pub const SERVICE_NAME: &str = "BOOSTER_SELECTOR_SERVICE_NAME";
    pub const FWCONTROL: &str = "BOOSTER_SELECTOR_FWCONTROL";
    pub const LOG_FILE: &str = "BOOSTER_SELECTOR_LOG_FILE";
    pub const LOG_LEVEL: &str = "BOOSTER_SELECTOR_LOG_LEVEL";
    pub const RENDEZVOUS_HOST: &str = "BOOSTER_SELECTOR_RENDEZVOUS_HOST";
    pub const RENDEZVOUS_PORT: &str = "BOOSTER_SELECTOR_RENDEZVOUS_PORT";
    pub const CONNECT_TIMEOUT_SECS: &str = "BOOSTER_SELECTOR_CONNECT_TIMEOUT_SECS";

    /// Every override, for callers that need to clear them (tests).
    pub const ALL: &[&str] = &[
        BASE_DIR,
        IP_CACHE,
        BOOSTER_MAP,
        PLIST,
        REGISTRY_KEY,
        SERVICE_NAME,
        FWCONTROL,
        LOG_FILE,
        LOG_LEVEL,
        RENDEZVOUS_HOST,
        RENDEZVOUS_PORT,
        CONNECT_TIMEOUT_SECS,
    ];
}

/// Paths and addresses used by one run of the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rendezvous_host: String,
    pub rendezvous_port: u16,
    pub connect_timeout: Duration,
    pub ip_cache_path: PathBuf,
    pub booster_map_path: PathBuf,
    pub plist_path: PathBuf,
    pub registry_key: String,
    pub service_name: String,
    pub fwcontrol_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        let base = PathBuf::from(path::BASE_DIR);
        Self {
            rendezvous_host: rendezvous::HOST.to_string(),
            rendezvous_port: rendezvous::PORT,
            connect_timeout: Duration::from_secs(rendezvous::CONNECT_TIMEOUT_SECS),
            ip_cache_path: base.join(path::IP_CACHE_FILE),
            booster_map_path: base.join(path::BOOSTER_MAP_FILE),
            plist_path: PathBuf::from(path::FWCLD_PLIST),
            registry_key: client::REGISTRY_KEY.to_string(),
            service_name: client::SERVICE_NAME.to_string(),
            fwcontrol_path: PathBuf::from(client::FWCONTROL),
            log_path: PathBuf::from(path::LOG_FILE),
            log_level: LevelFilter::Debug,
        }
    }
}

impl Settings {
    /// Builds settings from the defaults, a `.env` file if present, and
    /// `BOOSTER_SELECTOR_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        // A new base dir moves both state files unless they are set explicitly.
        if let Some(base) = lookup(vars::BASE_DIR) {
            let base = PathBuf::from(base);
            settings.ip_cache_path = base.join(path::IP_CACHE_FILE);
            settings.booster_map_path = base.join(path::BOOSTER_MAP_FILE);
        }
        if let Some(v) = lookup(vars::IP_CACHE) {
            settings.ip_cache_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(vars::BOOSTER_MAP) {
            settings.booster_map_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(vars::PLIST) {
            settings.plist_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(vars::REGISTRY_KEY) {
            settings.registry_key = v;
        }
        if let Some(v) = lookup(vars::SERVICE_NAME) {
            settings.service_name = v;
        }
        if let Some(v) = lookup(vars::FWCONTROL) {
            settings.fwcontrol_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(vars::LOG_FILE) {
            settings.log_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(vars::LOG_LEVEL) {
            settings.log_level = v.trim().parse().map_err(|_| {
                Error::Config(format!("{} is not a log level: {}", vars::LOG_LEVEL, v))
            })?;
        }
        if let Some(v) = lookup(vars::RENDEZVOUS_HOST) {
            settings.rendezvous_host = v;
        }
        if let Some(v) = lookup(vars::RENDEZVOUS_PORT) {
            settings.rendezvous_port = v.trim().parse().map_err(|_| {
                Error::Config(format!("{} is not a port: {}", vars::RENDEZVOUS_PORT, v))
            })?;
        }
        if let Some(v) = lookup(vars::CONNECT_TIMEOUT_SECS) {
            let secs: u64 = v.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} is not a number of seconds: {}",
                    vars::CONNECT_TIMEOUT_SECS,
                    v
                ))
            })?;
            if secs == 0 {
                return Err(Error::Config(format!(
                    "{} must be greater than zero",
                    vars::CONNECT_TIMEOUT_SECS
                )));
            }
            settings.connect_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}
