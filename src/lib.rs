pub mod config;
pub mod error;
pub mod logging;
pub mod ip_resolver;
pub mod ip_cache;
pub mod booster_map;
pub mod prefs;
pub mod store;
pub mod service;
pub mod selector;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use selector::{BoosterSelector, Outcome};

/// Run the selector once for this platform.
pub fn run(settings: &Settings) -> Result<Outcome> {
    BoosterSelector::from_settings(settings).run()
}
