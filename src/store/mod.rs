//! Backends that persist [`BoosterPrefs`] into the FileWave client configuration.

mod property_list;
#[cfg(windows)]
mod registry;

pub use self::property_list::PlistStore;
#[cfg(windows)]
pub use self::registry::RegistryStore;

use crate::config::Settings;
use crate::error::Result;
use crate::prefs::BoosterPrefs;

/// Where the client reads its booster preferences from.
pub trait ConfigStore {
    /// Human-readable location of the store, for logs.
    fn describe(&self) -> String;

    /// Writes every preference field. On error the previous configuration is
    /// left as it was.
    fn apply(&self, prefs: &BoosterPrefs) -> Result<()>;

    /// Reads the preference fields back.
    fn read(&self) -> Result<BoosterPrefs>;
}

/// The store used by the client on this platform.
#[cfg(windows)]
pub fn for_platform(settings: &Settings) -> Box<dyn ConfigStore> {
    Box::new(RegistryStore::local_machine(settings.registry_key.clone()))
}

/// The store used by the client on this platform.
#[cfg(not(windows))]
pub fn for_platform(settings: &Settings) -> Box<dyn ConfigStore> {
    Box::new(PlistStore::new(settings.plist_path.clone()))
}
