use windows_registry::{Key, LOCAL_MACHINE};

use crate::error::{Error, Result};
use crate::prefs::{BoosterPrefs, FieldKind, PrefField, PrefValue};
use crate::store::ConfigStore;

/// The Windows client's registry key.
///
/// `Text` fields are `REG_SZ`; `Number` and `Flag` fields are `REG_DWORD`
/// (flags as 1/0).
pub struct RegistryStore {
    root: &'static Key,
    path: String,
}

impl RegistryStore {
    pub fn new(root: &'static Key, path: impl Into<String>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    /// The key under `HKEY_LOCAL_MACHINE`.
    pub fn local_machine(path: impl Into<String>) -> Self {
        Self::new(LOCAL_MACHINE, path)
    }

    fn open_for_write(&self) -> Result<Key> {
        // The client installer owns the key; don't create it if it's missing.
        self.root.open(&self.path).map_err(|e| self.error(e))?;
        self.root.create(&self.path).map_err(|e| self.error(e))
    }

    fn error(&self, e: impl std::fmt::Display) -> Error {
        Error::Registry(format!("{}: {}", self.path, e))
    }
}

impl ConfigStore for RegistryStore {
    fn describe(&self) -> String {
        format!("registry key {}", self.path)
    }

    fn apply(&self, prefs: &BoosterPrefs) -> Result<()> {
        let key = self.open_for_write()?;
        for field in prefs.fields() {
            let name = field.name.as_str();
            let written = match &field.value {
                PrefValue::Text(s) => key.set_string(name, s.as_str()),
                PrefValue::Number(n) => key.set_u32(name, *n),
                PrefValue::Flag(b) => key.set_u32(name, u32::from(*b)),
            };
            written.map_err(|e| self.error(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }

    fn read(&self) -> Result<BoosterPrefs> {
        let key = self.root.open(&self.path).map_err(|e| self.error(e))?;

        let mut fields = Vec::new();
        for (name, kind) in BoosterPrefs::schema() {
            let value = match kind {
                FieldKind::Text => key.get_string(&name).map(PrefValue::Text),
                FieldKind::Number => key.get_u32(&name).map(PrefValue::Number),
                FieldKind::Flag => key.get_u32(&name).map(|n| PrefValue::Flag(n != 0)),
            };
            let value = value.map_err(|e| self.error(format!("{}: {}", name, e)))?;
            fields.push(PrefField { name, value });
        }

        BoosterPrefs::from_fields(fields)
    }
}
