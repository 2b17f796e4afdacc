use std::path::PathBuf;

use plist::{Dictionary, Value};

use crate::error::{Error, Result};
use crate::prefs::{BoosterPrefs, FieldKind, PrefField, PrefValue};
use crate::store::ConfigStore;
use crate::utils::atomic_file;

/// `fwcld.plist`, the macOS client's property list.
///
/// The document is parsed, the booster keys of the root dictionary are set, and
/// the whole document is written back as XML through a temporary file. Every
/// other key is preserved.
#[derive(Debug, Clone)]
pub struct PlistStore {
    path: PathBuf,
}

impl PlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Value> {
        let doc = Value::from_file(&self.path)?;
        if doc.as_dictionary().is_none() {
            return Err(Error::PlistRoot(self.path.clone()));
        }
        Ok(doc)
    }
}

impl ConfigStore for PlistStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self, prefs: &BoosterPrefs) -> Result<()> {
        let mut doc = self.load()?;
        let dict = doc
            .as_dictionary_mut()
            .ok_or_else(|| Error::PlistRoot(self.path.clone()))?;

        for field in prefs.fields() {
            set_field(dict, field);
        }

        atomic_file::replace_with(&self.path, |out| Ok(doc.to_writer_xml(out)?))
    }

    fn read(&self) -> Result<BoosterPrefs> {
        let doc = self.load()?;
        let dict = doc
            .as_dictionary()
            .ok_or_else(|| Error::PlistRoot(self.path.clone()))?;

        let mut fields = Vec::new();
        for (name, kind) in BoosterPrefs::schema() {
            let Some(raw) = dict.get(&name) else {
                return Err(Error::MissingField(name));
            };
            let value = match kind {
                FieldKind::Text => raw.as_string().map(|s| PrefValue::Text(s.to_string())),
                FieldKind::Number => raw
                    .as_unsigned_integer()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(PrefValue::Number),
                FieldKind::Flag => raw.as_boolean().map(PrefValue::Flag),
            };
            match value {
                Some(value) => fields.push(PrefField { name, value }),
                None => return Err(Error::FieldType { name, expected: kind }),
            }
        }

        BoosterPrefs::from_fields(fields)
    }
}

fn set_field(dict: &mut Dictionary, field: PrefField) {
    if dict.contains_key(&field.name) {
        log::debug!("Setting {} = {}", field.name, field.value);
    } else {
        log::debug!("Adding missing key {} = {}", field.name, field.value);
    }
    let value = match field.value {
        PrefValue::Text(s) => Value::String(s),
        PrefValue::Number(n) => Value::Integer(u64::from(n).into()),
        PrefValue::Flag(b) => Value::Boolean(b),
    };
    dict.insert(field.name, value);
}
