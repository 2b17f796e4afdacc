use std::collections::HashMap;
use std::fmt;

use crate::config::booster;
use crate::error::{Error, Result};

/// How a preference field is stored by a config backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Host names (`booster1`, ...).
    Text,
    /// Ports (`booster1Port`, `booster1PublishPort`, ...).
    Number,
    /// On/off switches (`boosterRouting`).
    Flag,
}

/// A single typed preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    Text(String),
    Number(u32),
    Flag(bool),
}

impl PrefValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            PrefValue::Text(_) => FieldKind::Text,
            PrefValue::Number(_) => FieldKind::Number,
            PrefValue::Flag(_) => FieldKind::Flag,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Text(s) => write!(f, "{}", s),
            PrefValue::Number(n) => write!(f, "{}", n),
            PrefValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// A named preference value as written to the client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefField {
    pub name: String,
    pub value: PrefValue,
}

impl PrefField {
    fn new(name: impl Into<String>, value: PrefValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One booster host with the port the client should use for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoosterSlot {
    pub host: String,
    pub port: u32,
}

impl BoosterSlot {
    /// The "no booster" sentinel.
    pub fn unset() -> Self {
        Self {
            host: booster::UNSET_HOST.to_string(),
            port: booster::UNSET_PORT,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.host == booster::UNSET_HOST && self.port == booster::UNSET_PORT
    }
}

/// The booster preferences for the FileWave client.
///
/// The record always carries every field of the schema: slots without a
/// booster hold [`BoosterSlot::unset`], and the publish port is only set when
/// slot 1 holds a booster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoosterPrefs {
    pub slots: [BoosterSlot; booster::SLOTS],
    pub publish_port: u32,
    pub routing: bool,
}

impl Default for BoosterPrefs {
    fn default() -> Self {
        Self::cleared()
    }
}

impl BoosterPrefs {
    /// Preferences with every booster slot unset.
    pub fn cleared() -> Self {
        Self {
            slots: std::array::from_fn(|_| BoosterSlot::unset()),
            publish_port: booster::UNSET_PORT,
            routing: booster::ROUTING,
        }
    }

    /// Preferences for a location's booster list, in list order.
    ///
    /// `None` means the IP matched no location; the result is then the cleared
    /// baseline.
    pub fn configure(boosters: Option<&[String]>) -> Self {
        let mut prefs = Self::cleared();

        let Some(boosters) = boosters else {
            log::info!("No mapped boosters");
            return prefs;
        };

        if boosters.len() > booster::SLOTS {
            log::warn!(
                "{} boosters mapped but only {} slots exist; ignoring {}",
                boosters.len(),
                booster::SLOTS,
                boosters[booster::SLOTS..].join(", ")
            );
        }

        for (slot, host) in prefs.slots.iter_mut().zip(boosters) {
            *slot = BoosterSlot {
                host: host.clone(),
                port: booster::PORT,
            };
        }
        if !boosters.is_empty() {
            prefs.publish_port = booster::PUBLISH_PORT;
        }

        prefs
    }

    /// Number of slots holding a booster.
    pub fn booster_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_unset()).count()
    }

    /// Every field name with its kind, in the order they are written.
    pub fn schema() -> Vec<(String, FieldKind)> {
        let mut schema = Vec::with_capacity(booster::SLOTS * 2 + 2);
        for i in 1..=booster::SLOTS {
            schema.push((host_key(i), FieldKind::Text));
            schema.push((port_key(i), FieldKind::Number));
            if i == 1 {
                schema.push((PUBLISH_PORT_KEY.to_string(), FieldKind::Number));
            }
        }
        schema.push((ROUTING_KEY.to_string(), FieldKind::Flag));
        schema
    }

    /// Flattens the record into typed fields, in [`schema`](Self::schema) order.
    pub fn fields(&self) -> Vec<PrefField> {
        let mut fields = Vec::with_capacity(booster::SLOTS * 2 + 2);
        for (idx, slot) in self.slots.iter().enumerate() {
            let i = idx + 1;
            fields.push(PrefField::new(host_key(i), PrefValue::Text(slot.host.clone())));
            fields.push(PrefField::new(port_key(i), PrefValue::Number(slot.port)));
            if i == 1 {
                fields.push(PrefField::new(
                    PUBLISH_PORT_KEY,
                    PrefValue::Number(self.publish_port),
                ));
            }
        }
        fields.push(PrefField::new(ROUTING_KEY, PrefValue::Flag(self.routing)));
        fields
    }

    /// Rebuilds a record from typed fields.
    ///
    /// Every schema field must be present with its declared kind; unknown
    /// fields are ignored.
    pub fn from_fields<I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = PrefField>,
    {
        let mut by_name: HashMap<String, PrefValue> = fields
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect();

        let mut take = |name: &str, expected: FieldKind| -> Result<PrefValue> {
            let value = by_name
                .remove(name)
                .ok_or_else(|| Error::MissingField(name.to_string()))?;
            if value.kind() != expected {
                return Err(Error::FieldType {
                    name: name.to_string(),
                    expected,
                });
            }
            Ok(value)
        };

        let mut prefs = Self::cleared();
        for (idx, slot) in prefs.slots.iter_mut().enumerate() {
            let i = idx + 1;
            if let PrefValue::Text(host) = take(host_key(i).as_str(), FieldKind::Text)? {
                slot.host = host;
            }
            if let PrefValue::Number(port) = take(port_key(i).as_str(), FieldKind::Number)? {
                slot.port = port;
            }
        }
        if let PrefValue::Number(port) = take(PUBLISH_PORT_KEY, FieldKind::Number)? {
            prefs.publish_port = port;
        }
        if let PrefValue::Flag(routing) = take(ROUTING_KEY, FieldKind::Flag)? {
            prefs.routing = routing;
        }

        Ok(prefs)
    }
}

const PUBLISH_PORT_KEY: &str = "booster1PublishPort";
const ROUTING_KEY: &str = "boosterRouting";

fn host_key(i: usize) -> String {
    format!("booster{}", i)
}

fn port_key(i: usize) -> String {
    format!("booster{}Port", i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order() {
        let names: Vec<String> = BoosterPrefs::schema().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "booster1",
                "booster1Port",
                "booster1PublishPort",
                "booster2",
                "booster2Port",
                "booster3",
                "booster3Port",
                "booster4",
                "booster4Port",
                "booster5",
                "booster5Port",
                "boosterRouting",
            ]
        );
    }

    #[test]
    fn test_fields_follow_schema() {
        let prefs = BoosterPrefs::configure(Some(&["a.example.com".to_string()][..]));
        let schema = BoosterPrefs::schema();
        let fields = prefs.fields();
        assert_eq!(fields.len(), schema.len());
        for (field, (name, kind)) in fields.iter().zip(schema) {
            assert_eq!(field.name, name);
            assert_eq!(field.value.kind(), kind);
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(PrefValue::Text("b1.example.com".into()).to_string(), "b1.example.com");
        assert_eq!(PrefValue::Number(20013).to_string(), "20013");
        assert_eq!(PrefValue::Flag(true).to_string(), "true");
    }
}
