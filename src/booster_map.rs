//! Location → subnets/boosters map, loaded from `booster_map.json`.
//!
//! ```json
//! {
//!     "HQ": { "subnets": ["10.1.", "10.2."], "boosters": ["b1.example.com"] }
//! }
//! ```
//!
//! Locations keep the order they are declared in the file, and lookups return
//! the first location with a matching subnet prefix.

use std::fmt;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Something like `10.`, `10.1.`, `10.1.5` or `10.1.5.9`.
static SUBNET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){0,3}\.?$").expect("valid subnet regex"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct LocationEntry {
    subnets: Vec<String>,
    #[serde(default)]
    boosters: Vec<String>,
}

/// A site with the subnet prefixes it owns and the boosters serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub subnets: Vec<String>,
    pub boosters: Vec<String>,
}

impl Location {
    /// True if any subnet prefix is a string prefix of `ip`.
    pub fn matches(&self, ip: &str) -> bool {
        self.subnets.iter().any(|subnet| ip.starts_with(subnet.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoosterMap {
    locations: Vec<Location>,
}

impl BoosterMap {
    /// Reads and parses the map file. Suspicious entries are logged.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::MapRead {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json(&contents)?;
        log::debug!(
            "Loaded {} locations from {}",
            map.locations.len(),
            path.display()
        );
        Ok(map)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let map: Self = serde_json::from_str(json)?;
        for warning in map.lint() {
            log::warn!("{}", warning);
        }
        Ok(map)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// First location, in declaration order, owning `ip`.
    pub fn select(&self, ip: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.matches(ip))
    }

    /// Boosters of the location owning `ip`.
    ///
    /// `None` means no location matched; `Some(&[])` means a location matched
    /// but lists no boosters.
    pub fn select_boosters(&self, ip: &str) -> Option<&[String]> {
        self.select(ip).map(|location| location.boosters.as_slice())
    }

    /// Problems that do not stop the map from being used.
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for location in &self.locations {
            for subnet in &location.subnets {
                if !SUBNET_PREFIX.is_match(subnet) {
                    warnings.push(format!(
                        "Location {}: subnet {:?} is not a dotted-decimal prefix",
                        location.name, subnet
                    ));
                }
            }
        }

        // An earlier prefix shadows every later prefix it is a prefix of.
        for (i, earlier) in self.locations.iter().enumerate() {
            for later in &self.locations[i + 1..] {
                for shadowing in &earlier.subnets {
                    for shadowed in &later.subnets {
                        if shadowed.starts_with(shadowing.as_str()) {
                            warnings.push(format!(
                                "Location {}: subnet {:?} is shadowed by {:?} of {}",
                                later.name, shadowed, shadowing, earlier.name
                            ));
                        }
                    }
                }
            }
        }

        warnings
    }
}

impl<'de> Deserialize<'de> for BoosterMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedLocations;

        impl<'de> Visitor<'de> for OrderedLocations {
            type Value = BoosterMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping location names to subnets and boosters")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut locations: Vec<Location> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some((name, entry)) = access.next_entry::<String, LocationEntry>()? {
                    let location = Location {
                        name,
                        subnets: entry.subnets,
                        boosters: entry.boosters,
                    };
                    // Same as a JSON object: a repeated key overrides, in place.
                    match locations.iter_mut().find(|l| l.name == location.name) {
                        Some(existing) => *existing = location,
                        None => locations.push(location),
                    }
                }

                Ok(BoosterMap { locations })
            }
        }

        deserializer.deserialize_map(OrderedLocations)
    }
}
