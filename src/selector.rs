use std::net::IpAddr;
use std::path::PathBuf;

use crate::booster_map::BoosterMap;
use crate::config::Settings;
use crate::error::Result;
use crate::ip_cache::{IpCache, IpChange};
use crate::ip_resolver::{IpResolver, RendezvousResolver};
use crate::prefs::BoosterPrefs;
use crate::service::{self, ClientService};
use crate::store::{self, ConfigStore};

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Same IP as last time; nothing was touched.
    Unchanged { ip: IpAddr },
    /// The client configuration was rewritten.
    Reconfigured {
        ip: IpAddr,
        /// Name of the matching location, `None` if no subnet matched.
        location: Option<String>,
        prefs: BoosterPrefs,
    },
}

/// One pass of: find our IP, pick boosters for its subnet, configure the client.
pub struct BoosterSelector {
    resolver: Box<dyn IpResolver>,
    cache: IpCache,
    map_path: PathBuf,
    store: Box<dyn ConfigStore>,
    service: Box<dyn ClientService>,
}

impl BoosterSelector {
    pub fn new(
        resolver: Box<dyn IpResolver>,
        cache: IpCache,
        map_path: impl Into<PathBuf>,
        store: Box<dyn ConfigStore>,
        service: Box<dyn ClientService>,
    ) -> Self {
        Self {
            resolver,
            cache,
            map_path: map_path.into(),
            store,
            service,
        }
    }

    /// The selector for this platform, wired from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Box::new(RendezvousResolver::from_settings(settings)),
            IpCache::new(settings.ip_cache_path.clone()),
            settings.booster_map_path.clone(),
            store::for_platform(settings),
            service::for_platform(settings),
        )
    }

    pub fn run(&self) -> Result<Outcome> {
        log::info!("Checking current IP address");
        let ip = self.resolver.resolve()?;
        log::info!("Current IP address is: {}", ip);

        let previous = match self.cache.check_and_update(&ip.to_string())? {
            IpChange::Unchanged => {
                log::info!("IP hasn't changed. Exiting");
                return Ok(Outcome::Unchanged { ip });
            }
            IpChange::Changed { previous } => previous,
        };

        match self.reconfigure(ip) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Forget the new IP so the next run tries again.
                if let Err(restore_err) = self.cache.restore(previous.as_deref()) {
                    log::error!(
                        "Could not restore IP cache {}: {}",
                        self.cache.path().display(),
                        restore_err
                    );
                }
                Err(e)
            }
        }
    }

    fn reconfigure(&self, ip: IpAddr) -> Result<Outcome> {
        let map = BoosterMap::load(&self.map_path)?;
        let ip_str = ip.to_string();

        let location = map.select(&ip_str);
        match location {
            Some(location) => log::info!(
                "{} is in {}: boosters {:?}",
                ip_str,
                location.name,
                location.boosters
            ),
            None => log::info!("{} matches no subnet in {}", ip_str, self.map_path.display()),
        }

        let prefs = BoosterPrefs::configure(location.map(|l| l.boosters.as_slice()));

        log::info!("Updating {}", self.store.describe());
        self.store.apply(&prefs)?;

        log::info!("Restarting client");
        if let Err(e) = self.service.restart() {
            log::error!("Client restart failed: {}", e);
        }

        Ok(Outcome::Reconfigured {
            ip,
            location: location.map(|l| l.name.clone()),
            prefs,
        })
    }
}
