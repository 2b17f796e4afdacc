use booster_selector::ip_cache::IpCache;
use booster_selector::ip_resolver::{FixedResolver, IpResolver};
use booster_selector::prefs::BoosterPrefs;
use booster_selector::service::ClientService;
use booster_selector::store::{ConfigStore, PlistStore};
use booster_selector::{BoosterSelector, Error, Outcome, Result};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::rc::Rc;
use tempfile::tempdir;

const HQ_MAP: &str = r#"{"HQ": {"subnets": ["10.1."], "boosters": ["b1.example.com", "b2.example.com"]}}"#;

/// Keeps every applied record; can be told to fail.
#[derive(Clone, Default)]
struct MemoryStore {
    applied: Rc<RefCell<Vec<BoosterPrefs>>>,
    fail: bool,
}

impl ConfigStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn apply(&self, prefs: &BoosterPrefs) -> Result<()> {
        if self.fail {
            return Err(Error::Registry("access denied".to_string()));
        }
        self.applied.borrow_mut().push(prefs.clone());
        Ok(())
    }

    fn read(&self) -> Result<BoosterPrefs> {
        self.applied
            .borrow()
            .last()
            .cloned()
            .ok_or_else(|| Error::MissingField("booster1".to_string()))
    }
}

#[derive(Clone, Default)]
struct CountingService {
    restarts: Rc<RefCell<u32>>,
    fail: bool,
}

impl ClientService for CountingService {
    fn restart(&self) -> Result<()> {
        *self.restarts.borrow_mut() += 1;
        if self.fail {
            return Err(Error::Command {
                command: "fwcontrol client restart".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            });
        }
        Ok(())
    }
}

struct UnreachableResolver;

impl IpResolver for UnreachableResolver {
    fn resolve(&self) -> Result<IpAddr> {
        Err(Error::RendezvousUnreachable {
            host: "filewave-admin.example.com".to_string(),
            port: 20015,
            source: io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        })
    }
}

fn selector(
    dir: &Path,
    ip: &str,
    store: &MemoryStore,
    service: &CountingService,
) -> BoosterSelector {
    BoosterSelector::new(
        Box::new(FixedResolver(ip.parse().unwrap())),
        IpCache::new(dir.join("local_ip.txt")),
        dir.join("booster_map.json"),
        Box::new(store.clone()),
        Box::new(service.clone()),
    )
}

#[test]
fn test_new_ip_configures_matching_boosters_and_restarts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let store = MemoryStore::default();
    let service = CountingService::default();

    let outcome = selector(dir.path(), "10.1.5.9", &store, &service).run().unwrap();

    let expected = BoosterPrefs::configure(Some(
        &["b1.example.com".to_string(), "b2.example.com".to_string()][..],
    ));
    assert_eq!(
        outcome,
        Outcome::Reconfigured {
            ip: "10.1.5.9".parse().unwrap(),
            location: Some("HQ".to_string()),
            prefs: expected.clone(),
        }
    );
    assert_eq!(store.read().unwrap(), expected);
    assert_eq!(*service.restarts.borrow(), 1);
}

#[test]
fn test_second_run_with_same_ip_does_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let store = MemoryStore::default();
    let service = CountingService::default();
    let selector = selector(dir.path(), "10.1.5.9", &store, &service);

    selector.run().unwrap();
    let outcome = selector.run().unwrap();

    assert_eq!(
        outcome,
        Outcome::Unchanged {
            ip: "10.1.5.9".parse().unwrap()
        }
    );
    assert_eq!(store.applied.borrow().len(), 1);
    assert_eq!(*service.restarts.borrow(), 1);
}

#[test]
fn test_unmatched_ip_writes_cleared_prefs() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let store = MemoryStore::default();
    let service = CountingService::default();

    let outcome = selector(dir.path(), "192.168.0.1", &store, &service).run().unwrap();

    match outcome {
        Outcome::Reconfigured { location, prefs, .. } => {
            assert_eq!(location, None);
            assert_eq!(prefs, BoosterPrefs::cleared());
            assert!(prefs.routing);
        }
        other => panic!("expected reconfiguration, got {:?}", other),
    }
    assert_eq!(store.read().unwrap(), BoosterPrefs::cleared());
}

#[test]
fn test_unreachable_rendezvous_touches_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let store = MemoryStore::default();
    let service = CountingService::default();

    let selector = BoosterSelector::new(
        Box::new(UnreachableResolver),
        IpCache::new(dir.path().join("local_ip.txt")),
        dir.path().join("booster_map.json"),
        Box::new(store.clone()),
        Box::new(service.clone()),
    );

    assert!(matches!(selector.run(), Err(Error::RendezvousUnreachable { .. })));
    assert!(!dir.path().join("local_ip.txt").exists());
    assert!(store.applied.borrow().is_empty());
    assert_eq!(*service.restarts.borrow(), 0);
}

#[test]
fn test_missing_map_is_fatal_and_cache_is_restored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("local_ip.txt"), "10.2.0.4\n").unwrap();
    let store = MemoryStore::default();
    let service = CountingService::default();

    let result = selector(dir.path(), "10.1.5.9", &store, &service).run();

    assert!(matches!(result, Err(Error::MapRead { .. })));
    assert_eq!(
        fs::read_to_string(dir.path().join("local_ip.txt")).unwrap().trim(),
        "10.2.0.4"
    );
    assert_eq!(*service.restarts.borrow(), 0);
}

#[test]
fn test_store_failure_is_retried_next_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let failing = MemoryStore {
        fail: true,
        ..MemoryStore::default()
    };
    let service = CountingService::default();

    let result = selector(dir.path(), "10.1.5.9", &failing, &service).run();
    assert!(matches!(result, Err(Error::Registry(_))));
    assert!(!dir.path().join("local_ip.txt").exists());
    assert_eq!(*service.restarts.borrow(), 0);

    let working = MemoryStore::default();
    let outcome = selector(dir.path(), "10.1.5.9", &working, &service).run().unwrap();
    assert!(matches!(outcome, Outcome::Reconfigured { .. }));
    assert_eq!(working.applied.borrow().len(), 1);
}

#[test]
fn test_restart_failure_is_logged_not_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let store = MemoryStore::default();
    let service = CountingService {
        fail: true,
        ..CountingService::default()
    };

    let outcome = selector(dir.path(), "10.1.5.9", &store, &service).run().unwrap();
    assert!(matches!(outcome, Outcome::Reconfigured { .. }));
    assert_eq!(*service.restarts.borrow(), 1);

    // The configuration stays written and the IP stays cached.
    assert_eq!(store.applied.borrow().len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("local_ip.txt")).unwrap().trim(),
        "10.1.5.9"
    );
}

#[test]
fn test_end_to_end_with_plist_store() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("booster_map.json"), HQ_MAP).unwrap();
    let plist_path = dir.path().join("fwcld.plist");
    let mut doc = plist::Dictionary::new();
    doc.insert("server".to_string(), plist::Value::String("fw.example.com".to_string()));
    plist::Value::Dictionary(doc).to_file_xml(&plist_path).unwrap();
    let service = CountingService::default();

    let selector = BoosterSelector::new(
        Box::new(FixedResolver("10.1.5.9".parse().unwrap())),
        IpCache::new(dir.path().join("local_ip.txt")),
        dir.path().join("booster_map.json"),
        Box::new(PlistStore::new(&plist_path)),
        Box::new(service.clone()),
    );
    selector.run().unwrap();

    let written = PlistStore::new(&plist_path).read().unwrap();
    assert_eq!(written.slots[0].host, "b1.example.com");
    assert_eq!(written.slots[1].host, "b2.example.com");
    assert_eq!(written.slots[2].host, "no.booster.set");
    assert_eq!(written.publish_port, 20003);
    assert_eq!(*service.restarts.borrow(), 1);
}
