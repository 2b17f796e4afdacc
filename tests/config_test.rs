use booster_selector::config::{path, vars};
use booster_selector::{Error, Settings};
use log::LevelFilter;
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_match_client_layout() {
    let settings = Settings::default();

    assert_eq!(settings.rendezvous_host, "filewave-admin.matw.matthewsintl.com");
    assert_eq!(settings.rendezvous_port, 20015);
    assert_eq!(
        settings.ip_cache_path,
        PathBuf::from(path::BASE_DIR).join("local_ip.txt")
    );
    assert_eq!(
        settings.booster_map_path,
        PathBuf::from(path::BASE_DIR).join("booster_map.json")
    );
    assert_eq!(settings.plist_path, PathBuf::from("/usr/local/etc/fwcld.plist"));
    assert_eq!(settings.log_path, PathBuf::from("/var/log/booster_selector.log"));
    assert_eq!(settings.service_name, "FileWave Client");
    assert_eq!(settings.log_level, LevelFilter::Debug);
    assert!(settings.connect_timeout > Duration::ZERO);
}

#[test]
fn test_base_dir_moves_state_files_unless_overridden() {
    let settings = Settings::from_lookup(lookup(&[
        (vars::BASE_DIR, "/tmp/selector"),
        (vars::BOOSTER_MAP, "/etc/boosters.json"),
    ]))
    .unwrap();

    assert_eq!(settings.ip_cache_path, PathBuf::from("/tmp/selector/local_ip.txt"));
    assert_eq!(settings.booster_map_path, PathBuf::from("/etc/boosters.json"));
}

#[test]
fn test_numeric_and_level_overrides() {
    let settings = Settings::from_lookup(lookup(&[
        (vars::RENDEZVOUS_HOST, "127.0.0.1"),
        (vars::RENDEZVOUS_PORT, "8080"),
        (vars::CONNECT_TIMEOUT_SECS, "3"),
        (vars::LOG_LEVEL, "warn"),
    ]))
    .unwrap();

    assert_eq!(settings.rendezvous_host, "127.0.0.1");
    assert_eq!(settings.rendezvous_port, 8080);
    assert_eq!(settings.connect_timeout, Duration::from_secs(3));
    assert_eq!(settings.log_level, LevelFilter::Warn);
}

#[test]
fn test_invalid_values_are_config_errors() {
    for (name, value) in [
        (vars::RENDEZVOUS_PORT, "70000"),
        (vars::CONNECT_TIMEOUT_SECS, "soon"),
        (vars::CONNECT_TIMEOUT_SECS, "0"),
        (vars::LOG_LEVEL, "loud"),
    ] {
        let result = Settings::from_lookup(lookup(&[(name, value)]));
        assert!(
            matches!(result, Err(Error::Config(_))),
            "{}={} should be rejected",
            name,
            value
        );
    }
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    for name in vars::ALL {
        env::remove_var(name);
    }
    env::set_var(vars::PLIST, "/tmp/test-fwcld.plist");
    env::set_var(vars::SERVICE_NAME, "Test Client");

    let settings = Settings::from_env().unwrap();

    env::remove_var(vars::PLIST);
    env::remove_var(vars::SERVICE_NAME);

    assert_eq!(settings.plist_path, PathBuf::from("/tmp/test-fwcld.plist"));
    assert_eq!(settings.service_name, "Test Client");
}

#[test]
#[serial]
fn test_from_env_without_overrides_is_default() {
    for name in vars::ALL {
        env::remove_var(name);
    }
    assert_eq!(Settings::from_env().unwrap(), Settings::default());
}
