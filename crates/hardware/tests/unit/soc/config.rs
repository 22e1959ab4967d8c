use simcache::common::ConfigError;
use simcache::config::{CacheParams, Config, LevelSpec, MemoryControllerKind};
use simcache::core::units::cache::policies::ReplacementKind;
use simcache::soc::Hierarchy;
use std::io::Write;
use tempfile::NamedTempFile;

fn with_caches(il1: &str, dl1: &str, il2: &str, dl2: &str) -> Config {
    let mut config = Config::default();
    config.cache.il1 = il1.into();
    config.cache.dl1 = dl1.into();
    config.cache.il2 = il2.into();
    config.cache.dl2 = dl2.into();
    config
}

#[test]
fn test_level_spec_forms() {
    assert_eq!("none".parse::<LevelSpec>(), Ok(LevelSpec::None));
    assert_eq!("dl2".parse::<LevelSpec>(), Ok(LevelSpec::Alias("dl2".into())));
    assert_eq!(
        "ul2:1024:64:4:r".parse::<LevelSpec>(),
        Ok(LevelSpec::Cache(CacheParams {
            name: "ul2".into(),
            nsets: 1024,
            block_size: 64,
            associativity: 4,
            policy: ReplacementKind::Random,
        }))
    );
    let params: CacheParams = "il1:256:32:1:l".parse().unwrap();
    assert_eq!(params.to_string(), "il1:256:32:1:l");
}

#[test]
fn test_partial_json_takes_defaults() {
    let config = Config::from_json(
        r#"{ "cache": { "il1": "il1:64:32:2:f" }, "memory": { "controller": "DRAM" } }"#,
    )
    .unwrap();
    assert_eq!(config.cache.il1, "il1:64:32:2:f");
    assert_eq!(config.cache.dl2, Config::default().cache.dl2);
    assert_eq!(config.memory.controller, MemoryControllerKind::Dram);
    assert_eq!(config.random_seed, Config::default().random_seed);
    assert!(!config.bus.enabled);
}

#[test]
fn test_config_file_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    let config = with_caches("dl1", "ul1:128:32:4:l", "dl2", "ul2:512:64:8:l");
    file.write_all(config.to_json().as_bytes()).unwrap();

    assert_eq!(Config::from_file(file.path()), Ok(config));
    assert!(matches!(
        Config::from_file("/nonexistent/simcache.json"),
        Err(ConfigError::Io(_))
    ));
    assert!(matches!(Config::from_json("{"), Err(ConfigError::Parse(_))));
}

#[test]
fn test_il1_may_only_alias_dl1() {
    let err = Hierarchy::from_config(&with_caches("dl2", "dl1:16:32:1:l", "none", "none"))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidAlias {
            level: "il1".into(),
            target: "dl2".into()
        }
    );
}

#[test]
fn test_unified_l1_requires_unified_l2() {
    let err = Hierarchy::from_config(&with_caches(
        "dl1",
        "dl1:16:32:1:l",
        "il2:64:32:1:l",
        "dl2:64:32:1:l",
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidAlias { ref level, .. } if level == "il2"));

    let ok = Hierarchy::from_config(&with_caches("dl1", "dl1:16:32:1:l", "dl2", "dl2:64:32:1:l"));
    assert!(ok.is_ok());
}

#[test]
fn test_l2_requires_l1() {
    let err = Hierarchy::from_config(&with_caches("il1:16:32:1:l", "none", "none", "dl2:64:32:1:l"))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingUpperLevel {
            level: "dl2".into(),
            requires: "dl1".into()
        }
    );

    let err = Hierarchy::from_config(&with_caches("none", "dl1:16:32:1:l", "il2:64:32:1:l", "none"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingUpperLevel { .. }));
}

#[test]
fn test_bus_enabled_from_config() {
    let mut config = with_caches("il1:16:32:1:l", "none", "none", "none");
    config.bus.enabled = true;
    config.bus.width_bytes = 8;
    config.bus.latency = 2;

    let h = Hierarchy::from_config(&config).unwrap();
    assert_eq!(h.cache_by_entry("il1").unwrap().bus().transfer_cost, 6);
}
