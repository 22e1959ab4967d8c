use simcache::common::ConfigError;
use simcache::soc::{BuildOptions, Hierarchy, LevelDef, MainMemory, Target};

fn build(levels: &[(&str, &str, Option<&str>)]) -> Result<Hierarchy, ConfigError> {
    let defs = levels
        .iter()
        .map(|(name, spec, next)| LevelDef::new(name, spec, *next, 1))
        .collect::<Result<Vec<_>, _>>()?;
    Hierarchy::build(&defs, MainMemory::fixed(1), &BuildOptions::default())
}

#[test]
fn test_cycle_is_rejected() {
    let err = build(&[
        ("a", "a:16:32:1:l", Some("b")),
        ("b", "b:16:32:1:l", Some("a")),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::Cycle(vec!["a".into(), "b".into(), "a".into()])
    );
}

#[test]
fn test_alias_loop_is_rejected() {
    let err = build(&[("il1", "dl1", None), ("dl1", "il1", None)]).unwrap_err();
    assert!(matches!(err, ConfigError::Cycle(_)));
}

#[test]
fn test_unknown_next_level() {
    let err = build(&[("dl1", "dl1:16:32:1:l", Some("dl3"))]).unwrap_err();
    assert_eq!(err, ConfigError::UnknownLevel("dl3".into()));
}

#[test]
fn test_duplicate_level() {
    let err = build(&[("dl1", "none", None), ("dl1", "none", None)]).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedSpec(_)));
}

#[test]
fn test_smaller_lower_blocks_rejected() {
    let err = build(&[
        ("dl1", "dl1:16:64:1:l", Some("dl2")),
        ("dl2", "dl2:64:32:4:l", None),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::BlockSizeMismatch {
            upper: "dl1".into(),
            lower: "dl2".into()
        }
    );
}

#[test]
fn test_geometry_error_surfaces() {
    let err = build(&[("dl1", "dl1:12:32:1:l", None)]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::NotPowerOfTwo {
            what: "nsets",
            value: 12
        }
    );
}

#[test]
fn test_malformed_and_policy_specs() {
    assert!(matches!(
        LevelDef::new("dl1", "dl1:16:32:1", None, 1),
        Err(ConfigError::MalformedSpec(_))
    ));
    assert_eq!(
        LevelDef::new("dl1", "dl1:16:32:1:z", None, 1),
        Err(ConfigError::UnknownPolicy('z'))
    );
}

#[test]
fn test_lower_levels_come_first() {
    let h = build(&[
        ("il1", "il1:16:32:1:l", Some("l2")),
        ("dl1", "dl1:16:32:1:l", Some("l2")),
        ("l2", "ul2:64:64:4:l", None),
    ])
    .unwrap();

    let names: Vec<&str> = h.caches().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["ul2", "il1", "dl1"]);
    assert_eq!(h.entry("l2"), Some(Target::Cache(simcache::soc::CacheId(0))));

    let mut dump = Vec::new();
    h.write_config(&mut dump).unwrap();
    let dump = String::from_utf8(dump).unwrap();
    assert!(dump.lines().next().unwrap().starts_with("il1    il1 ("));
    assert!(dump.contains("-> ul2"));
}
