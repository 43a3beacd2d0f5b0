//! Integration tests for capacity resolution across layered sources.

use std::thread;

use viewstash_config::{
    CapacityCell, CapacitySource, ConfigError, EnvSource, Layered, MapSource, TomlSource,
    DEFAULT_MAX_ACTIVE_SCOPES, PARAM_LOGICAL_VIEWS, PARAM_MAX_ACTIVE_SCOPES, resolve_capacity,
};

#[test]
fn test_file_fills_in_for_missing_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewstash.toml");
    std::fs::write(&path, format!("{PARAM_LOGICAL_VIEWS} = 11\n")).unwrap();

    let sources = Layered::new()
        .then(MapSource::new())
        .then(TomlSource::load(&path).unwrap());

    let resolved = resolve_capacity(&sources).unwrap();
    assert_eq!(resolved.value, 11);
    assert_eq!(
        resolved.source,
        CapacitySource::Param(PARAM_LOGICAL_VIEWS.to_string())
    );
}

#[test]
fn test_override_beats_file_for_same_parameter() {
    let file = TomlSource::from_toml(&format!("{PARAM_MAX_ACTIVE_SCOPES} = 11")).unwrap();
    let sources = Layered::new()
        .then(MapSource::new().with(PARAM_MAX_ACTIVE_SCOPES, "3"))
        .then(file);

    assert_eq!(resolve_capacity(&sources).unwrap().value, 3);
}

#[test]
fn test_malformed_file_value_fails_fast() {
    let file = TomlSource::from_toml(&format!("{PARAM_MAX_ACTIVE_SCOPES} = \"many\"")).unwrap();
    let sources = Layered::new().then(file);

    let err = resolve_capacity(&sources).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidCapacity { .. }));
    assert!(err.to_string().contains("many"));
}

#[test]
fn test_empty_chain_uses_default() {
    let resolved = resolve_capacity(&Layered::new()).unwrap();
    assert_eq!(resolved.value, DEFAULT_MAX_ACTIVE_SCOPES);
}

#[test]
fn test_env_source_in_chain_without_variables() {
    // None of the capacity variables are expected in the test environment;
    // the chain must still fall through to later sources.
    let sources = Layered::new()
        .then(EnvSource)
        .then(MapSource::new().with("VIEWSTASH_TEST_ONLY_CAPACITY", "6"));

    let resolved = viewstash_config::resolve_capacity_from(
        &sources,
        &["VIEWSTASH_TEST_ONLY_CAPACITY"],
        1,
    )
    .unwrap();
    assert_eq!(resolved.value, 6);
}

#[test]
fn test_cell_agrees_across_threads() {
    let cell = CapacityCell::new();

    let values: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cell = &cell;
                scope.spawn(move || {
                    let source = MapSource::new().with(PARAM_MAX_ACTIVE_SCOPES, (i + 1).to_string());
                    cell.get_or_resolve(&source).unwrap().value
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(values.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(cell.get().map(|r| r.value), Some(values[0]));
}
