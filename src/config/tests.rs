use super::{Config, models::*};
use crate::errors::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let uniq = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("autosched-config-test-{nanos}-{uniq}.json"))
}

fn sample_config_file(path: &std::path::Path) {
    let json = r#"{
  "graph_uri": { "value": "http://graph:7474", "description": "graph endpoint" },
  "graph_user": { "value": "neo4j", "description": "graph user" },
  "graph_database": { "value": "neo4j", "description": "graph database" },
  "vector_host": { "value": "vectors", "description": "vector host" },
  "vector_port": { "value": 8000, "description": "vector port" },
  "llm_base_url": { "value": "http://llm:11434/v1", "description": "llm url" },
  "llm_model": { "value": "gpt-4o-mini", "description": "llm model" },
  "embedding_model": { "value": "text-embedding-3-small", "description": "embedding model" },
  "search_result_count": { "value": 3, "description": "search results" },
  "auto_start_services": { "value": "False", "description": "auto start" },
  "file_logging_enabled": { "value": "True", "description": "file logging" }
}"#;
    fs::write(path, json).unwrap();
}

#[test]
fn load_from_reads_values() {
    let path = temp_path();
    sample_config_file(&path);
    let cfg = Config::load_from(&path).expect("config should load");

    assert_eq!(cfg.graph_database(), "neo4j");
    assert_eq!(cfg.llm_model(), "gpt-4o-mini");
    assert_eq!(cfg.search_result_count(), 3);
    assert!(cfg.file_logging_enabled());
}

#[test]
fn load_from_reports_missing_file() {
    let path = temp_path();
    let err = Config::load_from(&path).unwrap_err();
    match err {
        Error::Config(msg) => {
            let expected = format!("Configuration file '{}' not found.", path.display());
            assert_eq!(msg, expected);
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn load_from_reports_invalid_json() {
    let path = temp_path();
    fs::write(&path, "{").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    match err {
        Error::Config(msg) => {
            let prefix = format!("Invalid JSON in '{}':", path.display());
            assert!(msg.starts_with(&prefix));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn load_or_init_writes_defaults_when_missing() {
    let path = temp_path();
    assert!(!path.exists());
    let cfg = Config::load_or_init(&path).unwrap();
    assert!(path.exists());
    assert_eq!(cfg.graph_database(), "neo4j");

    // Reloading the written file round-trips.
    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.search_result_count(), cfg.search_result_count());
}

#[test]
fn config_items_validate_and_set() {
    let mut text = TextConfigItem::new("neo4j", "user");
    assert!(text.set_value("  admin  ").is_ok());
    assert_eq!(text.get_value(), "admin");
    assert!(text.set_value("   ").is_err());

    let mut port = PortConfigItem::new(8000, "port");
    assert!(port.set_value("9001").is_ok());
    assert_eq!(port.get_value(), &9001);
    assert!(port.set_value("70000").is_err());

    let mut count = CountConfigItem::new(5, "count");
    assert!(count.set_value("0").is_err());
    assert!(count.set_value("2").is_ok());

    let mut flag = BoolConfigItem::new(false, "flag");
    assert!(flag.set_value("True").is_ok());
    assert!(flag.get_value().0);
    assert!(flag.set_value("maybe").is_err());
}

#[test]
fn auto_start_services_env_override_wins() {
    let path = temp_path();
    sample_config_file(&path);
    let cfg = Config::load_from(&path).unwrap();

    // Sample file sets it False; without the env var the file value holds.
    if std::env::var("AUTO_START_SERVICES").is_err() {
        assert!(!cfg.auto_start_services());
    }
}
