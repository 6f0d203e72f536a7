use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub fn binary_path() -> String {
    let raw = PathBuf::from(env!("CARGO_BIN_EXE_autosched"));
    if raw.is_absolute() {
        return raw.to_string_lossy().to_string();
    }
    let from_manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(&raw);
    if from_manifest.exists() {
        return from_manifest.to_string_lossy().to_string();
    }
    raw.to_string_lossy().to_string()
}

pub fn make_temp_dir(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("failed to create temp dir")
}

pub fn write_valid_config(dir: &Path) {
    let cfg = r#"{
      "graph_uri": { "value": "http://127.0.0.1:1", "description": "graph endpoint" },
      "graph_user": { "value": "neo4j", "description": "graph user" },
      "graph_database": { "value": "neo4j", "description": "graph database" },
      "vector_host": { "value": "127.0.0.1", "description": "vector host" },
      "vector_port": { "value": 1, "description": "vector port" },
      "llm_base_url": { "value": "http://127.0.0.1:1/v1", "description": "llm url" },
      "llm_model": { "value": "gpt-4o-mini", "description": "llm model" },
      "embedding_model": { "value": "text-embedding-3-small", "description": "embedding model" },
      "search_result_count": { "value": 5, "description": "search results" },
      "auto_start_services": { "value": "False", "description": "auto start" },
      "file_logging_enabled": { "value": "True", "description": "file logging" }
    }"#;
    fs::write(dir.join("config.json"), cfg).unwrap();
}

/// Run the binary in `dir` with scripted stdin. Service endpoints point at
/// closed ports so every run lands on the in-memory fallbacks.
pub fn run_with_input(dir: &Path, input: &str) -> Output {
    let mut child = Command::new(binary_path())
        .current_dir(dir)
        .env("AUTO_START_SERVICES", "False")
        .env("NEO4J_URI", "http://127.0.0.1:1")
        .env("CHROMADB_HOST", "127.0.0.1")
        .env("CHROMADB_PORT", "1")
        .env_remove("OPENAI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

fn strip_ansi_and_control(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut bytes = s.bytes().peekable();

    while let Some(b) = bytes.next() {
        if b == 0x1B && matches!(bytes.peek(), Some(b'[')) {
            let _ = bytes.next();
            for nb in bytes.by_ref() {
                if (nb as char).is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if b.is_ascii_control() {
            continue;
        }
        out.push(b as char);
    }

    out
}

pub fn normalized_lines(buf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buf)
        .lines()
        .map(|l| strip_ansi_and_control(l).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn assert_contains_line(lines: &[String], needle: &str) {
    assert!(
        lines.iter().any(|l| l.contains(needle)),
        "expected a line containing {needle:?}, got:\n{}",
        lines.join("\n")
    );
}
