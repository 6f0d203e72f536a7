pub mod models;
#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::models::{BoolConfigItem, ConfigItem, CountConfigItem, PortConfigItem, TextConfigItem};
use crate::errors::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub graph_uri: TextConfigItem,
    pub graph_user: TextConfigItem,
    pub graph_database: TextConfigItem,
    pub vector_host: TextConfigItem,
    pub vector_port: PortConfigItem,
    pub llm_base_url: TextConfigItem,
    pub llm_model: TextConfigItem,
    pub embedding_model: TextConfigItem,
    pub search_result_count: CountConfigItem,
    pub auto_start_services: BoolConfigItem,
    pub file_logging_enabled: BoolConfigItem,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            graph_uri: TextConfigItem::new(
                "http://localhost:7474",
                "HTTP endpoint of the Neo4j graph database.",
            ),
            graph_user: TextConfigItem::new("neo4j", "Username for the graph database."),
            graph_database: TextConfigItem::new("neo4j", "Database name for Cypher transactions."),
            vector_host: TextConfigItem::new("localhost", "Host of the ChromaDB vector store."),
            vector_port: PortConfigItem::new(8000, "Port of the ChromaDB vector store."),
            llm_base_url: TextConfigItem::new(
                "https://api.openai.com/v1",
                "Base URL of the OpenAI-compatible chat API.",
            ),
            llm_model: TextConfigItem::new("gpt-4o-mini", "Chat model used for prompt dispatch."),
            embedding_model: TextConfigItem::new(
                "text-embedding-3-small",
                "Model used to embed activities and relationships.",
            ),
            search_result_count: CountConfigItem::new(
                5,
                "Number of results returned by semantic search.",
            ),
            auto_start_services: BoolConfigItem::new(
                true,
                "Start the database containers with docker compose on launch.",
            ),
            file_logging_enabled: BoolConfigItem::new(
                true,
                "Enable writing log messages to file.",
            ),
        }
    }
}

/// JSON-backed settings. Secrets (graph password, API key) never live in
/// the file; they come from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    data: ConfigFile,
}

impl Config {
    /// Load the file, writing one with defaults first if it is missing.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let cfg = Self {
                path: path.to_path_buf(),
                data: ConfigFile::default(),
            };
            cfg.save()?;
            return Ok(cfg);
        }
        Self::load_from(path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file '{}' not found.",
                path.display()
            )));
        }
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let data: ConfigFile = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("Invalid JSON in '{}': {}", path.display(), e)))?;
        Ok(Self { path, data })
    }

    // Environment variables win over the file so the same config ships
    // between machines while connection details stay local.

    pub fn graph_uri(&self) -> String {
        env_or("NEO4J_URI", self.data.graph_uri.get_value())
    }
    pub fn graph_user(&self) -> String {
        env_or("NEO4J_USERNAME", self.data.graph_user.get_value())
    }
    pub fn graph_password(&self) -> Option<String> {
        std::env::var("NEO4J_PASSWORD").ok().filter(|s| !s.is_empty())
    }
    pub fn graph_database(&self) -> String {
        self.data.graph_database.get_value().clone()
    }
    pub fn vector_host(&self) -> String {
        env_or("CHROMADB_HOST", self.data.vector_host.get_value())
    }
    pub fn vector_port(&self) -> u16 {
        std::env::var("CHROMADB_PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(*self.data.vector_port.get_value())
    }
    pub fn llm_base_url(&self) -> String {
        env_or("OPENAI_BASE_URL", self.data.llm_base_url.get_value())
    }
    pub fn llm_model(&self) -> String {
        self.data.llm_model.get_value().clone()
    }
    pub fn embedding_model(&self) -> String {
        self.data.embedding_model.get_value().clone()
    }
    pub fn api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty())
    }
    pub fn search_result_count(&self) -> usize {
        *self.data.search_result_count.get_value()
    }
    pub fn auto_start_services(&self) -> bool {
        match std::env::var("AUTO_START_SERVICES") {
            Ok(v) => !v.trim().eq_ignore_ascii_case("false"),
            Err(_) => self.data.auto_start_services.get_value().0,
        }
    }
    pub fn file_logging_enabled(&self) -> bool {
        self.data.file_logging_enabled.get_value().0
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| Error::Config(format!("Failed to encode config: {}", e)))?;
        fs::write(&self.path, json)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => fallback.to_string(),
    }
}
