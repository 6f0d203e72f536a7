use thiserror::Error;

// Re-export a simple Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain-specific error set for schedule, store, and LLM failures.
#[derive(Error, Debug)]
pub enum Error {
    // ---- Parsing & Input ----------------------------------------------------
    /// User input or draft validation problems (menu input, entity fields).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Menu selection outside the known options.
    #[error("Unknown choice: {0}")]
    UnknownChoice(String),

    // ---- Schedule / Domain --------------------------------------------------
    /// Raised when a mutation would introduce a cycle into the schedule graph.
    #[error("Relationship '{predecessor}' -> '{successor}' would create a cycle.")]
    Cycle {
        predecessor: String,
        successor: String,
    },

    /// Referenced activity does not exist in the schedule.
    #[error("Activity '{0}' not found in the schedule.")]
    ActivityNotFound(String),

    /// Referenced relationship does not exist in the schedule.
    #[error("Relationship '{0}' not found in the schedule.")]
    RelationshipNotFound(String),

    // ---- Backing services ---------------------------------------------------
    /// Graph or vector store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// LLM request failed or returned an unusable payload.
    #[error("LLM error: {0}")]
    Llm(String),

    // ---- Config -------------------------------------------------------------
    /// Any issue initializing/reading config (file missing, invalid JSON, etc.)
    #[error("Config error: {0}")]
    Config(String),

    // ---- Plumbing / Wrappers ------------------------------------------------
    /// Generic domain error when bubbling a message without a new variant.
    #[error("{0}")]
    Domain(String),

    /// IO passthrough (read/write files, spawning docker, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serde JSON passthrough (config decode, LLM payloads, wire formats).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP passthrough (graph store, vector store, LLM endpoints).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ----------------------- Convenience constructors ----------------------------

impl Error {
    /// Helper to create a parse error from any displayable value.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }
    /// Helper to create a generic config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
    /// Helper to create a store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Error::Store(msg.into())
    }
    /// Helper to create an LLM error.
    pub fn llm<S: Into<String>>(msg: S) -> Self {
        Error::Llm(msg.into())
    }
}
