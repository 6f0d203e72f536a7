use crate::config::Config;
use crate::core::schedule::Schedule;
use crate::errors::{Error, Result};
use crate::llm::embedder::{HashEmbedder, OpenAiEmbedder};
use crate::llm::openai::OpenAiClient;
use crate::llm::{EmbeddingProvider, LlmProvider};
use crate::logging::{LogTarget, Logger};
use crate::scope::ScopeManager;
use crate::store::chroma::ChromaStore;
use crate::store::memory::{MemoryGraphStore, MemoryVectorStore};
use crate::store::neo4j::Neo4jStore;
use crate::store::{GraphStore, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Everything the interactive shell needs, built once at startup.
///
/// The shell itself is synchronous; the store and model clients are async.
/// A single multi-threaded runtime bridges the two via [`Self::runtime`].
pub struct AppContext {
    pub config: Config,
    pub schedule: Schedule,
    pub scope: ScopeManager,
    pub logger: Logger,
    pub startup_displayed: bool,
    pub config_path: PathBuf,
    pub logs_dir: PathBuf,
    runtime: Arc<Runtime>,
}

impl AppContext {
    pub fn new_with_paths(config_path: PathBuf, logs_dir: PathBuf) -> Result<Self> {
        let config = Config::load_or_init(&config_path)?;

        let logger = Logger::new();
        logger.set_log_dir(&logs_dir);
        logger.set_file_logging_enabled(config.file_logging_enabled());

        if config.auto_start_services() {
            if let Err(err) = crate::docker::ensure_services(&logger) {
                logger.warn(
                    format!("Service bootstrap failed: {err}"),
                    LogTarget::ConsoleAndFile,
                );
            }
        }

        let runtime = Arc::new(
            Runtime::new().map_err(|e| Error::store(format!("Failed to start runtime: {e}")))?,
        );

        let graph_store = Self::pick_graph_store(&config, &logger, &runtime);
        let vector_store = Self::pick_vector_store(&config, &logger, &runtime);
        let embedder = Self::pick_embedder(&config, &logger);
        let llm = Self::build_llm(&config);

        let mut schedule = Schedule::new(graph_store, vector_store, embedder, logger.clone());
        if let Err(err) = runtime.block_on(schedule.refresh()) {
            logger.warn(
                format!("Could not load the existing schedule: {err}"),
                LogTarget::ConsoleAndFile,
            );
        }

        let scope = ScopeManager::new(llm, config.search_result_count());

        Ok(Self {
            config,
            schedule,
            scope,
            logger,
            startup_displayed: false,
            config_path,
            logs_dir,
            runtime,
        })
    }

    /// Cloneable handle for callers that need to block on futures while
    /// holding mutable borrows into the context.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }

    fn pick_graph_store(
        config: &Config,
        logger: &Logger,
        runtime: &Runtime,
    ) -> Arc<dyn GraphStore> {
        let store = Neo4jStore::new(
            config.graph_uri(),
            config.graph_database(),
            config.graph_user(),
            config.graph_password(),
        );
        match runtime.block_on(store.health_check()) {
            Ok(()) => {
                logger.info(
                    format!("Connected to Neo4j at {}.", config.graph_uri()),
                    LogTarget::FileOnly,
                );
                Arc::new(store)
            }
            Err(err) => {
                logger.warn(
                    format!(
                        "Neo4j unreachable ({err}); using an in-memory graph store. \
                         Changes will not persist."
                    ),
                    LogTarget::ConsoleAndFile,
                );
                Arc::new(MemoryGraphStore::new())
            }
        }
    }

    fn pick_vector_store(
        config: &Config,
        logger: &Logger,
        runtime: &Runtime,
    ) -> Arc<dyn VectorStore> {
        let store = ChromaStore::new(config.vector_host(), config.vector_port());
        match runtime.block_on(store.health_check()) {
            Ok(()) => {
                logger.info(
                    format!(
                        "Connected to ChromaDB at {}:{}.",
                        config.vector_host(),
                        config.vector_port()
                    ),
                    LogTarget::FileOnly,
                );
                Arc::new(store)
            }
            Err(err) => {
                logger.warn(
                    format!(
                        "ChromaDB unreachable ({err}); using an in-memory vector store. \
                         Search results will not persist."
                    ),
                    LogTarget::ConsoleAndFile,
                );
                Arc::new(MemoryVectorStore::new())
            }
        }
    }

    fn pick_embedder(config: &Config, logger: &Logger) -> Arc<dyn EmbeddingProvider> {
        match config.api_key() {
            Some(key) => Arc::new(OpenAiEmbedder::new(
                config.llm_base_url(),
                config.embedding_model(),
                Some(key),
            )),
            None => {
                logger.warn(
                    "OPENAI_API_KEY is not set; using local hash embeddings. \
                     Semantic search will be approximate.",
                    LogTarget::ConsoleAndFile,
                );
                Arc::new(HashEmbedder::default())
            }
        }
    }

    fn build_llm(config: &Config) -> Arc<dyn LlmProvider> {
        // Keyless works for local OpenAI-compatible servers; hosted APIs
        // will reject the call with a clear error at use time.
        Arc::new(OpenAiClient::new(
            config.llm_base_url(),
            config.llm_model(),
            config.api_key(),
        ))
    }
}
