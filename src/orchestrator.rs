//! Pipeline orchestrator for Docent.
//!
//! Builds the vector index for a document once (load, chunk, embed, index) and
//! answers any number of questions against it (retrieve, generate).

use crate::chunking::{Chunker, ChunkingConfig, Passage, WindowChunker};
use crate::config::{Prompts, Settings};
use crate::document::{DocumentLoader, FileLoader};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{DocentError, Result};
use crate::rag::{Answer, AnswerGenerator, ChatGenerator, Retriever};
use crate::retry::RetryPolicy;
use crate::vector_index::{SearchResult, VectorIndex};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

/// API keys for the external services, resolved by the caller.
#[derive(Clone)]
pub struct ApiKeys {
    pub embedding: String,
    pub generation: String,
}

impl ApiKeys {
    /// Read the keys from the environment variables named in the settings.
    pub fn from_env(settings: &Settings) -> Result<Self> {
        Ok(Self {
            embedding: read_env_key(&settings.embedding.api_key_env)?,
            generation: read_env_key(&settings.generation.api_key_env)?,
        })
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("embedding", &"<redacted>")
            .field("generation", &"<redacted>")
            .finish()
    }
}

fn read_env_key(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(DocentError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            name, name
        ))),
        Err(_) => Err(DocentError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            name, name
        ))),
    }
}

/// Lifecycle state of an [`Orchestrator`], as seen by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorState {
    /// No index has been built yet.
    Uninitialized,
    /// An index is ready for queries.
    Indexed {
        document: PathBuf,
        passages: usize,
        built_at: DateTime<Utc>,
    },
    /// The last build failed; queries are rejected until a build succeeds.
    Failed { reason: String },
}

/// Internal state; the index is shared with in-flight queries.
enum IndexState {
    Uninitialized,
    Indexed(IndexedDocument),
    Failed { reason: String },
}

struct IndexedDocument {
    document: PathBuf,
    index: Arc<VectorIndex>,
    built_at: DateTime<Utc>,
}

/// The main orchestrator for the Docent pipeline.
pub struct Orchestrator {
    loader: Arc<dyn DocumentLoader>,
    chunker: Box<dyn Chunker>,
    chunking: ChunkingConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    top_k: usize,
    min_score: Option<f32>,
    request_timeout: Duration,
    state: RwLock<IndexState>,
    build_lock: Mutex<()>,
}

impl Orchestrator {
    /// Create an orchestrator with the providers named in the settings.
    pub fn new(settings: &Settings, keys: &ApiKeys) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let timeout = settings.timeouts.request_timeout();

        let embedder = create_embedder(
            &settings.embedding,
            &keys.embedding,
            timeout,
            RetryPolicy::from(&settings.retry),
        )?;
        info!(
            "Using {} embeddings ({})",
            settings.embedding.provider, settings.embedding.model
        );

        let generator: Arc<dyn AnswerGenerator> = Arc::new(
            ChatGenerator::new(&settings.generation, &keys.generation, timeout)?
                .with_prompts(prompts),
        );

        Self::with_components(settings, embedder, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            loader: Arc::new(FileLoader::new()),
            chunker: Box::new(WindowChunker::new()),
            chunking: ChunkingConfig::new(
                settings.document.chunk_size,
                settings.document.chunk_overlap,
            )?,
            embedder,
            generator,
            top_k: settings.retrieval.top_k,
            min_score: settings.retrieval.min_score,
            request_timeout: settings.timeouts.request_timeout(),
            state: RwLock::new(IndexState::Uninitialized),
            build_lock: Mutex::new(()),
        })
    }

    /// Replace the document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Snapshot of the lifecycle state.
    pub async fn state(&self) -> OrchestratorState {
        match &*self.state.read().await {
            IndexState::Uninitialized => OrchestratorState::Uninitialized,
            IndexState::Indexed(indexed) => OrchestratorState::Indexed {
                document: indexed.document.clone(),
                passages: indexed.index.len(),
                built_at: indexed.built_at,
            },
            IndexState::Failed { reason } => OrchestratorState::Failed {
                reason: reason.clone(),
            },
        }
    }

    /// Load, chunk, embed and index a document.
    ///
    /// Builds are serialized. When the same document is already indexed and
    /// `force_rebuild` is false this is a no-op. On failure the orchestrator
    /// moves to the failed state and the previous index is dropped.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn build_index(
        &self,
        path: impl AsRef<Path>,
        force_rebuild: bool,
    ) -> Result<BuildReport> {
        let document = normalize_path(path.as_ref());
        let _build = self.build_lock.lock().await;

        if !force_rebuild {
            if let IndexState::Indexed(indexed) = &*self.state.read().await {
                if indexed.document == document {
                    info!("{} is already indexed, skipping", document.display());
                    return Ok(BuildReport {
                        document,
                        pages: 0,
                        passages_indexed: indexed.index.len(),
                        skipped: true,
                    });
                }
            }
        }

        match self.run_build(&document).await {
            Ok((index, pages)) => {
                let report = BuildReport {
                    document: document.clone(),
                    pages,
                    passages_indexed: index.len(),
                    skipped: false,
                };
                info!(
                    "Indexed {} passages from {} pages",
                    report.passages_indexed, pages
                );
                *self.state.write().await = IndexState::Indexed(IndexedDocument {
                    document,
                    index: Arc::new(index),
                    built_at: Utc::now(),
                });
                Ok(report)
            }
            Err(e) => {
                warn!("Index build failed: {}", e);
                *self.state.write().await = IndexState::Failed {
                    reason: format!("{}: {}", e.kind(), e),
                };
                Err(e)
            }
        }
    }

    /// Run the build pipeline without touching the published state.
    async fn run_build(&self, path: &Path) -> Result<(VectorIndex, usize)> {
        let loader = self.loader.clone();
        let owned_path = path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || loader.load(&owned_path))
            .await
            .map_err(|e| DocentError::DocumentLoad(format!("document loader aborted: {}", e)))??;
        document.ensure_readable()?;

        let passages = self.chunker.split(&document, &self.chunking)?;
        info!(
            "Split {} pages into {} passages",
            document.page_count(),
            passages.len()
        );

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != passages.len() {
            return Err(DocentError::embedding(format!(
                "received {} embeddings for {} passages",
                embeddings.len(),
                passages.len()
            )));
        }

        let expected = self.embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|v| v.len() != expected) {
            return Err(DocentError::DimensionMismatch(format!(
                "embedding model returned {} dimensions, configured for {}",
                bad.len(),
                expected
            )));
        }

        let index = VectorIndex::build(passages.into_iter().zip(embeddings).collect())?;
        Ok((index, document.page_count()))
    }

    /// The current index, or `NotReady` if there is none.
    async fn current_index(&self) -> Result<Arc<VectorIndex>> {
        match &*self.state.read().await {
            IndexState::Indexed(indexed) => Ok(indexed.index.clone()),
            IndexState::Uninitialized => Err(DocentError::NotReady(
                "no document has been indexed yet".to_string(),
            )),
            IndexState::Failed { reason } => Err(DocentError::NotReady(format!(
                "the last index build failed ({})",
                reason
            ))),
        }
    }

    /// Retrieve the passages most relevant to `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        self.retrieve_top(question, self.top_k).await
    }

    /// Retrieve up to `k` passages for `question`.
    pub async fn retrieve_top(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        let index = self.current_index().await?;
        let question = non_empty(question)?;

        let retriever = Retriever::new(index, self.embedder.clone()).with_min_score(self.min_score);
        bounded(self.request_timeout, retriever.retrieve(question, k), |t| {
            DocentError::embedding_transient(format!("query embedding timed out after {:?}", t))
        })
        .await
    }

    /// Answer a question from the indexed document.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let sources = self.retrieve(question).await?;
        if sources.is_empty() {
            return Err(DocentError::NoContext);
        }

        let passages: Vec<Passage> = sources.iter().map(|r| r.passage.clone()).collect();
        let text = bounded(
            self.request_timeout,
            self.generator.generate(question.trim(), &passages),
            |t| DocentError::generation(format!("answer generation timed out after {:?}", t), true),
        )
        .await?;

        Ok(Answer { text, sources })
    }
}

/// Result of building an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Document that was indexed.
    pub document: PathBuf,
    /// Pages read (zero when skipped).
    pub pages: usize,
    /// Passages in the published index.
    pub passages_indexed: usize,
    /// Whether the build was skipped because the document was already indexed.
    pub skipped: bool,
}

/// Canonical form of a document path, so `./a.pdf` and `a.pdf` match.
fn normalize_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn non_empty(question: &str) -> Result<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(DocentError::InvalidInput("question is empty".to_string()));
    }
    Ok(question)
}

/// Await `fut`, failing with `on_timeout` once `limit` elapses.
async fn bounded<T, F>(
    limit: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> DocentError,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}
