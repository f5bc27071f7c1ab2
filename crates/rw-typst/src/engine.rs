//! Shared compile service with a bounded result cache.

use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::backend::TypstBackend;
use crate::error::CompileError;
use crate::svg::CompiledSvg;

/// Number of compiled documents retained after each compile.
pub const DEFAULT_RETAIN: usize = 10;

/// Cache key for a compiled document.
#[derive(Debug)]
pub struct MathKey<'a> {
    /// Full document source, including page setup.
    pub source: &'a str,
}

impl MathKey<'_> {
    /// SHA-256 of the document source, hex-encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }
}

struct EngineState<B> {
    backend: B,
    cache: LruCache<String, CompiledSvg>,
}

impl<B: TypstBackend> EngineState<B> {
    /// Shrink the cache to `keep` entries and let the backend do the same.
    fn evict(&mut self, keep: usize) {
        let mut evicted = 0;
        while self.cache.len() > keep {
            self.cache.pop_lru();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(evicted, keep, "Evicted compiled math");
        }
        self.backend.evict(keep);
    }
}

/// Compile service shared by every job of a render pass.
///
/// One instance lives for the whole process and is passed by reference to
/// [`render_math`](crate::render_math). Jobs are dispatched concurrently but
/// compiled one at a time: the backend and its cache sit behind a single
/// async mutex held for the duration of each compile.
///
/// Failures are not cached, so a failed document is retried on the next
/// pass.
pub struct CompileEngine<B> {
    state: Mutex<EngineState<B>>,
    retain: usize,
}

impl<B: TypstBackend> CompileEngine<B> {
    /// Create an engine retaining [`DEFAULT_RETAIN`] compiled documents.
    pub fn new(backend: B) -> Self {
        Self::with_retain(backend, DEFAULT_RETAIN)
    }

    /// Create an engine retaining the `retain` most recent documents.
    pub fn with_retain(backend: B, retain: usize) -> Self {
        Self {
            state: Mutex::new(EngineState {
                backend,
                cache: LruCache::unbounded(),
            }),
            retain,
        }
    }

    /// Compile a document, serving repeated sources from the cache.
    pub async fn compile(&self, source: &str) -> Result<CompiledSvg, CompileError> {
        let key = MathKey { source }.compute_hash();
        let mut state = self.state.lock().await;

        if let Some(hit) = state.cache.get(&key) {
            tracing::debug!(key = %&key[..12], "Math cache hit");
            return Ok(hit.clone());
        }

        let output = state.backend.compile(source).await?;
        let compiled = CompiledSvg::parse(&output)?;
        state.cache.put(key, compiled.clone());
        state.evict(self.retain);
        Ok(compiled)
    }

    /// Number of documents currently cached.
    pub async fn cached(&self) -> usize {
        self.state.lock().await.cache.len()
    }

    /// Consume the engine and return its backend.
    pub fn into_backend(self) -> B {
        self.state.into_inner().backend
    }
}
