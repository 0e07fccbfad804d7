use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::{entry::DictionaryEntry, fallback};

/// Errors emitted by definition providers.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The provider failed (transport, status, or payload).
    #[error("provider error: {0}")]
    Provider(String),
}

/// Source of dictionary entries. The transport behind an implementation
/// is its own concern; the resolver only consumes this contract.
#[async_trait]
pub trait DefinitionProvider: Send + Sync {
    /// Looks up a lowercased word, returning its entry or `None`.
    async fn lookup(&self, word: &str) -> Result<Option<DictionaryEntry>, LexiconError>;

    /// Short provider name used in output metadata.
    fn name(&self) -> &'static str {
        "provider"
    }
}

/// Map-backed provider for tests and offline operation.
#[derive(Debug, Default)]
pub struct LoopbackDictionary {
    entries: HashMap<String, DictionaryEntry>,
    failing: bool,
}

impl LoopbackDictionary {
    /// Creates an empty loopback dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry served for its lowercased headword.
    #[must_use]
    pub fn with_entry(mut self, entry: DictionaryEntry) -> Self {
        self.entries.insert(entry.headword.to_lowercase(), entry);
        self
    }

    /// Makes every lookup fail, for exercising failover paths.
    #[must_use]
    pub const fn with_failures(mut self) -> Self {
        self.failing = true;
        self
    }
}

#[async_trait]
impl DefinitionProvider for LoopbackDictionary {
    async fn lookup(&self, word: &str) -> Result<Option<DictionaryEntry>, LexiconError> {
        if self.failing {
            return Err(LexiconError::Provider("loopback failure".into()));
        }
        Ok(self.entries.get(word).cloned())
    }

    fn name(&self) -> &'static str {
        "loopback"
    }
}

/// Resolves a word to a dictionary entry: provider first, static fallback
/// table second, otherwise no entry. Provider failures never propagate
/// past this boundary.
#[derive(Clone)]
pub struct DefinitionResolver {
    provider: Arc<dyn DefinitionProvider>,
}

impl std::fmt::Debug for DefinitionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionResolver")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl DefinitionResolver {
    /// Creates a resolver backed by the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn DefinitionProvider>) -> Self {
        Self { provider }
    }

    /// Creates a resolver with no external provider: only the static
    /// fallback table answers.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(Arc::new(LoopbackDictionary::new()))
    }

    /// Descriptor of the resolution chain, used in output metadata.
    #[must_use]
    pub fn descriptor(&self) -> String {
        format!("{} + static fallback", self.provider.name())
    }

    /// Resolves one word. Never errors: any provider failure or miss
    /// degrades to the fallback table, then to `None`.
    pub async fn resolve(&self, word: &str) -> Option<DictionaryEntry> {
        let lower = word.to_lowercase();
        match self.provider.lookup(&lower).await {
            Ok(Some(entry)) => Some(entry.normalized()),
            Ok(None) | Err(_) => fallback::entry_for(&lower),
        }
    }
}
