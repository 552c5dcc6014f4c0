//! Application bootstrap: config resolution, provider and store construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dionysus_index::NamespaceCollectionStore;
use dionysus_llm::any::AnyProvider;
use dionysus_llm::compatible::CompatibleProvider;
use dionysus_llm::gemini::GeminiProvider;
use dionysus_memory::QdrantOps;

use crate::assistant::Assistant;
use crate::config::Config;
use crate::vault::{EnvVaultProvider, Secret, VaultProvider};

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Resolve the config path, load and validate it, and resolve secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed, fails validation, or the vault fails.
    pub async fn from_env(cli_config: Option<&Path>) -> anyhow::Result<Self> {
        Self::with_vault(cli_config, &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed, fails validation, or the vault fails.
    pub async fn with_vault(
        cli_config: Option<&Path>,
        vault: &dyn VaultProvider,
    ) -> anyhow::Result<Self> {
        let config_path = Config::resolve_path(cli_config);
        let mut config = Config::load(&config_path)?;
        config.validate()?;
        config.resolve_secrets(vault).await?;
        tracing::debug!(path = %config_path.display(), "configuration loaded");
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Construct providers and probe the store once, then assemble the facade.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary provider cannot be created.
    pub async fn build(self) -> anyhow::Result<Assistant> {
        let primary = Arc::new(create_primary_provider(&self.config)?);
        let secondary = create_secondary_provider(&self.config).map(Arc::new);
        let store = connect_store(&self.config).await;
        Ok(Assistant::new(&self.config, primary, secondary, store))
    }
}

/// # Errors
///
/// Returns an error if no Gemini API key was resolved.
pub fn create_primary_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let gemini = &config.llm.gemini;
    let api_key = config
        .secrets
        .gemini_api_key
        .as_ref()
        .context("GEMINI_API_KEY not found in vault")?
        .expose()
        .to_owned();
    Ok(AnyProvider::Gemini(GeminiProvider::new(
        api_key,
        gemini.base_url.clone(),
        gemini.model.clone(),
        gemini.max_tokens,
        Some(gemini.embedding_model.clone()),
    )))
}

/// The secondary is optional: disabled or key-less configs run without failover.
#[must_use]
pub fn create_secondary_provider(config: &Config) -> Option<AnyProvider> {
    let fallback = &config.llm.fallback;
    if !fallback.enabled {
        tracing::info!("secondary provider disabled");
        return None;
    }
    let Some(api_key) = config.secrets.fallback_api_key.as_ref() else {
        tracing::warn!(
            provider = %fallback.name,
            "no API key for secondary provider, failover disabled"
        );
        return None;
    };
    Some(AnyProvider::Compatible(CompatibleProvider::new(
        fallback.name.clone(),
        api_key.expose().to_owned(),
        fallback.base_url.clone(),
        fallback.model.clone(),
        fallback.max_tokens,
        None,
    )))
}

/// One-time availability probe; every later store call trusts its outcome.
pub async fn connect_store(config: &Config) -> NamespaceCollectionStore {
    let vector_size = config.store.vector_size;
    if !config.store.enabled {
        tracing::info!("vector store disabled");
        return NamespaceCollectionStore::unavailable(vector_size);
    }
    let api_key = config.secrets.qdrant_api_key.as_ref().map(Secret::expose);
    match QdrantOps::new(&config.store.qdrant_url, api_key) {
        Ok(ops) => NamespaceCollectionStore::connect(Arc::new(ops), vector_size).await,
        Err(e) => {
            tracing::warn!(url = %config.store.qdrant_url, error = %e, "invalid vector store config");
            NamespaceCollectionStore::unavailable(vector_size)
        }
    }
}
