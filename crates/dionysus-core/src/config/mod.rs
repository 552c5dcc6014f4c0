mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::vault::VaultProvider;

/// Config file used when neither `--config` nor `DIONYSUS_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to sensible defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Pick the config path: explicit argument, then `DIONYSUS_CONFIG`, then the default.
    #[must_use]
    pub fn resolve_path(cli_arg: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_arg {
            return p.to_owned();
        }
        std::env::var("DIONYSUS_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Reject values that would make the pipeline a no-op or loop forever.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retrieval.limit == 0 {
            bail!("retrieval.limit must be greater than zero");
        }
        if self.summary.max_attempts == 0 {
            bail!("summary.max_attempts must be greater than zero");
        }
        if self.summary.concurrency == 0 {
            bail!("summary.concurrency must be greater than zero");
        }
        if self.store.vector_size == 0 {
            bail!("store.vector_size must be greater than zero");
        }
        if self.llm.fallback.enabled && self.llm.fallback.name.trim().is_empty() {
            bail!("llm.fallback.name must not be empty");
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        use crate::vault::Secret;

        for key in ["DIONYSUS_GEMINI_API_KEY", "GEMINI_API_KEY"] {
            if let Some(val) = vault.get_secret(key).await? {
                self.secrets.gemini_api_key = Some(Secret::new(val));
                break;
            }
        }

        let name = self.llm.fallback.name.to_uppercase();
        for key in [
            format!("DIONYSUS_{name}_API_KEY"),
            format!("{name}_API_KEY"),
        ] {
            if let Some(val) = vault.get_secret(&key).await? {
                self.secrets.fallback_api_key = Some(Secret::new(val));
                break;
            }
        }

        if let Some(val) = vault.get_secret("QDRANT_API_KEY").await? {
            self.secrets.qdrant_api_key = Some(Secret::new(val));
        }
        Ok(())
    }
}
