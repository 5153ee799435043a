//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use turbo_cart::CartStore;
use turbo_storage::FileStore;

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
///
/// This is the composition root: the cart store is built here once and
/// handed to commands by reference.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Path the config was loaded from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory the cart storage lives in.
    pub fn storage_dir(&self) -> PathBuf {
        match &self.config.storage.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.cwd.join(dir),
            None => dirs_path().join("turbo-cart"),
        }
    }

    /// Open the cart store backed by the configured storage directory.
    pub async fn open_cart(&self) -> Result<CartStore<FileStore>> {
        let dir = self.storage_dir();
        let backend = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open cart storage at {}", dir.display()))?;
        self.output
            .debug(&format!("Using storage {} key {}", dir.display(), self.config.storage.key));

        Ok(CartStore::load(backend, self.config.storage.key.clone()).await)
    }
}

/// Find config file in directory tree.
fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                    return Some((config, config_path));
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_in(cwd: &Path, config: CliConfig) -> Context {
        Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: cwd.to_path_buf(),
        }
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cart.toml"),
            "[storage]\nkey = \"@found:cart\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = find_config(&nested).unwrap();
        assert_eq!(config.storage.key, "@found:cart");
        assert_eq!(path, dir.path().join("cart.toml"));
    }

    #[test]
    fn test_relative_storage_dir_resolves_against_cwd() {
        let mut config = CliConfig::default();
        config.storage.dir = Some(PathBuf::from("data"));
        let ctx = context_in(Path::new("/work"), config);

        assert_eq!(ctx.storage_dir(), PathBuf::from("/work/data"));
    }

    #[tokio::test]
    async fn test_open_cart_uses_configured_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::default();
        config.storage.dir = Some(dir.path().join("store"));
        config.storage.key = "@test:cart".to_string();
        let ctx = context_in(dir.path(), config);

        let store = ctx.open_cart().await.unwrap();
        assert_eq!(store.storage_key(), "@test:cart");
        assert!(store.items().is_empty());
        assert!(dir.path().join("store").is_dir());
    }
}
