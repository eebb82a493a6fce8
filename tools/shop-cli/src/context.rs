//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use shop_sdk::shop_cache::FileStore;
use shop_sdk::config::StorefrontConfig;
use shop_sdk::{HostedCheckoutWidget, Storefront};

use crate::output::Output;

/// Config file names searched for, nearest directory first.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Storefront configuration.
    pub config: StorefrontConfig,
    /// The file the configuration came from, if any.
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

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config(&cwd),
        };
        let config = match &config_path {
            Some(path) => StorefrontConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => StorefrontConfig::default(),
        }
        .with_env_overrides();

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory holding the persisted cart, session and payment sessions.
    pub fn profile_dir(&self) -> PathBuf {
        match &self.config.storage.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self
                .config_path
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or(&self.cwd)
                .join(dir),
            None => data_dir().join("shop-cli").join("profile"),
        }
    }

    /// Open the storefront on the profile directory.
    ///
    /// Returns the checkout widget too so commands can show the gateway URL
    /// after a card checkout.
    pub async fn open(&self) -> Result<(Storefront, HostedCheckoutWidget)> {
        let dir = self.profile_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open profile: {}", dir.display()))?;
        let widget = HostedCheckoutWidget::new(&self.config.payment.checkout_url)?
            .with_client_key(self.config.payment.client_key.clone());

        self.output.debug(&format!("Profile: {}", dir.display()));
        let shop = Storefront::builder(self.config.clone())
            .store(store)
            .widget(widget.clone())
            .open()
            .await?;
        Ok((shop, widget))
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Get the platform-specific data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".shop.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join(".shop.toml")));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("shop.toml"), "").unwrap();
        std::fs::write(nested.join("shop.json"), "{}").unwrap();

        assert_eq!(find_config(&nested), Some(nested.join("shop.json")));
    }

    #[test]
    fn test_relative_storage_dir_follows_config_file() {
        let root = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.storage.dir = Some(PathBuf::from(".shop"));
        let ctx = Context {
            config,
            config_path: Some(root.path().join("shop.toml")),
            output: Output::new(false, false),
            cwd: PathBuf::from("/"),
        };
        assert_eq!(ctx.profile_dir(), root.path().join(".shop"));
    }
}
