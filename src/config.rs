use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::auth::SharedSecretGate;

pub const DEFAULT_AUTH_SECRET: &str = "local-dev-secret";
pub const DEFAULT_PASSWORD: &str = "password";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub item_count: usize,
    pub pause_between_trials: bool,
    /// CSV seed list; the embedded corner list when unset
    pub seed_path: Option<PathBuf>,
    pub record_results: bool,
    pub auth_secret: String,
    /// Hex HMAC-SHA256 of the password, keyed by `auth_secret`
    pub password_hash: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            item_count: 10,
            pause_between_trials: true,
            seed_path: None,
            record_results: true,
            auth_secret: DEFAULT_AUTH_SECRET.to_string(),
            password_hash: SharedSecretGate::hash(DEFAULT_AUTH_SECRET, DEFAULT_PASSWORD),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                log::warn!("ignoring unreadable config {}: {err}", self.path.display());
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(io::Error::other)?;
        fs::write(&self.path, data)?;
        log::info!("saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            item_count: 25,
            pause_between_trials: false,
            seed_path: Some(PathBuf::from("/tmp/corners.csv")),
            record_results: false,
            auth_secret: "other".into(),
            password_hash: "abc123".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "item_count": 3 }"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.item_count, 3);
        assert!(loaded.pause_between_trials);
    }

    #[test]
    fn default_password_is_accepted() {
        let cfg = Config::default();
        let gate = SharedSecretGate::new(cfg.auth_secret, cfg.password_hash);
        assert!(gate.verify(&Credential::new(DEFAULT_PASSWORD)));
        assert!(!gate.verify(&Credential::new("guess")));
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }
}
