use std::path::{Path, PathBuf};

use anyhow::Context;
use hl_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hashlink.toml";

/// Contents of `hashlink.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory of the file-backed block store.
    pub data_dir: PathBuf,
    /// Fsync every stored value before it becomes visible.
    pub sync_writes: bool,
    pub ledger: LedgerConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".hashlink"),
            sync_writes: false,
            ledger: LedgerConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load `path` if given, else `hashlink.toml` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_ledger::ResetMode;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert_eq!(c.data_dir, PathBuf::from(".hashlink"));
        assert!(!c.sync_writes);
        assert_eq!(c.ledger, LedgerConfig::default());
    }

    #[test]
    fn nested_ledger_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashlink.toml");
        std::fs::write(
            &path,
            "data_dir = \"/var/lib/hashlink\"\n\n[ledger]\nreset_mode = \"tip-only\"\n",
        )
        .unwrap();

        let c = CliConfig::resolve(Some(&path)).unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/hashlink"));
        assert_eq!(c.ledger.reset_mode, ResetMode::TipOnly);
        assert_eq!(c.ledger.genesis_body, hl_ledger::DEFAULT_GENESIS_BODY);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "data_dir = [").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }
}
