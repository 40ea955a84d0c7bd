use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Payload of the block created when a ledger starts out empty.
pub const DEFAULT_GENESIS_BODY: &str = "First block in the chain - Genesis block";

/// What [`Ledger::reset`](crate::Ledger::reset) removes from storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetMode {
    /// Delete the tip pointer and every stored block record.
    #[default]
    Purge,
    /// Delete only the tip pointer; old records stay until overwritten.
    TipOnly,
}

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Body of the genesis block.
    pub genesis_body: String,
    /// Storage cleanup performed by `reset`.
    pub reset_mode: ResetMode,
    /// Name of the operation queue, used in log fields.
    pub queue_name: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            genesis_body: DEFAULT_GENESIS_BODY.to_string(),
            reset_mode: ResetMode::default(),
            queue_name: "ledger".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.genesis_body, DEFAULT_GENESIS_BODY);
        assert_eq!(c.reset_mode, ResetMode::Purge);
        assert_eq!(c.queue_name, "ledger");
    }

    #[test]
    fn parses_partial_toml() {
        let c = LedgerConfig::from_toml_str("reset_mode = \"tip-only\"\n").unwrap();
        assert_eq!(c.reset_mode, ResetMode::TipOnly);
        assert_eq!(c.genesis_body, DEFAULT_GENESIS_BODY);
    }

    #[test]
    fn rejects_unknown_reset_mode() {
        let err = LedgerConfig::from_toml_str("reset_mode = \"shred\"").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, "genesis_body = \"hello\"\n").unwrap();
        let c = LedgerConfig::load(&path).unwrap();
        assert_eq!(c.genesis_body, "hello");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = LedgerConfig::load(Path::new("/nonexistent/ledger.toml")).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
