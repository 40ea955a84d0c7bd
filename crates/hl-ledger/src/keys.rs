//! Storage keys used by the ledger.

/// Key of the persisted tip pointer (decimal height of the last block).
pub const TIP_KEY: &str = "tip";

/// Key under which the block at `height` is stored.
pub fn block_key(height: u64) -> String {
    height.to_string()
}

/// Height encoded in a block key, or `None` for any other key.
pub fn parse_block_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_keys_roundtrip() {
        for height in [0, 7, 10, u64::MAX] {
            assert_eq!(parse_block_key(&block_key(height)), Some(height));
        }
    }

    #[test]
    fn non_block_keys_are_ignored() {
        assert_eq!(parse_block_key(TIP_KEY), None);
        assert_eq!(parse_block_key(""), None);
        assert_eq!(parse_block_key("+1"), None);
        assert_eq!(parse_block_key("99999999999999999999999"), None);
    }
}
