/// Length of a hex-encoded digest (32 bytes, two characters per byte).
pub const DIGEST_HEX_LEN: usize = 64;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"hashlink-block-v1"`) that is
/// prepended to every hash computation, so identical bytes hashed under two
/// domains never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for ledger blocks.
    pub const BLOCK: Self = Self {
        domain: "hashlink-block-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = self.start();
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes and return the lowercase hex digest.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// Hash an ordered list of fields and return the hex digest.
    ///
    /// Every field is prefixed with its length as a little-endian `u64`, so
    /// `["ab", "c"]` and `["a", "bc"]` hash differently. The order of
    /// `fields` is part of the digest.
    pub fn hash_fields(&self, fields: &[&[u8]]) -> String {
        let mut hasher = self.start();
        for field in fields {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        hex::encode(hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected hex digest.
    pub fn verify_hex(&self, data: &[u8], expected: &str) -> bool {
        self.hash_hex(data).eq_ignore_ascii_case(expected)
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}
