//! Digest primitive for hashlink.
//!
//! Provides domain-separated BLAKE3 hashing with hex-encoded output. Block
//! hashes in the ledger are produced exclusively through [`ContentHasher`].
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, DIGEST_HEX_LEN};
