use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::block::Block;

/// Result of chain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    /// Tip height at validation time; `None` for an empty ledger.
    pub tip: Option<u64>,
    /// Number of heights examined (`tip + 1`).
    pub blocks_checked: u64,
    /// Every violation found, in discovery order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Height of each violation in discovery order.
    ///
    /// A height appears once per failed check, so it may repeat.
    pub fn error_heights(&self) -> Vec<u64> {
        self.violations.iter().map(|v| v.height).collect()
    }

    /// Distinct heights with at least one violation.
    pub fn offending_heights(&self) -> BTreeSet<u64> {
        self.violations.iter().map(|v| v.height).collect()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Height the failed check is attributed to.
    pub height: u64,
    /// Which check failed.
    pub kind: ViolationKind,
}

/// Category of integrity violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// The stored hash is not the digest of the block's content.
    HashMismatch,
    /// The block's hash differs from the next block's `previous_hash`.
    BrokenLink,
    /// The record stored under this height carries another height.
    HeightMismatch,
    /// The genesis block links to a predecessor.
    GenesisHasPreviousHash,
    /// No record is stored at a height at or below the tip.
    MissingBlock,
}

/// Chain integrity validator over blocks fetched by height.
pub struct ChainValidator;

impl ChainValidator {
    /// Validate `blocks`, where `blocks[i]` is the record stored at height
    /// `i` (or `None` if absent) for every height up to the tip.
    ///
    /// Every present block has its own hash checked, including the tip.
    /// Every adjacent pair has its link checked.
    pub fn validate(tip: Option<u64>, blocks: &[Option<Block>]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut flag = |height: usize, kind| {
            violations.push(Violation {
                height: height as u64,
                kind,
            })
        };

        for (i, slot) in blocks.iter().enumerate() {
            let Some(block) = slot else {
                flag(i, ViolationKind::MissingBlock);
                continue;
            };

            if block.height != i as u64 {
                flag(i, ViolationKind::HeightMismatch);
            }
            if i == 0 && !block.previous_hash.is_empty() {
                flag(i, ViolationKind::GenesisHasPreviousHash);
            }
            if !block.validate_hash() {
                flag(i, ViolationKind::HashMismatch);
            }
            if let Some(Some(next)) = blocks.get(i + 1) {
                if block.hash != next.previous_hash {
                    flag(i, ViolationKind::BrokenLink);
                }
            }
        }

        let report = ValidationReport {
            tip,
            blocks_checked: blocks.len() as u64,
            violations,
        };

        if report.is_valid() {
            info!(blocks = report.blocks_checked, "no errors detected");
        } else {
            warn!(
                errors = report.violations.len(),
                heights = ?report.error_heights(),
                "chain validation failed"
            );
        }
        report
    }
}
