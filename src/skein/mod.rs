//! Skein hash and MAC family.
//!
//! Skein builds a hash function from the Threefish tweakable block cipher
//! using the Unique Block Iteration (UBI) construction: every block is
//! encrypted under the current chaining value with a tweak that encodes
//! the block's position, type, and first/final flags, and the ciphertext
//! is XORed back into the block (feed-forward). The tweak encoding makes
//! blocks of different types (key, configuration, message, output)
//! incomparable, preventing cross-context collisions.

mod config;
mod engine;
mod mac;
mod tweak;

pub use config::SkeinConfig;
pub use engine::SkeinEngine;
pub use mac::SkeinMac;
pub use tweak::{BlockType, UbiTweak};

use thiserror::Error;

/// Errors raised by Skein parameter validation.
///
/// All variants are precondition failures raised synchronously at the
/// violating call; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkeinError {
    /// The requested output size was zero.
    #[error("output bit size must be greater than zero")]
    OutputSizeTooSmall,
    /// The internal state width is not one of 256, 512, or 1024 bits.
    #[error("unsupported state size: {0} bits (supported: 256, 512, 1024)")]
    UnsupportedStateSize(usize),
    /// The configuration schema tag is not exactly 4 bytes.
    #[error("configuration schema must be 4 bytes, got {0}")]
    InvalidSchemaLength(usize),
    /// The configuration version is outside 0..=3.
    #[error("configuration version must be between 0 and 3, got {0}")]
    VersionOutOfRange(u32),
    /// A tree max height of 1 was requested (must be 0 or >= 2).
    #[error("tree height must be zero or greater than one")]
    InvalidTreeHeight,
    /// A tree level above 63 was requested.
    #[error("tree level must be between 0 and 63, got {0}")]
    TreeLevelOutOfRange(u32),
    /// The caller-supplied output buffer cannot hold the digest.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputBufferTooSmall {
        /// Bytes the digest requires.
        needed: usize,
        /// Bytes available at the requested offset.
        available: usize,
    },
}
