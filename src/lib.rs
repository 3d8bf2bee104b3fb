//! Skein/Fortuna Cryptographic Primitives
//!
//! A tweakable-block-cipher-based hash/MAC family (Skein over Threefish)
//! and a continuously-reseeded pseudo-random generator (Fortuna).
//!
//! # Architecture
//!
//! ```text
//! threefish ── skein (UBI engine, config, MAC)
//!
//! seed material ── fortuna pools ── reseed policy ── generator
//! ```
//!
//! # Design Principles
//!
//! - **Explicit validation**: misconfiguration surfaces as typed errors
//!   at construction, never as panics
//! - **No hidden ambient state**: the only real-world input is the clock
//!   gating Fortuna reseeds, and it is injectable for testing
//! - **Owned buffers**: accessors exposing internal state return
//!   independent copies
//! - **No side-channel claims**: these are reference-quality portable
//!   implementations, not hardened constant-time code
//!
//! # Example
//!
//! ```
//! use skein_fortuna::{FortunaGenerator, SkeinEngine, SkeinMac};
//!
//! // Hash a message with Skein-512.
//! let mut hasher = SkeinEngine::new(512, 512).unwrap();
//! hasher.update(b"message");
//! let digest = hasher.finalize();
//! assert_eq!(digest.len(), 64);
//!
//! // Authenticate it under a key.
//! let mut mac = SkeinMac::new(b"secret key", 512, 128).unwrap();
//! mac.update(b"message");
//! let tag = mac.finalize();
//! assert_eq!(tag.len(), 16);
//!
//! // Draw pseudo-random bytes, feeding back entropy as it arrives.
//! let mut prng = FortunaGenerator::new(b"initial seed");
//! prng.add_seed_material(b"whatever unpredictable data the app has");
//! let mut buf = [0u8; 32];
//! prng.next_bytes(&mut buf);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod fortuna;
pub mod skein;
pub mod threefish;

// Re-export commonly used types at crate root
pub use fortuna::{Clock, FortunaError, FortunaGenerator, ManualClock, SystemClock};
pub use skein::{BlockType, SkeinConfig, SkeinEngine, SkeinError, SkeinMac, UbiTweak};
pub use threefish::Threefish;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
