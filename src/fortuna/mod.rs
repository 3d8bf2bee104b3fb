//! The Fortuna continuously-reseeded PRNG.
//!
//! Fortuna combines an entropy accumulator with the deterministic
//! generator in [`generator`]. Callers feed unpredictable data through
//! [`FortunaGenerator::add_seed_material`]; the data is hashed into 32
//! pools round-robin. Pool 0 drives reseeds: once it has accumulated 64
//! bytes and at least 100 ms have passed since the last reseed, the next
//! output request folds a selection of pool digests into the generator
//! key. Pool `i` participates in every 2^i-th reseed, so slowly filled
//! pools contribute rarely but with large accumulated entropy, defeating
//! attackers who can feed the accumulator at a chosen rate.
//!
//! This class of generator does no source polling: the application
//! decides what entropy is available and submits it.

mod clock;
mod generator;

pub use clock::{Clock, ManualClock, SystemClock};

use generator::Generator;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Size of the exported/imported seed state in bytes.
const SEED_FILE_SIZE: usize = 64;

/// Number of entropy pools.
const NUM_POOLS: usize = 32;

/// Bytes pool 0 must accumulate before a reseed may trigger.
const MIN_POOL_SIZE: usize = 64;

/// Minimum milliseconds between reseeds.
const RESEED_INTERVAL_MS: u64 = 100;

/// Size of the output serving buffer.
const BUFFER_SIZE: usize = 256;

/// Errors raised by Fortuna range operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FortunaError {
    /// The requested range does not fit in the supplied buffer.
    #[error("requested range out of bounds: offset={offset} length={length} limit={limit}")]
    OutOfBounds {
        /// Start offset of the requested range.
        offset: usize,
        /// Length of the requested range.
        length: usize,
        /// Length of the supplied buffer.
        limit: usize,
    },
}

/// Returns true if pool `index` contributes to reseed number `reseed_count`.
///
/// Pool 0 contributes to every reseed; pool i contributes once every 2^i
/// reseeds. Pools are consulted in increasing index order and the
/// included set is always a contiguous prefix.
fn pool_included(index: usize, reseed_count: u64) -> bool {
    index == 0 || reseed_count % (1u64 << index) == 0
}

/// The Fortuna PRNG: entropy pools, reseed policy, and generator.
pub struct FortunaGenerator {
    generator: Generator,
    pools: Vec<Sha256>,
    clock: Box<dyn Clock>,
    last_reseed: u64,
    pool_index: usize,
    pool0_count: usize,
    reseed_count: u64,
    buffer: [u8; BUFFER_SIZE],
    ndx: usize,
}

impl FortunaGenerator {
    /// Creates a generator from caller-supplied seed material, using the
    /// system wall clock for the reseed gate.
    pub fn new(seed: &[u8]) -> Self {
        Self::with_clock(seed, Box::new(SystemClock))
    }

    /// Creates a generator with an injected clock.
    pub fn with_clock(seed: &[u8], clock: Box<dyn Clock>) -> Self {
        let mut generator = Self {
            generator: Generator::new(seed),
            pools: (0..NUM_POOLS).map(|_| Sha256::new()).collect(),
            clock,
            last_reseed: 0,
            pool_index: 0,
            pool0_count: 0,
            reseed_count: 0,
            buffer: [0u8; BUFFER_SIZE],
            ndx: 0,
        };
        generator.fill_block();
        generator
    }

    /// Creates a generator seeded from the OS entropy source.
    ///
    /// Application-supplied seed material still supplements this initial
    /// seed through `add_seed_material`.
    pub fn from_os_entropy() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::new(&seed)
    }

    /// Refills the serving buffer, reseeding first if both the volume
    /// and the time gate hold.
    fn fill_block(&mut self) {
        if self.pool0_count >= MIN_POOL_SIZE
            && self.clock.now_millis().wrapping_sub(self.last_reseed) > RESEED_INTERVAL_MS
        {
            self.reseed_count += 1;
            let mut pools_used = 0;
            for i in 0..NUM_POOLS {
                if !pool_included(i, self.reseed_count) {
                    break;
                }
                // Finalizing resets the pool to a fresh hash state.
                let digest = self.pools[i].finalize_reset();
                self.generator.add_random_bytes(&digest);
                pools_used += 1;
            }
            self.last_reseed = self.clock.now_millis();
            self.pool0_count = 0;

            tracing::debug!(
                reseed_count = self.reseed_count,
                pools_used,
                "Fortuna reseeded from entropy pools"
            );
        }
        self.generator.next_bytes(&mut self.buffer);
    }

    /// Fills `out` with pseudo-random bytes.
    pub fn next_bytes(&mut self, out: &mut [u8]) {
        if out.is_empty() {
            return;
        }
        if self.ndx >= BUFFER_SIZE {
            self.fill_block();
            self.ndx = 0;
        }
        let mut count = 0;
        while count < out.len() {
            let amount = (BUFFER_SIZE - self.ndx).min(out.len() - count);
            out[count..count + amount].copy_from_slice(&self.buffer[self.ndx..self.ndx + amount]);
            count += amount;
            self.ndx += amount;
            if self.ndx >= BUFFER_SIZE {
                self.fill_block();
                self.ndx = 0;
            }
        }
    }

    /// Fills `out[offset..offset + length]`, validating the range.
    pub fn next_bytes_range(
        &mut self,
        out: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<(), FortunaError> {
        let end = offset.checked_add(length).ok_or(FortunaError::OutOfBounds {
            offset,
            length,
            limit: out.len(),
        })?;
        if end > out.len() {
            return Err(FortunaError::OutOfBounds {
                offset,
                length,
                limit: out.len(),
            });
        }
        self.next_bytes(&mut out[offset..end]);
        Ok(())
    }

    /// Hashes seed material into the pool at the current round-robin
    /// index.
    pub fn add_seed_material(&mut self, seed: &[u8]) {
        self.pools[self.pool_index].update(seed);
        if self.pool_index == 0 {
            self.pool0_count += seed.len();
        }
        self.pool_index = (self.pool_index + 1) % NUM_POOLS;
    }

    /// Hashes a 32-bit word of seed material (little-endian) into the
    /// current pool.
    pub fn add_seed_word(&mut self, word: u32) {
        self.pools[self.pool_index].update(word.to_le_bytes());
        if self.pool_index == 0 {
            self.pool0_count += 4;
        }
        self.pool_index = (self.pool_index + 1) % NUM_POOLS;
    }

    /// Exports a 64-byte seed value for persisting generator state
    /// across restarts.
    pub fn seed_status(&mut self) -> [u8; SEED_FILE_SIZE] {
        let mut seed = [0u8; SEED_FILE_SIZE];
        self.generator.next_bytes(&mut seed);
        seed
    }

    /// Imports a previously exported 64-byte seed value.
    pub fn set_seed_status(&mut self, seed: &[u8; SEED_FILE_SIZE]) {
        self.generator.add_random_bytes(seed);
        tracing::trace!("Fortuna seed status restored");
    }

    /// Number of reseeds performed so far.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Bytes currently accumulated in pool 0 since the last reseed.
    pub fn pool0_bytes(&self) -> usize {
        self.pool0_count
    }
}

impl RngCore for FortunaGenerator {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.next_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.next_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.next_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.next_bytes(dest);
        Ok(())
    }
}
