//! The Fortuna generator function.
//!
//! A PRNG in its own right: AES-256 in counter mode over a 16-byte
//! little-endian counter, with two rekeying paths. External entropy
//! enters through [`Generator::add_random_bytes`], which replaces the key
//! with SHA-256(key ‖ seed). After every `next_bytes` call the generator
//! also rekeys from its own output stream, so compromise of the current
//! key reveals nothing about previously emitted bytes (forward secrecy).
//!
//! The counter is incremented on every block and on every rekey and is
//! never reset, so no counter value repeats within a key's lifetime.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use sha2::{Digest, Sha256};

/// AES block size in bytes.
const BLOCK_SIZE: usize = 16;

/// Generator key size in bytes (AES-256).
const KEY_SIZE: usize = 32;

/// Maximum bytes served per internal chunk before a forced self-rekey.
const REKEY_LIMIT: usize = 1 << 20;

/// The deterministic byte-stream core of Fortuna.
pub(crate) struct Generator {
    cipher: Aes256,
    key: [u8; KEY_SIZE],
    counter: [u8; BLOCK_SIZE],
    buffer: [u8; BLOCK_SIZE],
    ndx: usize,
}

impl Generator {
    /// Creates a generator, folding `seed` into the initial (zero) key.
    /// An empty seed leaves the zero key in place.
    pub(crate) fn new(seed: &[u8]) -> Self {
        let key = [0u8; KEY_SIZE];
        let mut generator = Self {
            cipher: Aes256::new(GenericArray::from_slice(&key)),
            key,
            counter: [0u8; BLOCK_SIZE],
            buffer: [0u8; BLOCK_SIZE],
            ndx: 0,
        };
        if !seed.is_empty() {
            generator.add_random_bytes(seed);
        }
        generator.fill_block();
        generator
    }

    /// Folds seed material into the key: key = SHA-256(key ‖ seed), then
    /// resets the cipher key and advances the counter. This is how pool
    /// digests and external reseeds enter the generator.
    pub(crate) fn add_random_bytes(&mut self, seed: &[u8]) {
        let mut hash = Sha256::new();
        hash.update(self.key);
        hash.update(seed);
        self.key.copy_from_slice(&hash.finalize());
        self.reset_key();
        self.increment_counter();
    }

    /// Serves `out.len()` bytes, self-rekeying from the output stream
    /// after every chunk of at most [`REKEY_LIMIT`] bytes and leaving a
    /// freshly filled buffer behind.
    pub(crate) fn next_bytes(&mut self, out: &mut [u8]) {
        let mut count = 0;
        loop {
            let amount = REKEY_LIMIT.min(out.len() - count);
            self.next_bytes_internal(&mut out[count..count + amount]);
            count += amount;

            // Draw the next key from our own output stream.
            let mut offset = 0;
            while offset < KEY_SIZE {
                self.fill_block();
                let take = (KEY_SIZE - offset).min(BLOCK_SIZE);
                self.key[offset..offset + take].copy_from_slice(&self.buffer[..take]);
                offset += take;
            }
            self.reset_key();

            if count >= out.len() {
                break;
            }
        }
        self.fill_block();
        self.ndx = 0;
    }

    fn next_bytes_internal(&mut self, out: &mut [u8]) {
        if out.is_empty() {
            return;
        }
        if self.ndx >= BLOCK_SIZE {
            self.fill_block();
            self.ndx = 0;
        }
        let mut count = 0;
        while count < out.len() {
            let amount = (BLOCK_SIZE - self.ndx).min(out.len() - count);
            out[count..count + amount].copy_from_slice(&self.buffer[self.ndx..self.ndx + amount]);
            count += amount;
            self.ndx += amount;
            if self.ndx >= BLOCK_SIZE {
                self.fill_block();
                self.ndx = 0;
            }
        }
    }

    /// Encrypts the counter into the buffer and increments the counter.
    fn fill_block(&mut self) {
        let mut block = GenericArray::clone_from_slice(&self.counter);
        self.cipher.encrypt_block(&mut block);
        self.buffer.copy_from_slice(&block);
        self.increment_counter();
    }

    /// Re-installs the current key into the cipher.
    fn reset_key(&mut self) {
        self.cipher = Aes256::new(GenericArray::from_slice(&self.key));
    }

    /// Increments the counter as a 16-byte little-endian integer.
    fn increment_counter(&mut self) {
        for byte in self.counter.iter_mut() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }
}
