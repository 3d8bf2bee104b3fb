//! The Skein hash engine.
//!
//! A state machine over three phases: absorb (streaming `update`),
//! finalize (pad and process the last block), and squeeze (counter-mode
//! output expansion). Each processed block keys the Threefish cipher with
//! the current chaining state, encrypts the block under the running UBI
//! tweak, and XORs the ciphertext back into the state (feed-forward).
//!
//! The input buffer is flushed lazily: a full buffer is only processed
//! once more input arrives, so at finalize time the last block — full or
//! partial — is always still buffered and can carry the final-block flag.

use super::config::SkeinConfig;
use super::tweak::{BlockType, UbiTweak};
use super::SkeinError;
use crate::threefish::Threefish;

/// Schema tag for the configuration block ("SHA3").
const SCHEMA: &[u8; 4] = b"SHA3";

/// Configuration version used by this implementation.
const VERSION: u32 = 1;

/// Streaming Skein hash engine.
///
/// Supports state widths of 256, 512, and 1024 bits and any output size
/// greater than zero bits. One instance is single-threaded; callers must
/// serialize access.
#[derive(Debug)]
pub struct SkeinEngine {
    cipher: Threefish,
    state_bits: usize,
    state_bytes: usize,
    output_bits: usize,
    output_bytes: usize,
    input_buffer: Vec<u8>,
    bytes_filled: usize,
    cipher_input: Vec<u64>,
    state: Vec<u64>,
    config: SkeinConfig,
    tweak: UbiTweak,
}

impl SkeinEngine {
    /// Creates a plain (unkeyed) hash engine.
    pub fn new(state_bits: usize, output_bits: usize) -> Result<Self, SkeinError> {
        let mut engine = Self::allocate(state_bits, output_bits)?;
        engine.config.generate_configuration()?;
        engine.reset();
        Ok(engine)
    }

    /// Creates a keyed engine (MAC mode).
    ///
    /// A non-empty key is absorbed in a full UBI pass of block type Key;
    /// the resulting pre-hash becomes the chaining value under which the
    /// configuration block is derived, binding the configuration to the
    /// key. An empty key degenerates to the plain construction.
    pub fn with_key(state_bits: usize, output_bits: usize, key: &[u8]) -> Result<Self, SkeinError> {
        let mut engine = Self::allocate(state_bits, output_bits)?;

        if !key.is_empty() {
            // The key pre-hash is exactly one state wide.
            engine.tweak.start_new_block_type(BlockType::Key);
            engine.update(key);
            engine.final_pad();
        }

        // Bind the configuration block to the key-derived chaining value.
        let chained = engine.state.clone();
        engine.config.generate_configuration_chained(&chained)?;
        engine.reset();
        Ok(engine)
    }

    fn allocate(state_bits: usize, output_bits: usize) -> Result<Self, SkeinError> {
        if output_bits == 0 {
            return Err(SkeinError::OutputSizeTooSmall);
        }
        let cipher = Threefish::new(state_bits)?;
        let state_words = cipher.block_words();
        let state_bytes = state_bits / 8;

        let mut config = SkeinConfig::new(state_bits, output_bits)?;
        config.set_schema(SCHEMA)?;
        config.set_version(VERSION)?;

        Ok(Self {
            cipher,
            state_bits,
            state_bytes,
            output_bits,
            output_bytes: (output_bits + 7) / 8,
            input_buffer: vec![0u8; state_bytes],
            bytes_filled: 0,
            cipher_input: vec![0u64; state_words],
            state: vec![0u64; state_words],
            config,
            tweak: UbiTweak::new(),
        })
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            // Flush only when more input arrives, keeping the final block
            // in the buffer for finalize.
            if self.bytes_filled == self.state_bytes {
                self.input_buffer_to_cipher_input();
                self.process_block(self.state_bytes);
                self.tweak.set_first_block(false);
                self.bytes_filled = 0;
            }
            let take = (self.state_bytes - self.bytes_filled).min(data.len());
            self.input_buffer[self.bytes_filled..self.bytes_filled + take]
                .copy_from_slice(&data[..take]);
            self.bytes_filled += take;
            data = &data[take..];
        }
    }

    /// Absorbs a single byte.
    pub fn update_byte(&mut self, byte: u8) {
        self.update(&[byte]);
    }

    /// Finalizes the hash, returning the digest and resetting the engine
    /// for the next message.
    ///
    /// The digest is produced by counter-mode expansion: each output
    /// chunk is one Out-type block over an 8-byte little-endian chunk
    /// counter, processed from a saved copy of the post-absorb chaining
    /// state. The last chunk is truncated to the exact output length.
    pub fn finalize(&mut self) -> Vec<u8> {
        // Zero-pad and process the residual buffer as the final block.
        for b in &mut self.input_buffer[self.bytes_filled..] {
            *b = 0;
        }
        self.input_buffer_to_cipher_input();
        self.tweak.set_final_block(true);
        self.process_block(self.bytes_filled);

        // Counter-mode squeeze. The cipher input carries only the chunk
        // counter in word 0.
        self.cipher_input.fill(0);

        let mut hash = vec![0u8; self.output_bytes];
        let saved_state = self.state.clone();

        let mut offset = 0;
        while offset < self.output_bytes {
            self.tweak.start_new_block_type(BlockType::Out);
            self.tweak.set_final_block(true);
            self.process_block(8);

            let chunk = (self.output_bytes - offset).min(self.state_bytes);
            put_bytes(&self.state, &mut hash[offset..offset + chunk]);

            // processBlock mutated the state; restore before the next chunk.
            self.state.copy_from_slice(&saved_state);
            self.cipher_input[0] = self.cipher_input[0].wrapping_add(1);
            offset += self.state_bytes;
        }

        self.reset();
        hash
    }

    /// Finalizes into a caller buffer at `offset`, returning the number
    /// of bytes written.
    pub fn finalize_into(&mut self, out: &mut [u8], offset: usize) -> Result<usize, SkeinError> {
        let available = out.len().saturating_sub(offset);
        if available < self.output_bytes {
            return Err(SkeinError::OutputBufferTooSmall {
                needed: self.output_bytes,
                available,
            });
        }
        let hash = self.finalize();
        out[offset..offset + hash.len()].copy_from_slice(&hash);
        Ok(hash.len())
    }

    /// Pads and processes the final block without output expansion,
    /// leaving the raw chaining value in the state. Used for the key
    /// pre-hash, whose result is consumed as words, not bytes.
    fn final_pad(&mut self) {
        for b in &mut self.input_buffer[self.bytes_filled..] {
            *b = 0;
        }
        self.input_buffer_to_cipher_input();
        self.tweak.set_final_block(true);
        self.process_block(self.bytes_filled);
    }

    /// One UBI block: key the cipher with the chaining state, advance the
    /// tweak by the bytes consumed, encrypt, feed forward.
    fn process_block(&mut self, bytes: usize) {
        self.cipher.set_key(&self.state);
        self.tweak.add_bits_processed(bytes);
        self.cipher.set_tweak(self.tweak.tweak_words());

        self.cipher.encrypt(&self.cipher_input, &mut self.state);

        for (word, input) in self.state.iter_mut().zip(&self.cipher_input) {
            *word ^= input;
        }
    }

    fn input_buffer_to_cipher_input(&mut self) {
        let chunks = self.input_buffer.chunks_exact(8);
        for (word, chunk) in self.cipher_input.iter_mut().zip(chunks) {
            *word = u64::from_le_bytes(chunk.try_into().expect("chunks_exact yields 8 bytes"));
        }
    }

    /// Reloads the configuration-derived chaining value and restarts the
    /// Message block sequence.
    pub fn reset(&mut self) {
        self.state.copy_from_slice(self.config.config_value());
        self.tweak.start_new_block_type(BlockType::Message);
        self.bytes_filled = 0;
    }

    /// Reloads a caller-saved chaining value (the MAC reset path) and
    /// restarts the Message block sequence.
    pub fn restore_state(&mut self, external_state: &[u64]) {
        for (word, saved) in self.state.iter_mut().zip(external_state) {
            *word = *saved;
        }
        self.tweak.start_new_block_type(BlockType::Message);
        self.bytes_filled = 0;
    }

    /// Returns an independent copy of the chaining state words.
    pub fn state(&self) -> Vec<u64> {
        self.state.clone()
    }

    /// The internal state width in bits.
    pub fn state_size(&self) -> usize {
        self.state_bits
    }

    /// The output size in bits.
    pub fn output_size_bits(&self) -> usize {
        self.output_bits
    }

    /// The digest size in bytes (ceil of the bit size over 8).
    pub fn output_size(&self) -> usize {
        self.output_bytes
    }

    /// The cipher block length in bytes.
    pub fn block_size(&self) -> usize {
        self.state_bytes
    }
}

/// Serializes state words little-endian into `out`, stopping at its end.
fn put_bytes(words: &[u64], out: &mut [u8]) {
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (words[i >> 3] >> (8 * (i & 7))) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// The standard reference input: 255, 254, 253, ...
    fn descending_vector(len: usize) -> Vec<u8> {
        (0..len).map(|i| (255 - i) as u8).collect()
    }

    // Reference digests computed with the optimized implementation from
    // the Skein team's NIST submission (v1.3).
    const SKEIN_256_256: [u8; 32] = [
        0xDF, 0x28, 0xE9, 0x16, 0x63, 0x0D, 0x0B, 0x44, 0xC4, 0xA8, 0x49, 0xDC, 0x9A, 0x02, 0xF0,
        0x7A, 0x07, 0xCB, 0x30, 0xF7, 0x32, 0x31, 0x82, 0x56, 0xB1, 0x5D, 0x86, 0x5A, 0xC4, 0xAE,
        0x16, 0x2F,
    ];

    const SKEIN_512_512: [u8; 64] = [
        0x91, 0xcc, 0xa5, 0x10, 0xc2, 0x63, 0xc4, 0xdd, 0xd0, 0x10, 0x53, 0x0a, 0x33, 0x07, 0x33,
        0x09, 0x62, 0x86, 0x31, 0xf3, 0x08, 0x74, 0x7e, 0x1b, 0xcb, 0xaa, 0x90, 0xe4, 0x51, 0xca,
        0xb9, 0x2e, 0x51, 0x88, 0x08, 0x7a, 0xf4, 0x18, 0x87, 0x73, 0xa3, 0x32, 0x30, 0x3e, 0x66,
        0x67, 0xa7, 0xa2, 0x10, 0x85, 0x6f, 0x74, 0x21, 0x39, 0x00, 0x00, 0x71, 0xf4, 0x8e, 0x8b,
        0xa2, 0xa5, 0xad, 0xb7,
    ];

    const SKEIN_1024_1024: [u8; 128] = [
        0x1F, 0x3E, 0x02, 0xC4, 0x6F, 0xB8, 0x0A, 0x3F, 0xCD, 0x2D, 0xFB, 0xBC, 0x7C, 0x17, 0x38,
        0x00, 0xB4, 0x0C, 0x60, 0xC2, 0x35, 0x4A, 0xF5, 0x51, 0x18, 0x9E, 0xBF, 0x43, 0x3C, 0x3D,
        0x85, 0xF9, 0xFF, 0x18, 0x03, 0xE6, 0xD9, 0x20, 0x49, 0x31, 0x79, 0xED, 0x7A, 0xE7, 0xFC,
        0xE6, 0x9C, 0x35, 0x81, 0xA5, 0xA2, 0xF8, 0x2D, 0x3E, 0x0C, 0x7A, 0x29, 0x55, 0x74, 0xD0,
        0xCD, 0x7D, 0x21, 0x7C, 0x48, 0x4D, 0x2F, 0x63, 0x13, 0xD5, 0x9A, 0x77, 0x18, 0xEA, 0xD0,
        0x7D, 0x07, 0x29, 0xC2, 0x48, 0x51, 0xD7, 0xE7, 0xD2, 0x49, 0x1B, 0x90, 0x2D, 0x48, 0x91,
        0x94, 0xE6, 0xB7, 0xD3, 0x69, 0xDB, 0x0A, 0xB7, 0xAA, 0x10, 0x6F, 0x0E, 0xE0, 0xA3, 0x9A,
        0x42, 0xEF, 0xC5, 0x4F, 0x18, 0xD9, 0x37, 0x76, 0x08, 0x09, 0x85, 0xF9, 0x07, 0x57, 0x4F,
        0x99, 0x5E, 0xC6, 0xA3, 0x71, 0x53, 0xA5, 0x78,
    ];

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn test_skein_256_256_reference_vector() {
        let mut engine = SkeinEngine::new(256, 256).unwrap();
        engine.update(&descending_vector(64));
        assert_eq!(engine.finalize(), SKEIN_256_256);
    }

    #[test]
    fn test_skein_512_512_reference_vector() {
        let mut engine = SkeinEngine::new(512, 512).unwrap();
        engine.update(&descending_vector(128));
        assert_eq!(engine.finalize(), SKEIN_512_512);
    }

    #[test]
    fn test_skein_1024_1024_reference_vector() {
        let mut engine = SkeinEngine::new(1024, 1024).unwrap();
        engine.update(&descending_vector(128));
        assert_eq!(engine.finalize(), SKEIN_1024_1024);
    }

    #[test]
    fn test_skein_512_empty_message() {
        let mut engine = SkeinEngine::new(512, 512).unwrap();
        assert_eq!(
            hex(&engine.finalize()),
            "bc5b4c50925519c290cc634277ae3d6257212395cba733bbad37a4af0fa06af4\
             1fca7903d06564fea7a2d3730dbdb80c1f85562dfcc070334ea4d1d9e72cba7a"
        );
    }

    #[test]
    fn test_skein_512_published_strings() {
        let mut engine = SkeinEngine::new(512, 512).unwrap();
        engine.update(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            hex(&engine.finalize()),
            "94c2ae036dba8783d0b3f7d6cc111ff810702f5c77707999be7e1c9486ff238a\
             7044de734293147359b4ac7e1d09cd247c351d69826b78dcddd951f0ef912713"
        );

        // The engine reset itself; it must now hash a fresh message.
        engine.update(b"The quick brown fox jumps over the lazy cog");
        assert_eq!(
            hex(&engine.finalize()),
            "7f81113575e4b4d3441940e87aca331e6d63d103fe5107f29cd877af0d0f5e0e\
             a34164258c60da5190189d0872e63a96596d2ef25e709099842da71d64111e0f"
        );
    }

    #[test]
    fn test_finalize_resets_for_identical_rerun() {
        let input = descending_vector(128);
        let mut engine = SkeinEngine::new(512, 512).unwrap();

        engine.update(&input);
        let first = engine.finalize();
        engine.update(&input);
        let second = engine.finalize();

        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_reset_discards_partial_input() {
        let mut engine = SkeinEngine::new(256, 256).unwrap();
        engine.update(b"to be discarded");
        engine.reset();

        engine.update(&descending_vector(64));
        assert_eq!(engine.finalize(), SKEIN_256_256);
    }

    #[test]
    fn test_output_longer_than_state() {
        // 1024-bit output from a 512-bit state takes two counter-mode
        // chunks; it must be deterministic and its first chunk must not
        // equal the plain 512-bit digest's counter-0 chunk trivially
        // repeated.
        let mut engine = SkeinEngine::new(512, 1024).unwrap();
        engine.update(b"expand me");
        let out = engine.finalize();
        assert_eq!(out.len(), 128);
        assert_ne!(out[..64], out[64..]);

        engine.update(b"expand me");
        assert_eq!(engine.finalize(), out);
    }

    #[test]
    fn test_output_not_multiple_of_state_is_truncated() {
        let mut engine = SkeinEngine::new(512, 520).unwrap();
        engine.update(b"truncate");
        assert_eq!(engine.finalize().len(), 65);

        // Sub-byte sizes round up to whole bytes.
        let mut engine = SkeinEngine::new(512, 31).unwrap();
        engine.update(b"truncate");
        assert_eq!(engine.finalize().len(), 4);
    }

    #[test]
    fn test_finalize_into_bounds() {
        let mut engine = SkeinEngine::new(256, 256).unwrap();
        engine.update(b"abc");

        let mut small = [0u8; 16];
        assert_eq!(
            engine.finalize_into(&mut small, 0),
            Err(SkeinError::OutputBufferTooSmall {
                needed: 32,
                available: 16
            })
        );

        // The failed call must not have consumed the pending input.
        let mut out = [0u8; 40];
        let written = engine.finalize_into(&mut out, 8).unwrap();
        assert_eq!(written, 32);

        let mut check = SkeinEngine::new(256, 256).unwrap();
        check.update(b"abc");
        assert_eq!(&out[8..40], check.finalize().as_slice());
    }

    #[test]
    fn test_zero_output_size_rejected() {
        assert_eq!(
            SkeinEngine::new(512, 0).unwrap_err(),
            SkeinError::OutputSizeTooSmall
        );
    }

    #[test]
    fn test_byte_at_a_time_matches_slice_update() {
        let input = descending_vector(100);

        let mut whole = SkeinEngine::new(256, 256).unwrap();
        whole.update(&input);
        let expected = whole.finalize();

        let mut byte_wise = SkeinEngine::new(256, 256).unwrap();
        for &b in &input {
            byte_wise.update_byte(b);
        }
        assert_eq!(byte_wise.finalize(), expected);
    }

    #[test]
    fn test_state_accessor_returns_copy() {
        let engine = SkeinEngine::new(256, 256).unwrap();
        let mut snapshot = engine.state();
        snapshot[0] ^= 0xFFFF;
        assert_ne!(engine.state()[0], snapshot[0]);
    }

    proptest! {
        #[test]
        fn prop_streaming_invariance(
            input in proptest::collection::vec(any::<u8>(), 0..512),
            split_seed in any::<u64>(),
        ) {
            let mut whole = SkeinEngine::new(512, 512).unwrap();
            whole.update(&input);
            let expected = whole.finalize();

            // Deterministic pseudo-random split of the same input.
            let mut streamed = SkeinEngine::new(512, 512).unwrap();
            let mut rest = &input[..];
            let mut seed = split_seed;
            while !rest.is_empty() {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let take = (seed as usize % rest.len()) + 1;
                streamed.update(&rest[..take.min(rest.len())]);
                rest = &rest[take.min(rest.len())..];
            }
            prop_assert_eq!(streamed.finalize(), expected);
        }
    }
}
