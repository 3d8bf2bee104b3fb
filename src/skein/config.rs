//! Skein configuration block.
//!
//! The configuration string is a short, fixed UBI block hashed before any
//! message data. Word 0 packs the 4-byte schema tag and the 2-bit version,
//! word 1 carries the output length in bits, and word 2 the tree
//! parameters. Encrypting it (under an all-zero key, or under a chained
//! key-derived state in MAC mode) and feeding the ciphertext forward
//! yields the engine's initial chaining value.

use super::tweak::{BlockType, UbiTweak};
use super::SkeinError;
use crate::threefish::Threefish;

/// Derives the initial chaining state for a Skein engine.
///
/// An independent value type: it is constructed from the state width and
/// output size alone, and hands the derived state to the engine by value.
#[derive(Debug, Clone)]
pub struct SkeinConfig {
    state_bits: usize,
    config_string: Vec<u64>,
    config_value: Vec<u64>,
}

impl SkeinConfig {
    /// Creates a configuration for the given state width and output size.
    ///
    /// The output size lands in word 1 of the configuration string;
    /// schema and version still need to be set before generation.
    pub fn new(state_bits: usize, output_bits: usize) -> Result<Self, SkeinError> {
        // Validate the width up front so generation cannot fail later.
        let words = Threefish::new(state_bits)?.block_words();

        let mut config_string = vec![0u64; words];
        config_string[1] = output_bits as u64;

        Ok(Self {
            state_bits,
            config_string,
            config_value: vec![0u64; words],
        })
    }

    /// Sets the 4-byte schema tag in word 0.
    pub fn set_schema(&mut self, schema: &[u8]) -> Result<(), SkeinError> {
        if schema.len() != 4 {
            return Err(SkeinError::InvalidSchemaLength(schema.len()));
        }
        let mut word = self.config_string[0] & !0xffff_ffff;
        word |= u64::from(schema[0]);
        word |= u64::from(schema[1]) << 8;
        word |= u64::from(schema[2]) << 16;
        word |= u64::from(schema[3]) << 24;
        self.config_string[0] = word;
        Ok(())
    }

    /// Sets the 2-bit version field (bits 32–33 of word 0).
    pub fn set_version(&mut self, version: u32) -> Result<(), SkeinError> {
        if version > 3 {
            return Err(SkeinError::VersionOutOfRange(version));
        }
        self.config_string[0] &= !(0x03 << 32);
        self.config_string[0] |= u64::from(version) << 32;
        Ok(())
    }

    /// Sets the tree leaf size (byte 0 of word 2).
    pub fn set_tree_leaf_size(&mut self, size: u8) {
        self.config_string[2] &= !0xff;
        self.config_string[2] |= u64::from(size);
    }

    /// Sets the tree fan-out (byte 1 of word 2).
    pub fn set_tree_fan_out_size(&mut self, size: u8) {
        self.config_string[2] &= !(0xff << 8);
        self.config_string[2] |= u64::from(size) << 8;
    }

    /// Sets the maximum tree height (byte 2 of word 2). A height of 1 is
    /// meaningless and rejected; 0 means no tree hashing.
    pub fn set_max_tree_height(&mut self, height: u8) -> Result<(), SkeinError> {
        if height == 1 {
            return Err(SkeinError::InvalidTreeHeight);
        }
        self.config_string[2] &= !(0xff << 16);
        self.config_string[2] |= u64::from(height) << 16;
        Ok(())
    }

    /// Derives the initial chaining state under an all-zero cipher key.
    pub fn generate_configuration(&mut self) -> Result<(), SkeinError> {
        let cipher = Threefish::new(self.state_bits)?;
        self.encrypt_config(cipher);
        Ok(())
    }

    /// Derives the initial chaining state with the cipher keyed by a
    /// caller-supplied chaining value, binding the configuration block to
    /// a key-derived state (the keyed/MAC initialization path).
    pub fn generate_configuration_chained(
        &mut self,
        initial_state: &[u64],
    ) -> Result<(), SkeinError> {
        let mut cipher = Threefish::new(self.state_bits)?;
        cipher.set_key(initial_state);
        self.encrypt_config(cipher);
        Ok(())
    }

    fn encrypt_config(&mut self, mut cipher: Threefish) {
        let mut tweak = UbiTweak::new();
        tweak.start_new_block_type(BlockType::Config);
        tweak.set_final_block(true);
        tweak.set_bits_processed(32);

        cipher.set_tweak(tweak.tweak_words());
        cipher.encrypt(&self.config_string, &mut self.config_value);

        // Feed-forward over the three significant words; the rest of the
        // configuration string is always zero.
        self.config_value[0] ^= self.config_string[0];
        self.config_value[1] ^= self.config_string[1];
        self.config_value[2] ^= self.config_string[2];
    }

    /// The derived initial chaining state.
    pub fn config_value(&self) -> &[u64] {
        &self.config_value
    }
}
