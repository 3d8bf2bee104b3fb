//! UBI tweak value.
//!
//! The tweak is two 64-bit words carried across a UBI block sequence.
//! Word 0 holds the low 64 bits of the processed-bytes counter. Word 1
//! packs, by bit position:
//!
//! - bits 0–31: processed-bytes counter, high 32 bits
//! - bits 48–54: tree level
//! - bits 56–61: block type
//! - bit 62: first-block flag
//! - bit 63: final-block flag
//!
//! The raw words never leave this type except as copies handed to the
//! cipher.

use super::SkeinError;

const T1_FLAG_FINAL: u64 = 1 << 63;
const T1_FLAG_FIRST: u64 = 1 << 62;

/// UBI block type codes, bits 56–61 of tweak word 1.
///
/// The type separates UBI invocations by purpose so that, for example, a
/// key block and a message block with identical bytes can never produce
/// the same chaining value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Key material for the keyed (MAC) mode.
    Key,
    /// The configuration block.
    Config,
    /// Personalization string.
    Personalization,
    /// Public key (for signature hashing).
    PublicKey,
    /// Key identifier.
    KeyIdentifier,
    /// Nonce.
    Nonce,
    /// Message content.
    Message,
    /// Output (counter-mode) blocks.
    Out,
}

impl BlockType {
    /// The 6-bit type code.
    pub fn code(self) -> u64 {
        match self {
            BlockType::Key => 0,
            BlockType::Config => 4,
            BlockType::Personalization => 8,
            BlockType::PublicKey => 12,
            BlockType::KeyIdentifier => 16,
            BlockType::Nonce => 20,
            BlockType::Message => 48,
            BlockType::Out => 63,
        }
    }
}

/// The two-word UBI tweak, tracked across one block sequence.
#[derive(Debug, Clone, Default)]
pub struct UbiTweak {
    tweak: [u64; 2],
}

impl UbiTweak {
    /// Creates a zeroed tweak.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the first-block flag is set.
    pub fn is_first_block(&self) -> bool {
        self.tweak[1] & T1_FLAG_FIRST != 0
    }

    /// Sets or clears the first-block flag.
    pub fn set_first_block(&mut self, value: bool) {
        if value {
            self.tweak[1] |= T1_FLAG_FIRST;
        } else {
            self.tweak[1] &= !T1_FLAG_FIRST;
        }
    }

    /// Returns true if the final-block flag is set.
    pub fn is_final_block(&self) -> bool {
        self.tweak[1] & T1_FLAG_FINAL != 0
    }

    /// Sets or clears the final-block flag.
    pub fn set_final_block(&mut self, value: bool) {
        if value {
            self.tweak[1] |= T1_FLAG_FINAL;
        } else {
            self.tweak[1] &= !T1_FLAG_FINAL;
        }
    }

    /// Returns the tree level (bits 48–54 of word 1).
    pub fn tree_level(&self) -> u8 {
        ((self.tweak[1] >> 48) & 0x7f) as u8
    }

    /// Sets the tree level. Levels above 63 are rejected.
    pub fn set_tree_level(&mut self, level: u32) -> Result<(), SkeinError> {
        if level > 63 {
            return Err(SkeinError::TreeLevelOutOfRange(level));
        }
        self.tweak[1] &= !(0x7f << 48);
        self.tweak[1] |= u64::from(level) << 48;
        Ok(())
    }

    /// Returns the processed-bytes counter as (low 64, high 32) words.
    pub fn bits_processed(&self) -> [u64; 2] {
        [self.tweak[0], self.tweak[1] & 0xffff_ffff]
    }

    /// Sets the low word of the processed-bytes counter directly.
    pub fn set_bits_processed(&mut self, value: u64) {
        self.tweak[0] = value;
    }

    /// Adds `count` to the 96-bit processed counter.
    ///
    /// The counter is carried across three 32-bit limbs spanning bit
    /// positions [0,32), [32,64), and [64,96), then repacked into the two
    /// tweak words.
    pub fn add_bits_processed(&mut self, count: usize) {
        let mut words = [
            self.tweak[0] & 0xffff_ffff,
            (self.tweak[0] >> 32) & 0xffff_ffff,
            self.tweak[1] & 0xffff_ffff,
        ];

        let mut carry = count as u64;
        for w in words.iter_mut() {
            carry += *w;
            *w = carry;
            carry >>= 32;
        }
        self.tweak[0] = (words[0] & 0xffff_ffff) | ((words[1] & 0xffff_ffff) << 32);
        self.tweak[1] |= words[2] & 0xffff_ffff;
    }

    /// Returns the 6-bit block type code.
    pub fn block_type(&self) -> u64 {
        (self.tweak[1] >> 56) & 0x3f
    }

    /// Sets the block type, clearing every other field of word 1.
    pub fn set_block_type(&mut self, block_type: BlockType) {
        self.tweak[1] = block_type.code() << 56;
    }

    /// Starts a new UBI block sequence: zeroes the processed counter,
    /// sets the block type, and raises the first-block flag.
    pub fn start_new_block_type(&mut self, block_type: BlockType) {
        self.set_bits_processed(0);
        self.set_block_type(block_type);
        self.set_first_block(true);
    }

    /// Returns a copy of the two raw tweak words.
    pub fn tweak_words(&self) -> [u64; 2] {
        self.tweak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_new_block_type_resets_counter_and_flags() {
        let mut tweak = UbiTweak::new();
        tweak.add_bits_processed(1000);
        tweak.set_final_block(true);

        tweak.start_new_block_type(BlockType::Message);

        assert_eq!(tweak.bits_processed(), [0, 0]);
        assert_eq!(tweak.block_type(), 48);
        assert!(tweak.is_first_block());
        assert!(!tweak.is_final_block());
    }

    #[test]
    fn test_flags_occupy_top_bits() {
        let mut tweak = UbiTweak::new();
        tweak.set_final_block(true);
        assert_eq!(tweak.tweak_words()[1], 1 << 63);
        tweak.set_first_block(true);
        assert_eq!(tweak.tweak_words()[1], (1 << 63) | (1 << 62));

        tweak.set_final_block(false);
        tweak.set_first_block(false);
        assert_eq!(tweak.tweak_words()[1], 0);
    }

    #[test]
    fn test_add_carries_into_high_limb() {
        let mut tweak = UbiTweak::new();
        tweak.set_bits_processed(u64::MAX - 3);
        tweak.add_bits_processed(10);

        assert_eq!(tweak.bits_processed(), [6, 1]);
    }

    #[test]
    fn test_add_accumulates() {
        let mut tweak = UbiTweak::new();
        tweak.add_bits_processed(64);
        tweak.add_bits_processed(64);
        tweak.add_bits_processed(13);

        assert_eq!(tweak.bits_processed(), [141, 0]);
    }

    #[test]
    fn test_block_type_codes() {
        assert_eq!(BlockType::Key.code(), 0);
        assert_eq!(BlockType::Config.code(), 4);
        assert_eq!(BlockType::Personalization.code(), 8);
        assert_eq!(BlockType::PublicKey.code(), 12);
        assert_eq!(BlockType::KeyIdentifier.code(), 16);
        assert_eq!(BlockType::Nonce.code(), 20);
        assert_eq!(BlockType::Message.code(), 48);
        assert_eq!(BlockType::Out.code(), 63);
    }

    #[test]
    fn test_tree_level_range() {
        let mut tweak = UbiTweak::new();
        assert!(tweak.set_tree_level(63).is_ok());
        assert_eq!(tweak.tree_level(), 63);
        assert_eq!(
            tweak.set_tree_level(64),
            Err(SkeinError::TreeLevelOutOfRange(64))
        );
    }

    #[test]
    fn test_counter_does_not_disturb_type_or_flags() {
        let mut tweak = UbiTweak::new();
        tweak.start_new_block_type(BlockType::Out);
        tweak.set_final_block(true);
        tweak.add_bits_processed(8);

        assert_eq!(tweak.block_type(), 63);
        assert!(tweak.is_first_block());
        assert!(tweak.is_final_block());
        assert_eq!(tweak.bits_processed(), [8, 0]);
    }
}
