//! Keyed Skein MAC.
//!
//! A thin wrapper over a keyed [`SkeinEngine`]. The key pre-hash and the
//! chained configuration derivation happen once at construction; the
//! resulting chaining state is snapshotted so `reset` costs one state
//! copy instead of re-hashing the key.

use super::engine::SkeinEngine;
use super::SkeinError;

/// Message authentication code over the keyed Skein construction.
pub struct SkeinMac {
    engine: SkeinEngine,
    saved_state: Vec<u64>,
}

impl SkeinMac {
    /// Creates a MAC instance for `key` with the given state width and
    /// MAC size in bits.
    ///
    /// Construction performs the key UBI pass; the instance is ready for
    /// `update` immediately.
    pub fn new(key: &[u8], state_bits: usize, mac_size_bits: usize) -> Result<Self, SkeinError> {
        let engine = SkeinEngine::with_key(state_bits, mac_size_bits, key)?;
        let saved_state = engine.state();
        Ok(Self {
            engine,
            saved_state,
        })
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.engine.update(data);
    }

    /// Absorbs a single byte.
    pub fn update_byte(&mut self, byte: u8) {
        self.engine.update_byte(byte);
    }

    /// Produces the MAC into `out` at `offset`, returning the number of
    /// bytes written, then resets for the next message.
    pub fn do_final(&mut self, out: &mut [u8], offset: usize) -> Result<usize, SkeinError> {
        let written = self.engine.finalize_into(out, offset)?;
        self.reset();
        Ok(written)
    }

    /// Produces the MAC as a fresh buffer, then resets.
    pub fn finalize(&mut self) -> Vec<u8> {
        let mac = self.engine.finalize();
        self.reset();
        mac
    }

    /// Restores the post-initialization chaining state snapshot.
    pub fn reset(&mut self) {
        self.engine.restore_state(&self.saved_state);
    }

    /// The MAC size in bits.
    pub fn mac_size_bits(&self) -> usize {
        self.engine.output_size_bits()
    }

    /// The MAC size in bytes.
    pub fn mac_size(&self) -> usize {
        self.engine.output_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    const KEY: [u8; 10] = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0];

    // Results computed with the C Skein MAC built on the optimized
    // implementation from the Skein team's NIST submission, v1.3.
    const SHORT_MAC: [u8; 4] = [0x5A, 0x56, 0x4F, 0x33];
    const LONG_MAC: [u8; 8] = [0x14, 0x31, 0x79, 0xF4, 0x7B, 0xCA, 0x88, 0x57];

    #[test]
    fn test_31_bit_mac_reference_vector() {
        let mut mac = SkeinMac::new(&KEY, 512, 31).unwrap();
        assert_eq!(mac.mac_size(), 4);

        mac.update(&TEXT);
        let mut out = [0u8; 4];
        let written = mac.do_final(&mut out, 0).unwrap();
        assert_eq!(written, 4);
        assert_eq!(out, SHORT_MAC);
    }

    #[test]
    fn test_64_bit_mac_reference_vector() {
        let mut mac = SkeinMac::new(&KEY, 512, 64).unwrap();
        mac.update(&TEXT);
        assert_eq!(mac.finalize(), LONG_MAC);
    }

    #[test]
    fn test_mac_repeats_after_reset() {
        let mut mac = SkeinMac::new(&KEY, 512, 64).unwrap();

        mac.update(&TEXT);
        let first = mac.finalize();

        // do_final / finalize reset the instance; the same message must
        // produce the same MAC again.
        mac.update(&TEXT);
        let second = mac.finalize();

        assert_eq!(first, second);
        assert_eq!(first, LONG_MAC);
    }

    #[test]
    fn test_different_keys_different_macs() {
        let mut a = SkeinMac::new(&KEY, 512, 64).unwrap();
        let mut b = SkeinMac::new(b"another key", 512, 64).unwrap();
        a.update(&TEXT);
        b.update(&TEXT);
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_do_final_bounds_checked() {
        let mut mac = SkeinMac::new(&KEY, 512, 64).unwrap();
        mac.update(&TEXT);

        let mut out = [0u8; 8];
        assert_eq!(
            mac.do_final(&mut out, 4),
            Err(SkeinError::OutputBufferTooSmall {
                needed: 8,
                available: 4
            })
        );

        // Pending input survives the failed call.
        assert_eq!(mac.do_final(&mut out, 0), Ok(8));
        assert_eq!(out, LONG_MAC);
    }

    #[test]
    fn test_explicit_reset_discards_input() {
        let mut mac = SkeinMac::new(&KEY, 512, 64).unwrap();
        mac.update(b"garbage");
        mac.reset();

        mac.update(&TEXT);
        assert_eq!(mac.finalize(), LONG_MAC);
    }
}
