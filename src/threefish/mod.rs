//! Threefish tweakable block cipher.
//!
//! Threefish is the block cipher at the heart of the Skein hash family.
//! It is parameterized by a key of the full state width and a 128-bit
//! tweak, producing an independent permutation per (key, tweak) pair.
//! Supported block widths are 256, 512, and 1024 bits.
//!
//! The cipher here implements encryption only, which is all UBI hashing
//! needs; the chaining value is the key and the tweak encodes block
//! position, type, and first/final flags.

mod constants;

use crate::skein::SkeinError;
use self::constants::{
    C240, PERM_1024, PERM_256, PERM_512, ROT_1024, ROT_256, ROT_512, ROUNDS_72, ROUNDS_80,
};

/// The Threefish MIX function: add, rotate, XOR.
#[inline(always)]
fn mix(a: u64, b: u64, r: u32) -> (u64, u64) {
    let a2 = a.wrapping_add(b);
    let b2 = b.rotate_left(r) ^ a2;
    (a2, b2)
}

/// One block encryption, generic over the word count `NW` and the number
/// of MIX operations per round `NM` (= NW / 2).
///
/// `key` holds NW + 1 words (the last is the C240 parity word) and
/// `tweak` holds t0, t1, and t2 = t0 ^ t1. A subkey is injected before
/// every group of 4 rounds and once more after the last round.
fn encrypt_block<const NW: usize, const NM: usize>(
    key: &[u64],
    tweak: &[u64; 3],
    rot: &[[u32; NM]; 8],
    perm: &[usize; NW],
    rounds: usize,
    input: &[u64],
    output: &mut [u64],
) {
    let mut v = [0u64; NW];
    v.copy_from_slice(&input[..NW]);

    for group in 0..rounds / 4 {
        inject_subkey::<NW>(&mut v, key, tweak, group);
        for d in 0..4 {
            let r = &rot[(group * 4 + d) % 8];
            for j in 0..NM {
                let (a, b) = mix(v[2 * j], v[2 * j + 1], r[j]);
                v[2 * j] = a;
                v[2 * j + 1] = b;
            }
            let prev = v;
            for i in 0..NW {
                v[i] = prev[perm[i]];
            }
        }
    }
    inject_subkey::<NW>(&mut v, key, tweak, rounds / 4);

    output[..NW].copy_from_slice(&v);
}

/// Adds subkey `s` into the state: v[i] += k[(s + i) mod (NW + 1)], with
/// the tweak words folded into v[NW-3], v[NW-2] and the subkey number
/// into v[NW-1].
#[inline(always)]
fn inject_subkey<const NW: usize>(v: &mut [u64; NW], key: &[u64], tweak: &[u64; 3], s: usize) {
    for i in 0..NW {
        v[i] = v[i].wrapping_add(key[(s + i) % (NW + 1)]);
    }
    v[NW - 3] = v[NW - 3].wrapping_add(tweak[s % 3]);
    v[NW - 2] = v[NW - 2].wrapping_add(tweak[(s + 1) % 3]);
    v[NW - 1] = v[NW - 1].wrapping_add(s as u64);
}

/// A Threefish cipher instance for one block width.
///
/// Holds the expanded key (including the parity word) and the extended
/// tweak. Freshly constructed instances carry an all-zero key, which is
/// exactly the keying the Skein configuration block derivation needs.
#[derive(Debug)]
pub struct Threefish {
    words: usize,
    key: Vec<u64>,
    tweak: [u64; 3],
}

impl Threefish {
    /// Creates a cipher for the given state size in bits.
    ///
    /// Returns an error for any width other than 256, 512, or 1024.
    pub fn new(state_bits: usize) -> Result<Self, SkeinError> {
        let words = match state_bits {
            256 => 4,
            512 => 8,
            1024 => 16,
            other => return Err(SkeinError::UnsupportedStateSize(other)),
        };
        let mut key = vec![0u64; words + 1];
        key[words] = C240;
        Ok(Self {
            words,
            key,
            tweak: [0; 3],
        })
    }

    /// Returns the block width in 64-bit words.
    pub fn block_words(&self) -> usize {
        self.words
    }

    /// Sets the cipher key from `key` (must supply at least `block_words`
    /// words; extra words are ignored) and recomputes the parity word.
    pub fn set_key(&mut self, key: &[u64]) {
        let mut parity = C240;
        for i in 0..self.words {
            self.key[i] = key[i];
            parity ^= key[i];
        }
        self.key[self.words] = parity;
    }

    /// Sets the 128-bit tweak and derives the extended third word.
    pub fn set_tweak(&mut self, tweak: [u64; 2]) {
        self.tweak = [tweak[0], tweak[1], tweak[0] ^ tweak[1]];
    }

    /// Encrypts one block. `input` and `output` must each hold at least
    /// `block_words` words.
    pub fn encrypt(&self, input: &[u64], output: &mut [u64]) {
        match self.words {
            4 => encrypt_block::<4, 2>(
                &self.key, &self.tweak, &ROT_256, &PERM_256, ROUNDS_72, input, output,
            ),
            8 => encrypt_block::<8, 4>(
                &self.key, &self.tweak, &ROT_512, &PERM_512, ROUNDS_72, input, output,
            ),
            16 => encrypt_block::<16, 8>(
                &self.key, &self.tweak, &ROT_1024, &PERM_1024, ROUNDS_80, input, output,
            ),
            // The constructor admits no other width.
            _ => unreachable!(),
        }
    }
}
