//! Threefish round constants.
//!
//! Rotation schedules and word permutations for the three block widths,
//! per the Skein v1.3 specification (Tables 3 and 4). The rotation
//! schedule repeats every 8 rounds.

/// Parity constant for the extended key word: k[Nw] = C240 ^ k[0] ^ .. ^ k[Nw-1].
pub const C240: u64 = 0x1BD1_1BDA_A9FC_1A22;

/// Rounds for Threefish-256 and Threefish-512.
pub const ROUNDS_72: usize = 72;

/// Rounds for Threefish-1024.
pub const ROUNDS_80: usize = 80;

/// Rotation schedule for Threefish-256 (2 MIX operations per round).
pub const ROT_256: [[u32; 2]; 8] = [
    [14, 16],
    [52, 57],
    [23, 40],
    [5, 37],
    [25, 33],
    [46, 12],
    [58, 22],
    [32, 32],
];

/// Rotation schedule for Threefish-512 (4 MIX operations per round).
pub const ROT_512: [[u32; 4]; 8] = [
    [46, 36, 19, 37],
    [33, 27, 14, 42],
    [17, 49, 36, 39],
    [44, 9, 54, 56],
    [39, 30, 34, 24],
    [13, 50, 10, 17],
    [25, 29, 39, 43],
    [8, 35, 56, 22],
];

/// Rotation schedule for Threefish-1024 (8 MIX operations per round).
pub const ROT_1024: [[u32; 8]; 8] = [
    [24, 13, 8, 47, 8, 17, 22, 37],
    [38, 19, 10, 55, 49, 18, 23, 52],
    [33, 4, 51, 13, 34, 41, 59, 17],
    [5, 20, 48, 41, 47, 28, 16, 25],
    [41, 9, 37, 31, 12, 47, 44, 30],
    [16, 34, 56, 51, 4, 53, 42, 41],
    [31, 44, 47, 46, 19, 42, 44, 25],
    [9, 48, 35, 52, 23, 31, 37, 20],
];

/// Word permutation for Threefish-256: out[i] = in[PERM_256[i]].
pub const PERM_256: [usize; 4] = [0, 3, 2, 1];

/// Word permutation for Threefish-512.
pub const PERM_512: [usize; 8] = [2, 1, 4, 7, 6, 5, 0, 3];

/// Word permutation for Threefish-1024.
pub const PERM_1024: [usize; 16] = [0, 9, 2, 13, 6, 11, 4, 15, 10, 7, 12, 3, 14, 5, 8, 1];
