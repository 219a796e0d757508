//! SM4 is the block cipher specified in GB/T 32907, used throughout Chinese
//! national-standard cryptography (including as the block cipher underneath
//! [SM4-GCM](crate::Sm4Gcm)).
//!
//! SM4 works on 128-bit blocks with a 128-bit key, and is a 32-round
//! unbalanced Feistel cipher: each round only updates one of the four 32-bit
//! words of the state, by XORing it with the output of a round function fed
//! the other three words and a round key. Confusion comes from a fixed
//! substitution box ([`SBOX`](self)), the same kind of non-linear lookup table
//! AES uses (see [confusion](crate::doc::encryption#confusion)); diffusion
//! comes from a linear transform that rotates and XORs the substituted word
//! with itself ([diffusion](crate::doc::encryption#diffusion)).
//!
//! Unlike AES, SM4's round function is cheap enough that this crate
//! precomputes it entirely into four 256-entry lookup tables
//! ([`T0`](self)..[`T3`](self)), combining substitution and the linear layer
//! into a single table lookup per input byte. The tables are process-wide
//! constants, computed once at compile time rather than lazily at startup,
//! since every input to their construction (the S-box, the rotation amounts)
//! is already known at compile time.
//!
//! This module also exposes an eight-way parallel encryption kernel
//! ([`encrypt_wide`]), which is the primitive [`Sm4Gcm`](crate::Sm4Gcm) uses
//! to generate keystream eight blocks at a time. Single-block encryption is
//! defined in terms of it: encrypt eight copies of the same block and keep
//! only the first lane's output. This keeps exactly one round-function
//! definition in the crate.

use {crate::BlockEncrypt, docext::docext};

/// Family key, used to derive the first four words of the key schedule
/// working state from the encryption key.
const FK: [u32; 4] = [0xa3b1bac6, 0x56aa3350, 0x677d9197, 0xb27022dc];

/// Fixed round constants, one per key-schedule round.
const CK: [u32; 32] = [
    0x00070e15, 0x1c232a31, 0x383f464d, 0x545b6269, 0x70777e85, 0x8c939aa1, 0xa8afb6bd, 0xc4cbd2d9,
    0xe0e7eef5, 0xfc030a11, 0x181f262d, 0x343b4249, 0x50575e65, 0x6c737a81, 0x888f969d, 0xa4abb2b9,
    0xc0c7ced5, 0xdce3eaf1, 0xf8ff060d, 0x141b2229, 0x30373e45, 0x4c535a61, 0x686f767d, 0x848b9299,
    0xa0a7aeb5, 0xbcc3cad1, 0xd8dfe6ed, 0xf4fb0209, 0x10171e25, 0x2c333a41, 0x484f565d, 0x646b7279,
];

/// SM4's substitution box, defined in Section 6.2 of GB/T 32907.
pub const SBOX: [u8; 256] = [
    0xd6, 0x90, 0xe9, 0xfe, 0xcc, 0xe1, 0x3d, 0xb7, 0x16, 0xb6, 0x14, 0xc2, 0x28, 0xfb, 0x2c, 0x05,
    0x2b, 0x67, 0x9a, 0x76, 0x2a, 0xbe, 0x04, 0xc3, 0xaa, 0x44, 0x13, 0x26, 0x49, 0x86, 0x06, 0x99,
    0x9c, 0x42, 0x50, 0xf4, 0x91, 0xef, 0x98, 0x7a, 0x33, 0x54, 0x0b, 0x43, 0xed, 0xcf, 0xac, 0x62,
    0xe4, 0xb3, 0x1c, 0xa9, 0xc9, 0x08, 0xe8, 0x95, 0x80, 0xdf, 0x94, 0xfa, 0x75, 0x8f, 0x3f, 0xa6,
    0x47, 0x07, 0xa7, 0xfc, 0xf3, 0x73, 0x17, 0xba, 0x83, 0x59, 0x3c, 0x19, 0xe6, 0x85, 0x4f, 0xa8,
    0x68, 0x6b, 0x81, 0xb2, 0x71, 0x64, 0xda, 0x8b, 0xf8, 0xeb, 0x0f, 0x4b, 0x70, 0x56, 0x9d, 0x35,
    0x1e, 0x24, 0x0e, 0x5e, 0x63, 0x58, 0xd1, 0xa2, 0x25, 0x22, 0x7c, 0x3b, 0x01, 0x21, 0x78, 0x87,
    0xd4, 0x00, 0x46, 0x57, 0x9f, 0xd3, 0x27, 0x52, 0x4c, 0x36, 0x02, 0xe7, 0xa0, 0xc4, 0xc8, 0x9e,
    0xea, 0xbf, 0x8a, 0xd2, 0x40, 0xc7, 0x38, 0xb5, 0xa3, 0xf7, 0xf2, 0xce, 0xf9, 0x61, 0x15, 0xa1,
    0xe0, 0xae, 0x5d, 0xa4, 0x9b, 0x34, 0x1a, 0x55, 0xad, 0x93, 0x32, 0x30, 0xf5, 0x8c, 0xb1, 0xe3,
    0x1d, 0xf6, 0xe2, 0x2e, 0x82, 0x66, 0xca, 0x60, 0xc0, 0x29, 0x23, 0xab, 0x0d, 0x53, 0x4e, 0x6f,
    0xd5, 0xdb, 0x37, 0x45, 0xde, 0xfd, 0x8e, 0x2f, 0x03, 0xff, 0x6a, 0x72, 0x6d, 0x6c, 0x5b, 0x51,
    0x8d, 0x1b, 0xaf, 0x92, 0xbb, 0xdd, 0xbc, 0x7f, 0x11, 0xd9, 0x5c, 0x41, 0x1f, 0x10, 0x5a, 0xd8,
    0x0a, 0xc1, 0x31, 0x88, 0xa5, 0xcd, 0x7b, 0xbd, 0x2d, 0x74, 0xd0, 0x12, 0xb8, 0xe5, 0xb4, 0xb0,
    0x89, 0x69, 0x97, 0x4a, 0x0c, 0x96, 0x77, 0x7e, 0x65, 0xb9, 0xf1, 0x09, 0xc5, 0x6e, 0xc6, 0x84,
    0x18, 0xf0, 0x7d, 0xec, 0x3a, 0xdc, 0x4d, 0x20, 0x79, 0xee, 0x5f, 0x3e, 0xd7, 0xcb, 0x39, 0x48,
];

/// A schedule of 32 round keys, derived from a 16-byte encryption key.
///
/// Deterministic function of the key alone; once derived it is immutable and
/// can be shared across any number of single-block or wide-kernel calls.
pub type Sm4KeySchedule = [u32; 32];

/// [SM4 block cipher](self).
///
/// Implements [`BlockEncrypt`] by delegating to the [wide kernel](encrypt_wide)
/// with the input block replicated across all eight lanes, per the round
/// function shared with [`encrypt_wide`].
#[derive(Debug, Default)]
pub struct Sm4(());

impl BlockEncrypt for Sm4 {
    type EncryptionBlock = [u8; 16];
    type EncryptionKey = Sm4KeySchedule;

    fn encrypt(&self, data: Self::EncryptionBlock, key: Self::EncryptionKey) -> Self::EncryptionBlock {
        encrypt_single(&key, data)
    }
}

/// Derive the [round-key schedule](Sm4KeySchedule) from a 16-byte key, as
/// defined in Section 6.1 of GB/T 32907.
///
/// Loads the key as four big-endian words and XORs it with the
/// [family key](FK) to seed the working window `(K0, K1, K2, K3)`. Each round
/// key is `rk_i = K0 ⊕ L'(τ(K1 ⊕ K2 ⊕ K3 ⊕ CK[i]))`, where `τ` substitutes
/// each byte through [`SBOX`] and `L'(x) = x ⊕ (x <<< 13) ⊕ (x <<< 23)`. The
/// window then shifts: `(K0, K1, K2, K3) ← (K1, K2, K3, rk_i)`.
pub fn key_schedule(key: [u8; 16]) -> Sm4KeySchedule {
    let mut k = [0u32; 4];
    for (i, word) in k.iter_mut().enumerate() {
        *word = u32::from_be_bytes(key[4 * i..4 * i + 4].try_into().unwrap()) ^ FK[i];
    }
    let mut rk = [0u32; 32];
    for (i, rki) in rk.iter_mut().enumerate() {
        let t = tau(k[1] ^ k[2] ^ k[3] ^ CK[i]);
        let lprime = t ^ t.rotate_left(13) ^ t.rotate_left(23);
        let new = k[0] ^ lprime;
        *rki = new;
        k = [k[1], k[2], k[3], new];
    }
    rk
}

/// τ, the bytewise substitution used by the [key schedule](key_schedule).
///
/// Distinct from the round function's [`t_transform`]: this applies only the
/// [S-box](SBOX), with no linear layer.
fn tau(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

/// The linear transform `L`, defined in Section 6.2.2 of GB/T 32907.
///
/// $$
/// L(x) = x \oplus (x \lll 2) \oplus (x \lll 10) \oplus (x \lll 18) \oplus (x
/// \lll 24)
/// $$
#[docext]
const fn l_transform(x: u32) -> u32 {
    x ^ x.rotate_left(2) ^ x.rotate_left(10) ^ x.rotate_left(18) ^ x.rotate_left(24)
}

/// Build one of the four precomputed round tables.
///
/// `T_j[b] = L(S[b] \ll 24) \lll 8j`: substitute the byte, place it in the
/// high byte of a word, apply the [linear transform](l_transform), then
/// rotate by `8j` bits so that table `j` contributes byte `j`'s substitution
/// in its correct position in the combined round function.
const fn build_table(rotate_bits: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut b = 0usize;
    while b < 256 {
        let substituted = (SBOX[b] as u32) << 24;
        table[b] = l_transform(substituted).rotate_left(rotate_bits);
        b += 1;
    }
    table
}

/// Precomputed round table combining [S-box](SBOX) substitution and the
/// [linear transform](l_transform) for the most significant input byte.
pub static T0: [u32; 256] = build_table(0);
/// As [`T0`], for the second most significant input byte.
pub static T1: [u32; 256] = build_table(8);
/// As [`T0`], for the second least significant input byte.
pub static T2: [u32; 256] = build_table(16);
/// As [`T0`], for the least significant input byte.
pub static T3: [u32; 256] = build_table(24);

/// The composed substitution-and-linear-layer transform `T`, realised as four
/// table lookups combined with XOR: `T0[b0] ⊕ T1[b1] ⊕ T2[b2] ⊕ T3[b3]`, where
/// `b0` is the most significant byte of `x`.
fn t_transform(x: u32) -> u32 {
    let b = x.to_be_bytes();
    T0[b[0] as usize] ^ T1[b[1] as usize] ^ T2[b[2] as usize] ^ T3[b[3] as usize]
}

/// Encrypt a single 16-byte block.
///
/// Specified in terms of the [wide kernel](encrypt_wide): replicate the block
/// across all eight lanes and keep only the first lane's output. This is the
/// only round-function definition in the crate; every other encryption path
/// goes through [`encrypt_wide`].
pub fn encrypt_single(ks: &Sm4KeySchedule, block: [u8; 16]) -> [u8; 16] {
    encrypt_wide(ks, [block; 8])[0]
}

/// Encrypt eight independent 16-byte blocks in lockstep.
///
/// Each lane advances the 4-word Feistel state for 32 rounds:
/// `X_{i+4} = X_i ⊕ T(X_{i+1} ⊕ X_{i+2} ⊕ X_{i+3} ⊕ rk_i)`. After 32 rounds
/// the output is the final four words in reverse order, `(X35, X34, X33,
/// X32)`.
///
/// The eight lanes are processed with independent scalar state; this is the
/// "eight scalar computations the compiler may auto-vectorise" realisation of
/// the wide-kernel abstraction, rather than a hand-written SIMD intrinsic.
pub fn encrypt_wide(ks: &Sm4KeySchedule, blocks: [[u8; 16]; 8]) -> [[u8; 16]; 8] {
    let mut out = [[0u8; 16]; 8];
    for (lane, block) in blocks.into_iter().enumerate() {
        let mut x = [0u32; 4];
        for (w, word) in x.iter_mut().enumerate() {
            *word = u32::from_be_bytes(block[4 * w..4 * w + 4].try_into().unwrap());
        }
        for &rk in ks.iter() {
            let new = x[0] ^ t_transform(x[1] ^ x[2] ^ x[3] ^ rk);
            x = [x[1], x[2], x[3], new];
        }
        // x now holds (X32, X33, X34, X35); the ciphertext is the reverse.
        let mut result = [0u8; 16];
        for (w, word) in [x[3], x[2], x[1], x[0]].into_iter().enumerate() {
            result[4 * w..4 * w + 4].copy_from_slice(&word.to_be_bytes());
        }
        out[lane] = result;
    }
    out
}

#[cfg(test)]
mod test {
    use {super::*, rand::Rng};

    /// Example 1 from GB/T 32907-2016, Appendix A.
    #[test]
    fn known_answer_vector() {
        let key = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ];
        let plaintext = key;
        let ciphertext = [
            0x68, 0x1e, 0xdf, 0x34, 0xd2, 0x06, 0x96, 0x5e, 0x86, 0xb3, 0xe9, 0x4f, 0x53, 0x6e,
            0x42, 0x46,
        ];
        let ks = key_schedule(key);
        assert_eq!(encrypt_single(&ks, plaintext), ciphertext);
    }

    #[test]
    fn wide_agrees_with_single() {
        let ks = key_schedule([0x11; 16]);
        let block = [0x22; 16];
        let wide = encrypt_wide(&ks, [block; 8]);
        let single = encrypt_single(&ks, block);
        for lane in wide {
            assert_eq!(lane, single);
        }
    }

    #[test]
    fn wide_agrees_with_single_for_random_keys_and_blocks() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let ks = key_schedule(rng.gen());
            let block: [u8; 16] = rng.gen();
            assert_eq!(encrypt_wide(&ks, [block; 8])[0], encrypt_single(&ks, block));
        }
    }
}
