//! SM3 is the cryptographic hash function specified in GB/T 32905: a
//! Merkle–Damgård construction ([`crate::MerkleDamgard`]) over a 512-bit
//! block and a 256-bit chaining state, broadly comparable in shape to
//! SHA-256.
//!
//! Unlike the one-shot [`Hash`] trait most of this crate's hash functions
//! implement, [`Sm3`] is built as a streaming object with `update`/`digest`/
//! `reset`, because two constructions built on top of it need to observe and
//! manipulate its internal state directly: the Merkle tree in this crate
//! hashes leaves and internal nodes one at a time, and
//! [`forge_length_extension`](crate::forge_length_extension) needs to
//! install an attacker-unknown chaining state mid-stream.
//!
//! `digest` is non-destructive: it pads and compresses a snapshot of the
//! current state, leaving the live instance exactly as it was, so callers can
//! keep streaming more data after reading out a digest.

use crate::{CompressionFn, Hash, MerkleDamgard};

/// SM3's initial chaining value, defined in Section 4.1 of GB/T 32905.
const IV: [u32; 8] = [
    0x7380166f, 0x4914b2b9, 0x172442d7, 0xda8a0600, 0xa96f30bc, 0x163138aa, 0xe38dee4d, 0xb0fb0e4e,
];

/// Streaming [SM3](self) hash state.
#[derive(Debug, Clone)]
pub struct Sm3(MerkleDamgard<Sm3Compress>);

impl Default for Sm3 {
    fn default() -> Self {
        Self(MerkleDamgard::new(Sm3Compress, IV))
    }
}

impl Sm3 {
    /// Absorb more input.
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Pad and compress a snapshot of the current state, without mutating
    /// `self`. Safe to call repeatedly, and safe to keep calling `update`
    /// afterwards as though `digest` was never called.
    pub fn digest(&self) -> [u8; 32] {
        words_to_bytes(self.0.digest())
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.0.reset(IV);
    }

    /// Install an arbitrary 256-bit chaining state and 64-bit bit counter.
    ///
    /// Not part of the general hashing API; this exists to support
    /// [`forge_length_extension`](crate::forge_length_extension), which needs
    /// to resume compression from a publicly known digest.
    pub(crate) fn install_state(&mut self, state: [u32; 8], bit_len: u64) {
        self.0.install_state(state, bit_len);
    }
}

impl Hash for Sm3 {
    type Output = [u8; 32];

    fn hash(&self, input: &[u8]) -> Self::Output {
        let mut sm3 = Self::default();
        sm3.update(input);
        sm3.digest()
    }
}

fn words_to_bytes(words: [u32; 8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, w) in words.iter().enumerate() {
        out[4 * i..4 * i + 4].copy_from_slice(&w.to_be_bytes());
    }
    out
}

pub(crate) fn bytes_to_words(bytes: &[u8; 32]) -> [u32; 8] {
    let mut out = [0u32; 8];
    for (i, word) in out.iter_mut().enumerate() {
        *word = u32::from_be_bytes(bytes[4 * i..4 * i + 4].try_into().unwrap());
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Sm3Compress;

/// Step constant, defined in Section 4.2 of GB/T 32905: `0x79CC4519` for
/// rounds `0..16`, `0x7A879D8A` for rounds `16..64`.
fn tj(round: usize) -> u32 {
    if round < 16 {
        0x79cc4519
    } else {
        0x7a879d8a
    }
}

/// Boolean function `FF`, defined in Section 4.2: XOR below round 16, majority
/// above it.
fn ff(round: usize, x: u32, y: u32, z: u32) -> u32 {
    if round < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

/// Boolean function `GG`, defined in Section 4.2: XOR below round 16, a
/// choice function above it.
fn gg(round: usize, x: u32, y: u32, z: u32) -> u32 {
    if round < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (!x & z)
    }
}

/// Permutation `P0`, used to mix the compression function's `E` output back
/// into the working registers.
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

/// Permutation `P1`, used during message expansion.
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

impl CompressionFn for Sm3Compress {
    fn compress(&self, state: [u32; 8], block: [u8; 64]) -> [u32; 8] {
        // Message expansion: 16 input words grow into 68 words W, then 64
        // words W' = W[j] ^ W[j + 4].
        let mut w = [0u32; 68];
        for (i, word) in w.iter_mut().take(16).enumerate() {
            *word = u32::from_be_bytes(block[4 * i..4 * i + 4].try_into().unwrap());
        }
        for i in 16..68 {
            w[i] = p1(w[i - 16] ^ w[i - 9] ^ w[i - 3].rotate_left(15)) ^ w[i - 13].rotate_left(7) ^ w[i - 6];
        }
        let mut wprime = [0u32; 64];
        for (j, word) in wprime.iter_mut().enumerate() {
            *word = w[j] ^ w[j + 4];
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = state;
        for j in 0..64 {
            let ss1 = a
                .rotate_left(12)
                .wrapping_add(e)
                .wrapping_add(tj(j).rotate_left((j % 32) as u32))
                .rotate_left(7);
            let ss2 = ss1 ^ a.rotate_left(12);
            let tt1 = ff(j, a, b, c)
                .wrapping_add(d)
                .wrapping_add(ss2)
                .wrapping_add(wprime[j]);
            let tt2 = gg(j, e, f, g)
                .wrapping_add(h)
                .wrapping_add(ss1)
                .wrapping_add(w[j]);
            d = c;
            c = b.rotate_left(9);
            b = a;
            a = tt1;
            h = g;
            g = f.rotate_left(19);
            f = e;
            e = p0(tt2);
        }

        [
            state[0] ^ a,
            state[1] ^ b,
            state[2] ^ c,
            state[3] ^ d,
            state[4] ^ e,
            state[5] ^ f,
            state[6] ^ g,
            state[7] ^ h,
        ]
    }
}
