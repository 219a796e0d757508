//! The Merkle–Damgård construction builds a hash function out of a
//! fixed-size [compression function](CompressionFn): split the (padded)
//! message into fixed-size blocks, and fold each block into a running
//! chaining state with the compression function.
//!
//! This is also the source of the construction's best-known weakness, the
//! [length-extension attack](crate::forge_length_extension): because the
//! output digest *is* the final chaining state, anyone who knows
//! `H(secret || message)` already knows everything the compression function
//! needs to keep going, without ever learning `secret`.
//!
//! [`MerkleDamgard`] drives this generically over any [`CompressionFn`], and
//! exposes the streaming `update`/`digest`/`reset` shape [`Sm3`](crate::Sm3)
//! needs, plus the state-installation hook the length-extension attack
//! requires.

/// A fixed-size compression function: folds a 64-byte block into a 256-bit
/// chaining state.
///
/// This is deliberately narrower than a general block cipher interface (see
/// [`BlockEncrypt`](crate::BlockEncrypt)): SM3's compression function isn't
/// invertible and was never meant to be used as one.
pub trait CompressionFn {
    fn compress(&self, state: [u32; 8], block: [u8; 64]) -> [u32; 8];
}

/// Generic streaming Merkle–Damgård driver over a 64-byte block size and a
/// 256-bit chaining state.
///
/// Holds a pending buffer of fewer than 64 bytes between calls to
/// [`update`](Self::update), and a 64-bit count of bits absorbed so far, used
/// for padding.
#[derive(Debug, Clone)]
pub struct MerkleDamgard<Cf> {
    compress: Cf,
    state: [u32; 8],
    buffer: [u8; 64],
    buffer_len: usize,
    bit_len: u64,
}

impl<Cf: CompressionFn> MerkleDamgard<Cf> {
    pub fn new(compress: Cf, iv: [u32; 8]) -> Self {
        Self {
            compress,
            state: iv,
            buffer: [0; 64],
            buffer_len: 0,
            bit_len: 0,
        }
    }

    /// Absorb `data`, compressing every full 64-byte block immediately and
    /// buffering the remainder.
    pub fn update(&mut self, data: &[u8]) {
        self.bit_len = self.bit_len.wrapping_add((data.len() as u64) * 8);
        let mut data = data;

        if self.buffer_len > 0 {
            let needed = 64 - self.buffer_len;
            let take = needed.min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];
            if self.buffer_len == 64 {
                self.state = self.compress.compress(self.state, self.buffer);
                self.buffer_len = 0;
            }
        }

        while data.len() >= 64 {
            let block: [u8; 64] = data[..64].try_into().unwrap();
            self.state = self.compress.compress(self.state, block);
            data = &data[64..];
        }

        if !data.is_empty() {
            self.buffer[..data.len()].copy_from_slice(data);
            self.buffer_len = data.len();
        }
    }

    /// Pad and compress a snapshot of the current state, without mutating
    /// `self`. Calling this repeatedly without an intervening `update`
    /// always returns the same bytes, and further `update` calls behave as
    /// though `digest` was never called.
    pub fn digest(&self) -> [u32; 8] {
        let mut state = self.state;
        let mut buffer = self.buffer;
        let mut len = self.buffer_len;

        buffer[len] = 0x80;
        len += 1;
        if len > 56 {
            buffer[len..64].fill(0);
            state = self.compress.compress(state, buffer);
            buffer = [0; 64];
            len = 0;
        }
        buffer[len..56].fill(0);
        buffer[56..64].copy_from_slice(&self.bit_len.to_be_bytes());
        self.compress.compress(state, buffer)
    }

    /// Return to the initial state with an empty buffer and zeroed bit
    /// count.
    pub fn reset(&mut self, iv: [u32; 8]) {
        self.state = iv;
        self.buffer_len = 0;
        self.bit_len = 0;
    }

    /// Install an arbitrary chaining state and bit counter.
    ///
    /// This is not a general hashing API: it exists so that
    /// [length-extension forgery](crate::forge_length_extension) can resume
    /// compression from a publicly known digest without knowing the secret
    /// prefix that produced it.
    pub fn install_state(&mut self, state: [u32; 8], bit_len: u64) {
        self.state = state;
        self.buffer_len = 0;
        self.bit_len = bit_len;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy)]
    struct Xor;

    impl CompressionFn for Xor {
        fn compress(&self, mut state: [u32; 8], block: [u8; 64]) -> [u32; 8] {
            for (i, word) in block.chunks(8).enumerate() {
                let mut acc = 0u32;
                for &b in word {
                    acc ^= b as u32;
                }
                state[i] ^= acc;
            }
            state
        }
    }

    #[test]
    fn digest_is_idempotent() {
        let mut md = MerkleDamgard::new(Xor, [0; 8]);
        md.update(b"hello world");
        let d1 = md.digest();
        let d2 = md.digest();
        assert_eq!(d1, d2);
    }

    #[test]
    fn incremental_append_matches_one_shot() {
        let mut incremental = MerkleDamgard::new(Xor, [0; 8]);
        incremental.update(b"hello ");
        incremental.update(b"world");
        let mut one_shot = MerkleDamgard::new(Xor, [0; 8]);
        one_shot.update(b"hello world");
        assert_eq!(incremental.digest(), one_shot.digest());
    }
}
