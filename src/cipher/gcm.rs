//! SM4-GCM couples [SM4](crate::Sm4) counter-mode encryption with
//! [GHASH](crate::GHash) authentication, following the same Galois/Counter
//! Mode construction NIST SP 800-38D specifies for AES.
//!
//! The counter-mode keystream is generated by encrypting successive counter
//! blocks starting from `J0`; encryption drives the wide kernel eight blocks
//! at a time, falling back to single blocks and finally one zero-padded
//! fragment for whatever doesn't divide evenly. Authentication folds the
//! resulting ciphertext (and any associated data) through GHASH, and the tag
//! is the GHASH output masked with `E_K(J0)`.
//!
//! Counter increment here is over the **full 128-bit big-endian integer**,
//! not the low 32 bits NIST SP 800-38D specifies. This implementation targets
//! bit-for-bit agreement with the reference this module was derived from
//! rather than RFC interoperability; see `DESIGN.md` for the tradeoff this
//! decision records.

use crate::{cipher::block::sm4, Ciphertext, Error, GHash, Key, Plaintext, Sm4KeySchedule};

/// [SM4-GCM](self) authenticated encryption under a fixed key.
#[derive(Debug, Clone, Copy)]
pub struct Sm4Gcm {
    ks: Sm4KeySchedule,
}

impl Sm4Gcm {
    /// Derive the SM4 key schedule once, for reuse across any number of
    /// encrypt/decrypt calls.
    pub fn new(key: Key<[u8; 16]>) -> Self {
        Self {
            ks: sm4::key_schedule(key.0),
        }
    }

    /// Encrypt `plaintext` under associated data `aad`, producing ciphertext
    /// of the same length and a tag truncated to `tag_len` bytes.
    ///
    /// Errors with [`Error::InvalidTagLength`] if `tag_len` exceeds 16.
    pub fn encrypt_and_tag(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: Plaintext<&[u8]>,
        tag_len: usize,
    ) -> Result<(Ciphertext<Vec<u8>>, Vec<u8>), Error> {
        if tag_len > 16 {
            return Err(Error::InvalidTagLength {
                requested: tag_len,
                max: 16,
            });
        }
        let h = sm4::encrypt_single(&self.ks, [0u8; 16]);
        let j0 = self.derive_j0(h, iv);
        let ciphertext = self.apply_keystream(j0, plaintext.0);
        let tag = self.tag(h, j0, aad, &ciphertext, tag_len);
        Ok((Ciphertext(ciphertext), tag))
    }

    /// Decrypt `ciphertext` and verify `tag` over associated data `aad`.
    ///
    /// Mirrors [`encrypt_and_tag`](Self::encrypt_and_tag): the tag is always
    /// computed over ciphertext (encrypt-then-MAC), so verification
    /// recomputes it from the ciphertext the caller handed in, before ever
    /// touching the keystream that would reveal plaintext.
    pub fn decrypt_and_verify(
        &self,
        iv: &[u8],
        aad: &[u8],
        ciphertext: Ciphertext<&[u8]>,
        tag: &[u8],
    ) -> Result<Plaintext<Vec<u8>>, Error> {
        if tag.len() > 16 {
            return Err(Error::InvalidTagLength {
                requested: tag.len(),
                max: 16,
            });
        }
        let h = sm4::encrypt_single(&self.ks, [0u8; 16]);
        let j0 = self.derive_j0(h, iv);
        let expected = self.tag(h, j0, aad, ciphertext.0, tag.len());
        if expected != tag {
            return Err(Error::TagMismatch);
        }
        Ok(Plaintext(self.apply_keystream(j0, ciphertext.0)))
    }

    /// Derive `J0`, the initial counter block, from the IV.
    ///
    /// A 12-byte IV is the fast path: `J0 = IV || be32(1)`. Any other length
    /// is GHASHed (zero-padded to a block boundary, followed by a length
    /// block encoding the IV's bit length) and the resulting accumulator is
    /// `J0` directly.
    fn derive_j0(&self, h: [u8; 16], iv: &[u8]) -> [u8; 16] {
        if iv.len() == 12 {
            let mut j0 = [0u8; 16];
            j0[..12].copy_from_slice(iv);
            j0[15] = 1;
            return j0;
        }
        let mut ghash = GHash::new(h);
        for block in iv.chunks(16) {
            ghash.update(block);
        }
        let mut length_block = [0u8; 16];
        length_block[8..16].copy_from_slice(&((iv.len() as u64) * 8).to_be_bytes());
        ghash.update(&length_block);
        ghash.finish()
    }

    /// Fold `aad`, `ciphertext`, and the length block through GHASH and mask
    /// the result with `E_K(J0)`, truncating to `tag_len` bytes.
    fn tag(&self, h: [u8; 16], j0: [u8; 16], aad: &[u8], ciphertext: &[u8], tag_len: usize) -> Vec<u8> {
        let mut ghash = GHash::new(h);
        for block in aad.chunks(16) {
            ghash.update(block);
        }
        for block in ciphertext.chunks(16) {
            ghash.update(block);
        }
        let mut length_block = [0u8; 16];
        length_block[0..8].copy_from_slice(&((aad.len() as u64) * 8).to_be_bytes());
        length_block[8..16].copy_from_slice(&((ciphertext.len() as u64) * 8).to_be_bytes());
        ghash.update(&length_block);
        let y = ghash.finish();

        let mask = sm4::encrypt_single(&self.ks, j0);
        let mut tag = [0u8; 16];
        for i in 0..16 {
            tag[i] = mask[i] ^ y[i];
        }
        tag[..tag_len].to_vec()
    }

    /// Generate keystream starting at `ctr = J0` and XOR it with `data`,
    /// three stages at a time: eight-block batches through the
    /// [wide kernel](crate::cipher::block::sm4::encrypt_wide), then single
    /// blocks, then one zero-padded final fragment.
    fn apply_keystream(&self, j0: [u8; 16], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        let mut ctr = j0;

        let full_blocks = data.len() / 16;
        let tail_len = data.len() % 16;
        let mut consumed = 0;

        let wide_batches = full_blocks / 8;
        for _ in 0..wide_batches {
            let mut ctr_blocks = [[0u8; 16]; 8];
            for block in ctr_blocks.iter_mut() {
                *block = ctr;
                increment_be128(&mut ctr);
            }
            let keystream = sm4::encrypt_wide(&self.ks, ctr_blocks);
            for ks_block in keystream {
                let chunk = &data[consumed..consumed + 16];
                out.extend(chunk.iter().zip(ks_block).map(|(&p, k)| p ^ k));
                consumed += 16;
            }
        }

        for _ in 0..(full_blocks % 8) {
            let ks_block = sm4::encrypt_single(&self.ks, ctr);
            increment_be128(&mut ctr);
            let chunk = &data[consumed..consumed + 16];
            out.extend(chunk.iter().zip(ks_block).map(|(&p, k)| p ^ k));
            consumed += 16;
        }

        if tail_len > 0 {
            let ks_block = sm4::encrypt_single(&self.ks, ctr);
            let chunk = &data[consumed..consumed + tail_len];
            out.extend(chunk.iter().zip(ks_block).map(|(&p, k)| p ^ k));
        }

        out
    }
}

/// Increment a 16-byte big-endian integer by one, with carry propagating
/// across the full width.
fn increment_be128(block: &mut [u8; 16]) {
    for byte in block.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = Key([0u8; 16]);
        let iv = [0u8; 12];
        let gcm = Sm4Gcm::new(key);
        let plaintext = (0u8..64).collect::<Vec<_>>();
        let aad = [1, 2, 3];
        let (ciphertext, tag) = gcm
            .encrypt_and_tag(&iv, &aad, Plaintext(&plaintext), 16)
            .unwrap();
        assert_eq!(ciphertext.0.len(), 64);
        assert_eq!(tag.len(), 16);
        let decrypted = gcm
            .decrypt_and_verify(&iv, &aad, Ciphertext(&ciphertext.0), &tag)
            .unwrap();
        assert_eq!(decrypted.0, plaintext);
    }

    /// Pins the keystream to start at `ctr = J0`, not `J0 + 1`: recomputes
    /// the first ciphertext block independently via
    /// [`sm4::encrypt_single`](crate::cipher::block::sm4::encrypt_single)
    /// against the known-good J0 block, rather than deriving the expectation
    /// from [`apply_keystream`](Sm4Gcm::apply_keystream) itself.
    #[test]
    fn keystream_starts_at_j0() {
        let key = Key([0u8; 16]);
        let iv = [0u8; 12];
        let gcm = Sm4Gcm::new(key);
        let plaintext = [0xaa; 16];
        let (ciphertext, _) = gcm
            .encrypt_and_tag(&iv, &[], Plaintext(plaintext.as_slice()), 16)
            .unwrap();

        let mut j0 = [0u8; 16];
        j0[..12].copy_from_slice(&iv);
        j0[15] = 1;
        let ks = sm4::key_schedule(key.0);
        let expected_keystream = sm4::encrypt_single(&ks, j0);
        let expected: Vec<u8> = plaintext.iter().zip(expected_keystream).map(|(&p, k)| p ^ k).collect();

        assert_eq!(ciphertext.0, expected);
    }

    #[test]
    fn non_twelve_byte_iv_is_accepted() {
        let gcm = Sm4Gcm::new(Key([7; 16]));
        let iv = (0u8..20).collect::<Vec<_>>();
        let plaintext = b"short message that spans a fragment";
        let (ciphertext, tag) = gcm
            .encrypt_and_tag(&iv, b"aad", Plaintext(plaintext.as_slice()), 16)
            .unwrap();
        let decrypted = gcm
            .decrypt_and_verify(&iv, b"aad", Ciphertext(&ciphertext.0), &tag)
            .unwrap();
        assert_eq!(decrypted.0, plaintext);
    }

    #[test]
    fn tampered_ciphertext_fails_verification() {
        let gcm = Sm4Gcm::new(Key([3; 16]));
        let iv = [0u8; 12];
        let (mut ciphertext, tag) = gcm
            .encrypt_and_tag(&iv, &[], Plaintext(b"0123456789abcdef".as_slice()), 16)
            .unwrap();
        ciphertext.0[0] ^= 1;
        assert_eq!(
            gcm.decrypt_and_verify(&iv, &[], Ciphertext(&ciphertext.0), &tag),
            Err(Error::TagMismatch)
        );
    }

    #[test]
    fn tag_too_long_is_rejected() {
        let gcm = Sm4Gcm::new(Key([0; 16]));
        let err = gcm
            .encrypt_and_tag(&[0; 12], &[], Plaintext(&[]), 17)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidTagLength {
                requested: 17,
                max: 16
            }
        );
    }
}
