//! A length-extension attack exploits the fact that a Merkle–Damgård digest
//! *is* the hash function's internal chaining state: anyone who knows
//! `h = SM3(secret || message)` can install `h` as [`Sm3`]'s state, append
//! more data, and finalise — producing a valid digest of
//! `secret || message || pad(|secret| + |message|) || extension` without
//! ever learning `secret`.
//!
//! The only information the forger needs besides `h` is the byte length of
//! `secret || message`, which determines exactly how the original hash
//! padded that message (and therefore how many bits were counted into the
//! bit counter before the real hash ever saw `extension`).

use crate::{hash::bytes_to_words, Error, Sm3};

/// Forge `SM3(secret || message || pad(prefix_len) || extension)` given only
/// `digest = SM3(secret || message)` and `prefix_len = |secret || message|`
/// in bytes — without knowing `secret`.
///
/// Errors with [`Error::InvalidHashLength`] if `digest` isn't 32 bytes.
pub fn forge_length_extension(
    digest: &[u8],
    prefix_len: usize,
    extension: &[u8],
) -> Result<[u8; 32], Error> {
    let digest: [u8; 32] = digest.try_into().map_err(|_| Error::InvalidHashLength {
        got: digest.len(),
        expected: 32,
    })?;
    let state = bytes_to_words(&digest);

    // How many zero bytes the original padding inserted after the 0x80
    // marker, so that (prefix_len + 1 + pad_zeros) % 64 == 56.
    let pad_zeros = (55i64 - (prefix_len % 64) as i64).rem_euclid(64) as usize;
    let total_padded_bytes = prefix_len + 1 + pad_zeros + 8;
    let bit_len = ((total_padded_bytes + extension.len()) as u64) * 8;

    let mut sm3 = Sm3::default();
    sm3.install_state(state, bit_len);
    sm3.update(extension);
    Ok(sm3.digest())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Hash;

    /// Glue `secret`, `message`, MD padding for `|secret| + |message|`, and
    /// `extension` together, matching what the forged digest must equal.
    fn glued_message(secret: &[u8], message: &[u8], extension: &[u8]) -> Vec<u8> {
        let prefix_len = secret.len() + message.len();
        let mut glued = Vec::new();
        glued.extend_from_slice(secret);
        glued.extend_from_slice(message);
        glued.push(0x80);
        let pad_zeros = (55i64 - (prefix_len % 64) as i64).rem_euclid(64) as usize;
        glued.extend(std::iter::repeat(0u8).take(pad_zeros));
        glued.extend_from_slice(&((prefix_len as u64) * 8).to_be_bytes());
        glued.extend_from_slice(extension);
        glued
    }

    #[test]
    fn forges_the_glued_digest() {
        let secret = b"secret";
        let message = b"data";
        let extension = b"append";

        let real_digest = Sm3::default().hash(&[secret.as_slice(), message].concat());
        let forged = forge_length_extension(&real_digest, secret.len() + message.len(), extension)
            .unwrap();

        let expected = Sm3::default().hash(&glued_message(secret, message, extension));
        assert_eq!(forged, expected);
    }

    #[test]
    fn rejects_wrong_length_digest() {
        let err = forge_length_extension(&[0; 31], 10, b"x").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidHashLength {
                got: 31,
                expected: 32
            }
        );
    }

    #[test]
    fn works_across_block_boundaries() {
        let secret = b"0123456789abcdef0123456789abcdef";
        let message = b"message that pushes the prefix length well past one block";
        let extension = b"more data appended after the forged padding";

        let real_digest = Sm3::default().hash(&[secret.as_slice(), message].concat());
        let forged = forge_length_extension(&real_digest, secret.len() + message.len(), extension)
            .unwrap();
        let expected = Sm3::default().hash(&glued_message(secret, message, extension));
        assert_eq!(forged, expected);
    }
}
