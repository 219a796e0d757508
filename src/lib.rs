#[cfg(test)]
mod test;

#[cfg(doc)]
pub mod doc;

mod cipher;
mod error;
mod hash;
mod key;
mod mac;
mod merkle;
mod text;

pub use {
    cipher::{BlockEncrypt, GHash, Sm4, Sm4Gcm, Sm4KeySchedule},
    error::Error,
    hash::{CompressionFn, Hash, MerkleDamgard, Sm3},
    key::Key,
    mac::forge_length_extension,
    merkle::{
        absence::{verify_absence, AbsenceProof, Neighbor},
        InclusionProof,
        MerkleTree,
    },
    text::{Ciphertext, Plaintext},
};
