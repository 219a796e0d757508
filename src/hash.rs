mod merkledamgard;
mod sm3;

pub use {
    merkledamgard::{CompressionFn, MerkleDamgard},
    sm3::Sm3,
};
pub(crate) use sm3::bytes_to_words;

/// A cryptographic hash function: a one-way map from arbitrary-length input
/// to a fixed-size output.
pub trait Hash {
    type Output;

    fn hash(&self, input: &[u8]) -> Self::Output;
}
