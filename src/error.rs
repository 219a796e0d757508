use std::fmt;

/// Errors produced by this crate's fallible operations.
///
/// None of these are recovered locally; they are always surfaced to the
/// caller. There is no I/O in this crate, so there is nothing to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// GCM was asked for a tag longer than the 16-byte block size.
    InvalidTagLength { requested: usize, max: usize },
    /// GCM decryption was given a tag that doesn't match the ciphertext and
    /// associated data.
    TagMismatch,
    /// A Merkle proof or tree operation was given a leaf index outside the
    /// current leaf count.
    IndexOutOfRange { index: usize, len: usize },
    /// An absence proof was requested for a leaf already present in the
    /// sorted leaf set.
    TargetExistsInTree,
    /// Length-extension was asked to install a digest that isn't 32 bytes.
    InvalidHashLength { got: usize, expected: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTagLength { requested, max } => {
                write!(f, "requested tag length {requested} exceeds maximum of {max}")
            }
            Error::TagMismatch => write!(f, "authentication tag does not match"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for {len} leaves")
            }
            Error::TargetExistsInTree => write!(f, "target leaf already exists in the tree"),
            Error::InvalidHashLength { got, expected } => {
                write!(f, "digest is {got} bytes long, expected {expected}")
            }
        }
    }
}

impl std::error::Error for Error {}
