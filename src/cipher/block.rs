pub mod sm4;

pub use sm4::{Sm4, Sm4KeySchedule};

/// The encryption half of a block cipher.
///
/// Note that a block cipher alone does not fulfill the definition of a
/// [cipher](crate::doc::encryption): it can't handle inputs of arbitrary
/// length, only single fixed-size blocks. [`Sm4Gcm`](crate::Sm4Gcm) is what
/// turns [`Sm4`] into something that handles arbitrary-length plaintext, by
/// using it as a counter-mode keystream generator.
pub trait BlockEncrypt {
    type EncryptionBlock;
    type EncryptionKey;

    /// Encrypt the plaintext.
    fn encrypt(
        &self,
        data: Self::EncryptionBlock,
        key: Self::EncryptionKey,
    ) -> Self::EncryptionBlock;
}
