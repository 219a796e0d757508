pub(crate) mod block;
mod gcm;
mod ghash;

pub use {block::{BlockEncrypt, Sm4, Sm4KeySchedule}, gcm::Sm4Gcm, ghash::GHash};
