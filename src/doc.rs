//! Literate background reading, not part of the crate's executable surface.
//! Only built under `#[cfg(doc)]`, so `cargo doc` can link into it from the
//! primitives that reference it.

pub mod encryption;
