mod length_extension;

pub use length_extension::forge_length_extension;
