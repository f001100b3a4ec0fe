pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::{decode, decode_file, DecodeError};
pub use encoder::{encode, encode_file, EncodeError};
pub use format::Image;
