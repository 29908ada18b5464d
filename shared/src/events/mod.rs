mod byte_reader;
pub mod decoder;
pub mod domain_event;
pub mod encoder;
pub mod error;

pub use byte_reader::ByteReader;
