//! Runtime support for code produced by `quarry-compiler`.
//!
//! Generated deserializers call `read_<type>` on a [`PacketReader`] and
//! generated serializers call `write_<type>` on a [`PacketWriter`], where
//! `<type>` is the logical type name from the protocol schema.
//!
//! ```
//! use quarry_runtime::*;
//!
//! let mut out = PacketWriter::new();
//! out.write_varint(300);
//! out.write_string("localhost");
//!
//! let bytes = out.data();
//! let mut buffer = PacketReader::new(&bytes);
//! assert_eq!(buffer.read_varint(), Ok(300));
//! assert_eq!(buffer.read_string(), Ok("localhost".to_owned()));
//! assert_eq!(buffer.remaining(), 0);
//! ```

pub mod buffer;
pub mod error;

pub use buffer::*;
pub use error::ProtocolError;
