//! tagstream — compact self-describing binary serialization for dynamic values.
//!
//! This crate encodes a sequence of dynamically-typed values (nil, booleans,
//! numbers, byte strings, opaque pointers, tables) into one contiguous byte
//! buffer and reconstructs an equivalent sequence from it. The format is
//! deterministic and self-delimiting: no schema, header, or length prefix is
//! needed to decode a stream. Multi-byte payloads are host-native-endian, so
//! the format is intended for moving values between execution contexts on the
//! same machine, not across heterogeneous hosts.
//!
//! # Architecture
//!
//! - **`tag`** — lead-byte scheme: 3-bit type | 5-bit cookie
//! - **`buffer`** — append-only write buffer over fixed-size block chains
//! - **`cursor`** — checked forward-only read cursor
//! - **`value`** — the `Value` model and the array+map `Table` aggregate
//! - **`encode`** — recursive packer with size-minimized numbers and a depth guard
//! - **`decode`** — recursive unpacker with strict bounds checking
//!
//! # Example
//!
//! ```
//! use tagstream::{pack, unpack, Value};
//!
//! let buf = pack(&[Value::Bool(true), Value::from("hi"), Value::Int(42)])?;
//! let values = unpack(&buf)?;
//! assert_eq!(values[2], Value::Int(42));
//! # Ok::<(), tagstream::CodecError>(())
//! ```

pub mod buffer;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod tag;
pub mod value;

pub use decode::unpack;
pub use encode::{MAX_DEPTH, pack};
pub use error::CodecError;
pub use value::{Table, Value};
