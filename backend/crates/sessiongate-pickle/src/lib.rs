//! # sessiongate-pickle
//!
//! Data-only decoder for the pickle binary object-serialization format, the
//! encoding web frameworks use to persist server-side session state.
//!
//! The decoder is a small stack machine over a byte slice. It understands the
//! opcodes needed to rebuild plain data (none, bools, integers, floats, text,
//! bytes, lists, tuples, dicts, sets) and refuses every opcode that would name
//! a type or invoke a callable. There is no code path from stream content to
//! code execution: `GLOBAL`, `REDUCE`, `BUILD` and friends are always a
//! [`DecodeError::UnsupportedOpcode`].
//!
//! ## Usage
//!
//! ```rust
//! use sessiongate_pickle::{decode, DecodedValue};
//!
//! let bytes = b"\x80\x04\x95\x19\x00\x00\x00\x00\x00\x00\x00}\x94\x8c\x0d_auth_user_id\x94\x8c\x0242\x94s.";
//! let value = decode(bytes).unwrap();
//! assert_eq!(value.get("_auth_user_id"), Some(&DecodedValue::Text("42".into())));
//! ```
//!
//! ## Resource bounds
//!
//! Every decode runs under [`DecodeLimits`]: opcode count, collection length,
//! string length, memo size, materialized node count, nesting depth and total
//! materialized bytes. A stored record is written by another trust domain, so
//! a hostile or corrupt record must fail fast instead of exhausting memory.

pub mod decoder;
pub mod error;
pub mod limits;
pub mod opcodes;
mod reader;
pub mod value;

pub use decoder::{decode, decode_with_limits};
pub use error::{DecodeError, DecodeResult, LimitKind};
pub use limits::DecodeLimits;
pub use opcodes::Opcode;
pub use value::DecodedValue;
