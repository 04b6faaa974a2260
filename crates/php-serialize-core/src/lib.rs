//! PHP serialize/unserialize engine with JSON conversion.
//!
//! This crate reads and writes PHP's `serialize()` format and converts it to
//! and from JSON, including PHP objects, shared and cyclic references, and the
//! special float values `INF`, `-INF` and `NAN`.
//!
//! # Features
//!
//! - **Zero-copy parsing** - String payloads are borrowed from the input
//! - **Byte-exact lengths** - String lengths are UTF-8 byte counts in both directions
//! - **References** - `r:<id>;` back-references, cycles included, via pre-order composite ids
//! - **JSON bridge** - `__class` members map to PHP objects (`serde` feature, on by default)
//! - **Detailed errors** - Precise error positions, input previews and an error taxonomy
//!
//! # Quick Start
//!
//! ```rust
//! use php_serialize_core::{json_to_php, php_to_json};
//!
//! let php = json_to_php(r#"{"__class":"User","id":123,"name":"John"}"#).unwrap();
//! assert_eq!(php, r#"O:4:"User":2:{s:2:"id";i:123;s:4:"name";s:4:"John";}"#);
//!
//! let json = php_to_json(&php).unwrap();
//! assert!(json.contains(r#""__class": "User""#));
//! ```
//!
//! # Working with values
//!
//! ```rust
//! use php_serialize_core::{from_bytes, to_string, PhpValue};
//!
//! let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
//! let value = from_bytes(data).unwrap();
//! assert_eq!(value.get("age").and_then(PhpValue::as_int), Some(30));
//! assert_eq!(to_string(&value).unwrap().as_bytes(), data);
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Rust Type |
//! |----------|-----------|
//! | `null` | `PhpValue::Null` |
//! | `bool` | `PhpValue::Bool(bool)` |
//! | `int` | `PhpValue::Int(i64)` |
//! | `float` | `PhpValue::Float(f64)` |
//! | `string` | `PhpValue::String(Cow<[u8]>)` |
//! | `array` (keys `0..n-1`) | `PhpValue::List(Vec<PhpValue>)` |
//! | `array` (other keys) | `PhpValue::Map(Vec<(ArrayKey, PhpValue)>)` |
//! | `object` | `PhpValue::Object { class_name, properties }` |
//! | `reference` | `PhpValue::Reference(usize)` |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::inline_always)]
#![allow(clippy::unnecessary_wraps)]

pub mod error;
pub mod parser;
pub mod serializer;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;

pub use error::{Error, ErrorCategory, ErrorKind, PhpDeserializeError, Result, SerializeError};
pub use parser::{
    from_bytes, from_bytes_with_config, from_str, is_serialized, preprocess, Parser, ParserConfig,
};
pub use serializer::{
    to_bytes, to_bytes_with_config, to_string, to_string_with_config, Serializer, SerializerConfig,
};
pub use types::{ArrayKey, PhpValue, RefTable, CLASS_KEY};

#[cfg(feature = "serde")]
pub use json::{
    from_json, json_to_php, json_to_php_with_config, php_to_json, php_to_json_with_config, to_json,
    JsonConfig, SpecialFloats,
};
