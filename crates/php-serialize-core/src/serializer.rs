//! PHP serialize writer.
//!
//! Renders a [`PhpValue`] into PHP's `serialize()` text. Composites (lists,
//! maps and objects) are numbered in pre-order as they are written, starting
//! at 1, and a [`PhpValue::Reference`] is emitted as `r:<id>;` when it names a
//! composite that has already been written, which includes its own ancestors.
//!
//! All numbering state lives in the [`Serializer`] and is reset at the start
//! of every call to [`Serializer::serialize`].

use std::fmt;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::SerializeError;
use crate::types::{ArrayKey, PhpValue};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 128;

/// Serializer configuration options.
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A PHP serialize writer.
#[derive(Debug)]
pub struct Serializer {
    output: Vec<u8>,
    config: SerializerConfig,
    /// Id the next composite will receive.
    next_id: usize,
    /// Current nesting depth.
    depth: usize,
}

type SerResult<T> = std::result::Result<T, SerializeError>;

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    /// Create a new serializer with default configuration.
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    /// Create a new serializer with custom configuration.
    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            output: Vec::new(),
            config,
            next_id: 1,
            depth: 0,
        }
    }

    /// Serialize a value, returning the PHP serialized bytes.
    #[cfg_attr(feature = "tracing", instrument(skip(self, value), fields(value_type = value.type_name())))]
    pub fn serialize(&mut self, value: &PhpValue<'_>) -> SerResult<Vec<u8>> {
        self.reset();

        let result = self.write_value(value);

        #[cfg(feature = "tracing")]
        match &result {
            Ok(()) => debug!(
                output_len = self.output.len(),
                composites = self.next_id - 1,
                "Serialize completed successfully"
            ),
            Err(e) => warn!(error = %e, "Serialize failed"),
        }

        let output = std::mem::take(&mut self.output);
        result.map(|()| output)
    }

    fn reset(&mut self) {
        self.output.clear();
        self.next_id = 1;
        self.depth = 0;
    }

    fn write_value(&mut self, value: &PhpValue<'_>) -> SerResult<()> {
        match value {
            PhpValue::Null => self.output.extend_from_slice(b"N;"),
            PhpValue::Bool(b) => {
                self.output
                    .extend_from_slice(if *b { b"b:1;" } else { b"b:0;" });
            }
            PhpValue::Int(i) => self.write_int(*i),
            PhpValue::Float(f) => self.write_float(*f),
            PhpValue::String(s) => self.write_string(s),
            PhpValue::List(items) => {
                self.enter()?;
                self.write_tag(b'a', items.len());
                self.output.push(b'{');
                for (i, item) in items.iter().enumerate() {
                    self.output.extend_from_slice(b"i:");
                    self.write_number(i);
                    self.output.push(b';');
                    self.write_value(item)?;
                }
                self.output.push(b'}');
                self.leave();
            }
            PhpValue::Map(entries) => {
                self.enter()?;
                self.write_tag(b'a', entries.len());
                self.write_entries(entries)?;
                self.leave();
            }
            PhpValue::Object {
                class_name,
                properties,
            } => {
                self.enter()?;
                self.output.extend_from_slice(b"O:");
                self.write_number(class_name.len());
                self.output.extend_from_slice(b":\"");
                self.output.extend_from_slice(class_name.as_bytes());
                self.output.extend_from_slice(b"\":");
                self.write_number(properties.len());
                self.output.push(b':');
                self.write_entries(properties)?;
                self.leave();
            }
            PhpValue::Reference(id) => {
                if *id == 0 || *id >= self.next_id {
                    return Err(SerializeError::InvalidReference(*id));
                }
                self.output.extend_from_slice(b"r:");
                self.write_number(id);
                self.output.push(b';');
            }
        }
        Ok(())
    }

    /// Write `{key value ...}` for explicit-key entries.
    fn write_entries(&mut self, entries: &[(ArrayKey<'_>, PhpValue<'_>)]) -> SerResult<()> {
        self.output.push(b'{');
        for (key, value) in entries {
            match key {
                ArrayKey::Int(i) => self.write_int(*i),
                ArrayKey::String(s) => self.write_string(s),
            }
            self.write_value(value)?;
        }
        self.output.push(b'}');
        Ok(())
    }

    /// Register a composite: assign its id and descend one level.
    fn enter(&mut self) -> SerResult<()> {
        if self.depth >= self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(SerializeError::MaxDepthExceeded(self.config.max_depth));
        }

        #[cfg(feature = "tracing")]
        trace!(id = self.next_id, depth = self.depth, "Registering composite");

        self.next_id += 1;
        self.depth += 1;
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }

    #[inline]
    fn write_int(&mut self, i: i64) {
        self.output.extend_from_slice(b"i:");
        self.write_number(i);
        self.output.push(b';');
    }

    fn write_float(&mut self, f: f64) {
        self.output.extend_from_slice(b"d:");
        if f.is_nan() {
            self.output.extend_from_slice(b"NAN");
        } else if f.is_infinite() {
            let text: &[u8] = if f.is_sign_positive() { b"INF" } else { b"-INF" };
            self.output.extend_from_slice(text);
        } else {
            // Shortest round-trip form, never in exponent notation.
            self.write_number(f);
        }
        self.output.push(b';');
    }

    /// Write `s:<byte length>:"<bytes>";`.
    #[inline]
    fn write_string(&mut self, s: &[u8]) {
        self.output.extend_from_slice(b"s:");
        self.write_number(s.len());
        self.output.extend_from_slice(b":\"");
        self.output.extend_from_slice(s);
        self.output.extend_from_slice(b"\";");
    }

    /// Write `<tag>:<count>:`.
    #[inline]
    fn write_tag(&mut self, tag: u8, count: usize) {
        self.output.push(tag);
        self.output.push(b':');
        self.write_number(count);
        self.output.push(b':');
    }

    #[inline]
    fn write_number(&mut self, n: impl fmt::Display) {
        self.output.extend_from_slice(n.to_string().as_bytes());
    }
}

/// Serialize a value to PHP serialized bytes.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{to_bytes, PhpValue};
///
/// let bytes = to_bytes(&PhpValue::from("café")).unwrap();
/// assert_eq!(bytes, "s:5:\"café\";".as_bytes());
/// ```
pub fn to_bytes(value: &PhpValue<'_>) -> SerResult<Vec<u8>> {
    Serializer::new().serialize(value)
}

/// Serialize a value to PHP serialized bytes with custom configuration.
pub fn to_bytes_with_config(value: &PhpValue<'_>, config: SerializerConfig) -> SerResult<Vec<u8>> {
    Serializer::with_config(config).serialize(value)
}

/// Serialize a value to a PHP serialized string.
///
/// Fails with [`SerializeError::InvalidUtf8`] if a string payload is not UTF-8.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{to_string, PhpValue};
///
/// let value = PhpValue::List(vec![PhpValue::from("a"), PhpValue::Int(2)]);
/// assert_eq!(to_string(&value).unwrap(), "a:2:{i:0;s:1:\"a\";i:1;i:2;}");
/// ```
pub fn to_string(value: &PhpValue<'_>) -> SerResult<String> {
    to_string_with_config(value, SerializerConfig::default())
}

/// Serialize a value to a PHP serialized string with custom configuration.
pub fn to_string_with_config(value: &PhpValue<'_>, config: SerializerConfig) -> SerResult<String> {
    let bytes = to_bytes_with_config(value, config)?;
    String::from_utf8(bytes).map_err(|_| SerializeError::InvalidUtf8)
}
