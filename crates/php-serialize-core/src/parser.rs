//! Zero-copy PHP unserialize parser.
//!
//! This module provides a recursive-descent parser for PHP's serialize format.
//! It walks a position index over the immutable input, so string lengths are
//! always counted in bytes, and borrows string payloads directly from it.
//!
//! # References
//!
//! Every array and object is registered as a composite before its children
//! are parsed, which gives composites the same 1-based pre-order ids the
//! serializer assigns. An `r:<id>;` token is accepted only when `<id>` names a
//! composite registered earlier in the same call (an ancestor, for cyclic
//! data) and is kept in the tree as [`PhpValue::Reference`].
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for detailed parsing instrumentation:
//!
//! ```toml
//! php-serialize-core = { version = "0.1", features = ["tracing"] }
//! ```

use std::borrow::Cow;

use bstr::ByteSlice;
use memchr::{memchr, memmem};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::{ErrorKind, PhpDeserializeError, Result};
use crate::types::{ArrayKey, PhpValue};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 128;

/// Type markers this parser understands.
const TYPE_MARKERS: &[u8] = b"NbidsaOrR";

/// Parser configuration options.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
    /// Whether to automatically unescape DB-exported strings.
    pub auto_unescape: bool,
    /// Whether to reject string payloads that are not valid UTF-8.
    pub strict_utf8: bool,
    /// Whether a string length mismatch is a hard error.
    ///
    /// When `strict` is `true` (the default), a declared byte length that is not
    /// followed by `";` fails with [`ErrorKind::StringLengthMismatch`].
    ///
    /// When `strict` is `false`, the parser falls back to scanning for the
    /// closing `";`. This handles data whose lengths were computed in another
    /// encoding (e.g., EUC-KR) but which was stored as UTF-8.
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            auto_unescape: false,
            strict_utf8: false,
            strict: true,
        }
    }
}

/// A zero-copy PHP unserialize parser.
pub struct Parser<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current position in the input.
    pos: usize,
    /// Parser configuration.
    config: ParserConfig,
    /// Current nesting depth.
    depth: usize,
    /// Start position of every composite seen so far, indexed by id - 1.
    references: Vec<usize>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(data: &'a [u8], config: ParserConfig) -> Self {
        Self {
            data,
            pos: 0,
            config,
            depth: 0,
            references: Vec::new(),
        }
    }

    /// Parse the input and return a PHP value.
    ///
    /// The whole input must be one serialized value, optionally surrounded by
    /// ASCII whitespace. Parsing state is reset on every call, so a parser can
    /// be reused.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(data_len = self.data.len())))]
    pub fn parse(&mut self) -> Result<PhpValue<'a>> {
        #[cfg(feature = "tracing")]
        debug!(data_len = self.data.len(), "Starting PHP unserialize");

        self.reset();

        let data = if self.config.auto_unescape {
            preprocess(self.data)
        } else {
            Cow::Borrowed(self.data)
        };

        let result: Result<PhpValue<'a>> = match data {
            Cow::Borrowed(_) => self.parse_document(),
            Cow::Owned(owned) => {
                #[cfg(feature = "tracing")]
                trace!("Data was preprocessed (DB escape detected)");

                // The unescaped buffer is local, so the result must own its strings.
                let mut parser = Parser::with_config(&owned, self.config.clone());
                let value = parser.parse_document().map(PhpValue::into_owned);
                self.references = std::mem::take(&mut parser.references);
                value
            }
        };

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => debug!(
                value_type = value.type_name(),
                composites = self.references.len(),
                "Parse completed successfully"
            ),
            Err(e) => warn!(error = %e, "Parse failed"),
        }

        result
    }

    /// Byte offsets of the composites registered by the last [`parse`](Self::parse),
    /// indexed by reference id minus one.
    pub fn composite_positions(&self) -> &[usize] {
        &self.references
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.depth = 0;
        self.references.clear();
    }

    /// Parse one value that must span the whole input.
    fn parse_document(&mut self) -> Result<PhpValue<'a>> {
        self.skip_whitespace();
        let value = self.parse_value()?;
        self.skip_whitespace();

        if self.pos < self.data.len() {
            return Err(PhpDeserializeError::new(ErrorKind::TrailingData, self.pos)
                .with_input_preview(self.data, self.pos));
        }
        Ok(value)
    }

    /// Parse a single value at the current position.
    ///
    /// This is the core parsing dispatch function that routes to type-specific parsers.
    #[cfg_attr(feature = "tracing", instrument(skip(self), level = "trace", fields(pos = self.pos, depth = self.depth)))]
    fn parse_value(&mut self) -> Result<PhpValue<'a>> {
        let type_byte = self.peek_byte()?;

        #[cfg(feature = "tracing")]
        trace!(type_marker = %char::from(type_byte), pos = self.pos, "Parsing value");

        match type_byte {
            b'N' => self.parse_null(),
            b'b' => self.parse_bool(),
            b'i' => self.parse_int().map(PhpValue::Int),
            b'd' => self.parse_float(),
            b's' => self.parse_string().map(PhpValue::String),
            b'a' => self.parse_array(),
            b'O' => self.parse_object(),
            b'r' | b'R' => self.parse_reference(),
            _ => {
                #[cfg(feature = "tracing")]
                warn!(type_byte = %char::from(type_byte), pos = self.pos, "Unknown type marker");
                Err(PhpDeserializeError::unsupported_format(self.data, self.pos)
                    .with_input_preview(self.data, self.pos))
            }
        }
    }

    /// Parse a null value: `N;`
    fn parse_null(&mut self) -> Result<PhpValue<'a>> {
        self.expect_byte(b'N')?;
        self.expect_byte(b';')?;
        Ok(PhpValue::Null)
    }

    /// Parse a boolean value: `b:0;` or `b:1;`
    fn parse_bool(&mut self) -> Result<PhpValue<'a>> {
        self.expect_byte(b'b')?;
        self.expect_byte(b':')?;

        let value_pos = self.pos;
        let value = match self.read_byte()? {
            b'0' => false,
            b'1' => true,
            other => {
                return Err(PhpDeserializeError::new(
                    ErrorKind::InvalidBoolean(char::from(other).to_string()),
                    value_pos,
                )
                .with_input_preview(self.data, value_pos));
            }
        };

        self.expect_byte(b';')?;
        Ok(PhpValue::Bool(value))
    }

    /// Parse an integer: `i:<value>;`
    fn parse_int(&mut self) -> Result<i64> {
        self.expect_byte(b'i')?;
        self.expect_byte(b':')?;

        let start = self.pos;
        let text = self.read_until(b';')?;
        let value = parse_decimal(text).ok_or_else(|| {
            PhpDeserializeError::new(
                ErrorKind::InvalidInteger(text.to_str_lossy().into_owned()),
                start,
            )
            .with_input_preview(self.data, start)
        })?;

        self.expect_byte(b';')?;
        Ok(value)
    }

    /// Parse a float/double value: `d:<value>;`
    fn parse_float(&mut self) -> Result<PhpValue<'a>> {
        self.expect_byte(b'd')?;
        self.expect_byte(b':')?;

        let start = self.pos;
        let text = self.read_until(b';')?;

        let invalid = || {
            PhpDeserializeError::new(
                ErrorKind::InvalidFloat(text.to_str_lossy().into_owned()),
                start,
            )
            .with_input_preview(self.data, start)
        };

        // Handle special PHP float values
        let value = match text {
            b"INF" => f64::INFINITY,
            b"-INF" => f64::NEG_INFINITY,
            b"NAN" => f64::NAN,
            _ => {
                // Rust also accepts "inf" and "nan" spellings; PHP never writes them.
                let numeric = !text.is_empty()
                    && text
                        .iter()
                        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'));
                if !numeric {
                    return Err(invalid());
                }
                std::str::from_utf8(text)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(invalid)?
            }
        };

        self.expect_byte(b';')?;
        Ok(PhpValue::Float(value))
    }

    /// Parse a string: `s:<len>:"<data>";`
    ///
    /// When `config.strict` is `false`, this method falls back to lenient
    /// recovery if the declared length does not line up with the closing `";`.
    fn parse_string(&mut self) -> Result<Cow<'a, [u8]>> {
        self.expect_byte(b's')?;
        self.expect_byte(b':')?;

        let len = self.read_length(b':')?;

        self.expect_byte(b':')?;
        self.expect_byte(b'"')?;

        let string_start = self.pos;
        let end = string_start.saturating_add(len);

        if self.data.get(end..end.saturating_add(2)) == Some(b"\";".as_slice()) {
            let string_data = &self.data[string_start..end];
            self.check_utf8(string_data, string_start)?;
            self.pos = end + 2;
            return Ok(Cow::Borrowed(string_data));
        }

        if !self.config.strict {
            #[cfg(feature = "tracing")]
            warn!(
                pos = string_start,
                declared_len = len,
                "Strict string parsing failed, attempting lenient recovery"
            );

            return self.parse_string_lenient(string_start, len);
        }

        Err(self.length_mismatch(string_start, len))
    }

    /// Parse a string in lenient mode by searching for the `";` pattern.
    #[cold]
    fn parse_string_lenient(&mut self, string_start: usize, declared_len: usize) -> Result<Cow<'a, [u8]>> {
        #[cfg(feature = "tracing")]
        trace!(
            declared_len = declared_len,
            pos = string_start,
            "Using lenient string parsing"
        );

        // The payload may itself contain `";`, so only accept a candidate that is
        // followed by the end of input, a closing brace or another type marker.
        let mut search_pos = string_start;

        while search_pos < self.data.len().saturating_sub(1) {
            let Some(offset) = memchr(b'"', &self.data[search_pos..]) else {
                break;
            };
            let quote_pos = search_pos + offset;

            if self.data.get(quote_pos + 1) == Some(&b';') {
                let is_valid_end = match self.data.get(quote_pos + 2) {
                    None => true,
                    Some(next) => *next == b'}' || TYPE_MARKERS.contains(next),
                };

                if is_valid_end {
                    let string_data = &self.data[string_start..quote_pos];
                    self.check_utf8(string_data, string_start)?;
                    self.pos = quote_pos + 2;

                    #[cfg(feature = "tracing")]
                    if string_data.len() != declared_len {
                        warn!(
                            declared = declared_len,
                            actual = string_data.len(),
                            "String length mismatch recovered"
                        );
                    }

                    return Ok(Cow::Borrowed(string_data));
                }
            }
            search_pos = quote_pos + 1;
        }

        Err(self
            .length_mismatch(string_start, declared_len)
            .with_context("lenient parsing also failed to find string end"))
    }

    /// Parse an array value: `a:<count>:{<key><value>...}`
    fn parse_array(&mut self) -> Result<PhpValue<'a>> {
        let start = self.pos;
        self.expect_byte(b'a')?;
        self.expect_byte(b':')?;

        let count = self.read_length(b':')?;

        self.expect_byte(b':')?;
        self.expect_byte(b'{')?;

        self.enter(start)?;
        let entries = self.parse_entries(count)?;
        self.leave();

        self.expect_byte(b'}')?;

        Ok(PhpValue::from_entries(entries))
    }

    /// Parse an object value: `O:<namelen>:"<name>":<count>:{<prop>...}`
    fn parse_object(&mut self) -> Result<PhpValue<'a>> {
        let start = self.pos;
        self.expect_byte(b'O')?;
        self.expect_byte(b':')?;

        let name_len = self.read_length(b':')?;

        self.expect_byte(b':')?;
        self.expect_byte(b'"')?;

        let name_start = self.pos;
        let name_end = name_start.saturating_add(name_len);
        if self.data.get(name_end..name_end.saturating_add(2)) != Some(b"\":".as_slice()) {
            return Err(self
                .length_mismatch(name_start, name_len)
                .with_context("object class name"));
        }
        let class_name = std::str::from_utf8(&self.data[name_start..name_end]).map_err(|_| {
            PhpDeserializeError::new(ErrorKind::InvalidUtf8, name_start).with_context("object class name")
        })?;
        self.pos = name_end;

        self.expect_byte(b'"')?;
        self.expect_byte(b':')?;

        let count = self.read_length(b':')?;

        self.expect_byte(b':')?;
        self.expect_byte(b'{')?;

        self.enter(start)?;
        let properties = self.parse_entries(count)?;
        self.leave();

        self.expect_byte(b'}')?;

        Ok(PhpValue::Object {
            class_name: Cow::Borrowed(class_name),
            properties,
        })
    }

    /// Parse `count` key/value pairs.
    fn parse_entries(&mut self, count: usize) -> Result<Vec<(ArrayKey<'a>, PhpValue<'a>)>> {
        let mut entries = Vec::with_capacity(count.min(1024)); // Cap initial allocation

        for _ in 0..count {
            let key = self.parse_key()?;
            let value = self.parse_value()?;
            entries.push((key, value));
        }

        Ok(entries)
    }

    /// Parse an array key or property name, which must be an integer or a string.
    fn parse_key(&mut self) -> Result<ArrayKey<'a>> {
        match self.peek_byte()? {
            b'i' => self.parse_int().map(ArrayKey::Int),
            b's' => self.parse_string().map(ArrayKey::String),
            _ => Err(PhpDeserializeError::new(ErrorKind::InvalidArrayKey, self.pos)
                .with_input_preview(self.data, self.pos)),
        }
    }

    /// Parse a reference: `r:<index>;` or `R:<index>;`
    fn parse_reference(&mut self) -> Result<PhpValue<'a>> {
        self.read_byte()?;
        self.expect_byte(b':')?;

        let idx_start = self.pos;
        let idx = self.read_length(b';')?;

        self.expect_byte(b';')?;

        // Ids are 1-based and may only name composites already registered.
        if idx == 0 || idx > self.references.len() {
            #[cfg(feature = "tracing")]
            warn!(index = idx, available = self.references.len(), "Invalid reference");
            return Err(PhpDeserializeError::new(
                ErrorKind::InvalidReference {
                    index: idx,
                    available: self.references.len(),
                },
                idx_start,
            )
            .with_input_preview(self.data, idx_start));
        }

        #[cfg(feature = "tracing")]
        trace!(index = idx, target_pos = self.references[idx - 1], "Resolved reference");

        Ok(PhpValue::Reference(idx))
    }

    /// Register a composite starting at `start` and descend one level.
    fn enter(&mut self, start: usize) -> Result<()> {
        if self.depth >= self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(PhpDeserializeError::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                start,
            ));
        }
        self.references.push(start);
        self.depth += 1;
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }

    // Helper methods - marked #[inline] for performance on hot paths

    /// Peek at the current byte without consuming it.
    #[inline(always)]
    fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| PhpDeserializeError::new(ErrorKind::UnexpectedEof, self.pos))
    }

    /// Read and consume the current byte.
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Expect a specific byte, returning an error if it doesn't match.
    #[inline]
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_byte()?;
        if byte != expected {
            return Err(self.make_unexpected_char_error(expected, byte));
        }
        Ok(())
    }

    /// Create an unexpected character error with proper context.
    #[cold]
    #[inline(never)]
    fn make_unexpected_char_error(&self, expected: u8, found: u8) -> PhpDeserializeError {
        PhpDeserializeError::new(
            ErrorKind::UnexpectedChar {
                expected: expected as char,
                found: found as char,
            },
            self.pos - 1,
        )
        .with_input_preview(self.data, self.pos.saturating_sub(1))
    }

    /// Read bytes until the delimiter, using SIMD-accelerated search.
    #[inline]
    fn read_until(&mut self, delimiter: u8) -> Result<&'a [u8]> {
        let start = self.pos;
        match memchr(delimiter, &self.data[start..]) {
            Some(offset) => {
                let result = &self.data[start..start + offset];
                self.pos = start + offset;
                Ok(result)
            }
            None => Err(self.make_delimiter_not_found_error(delimiter)),
        }
    }

    /// Read an unsigned decimal length or count terminated by `delimiter`.
    fn read_length(&mut self, delimiter: u8) -> Result<usize> {
        let start = self.pos;
        let text = self.read_until(delimiter)?;

        let value = if !text.is_empty() && text.iter().all(u8::is_ascii_digit) {
            std::str::from_utf8(text).ok().and_then(|s| s.parse().ok())
        } else {
            None
        };

        value.ok_or_else(|| {
            PhpDeserializeError::new(
                ErrorKind::InvalidInteger(text.to_str_lossy().into_owned()),
                start,
            )
            .with_input_preview(self.data, start)
        })
    }

    /// Create a delimiter not found error with proper context.
    #[cold]
    #[inline(never)]
    fn make_delimiter_not_found_error(&self, delimiter: u8) -> PhpDeserializeError {
        PhpDeserializeError::new(
            ErrorKind::UnexpectedChar {
                expected: delimiter as char,
                found: if self.pos < self.data.len() {
                    self.data[self.pos] as char
                } else {
                    '\0'
                },
            },
            self.pos,
        )
        .with_input_preview(self.data, self.pos)
    }

    /// Build a length mismatch error for a payload declared at `start`.
    ///
    /// `found` is the number of bytes up to the next `";`, or up to the end of
    /// input when there is none.
    #[cold]
    fn length_mismatch(&self, start: usize, declared: usize) -> PhpDeserializeError {
        let rest = self.data.get(start..).unwrap_or_default();
        let found = memmem::find(rest, b"\";").unwrap_or(rest.len());
        PhpDeserializeError::new(
            ErrorKind::StringLengthMismatch {
                expected: declared,
                found,
            },
            start,
        )
        .with_input_preview(self.data, start)
    }

    fn check_utf8(&self, bytes: &[u8], start: usize) -> Result<()> {
        if self.config.strict_utf8 {
            if let Err(e) = std::str::from_utf8(bytes) {
                return Err(PhpDeserializeError::new(ErrorKind::InvalidUtf8, start + e.valid_up_to())
                    .with_input_preview(self.data, start + e.valid_up_to()));
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.data.get(self.pos).map_or(false, u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }
}

/// Parse `-?[0-9]+` into an `i64`, rejecting any other spelling.
fn parse_decimal(text: &[u8]) -> Option<i64> {
    let digits = text.strip_prefix(b"-").unwrap_or(text);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(text).ok()?.parse().ok()
}

/// Preprocess data to handle DB-escaped strings.
///
/// Detects patterns like:
/// - `"a:1:{...}"` (wrapped in quotes)
/// - Double quotes escaped as `""`
pub fn preprocess(data: &[u8]) -> Cow<'_, [u8]> {
    let trimmed = data.trim();

    // Check if data starts with `"` and ends with `"`
    if trimmed.len() >= 2 && trimmed[0] == b'"' && trimmed[trimmed.len() - 1] == b'"' {
        // Check if inner content looks like PHP serialized data
        let inner = &trimmed[1..trimmed.len() - 1];
        if inner.first().map_or(false, |b| TYPE_MARKERS.contains(b)) {
            return Cow::Owned(unescape_double_quotes(inner));
        }
    }

    Cow::Borrowed(data)
}

/// Unescape double quotes (`""` -> `"`).
fn unescape_double_quotes(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if i + 1 < data.len() && data[i] == b'"' && data[i + 1] == b'"' {
            result.push(b'"');
            i += 2;
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    result
}

/// Check if data looks like PHP serialized format.
///
/// This is a quick check of the leading type marker that doesn't fully
/// validate the data.
///
/// ```rust
/// use php_serialize_core::is_serialized;
///
/// assert!(is_serialized(b"a:1:{i:0;s:3:\"foo\";}"));
/// assert!(!is_serialized(b"not serialized"));
/// ```
pub fn is_serialized(data: &[u8]) -> bool {
    let trimmed = data.trim_start();
    match (trimmed.first(), trimmed.get(1)) {
        (Some(b'N'), Some(b';')) => true,
        // `N` is the only marker without a `:` after it.
        (Some(&marker), Some(b':')) => marker != b'N' && TYPE_MARKERS.contains(&marker),
        _ => false,
    }
}

/// Parse PHP serialized data from bytes.
///
/// This is the primary API for parsing PHP serialized data.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::from_bytes;
///
/// let value = from_bytes(b"i:42;").unwrap();
/// assert_eq!(value.as_int(), Some(42));
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<PhpValue<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), "from_bytes called");

    let mut parser = Parser::new(data);
    parser.parse()
}

/// Parse PHP serialized data from a string.
#[inline]
pub fn from_str(data: &str) -> Result<PhpValue<'_>> {
    from_bytes(data.as_bytes())
}

/// Parse PHP serialized data from bytes with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes_with_config, ParserConfig};
///
/// let config = ParserConfig {
///     max_depth: 64,
///     auto_unescape: true,
///     strict_utf8: true,
///     strict: false, // Recover from string length mismatches
/// };
/// let value = from_bytes_with_config(b"i:42;", config).unwrap();
/// assert_eq!(value.as_int(), Some(42));
/// ```
#[inline]
pub fn from_bytes_with_config(data: &[u8], config: ParserConfig) -> Result<PhpValue<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), ?config, "from_bytes_with_config called");

    let mut parser = Parser::with_config(data, config);
    parser.parse()
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    fn kind(data: &[u8]) -> ErrorKind {
        from_bytes(data).unwrap_err().kind
    }

    #[test]
    fn test_null() {
        let result = from_bytes(b"N;").unwrap();
        assert_eq!(result, PhpValue::Null);
    }

    #[test]
    fn test_bool() {
        assert_eq!(from_bytes(b"b:0;").unwrap(), PhpValue::Bool(false));
        assert_eq!(from_bytes(b"b:1;").unwrap(), PhpValue::Bool(true));
        assert_eq!(kind(b"b:2;"), ErrorKind::InvalidBoolean("2".into()));
        assert!(matches!(kind(b"b:1"), ErrorKind::UnexpectedEof));
        assert!(matches!(kind(b"b:1:"), ErrorKind::UnexpectedChar { expected: ';', found: ':' }));
    }

    #[test]
    fn test_int() {
        assert_eq!(from_bytes(b"i:0;").unwrap(), PhpValue::Int(0));
        assert_eq!(from_bytes(b"i:42;").unwrap(), PhpValue::Int(42));
        assert_eq!(from_bytes(b"i:-123;").unwrap(), PhpValue::Int(-123));
        assert_eq!(
            from_bytes(b"i:9223372036854775807;").unwrap(),
            PhpValue::Int(i64::MAX)
        );
    }

    #[test]
    fn test_int_rejects_non_digits() {
        assert_eq!(kind(b"i:abc;"), ErrorKind::InvalidInteger("abc".into()));
        assert_eq!(kind(b"i:+5;"), ErrorKind::InvalidInteger("+5".into()));
        assert_eq!(kind(b"i:-;"), ErrorKind::InvalidInteger("-".into()));
        assert_eq!(kind(b"i:;"), ErrorKind::InvalidInteger(String::new()));
        assert!(matches!(kind(b"i:9223372036854775808;"), ErrorKind::InvalidInteger(_)));
    }

    #[test]
    fn test_float() {
        assert_eq!(from_bytes(b"d:0;").unwrap(), PhpValue::Float(0.0));
        assert_eq!(from_bytes(b"d:3.14;").unwrap(), PhpValue::Float(3.14));
        assert_eq!(from_bytes(b"d:-2.5;").unwrap(), PhpValue::Float(-2.5));
        assert_eq!(from_bytes(b"d:1.0E+25;").unwrap(), PhpValue::Float(1.0e25));
    }

    #[test]
    fn test_float_special_values() {
        assert!(matches!(from_bytes(b"d:INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_positive()));
        assert!(matches!(from_bytes(b"d:-INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_negative()));
        assert!(matches!(from_bytes(b"d:NAN;").unwrap(), PhpValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_float_rejects_other_spellings() {
        assert!(matches!(kind(b"d:inf;"), ErrorKind::InvalidFloat(_)));
        assert!(matches!(kind(b"d:NaN;"), ErrorKind::InvalidFloat(_)));
        assert!(matches!(kind(b"d:1.2.3;"), ErrorKind::InvalidFloat(_)));
        assert!(matches!(kind(b"d:;"), ErrorKind::InvalidFloat(_)));
    }

    #[test]
    fn test_string() {
        assert_eq!(
            from_bytes(b"s:0:\"\";").unwrap(),
            PhpValue::String(Cow::Borrowed(b""))
        );
        assert_eq!(
            from_bytes(b"s:5:\"hello\";").unwrap(),
            PhpValue::String(Cow::Borrowed(b"hello"))
        );
    }

    #[test]
    fn test_string_korean() {
        // "한글" = 6 bytes in UTF-8
        let korean = b"s:6:\"\xed\x95\x9c\xea\xb8\x80\";";
        let result = from_bytes(korean).unwrap();
        assert_eq!(result.as_str(), Some("한글"));
    }

    #[test]
    fn test_string_cafe_byte_length() {
        assert_eq!(from_str("s:5:\"café\";").unwrap().as_str(), Some("café"));
        // Code point count is not the length.
        assert!(from_str("s:4:\"café\";").unwrap_err().is_length_mismatch());
    }

    #[test]
    fn test_string_length_mismatch() {
        let err = from_bytes(b"s:10:\"short\";").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::StringLengthMismatch {
                expected: 10,
                found: 5
            }
        );
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_string_declared_too_short() {
        let err = from_bytes(b"s:3:\"hello\";").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::StringLengthMismatch {
                expected: 3,
                found: 5
            }
        );
    }

    #[test]
    fn test_error_truncated_string() {
        let err = from_bytes(b"s:10:\"hello").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::StringLengthMismatch {
                expected: 10,
                found: 5
            }
        );
    }

    #[test]
    fn test_string_huge_declared_length() {
        let data = format!("s:{}:\"x\";", usize::MAX);
        assert!(from_bytes(data.as_bytes()).unwrap_err().is_length_mismatch());
    }

    #[test]
    fn test_array_empty() {
        let result = from_bytes(b"a:0:{}").unwrap();
        assert_eq!(result, PhpValue::List(vec![]));
    }

    #[test]
    fn test_array_indexed() {
        let result = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}").unwrap();
        let items = result.as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("foo"));
        assert_eq!(items[1].as_str(), Some("bar"));
    }

    #[test]
    fn test_array_associative() {
        let result = from_bytes(b"a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}").unwrap();
        assert!(matches!(result, PhpValue::Map(_)));
        assert_eq!(result.get("name").and_then(PhpValue::as_str), Some("Alice"));
        assert_eq!(result.get("age").and_then(PhpValue::as_int), Some(30));
    }

    #[test]
    fn test_array_non_sequential_keys() {
        // Non-sequential integer keys should be preserved
        let result = from_bytes(b"a:2:{i:5;s:1:\"a\";i:10;s:1:\"b\";}").unwrap();
        let entries = result.as_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, ArrayKey::Int(5));
        assert_eq!(entries[1].0, ArrayKey::Int(10));
    }

    #[test]
    fn test_array_out_of_order_keys_stay_map() {
        let result = from_bytes(b"a:2:{i:1;s:1:\"b\";i:0;s:1:\"a\";}").unwrap();
        assert!(matches!(result, PhpValue::Map(ref e) if e.len() == 2));
    }

    #[test]
    fn test_array_invalid_key() {
        assert_eq!(kind(b"a:1:{N;i:1;}"), ErrorKind::InvalidArrayKey);
        assert_eq!(kind(b"a:1:{a:0:{}i:1;}"), ErrorKind::InvalidArrayKey);
    }

    #[test]
    fn test_array_count_mismatch() {
        // Declared 2 entries, only one present.
        assert!(matches!(
            kind(b"a:2:{i:0;i:1;}"),
            ErrorKind::InvalidArrayKey
        ));
        // Declared 1 entry, two present.
        assert!(matches!(
            kind(b"a:1:{i:0;i:1;i:1;i:2;}"),
            ErrorKind::UnexpectedChar { expected: '}', found: 'i' }
        ));
    }

    #[test]
    fn test_object() {
        let data = br#"O:8:"stdClass":2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
        let result = from_bytes(data).unwrap();
        assert_eq!(result.class_name(), Some("stdClass"));
        let properties = result.as_entries().unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].0.as_str(), Some("name"));
        assert_eq!(result.get("age").and_then(PhpValue::as_int), Some(30));
    }

    #[test]
    fn test_object_private_protected_names_kept_verbatim() {
        // Private: \0ClassName\0propName, protected: \0*\0propName
        let data = b"O:4:\"Test\":2:{s:10:\"\x00Test\x00priv\";i:1;s:7:\"\x00*\x00prot\";i:2;}";
        let result = from_bytes(data).unwrap();
        let properties = result.as_entries().unwrap();
        assert_eq!(properties[0].0, ArrayKey::String(Cow::Borrowed(b"\x00Test\x00priv")));
        assert_eq!(properties[1].0, ArrayKey::String(Cow::Borrowed(b"\x00*\x00prot")));
    }

    #[test]
    fn test_object_class_name_length_mismatch() {
        let err = from_bytes(b"O:3:\"User\":0:{}").unwrap_err();
        assert!(err.is_length_mismatch());
        assert_eq!(err.context.as_deref(), Some("object class name"));
    }

    #[test]
    fn test_reference_to_ancestor() {
        let result = from_bytes(b"a:1:{s:4:\"self\";r:1;}").unwrap();
        assert_eq!(result.get("self"), Some(&PhpValue::Reference(1)));
    }

    #[test]
    fn test_reference_shared() {
        let data = b"a:2:{i:0;a:1:{i:0;i:7;}i:1;r:2;}";
        let result = from_bytes(data).unwrap();
        assert_eq!(result.get_index(1), Some(&PhpValue::Reference(2)));
    }

    #[test]
    fn test_reference_uppercase_alias() {
        let result = from_bytes(b"a:1:{i:0;R:1;}").unwrap();
        assert_eq!(result.get_index(0), Some(&PhpValue::Reference(1)));
    }

    #[test]
    fn test_reference_out_of_range() {
        assert_eq!(
            kind(b"r:1;"),
            ErrorKind::InvalidReference {
                index: 1,
                available: 0
            }
        );
        assert_eq!(
            kind(b"a:1:{i:0;r:2;}"),
            ErrorKind::InvalidReference {
                index: 2,
                available: 1
            }
        );
        assert!(matches!(kind(b"a:1:{i:0;r:0;}"), ErrorKind::InvalidReference { index: 0, .. }));
    }

    #[test]
    fn test_composite_positions() {
        let data = b"a:2:{i:0;a:0:{}i:1;O:1:\"A\":0:{}}";
        let mut parser = Parser::new(data);
        parser.parse().unwrap();
        assert_eq!(parser.composite_positions(), &[0, 9, 19]);

        // Reusing the parser starts from a clean reference store.
        let mut parser = Parser::new(b"a:1:{i:0;r:1;}");
        parser.parse().unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.composite_positions(), &[0]);
    }

    #[test]
    fn test_nested_array_depth() {
        // Test deeply nested arrays don't overflow
        let mut data = String::from("s:4:\"leaf\";");
        for _ in 0..100 {
            data = format!("a:1:{{s:1:\"k\";{}}}", data);
        }
        let result = from_bytes(data.as_bytes()).unwrap();
        assert!(result.is_array());
    }

    #[test]
    fn test_max_depth_exceeded() {
        let mut data = String::from("N;");
        for _ in 0..10 {
            data = format!("a:1:{{i:0;{}}}", data);
        }
        let config = ParserConfig {
            max_depth: 5,
            ..Default::default()
        };
        let err = from_bytes_with_config(data.as_bytes(), config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded(5));
    }

    #[test]
    fn test_error_invalid_type() {
        let err = from_bytes(b"X:1;").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnsupportedFormat {
                excerpt: "X:1;".into()
            }
        );
        assert!(err.to_string().contains("unsupported or invalid serialized format"));
    }

    #[test]
    fn test_error_arbitrary_text() {
        assert!(matches!(kind(b"hello world"), ErrorKind::UnsupportedFormat { .. }));
        assert_eq!(kind(b""), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_trailing_data() {
        assert_eq!(kind(b"i:1;i:2;"), ErrorKind::TrailingData);
        assert_eq!(from_bytes(b"  i:1;\n").unwrap(), PhpValue::Int(1));
    }

    #[test]
    fn test_special_string_binary() {
        // Binary data with null bytes
        let data = b"s:5:\"a\x00b\x00c\";";
        let result = from_bytes(data).unwrap();
        assert_eq!(result.as_bytes(), Some(b"a\x00b\x00c".as_slice()));
    }

    #[test]
    fn test_strict_utf8() {
        let data = b"s:2:\"\xff\xfe\";";
        assert!(from_bytes(data).is_ok());
        let config = ParserConfig {
            strict_utf8: true,
            ..Default::default()
        };
        let err = from_bytes_with_config(data, config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUtf8);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_string_with_semicolon() {
        // String containing semicolon (common in serialized data)
        let result = from_bytes(b"s:11:\"hello;world\";").unwrap();
        assert_eq!(result.as_str(), Some("hello;world"));
    }

    #[test]
    fn test_string_with_quotes() {
        // PHP uses length-based strings, so quotes need no escaping.
        let result = from_bytes(b"s:8:\"say \"hi\"\";").unwrap();
        assert_eq!(result.as_str(), Some("say \"hi\""));
    }

    #[test]
    fn test_lenient_encoding_mismatch() {
        // "한글" is 6 bytes in UTF-8, but declared as 4 (EUC-KR byte count)
        let data = b"a:1:{s:3:\"key\";s:4:\"\xed\x95\x9c\xea\xb8\x80\";}";
        assert!(from_bytes(data).unwrap_err().is_length_mismatch());

        let config = ParserConfig {
            strict: false,
            ..Default::default()
        };
        let result = from_bytes_with_config(data, config).unwrap();
        assert_eq!(result.get("key").and_then(PhpValue::as_str), Some("한글"));
    }

    #[test]
    fn test_lenient_still_fails_without_terminator() {
        let config = ParserConfig {
            strict: false,
            ..Default::default()
        };
        let err = from_bytes_with_config(b"s:4:\"abc", config).unwrap_err();
        assert!(err.is_length_mismatch());
        assert!(err.context.is_some());
    }

    #[test]
    fn test_strict_is_default() {
        assert!(ParserConfig::default().strict);
        assert!(!ParserConfig::default().auto_unescape);
    }

    #[test]
    fn test_preprocess_db_escaped() {
        // DB-escaped format: "a:1:{s:3:""key"";s:5:""value"";}"
        let escaped = b"\"a:1:{s:3:\"\"key\"\";s:5:\"\"value\"\";}\"";
        assert!(from_bytes(escaped).is_err());

        let config = ParserConfig {
            auto_unescape: true,
            ..Default::default()
        };
        let result = from_bytes_with_config(escaped, config).unwrap();
        assert_eq!(result.get("key").and_then(PhpValue::as_str), Some("value"));
    }

    #[test]
    fn test_preprocess_passthrough() {
        assert!(matches!(preprocess(b"i:1;"), Cow::Borrowed(_)));
        assert!(matches!(preprocess(b"\"hello\""), Cow::Borrowed(_)));
        assert_eq!(preprocess(b"\"s:1:\"\"x\"\";\"").as_ref(), b"s:1:\"x\";");
    }

    #[test]
    fn test_is_serialized() {
        assert!(is_serialized(b"N;"));
        assert!(is_serialized(b"a:1:{i:0;s:3:\"foo\";}"));
        assert!(is_serialized(b"  O:1:\"A\":0:{}"));
        assert!(!is_serialized(b"not serialized"));
        assert!(!is_serialized(b"{\"json\": true}"));
        assert!(!is_serialized(b""));
    }

    #[test]
    fn test_is_serialized_null_needs_semicolon() {
        assert!(!is_serialized(b"N:"));
        assert!(!is_serialized(b"N:1;"));
        assert!(is_serialized(b"  N;"));
    }
}
