//! JSON conversion for PHP values.
//!
//! This module converts between `serde_json` values and [`PhpValue`], and
//! drives whole-text conversions in both directions:
//!
//! - [`json_to_php`]: JSON text → PHP serialized text
//! - [`php_to_json`]: PHP serialized text → pretty-printed JSON text
//!
//! Enable the `serde` feature (on by default) to use this module.
//!
//! # Mapping Rules
//!
//! | PHP | JSON |
//! |-----|------|
//! | `null` | `null` |
//! | `bool` | `boolean` |
//! | `int` | integral `number` |
//! | `float` | `number`, or per [`SpecialFloats`] when non-finite |
//! | `string` | `string` (lossy UTF-8 conversion) |
//! | `array` (list) | `array` |
//! | `array` (map) | `object`, integer keys in decimal |
//! | `object` | `object` with a leading `"__class"` member |
//! | `r:<id>` | the referenced value, expanded in place |
//!
//! JSON cannot express cycles, so a reference to one of its own containers
//! fails with [`SerializeError::CircularReference`].

use serde_json::{Map, Number, Value as JsonValue};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, warn};

use crate::error::{Error, SerializeError};
use crate::parser::{from_bytes_with_config, ParserConfig};
use crate::serializer::{Serializer, SerializerConfig};
use crate::types::{ArrayKey, PhpValue, RefTable, CLASS_KEY};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 128;

/// Default cap on values produced by expanding shared references.
const MAX_EXPANDED_NODES: usize = 100_000;

const INF_TOKEN: &str = "INF";
const NEG_INF_TOKEN: &str = "-INF";
const NAN_TOKEN: &str = "NAN";

type SerResult<T> = std::result::Result<T, SerializeError>;

/// How `INF`, `-INF` and `NAN` cross the JSON boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFloats {
    /// Render them as the strings `"INF"`, `"-INF"` and `"NAN"`, and read those
    /// exact strings back as floats.
    ///
    /// A JSON string that is literally `"NAN"` can therefore not be sent as a
    /// PHP string under this policy.
    #[default]
    Tokens,
    /// Render them as `null`. Lossy.
    Null,
    /// Refuse to render them.
    Reject,
}

/// Options for JSON conversion.
#[derive(Debug, Clone)]
pub struct JsonConfig {
    /// Treatment of non-finite floats.
    pub special_floats: SpecialFloats,
    /// Maximum nesting depth in either direction.
    pub max_depth: usize,
    /// Maximum number of JSON values rendered in place of `r:` references.
    ///
    /// Each expansion copies the whole referenced subtree, so sibling
    /// references at every level grow the output exponentially.
    pub max_expanded_nodes: usize,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Options for reading PHP serialized input.
    pub parser: ParserConfig,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            special_floats: SpecialFloats::default(),
            max_depth: MAX_DEPTH,
            max_expanded_nodes: MAX_EXPANDED_NODES,
            pretty: true,
            parser: ParserConfig::default(),
        }
    }
}

/// Convert a JSON value to a PHP value.
///
/// Objects carrying a `"__class"` string member become PHP objects of that
/// class; integral numbers that fit in `i64` become integers and every other
/// number a float.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::json::{from_json, JsonConfig};
/// use serde_json::json;
///
/// let value = from_json(&json!({"__class": "User", "id": 1}), &JsonConfig::default()).unwrap();
/// assert_eq!(value.class_name(), Some("User"));
/// assert_eq!(value.get("id").and_then(|v| v.as_int()), Some(1));
/// ```
pub fn from_json(value: &JsonValue, config: &JsonConfig) -> SerResult<PhpValue<'static>> {
    convert_json(value, config, 0)
}

fn convert_json(value: &JsonValue, config: &JsonConfig, depth: usize) -> SerResult<PhpValue<'static>> {
    match value {
        JsonValue::Null => Ok(PhpValue::Null),
        JsonValue::Bool(b) => Ok(PhpValue::Bool(*b)),
        JsonValue::Number(n) => convert_number(n),
        JsonValue::String(s) => Ok(special_float_token(s, config.special_floats)
            .map_or_else(|| PhpValue::string(s.as_str()), PhpValue::Float)),
        JsonValue::Array(items) => {
            check_depth(depth, config.max_depth)?;
            let items = items
                .iter()
                .map(|item| convert_json(item, config, depth + 1))
                .collect::<SerResult<Vec<_>>>()?;
            Ok(PhpValue::List(items))
        }
        JsonValue::Object(map) => {
            check_depth(depth, config.max_depth)?;
            let class_name = match map.get(CLASS_KEY) {
                None => None,
                Some(JsonValue::String(name)) => Some(name.clone()),
                Some(other) => {
                    return Err(SerializeError::UnsupportedType(format!(
                        "{} must be a string, found {}",
                        CLASS_KEY,
                        json_type_name(other)
                    )));
                }
            };

            let entries = map
                .iter()
                .filter(|(k, _)| class_name.is_none() || k.as_str() != CLASS_KEY)
                .map(|(k, v)| -> SerResult<_> {
                    Ok((ArrayKey::from(k.clone()), convert_json(v, config, depth + 1)?))
                })
                .collect::<SerResult<Vec<_>>>()?;

            Ok(match class_name {
                Some(name) => PhpValue::Object {
                    class_name: name.into(),
                    properties: entries,
                },
                None => PhpValue::Map(entries),
            })
        }
    }
}

fn convert_number(n: &Number) -> SerResult<PhpValue<'static>> {
    if let Some(i) = n.as_i64() {
        return Ok(PhpValue::Int(i));
    }
    // Past i64::MAX PHP itself falls back to float.
    n.as_f64()
        .map(PhpValue::Float)
        .ok_or_else(|| SerializeError::UnsupportedType(format!("number {} out of range", n)))
}

fn special_float_token(s: &str, policy: SpecialFloats) -> Option<f64> {
    if policy != SpecialFloats::Tokens {
        return None;
    }
    match s {
        INF_TOKEN => Some(f64::INFINITY),
        NEG_INF_TOKEN => Some(f64::NEG_INFINITY),
        NAN_TOKEN => Some(f64::NAN),
        _ => None,
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[inline]
fn check_depth(depth: usize, max_depth: usize) -> SerResult<()> {
    if depth >= max_depth {
        return Err(SerializeError::MaxDepthExceeded(max_depth));
    }
    Ok(())
}

/// Convert a PHP value to a JSON value.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, json::{to_json, JsonConfig}};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json = to_json(&php_value, &JsonConfig::default()).unwrap();
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &PhpValue<'_>, config: &JsonConfig) -> SerResult<JsonValue> {
    JsonRenderer {
        table: RefTable::build(value),
        ancestors: Vec::new(),
        reference_depth: 0,
        expanded_nodes: 0,
        config,
    }
    .render(value)
}

/// Renders a value tree, expanding references through its [`RefTable`].
struct JsonRenderer<'v, 'a, 'c> {
    table: RefTable<'v, 'a>,
    /// Composites currently being rendered, outermost first.
    ancestors: Vec<&'v PhpValue<'a>>,
    /// Number of references currently being expanded.
    reference_depth: usize,
    /// Values rendered so far inside reference expansions.
    expanded_nodes: usize,
    config: &'c JsonConfig,
}

impl<'v, 'a> JsonRenderer<'v, 'a, '_> {
    fn render(&mut self, value: &'v PhpValue<'a>) -> SerResult<JsonValue> {
        if self.reference_depth > 0 {
            self.expanded_nodes += 1;
            if self.expanded_nodes > self.config.max_expanded_nodes {
                #[cfg(feature = "tracing")]
                warn!(limit = self.config.max_expanded_nodes, "Reference expansion limit exceeded");
                return Err(SerializeError::ExpansionLimitExceeded(
                    self.config.max_expanded_nodes,
                ));
            }
        }

        match value {
            PhpValue::Null => Ok(JsonValue::Null),
            PhpValue::Bool(b) => Ok(JsonValue::Bool(*b)),
            PhpValue::Int(i) => Ok(JsonValue::Number((*i).into())),
            PhpValue::Float(f) => self.render_float(*f),
            PhpValue::String(s) => Ok(JsonValue::String(String::from_utf8_lossy(s).into_owned())),
            PhpValue::List(items) => {
                self.enter(value)?;
                let items = items
                    .iter()
                    .map(|item| self.render(item))
                    .collect::<SerResult<Vec<_>>>()?;
                self.leave();
                Ok(JsonValue::Array(items))
            }
            PhpValue::Map(entries) => {
                self.enter(value)?;
                let mut map = Map::with_capacity(entries.len());
                self.render_entries(entries, &mut map)?;
                self.leave();
                Ok(JsonValue::Object(map))
            }
            PhpValue::Object {
                class_name,
                properties,
            } => {
                self.enter(value)?;
                let mut map = Map::with_capacity(properties.len() + 1);
                map.insert(CLASS_KEY.to_string(), JsonValue::String(class_name.to_string()));
                self.render_entries(properties, &mut map)?;
                self.leave();
                Ok(JsonValue::Object(map))
            }
            PhpValue::Reference(id) => {
                let target = self
                    .table
                    .get(*id)
                    .ok_or(SerializeError::InvalidReference(*id))?;
                if self.ancestors.iter().any(|a| std::ptr::eq(*a, target)) {
                    #[cfg(feature = "tracing")]
                    warn!(id = *id, "Circular reference cannot be rendered as JSON");
                    return Err(SerializeError::CircularReference(*id));
                }
                self.reference_depth += 1;
                let rendered = self.render(target);
                self.reference_depth -= 1;
                rendered
            }
        }
    }

    fn render_entries(
        &mut self,
        entries: &'v [(ArrayKey<'a>, PhpValue<'a>)],
        map: &mut Map<String, JsonValue>,
    ) -> SerResult<()> {
        for (key, value) in entries {
            // `i:1` and `s:1:"1"` both become "1", and a property may be named `__class`.
            let name = key.to_string_lossy().into_owned();
            if map.contains_key(&name) {
                return Err(SerializeError::UnsupportedType(format!(
                    "duplicate JSON key \"{}\"",
                    name
                )));
            }
            let rendered = self.render(value)?;
            map.insert(name, rendered);
        }
        Ok(())
    }

    fn render_float(&self, f: f64) -> SerResult<JsonValue> {
        if let Some(n) = Number::from_f64(f) {
            return Ok(JsonValue::Number(n));
        }

        let token = if f.is_nan() {
            NAN_TOKEN
        } else if f.is_sign_positive() {
            INF_TOKEN
        } else {
            NEG_INF_TOKEN
        };

        match self.config.special_floats {
            SpecialFloats::Tokens => Ok(JsonValue::String(token.to_string())),
            SpecialFloats::Null => Ok(JsonValue::Null),
            SpecialFloats::Reject => Err(SerializeError::UnsupportedType(format!(
                "float {} cannot be represented in JSON",
                token
            ))),
        }
    }

    fn enter(&mut self, value: &'v PhpValue<'a>) -> SerResult<()> {
        check_depth(self.ancestors.len(), self.config.max_depth)?;
        self.ancestors.push(value);
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.ancestors.pop();
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, json::to_json_string};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json_str = to_json_string(&php_value).unwrap();
/// assert_eq!(json_str, r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json_string(value: &PhpValue<'_>) -> Result<String, Error> {
    let config = JsonConfig {
        pretty: false,
        ..JsonConfig::default()
    };
    render_json_text(value, &config)
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &PhpValue<'_>) -> Result<String, Error> {
    render_json_text(value, &JsonConfig::default())
}

fn render_json_text(value: &PhpValue<'_>, config: &JsonConfig) -> Result<String, Error> {
    let json = to_json(value, config)?;
    let text = if config.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

/// Convert JSON text to PHP serialized text.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::json_to_php;
///
/// let php = json_to_php(r#"{"name":"John","age":30}"#).unwrap();
/// assert_eq!(php, r#"a:2:{s:4:"name";s:4:"John";s:3:"age";i:30;}"#);
/// ```
pub fn json_to_php(input: &str) -> Result<String, Error> {
    json_to_php_with_config(input, &JsonConfig::default())
}

/// Convert JSON text to PHP serialized text with custom configuration.
#[cfg_attr(feature = "tracing", instrument(skip(input, config), fields(input_len = input.len())))]
pub fn json_to_php_with_config(input: &str, config: &JsonConfig) -> Result<String, Error> {
    #[cfg(feature = "tracing")]
    debug!(input_len = input.len(), "Converting JSON to PHP serialized text");

    let json: JsonValue = serde_json::from_str(input)?;
    let value = from_json(&json, config)?;

    let mut serializer = Serializer::with_config(SerializerConfig {
        max_depth: config.max_depth,
    });
    let bytes = serializer.serialize(&value)?;
    let text = String::from_utf8(bytes).map_err(|_| SerializeError::InvalidUtf8)?;

    #[cfg(feature = "tracing")]
    debug!(output_len = text.len(), "JSON to PHP conversion completed");

    Ok(text)
}

/// Convert PHP serialized text to pretty-printed JSON text.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::php_to_json;
///
/// let json = php_to_json(r#"O:4:"User":1:{s:2:"id";i:123;}"#).unwrap();
/// assert_eq!(json, "{\n  \"__class\": \"User\",\n  \"id\": 123\n}");
/// ```
pub fn php_to_json(input: impl AsRef<[u8]>) -> Result<String, Error> {
    php_to_json_with_config(input, &JsonConfig::default())
}

/// Convert PHP serialized text to JSON text with custom configuration.
pub fn php_to_json_with_config(input: impl AsRef<[u8]>, config: &JsonConfig) -> Result<String, Error> {
    let data = input.as_ref();

    #[cfg(feature = "tracing")]
    debug!(input_len = data.len(), "Converting PHP serialized text to JSON");

    let value = from_bytes_with_config(data, config.parser.clone())?;
    render_json_text(&value, config)
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::from_bytes;
    use serde_json::json;

    fn render(value: &PhpValue<'_>) -> SerResult<JsonValue> {
        to_json(value, &JsonConfig::default())
    }

    fn convert(value: &JsonValue) -> SerResult<PhpValue<'static>> {
        from_json(value, &JsonConfig::default())
    }

    #[test]
    fn test_simple_types() {
        assert_eq!(render(&PhpValue::Null).unwrap(), JsonValue::Null);
        assert_eq!(render(&PhpValue::Bool(true)).unwrap(), JsonValue::Bool(true));
        assert_eq!(render(&PhpValue::Int(42)).unwrap(), json!(42));
        assert_eq!(render(&PhpValue::Float(3.14)).unwrap(), json!(3.14));
    }

    #[test]
    fn test_indexed_array() {
        let data = b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}";
        let value = from_bytes(data).unwrap();
        assert_eq!(render(&value).unwrap(), json!(["foo", "bar"]));
    }

    #[test]
    fn test_associative_array() {
        let data = b"a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}";
        let value = from_bytes(data).unwrap();
        assert_eq!(render(&value).unwrap(), json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_mixed_array() {
        // Non-sequential keys -> object
        let data = b"a:2:{i:0;s:3:\"foo\";i:5;s:3:\"bar\";}";
        let value = from_bytes(data).unwrap();
        assert_eq!(render(&value).unwrap(), json!({"0": "foo", "5": "bar"}));
    }

    #[test]
    fn test_nested() {
        let data = b"a:1:{s:4:\"user\";a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}}";
        let value = from_bytes(data).unwrap();
        assert_eq!(
            render(&value).unwrap(),
            json!({"user": {"name": "Alice", "age": 30}})
        );
    }

    #[test]
    fn test_object_class_first() {
        let value = from_bytes(br#"O:4:"User":2:{s:2:"id";i:123;s:4:"name";s:4:"John";}"#).unwrap();
        let json = render(&value).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["__class", "id", "name"]);
        assert_eq!(json, json!({"__class": "User", "id": 123, "name": "John"}));
    }

    #[test]
    fn test_shared_reference_expanded() {
        let value = from_bytes(b"a:2:{s:1:\"a\";a:1:{i:0;i:7;}s:1:\"b\";r:2;}").unwrap();
        assert_eq!(render(&value).unwrap(), json!({"a": [7], "b": [7]}));
    }

    #[test]
    fn test_circular_reference_rejected() {
        let value = from_bytes(b"a:1:{s:4:\"self\";r:1;}").unwrap();
        assert_eq!(render(&value), Err(SerializeError::CircularReference(1)));

        let nested = from_bytes(b"a:1:{i:0;a:1:{i:0;r:1;}}").unwrap();
        assert_eq!(render(&nested), Err(SerializeError::CircularReference(1)));
    }

    #[test]
    fn test_sibling_reference_expansion_limit() {
        // Each level holds a child and a reference to that child.
        let mut data = String::from("a:0:{}");
        for level in (1..=20).rev() {
            data = format!("a:2:{{i:0;{}i:1;r:{};}}", data, level + 1);
        }
        let value = from_bytes(data.as_bytes()).unwrap();

        assert_eq!(
            render(&value),
            Err(SerializeError::ExpansionLimitExceeded(MAX_EXPANDED_NODES))
        );

        let small = JsonConfig {
            max_expanded_nodes: 3,
            ..JsonConfig::default()
        };
        let shared = from_bytes(b"a:2:{i:0;a:1:{i:0;i:1;}i:1;r:2;}").unwrap();
        assert_eq!(to_json(&shared, &small).unwrap(), json!([[1], [1]]));
        let tight = JsonConfig {
            max_expanded_nodes: 1,
            ..JsonConfig::default()
        };
        assert_eq!(
            to_json(&shared, &tight),
            Err(SerializeError::ExpansionLimitExceeded(1))
        );
    }

    #[test]
    fn test_colliding_keys_rejected() {
        let value = from_bytes(b"a:2:{i:1;s:1:\"a\";s:1:\"1\";s:1:\"b\";}").unwrap();
        assert_eq!(
            render(&value),
            Err(SerializeError::UnsupportedType("duplicate JSON key \"1\"".into()))
        );

        let object = from_bytes(b"O:1:\"A\":1:{s:7:\"__class\";s:1:\"B\";}").unwrap();
        assert_eq!(
            render(&object),
            Err(SerializeError::UnsupportedType("duplicate JSON key \"__class\"".into()))
        );
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let value = PhpValue::List(vec![PhpValue::Reference(4)]);
        assert_eq!(render(&value), Err(SerializeError::InvalidReference(4)));
    }

    #[test]
    fn test_special_floats_policies() {
        let value = PhpValue::List(vec![
            PhpValue::Float(f64::INFINITY),
            PhpValue::Float(f64::NEG_INFINITY),
            PhpValue::Float(f64::NAN),
        ]);
        assert_eq!(render(&value).unwrap(), json!(["INF", "-INF", "NAN"]));

        let null = JsonConfig {
            special_floats: SpecialFloats::Null,
            ..JsonConfig::default()
        };
        assert_eq!(to_json(&value, &null).unwrap(), json!([null, null, null]));

        let reject = JsonConfig {
            special_floats: SpecialFloats::Reject,
            ..JsonConfig::default()
        };
        assert!(matches!(
            to_json(&value, &reject),
            Err(SerializeError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_from_json_special_float_tokens() {
        let value = convert(&json!(["INF", "-INF", "NAN", "inf"])).unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items[0], PhpValue::Float(f64::INFINITY));
        assert_eq!(items[1], PhpValue::Float(f64::NEG_INFINITY));
        assert!(matches!(items[2], PhpValue::Float(f) if f.is_nan()));
        assert_eq!(items[3].as_str(), Some("inf"));

        let reject = JsonConfig {
            special_floats: SpecialFloats::Reject,
            ..JsonConfig::default()
        };
        let value = from_json(&json!("NAN"), &reject).unwrap();
        assert_eq!(value.as_str(), Some("NAN"));
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(convert(&json!(30)).unwrap(), PhpValue::Int(30));
        assert_eq!(convert(&json!(-7)).unwrap(), PhpValue::Int(-7));
        assert_eq!(convert(&json!(123.45)).unwrap(), PhpValue::Float(123.45));
        assert_eq!(
            convert(&json!(u64::MAX)).unwrap(),
            PhpValue::Float(u64::MAX as f64)
        );
    }

    #[test]
    fn test_from_json_tagged_object() {
        let value = convert(&json!({"id": 1, "__class": "User", "name": "John"})).unwrap();
        assert_eq!(value.class_name(), Some("User"));
        let names: Vec<_> = value
            .as_entries()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str().unwrap())
            .collect();
        assert_eq!(names, ["id", "name"]);
    }

    #[test]
    fn test_from_json_bad_class() {
        let err = convert(&json!({"__class": 5})).unwrap_err();
        assert_eq!(
            err,
            SerializeError::UnsupportedType("__class must be a string, found number".into())
        );
    }

    #[test]
    fn test_from_json_depth() {
        let mut value = json!(null);
        for _ in 0..10 {
            value = json!([value]);
        }
        let config = JsonConfig {
            max_depth: 4,
            ..JsonConfig::default()
        };
        assert_eq!(
            from_json(&value, &config),
            Err(SerializeError::MaxDepthExceeded(4))
        );
    }

    #[test]
    fn test_json_to_php() {
        assert_eq!(
            json_to_php(r#"["a","b","c"]"#).unwrap(),
            r#"a:3:{i:0;s:1:"a";i:1;s:1:"b";i:2;s:1:"c";}"#
        );
        assert_eq!(
            json_to_php(r#"{"__class":"User","id":123,"name":"John"}"#).unwrap(),
            r#"O:4:"User":2:{s:2:"id";i:123;s:4:"name";s:4:"John";}"#
        );
        assert_eq!(json_to_php(r#""café""#).unwrap(), "s:5:\"café\";");
    }

    #[test]
    fn test_json_to_php_invalid_json() {
        let err = json_to_php("{not json").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::JsonParse);
        assert!(err.to_string().starts_with("invalid JSON: "));
    }

    #[test]
    fn test_php_to_json_pretty() {
        let json = php_to_json(r#"a:2:{s:4:"name";s:4:"John";s:4:"tags";a:1:{i:0;s:5:"admin";}}"#).unwrap();
        assert_eq!(
            json,
            "{\n  \"name\": \"John\",\n  \"tags\": [\n    \"admin\"\n  ]\n}"
        );
    }

    #[test]
    fn test_php_to_json_errors() {
        let err = php_to_json(r#"s:10:"short";"#).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::LengthMismatch);

        let err = php_to_json("not php at all").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);

        let err = php_to_json("a:1:{i:0;r:1;}").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Reference);
    }
}
