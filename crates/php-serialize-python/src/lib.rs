//! Python bindings for php-serialize-core.

use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};
use serde_json::Value as JsonValue;

use php_serialize_core::{
    from_bytes_with_config, json::to_json, json_to_php_with_config, php_to_json_with_config,
    JsonConfig, ParserConfig, SpecialFloats,
};

pyo3::create_exception!(php_serialize, PhpSerializeError, pyo3::exceptions::PyException);

fn to_py_err(err: impl std::fmt::Display) -> PyErr {
    PhpSerializeError::new_err(err.to_string())
}

fn parse_special_floats(name: &str) -> PyResult<SpecialFloats> {
    match name {
        "tokens" => Ok(SpecialFloats::Tokens),
        "null" => Ok(SpecialFloats::Null),
        "reject" => Ok(SpecialFloats::Reject),
        other => Err(PhpSerializeError::new_err(format!(
            "special_floats must be 'tokens', 'null' or 'reject', not '{}'",
            other
        ))),
    }
}

fn json_config(
    special_floats: &str,
    auto_unescape: bool,
    strict: bool,
    pretty: bool,
) -> PyResult<JsonConfig> {
    Ok(JsonConfig {
        special_floats: parse_special_floats(special_floats)?,
        pretty,
        parser: ParserConfig {
            auto_unescape,
            strict,
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Convert a JSON value to a Python object.
fn json_to_python(py: Python<'_>, value: &JsonValue) -> PyResult<PyObject> {
    match value {
        JsonValue::Null => Ok(py.None()),
        JsonValue::Bool(b) => Ok(b.to_object(py)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_object(py))
            } else {
                Ok(n.as_f64().unwrap_or(f64::NAN).to_object(py))
            }
        }
        JsonValue::String(s) => Ok(s.to_object(py)),
        JsonValue::Array(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(json_to_python(py, item)?)?;
            }
            Ok(list.to_object(py))
        }
        JsonValue::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in map {
                dict.set_item(k, json_to_python(py, v)?)?;
            }
            Ok(dict.to_object(py))
        }
    }
}

/// Serialize JSON text to PHP serialized text.
///
/// Args:
///     data: JSON text. Objects with a "__class" member become PHP objects.
///     special_floats: How "INF", "-INF" and "NAN" strings are read:
///         - "tokens": as the corresponding floats (default)
///         - "null" / "reject": as plain strings
///
/// Returns:
///     The PHP serialized string
///
/// Raises:
///     PhpSerializeError: If the JSON is invalid or cannot be serialized
///
/// Example:
///     >>> from php_serialize import dumps
///     >>> dumps('{"__class": "User", "id": 123}')
///     'O:4:"User":1:{s:2:"id";i:123;}'
#[pyfunction]
#[pyo3(signature = (data, *, special_floats="tokens"))]
fn dumps(data: &str, special_floats: &str) -> PyResult<String> {
    let config = json_config(special_floats, false, true, false)?;
    json_to_php_with_config(data, &config).map_err(to_py_err)
}

/// Deserialize PHP serialized data to a Python object.
///
/// Arrays with keys 0..n-1 become lists, other arrays dicts, and objects dicts
/// with a "__class" key. Shared references are expanded; cyclic data raises.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     special_floats: How INF, -INF and NAN are returned:
///         - "tokens": as the strings "INF", "-INF", "NAN" (default)
///         - "null": as None
///         - "reject": raise PhpSerializeError
///     auto_unescape: Detect and unescape DB-exported strings (default: False)
///     strict: Fail on string length mismatches instead of recovering (default: True)
///
/// Returns:
///     The deserialized Python object (dict, list, str, int, float, bool, or None)
///
/// Raises:
///     PhpSerializeError: If the data cannot be parsed
///
/// Example:
///     >>> from php_serialize import loads
///     >>> loads(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}')
///     {'name': 'Alice', 'age': 30}
#[pyfunction]
#[pyo3(signature = (data, *, special_floats="tokens", auto_unescape=false, strict=true))]
fn loads(
    py: Python<'_>,
    data: &[u8],
    special_floats: &str,
    auto_unescape: bool,
    strict: bool,
) -> PyResult<PyObject> {
    let config = json_config(special_floats, auto_unescape, strict, false)?;

    let value = from_bytes_with_config(data, config.parser.clone()).map_err(to_py_err)?;
    let json = to_json(&value, &config).map_err(to_py_err)?;

    json_to_python(py, &json)
}

/// Deserialize PHP serialized data directly to a JSON string.
///
/// This avoids the overhead of creating intermediate Python objects.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     pretty: Pretty-print with two-space indentation (default: True)
///     special_floats, auto_unescape, strict: As for `loads`
///
/// Returns:
///     A JSON string representation of the deserialized data
///
/// Raises:
///     PhpSerializeError: If the data cannot be parsed
///
/// Example:
///     >>> from php_serialize import loads_json
///     >>> loads_json(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}', pretty=False)
///     '{"name":"Alice","age":30}'
#[pyfunction]
#[pyo3(signature = (data, *, pretty=true, special_floats="tokens", auto_unescape=false, strict=true))]
fn loads_json(
    data: &[u8],
    pretty: bool,
    special_floats: &str,
    auto_unescape: bool,
    strict: bool,
) -> PyResult<String> {
    let config = json_config(special_floats, auto_unescape, strict, pretty)?;
    php_to_json_with_config(data, &config).map_err(to_py_err)
}

/// Check if data looks like PHP serialized format.
///
/// This is a quick check that doesn't fully validate the data.
///
/// Example:
///     >>> from php_serialize import is_serialized
///     >>> is_serialized(b'a:1:{i:0;s:3:"foo";}')
///     True
///     >>> is_serialized(b'not serialized')
///     False
#[pyfunction]
fn is_serialized(data: &[u8]) -> bool {
    php_serialize_core::is_serialized(data)
}

/// Preprocess data to unescape DB-exported strings.
///
/// Example:
///     >>> from php_serialize import preprocess
///     >>> preprocess(b'"a:1:{s:3:""key"";s:5:""value"";}"')
///     b'a:1:{s:3:"key";s:5:"value";}'
#[pyfunction]
fn preprocess<'py>(py: Python<'py>, data: &[u8]) -> Bound<'py, PyBytes> {
    let result = php_serialize_core::preprocess(data);
    PyBytes::new_bound(py, &result)
}

/// Get the version of the library.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// PHP serialize module for Python.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("PhpSerializeError", m.py().get_type_bound::<PhpSerializeError>())?;
    m.add_function(wrap_pyfunction!(dumps, m)?)?;
    m.add_function(wrap_pyfunction!(loads, m)?)?;
    m.add_function(wrap_pyfunction!(loads_json, m)?)?;
    m.add_function(wrap_pyfunction!(is_serialized, m)?)?;
    m.add_function(wrap_pyfunction!(preprocess, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
