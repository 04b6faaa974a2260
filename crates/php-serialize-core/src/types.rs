//! PHP value types.
//!
//! [`PhpValue`] is a closed model of everything the engine reads and writes.
//! Shared and cyclic structure is expressed with [`PhpValue::Reference`], an
//! index into the pre-order list of composites of the same tree (see
//! [`RefTable`]), rather than through object identity.

use std::borrow::Cow;
use std::fmt;

use bstr::ByteSlice;

/// Key under which a tagged object's class name travels in JSON.
pub const CLASS_KEY: &str = "__class";

/// A PHP value that can be serialized or deserialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhpValue<'a> {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// PHP float/double value, including `INF`, `-INF` and `NAN`.
    Float(f64),

    /// PHP string value (may contain non-UTF8 bytes).
    /// Uses Cow for zero-copy when possible.
    String(Cow<'a, [u8]>),

    /// Array whose keys are exactly `0..n-1` in order.
    List(Vec<PhpValue<'a>>),

    /// Any other array: ordered entries with explicit keys.
    Map(Vec<(ArrayKey<'a>, PhpValue<'a>)>),

    /// PHP object value.
    Object {
        /// The class name of the object.
        class_name: Cow<'a, str>,
        /// Object properties in declaration order.
        properties: Vec<(ArrayKey<'a>, PhpValue<'a>)>,
    },

    /// Back-reference to the composite with this 1-based pre-order id.
    Reference(usize),
}

/// A PHP array key or property name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey<'a> {
    /// Integer key.
    Int(i64),
    /// String key.
    String(Cow<'a, [u8]>),
}

impl<'a> ArrayKey<'a> {
    /// Get the key as a UTF-8 string, if it is a valid UTF-8 string key.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArrayKey::String(s) => std::str::from_utf8(s).ok(),
            ArrayKey::Int(_) => None,
        }
    }

    /// Render the key as text, rendering integer keys in decimal.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            ArrayKey::Int(i) => Cow::Owned(i.to_string()),
            ArrayKey::String(s) => s.to_str_lossy(),
        }
    }

    /// Convert to an owned key that doesn't borrow from the input.
    pub fn into_owned(self) -> ArrayKey<'static> {
        match self {
            ArrayKey::Int(i) => ArrayKey::Int(i),
            ArrayKey::String(s) => ArrayKey::String(Cow::Owned(s.into_owned())),
        }
    }

    fn matches_str(&self, name: &str) -> bool {
        matches!(self, ArrayKey::String(s) if s.as_ref() == name.as_bytes())
    }
}

impl From<i64> for ArrayKey<'_> {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

impl<'a> From<&'a str> for ArrayKey<'a> {
    fn from(s: &'a str) -> Self {
        ArrayKey::String(Cow::Borrowed(s.as_bytes()))
    }
}

impl From<String> for ArrayKey<'_> {
    fn from(s: String) -> Self {
        ArrayKey::String(Cow::Owned(s.into_bytes()))
    }
}

impl fmt::Display for ArrayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::String(s) => write!(f, "\"{}\"", s.as_bstr()),
        }
    }
}

impl<'a> PhpValue<'a> {
    /// Build an array value from decoded entries.
    ///
    /// Collapses to [`PhpValue::List`] when the keys are exactly the integers
    /// `0..n-1` in order, otherwise keeps the entries as a [`PhpValue::Map`].
    pub fn from_entries(entries: Vec<(ArrayKey<'a>, PhpValue<'a>)>) -> Self {
        let sequential = entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| matches!(k, ArrayKey::Int(idx) if usize::try_from(*idx) == Ok(i)));

        if sequential {
            PhpValue::List(entries.into_iter().map(|(_, v)| v).collect())
        } else {
            PhpValue::Map(entries)
        }
    }

    /// Create a string value from text.
    pub fn string(s: impl Into<String>) -> PhpValue<'static> {
        PhpValue::String(Cow::Owned(s.into().into_bytes()))
    }

    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, PhpValue::Bool(_))
    }

    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, PhpValue::Int(_))
    }

    /// Check if the value is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, PhpValue::Float(_))
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PhpValue::String(_))
    }

    /// Check if the value is a PHP array (list or map).
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, PhpValue::List(_) | PhpValue::Map(_))
    }

    /// Check if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, PhpValue::Object { .. })
    }

    /// Check if the value is a back-reference.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, PhpValue::Reference(_))
    }

    /// Whether the value is a composite that receives a reference id.
    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            PhpValue::List(_) | PhpValue::Map(_) | PhpValue::Object { .. }
        )
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PhpValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get the value as a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => std::str::from_utf8(s.as_ref()).ok(),
            _ => None,
        }
    }

    /// Get the elements of a list.
    #[inline]
    pub fn as_list(&self) -> Option<&[PhpValue<'a>]> {
        match self {
            PhpValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get the entries of a map or the properties of an object.
    #[inline]
    pub fn as_entries(&self) -> Option<&[(ArrayKey<'a>, PhpValue<'a>)]> {
        match self {
            PhpValue::Map(entries) => Some(entries.as_slice()),
            PhpValue::Object { properties, .. } => Some(properties.as_slice()),
            _ => None,
        }
    }

    /// Get the class name of an object.
    #[inline]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            PhpValue::Object { class_name, .. } => Some(class_name.as_ref()),
            _ => None,
        }
    }

    /// Look up a string key in a map, or a property of an object.
    pub fn get(&self, key: &str) -> Option<&PhpValue<'a>> {
        self.as_entries()?
            .iter()
            .find(|(k, _)| k.matches_str(key))
            .map(|(_, v)| v)
    }

    /// Get an element of a list by position.
    pub fn get_index(&self, index: usize) -> Option<&PhpValue<'a>> {
        self.as_list()?.get(index)
    }

    /// Convert to an owned value that doesn't borrow from the input.
    pub fn into_owned(self) -> PhpValue<'static> {
        match self {
            PhpValue::Null => PhpValue::Null,
            PhpValue::Bool(b) => PhpValue::Bool(b),
            PhpValue::Int(i) => PhpValue::Int(i),
            PhpValue::Float(f) => PhpValue::Float(f),
            PhpValue::String(s) => PhpValue::String(Cow::Owned(s.into_owned())),
            PhpValue::List(items) => {
                PhpValue::List(items.into_iter().map(PhpValue::into_owned).collect())
            }
            PhpValue::Map(entries) => PhpValue::Map(owned_entries(entries)),
            PhpValue::Object {
                class_name,
                properties,
            } => PhpValue::Object {
                class_name: Cow::Owned(class_name.into_owned()),
                properties: owned_entries(properties),
            },
            PhpValue::Reference(r) => PhpValue::Reference(r),
        }
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "float",
            PhpValue::String(_) => "string",
            PhpValue::List(_) => "list",
            PhpValue::Map(_) => "map",
            PhpValue::Object { .. } => "object",
            PhpValue::Reference(_) => "reference",
        }
    }
}

fn owned_entries(entries: Vec<(ArrayKey<'_>, PhpValue<'_>)>) -> Vec<(ArrayKey<'static>, PhpValue<'static>)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

impl From<bool> for PhpValue<'_> {
    fn from(b: bool) -> Self {
        PhpValue::Bool(b)
    }
}

impl From<i64> for PhpValue<'_> {
    fn from(i: i64) -> Self {
        PhpValue::Int(i)
    }
}

impl From<f64> for PhpValue<'_> {
    fn from(f: f64) -> Self {
        PhpValue::Float(f)
    }
}

impl<'a> From<&'a str> for PhpValue<'a> {
    fn from(s: &'a str) -> Self {
        PhpValue::String(Cow::Borrowed(s.as_bytes()))
    }
}

impl From<String> for PhpValue<'_> {
    fn from(s: String) -> Self {
        PhpValue::String(Cow::Owned(s.into_bytes()))
    }
}

impl fmt::Display for PhpValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpValue::Null => write!(f, "null"),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Float(fl) => write!(f, "{}", fl),
            PhpValue::String(s) => match std::str::from_utf8(s) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", s.len()),
            },
            PhpValue::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            PhpValue::Map(entries) => {
                write!(f, "[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "]")
            }
            PhpValue::Object { class_name, .. } => write!(f, "{}{{...}}", class_name),
            PhpValue::Reference(idx) => write!(f, "&{}", idx),
        }
    }
}

/// The composites of a value tree, indexed by reference id.
///
/// Ids are assigned in pre-order: a composite is numbered before its children,
/// and children are visited in entry order. This is the same order in which
/// the serializer and parser count composites, so `get(k)` resolves
/// `PhpValue::Reference(k)`.
#[derive(Debug, Clone)]
pub struct RefTable<'v, 'a> {
    composites: Vec<&'v PhpValue<'a>>,
}

impl<'v, 'a> RefTable<'v, 'a> {
    /// Collect the composites of `root`.
    pub fn build(root: &'v PhpValue<'a>) -> Self {
        let mut composites = Vec::new();
        // Explicit stack; children pushed in reverse to keep pre-order.
        let mut stack = vec![root];
        while let Some(value) = stack.pop() {
            match value {
                PhpValue::List(items) => {
                    composites.push(value);
                    stack.extend(items.iter().rev());
                }
                PhpValue::Map(entries) | PhpValue::Object { properties: entries, .. } => {
                    composites.push(value);
                    stack.extend(entries.iter().rev().map(|(_, v)| v));
                }
                _ => {}
            }
        }
        Self { composites }
    }

    /// Resolve a 1-based reference id.
    #[inline]
    pub fn get(&self, id: usize) -> Option<&'v PhpValue<'a>> {
        id.checked_sub(1).and_then(|i| self.composites.get(i).copied())
    }

    /// Number of composites in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.composites.len()
    }

    /// Whether the tree has no composites.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }
}
