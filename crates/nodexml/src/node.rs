//! Input tree consumed by the serializer

use indexmap::map::{IntoIter, Iter, Keys};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;

/// A terminal value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    /// Missing value, rendered as empty text
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Text form used at every attachment point (text, attribute, CDATA, comment)
    pub fn coerce(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Float(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Returns the string if this is text, None otherwise
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce())
    }
}

/// A node of the input tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
    /// Ordered items repeated under their parent key
    List(Vec<Node>),
}

impl Default for Node {
    fn default() -> Self {
        Self::Mapping(Mapping::new())
    }
}

impl Node {
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the node's shape for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Mapping(_) => "mapping",
            Self::List(_) => "list",
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Integer(value))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Self::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Text(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::Text(value.to_owned()))
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(map: IndexMap<String, Node>) -> Self {
        Self::Mapping(Mapping(map))
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// An order-preserving mapping of keys to nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping(IndexMap<String, Node>);

impl Mapping {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Inserts a key-value pair, returning the previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Node> {
        self.0.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, Node> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a String, &'a Node);
    type IntoIter = Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<IndexMap<String, Node>> for Mapping {
    fn from(map: IndexMap<String, Node>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
