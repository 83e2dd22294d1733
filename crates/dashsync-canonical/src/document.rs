use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Insertion-ordered mapping used at every nesting level of a [`Document`].
///
/// Equality ignores key order; iteration keeps the order in which the server
/// (or the operator's file) produced the keys.
pub type Mapping = IndexMap<String, Document>;

/// Structurally comparable document tree.
///
/// Every remote object and every desired-state file is held in this form.
/// Sequences compare element by element in order; mappings compare by key
/// set and value equality.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar, kept in its JSON representation.
    Number(Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<Document>),
    /// Mapping with string keys.
    Mapping(Mapping),
}

impl Document {
    /// Creates an empty mapping document.
    pub fn mapping() -> Self {
        Document::Mapping(Mapping::new())
    }

    /// Returns the mapping if this document is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the mapping mutably if this document is one.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the sequence if this document is one.
    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the sequence mutably if this document is one.
    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Document>> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string value if this document is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key when this document is a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Inserts a key into a mapping document, returning the previous value.
    ///
    /// Non-mapping documents are left untouched and `None` is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Document>) -> Option<Document> {
        self.as_mapping_mut()
            .and_then(|map| map.insert(key.into(), value.into()))
    }

    /// Removes a key from a mapping document, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Document> {
        self.as_mapping_mut().and_then(|map| map.shift_remove(key))
    }

    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "sequence",
            Document::Mapping(_) => "mapping",
        }
    }

    /// Converts into a `serde_json::Value`, keeping mapping key order.
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Number(n) => Value::Number(n.clone()),
            Document::String(s) => Value::String(s.clone()),
            Document::Sequence(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Document::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Document::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Document> for Value {
    fn from(document: &Document) -> Self {
        document.to_json()
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.to_json()
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Number(value.into())
    }
}

impl From<Vec<Document>> for Document {
    fn from(items: Vec<Document>) -> Self {
        Document::Sequence(items)
    }
}

impl From<Mapping> for Document {
    fn from(map: Mapping) -> Self {
        Document::Mapping(map)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => n.serialize(serializer),
            Document::String(s) => serializer.serialize_str(s),
            Document::Sequence(items) => items.serialize(serializer),
            Document::Mapping(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from)
    }
}
