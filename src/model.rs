//! Data model for bean selection, attribute values and per-tick records.

use std::collections::BTreeMap;
use std::fmt;

/// Token that selects every attribute of a bean.
pub const WILDCARD: &str = "*";

/// Which attributes of a bean to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every attribute listed in the bean's metadata.
    Wildcard,
    /// Literal attribute names, in input order. Duplicates are allowed.
    Names(Vec<String>),
}

impl Selector {
    /// Builds a selector from raw tokens.
    ///
    /// Tokens are trimmed and empty ones dropped. Any `*` token turns the whole
    /// selector into a wildcard. Returns `None` when nothing is left.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let names: Vec<String> = tokens
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            None
        } else if names.iter().any(|n| n == WILDCARD) {
            Some(Selector::Wildcard)
        } else {
            Some(Selector::Names(names))
        }
    }

    /// Parses a comma-separated attribute list such as `HeapMemoryUsage,ObjectPendingFinalizationCount`.
    pub fn parse_csv(csv: &str) -> Option<Self> {
        Self::from_tokens(csv.split(','))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Selector::Wildcard)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Wildcard => f.write_str(WILDCARD),
            Selector::Names(names) => f.write_str(&names.join(",")),
        }
    }
}

/// A bean identifier together with the attributes requested from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub bean: String,
    pub selector: Selector,
}

impl AttributeSpec {
    pub fn new(bean: impl Into<String>, selector: Selector) -> Self {
        Self {
            bean: bean.into(),
            selector,
        }
    }
}

impl fmt::Display for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.bean, self.selector)
    }
}

/// One configured (bean, selector) pair from the beans file.
pub type MonitorGroup = AttributeSpec;

/// Metadata for a single attribute as reported by the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub readable: bool,
    pub bean: String,
}

impl AttributeDescriptor {
    pub fn new(bean: impl Into<String>, name: impl Into<String>, readable: bool) -> Self {
        Self {
            name: name.into(),
            readable,
            bean: bean.into(),
        }
    }
}

/// A single leaf value read from the target.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Attribute exists but currently has no value.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

/// Raw attribute value as delivered by a [`crate::target::TargetConnection`].
///
/// The variant is chosen by the transport adapter, so the rest of the crate
/// never inspects value types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(ScalarValue),
    /// Composite value with named fields (e.g. `MemoryUsage`).
    Structured(BTreeMap<String, ScalarValue>),
}

impl AttributeValue {
    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        AttributeValue::Scalar(v.into())
    }

    /// Builds a structured value from `(field, value)` pairs.
    pub fn structured<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ScalarValue>,
    {
        AttributeValue::Structured(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<ScalarValue> for AttributeValue {
    fn from(v: ScalarValue) -> Self {
        AttributeValue::Scalar(v)
    }
}

/// One sample: composite keys mapped to values, kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: BTreeMap<String, ScalarValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry. An existing value under the same key is replaced.
    pub fn insert(&mut self, key: String, value: ScalarValue) {
        self.entries.insert(key, value);
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (String, ScalarValue)>) {
        self.entries.extend(pairs);
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values in key order.
    pub fn values(&self) -> impl Iterator<Item = &ScalarValue> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_csv() {
        assert_eq!(
            Selector::parse_csv("Used, Max"),
            Some(Selector::Names(vec!["Used".into(), "Max".into()]))
        );
        assert_eq!(Selector::parse_csv("*"), Some(Selector::Wildcard));
    }

    #[test]
    fn test_selector_wildcard_anywhere_wins() {
        assert_eq!(Selector::parse_csv("Used,*"), Some(Selector::Wildcard));
    }

    #[test]
    fn test_selector_keeps_duplicates_and_order() {
        let sel = Selector::parse_csv("b,a,b").unwrap();
        assert_eq!(sel, Selector::Names(vec!["b".into(), "a".into(), "b".into()]));
    }

    #[test]
    fn test_selector_empty_is_rejected() {
        assert_eq!(Selector::parse_csv(""), None);
        assert_eq!(Selector::parse_csv(" , ,"), None);
    }

    #[test]
    fn test_attribute_spec_display() {
        let spec = AttributeSpec::new(
            "java.lang:type=Memory",
            Selector::parse_csv("HeapMemoryUsage,Verbose").unwrap(),
        );
        assert_eq!(spec.to_string(), "java.lang:type=Memory#HeapMemoryUsage,Verbose");
    }

    #[test]
    fn test_record_sorted_and_last_write_wins() {
        let mut record = Record::new();
        record.insert("b#x".into(), ScalarValue::Integer(1));
        record.insert("a#y".into(), ScalarValue::Integer(2));
        record.insert("b#x".into(), ScalarValue::Integer(3));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["a#y", "b#x"]);
        assert_eq!(record.get("b#x"), Some(&ScalarValue::Integer(3)));
        assert_eq!(record.len(), 2);
    }
}
