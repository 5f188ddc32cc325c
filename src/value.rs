//! Dynamic input model.
//!
//! The engine never mutates or coerces a `Value`; it only reads it. The model
//! is wide enough to carry everything a loosely-typed host can hand over:
//! `undefined` next to `null`, big integers, identity-compared symbols, and
//! callables that double as property bags.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

/// Property bag with insertion order preserved (rendering and shape checks
/// both follow declaration order).
pub type Object = IndexMap<PropertyKey, Value>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
}

/// A property access step: string key, array index, or symbol key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Index(usize),
    Symbol(Symbol),
}

/// Unique sentinel. Two symbols are equal only if they are the same instance,
/// regardless of description.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

struct SymbolData {
    description: Option<String>,
}

pub type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Callable value. Functions are objects too, so they carry properties.
#[derive(Clone)]
pub struct Function {
    name: Option<String>,
    call: Arc<NativeFn>,
    properties: Object,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Kind name as the primitive registry spells it (`array` for sequences).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Property lookup. Presence is independent of the stored value, so a key
    /// mapped to `Undefined` is still found.
    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        match self {
            Value::Object(map) => lookup(map, key),
            Value::Function(f) => lookup(&f.properties, key),
            Value::Array(items) => key.as_index().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub fn has(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

fn lookup<'a>(map: &'a Object, key: &PropertyKey) -> Option<&'a Value> {
    if let Some(found) = map.get(key) {
        return Some(found);
    }
    // "0" and 0 name the same property
    match key {
        PropertyKey::Index(i) => map.get(&PropertyKey::String(i.to_string())),
        PropertyKey::String(_) => key.as_index().and_then(|i| map.get(&PropertyKey::Index(i))),
        PropertyKey::Symbol(_) => None,
    }
}

impl PropertyKey {
    /// Index view of the key: numeric keys, and strings in canonical index
    /// form (`"0"`, `"17"`, but not `"017"` or `"+1"`).
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::String(s) => {
                let canonical = s == "0"
                    || (!s.is_empty() && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()));
                if canonical { s.parse().ok() } else { None }
            }
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Symbol(Arc::new(SymbolData { description: Some(description.into()) }))
    }

    pub fn anonymous() -> Self {
        Symbol(Arc::new(SymbolData { description: None }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

impl Function {
    pub fn new<F>(name: Option<&str>, call: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Function {
            name: name.map(str::to_owned),
            call: Arc::new(call),
            properties: Object::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn properties(&self) -> &Object {
        &self.properties
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.call)(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call) && self.properties == other.properties
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

// ------------------------------ Conversions ------------------------------ //

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self { PropertyKey::String(s.to_owned()) }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self { PropertyKey::String(s) }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self { PropertyKey::Index(i) }
}

impl From<Symbol> for PropertyKey {
    fn from(s: Symbol) -> Self { PropertyKey::Symbol(s) }
}

impl From<&Symbol> for PropertyKey {
    fn from(s: &Symbol) -> Self { PropertyKey::Symbol(s.clone()) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n.into()) }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self { Value::BigInt(n) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self { Value::Symbol(s) }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self { Value::Function(f) }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self { Value::Array(items) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

/// JSON documents map onto the model one-to-one. Every JSON number is a
/// `Number`, large integers included (rounded the way a float rounds them);
/// `BigInt` only comes from values built in code.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            J::String(s) => Value::String(s),
            J::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            J::Object(m) => Value::Object(
                m.into_iter()
                    .map(|(k, v)| (PropertyKey::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn symbols_compare_by_identity() {
        let a = Symbol::new("tag");
        let b = Symbol::new("tag");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "Symbol(tag)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }

    #[test]
    fn index_and_numeric_string_keys_alias() {
        let obj = Value::object([("0", Value::from(1)), ("x", Value::Undefined)]);
        assert!(obj.has(&PropertyKey::Index(0)));
        assert!(obj.has(&"x".into()), "undefined-valued keys are still present");
        assert!(!obj.has(&"00".into()));

        let arr = Value::array([10, 20]);
        assert_eq!(arr.get(&"1".into()), Some(&Value::Number(20.0)));
        assert_eq!(arr.get(&PropertyKey::Index(2)), None);
    }

    #[test]
    fn function_properties_are_visible() {
        let f = Function::new(Some("render"), |_| Value::Null).with_property("version", "2.24");
        let v = Value::from(f);
        assert_eq!(v.get(&"version".into()).and_then(Value::as_str), Some("2.24"));
        assert_eq!(v.type_name(), "function");
    }

    #[test]
    fn json_conversion_keeps_order_and_never_yields_bigints() {
        let v = Value::from(json!({ "b": 1, "a": [true, null], "big": 9007199254740993u64 }));
        let Value::Object(map) = &v else { panic!("expected object") };
        let keys: Vec<PropertyKey> = map.keys().cloned().collect();
        assert_eq!(keys, vec![PropertyKey::from("b"), PropertyKey::from("a"), PropertyKey::from("big")]);
        assert_eq!(map[&PropertyKey::from("b")], Value::Number(1.0));
        assert_eq!(map[&PropertyKey::from("big")], Value::Number(9007199254740992.0));
    }
}
