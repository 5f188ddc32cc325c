//! Primitive guard registry: the base kinds a descriptor can name.
//!
//! `ALL`, `name()` and `test()` move in lock-step; the exhaustive match in
//! `test()` is what keeps a new kind from being silently accepted.
use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorError;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bigint,
    Boolean,
    Function,
    Number,
    Object,
    String,
    Symbol,
    Undefined,
    Null,
    Nullish,
}

impl Primitive {
    pub const ALL: [Primitive; 10] = [
        Primitive::Bigint,
        Primitive::Boolean,
        Primitive::Function,
        Primitive::Number,
        Primitive::Object,
        Primitive::String,
        Primitive::Symbol,
        Primitive::Undefined,
        Primitive::Null,
        Primitive::Nullish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bigint => "bigint",
            Primitive::Boolean => "boolean",
            Primitive::Function => "function",
            Primitive::Number => "number",
            Primitive::Object => "object",
            Primitive::String => "string",
            Primitive::Symbol => "symbol",
            Primitive::Undefined => "undefined",
            Primitive::Null => "null",
            Primitive::Nullish => "nullish",
        }
    }

    pub fn test(self, value: &Value) -> bool {
        match self {
            Primitive::Bigint => matches!(value, Value::BigInt(_)),
            Primitive::Boolean => matches!(value, Value::Bool(_)),
            Primitive::Function => matches!(value, Value::Function(_)),
            Primitive::Number => matches!(value, Value::Number(_)),
            // non-null, non-callable containers
            Primitive::Object => matches!(value, Value::Object(_) | Value::Array(_)),
            Primitive::String => matches!(value, Value::String(_)),
            Primitive::Symbol => matches!(value, Value::Symbol(_)),
            Primitive::Undefined => matches!(value, Value::Undefined),
            Primitive::Null => matches!(value, Value::Null),
            Primitive::Nullish => value.is_nullish(),
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl FromStr for Primitive {
    type Err = DescriptorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::lookup(name).ok_or_else(|| DescriptorError::UnknownPrimitive { name: name.to_owned() })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
