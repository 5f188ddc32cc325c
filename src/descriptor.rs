//! Descriptor grammar. No `Value`s here, only descriptions of them.
//!
//! Descriptors are immutable once built and cheap to clone (guards are
//! shared behind an `Arc`), so one instance can be checked against any number
//! of values from any number of threads.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::check::Scope;
use crate::error::{DescriptorError, ValidationError};
use crate::primitive::Primitive;
use crate::value::{PropertyKey, Symbol, Value};

/// Signature of a custom guard. `Ok(false)` is a plain rejection; returning
/// a designated error reports it precisely; anything else is a fault.
pub type GuardFn = dyn Fn(&Value, &Scope<'_>) -> Result<bool, ValidationError> + Send + Sync;

#[derive(Clone, Debug)]
pub enum Descriptor {
    Primitive(Primitive),
    /// Matches one exact symbol instance.
    Literal(Symbol),
    Guard(Guard),
    ArrayOf(Box<Descriptor>),
    Shape(Shape),
    /// Tagged explicitly; never inferred from sequence length.
    Union(Vec<Descriptor>),
    Intersection(Vec<Descriptor>),
}

#[derive(Clone)]
pub struct Guard {
    name: Option<String>,
    /// Rendered in place of `guard(name)` when set.
    expected: Option<String>,
    check: Arc<GuardFn>,
}

/// Key → descriptor mapping, checked in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    fields: IndexMap<PropertyKey, Descriptor>,
}

// ------------------------------- Builders -------------------------------- //

impl Descriptor {
    pub const BIGINT: Descriptor = Descriptor::Primitive(Primitive::Bigint);
    pub const BOOLEAN: Descriptor = Descriptor::Primitive(Primitive::Boolean);
    pub const FUNCTION: Descriptor = Descriptor::Primitive(Primitive::Function);
    pub const NUMBER: Descriptor = Descriptor::Primitive(Primitive::Number);
    pub const OBJECT: Descriptor = Descriptor::Primitive(Primitive::Object);
    pub const STRING: Descriptor = Descriptor::Primitive(Primitive::String);
    pub const SYMBOL: Descriptor = Descriptor::Primitive(Primitive::Symbol);
    pub const UNDEFINED: Descriptor = Descriptor::Primitive(Primitive::Undefined);
    pub const NULL: Descriptor = Descriptor::Primitive(Primitive::Null);
    pub const NULLISH: Descriptor = Descriptor::Primitive(Primitive::Nullish);

    /// Primitive by registry name; unknown names are an error, not a pass.
    pub fn named(name: &str) -> Result<Self, DescriptorError> {
        name.parse().map(Descriptor::Primitive)
    }

    pub fn shape<K, D, I>(fields: I) -> Self
    where
        K: Into<PropertyKey>,
        D: Into<Descriptor>,
        I: IntoIterator<Item = (K, D)>,
    {
        Descriptor::Shape(fields.into_iter().collect())
    }
}

pub fn union<I>(members: I) -> Result<Descriptor, DescriptorError>
where
    I: IntoIterator,
    I::Item: Into<Descriptor>,
{
    let members: Vec<Descriptor> = members.into_iter().map(Into::into).collect();
    if members.is_empty() {
        return Err(DescriptorError::EmptyCombinator { combinator: "union" });
    }
    Ok(Descriptor::Union(members))
}

pub fn intersection<I>(members: I) -> Result<Descriptor, DescriptorError>
where
    I: IntoIterator,
    I::Item: Into<Descriptor>,
{
    let members: Vec<Descriptor> = members.into_iter().map(Into::into).collect();
    if members.is_empty() {
        return Err(DescriptorError::EmptyCombinator { combinator: "intersection" });
    }
    Ok(Descriptor::Intersection(members))
}

pub fn array_of(inner: impl Into<Descriptor>) -> Descriptor {
    Descriptor::ArrayOf(Box::new(inner.into()))
}

pub fn literal(symbol: &Symbol) -> Descriptor {
    Descriptor::Literal(symbol.clone())
}

pub fn guard<F>(name: &str, check: F) -> Descriptor
where
    F: Fn(&Value, &Scope<'_>) -> Result<bool, ValidationError> + Send + Sync + 'static,
{
    Descriptor::Guard(Guard::new(Some(name), check))
}

/// `union![a, b, ...]`: a union of at least one member, no `Result` needed.
#[macro_export]
macro_rules! union {
    ($($member:expr),+ $(,)?) => {
        $crate::descriptor::Descriptor::Union(vec![$($crate::descriptor::Descriptor::from($member)),+])
    };
}

/// `intersection![a, b, ...]`: see [`union!`].
#[macro_export]
macro_rules! intersection {
    ($($member:expr),+ $(,)?) => {
        $crate::descriptor::Descriptor::Intersection(vec![$($crate::descriptor::Descriptor::from($member)),+])
    };
}

impl Guard {
    pub fn new<F>(name: Option<&str>, check: F) -> Self
    where
        F: Fn(&Value, &Scope<'_>) -> Result<bool, ValidationError> + Send + Sync + 'static,
    {
        Guard { name: name.map(str::to_owned), expected: None, check: Arc::new(check) }
    }

    /// Text shown as this guard's expectation, e.g. `'a' | 'b'`.
    pub fn expecting(mut self, text: impl Into<String>) -> Self {
        self.expected = Some(text.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub(crate) fn call(&self, value: &Value, scope: &Scope<'_>) -> Result<bool, ValidationError> {
        (self.check)(value, scope)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn field(mut self, key: impl Into<PropertyKey>, descriptor: impl Into<Descriptor>) -> Self {
        self.fields.insert(key.into(), descriptor.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&PropertyKey, &Descriptor)> {
        self.fields.iter()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&Descriptor> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<PropertyKey>, D: Into<Descriptor>> FromIterator<(K, D)> for Shape {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Shape { fields: iter.into_iter().map(|(k, d)| (k.into(), d.into())).collect() }
    }
}

impl From<Primitive> for Descriptor {
    fn from(p: Primitive) -> Self { Descriptor::Primitive(p) }
}

impl From<Symbol> for Descriptor {
    fn from(s: Symbol) -> Self { Descriptor::Literal(s) }
}

impl From<&Symbol> for Descriptor {
    fn from(s: &Symbol) -> Self { Descriptor::Literal(s.clone()) }
}

impl From<Guard> for Descriptor {
    fn from(g: Guard) -> Self { Descriptor::Guard(g) }
}

impl From<Shape> for Descriptor {
    fn from(s: Shape) -> Self { Descriptor::Shape(s) }
}

impl From<&Descriptor> for Descriptor {
    fn from(d: &Descriptor) -> Self { d.clone() }
}

// ------------------------------- Rendering ------------------------------- //

/// The "expected" half of a diagnostic.
impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Primitive(p) => write!(f, "{p}"),
            Descriptor::Literal(sym) => write!(f, "symbol({})", sym.description().unwrap_or("")),
            Descriptor::Guard(g) => match (g.expected(), g.name()) {
                (Some(text), _) => f.write_str(text),
                (None, Some(name)) => write!(f, "guard({name})"),
                (None, None) => f.write_str("guard"),
            },
            Descriptor::ArrayOf(inner) => write!(f, "array<{inner}>"),
            Descriptor::Shape(_) => f.write_str("object"),
            Descriptor::Union(members) => join(f, members, " | "),
            Descriptor::Intersection(members) => join(f, members, " & "),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, members: &[Descriptor], sep: &str) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{member}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_expectations() {
        let tag = Symbol::new("tag");
        assert_eq!(crate::union![Descriptor::STRING, Descriptor::NUMBER].to_string(), "string | number");
        assert_eq!(crate::intersection![Descriptor::OBJECT, Descriptor::FUNCTION].to_string(), "object & function");
        assert_eq!(array_of(crate::union![Descriptor::NULL, &tag]).to_string(), "array<null | symbol(tag)>");
        assert_eq!(guard("even", |_, _| Ok(true)).to_string(), "guard(even)");
        assert_eq!(Descriptor::Guard(Guard::new(None, |_, _| Ok(true))).to_string(), "guard");
        let level = Guard::new(Some("level"), |_, _| Ok(true)).expecting("'debug' | 'info'");
        assert_eq!(level.name(), Some("level"));
        assert_eq!(Descriptor::from(level).to_string(), "'debug' | 'info'");
        assert_eq!(Descriptor::shape([("x", Descriptor::NUMBER)]).to_string(), "object");
    }

    #[test]
    fn single_member_union_stays_a_union() {
        let d = union([Descriptor::NUMBER]).unwrap();
        assert!(matches!(d, Descriptor::Union(ref m) if m.len() == 1));
        assert!(!matches!(d, Descriptor::ArrayOf(_)));
    }

    #[test]
    fn combinators_refuse_empty_member_lists() {
        assert_eq!(
            union(Vec::<Descriptor>::new()).unwrap_err(),
            DescriptorError::EmptyCombinator { combinator: "union" }
        );
        assert!(intersection(Vec::<Descriptor>::new()).is_err());
    }

    #[test]
    fn named_uses_the_registry() {
        assert!(matches!(Descriptor::named("nullish"), Ok(Descriptor::Primitive(Primitive::Nullish))));
        assert!(Descriptor::named("integer").is_err());
    }

    #[test]
    fn shape_keeps_declaration_order() {
        let shape = Shape::new().field("z", Descriptor::NUMBER).field("a", Descriptor::STRING);
        let keys: Vec<_> = shape.fields().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![PropertyKey::from("z"), PropertyKey::from("a")]);
    }
}
