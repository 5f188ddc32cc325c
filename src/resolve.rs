//! Typed view of checked values.
//!
//! A `Resolve` type pairs a runtime descriptor with an extraction from a
//! `Value` that conforms to it. `assert_resolved` runs the check and hands
//! back the typed value, which is how a caller's view gets narrowed.
use crate::check::{self, Validator};
use crate::descriptor::{array_of, Descriptor};
use crate::error::{ErrorFactory, StandardErrors, ValidationError};
use crate::path::Path;
use crate::value::{Symbol, Value};

pub trait Resolve: Sized {
    fn descriptor() -> Descriptor;

    /// Extraction from a value that already passed `descriptor()`.
    fn resolve(value: &Value) -> Option<Self>;
}

pub fn assert_resolved<T: Resolve>(value: &Value) -> Result<T, ValidationError> {
    assert_resolved_with(&Validator::default(), value, &StandardErrors)
}

pub fn assert_resolved_with<T: Resolve, F: ErrorFactory>(
    validator: &Validator,
    value: &Value,
    errors: &F,
) -> Result<T, F::Error> {
    let descriptor = T::descriptor();
    validator.assert_type_with(value, &descriptor, errors)?;
    // a resolve impl that disagrees with its own descriptor is reported
    // against the whole value
    T::resolve(value).ok_or_else(|| errors.convert(check::invalid_type(&Path::root(), &descriptor, value)))
}

impl Resolve for bool {
    fn descriptor() -> Descriptor { Descriptor::BOOLEAN }
    fn resolve(value: &Value) -> Option<Self> { value.as_bool() }
}

impl Resolve for f64 {
    fn descriptor() -> Descriptor { Descriptor::NUMBER }
    fn resolve(value: &Value) -> Option<Self> { value.as_f64() }
}

impl Resolve for i128 {
    fn descriptor() -> Descriptor { Descriptor::BIGINT }

    fn resolve(value: &Value) -> Option<Self> {
        match value {
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }
}

impl Resolve for String {
    fn descriptor() -> Descriptor { Descriptor::STRING }
    fn resolve(value: &Value) -> Option<Self> { value.as_str().map(str::to_owned) }
}

impl Resolve for Symbol {
    fn descriptor() -> Descriptor { Descriptor::SYMBOL }

    fn resolve(value: &Value) -> Option<Self> {
        match value {
            Value::Symbol(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl<T: Resolve> Resolve for Vec<T> {
    fn descriptor() -> Descriptor {
        array_of(T::descriptor())
    }

    fn resolve(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::resolve).collect()
    }
}

/// `null`/`undefined` resolve to `None`.
impl<T: Resolve> Resolve for Option<T> {
    fn descriptor() -> Descriptor {
        crate::union![Descriptor::NULLISH, T::descriptor()]
    }

    fn resolve(value: &Value) -> Option<Self> {
        if value.is_nullish() { Some(None) } else { T::resolve(value).map(Some) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_nested_containers() {
        let v = Value::array([Value::from(1.5), Value::Null, Value::Undefined]);
        let got: Vec<Option<f64>> = assert_resolved(&v).unwrap();
        assert_eq!(got, vec![Some(1.5), None, None]);
    }

    #[test]
    fn rejection_carries_the_element_path() {
        let v = Value::array([Value::from("a"), Value::from(true)]);
        let err = assert_resolved::<Vec<String>>(&v).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value at [1], expected string, got boolean(true)");
    }

    #[test]
    fn option_descriptor_renders_as_union() {
        assert_eq!(<Option<i128>>::descriptor().to_string(), "nullish | bigint");
    }
}
