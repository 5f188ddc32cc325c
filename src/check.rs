//! Evaluator: walks a value against a descriptor.
//!
//! Two modes share one case analysis:
//! - assert mode (`assert_type`) returns the first failure, with its path;
//! - predicate mode (`is_type`) answers yes/no without building reports.
//!
//! For every `(value, descriptor)`, `is_type` is `Ok(true)` exactly when
//! `assert_type` is `Ok(())`. Faults (guard errors outside the designated
//! kinds, depth overruns) escape both modes unchanged.
//!
//! Evaluation is fail-fast: the first failing key or element ends the call.
mod assert;
mod predicate;

use tracing::trace;

use crate::descriptor::Descriptor;
use crate::error::{ErrorFactory, Fault, Report, StandardErrors, ValidationError};
use crate::path::Path;
use crate::render;
use crate::value::{PropertyKey, Value};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Evaluator configuration. Holds no per-call state, so one validator can be
/// shared freely.
#[derive(Clone, Copy, Debug)]
pub struct Validator {
    max_depth: usize,
}

/// What a guard sees of the evaluation it runs in: its location, helpers
/// to build designated errors there, and re-entry into the evaluator.
pub struct Scope<'a> {
    validator: &'a Validator,
    path: &'a Path,
    depth: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for Validator {
    fn default() -> Self {
        Validator { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn assert_type(&self, value: &Value, descriptor: &Descriptor) -> Result<(), ValidationError> {
        self.assert_type_with(value, descriptor, &StandardErrors)
    }

    /// Assert mode with the designated kinds built by `errors`.
    pub fn assert_type_with<F: ErrorFactory>(
        &self,
        value: &Value,
        descriptor: &Descriptor,
        errors: &F,
    ) -> Result<(), F::Error> {
        assert::run(self, value, descriptor, &Path::root(), 0).map_err(|e| errors.convert(e))
    }

    pub fn is_type(&self, value: &Value, descriptor: &Descriptor) -> Result<bool, Fault> {
        predicate::run(self, value, descriptor, &Path::root(), 0)
    }

    fn enter(&self, path: &Path, depth: usize) -> Result<(), Fault> {
        if depth > self.max_depth {
            return Err(Fault::DepthExceeded { path: path.clone(), limit: self.max_depth });
        }
        Ok(())
    }
}

pub fn assert_type(value: &Value, descriptor: &Descriptor) -> Result<(), ValidationError> {
    Validator::default().assert_type(value, descriptor)
}

pub fn assert_type_with<F: ErrorFactory>(value: &Value, descriptor: &Descriptor, errors: &F) -> Result<(), F::Error> {
    Validator::default().assert_type_with(value, descriptor, errors)
}

pub fn is_type(value: &Value, descriptor: &Descriptor) -> Result<bool, Fault> {
    Validator::default().is_type(value, descriptor)
}

impl<'a> Scope<'a> {
    fn new(validator: &'a Validator, path: &'a Path, depth: usize) -> Self {
        Scope { validator, path, depth }
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    pub fn invalid_type(&self, expected: &Descriptor, value: &Value) -> ValidationError {
        invalid_type(self.path, expected, value)
    }

    /// Like `invalid_type`, with a free-form expectation.
    pub fn invalid_value(&self, expected: impl Into<String>, value: &Value) -> ValidationError {
        ValidationError::InvalidType(Report {
            path: self.path.clone(),
            expected: expected.into(),
            received: Some(render::received(value)),
        })
    }

    pub fn missing_property(&self, key: impl Into<PropertyKey>, expected: &Descriptor) -> ValidationError {
        missing_property(self.path.child(key), expected)
    }

    /// Assert `value` against `descriptor` at this scope's path.
    pub fn check(&self, value: &Value, descriptor: &Descriptor) -> Result<(), ValidationError> {
        assert::run(self.validator, value, descriptor, self.path, self.depth + 1)
    }

    /// Assert a sub-value one key below this scope's path.
    pub fn check_at(
        &self,
        key: impl Into<PropertyKey>,
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<(), ValidationError> {
        assert::run(self.validator, value, descriptor, &self.path.child(key), self.depth + 1)
    }

    pub fn matches(&self, value: &Value, descriptor: &Descriptor) -> Result<bool, Fault> {
        predicate::run(self.validator, value, descriptor, self.path, self.depth + 1)
    }
}

// ---------------------------- Shared helpers ----------------------------- //

/// Objects, arrays and functions can hold properties.
fn is_property_holder(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Function(_))
}

pub(crate) fn invalid_type(path: &Path, expected: &Descriptor, value: &Value) -> ValidationError {
    let report = Report {
        path: path.clone(),
        expected: expected.to_string(),
        received: Some(render::received(value)),
    };
    trace!(path = %report.path, expected = %report.expected, "invalid type");
    ValidationError::InvalidType(report)
}

pub(crate) fn missing_property(path: Path, expected: &Descriptor) -> ValidationError {
    let report = Report { path, expected: expected.to_string(), received: None };
    trace!(path = %report.path, expected = %report.expected, "missing property");
    ValidationError::MissingProperty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{array_of, guard, literal, Shape};
    use crate::value::Symbol;
    use pretty_assertions::assert_eq;

    fn message(value: &Value, d: &Descriptor) -> String {
        assert_type(value, d).unwrap_err().to_string()
    }

    #[test]
    fn missing_and_wrong_type_are_distinct() {
        let d = Descriptor::shape([("x", Descriptor::NUMBER)]);

        let err = assert_type(&Value::object(Vec::<(&str, Value)>::new()), &d).unwrap_err();
        assert!(matches!(err, ValidationError::MissingProperty(_)));
        assert_eq!(err.path_string().as_deref(), Some("x"));
        assert_eq!(err.to_string(), "Missing property x, expected number");

        let err = assert_type(&Value::object([("x", Value::from("nope"))]), &d).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType(_)));
        assert_eq!(err.to_string(), r#"Invalid value at x, expected number, got string("nope")"#);
    }

    #[test]
    fn undefined_valued_key_is_present() {
        let d = Descriptor::shape([("x", Descriptor::UNDEFINED)]);
        assert!(assert_type(&Value::object([("x", Value::Undefined)]), &d).is_ok());
        assert!(!is_type(&Value::object(Vec::<(&str, Value)>::new()), &d).unwrap());
    }

    #[test]
    fn nested_paths_render_dotted() {
        let d = Descriptor::shape([("a", Descriptor::shape([("b", Descriptor::NUMBER)]))]);
        let v = Value::object([("a", Value::object([("b", Value::from("oops"))]))]);
        let err = assert_type(&v, &d).unwrap_err();
        assert_eq!(err.path_string().as_deref(), Some("a.b"));
    }

    #[test]
    fn arrays_fail_at_the_first_bad_index() {
        let err = assert_type(&Value::array([Value::from(1), Value::from(2), Value::from("x")]), &array_of(Descriptor::NUMBER))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Invalid value at [2], expected number, got string("x")"#);
        assert_eq!(message(&Value::from(3), &array_of(Descriptor::NUMBER)), "Invalid value at <root>, expected array<number>, got number(3)");
    }

    #[test]
    fn union_reports_the_whole_union() {
        let d = crate::union![Descriptor::STRING, Descriptor::NUMBER];
        assert!(is_type(&Value::from(42), &d).unwrap());
        assert!(!is_type(&Value::from(true), &d).unwrap());
        assert_eq!(message(&Value::array([true, false]), &d), "Invalid value at <root>, expected string | number, got array<boolean>");
    }

    #[test]
    fn intersection_reports_the_whole_intersection() {
        let positive = guard("positive", |v, _| Ok(v.as_f64().is_some_and(|n| n > 0.0)));
        let d = crate::intersection![Descriptor::NUMBER, positive];
        assert!(assert_type(&Value::from(3), &d).is_ok());
        assert_eq!(message(&Value::from(-3), &d), "Invalid value at <root>, expected number & guard(positive), got number(-3)");
    }

    #[test]
    fn shapes_check_keys_in_declared_order() {
        let d = Descriptor::Shape(Shape::new().field("b", Descriptor::STRING).field("a", Descriptor::STRING));
        let err = assert_type(&Value::object(Vec::<(&str, Value)>::new()), &d).unwrap_err();
        assert_eq!(err.path_string().as_deref(), Some("b"));
    }

    #[test]
    fn shapes_accept_functions_and_reject_scalars() {
        let f = crate::value::Function::new(Some("f"), |_| Value::Null).with_property("length", 2);
        let d = Descriptor::shape([("length", Descriptor::NUMBER)]);
        assert!(assert_type(&Value::from(f), &d).is_ok());
        assert_eq!(message(&Value::Null, &d), "Invalid value at <root>, expected object, got null");
        // an empty shape still demands something that can hold properties
        assert!(!is_type(&Value::from(1), &Descriptor::shape(Vec::<(&str, Descriptor)>::new())).unwrap());
    }

    #[test]
    fn symbol_keys_render_in_paths() {
        let key = Symbol::new("meta");
        let d = Descriptor::shape([(key.clone(), Descriptor::STRING)]);
        let v = Value::object([(key, Value::from(1))]);
        assert_eq!(message(&v, &d), "Invalid value at [Symbol(meta)], expected string, got number(1)");
    }

    #[test]
    fn literal_matches_identity_only() {
        let sentinel = Symbol::new("USE_ENV");
        let lookalike = Symbol::new("USE_ENV");
        let d = literal(&sentinel);
        assert!(is_type(&Value::from(sentinel.clone()), &d).unwrap());
        assert!(!is_type(&Value::from(lookalike.clone()), &d).unwrap());
        assert_eq!(message(&Value::from(lookalike), &d), "Invalid value at <root>, expected symbol(USE_ENV), got symbol(USE_ENV)");
    }

    #[test]
    fn guard_false_names_the_guard() {
        let d = guard("even", |v, _| Ok(v.as_f64().is_some_and(|n| n % 2.0 == 0.0)));
        assert_eq!(message(&Value::from(3), &d), "Invalid value at <root>, expected guard(even), got number(3)");
    }

    #[test]
    fn guard_errors_pass_through_unchanged() {
        let d = Descriptor::shape([(
            "port",
            guard("port", |v, scope| match v.as_f64() {
                Some(n) if (1.0..=65535.0).contains(&n) => Ok(true),
                _ => Err(scope.invalid_value("a port number", v)),
            }),
        )]);
        let v = Value::object([("port", Value::from(0))]);
        assert_eq!(message(&v, &d), "Invalid value at port, expected a port number, got number(0)");
        assert!(!is_type(&v, &d).unwrap());
    }

    #[test]
    fn guards_can_recurse_into_the_engine() {
        // at least one element, all strings
        let d = Descriptor::shape([(
            "tags",
            guard("tags", |v, scope| {
                scope.check(v, &array_of(Descriptor::STRING))?;
                Ok(v.as_array().is_some_and(|xs| !xs.is_empty()))
            }),
        )]);
        let bad = Value::object([("tags", Value::array([Value::from("a"), Value::from(1)]))]);
        assert_eq!(message(&bad, &d), "Invalid value at tags[1], expected string, got number(1)");
        let empty = Value::object([("tags", Value::array(Vec::<Value>::new()))]);
        assert_eq!(message(&empty, &d), "Invalid value at tags, expected guard(tags), got array<empty>");
    }

    #[test]
    fn undesignated_guard_errors_escape_predicate_mode() {
        let d = crate::union![
            guard("explodes", |_, _| Err(anyhow::anyhow!("backend unavailable").into())),
            Descriptor::NUMBER
        ];
        let fault = is_type(&Value::from(1), &d).unwrap_err();
        assert_eq!(fault.to_string(), "backend unavailable");
        let err = assert_type(&Value::from(1), &d).unwrap_err();
        assert!(!err.is_designated());
    }

    #[test]
    fn depth_limit_is_a_fault_in_both_modes() {
        let mut d = Descriptor::NUMBER;
        let mut v = Value::from(1);
        for _ in 0..10 {
            d = array_of(d);
            v = Value::array([v]);
        }
        let shallow = Validator::new().with_max_depth(4);
        assert!(matches!(shallow.is_type(&v, &d), Err(Fault::DepthExceeded { limit: 4, .. })));
        let err = shallow.assert_type(&v, &d).unwrap_err();
        assert_eq!(err.path_string().as_deref(), Some("[0][0][0][0][0]"));
        assert!(Validator::new().assert_type(&v, &d).is_ok());
    }

    #[test]
    fn failures_are_idempotent() {
        let d = Descriptor::shape([("a", array_of(crate::union![Descriptor::NUMBER, Descriptor::NULL]))]);
        let v = Value::object([("a", Value::array([Value::Null, Value::from("x")]))]);
        assert_eq!(message(&v, &d), message(&v, &d));
    }
}
