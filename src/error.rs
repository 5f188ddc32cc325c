//! Error taxonomy.
//!
//! Two designated kinds, `InvalidType` (a value is present but has the wrong
//! shape) and `MissingProperty` (a required key is absent), both carrying a
//! [`Report`]. Everything else a guard raises is a [`Fault`]: it is never
//! treated as a validation outcome and predicate mode lets it through.
//!
//! Callers swap the designated kinds for their own error type through
//! [`ErrorFactory`]; the report contract (path, expected, received) is kept.
use std::fmt;

use thiserror::Error;

use crate::path::Path;

/// Where and why a value was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub path: Path,
    pub expected: String,
    /// `None` when there was no value at all (missing property).
    pub received: Option<String>,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidType(Report),
    #[error("{0}")]
    MissingProperty(Report),
    #[error(transparent)]
    Fault(#[from] Fault),
}

/// Failures that are not validation outcomes.
#[derive(Debug, Error)]
pub enum Fault {
    /// A guard failed for a reason of its own. Passed through as-is.
    #[error(transparent)]
    Guard(anyhow::Error),
    #[error("validation nested deeper than {limit} levels at {}", Location(.path))]
    DepthExceeded { path: Path, limit: usize },
}

/// Malformed descriptor input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("unknown primitive kind `{name}`")]
    UnknownPrimitive { name: String },
    #[error("{combinator} needs at least one member descriptor")]
    EmptyCombinator { combinator: &'static str },
}

/// The injectable constructor pair.
///
/// `Error: From<Fault>` keeps faults flowing through uninterpreted whatever
/// the caller's error type is.
pub trait ErrorFactory {
    type Error: From<Fault>;

    fn invalid_type(&self, report: Report) -> Self::Error;
    fn missing_property(&self, report: Report) -> Self::Error;

    fn convert(&self, error: ValidationError) -> Self::Error {
        match error {
            ValidationError::InvalidType(report) => self.invalid_type(report),
            ValidationError::MissingProperty(report) => self.missing_property(report),
            ValidationError::Fault(fault) => fault.into(),
        }
    }
}

/// Default factory: the base taxonomy.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardErrors;

impl ErrorFactory for StandardErrors {
    type Error = ValidationError;

    fn invalid_type(&self, report: Report) -> ValidationError {
        ValidationError::InvalidType(report)
    }

    fn missing_property(&self, report: Report) -> ValidationError {
        ValidationError::MissingProperty(report)
    }
}

/// A pair of closures works as a factory: `(invalid_type, missing_property)`.
impl<E, T, M> ErrorFactory for (T, M)
where
    E: From<Fault>,
    T: Fn(Report) -> E,
    M: Fn(Report) -> E,
{
    type Error = E;

    fn invalid_type(&self, report: Report) -> E {
        (self.0)(report)
    }

    fn missing_property(&self, report: Report) -> E {
        (self.1)(report)
    }
}

// ------------------------------ Accessors -------------------------------- //

impl Report {
    pub fn path_string(&self) -> String {
        self.path.render()
    }

    /// Path as shown in messages (`<root>` for the empty path).
    pub fn location(&self) -> String {
        Location(&self.path).to_string()
    }

    pub fn is_missing(&self) -> bool {
        self.received.is_none()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.received {
            Some(received) => write!(
                f,
                "Invalid value at {}, expected {}, got {}",
                Location(&self.path),
                self.expected,
                received
            ),
            None => write!(f, "Missing property {}, expected {}", Location(&self.path), self.expected),
        }
    }
}

impl ValidationError {
    pub fn report(&self) -> Option<&Report> {
        match self {
            ValidationError::InvalidType(r) | ValidationError::MissingProperty(r) => Some(r),
            ValidationError::Fault(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ValidationError::Fault(Fault::DepthExceeded { path, .. }) => Some(path),
            _ => self.report().map(|r| &r.path),
        }
    }

    pub fn path_string(&self) -> Option<String> {
        self.path().map(Path::render)
    }

    /// True for the two kinds predicate mode turns into `false`.
    pub fn is_designated(&self) -> bool {
        !matches!(self, ValidationError::Fault(_))
    }
}

impl From<anyhow::Error> for ValidationError {
    fn from(error: anyhow::Error) -> Self {
        ValidationError::Fault(Fault::Guard(error))
    }
}

/// Path as shown inside messages.
pub(crate) struct Location<'a>(pub(crate) &'a Path);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_root() { f.write_str("<root>") } else { write!(f, "{}", self.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(received: Option<&str>) -> Report {
        Report {
            path: Path::root().child("a").child(3usize),
            expected: "number".into(),
            received: received.map(str::to_owned),
        }
    }

    #[test]
    fn messages_distinguish_missing_from_invalid() {
        assert_eq!(
            ValidationError::InvalidType(report(Some("string(\"x\")"))).to_string(),
            "Invalid value at a[3], expected number, got string(\"x\")"
        );
        assert_eq!(
            ValidationError::MissingProperty(report(None)).to_string(),
            "Missing property a[3], expected number"
        );
    }

    #[test]
    fn root_location_is_named() {
        let r = Report { path: Path::root(), expected: "object".into(), received: Some("null".into()) };
        assert_eq!(r.to_string(), "Invalid value at <root>, expected object, got null");
    }

    #[test]
    fn guard_faults_are_transparent() {
        let err = ValidationError::from(anyhow::anyhow!("disk on fire"));
        assert!(!err.is_designated());
        assert_eq!(err.to_string(), "disk on fire");
        assert!(err.path().is_none());
    }

    #[derive(Debug, PartialEq)]
    enum Mine {
        Wrong(String),
        Absent(String),
        Broken,
    }

    impl From<Fault> for Mine {
        fn from(_: Fault) -> Self {
            Mine::Broken
        }
    }

    #[test]
    fn closure_pair_substitutes_both_kinds() {
        let factory = (|r: Report| Mine::Wrong(r.path_string()), |r: Report| Mine::Absent(r.path_string()));
        assert_eq!(factory.convert(ValidationError::InvalidType(report(Some("null")))), Mine::Wrong("a[3]".into()));
        assert_eq!(factory.convert(ValidationError::MissingProperty(report(None))), Mine::Absent("a[3]".into()));
        let depth = Fault::DepthExceeded { path: Path::root(), limit: 1 };
        assert_eq!(factory.convert(depth.into()), Mine::Broken);
    }
}
