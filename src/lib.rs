//! Runtime shape validation for untyped values.
//!
//! Describe the shape a value must have with a [`Descriptor`], then either
//! assert it ([`assert_type`], precise path on failure) or ask about it
//! ([`is_type`], a plain yes/no).
//!
//! ```
//! use shape_guard::{assert_type, is_type, Descriptor, Value};
//!
//! let point = Descriptor::shape([("x", Descriptor::NUMBER), ("y", Descriptor::NUMBER)]);
//! let v = Value::object([("x", Value::from(1)), ("y", Value::from("2"))]);
//!
//! assert!(!is_type(&v, &point).unwrap());
//! let err = assert_type(&v, &point).unwrap_err();
//! assert_eq!(err.to_string(), r#"Invalid value at y, expected number, got string("2")"#);
//! ```
pub mod check;
pub mod descriptor;
pub mod error;
pub mod options;
pub mod path;
pub mod path_de;
pub mod primitive;
pub mod render;
pub mod resolve;
pub mod value;

pub use check::{assert_type, assert_type_with, is_type, Scope, Validator, DEFAULT_MAX_DEPTH};
pub use descriptor::{array_of, guard, intersection, literal, union, Descriptor, Guard, Shape};
pub use error::{DescriptorError, ErrorFactory, Fault, Report, StandardErrors, ValidationError};
pub use path::Path;
pub use primitive::Primitive;
pub use resolve::{assert_resolved, assert_resolved_with, Resolve};
pub use value::{Function, Object, PropertyKey, Symbol, Value};
