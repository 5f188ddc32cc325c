use super::{is_property_holder, Scope, Validator};
use crate::descriptor::Descriptor;
use crate::error::{Fault, ValidationError};
use crate::path::Path;
use crate::value::Value;

/// Predicate mode. Same case analysis as `assert::run`, answering with a
/// bool; only faults come back as `Err`.
pub(crate) fn run(
    validator: &Validator,
    value: &Value,
    descriptor: &Descriptor,
    path: &Path,
    depth: usize,
) -> Result<bool, Fault> {
    validator.enter(path, depth)?;
    let ok = match descriptor {
        Descriptor::Guard(g) => {
            let scope = Scope::new(validator, path, depth);
            match g.call(value, &scope) {
                Ok(ok) => ok,
                Err(ValidationError::Fault(fault)) => return Err(fault),
                Err(ValidationError::InvalidType(_) | ValidationError::MissingProperty(_)) => false,
            }
        }
        Descriptor::Primitive(p) => p.test(value),
        Descriptor::Literal(symbol) => matches!(value, Value::Symbol(s) if s == symbol),
        Descriptor::ArrayOf(inner) => match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !run(validator, item, inner, &path.child(i), depth + 1)? {
                        return Ok(false);
                    }
                }
                true
            }
            _ => false,
        },
        Descriptor::Union(members) => {
            for member in members {
                if run(validator, value, member, path, depth + 1)? {
                    return Ok(true);
                }
            }
            false
        }
        Descriptor::Intersection(members) => {
            for member in members {
                if !run(validator, value, member, path, depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
        Descriptor::Shape(shape) => {
            if !is_property_holder(value) {
                return Ok(false);
            }
            for (key, field) in shape.fields() {
                let Some(prop) = value.get(key) else { return Ok(false) };
                if !run(validator, prop, field, &path.child(key.clone()), depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
    };
    Ok(ok)
}
