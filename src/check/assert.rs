use super::{invalid_type, is_property_holder, missing_property, predicate, Scope, Validator};
use crate::descriptor::Descriptor;
use crate::error::ValidationError;
use crate::path::Path;
use crate::value::Value;

/// Assert mode. `Ok(())` or the first failure found.
pub(crate) fn run(
    validator: &Validator,
    value: &Value,
    descriptor: &Descriptor,
    path: &Path,
    depth: usize,
) -> Result<(), ValidationError> {
    validator.enter(path, depth)?;
    match descriptor {
        Descriptor::Guard(g) => {
            let scope = Scope::new(validator, path, depth);
            // a guard's own errors already say precisely what went wrong
            if g.call(value, &scope)? {
                Ok(())
            } else {
                Err(invalid_type(path, descriptor, value))
            }
        }
        Descriptor::Primitive(p) => {
            if p.test(value) { Ok(()) } else { Err(invalid_type(path, descriptor, value)) }
        }
        Descriptor::Literal(symbol) => match value {
            Value::Symbol(s) if s == symbol => Ok(()),
            _ => Err(invalid_type(path, descriptor, value)),
        },
        Descriptor::ArrayOf(inner) => {
            let Value::Array(items) = value else {
                return Err(invalid_type(path, descriptor, value));
            };
            for (i, item) in items.iter().enumerate() {
                run(validator, item, inner, &path.child(i), depth + 1)?;
            }
            Ok(())
        }
        // Members are probed in predicate mode: one member's report says
        // nothing useful about the union as a whole.
        Descriptor::Union(members) => {
            for member in members {
                if predicate::run(validator, value, member, path, depth + 1)? {
                    return Ok(());
                }
            }
            Err(invalid_type(path, descriptor, value))
        }
        Descriptor::Intersection(members) => {
            for member in members {
                if !predicate::run(validator, value, member, path, depth + 1)? {
                    return Err(invalid_type(path, descriptor, value));
                }
            }
            Ok(())
        }
        Descriptor::Shape(shape) => {
            if !is_property_holder(value) {
                return Err(invalid_type(path, descriptor, value));
            }
            for (key, field) in shape.fields() {
                let at = path.child(key.clone());
                match value.get(key) {
                    Some(prop) => run(validator, prop, field, &at, depth + 1)?,
                    None => return Err(missing_property(at, field)),
                }
            }
            Ok(())
        }
    }
}
