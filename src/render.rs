//! Human-readable rendering of received values.
//!
//! The "expected" side lives on `Descriptor`'s `Display`; this module covers
//! the "got" side of a diagnostic.
use crate::value::Value;

/// Arrays longer than this are not scanned for a common element kind.
const ARRAY_SCAN_LIMIT: usize = 1024;

pub fn received(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_owned(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("boolean({b})"),
        Value::Number(n) => format!("number({})", number(*n)),
        Value::BigInt(n) => format!("bigint({n}n)"),
        Value::String(s) => format!("string({})", json_quote(s)),
        Value::Symbol(sym) => format!("symbol({})", sym.description().unwrap_or("")),
        Value::Array(items) => array(items),
        Value::Object(_) => "object".to_owned(),
        Value::Function(_) => "function(...)".to_owned(),
    }
}

/// Numbers the way a JavaScript host prints them: no trailing `.0`,
/// `NaN`/`Infinity` spelled out, negative zero as `0`, and exponent form
/// (`1e+21`, `1e-7`) outside `1e-6 <= |n| < 1e21`.
pub fn number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        format!("{n}")
    }
}

fn array(items: &[Value]) -> String {
    let Some((first, rest)) = items.split_first() else {
        return "array<empty>".to_owned();
    };
    if items.len() > ARRAY_SCAN_LIMIT {
        return "array<...>".to_owned();
    }
    let kind = first.type_name();
    if rest.iter().all(|v| v.type_name() == kind) {
        format!("array<{kind}>")
    } else {
        "array<...>".to_owned()
    }
}

pub(crate) fn json_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}
