//! Render options: the engine's main consumer.
//!
//! A user document (usually JSON) is merged key-by-key over the defaults and
//! the result is checked against one shared descriptor. Failures surface as
//! [`OptionsError`], substituted in through [`ErrorFactory`], so callers can
//! tell a bad option apart from any other error.
use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{debug, warn};

use crate::check::Validator;
use crate::descriptor::{array_of, literal, Descriptor, Guard, Shape};
use crate::error::{ErrorFactory, Fault, Report};
use crate::path::Path;
use crate::render;
use crate::resolve::{self, Resolve};
use crate::value::{PropertyKey, Symbol, Value};

/// Sentinel for "invoke the renderer through `/usr/bin/env`".
pub static USE_ENV_BINARY: Lazy<Symbol> = Lazy::new(|| Symbol::new("USE_ENV_BINARY"));

/// Default binary on Windows.
pub const WIN32_DEFAULT_PATH: &str = "lilypond.exe";

pub const DEFAULT_VERSION: &str = "2.22";

static DESCRIPTOR: Lazy<Descriptor> = Lazy::new(build_descriptor);

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// How a rendered score is embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    ImgSvg,
    ImgPng,
    InlineSvg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Eps,
    Jpeg,
    Midi,
    Oga,
    Opus,
    Pdf,
    Png,
    Ps,
    Svg,
    Wav,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binary {
    UseEnv,
    Path(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub strategy: Strategy,
    pub binary: Binary,
    /// Written to `\version` when wrapping.
    pub version: String,
    pub formats: Vec<Format>,
    pub crop: bool,
    /// `None` lets the renderer pick its own resolution.
    pub dpi: Option<f64>,
    pub midi: bool,
    pub wrap: bool,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error(
        "invalid render option `{}`: expected {}, got {}",
        .0.location(),
        .0.expected,
        .0.received.as_deref().unwrap_or("nothing")
    )]
    InvalidOption(Report),
    #[error("missing render option `{}`: expected {}", .0.location(), .0.expected)]
    MissingOption(Report),
    #[error(transparent)]
    Fault(#[from] Fault),
}

/// Factory that swaps the base taxonomy for [`OptionsError`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionsErrors;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::ImgSvg, Strategy::ImgPng, Strategy::InlineSvg];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::ImgSvg => "img-svg",
            Strategy::ImgPng => "img-png",
            Strategy::InlineSvg => "inline-svg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|x| x.as_str() == s)
    }
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Eps,
        Format::Jpeg,
        Format::Midi,
        Format::Oga,
        Format::Opus,
        Format::Pdf,
        Format::Png,
        Format::Ps,
        Format::Svg,
        Format::Wav,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Eps => "eps",
            Format::Jpeg => "jpeg",
            Format::Midi => "midi",
            Format::Oga => "oga",
            Format::Opus => "opus",
            Format::Pdf => "pdf",
            Format::Png => "png",
            Format::Ps => "ps",
            Format::Svg => "svg",
            Format::Wav => "wav",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|x| x.as_str() == s)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        let binary = if cfg!(windows) { Binary::Path(WIN32_DEFAULT_PATH.to_owned()) } else { Binary::UseEnv };
        RenderOptions {
            strategy: Strategy::InlineSvg,
            binary,
            version: DEFAULT_VERSION.to_owned(),
            formats: vec![Format::Svg],
            crop: true,
            dpi: Some(72.0),
            midi: true,
            wrap: true,
        }
    }
}

impl RenderOptions {
    /// Object form, keys in descriptor order.
    pub fn to_value(&self) -> Value {
        let binary = match &self.binary {
            Binary::UseEnv => Value::Symbol(USE_ENV_BINARY.clone()),
            Binary::Path(p) => Value::from(p.as_str()),
        };
        Value::object([
            ("strategy", Value::from(self.strategy.as_str())),
            ("binary", binary),
            ("version", Value::from(self.version.as_str())),
            ("formats", Value::array(self.formats.iter().map(|f| f.as_str()))),
            ("crop", Value::from(self.crop)),
            ("dpi", Value::from(self.dpi)),
            ("midi", Value::from(self.midi)),
            ("wrap", Value::from(self.wrap)),
        ])
    }
}

impl Resolve for RenderOptions {
    fn descriptor() -> Descriptor {
        DESCRIPTOR.clone()
    }

    fn resolve(value: &Value) -> Option<Self> {
        let get = |key: &str| value.get(&PropertyKey::from(key));
        let binary = match get("binary")? {
            Value::Symbol(s) if *s == *USE_ENV_BINARY => Binary::UseEnv,
            other => Binary::Path(other.as_str()?.to_owned()),
        };
        let formats = get("formats")?
            .as_array()?
            .iter()
            .map(|f| f.as_str().and_then(Format::parse))
            .collect::<Option<Vec<_>>>()?;
        let dpi = match get("dpi")? {
            Value::Null => None,
            other => Some(other.as_f64()?),
        };
        Some(RenderOptions {
            strategy: Strategy::parse(get("strategy")?.as_str()?)?,
            binary,
            version: get("version")?.as_str()?.to_owned(),
            formats,
            crop: get("crop")?.as_bool()?,
            dpi,
            midi: get("midi")?.as_bool()?,
            wrap: get("wrap")?.as_bool()?,
        })
    }
}

impl ErrorFactory for OptionsErrors {
    type Error = OptionsError;

    fn invalid_type(&self, report: Report) -> OptionsError {
        OptionsError::InvalidOption(report)
    }

    fn missing_property(&self, report: Report) -> OptionsError {
        OptionsError::MissingOption(report)
    }
}

impl OptionsError {
    pub fn report(&self) -> Option<&Report> {
        match self {
            OptionsError::InvalidOption(r) | OptionsError::MissingOption(r) => Some(r),
            OptionsError::Fault(_) => None,
        }
    }
}

// ------------------------------ Descriptor ------------------------------- //

/// The shared render-options descriptor.
pub fn descriptor() -> &'static Descriptor {
    &DESCRIPTOR
}

fn build_descriptor() -> Descriptor {
    Shape::new()
        .field("strategy", strategy_guard())
        .field("binary", crate::union![Descriptor::STRING, literal(&USE_ENV_BINARY)])
        .field("version", Descriptor::STRING)
        .field("formats", formats_guard())
        .field("crop", Descriptor::BOOLEAN)
        .field("dpi", crate::union![Descriptor::NUMBER, Descriptor::NULL])
        .field("midi", Descriptor::BOOLEAN)
        .field("wrap", Descriptor::BOOLEAN)
        .into()
}

fn one_of(names: impl Iterator<Item = &'static str>) -> String {
    names.map(|n| format!("'{n}'")).collect::<Vec<_>>().join(" | ")
}

fn strategy_choices() -> String {
    one_of(Strategy::ALL.into_iter().map(Strategy::as_str))
}

fn format_choices() -> String {
    one_of(Format::ALL.into_iter().map(Format::as_str))
}

fn strategy_guard() -> Descriptor {
    let g = Guard::new(Some("strategy"), |value, scope| match value.as_str().and_then(Strategy::parse) {
        Some(_) => Ok(true),
        None => Err(scope.invalid_value(strategy_choices(), value)),
    });
    g.expecting(strategy_choices()).into()
}

fn format_guard() -> Descriptor {
    let g = Guard::new(Some("format"), |value, scope| match value.as_str().and_then(Format::parse) {
        Some(_) => Ok(true),
        None => Err(scope.invalid_value(format_choices(), value)),
    });
    g.expecting(format_choices()).into()
}

/// Every element a known format; svg only on its own; no ps/eps.
fn formats_guard() -> Descriptor {
    let element = array_of(format_guard());
    let g = Guard::new(Some("formats"), move |value, scope| {
        scope.check(value, &element)?;
        let formats: Vec<Format> = value
            .as_array()
            .unwrap_or_default()
            .iter()
            .filter_map(|f| f.as_str().and_then(Format::parse))
            .collect();
        if formats.contains(&Format::Svg) && formats.len() > 1 {
            return Err(scope.invalid_value("svg on its own (it cannot be generated alongside other formats)", value));
        }
        for unsupported in [Format::Ps, Format::Eps] {
            if formats.contains(&unsupported) {
                return Err(scope.invalid_value(format!("supported formats ({unsupported} is not supported)"), value));
            }
        }
        Ok(true)
    });
    g.expecting(format!("array<{}>", format_choices())).into()
}

// ------------------------------ Validation ------------------------------- //

/// `{ ...defaults, ...document }`. Non-object documents are returned as-is;
/// [`validate_complete`] rejects them at the root.
pub fn merge_over_defaults(document: &Value, defaults: &RenderOptions) -> Value {
    let Value::Object(overrides) = document else {
        return document.clone();
    };
    let Value::Object(mut merged) = defaults.to_value() else {
        return document.clone();
    };
    for (key, value) in overrides {
        if descriptor_shape().and_then(|s| s.get(key)).is_none() {
            warn!(key = %Path::root().child(key.clone()), "ignoring unknown render option");
        }
        merged.insert(key.clone(), value.clone());
    }
    debug!(overridden = overrides.len(), "merged render options over defaults");
    Value::Object(merged)
}

fn descriptor_shape() -> Option<&'static Shape> {
    match descriptor() {
        Descriptor::Shape(shape) => Some(shape),
        _ => None,
    }
}

/// Keys and rendered expectations of the options descriptor, in order.
pub fn describe() -> Vec<(String, String)> {
    let Some(shape) = descriptor_shape() else {
        return Vec::new();
    };
    shape
        .fields()
        .map(|(key, d)| (Path::root().child(key.clone()).render(), d.to_string()))
        .collect()
}

/// Merge `document` over the defaults and check the result.
pub fn validate(document: &Value) -> Result<RenderOptions, OptionsError> {
    validate_with(&Validator::default(), document)
}

pub fn validate_with(validator: &Validator, document: &Value) -> Result<RenderOptions, OptionsError> {
    let merged = merge_over_defaults(document, &RenderOptions::default());
    validate_complete(validator, &merged)
}

/// Check a document that must already spell out every option.
///
/// The document itself must be a plain object. Arrays and functions hold
/// properties too, but are never options documents.
pub fn validate_complete(validator: &Validator, document: &Value) -> Result<RenderOptions, OptionsError> {
    if !matches!(document, Value::Object(_)) {
        let received = Some(render::received(document));
        let report = Report { path: Path::root(), expected: "object".into(), received };
        return Err(OptionsErrors.invalid_type(report));
    }
    resolve::assert_resolved_with(validator, document, &OptionsErrors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(doc: serde_json::Value) -> Result<RenderOptions, OptionsError> {
        validate(&Value::from(doc))
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(check(json!({})).unwrap(), RenderOptions::default());
    }

    #[test]
    fn overrides_are_applied() {
        let opts = check(json!({ "strategy": "img-png", "formats": ["png", "pdf"], "dpi": null, "binary": "/opt/ly" })).unwrap();
        assert_eq!(opts.strategy, Strategy::ImgPng);
        assert_eq!(opts.formats, vec![Format::Png, Format::Pdf]);
        assert_eq!(opts.dpi, None);
        assert_eq!(opts.binary, Binary::Path("/opt/ly".into()));
    }

    #[test]
    fn bad_strategy_lists_the_choices() {
        let err = check(json!({ "strategy": "ascii" })).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidOption(_)));
        assert_eq!(
            err.to_string(),
            r#"invalid render option `strategy`: expected 'img-svg' | 'img-png' | 'inline-svg', got string("ascii")"#
        );
    }

    #[test]
    fn bad_format_element_is_located() {
        let err = check(json!({ "formats": ["png", "gif"] })).unwrap_err();
        assert_eq!(err.report().map(Report::path_string).as_deref(), Some("formats[1]"));
    }

    #[test]
    fn svg_cannot_be_mixed() {
        let err = check(json!({ "formats": ["svg", "png"] })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid render option `formats`: expected svg on its own (it cannot be generated alongside other formats), got array<string>"
        );
    }

    #[test]
    fn ps_and_eps_are_unsupported() {
        let err = check(json!({ "formats": ["pdf", "eps"] })).unwrap_err();
        assert!(err.to_string().contains("eps is not supported"), "{err}");
    }

    #[test]
    fn wrong_scalar_types() {
        let err = check(json!({ "dpi": "high" })).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid render option `dpi`: expected number | null, got string("high")"#);
        let err = check(json!({ "crop": 1 })).unwrap_err();
        assert_eq!(err.report().map(Report::path_string).as_deref(), Some("crop"));
    }

    #[test]
    fn non_object_document_is_rejected_at_root() {
        let err = check(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "invalid render option `<root>`: expected object, got array<number>");
    }

    #[test]
    fn complete_documents_report_missing_options() {
        let doc = Value::from(json!({ "strategy": "img-svg", "binary": "ly" }));
        let err = validate_complete(&Validator::default(), &doc).unwrap_err();
        assert!(matches!(err, OptionsError::MissingOption(_)));
        assert_eq!(err.to_string(), "missing render option `version`: expected string");
    }

    #[test]
    fn describe_lists_every_option() {
        let described = describe();
        assert_eq!(described.len(), 8);
        assert_eq!(described[1], ("binary".to_owned(), "string | symbol(USE_ENV_BINARY)".to_owned()));
        assert_eq!(described[0], ("strategy".to_owned(), "'img-svg' | 'img-png' | 'inline-svg'".to_owned()));
        assert_eq!(
            described[3],
            (
                "formats".to_owned(),
                "array<'eps' | 'jpeg' | 'midi' | 'oga' | 'opus' | 'pdf' | 'png' | 'ps' | 'svg' | 'wav'>".to_owned()
            )
        );
    }

    #[test]
    fn missing_guarded_option_names_its_choices() {
        let err = validate_complete(&Validator::default(), &Value::from(json!({}))).unwrap_err();
        assert!(matches!(err, OptionsError::MissingOption(_)));
        assert_eq!(err.to_string(), "missing render option `strategy`: expected 'img-svg' | 'img-png' | 'inline-svg'");
    }

    #[test]
    fn non_object_complete_document_is_rejected_at_root() {
        let err = validate_complete(&Validator::default(), &Value::from(json!(["img-svg"]))).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidOption(_)));
        assert_eq!(err.report().map(Report::path_string).as_deref(), Some(""));
        let err = check(json!("inline-svg")).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid render option `<root>`: expected object, got string("inline-svg")"#);
    }

    #[test]
    fn integers_beyond_float_precision_are_accepted_as_dpi() {
        let doc: serde_json::Value = serde_json::from_str(r#"{ "dpi": 9007199254740993 }"#).unwrap();
        assert_eq!(check(doc).unwrap().dpi, Some(9007199254740992.0));
    }
}
