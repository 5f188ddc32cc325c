//! Fixture-driven conformance runner.
//!
//! Every `*.json` file under `fixtures/` (or the directories given on the
//! command line) holds a list of cases. Each case is validated in both modes,
//! the modes must agree, and the assert-mode outcome must match `expect`.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use colored::Colorize;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use shape_guard::options::{self, OptionsError, RenderOptions};
use shape_guard::{path_de, Descriptor, Shape, ValidationError, Validator, Value};

// ————————————————————————————————————————————————————————————————————————————
// FIXTURE FORMAT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    target: Target,
    document: serde_json::Value,
    #[serde(default)]
    max_depth: Option<usize>,
    expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Target {
    /// The render-options validator.
    Options {
        #[serde(default = "merge_by_default")]
        merge_defaults: bool,
    },
    /// A descriptor spelled out in the fixture.
    Descriptor { descriptor: DescriptorSpec },
}

/// `"string"` names a primitive; objects build the combinators.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptorSpec {
    Named(String),
    Compound(Compound),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Compound {
    ArrayOf(Box<DescriptorSpec>),
    Union(Vec<DescriptorSpec>),
    Intersection(Vec<DescriptorSpec>),
    Shape(IndexMap<String, DescriptorSpec>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum Expect {
    Ok,
    Invalid {
        path: String,
        #[serde(default)]
        message: Option<String>,
    },
    Missing {
        path: String,
        #[serde(default)]
        message: Option<String>,
    },
    /// Both modes must fail with the same non-validation error.
    Fault {
        #[serde(default)]
        message: Option<String>,
    },
}

/// What assert mode actually produced.
#[derive(Debug)]
enum Observed {
    Ok,
    Invalid { path: String, message: String },
    Missing { path: String, message: String },
    Fault(String),
}

fn merge_by_default() -> bool {
    true
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DescriptorSpec {
    fn build(&self) -> anyhow::Result<Descriptor> {
        Ok(match self {
            DescriptorSpec::Named(name) => Descriptor::named(name)?,
            DescriptorSpec::Compound(Compound::ArrayOf(inner)) => shape_guard::array_of(inner.build()?),
            DescriptorSpec::Compound(Compound::Union(members)) => {
                shape_guard::union(members.iter().map(DescriptorSpec::build).collect::<anyhow::Result<Vec<_>>>()?)?
            }
            DescriptorSpec::Compound(Compound::Intersection(members)) => shape_guard::intersection(
                members.iter().map(DescriptorSpec::build).collect::<anyhow::Result<Vec<_>>>()?,
            )?,
            DescriptorSpec::Compound(Compound::Shape(fields)) => {
                let mut shape = Shape::new();
                for (key, field) in fields {
                    shape = shape.field(key.as_str(), field.build()?);
                }
                shape.into()
            }
        })
    }
}

impl Observed {
    fn from_validation(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Observed::Ok,
            Err(ValidationError::InvalidType(report)) => {
                Observed::Invalid { path: report.path_string(), message: report.to_string() }
            }
            Err(ValidationError::MissingProperty(report)) => {
                Observed::Missing { path: report.path_string(), message: report.to_string() }
            }
            Err(ValidationError::Fault(fault)) => Observed::Fault(fault.to_string()),
        }
    }

    fn from_options(result: Result<RenderOptions, OptionsError>) -> Self {
        match result {
            Ok(_) => Observed::Ok,
            Err(error @ OptionsError::InvalidOption(_)) => Observed::Invalid {
                path: error.report().map(|r| r.path_string()).unwrap_or_default(),
                message: error.to_string(),
            },
            Err(error @ OptionsError::MissingOption(_)) => Observed::Missing {
                path: error.report().map(|r| r.path_string()).unwrap_or_default(),
                message: error.to_string(),
            },
            Err(OptionsError::Fault(fault)) => Observed::Fault(fault.to_string()),
        }
    }

    fn is_ok(&self) -> bool {
        matches!(self, Observed::Ok)
    }
}

impl Fixture {
    /// Returns the assert-mode outcome and the predicate-mode verdict.
    fn evaluate(&self) -> anyhow::Result<(Observed, Option<bool>)> {
        let validator = match self.max_depth {
            Some(limit) => Validator::new().with_max_depth(limit),
            None => Validator::new(),
        };
        let document = Value::from(self.document.clone());
        let (observed, predicate) = match &self.target {
            Target::Options { merge_defaults } => {
                let document = if *merge_defaults {
                    options::merge_over_defaults(&document, &RenderOptions::default())
                } else {
                    document
                };
                let observed = Observed::from_options(options::validate_complete(&validator, &document));
                (observed, validator.is_type(&document, options::descriptor()))
            }
            Target::Descriptor { descriptor } => {
                let descriptor = descriptor.build().context("building fixture descriptor")?;
                let observed = Observed::from_validation(validator.assert_type(&document, &descriptor));
                (observed, validator.is_type(&document, &descriptor))
            }
        };
        Ok((observed, predicate.ok()))
    }

    fn check(&self) -> anyhow::Result<()> {
        let (observed, predicate) = self.evaluate()?;
        match (&observed, predicate) {
            (Observed::Fault(_), None) => {}
            (Observed::Fault(message), Some(verdict)) => {
                bail!("assert mode faulted ({message}) but predicate mode answered {verdict}")
            }
            (_, None) => bail!("predicate mode faulted but assert mode produced {observed:?}"),
            (_, Some(verdict)) if verdict != observed.is_ok() => {
                bail!("modes disagree: predicate {verdict}, assert {observed:?}")
            }
            _ => {}
        }
        match (&self.expect, &observed) {
            (Expect::Ok, Observed::Ok) => Ok(()),
            (Expect::Invalid { path, message }, Observed::Invalid { path: got_path, message: got })
            | (Expect::Missing { path, message }, Observed::Missing { path: got_path, message: got }) => {
                if path != got_path {
                    bail!("expected path `{path}`, got `{got_path}` ({got})");
                }
                match_message(message.as_deref(), got)
            }
            (Expect::Fault { message }, Observed::Fault(got)) => match_message(message.as_deref(), got),
            (expect, observed) => bail!("expected {expect:?}, got {observed:?}"),
        }
    }
}

fn match_message(pattern: Option<&str>, got: &str) -> anyhow::Result<()> {
    let Some(pattern) = pattern else {
        return Ok(());
    };
    let re = Regex::new(pattern).with_context(|| format!("bad message pattern {pattern:?}"))?;
    if !re.is_match(got) {
        bail!("message {got:?} does not match /{pattern}/");
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// ENTRY
// ————————————————————————————————————————————————————————————————————————————

fn fixture_files(dirs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for dir in dirs {
        let entries = std::fs::read_dir(dir).with_context(|| format!("reading fixture dir {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

fn load(path: &Path) -> anyhow::Result<Vec<Fixture>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let fixtures = path_de::from_slice_with_path::<Vec<Fixture>>(&bytes)
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(fixtures)
}

fn run() -> anyhow::Result<bool> {
    let mut dirs = std::env::args().skip(1).map(PathBuf::from).collect::<Vec<_>>();
    if dirs.is_empty() {
        dirs.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"));
    }
    let mut passed = 0usize;
    let mut failed = 0usize;
    for file in fixture_files(&dirs)? {
        let label = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        for fixture in load(&file)? {
            match fixture.check() {
                Ok(()) => {
                    passed += 1;
                    println!("{} {label} :: {}", "✓".green(), fixture.name);
                }
                Err(error) => {
                    failed += 1;
                    println!("{} {label} :: {}: {error:#}", "✗".red(), fixture.name.bold());
                }
            }
        }
    }
    println!("{passed} passed, {failed} failed");
    Ok(failed == 0)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
