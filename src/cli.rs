//! CLI: check render-options documents, or describe what they may contain.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use shape_guard::options::{self, OptionsError, RenderOptions};
use shape_guard::path_de;
use shape_guard::{Validator, Value, DEFAULT_MAX_DEPTH};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate render-options documents against the shared options descriptor
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// merge each document over the defaults and validate it
    Options(OptionsCheck),
    /// print every option key with the shape it expects
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /render/options)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct OptionsCheck {
    #[command(flatten)]
    input_settings: InputSettings,

    /// deepest nesting the validator descends into
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// output style
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    /// output style
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// Result for one input file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct OptionEntry {
    key: String,
    expected: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn source_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")
    }

    /// `Ok(None)` when the pointer selects nothing.
    fn load(&self, source_path: &Path) -> anyhow::Result<Option<Value>> {
        let bytes = std::fs::read(source_path)
            .with_context(|| format!("failed to read source file {}", source_path.display()))?;
        let value = path_de::read_value(&bytes, self.json_pointer.as_deref())
            .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))?;
        Ok(value)
    }
}

impl FileReport {
    fn passed(file: String) -> Self {
        FileReport { file, ok: true, kind: None, path: None, expected: None, received: None, message: None }
    }

    fn failed(file: String, kind: &'static str, message: String) -> Self {
        FileReport { file, ok: false, kind: Some(kind), path: None, expected: None, received: None, message: Some(message) }
    }

    fn rejected(file: String, error: &OptionsError) -> Self {
        let kind = match error {
            OptionsError::InvalidOption(_) => "invalid",
            OptionsError::MissingOption(_) => "missing",
            OptionsError::Fault(_) => "fault",
        };
        let mut out = FileReport::failed(file, kind, error.to_string());
        if let Some(report) = error.report() {
            out.path = Some(report.path_string());
            out.expected = Some(report.expected.clone());
            out.received = report.received.clone();
        }
        out
    }

    fn text_line(&self) -> String {
        match (self.ok, &self.message) {
            (true, _) => format!("{} {}", "✓".green(), self.file),
            (false, Some(message)) => format!("{} {}: {}", "✗".red(), self.file.bold(), message),
            (false, None) => format!("{} {}", "✗".red(), self.file.bold()),
        }
    }
}

impl OptionsCheck {
    fn check_file(&self, validator: &Validator, source_path: &Path) -> FileReport {
        let file = source_path.to_string_lossy().to_string();
        let document = match self.input_settings.load(source_path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                let pointer = self.input_settings.json_pointer.as_deref().unwrap_or_default();
                return FileReport::failed(file, "pointer", format!("JSON pointer {pointer} selects nothing"));
            }
            Err(error) => return FileReport::failed(file, "load", format!("{error:#}")),
        };
        match options::validate_with(validator, &document) {
            Ok(resolved) => {
                debug!(file = %file, options = ?resolved, "render options accepted");
                FileReport::passed(file)
            }
            Err(error) => FileReport::rejected(file, &error),
        }
    }

    fn run(&self) -> anyhow::Result<bool> {
        let source_paths = self.input_settings.source_paths()?;
        let validator = Validator::new().with_max_depth(self.max_depth);
        let reports = source_paths
            .par_iter()
            .map(|source_path| self.check_file(&validator, source_path))
            .collect::<Vec<_>>();
        let all_ok = reports.iter().all(|r| r.ok);
        let rendered = match self.report {
            ReportFormat::Json => serde_json::to_string_pretty(&reports)?,
            ReportFormat::Text => reports.iter().map(FileReport::text_line).collect::<Vec<_>>().join("\n"),
        };
        emit(self.out.as_deref(), &rendered)?;
        Ok(all_ok)
    }
}

impl DescribeOut {
    fn run(&self) -> anyhow::Result<bool> {
        let entries = options::describe()
            .into_iter()
            .map(|(key, expected)| OptionEntry { key, expected })
            .collect::<Vec<_>>();
        let rendered = match self.report {
            ReportFormat::Json => serde_json::to_string_pretty(&entries)?,
            ReportFormat::Text => {
                let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
                let defaults = RenderOptions::default().to_value();
                entries
                    .iter()
                    .map(|e| {
                        let default = defaults
                            .get(&e.key.as_str().into())
                            .map(shape_guard::render::received)
                            .unwrap_or_default();
                        let key = format!("{:width$}", e.key);
                        format!("{}  {}  {}", key.bold(), e.expected, format!("(default {default})").dimmed())
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };
        emit(None, &rendered)?;
        Ok(true)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<bool> {
        match &self.cmd {
            Command::Options(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true)
                }
                target.run()
            }
            Command::Describe(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true)
                }
                target.run()
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn emit(out: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through() {
        let got = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(got, vec![PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let err = resolve_file_path_patterns(["/definitely/not/here/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn rejected_report_carries_the_location() {
        let document = Value::from(serde_json::json!({ "crop": "yes" }));
        let error = options::validate(&document).unwrap_err();
        let report = FileReport::rejected("a.json".into(), &error);
        assert!(!report.ok);
        assert_eq!(report.kind, Some("invalid"));
        assert_eq!(report.path.as_deref(), Some("crop"));
        assert_eq!(report.expected.as_deref(), Some("boolean"));
        assert_eq!(report.received.as_deref(), Some(r#"string("yes")"#));
    }

    #[test]
    fn cli_parses_options_flags() {
        let cli = CommandLineInterface::try_parse_from([
            "shape-guard", "options", "-i", "a.json", "b.json", "--max-depth", "8", "--report", "json",
        ])
        .unwrap();
        let Command::Options(target) = cli.cmd else { panic!("expected options") };
        assert_eq!(target.input_settings.input, vec!["a.json", "b.json"]);
        assert_eq!(target.max_depth, 8);
        assert_eq!(target.report, ReportFormat::Json);
    }
}
