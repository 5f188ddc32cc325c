//! Access paths and their rendering.
//!
//! A path grows by appending one key per descent and is rendered the way a
//! reader would write the access expression: `a.b`, `items[2]`,
//! `headers["content-type"]`, `[Symbol(tag)]`.
use std::fmt::{self, Write as _};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::render::json_quote;
use crate::value::PropertyKey;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z$_][a-zA-Z0-9$_]*$").unwrap());

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PropertyKey>);

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    /// New path one key deeper. `self` is left untouched.
    pub fn child(&self, key: impl Into<PropertyKey>) -> Path {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key.into());
        Path(keys)
    }

    pub fn keys(&self) -> &[PropertyKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendered location; the root renders as the empty string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for key in &self.0 {
            write_segment(&mut out, key);
        }
        match out.strip_prefix('.') {
            Some(rest) => rest.to_owned(),
            None => out,
        }
    }
}

fn write_segment(out: &mut String, key: &PropertyKey) {
    // writing into a String cannot fail
    let _ = match key {
        PropertyKey::String(s) if IDENTIFIER.is_match(s) => write!(out, ".{s}"),
        PropertyKey::String(s) => write!(out, "[{}]", json_quote(s)),
        PropertyKey::Index(i) => write!(out, "[{i}]"),
        PropertyKey::Symbol(sym) => write!(out, "[{sym}]"),
    };
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Vec<PropertyKey>> for Path {
    fn from(keys: Vec<PropertyKey>) -> Self {
        Path(keys)
    }
}

impl FromIterator<PropertyKey> for Path {
    fn from_iter<I: IntoIterator<Item = PropertyKey>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}
