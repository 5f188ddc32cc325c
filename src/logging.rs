//! Tracing setup for the CLI.
//!
//! Off unless `SHAPE_GUARD_LOG` (or `RUST_LOG`) is set. Output goes to
//! stderr so reports on stdout stay clean.
//!
//! ```bash
//! SHAPE_GUARD_LOG=shape_guard=trace shape-guard options -i config.json
//! SHAPE_GUARD_LOG=debug SHAPE_GUARD_LOG_FORMAT=json shape-guard options -i 'configs/*.json'
//! ```
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("SHAPE_GUARD_LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `SHAPE_GUARD_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    match std::env::var("SHAPE_GUARD_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

pub fn init_tracing() {
    if std::env::var_os("SHAPE_GUARD_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
