//! Log output for the command-line front end.
//!
//! Off unless `LIVA_LOG` or `RUST_LOG` is set. `LIVA_LOG_FORMAT` picks the
//! format:
//!
//! - `text` (default): plain lines from the `fmt` subscriber
//! - `json`: one JSON object per event
//!
//! ```bash
//! LIVA_LOG=debug liva-index --check
//! LIVA_LOG="liva_index::extractor=trace" LIVA_LOG_FORMAT=json liva-index
//! ```
//!
//! Everything goes to stderr; stdout carries only the YAML/JSON result.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("LIVA_LOG_FORMAT").unwrap_or_default())
    }
}

/// `LIVA_LOG` wins over `RUST_LOG`; both use `RUST_LOG` directive syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("LIVA_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

pub fn init_tracing() {
    let has_liva_log = std::env::var("LIVA_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_liva_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
