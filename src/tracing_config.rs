//! Tracing configuration for debugging resolution.
//!
//! Three output formats are selected by `FDR_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: hierarchical indented output via `tracing-tree`, which shows
//!   how one class resolution nests inside another
//! - `json`: one JSON object per span or event
//!
//! ## Quick start
//!
//! ```bash
//! # Follow class resolution as a tree
//! FDR_LOG=debug FDR_LOG_FORMAT=tree cargo test --test class_resolution_tests
//!
//! # Cache transitions only
//! FDR_LOG="fdr_resolver::cache=trace" cargo test
//!
//! # JSON for tooling
//! FDR_LOG=debug FDR_LOG_FORMAT=json cargo bench
//! ```
//!
//! Nothing is installed unless `FDR_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name; anything unknown is `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("FDR_LOG_FORMAT").unwrap_or_default())
    }
}

/// `FDR_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("FDR_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber. Output goes to stderr.
///
/// Does nothing when neither `FDR_LOG` nor `RUST_LOG` is set. Safe to call
/// more than once; later calls are ignored.
pub fn init_tracing() {
    let has_fdr_log = std::env::var("FDR_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_fdr_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    // try_init: test binaries call this from every test.
    let _ = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}
