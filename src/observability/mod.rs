//! Tracing pipeline with local file export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK provider → JSON lines file
//! ```
//!
//! Spans go to `<data_dir>/country-explorer-trace.json`, rotated at 10 MB
//! with three backups. [`crate::initialize`] installs the pipeline only when
//! `Config::trace_level` is set; the filter then comes from that directive.
//!
//! - `init`: subscriber installation
//! - `tracer`: span exporter and provider
//! - `file_writer`: size-rotated line writer

mod file_writer;
mod init;
mod tracer;

pub use init::{init_tracing, DEFAULT_TRACE_LEVEL, TRACE_FILE_NAME};
