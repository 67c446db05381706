//! Infrastructure layer: file-backed persistence, configuration loading and
//! the system implementations of the controller's capabilities.

pub mod analytics;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod persistence;
pub mod print;

pub use analytics::LogAnalytics;
pub use clipboard::SystemClipboard;
pub use config::{ConfigError, ConfigLoader};
pub use export::{ExportError, ResultsExporter};
pub use persistence::*;
pub use print::HtmlPrintSink;
