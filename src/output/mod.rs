//! Console output: formatters and the snapshot printer.

mod formatter;
mod json;
mod printer;
mod text;

pub use formatter::MetricsFormatter;
pub use json::JsonFormatter;
pub use printer::SnapshotPrinter;
pub use text::TextFormatter;
