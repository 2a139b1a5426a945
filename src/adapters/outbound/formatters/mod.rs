/// Formatter adapters for BOM output
mod json_formatter;

pub use json_formatter::JsonFormatter;
