//! Printing of command results

use serde::Serialize;

/// How results are written to stdout
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON
    #[default]
    Pretty,
    /// One JSON document per line
    Json,
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
        OutputFormat::Json => serde_json::to_string(value),
    }
}

/// Print a lookup result. A missing resource is reported, not treated as a failure.
pub fn print<T: Serialize>(what: &str, value: Option<&T>, format: OutputFormat) -> anyhow::Result<()> {
    match value {
        Some(value) => println!("{}", render(value, format)?),
        None => eprintln!("{what} not found"),
    }
    Ok(())
}
