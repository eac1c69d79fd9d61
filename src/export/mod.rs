//! Export Module
//!
//! Renders a decode envelope for output.
//!
//! - JSON: the envelope's result or error, for tooling
//! - CSV: one `name,value` row per result entry
//! - Text: aligned `name  value` lines for the terminal

mod csv_export;
mod json_export;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::Envelope;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

/// Render an envelope in the requested format
pub fn render(envelope: &Envelope<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json_export::render(envelope),
        OutputFormat::Csv => csv_export::render(envelope),
        OutputFormat::Text => Ok(render_text(envelope)),
    }
}

/// Render and write to `path`
pub fn write(path: &Path, envelope: &Envelope<'_>, format: OutputFormat) -> Result<()> {
    let rendered = render(envelope, format)?;
    fs::write(path, rendered).with_context(|| format!("write {}", path.display()))
}

fn render_text(envelope: &Envelope<'_>) -> String {
    if let Some(error) = &envelope.error {
        return format!("{} ({})\n\n{}\n", envelope.spec.name, envelope.spec.mode_name(), error);
    }

    let width = envelope.result.keys().map(str::len).max().unwrap_or(0);
    let mut out = format!("{} ({})\n\n", envelope.spec.name, envelope.spec.mode_name());
    for (name, value) in envelope.result.iter() {
        out.push_str(&format!("{name:<width$}  {value}\n"));
    }
    out
}
