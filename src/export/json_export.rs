//! JSON Export
//!
//! Writes the outcome of a decode as JSON.

use anyhow::Result;
use serde::Serialize;

use crate::engine::{DecodeResult, Envelope, Stage};

/// Exportable envelope (leaves out the specification body and the pieces)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportableEnvelope<'e> {
    specification: &'e str,
    #[serde(skip_serializing_if = "Option::is_none")]
    specification_id: Option<&'e str>,
    mode: &'static str,
    stage: Stage,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'e DecodeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ExportableError>,
}

#[derive(Serialize)]
struct ExportableError {
    message: String,
}

impl<'e> From<&'e Envelope<'_>> for ExportableEnvelope<'e> {
    fn from(envelope: &'e Envelope<'_>) -> Self {
        Self {
            specification: &envelope.spec.name,
            specification_id: envelope.spec.id.as_deref(),
            mode: envelope.spec.mode_name(),
            stage: envelope.stage,
            input: format!("0x{}", hex::encode(&envelope.input)),
            result: envelope.error.is_none().then_some(&envelope.result),
            error: envelope.error.as_ref().map(|err| ExportableError {
                message: err.to_string(),
            }),
        }
    }
}

pub fn render(envelope: &Envelope<'_>) -> Result<String> {
    let exportable = ExportableEnvelope::from(envelope);
    Ok(serde_json::to_string_pretty(&exportable)?)
}
