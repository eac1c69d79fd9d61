//! CSV Export
//!
//! Writes the result map as `name,value` rows.

use anyhow::{anyhow, Result};

use crate::engine::Envelope;

pub fn render(envelope: &Envelope<'_>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    // Write header
    wtr.write_record(["name", "value"])?;

    // Write data rows
    match &envelope.error {
        Some(error) => wtr.write_record(["error", error.to_string().as_str()])?,
        None => {
            for (name, value) in envelope.result.iter() {
                wtr.write_record([name, value.to_string().as_str()])?;
            }
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|err| anyhow!("flush csv: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}
