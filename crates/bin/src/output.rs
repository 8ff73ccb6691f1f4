//! Output formatting helpers for human-readable and JSON output.

use crate::cli::Format;

/// Print `fields` as one JSON object, or as aligned `name  value` lines.
pub fn print_record(
    format: Format,
    fields: &[(&str, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Human => {
            let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, value) in fields {
                println!("{name:<width$}  {value}");
            }
        }
        Format::Json => {
            let object: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(value.as_str())))
                .collect();
            println!("{}", serde_json::to_string(&object)?);
        }
    }
    Ok(())
}
