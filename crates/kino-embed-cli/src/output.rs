//! Output formatting for CLI

use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Print a report, either as pretty JSON or as aligned `key: value` lines
///
/// Both forms list fields in struct declaration order.
pub fn print_report<T: Serialize>(report: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            for (key, value) in text_lines(&serde_json::to_value(report)?) {
                println!("{key:>16}: {value}");
            }
        }
    }
    Ok(())
}

fn text_lines(value: &serde_json::Value) -> Vec<(String, String)> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => "-".to_string(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect(),
        other => vec![("value".to_string(), other.to_string())],
    }
}
