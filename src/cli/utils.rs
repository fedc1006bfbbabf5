use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::config;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(fields))) = (response.as_object_mut(), data) {
                target.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, status: Option<u16>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "message": message
            });

            if let Some(code) = status {
                response["status"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// A failure that has already been printed; the binary exits non-zero without repeating it.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Print the failure once and hand back an error that callers propagate with `?`.
pub fn report_failure(output_format: OutputFormat, message: &str, status: Option<u16>) -> anyhow::Error {
    if let Err(e) = output_error(output_format, message, status) {
        return e;
    }
    Reported(message.to_string()).into()
}

/// Whether the binary still has to print this error.
pub fn needs_printing(error: &anyhow::Error) -> bool {
    error.downcast_ref::<Reported>().is_none()
}

/// Server base URL: explicit flag, then the configured local port.
pub fn base_url(explicit: Option<String>) -> String {
    explicit
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("http://localhost:{}", config().api.port))
}

/// Print a server response body, either raw or as `key: value` lines.
pub fn output_body(output_format: OutputFormat, body: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(body)?),
        OutputFormat::Text => {
            if let Some(fields) = body.as_object() {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("{}: {}", key, s),
                        other => println!("{}: {}", key, other),
                    }
                }
            } else {
                println!("{}", body);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_failures_are_not_printed_twice() {
        let reported = report_failure(OutputFormat::Json, "Customer not found", Some(404));
        assert!(!needs_printing(&reported));
        assert_eq!(reported.to_string(), "Customer not found");

        let transport = anyhow::anyhow!("connection refused");
        assert!(needs_printing(&transport));
    }

    #[test]
    fn explicit_url_loses_trailing_slash() {
        assert_eq!(base_url(Some("http://api.local:8080/".into())), "http://api.local:8080");
    }
}
