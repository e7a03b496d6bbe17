/*!
 * Guard CLI
 *
 * Parses a JSON document under a deadline:
 * - Input: file path argument, or stdin when absent
 * - Deadline: GUARD_MAX_DURATION seconds (default 1)
 * - Exit codes: 0 parsed, 1 parse error, 124 timed out
 */

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::process::ExitCode;
use tracing::info;

use timeout_guard::{init_tracing, try_run, CapabilitySet, RunError};

const ENV_MAX_DURATION: &str = "GUARD_MAX_DURATION";
const DEFAULT_MAX_DURATION: f64 = 1.0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_TIMEOUT: u8 = 124;

fn max_duration() -> Result<f64> {
    match std::env::var(ENV_MAX_DURATION) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{} is not a number: {:?}", ENV_MAX_DURATION, raw)),
        Err(_) => Ok(DEFAULT_MAX_DURATION),
    }
}

fn read_input(path: Option<&str>) -> Result<(String, String)> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            Ok((path.to_string(), text))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(("stdin".to_string(), text))
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string of {} bytes", s.len()),
        Value::Array(items) => format!("array of {} elements", items.len()),
        Value::Object(map) => format!("object with {} keys", map.len()),
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let path = std::env::args().nth(1);
    let limit = max_duration()?;
    let (source, text) = read_input(path.as_deref())?;
    let capability = CapabilitySet::standard().timer_capability()?;

    info!(source = %source, max_duration = limit, "Parsing document");

    match try_run(&capability, source.as_str(), limit, move || {
        serde_json::from_str::<Value>(&text)
    }) {
        Ok(Some(value)) => {
            println!("{}: {}", source, describe(&value));
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            eprintln!("{}: gave up after {}s", source, limit);
            Ok(ExitCode::from(EXIT_TIMEOUT))
        }
        Err(RunError::Failed(e)) => {
            eprintln!("{}: {}", source, e);
            Ok(ExitCode::from(EXIT_PARSE_ERROR))
        }
        Err(e) => Err(e.into()),
    }
}
