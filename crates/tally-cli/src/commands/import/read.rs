use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};

use crate::cli::root_commands::InputFormat;

/// The explicit `--input`, else the file extension.
pub fn detect_format(path: &Path, explicit: Option<InputFormat>) -> anyhow::Result<InputFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => Ok(InputFormat::Csv),
        Some("json") => Ok(InputFormat::Json),
        Some("jsonl" | "ndjson") => Ok(InputFormat::Jsonl),
        _ => anyhow::bail!(
            "cannot tell the encoding of '{}'; pass --input csv|json|jsonl",
            path.display()
        ),
    }
}

/// Read every row of `path` as a JSON object of header to cell.
pub fn read_rows(path: &Path, format: InputFormat) -> anyhow::Result<Vec<Value>> {
    match format {
        InputFormat::Csv => read_csv(path),
        InputFormat::Json => read_json(path),
        InputFormat::Jsonl => read_jsonl(path),
    }
    .with_context(|| format!("failed to read {}", path.display()))
}

/// CSV cells all arrive as text. A repeated header keeps its first column.
fn read_csv(path: &Path) -> anyhow::Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.entry(header.to_string())
                .or_insert_with(|| Value::String(cell.to_string()));
        }
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// A JSON array of rows, or a single row object.
fn read_json(path: &Path) -> anyhow::Result<Vec<Value>> {
    let value: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    match value {
        Value::Array(rows) => Ok(rows),
        row @ Value::Object(_) => Ok(vec![row]),
        _ => anyhow::bail!("expected a JSON array of rows"),
    }
}

fn read_jsonl(path: &Path) -> anyhow::Result<Vec<Value>> {
    let rows = serde_jsonlines::json_lines::<Value, _>(path)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
