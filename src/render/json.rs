//! JSON output for command sequences.
//!
//! Layout is fixed: keys sorted at every level, four-space indent. The file is
//! replaced atomically so readers never see a half-written sequence.

use crate::command::CommandDocument;
use anyhow::Context;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Render a command sequence the way downstream run control expects it:
/// every object's keys sorted, four-space indentation, no trailing newline.
pub fn render_json(docs: &[CommandDocument]) -> anyhow::Result<String> {
    let value = sort_keys(serde_json::to_value(docs)?);

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Parse a rendered sequence back into documents.
pub fn parse_json(text: &str) -> anyhow::Result<Vec<CommandDocument>> {
    serde_json::from_str(text).context("parse command sequence")
}

/// Write `contents` to `path` through a temp file in the same directory, so
/// the target is either the complete new file or untouched.
pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("move output into place at {}", path.display()))?;
    Ok(())
}

// Key order must not depend on serde_json's map backend.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k, sort_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
