use std::{fs, path::Path};

use serde::Serialize;

use crate::{errors::Error, result::ResultSet, Result};

/// Pretty JSON with 4-space indentation.
pub fn to_json_pretty(results: &ResultSet) -> Result<String> {
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    results.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Write the result set to `path`, replacing any existing file.
pub fn write_json(path: &Path, results: &ResultSet) -> Result<()> {
    let json = to_json_pretty(results)?;
    tracing::info!("{json}");
    fs::write(path, json)?;
    tracing::info!("Results saved to {}", path.display());
    Ok(())
}

/// `identifier,username` CSV, one row per entry.
pub fn render_csv(results: &ResultSet) -> String {
    let mut out = String::from("identifier,username\n");
    for (key, res) in results.iter() {
        let username = res
            .profile()
            .and_then(|p| p.username.as_deref())
            .unwrap_or("");
        out.push_str(&csv_field(key));
        out.push(',');
        out.push_str(&csv_field(username));
        out.push('\n');
    }
    out
}

fn csv_field(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
