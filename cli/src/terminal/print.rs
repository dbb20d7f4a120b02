use std::io::Write;

use serde::Serialize;

/// Writes `value` as a single JSON document followed by a newline.
///
/// The binary passes stdout here and nothing else ever writes to it;
/// diagnostics go to stderr.
pub fn document<T: Serialize>(mut out: impl Write, value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    writeln!(out, "{rendered}")?;
    out.flush()?;
    Ok(())
}
