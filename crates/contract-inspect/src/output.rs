use std::io::Write;

use serde::Serialize;
use tabwriter::TabWriter;

use crate::{CommandOutput, Context};

/// Serialize `value` as the command's stdout, honouring `output.pretty`.
pub fn json_output<T: Serialize + ?Sized>(ctx: &Context, value: &T) -> CommandOutput {
    let encoded = if ctx.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match encoded {
        Ok(text) => CommandOutput::ok(format!("{text}\n")),
        Err(err) => CommandOutput::fail(1, &format!("encode output: {err}")),
    }
}

/// Align tab-separated rows under a header.
pub fn table(header: &str, rows: &[String]) -> Result<String, String> {
    let mut tw = TabWriter::new(Vec::new()).padding(2);
    writeln!(tw, "{header}").map_err(|e| e.to_string())?;
    for row in rows {
        writeln!(tw, "{row}").map_err(|e| e.to_string())?;
    }
    tw.flush().map_err(|e| e.to_string())?;
    match tw.into_inner() {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Err("failed to render table".to_string()),
    }
}

/// `table` wrapped as command output.
pub fn table_output(header: &str, rows: &[String], footer: Option<String>) -> CommandOutput {
    match table(header, rows) {
        Ok(mut text) => {
            if let Some(footer) = footer {
                text.push_str(&footer);
                text.push('\n');
            }
            CommandOutput::ok(text)
        }
        Err(err) => CommandOutput::fail(1, &err),
    }
}

/// Placeholder for empty cells so columns stay aligned.
pub fn cell(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let rows = vec!["a\tlonger".to_string(), "bbbb\tx".to_string()];
        let text = match table("K\tV", &rows) {
            Ok(text) => text,
            Err(err) => panic!("table: {err}"),
        };
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let col = |line: &str, needle: &str| line.find(needle);
        assert_eq!(col(lines[1], "longer"), col(lines[2], "x"));
    }

    #[test]
    fn empty_cells_render_as_dash() {
        assert_eq!(cell(None), "-");
        assert_eq!(cell(Some("")), "-");
        assert_eq!(cell(Some("v")), "v");
    }
}
