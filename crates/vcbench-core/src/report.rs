//! Report output. The target format is a table a plotting tool can read
//! from stdout, so everything that is not a data row goes out either as a
//! `#`-prefixed comment line (metadata that belongs in the output) or to
//! stderr (progress, via `tracing`).

use std::io::Write;

/// Prints to stdout with a leading comment marker, one marker per line.
pub fn comment(s: impl AsRef<str>) {
    let mut stdout = std::io::stdout();
    for line in s.as_ref().split('\n') {
        if line.is_empty() {
            let _ = writeln!(stdout, "#");
        } else {
            let _ = writeln!(stdout, "# {}", line);
        }
    }
    let _ = stdout.flush();
}

/// Formats key/value pairs as aligned columns. Multi-line values are
/// printed as an indented block below their key.
pub fn align_kvs(kvs: &[(&str, String)]) -> String {
    let maxwidth = kvs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut lines = Vec::new();
    for (k, v) in kvs {
        if v.contains('\n') {
            lines.push(format!("\n{}:", k));
            for subline in v.trim_end().split('\n') {
                lines.push(format!("    {}", subline));
            }
        } else {
            lines.push(format!("{:<width$} {}", format!("{}:", k), v, width = maxwidth + 1));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_single_line_values() {
        let kvs = [("k1", "v1".to_string()), ("long_key", "v2".to_string())];
        let s = align_kvs(&kvs);
        assert_eq!(s, "k1:       v1\nlong_key: v2");
    }

    #[test]
    fn multiline_values_become_blocks() {
        let kvs = [("k", "a\nb\n".to_string())];
        let s = align_kvs(&kvs);
        assert_eq!(s, "\nk:\n    a\n    b");
    }
}
