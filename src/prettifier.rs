// SPDX-License-Identifier: MIT

use std::fmt::Write;

use crate::{PrefValue, dock::Entry};

/// Prettify a `PrefValue` in Apple-style format (for CLI).
///
/// Dictionary keys are printed in sorted order.
pub fn apple_style_string(val: &PrefValue, indent: usize) -> String {
    let ind = |n| "    ".repeat(n);
    match val {
        PrefValue::Dictionary(dict) => {
            let mut keys: Vec<&String> = dict.keys().collect();
            keys.sort();
            let mut out = String::from("{\n");
            for k in keys {
                let _ = writeln!(
                    out,
                    "{}{} = {};",
                    ind(indent + 1),
                    quote(k),
                    apple_style_string(&dict[k], indent + 1)
                );
            }
            out.push_str(&format!("{}}}", ind(indent)));
            out
        }
        PrefValue::Array(arr) => {
            let mut out = String::from("(\n");
            for v in arr {
                let _ = writeln!(out, "{}{},", ind(indent + 1), apple_style_string(v, indent + 1));
            }
            out.push_str(&format!("{})", ind(indent)));
            out
        }
        PrefValue::String(s) => quote(s),
        PrefValue::Integer(i) => i.to_string(),
        PrefValue::Float(f) => f.to_string(),
        PrefValue::Boolean(b) => u8::from(*b).to_string(),
        PrefValue::Data(data) => format!("<Data: {} bytes>", data.len()),
        PrefValue::Date(dt) => format!("<Date: {dt}>"),
        PrefValue::Uid(uid) => format!("<Uid: {uid}>"),
    }
}

/// One line per entry: position, tile type, label and location.
pub fn entry_line(position: usize, entry: &Entry) -> String {
    let mut line = format!(
        "{position:>3}  {:<18}",
        entry.tile_type().unwrap_or("?")
    );
    if let Some(label) = entry.label() {
        let _ = write!(line, "  {label}");
    }
    if let Some(path) = entry.path() {
        let _ = write!(line, "  ({path})");
    }
    line.trim_end().to_string()
}

/// Quotes a key or string for Apple-style output.
fn quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('"', "\\\""))
    }
}
