//! JSON rendering of flattened values

use crate::value::Value;

/// Render a value as compact JSON
pub fn to_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Render a value as pretty-printed JSON with two-space indentation
pub fn to_json_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_value_pretty(value, 0, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => write_string(s, out),
        Value::Map(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(value, out);
            }
            out.push('}');
        }
    }
}

fn write_value_pretty(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::String(s) => write_string(s, out),
        Value::Map(map) if map.is_empty() => out.push_str("{}"),
        Value::Map(map) => {
            out.push_str("{\n");
            let len = map.len();
            for (i, (key, value)) in map.iter().enumerate() {
                push_indent(indent + 1, out);
                write_string(key, out);
                out.push_str(": ");
                write_value_pretty(value, indent + 1, out);
                if i + 1 < len {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(indent, out);
            out.push('}');
        }
    }
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_string(input: &str, out: &mut String) {
    out.push('"');
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
