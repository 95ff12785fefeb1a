//! InfluxDB line protocol.
//!
//! `measurement,tag=v,tag=v field="v",field="v" 1700000000000000000`

use crate::DataPoint;

/// Encode one point. `None` when the point has no fields; Influx rejects such lines.
pub fn encode(point: &DataPoint, timestamp_ns: Option<i64>) -> Option<String> {
    if point.fields.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(64);
    escape_into(&mut out, &point.measurement, &[',', ' ']);

    for (k, v) in &point.tags {
        // empty tag values are invalid line protocol
        if v.is_empty() {
            continue;
        }
        out.push(',');
        escape_into(&mut out, k, &[',', '=', ' ']);
        out.push('=');
        escape_into(&mut out, v, &[',', '=', ' ']);
    }

    let mut sep = ' ';
    for (k, v) in &point.fields {
        out.push(sep);
        sep = ',';
        escape_into(&mut out, k, &[',', '=', ' ']);
        out.push_str("=\"");
        for c in v.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }

    if let Some(ts) = timestamp_ns {
        out.push(' ');
        out.push_str(&ts.to_string());
    }
    Some(out)
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}
