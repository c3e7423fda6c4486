//! Canonical JSON encoding.
//!
//! `canonicalize` turns a JSON value into the exact bytes that get signed:
//! - object keys sorted ascending by Unicode code point
//! - no insignificant whitespace
//! - strings with minimal escaping (`"`, `\` and control characters only)
//! - numbers in shortest round-trip form, no trailing zeros, no `+` in exponents
//! - every object member named `signature` removed (not descended into) and its
//!   location recorded as an `ExclusionPath`
//!
//! The function is pure and total over `serde_json::Value`. Exclusions are
//! reported in walk order: an object's own `signature` before anything nested in
//! its siblings, siblings in key order, array elements by ascending index.

use serde_json::{Map, Number, Value};

use crate::determinism::exclusion::ExclusionPath;
use crate::determinism::hashing::sha256_hex;
use crate::determinism::stable_sort::stable_sort_pairs;
use crate::SIGNATURE_FIELD;

/// Canonical bytes plus the signature fields removed to produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    pub bytes: Vec<u8>,
    pub excludes: Vec<ExclusionPath>,
}

impl Canonical {
    /// Canonical output as text. Always valid UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Exclusion paths in their textual form.
    pub fn exclude_strings(&self) -> Vec<String> {
        self.excludes.iter().map(|p| p.to_string()).collect()
    }

    pub fn sha256_hex(&self) -> String {
        sha256_hex(&self.bytes)
    }
}

/// Canonicalize a JSON value, excluding every `signature` member.
pub fn canonicalize(doc: &Value) -> Canonical {
    let mut out = String::new();
    let mut excludes = Vec::new();
    write_value(doc, &ExclusionPath::root(), &mut out, &mut excludes);

    tracing::debug!(
        bytes = out.len(),
        excludes = excludes.len(),
        "canonicalized document"
    );

    Canonical {
        bytes: out.into_bytes(),
        excludes,
    }
}

/// Recompute canonical bytes for `doc` and compare them with `candidate`.
///
/// A self-check for callers holding previously produced bytes; it plays no part
/// in signature verification.
pub fn verify_canonicalization(doc: &Value, candidate: &[u8]) -> bool {
    canonicalize(doc).bytes == candidate
}

fn write_value(v: &Value, path: &ExclusionPath, out: &mut String, excludes: &mut Vec<ExclusionPath>) {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, &path.index(i), out, excludes);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, path, out, excludes),
    }
}

fn write_object(
    map: &Map<String, Value>,
    path: &ExclusionPath,
    out: &mut String,
    excludes: &mut Vec<ExclusionPath>,
) {
    if map.contains_key(SIGNATURE_FIELD) {
        excludes.push(path.child(SIGNATURE_FIELD));
    }

    let mut entries: Vec<(&str, &Value)> = map
        .iter()
        .filter(|(k, _)| k.as_str() != SIGNATURE_FIELD)
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    stable_sort_pairs(&mut entries);

    out.push('{');
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(k, out);
        out.push(':');
        write_value(v, &path.child(k), out, excludes);
    }
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        out.push_str(&format_f64(f));
    } else {
        // Arbitrary-precision numbers are already a decimal literal.
        out.push_str(&n.to_string());
    }
}

/// Shortest round-trip decimal form of a finite double.
///
/// Plain notation for decimal exponents in [-6, 21), scientific otherwise, with
/// the exponent written without a `+` sign (`1e21`, `1.5e-7`).
pub(crate) fn format_f64(f: f64) -> String {
    if f == 0.0 || !f.is_finite() {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "1.2345e4".
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Value is 0.d1d2...dk * 10^n.
    let n = exp + 1;

    let mut s = String::new();
    if f.is_sign_negative() {
        s.push('-');
    }

    if k <= n && n <= 21 {
        s.push_str(&digits);
        s.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        s.push_str(&digits[..n as usize]);
        s.push('.');
        s.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        s.push_str("0.");
        s.extend(std::iter::repeat('0').take((-n) as usize));
        s.push_str(&digits);
    } else {
        s.push_str(&digits[..1]);
        if k > 1 {
            s.push('.');
            s.push_str(&digits[1..]);
        }
        s.push('e');
        s.push_str(&(n - 1).to_string());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon_str(v: &Value) -> String {
        canonicalize(v).as_str().to_string()
    }

    #[test]
    fn keys_sorted_and_whitespace_removed() {
        let v: Value = serde_json::from_str(r#"{ "b": [3, 2, 1], "a": { "y": 2, "x": 1 } }"#).unwrap();
        assert_eq!(canon_str(&v), r#"{"a":{"x":1,"y":2},"b":[3,2,1]}"#);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(canon_str(&json!({})), "{}");
        assert_eq!(canon_str(&json!([])), "[]");
        assert_eq!(canon_str(&json!({"a": {}, "b": []})), r#"{"a":{},"b":[]}"#);
    }

    #[test]
    fn string_escaping_is_minimal() {
        let v = json!({"s": "q\"b\\ \u{1}\t\n/é€"});
        assert_eq!(canon_str(&v), "{\"s\":\"q\\\"b\\\\ \\u0001\\t\\n/é€\"}");
    }

    #[test]
    fn number_forms() {
        assert_eq!(format_f64(1.0), "1");
        assert_eq!(format_f64(-0.0), "0");
        assert_eq!(format_f64(1.5), "1.5");
        assert_eq!(format_f64(0.000001), "0.000001");
        assert_eq!(format_f64(0.0000001), "1e-7");
        assert_eq!(format_f64(1e21), "1e21");
        assert_eq!(format_f64(1e20), "100000000000000000000");
        assert_eq!(format_f64(123456.789), "123456.789");
        assert_eq!(format_f64(-2.5e-10), "-2.5e-10");
        assert_eq!(format_f64(1.2345e25), "1.2345e25");

        let v: Value = serde_json::from_str(r#"[1.0, 2.50, -0, 1E3, 2200063, -7]"#).unwrap();
        assert_eq!(canon_str(&v), "[1,2.5,0,1000,2200063,-7]");
    }

    #[test]
    fn no_signature_means_no_excludes() {
        let v = json!({"name": "Joe", "id": 2200063});
        let c = canonicalize(&v);
        assert!(c.excludes.is_empty());
        assert_eq!(c.as_str(), r#"{"id":2200063,"name":"Joe"}"#);
    }

    #[test]
    fn signatures_excluded_in_walk_order() {
        let v = json!({
            "signature": {"algorithm": "RS256", "value": "old"},
            "components": [
                {"name": "a", "signature": {"value": "x"}},
                {"name": "b"},
                {"name": "c", "signature": {"value": "y"}}
            ],
            "metadata": {"tools": [{"signature": 1}]}
        });
        let c = canonicalize(&v);
        assert_eq!(
            c.exclude_strings(),
            vec![
                "signature",
                "components[0].signature",
                "components[2].signature",
                "metadata.tools[0].signature",
            ]
        );
        assert_eq!(
            c.as_str(),
            r#"{"components":[{"name":"a"},{"name":"b"},{"name":"c"}],"metadata":{"tools":[{}]}}"#
        );
    }

    #[test]
    fn nested_signature_inside_signature_is_not_visited() {
        let v = json!({"signature": {"signature": {"value": "inner"}}});
        let c = canonicalize(&v);
        assert_eq!(c.exclude_strings(), vec!["signature"]);
        assert_eq!(c.as_str(), "{}");
    }

    #[test]
    fn verify_canonicalization_detects_drift() {
        let v = json!({"a": 1});
        let c = canonicalize(&v);
        assert!(verify_canonicalization(&v, &c.bytes));
        assert!(!verify_canonicalization(&v, br#"{"a": 1}"#));
    }
}
