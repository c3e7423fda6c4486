//! Exclusion paths.
//!
//! An exclusion path names a `signature` field that canonicalization removed.
//! Grammar:
//! - `field`
//! - `field.subfield`
//! - `field[INDEX].subfield` (0-based array index)
//!
//! A path whose root is an array starts with the index: `[0].signature`.
//! Field names containing `.`, `[` or `]` cannot be written in this grammar;
//! `is_replayable()` reports whether a built path survives a format/parse cycle.

use std::fmt;

use serde_json::Value;

use crate::errors::{SbomSigError, SbomSigResult};
use crate::SIGNATURE_FIELD;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExclusionPath {
    segments: Vec<PathSegment>,
}

impl ExclusionPath {
    /// The empty path (document root).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(field.to_string()));
        Self { segments }
    }

    pub fn index(&self, i: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(i));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for the path `signature` (the top-level block).
    pub fn is_top_level_signature(&self) -> bool {
        matches!(self.segments.as_slice(), [PathSegment::Field(f)] if f == SIGNATURE_FIELD)
    }

    /// Final field name, if the path ends in a field.
    pub fn leaf_name(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PathSegment::Field(f)) => Some(f.as_str()),
            _ => None,
        }
    }

    /// Parse the textual form.
    pub fn parse(s: &str) -> SbomSigResult<Self> {
        let bad = |why: &str| SbomSigError::invalid_exclusion_path(format!("{s:?}: {why}"));

        if s.is_empty() {
            return Err(bad("empty path"));
        }

        let chars: Vec<char> = s.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;
        // A field is expected at the start and after every '.'.
        let mut expect_field = chars[0] != '[';

        while i < chars.len() {
            if expect_field {
                let start = i;
                while i < chars.len() && !matches!(chars[i], '.' | '[' | ']') {
                    i += 1;
                }
                if i == start {
                    return Err(bad("empty field name"));
                }
                segments.push(PathSegment::Field(chars[start..i].iter().collect()));
                expect_field = false;
                continue;
            }

            match chars[i] {
                '.' => {
                    i += 1;
                    if i == chars.len() {
                        return Err(bad("trailing '.'"));
                    }
                    expect_field = true;
                }
                '[' => {
                    i += 1;
                    let start = i;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    if i == start || i == chars.len() || chars[i] != ']' {
                        return Err(bad("malformed array index"));
                    }
                    let digits: String = chars[start..i].iter().collect();
                    let idx = digits
                        .parse::<usize>()
                        .map_err(|_| bad("array index out of range"))?;
                    segments.push(PathSegment::Index(idx));
                    i += 1;
                }
                _ => return Err(bad("unexpected character")),
            }
        }

        Ok(Self { segments })
    }

    /// True when formatting and re-parsing yields the same path.
    pub fn is_replayable(&self) -> bool {
        !self.is_root()
            && Self::parse(&self.to_string())
                .map(|p| p == *self)
                .unwrap_or(false)
    }

    /// Remove the node this path names from `doc` and return it.
    ///
    /// The path must end in a field named `signature` held by an object.
    pub fn remove_from(&self, doc: &mut Value) -> SbomSigResult<Value> {
        let unresolved =
            |why: &str| SbomSigError::invalid_exclusion_path(format!("{self}: {why}"));

        let (last, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| unresolved("empty path"))?;

        let leaf = match last {
            PathSegment::Field(f) if f == SIGNATURE_FIELD => f,
            _ => return Err(unresolved("does not name a signature field")),
        };

        let mut cur = doc;
        for seg in parents {
            cur = match seg {
                PathSegment::Field(f) => cur
                    .as_object_mut()
                    .and_then(|o| o.get_mut(f))
                    .ok_or_else(|| unresolved("missing object member"))?,
                PathSegment::Index(i) => cur
                    .as_array_mut()
                    .and_then(|a| a.get_mut(*i))
                    .ok_or_else(|| unresolved("missing array element"))?,
            };
        }

        cur.as_object_mut()
            .and_then(|o| o.remove(leaf))
            .ok_or_else(|| unresolved("no signature field at this location"))
    }
}

impl fmt::Display for ExclusionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Field(name) if n == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_matches_grammar() {
        let p = ExclusionPath::root()
            .child("metadata")
            .child("tools")
            .index(2)
            .child("signature");
        assert_eq!(p.to_string(), "metadata.tools[2].signature");
        assert_eq!(ExclusionPath::root().index(0).child("signature").to_string(), "[0].signature");
    }

    #[test]
    fn parse_accepts_grammar() {
        let p = ExclusionPath::parse("components[10].signature").unwrap();
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Field("components".into()),
                PathSegment::Index(10),
                PathSegment::Field("signature".into()),
            ]
        );
        assert!(ExclusionPath::parse("signature").unwrap().is_top_level_signature());
        assert!(ExclusionPath::parse("[3].signature").is_ok());
        assert!(ExclusionPath::parse("a[0][1].signature").is_ok());
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", ".a", "a.", "a..b", "a[", "a[x]", "a[]", "a]b", "a[1]b"] {
            assert!(ExclusionPath::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn dotted_field_names_are_not_replayable() {
        let p = ExclusionPath::root().child("org.example").child("signature");
        assert!(!p.is_replayable());
        assert!(ExclusionPath::root().child("a").child("signature").is_replayable());
    }

    #[test]
    fn remove_from_resolves_nested_array_paths() {
        let mut doc = json!({
            "components": [
                {"name": "a"},
                {"name": "b", "signature": {"value": "x"}}
            ]
        });
        let p = ExclusionPath::parse("components[1].signature").unwrap();
        let removed = p.remove_from(&mut doc).unwrap();
        assert_eq!(removed, json!({"value": "x"}));
        assert_eq!(doc, json!({"components": [{"name": "a"}, {"name": "b"}]}));

        // Second removal finds nothing.
        assert!(p.remove_from(&mut doc).is_err());
    }

    #[test]
    fn remove_from_requires_signature_leaf() {
        let mut doc = json!({"name": "x"});
        let p = ExclusionPath::parse("name").unwrap();
        assert!(p.remove_from(&mut doc).is_err());
        assert_eq!(doc, json!({"name": "x"}));
    }
}
