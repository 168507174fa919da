use serde_json::Value;
use std::fmt;

/// Parsed `$ref`: an optional document id plus unescaped JSON Pointer segments.
///
/// Accepted shapes:
/// - `doc.json#/a/b` (document and pointer)
/// - `#/a/b` (pointer into the enclosing document)
/// - `/a/b` (bare pointer, also contextual)
/// - `doc.json` (whole document)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    pub schema_id: Option<String>,
    pub path: Vec<String>,
}

impl SchemaRef {
    /// Splits a reference string. Pure string work; nothing is looked up.
    pub fn parse(raw: &str) -> Self {
        if let Some((document, fragment)) = raw.split_once('#') {
            return Self {
                schema_id: (!document.is_empty()).then(|| document.to_string()),
                path: split_pointer(fragment),
            };
        }
        if raw.starts_with('/') {
            return Self {
                schema_id: None,
                path: split_pointer(raw),
            };
        }
        Self {
            schema_id: (!raw.is_empty()).then(|| raw.to_string()),
            path: Vec::new(),
        }
    }

    /// Anchors the reference, filling a missing document id with `context_id`.
    pub fn resolve_against(self, context_id: &str) -> Location {
        Location {
            schema_id: self.schema_id.unwrap_or_else(|| context_id.to_string()),
            path: self.path,
        }
    }
}

/// Shorthand for [`SchemaRef::parse`].
pub fn parse_ref(raw: &str) -> SchemaRef {
    SchemaRef::parse(raw)
}

/// A schema node identified by its document and pointer path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub schema_id: String,
    pub path: Vec<String>,
}

impl Location {
    pub fn root(schema_id: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            path: Vec::new(),
        }
    }

    /// Location one segment deeper.
    pub fn child(&self, segment: impl ToString) -> Self {
        let mut path = self.path.clone();
        path.push(segment.to_string());
        Self {
            schema_id: self.schema_id.clone(),
            path,
        }
    }

    /// Escaped JSON Pointer for this location (`""` for the document root).
    pub fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| format!("/{}", escape_segment(segment)))
            .collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.schema_id, self.pointer())
    }
}

fn split_pointer(pointer: &str) -> Vec<String> {
    let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(unescape_segment).collect()
}

/// `~1` becomes `/`, then `~0` becomes `~` (RFC 6901 order).
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Single structural step: property access on objects, index access on arrays.
pub fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

/// Follows `path` from `document`; `None` as soon as a segment is missing.
pub fn navigate<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(document, |node, segment| step(node, segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_document_and_pointer() {
        let parsed = SchemaRef::parse("definitions.json#/header/properties");
        assert_eq!(parsed.schema_id.as_deref(), Some("definitions.json"));
        assert_eq!(parsed.path, vec!["header", "properties"]);
    }

    #[test]
    fn parse_same_document_pointer() {
        let parsed = SchemaRef::parse("#/definitions/address");
        assert!(parsed.schema_id.is_none());
        assert_eq!(parsed.path, vec!["definitions", "address"]);
    }

    #[test]
    fn parse_bare_pointer_is_contextual() {
        let parsed = SchemaRef::parse("/definitions/address");
        assert!(parsed.schema_id.is_none());
        assert_eq!(parsed.path, vec!["definitions", "address"]);
    }

    #[test]
    fn parse_whole_document() {
        let parsed = SchemaRef::parse("message.json");
        assert_eq!(parsed.schema_id.as_deref(), Some("message.json"));
        assert!(parsed.path.is_empty());

        let hashed = SchemaRef::parse("message.json#");
        assert_eq!(hashed, parsed);
    }

    #[test]
    fn unescapes_segments() {
        let parsed = SchemaRef::parse("#/paths/~1users~1{id}/a~0b");
        assert_eq!(parsed.path, vec!["paths", "/users/{id}", "a~b"]);
        assert_eq!(unescape_segment("~01"), "~1");
    }

    #[test]
    fn location_display_escapes_pointer() {
        let loc = SchemaRef::parse("#/a~1b/c").resolve_against("doc.json");
        assert_eq!(loc.to_string(), "doc.json#/a~1b/c");
        assert_eq!(Location::root("doc.json").to_string(), "doc.json#");
    }

    #[test]
    fn navigate_objects_and_arrays() {
        let doc = json!({"a": {"b": [10, {"c": true}]}});
        let path: Vec<String> = vec!["a".into(), "b".into(), "1".into(), "c".into()];
        assert_eq!(navigate(&doc, &path), Some(&json!(true)));
        assert!(navigate(&doc, &["a".to_string(), "missing".to_string()]).is_none());
        assert!(navigate(&doc, &["a".to_string(), "b".to_string(), "x".to_string()]).is_none());
    }
}
