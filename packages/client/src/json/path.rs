//! Path segments and their resolution against a JSON value tree.

use serde_json::Value;

/// One step of a JSON path: a string key into an object or an integer
/// index into an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key lookup.
    Key(String),
    /// Array index lookup.
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "\"{key}\""),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Failure to resolve a path segment against the current node.
///
/// These are propagated to the caller of the view, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The object does not contain the requested key.
    #[error("key \"{0}\" not present in object")]
    MissingKey(String),

    /// The array is shorter than the requested index.
    #[error("index {0} out of bounds")]
    MissingIndex(usize),

    /// A key was applied to a non-object, or an index to a non-array.
    #[error("cannot apply segment {segment} to {found} value")]
    TypeMismatch {
        /// The segment that failed to apply.
        segment: PathSegment,
        /// Tag of the node the segment was applied to.
        found: &'static str,
    },
}

/// Human-readable tag of a value node, used in mismatch errors.
pub(crate) fn tag_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolve one segment, yielding the sub-value or a classified error.
pub(crate) fn resolve<'a>(node: &'a Value, segment: &PathSegment) -> Result<&'a Value, PathError> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map
            .get(key)
            .ok_or_else(|| PathError::MissingKey(key.clone())),
        (Value::Array(items), PathSegment::Index(index)) => items
            .get(*index)
            .ok_or(PathError::MissingIndex(*index)),
        _ => Err(PathError::TypeMismatch {
            segment: segment.clone(),
            found: tag_of(node),
        }),
    }
}

/// Mutable counterpart of [`resolve`], used by the write path.
pub(crate) fn resolve_mut<'a>(
    node: &'a mut Value,
    segment: &PathSegment,
) -> Result<&'a mut Value, PathError> {
    let found = tag_of(node);
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map
            .get_mut(key)
            .ok_or_else(|| PathError::MissingKey(key.clone())),
        (Value::Array(items), PathSegment::Index(index)) => items
            .get_mut(*index)
            .ok_or(PathError::MissingIndex(*index)),
        _ => Err(PathError::TypeMismatch {
            segment: segment.clone(),
            found,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_resolves_into_object() {
        let value = json!({"a": 1});
        let sub = resolve(&value, &PathSegment::from("a")).unwrap();
        assert_eq!(sub, &json!(1));
    }

    #[test]
    fn missing_key_is_classified() {
        let value = json!({"a": 1});
        let err = resolve(&value, &PathSegment::from("b")).unwrap_err();
        assert_eq!(err, PathError::MissingKey("b".into()));
    }

    #[test]
    fn index_into_non_array_is_a_type_mismatch() {
        let value = json!({"a": 1});
        let err = resolve(&value, &PathSegment::from(0)).unwrap_err();
        assert!(matches!(err, PathError::TypeMismatch { found: "object", .. }));
    }

    #[test]
    fn out_of_bounds_index_is_classified() {
        let value = json!([1, 2]);
        let err = resolve(&value, &PathSegment::from(5)).unwrap_err();
        assert_eq!(err, PathError::MissingIndex(5));
    }
}
