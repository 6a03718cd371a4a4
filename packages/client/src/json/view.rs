//! The [`Json`] view: a value-semantics handle over a parsed JSON tree.

use serde_json::Value;

use super::path::{self, PathError, PathSegment};

/// A structural view over a parsed JSON value.
///
/// `Json` is the response type handed to the `on_json` callback of a
/// request. It supports chained navigation:
///
/// ```
/// use declareq_client::json::Json;
///
/// let json = Json::parse(r#"{"user": {"id": 7}}"#).unwrap();
/// assert_eq!(json.get("user").unwrap().get("id").unwrap().int(), 7);
/// ```
///
/// or the equivalent multi-step path, folded left-to-right:
///
/// ```
/// # use declareq_client::json::Json;
/// # let json = Json::parse(r#"{"user": {"id": 7}}"#).unwrap();
/// assert_eq!(json.get_path(["user", "id"]).unwrap().int(), 7);
/// ```
///
/// Typed accessors come in two flavors: total accessors (`string()`,
/// `int()`, ...) that fall back to a type default on tag mismatch, and
/// optional accessors (`string_opt()`, ...) for strict checks.
///
/// `Json` has value semantics: cloning (and `get`, which clones the
/// sub-tree) yields an independent logical value, so a view handed to one
/// callback can never be mutated by another holder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Json {
    value: Value,
}

impl Json {
    /// An empty JSON object.
    #[must_use]
    pub fn new() -> Self {
        Json {
            value: Value::Object(serde_json::Map::new()),
        }
    }

    /// Parse a JSON string.
    ///
    /// # Errors
    /// Returns the underlying parser error on malformed input.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Json {
            value: serde_json::from_str(text)?,
        })
    }

    /// Parse JSON from raw bytes.
    ///
    /// # Errors
    /// Returns the underlying parser error on malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Json {
            value: serde_json::from_slice(bytes)?,
        })
    }

    /// Build an object from key/value pairs.
    ///
    /// ```
    /// use declareq_client::json::Json;
    ///
    /// let json = Json::object([("firstName", "Carson"), ("lastName", "Katri")]);
    /// assert_eq!(json.get("firstName").unwrap().string(), "Carson");
    /// ```
    pub fn object<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Json>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into().value))
            .collect();
        Json {
            value: Value::Object(map),
        }
    }

    /// The wrapped value tree.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the view, yielding the wrapped value tree.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Serialize back to bytes through the JSON library.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.value).unwrap_or_default()
    }

    /// Navigate one step: a string key into an object or an index into an
    /// array. The sub-tree is cloned, preserving value semantics.
    ///
    /// # Errors
    /// [`PathError`] when the key or index is absent, or the segment kind
    /// does not match the node's tag.
    pub fn get(&self, segment: impl Into<PathSegment>) -> Result<Json, PathError> {
        let segment = segment.into();
        path::resolve(&self.value, &segment).map(|v| Json { value: v.clone() })
    }

    /// Navigate a multi-step path, folding segments left-to-right.
    ///
    /// # Errors
    /// The first [`PathError`] encountered along the path.
    pub fn get_path<S>(&self, segments: impl IntoIterator<Item = S>) -> Result<Json, PathError>
    where
        S: Into<PathSegment>,
    {
        let mut node = &self.value;
        for segment in segments {
            node = path::resolve(node, &segment.into())?;
        }
        Ok(Json {
            value: node.clone(),
        })
    }

    /// Replace the node at `path` with `value`.
    ///
    /// Writes are non-vivifying: every intermediate container must already
    /// exist and match the segment kind. Only the final segment may create
    /// a new entry, and only inside an existing container - inserting a new
    /// key into an object, or appending at exactly `len` of an array. An
    /// empty path replaces the whole tree.
    ///
    /// # Errors
    /// [`PathError`] when an intermediate is missing or mismatched, or the
    /// final segment indexes past the end of an array.
    pub fn set<S>(
        &mut self,
        segments: impl IntoIterator<Item = S>,
        value: impl Into<Json>,
    ) -> Result<(), PathError>
    where
        S: Into<PathSegment>,
    {
        let segments: Vec<PathSegment> = segments.into_iter().map(Into::into).collect();
        let new_value = value.into().value;
        let Some((last, intermediate)) = segments.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        let mut node = &mut self.value;
        for segment in intermediate {
            node = path::resolve_mut(node, segment)?;
        }

        match (node, last) {
            (Value::Object(map), PathSegment::Key(key)) => {
                map.insert(key.clone(), new_value);
                Ok(())
            }
            (Value::Array(items), PathSegment::Index(index)) if *index < items.len() => {
                items[*index] = new_value;
                Ok(())
            }
            (Value::Array(items), PathSegment::Index(index)) if *index == items.len() => {
                items.push(new_value);
                Ok(())
            }
            (Value::Array(_), PathSegment::Index(index)) => Err(PathError::MissingIndex(*index)),
            (other, segment) => Err(PathError::TypeMismatch {
                segment: segment.clone(),
                found: path::tag_of(other),
            }),
        }
    }

    // Typed accessors. The non-optional flavor is total: a tag mismatch
    // yields the type default rather than an error.

    /// The value as a `String`, or `""` when the node is not a string.
    #[must_use]
    pub fn string(&self) -> String {
        self.string_opt().unwrap_or_default()
    }

    /// The value as a `String`, or `None` when the node is not a string.
    #[must_use]
    pub fn string_opt(&self) -> Option<String> {
        self.value.as_str().map(str::to_owned)
    }

    /// The value as an `i64`, or `0` when the node is not an integral number.
    #[must_use]
    pub fn int(&self) -> i64 {
        self.int_opt().unwrap_or_default()
    }

    /// The value as an `i64`, or `None` when the node is not an integral number.
    #[must_use]
    pub fn int_opt(&self) -> Option<i64> {
        self.value.as_i64()
    }

    /// The value as an `f64`, or `0.0` when the node is not a number.
    #[must_use]
    pub fn double(&self) -> f64 {
        self.double_opt().unwrap_or_default()
    }

    /// The value as an `f64`, or `None` when the node is not a number.
    #[must_use]
    pub fn double_opt(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// The value as a `bool`, or `false` when the node is not a boolean.
    #[must_use]
    pub fn boolean(&self) -> bool {
        self.bool_opt().unwrap_or_default()
    }

    /// The value as a `bool`, or `None` when the node is not a boolean.
    #[must_use]
    pub fn bool_opt(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// The elements of an array value, or `[]` when the node is not an array.
    #[must_use]
    pub fn array(&self) -> Vec<Json> {
        self.array_opt().unwrap_or_default()
    }

    /// The elements of an array value, or `None` when the node is not an array.
    #[must_use]
    pub fn array_opt(&self) -> Option<Vec<Json>> {
        self.value.as_array().map(|items| {
            items
                .iter()
                .map(|v| Json { value: v.clone() })
                .collect()
        })
    }

    /// The number of elements: `array().len()`.
    #[must_use]
    pub fn count(&self) -> usize {
        self.value.as_array().map_or(0, Vec::len)
    }

    /// Whether the node is JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        Json { value }
    }
}

impl From<bool> for Json {
    fn from(value: bool) -> Self {
        Json {
            value: Value::Bool(value),
        }
    }
}

impl From<i64> for Json {
    fn from(value: i64) -> Self {
        Json {
            value: Value::from(value),
        }
    }
}

impl From<i32> for Json {
    fn from(value: i32) -> Self {
        Json {
            value: Value::from(value),
        }
    }
}

impl From<f64> for Json {
    fn from(value: f64) -> Self {
        Json {
            value: Value::from(value),
        }
    }
}

impl From<&str> for Json {
    fn from(value: &str) -> Self {
        Json {
            value: Value::String(value.to_owned()),
        }
    }
}

impl From<String> for Json {
    fn from(value: String) -> Self {
        Json {
            value: Value::String(value),
        }
    }
}

impl From<Vec<Json>> for Json {
    fn from(items: Vec<Json>) -> Self {
        Json {
            value: Value::Array(items.into_iter().map(|j| j.value).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chained_and_folded_paths_are_equivalent() {
        let json = Json::parse(r#"{"a": {"b": [10, 20]}}"#).unwrap();
        let chained = json.get("a").unwrap().get("b").unwrap().get(1).unwrap();
        let folded = json
            .get_path([PathSegment::from("a"), "b".into(), 1.into()])
            .unwrap();
        assert_eq!(chained, folded);
        assert_eq!(chained.int(), 20);
    }

    #[test]
    fn default_and_optional_accessors_disagree_only_on_mismatch() {
        let json = Json::from("hello");
        assert_eq!(json.string(), "hello");
        assert_eq!(json.string_opt(), Some("hello".to_owned()));
        assert_eq!(json.int(), 0);
        assert_eq!(json.int_opt(), None);
        assert_eq!(json.double(), 0.0);
        assert_eq!(json.double_opt(), None);
        assert!(!json.boolean());
        assert_eq!(json.bool_opt(), None);
        assert!(json.array().is_empty());
        assert_eq!(json.array_opt(), None);
    }

    #[test]
    fn int_rejects_fractional_numbers_but_double_accepts_integers() {
        let fractional = Json::from(1.5);
        assert_eq!(fractional.int_opt(), None);
        assert_eq!(fractional.double(), 1.5);

        let integral = Json::from(3);
        assert_eq!(integral.double(), 3.0);
    }

    #[test]
    fn count_is_array_length() {
        let json = Json::parse("[1, 2, 3]").unwrap();
        assert_eq!(json.count(), 3);
        assert_eq!(Json::from("scalar").count(), 0);
    }

    #[test]
    fn get_set_law_preserves_siblings() {
        let mut json = Json::parse(r#"{"a": 1, "b": 2}"#).unwrap();
        json.set(["a"], 99).unwrap();
        assert_eq!(json.get("a").unwrap().int(), 99);
        assert_eq!(json.get("b").unwrap().int(), 2);
    }

    #[test]
    fn set_does_not_vivify_missing_intermediates() {
        let mut json = Json::parse(r#"{"a": {}}"#).unwrap();
        let err = json.set(["missing", "leaf"], 1).unwrap_err();
        assert_eq!(err, PathError::MissingKey("missing".into()));
        // The tree is untouched on failure.
        assert_eq!(json.value(), &json!({"a": {}}));
    }

    #[test]
    fn final_segment_may_insert_key_or_append() {
        let mut json = Json::parse(r#"{"items": [1]}"#).unwrap();
        json.set(["fresh"], true).unwrap();
        assert!(json.get("fresh").unwrap().boolean());

        json.set([PathSegment::from("items"), PathSegment::from(1)], 2)
            .unwrap();
        assert_eq!(json.get("items").unwrap().count(), 2);

        let err = json
            .set([PathSegment::from("items"), PathSegment::from(5)], 3)
            .unwrap_err();
        assert_eq!(err, PathError::MissingIndex(5));
    }

    #[test]
    fn set_with_empty_path_replaces_the_tree() {
        let mut json = Json::new();
        json.set(std::iter::empty::<PathSegment>(), 42).unwrap();
        assert_eq!(json.int(), 42);
    }

    #[test]
    fn parse_serialize_round_trip() {
        let json = Json::object([
            ("name", Json::from("declareq")),
            ("tags", Json::from(vec![Json::from("http"), Json::from("json")])),
            ("count", Json::from(2)),
            ("strict", Json::from(false)),
        ]);
        let reparsed = Json::from_bytes(&json.to_bytes()).unwrap();
        assert_eq!(reparsed, json);
    }

    #[test]
    fn parse_failure_propagates() {
        assert!(Json::parse("{not json").is_err());
    }
}
