//! Locating embedding vectors inside heterogeneous provider responses.
//!
//! Each [`ExtractionRule`] is a pure function from a parsed payload to an
//! optional list of raw vectors. An adapter evaluates its rules in priority
//! order and takes the first structural match.

use crate::error::{ProviderError, Result};
use serde_json::{Map, Value};

/// Keys that may carry an item's position in the request batch.
const INDEX_KEYS: &[&str] = &["index", "Index", "text_index"];

/// Keys probed on `data[]` items.
const DATA_ITEM_KEYS: &[&str] = &["embedding", "vector"];

/// Keys probed on `embeddings[]` items.
const EMBEDDINGS_ITEM_KEYS: &[&str] = &["embedding", "values", "vector"];

/// One response shape an adapter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// `{"data": [{"embedding": [...]}, ...]}`; `vector` is accepted too, as
    /// are raw arrays in place of objects.
    DataArray,
    /// `{"embeddings": [[...], ...]}` or `{"embeddings": [{"embedding": [...]}]}`.
    EmbeddingsArray,
    /// `[[...], [...]]` for a batch, or `[...]` for a single input.
    BareArray,
    /// `{field: {"float": [[...]], "int8": [[...]]}}`; `preferred` wins,
    /// otherwise the first key in sorted order.
    TypedMap {
        field: &'static str,
        preferred: &'static str,
    },
    /// An item array reached through an object path, items holding one of `keys`.
    Nested {
        path: &'static [&'static str],
        keys: &'static [&'static str],
    },
    /// `{key: [...]}` carrying exactly one vector.
    Single { key: &'static str },
}

impl ExtractionRule {
    /// Apply this rule. `None` means the payload does not have this shape.
    pub fn apply<'a>(&self, payload: &'a Value) -> Option<Vec<&'a [Value]>> {
        match self {
            ExtractionRule::DataArray => item_array(payload.get("data")?, DATA_ITEM_KEYS),
            ExtractionRule::EmbeddingsArray => {
                item_array(payload.get("embeddings")?, EMBEDDINGS_ITEM_KEYS)
            }
            ExtractionRule::BareArray => bare_array(payload),
            ExtractionRule::TypedMap { field, preferred } => {
                typed_map(payload.get(*field)?.as_object()?, preferred)
            }
            ExtractionRule::Nested { path, keys } => {
                let mut node = payload;
                for segment in path.iter() {
                    node = node.get(*segment)?;
                }
                item_array(node, keys)
            }
            ExtractionRule::Single { key } => Some(vec![as_vector(payload.get(*key)?)?]),
        }
    }
}

/// A vector is either a raw array or a `{"values": [...]}` wrapper.
fn as_vector(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(map) => map.get("values")?.as_array().map(Vec::as_slice),
        _ => None,
    }
}

fn item_index(map: &Map<String, Value>) -> Option<usize> {
    INDEX_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
}

/// Read a non-empty array of items, each a raw vector or an object holding
/// one under any of `keys`. Items carrying indices are reordered by them.
fn item_array<'a>(value: &'a Value, keys: &[&str]) -> Option<Vec<&'a [Value]>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }

    let mut located: Vec<(Option<usize>, &'a [Value])> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(raw) => located.push((None, raw.as_slice())),
            Value::Object(map) => {
                let vector = keys
                    .iter()
                    .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
                    .and_then(as_vector)?;
                located.push((item_index(map), vector));
            }
            _ => return None,
        }
    }
    order_by_index(located)
}

/// Place items by their declared index when every item has one; each index in
/// `0..n` must then appear exactly once.
fn order_by_index(located: Vec<(Option<usize>, &[Value])>) -> Option<Vec<&[Value]>> {
    let indexed = located.iter().filter(|(index, _)| index.is_some()).count();
    if indexed == 0 {
        return Some(located.into_iter().map(|(_, vector)| vector).collect());
    }
    if indexed != located.len() {
        return None;
    }

    let mut slots: Vec<Option<&[Value]>> = vec![None; located.len()];
    for (index, vector) in located {
        let slot = slots.get_mut(index?)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(vector);
    }
    slots.into_iter().collect()
}

fn bare_array(payload: &Value) -> Option<Vec<&[Value]>> {
    let items = payload.as_array()?;
    let first = items.first()?;
    match first {
        Value::Array(_) | Value::Object(_) => item_array(payload, DATA_ITEM_KEYS),
        _ => Some(vec![items.as_slice()]),
    }
}

fn typed_map<'a>(map: &'a Map<String, Value>, preferred: &str) -> Option<Vec<&'a [Value]>> {
    let chosen = map.get(preferred).or_else(|| map.values().next())?;
    let batch = chosen.as_array()?;
    if batch.is_empty() {
        return None;
    }
    batch.iter().map(as_vector).collect()
}

/// Run `rules` in order and return the first match, which must hold exactly
/// `expected` vectors.
pub fn extract<'a>(
    provider: &str,
    payload: &'a Value,
    rules: &[ExtractionRule],
    expected: usize,
) -> Result<Vec<&'a [Value]>> {
    let vectors = rules
        .iter()
        .find_map(|rule| rule.apply(payload))
        .ok_or_else(|| {
            ProviderError::missing_vector(format!(
                "{} response did not contain embedding vectors",
                provider
            ))
        })?;

    if vectors.len() != expected {
        return Err(ProviderError::missing_vector(format!(
            "{} returned {} vectors for {} inputs",
            provider,
            vectors.len(),
            expected
        )));
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const ALL: &[ExtractionRule] = &[
        ExtractionRule::DataArray,
        ExtractionRule::EmbeddingsArray,
        ExtractionRule::BareArray,
    ];

    fn lens(vectors: &[&[Value]]) -> Vec<usize> {
        vectors.iter().map(|v| v.len()).collect()
    }

    #[test]
    fn test_data_array_with_embedding_and_vector_fields() {
        let payload = json!({"data": [{"embedding": [0.1, 0.2]}, {"vector": [0.3]}]});
        let vectors = extract("Test", &payload, ALL, 2).unwrap();
        assert_eq!(lens(&vectors), vec![2, 1]);
    }

    #[test]
    fn test_data_array_reorders_by_index() {
        let payload = json!({"data": [
            {"index": 1, "embedding": [2.0]},
            {"index": 0, "embedding": [1.0]}
        ]});
        let vectors = extract("Test", &payload, ALL, 2).unwrap();
        assert_eq!(vectors[0][0], json!(1.0));
        assert_eq!(vectors[1][0], json!(2.0));
    }

    #[test]
    fn test_missing_index_fails() {
        let payload = json!({"data": [
            {"index": 0, "embedding": [1.0]},
            {"index": 2, "embedding": [2.0]}
        ]});
        let err = extract("Test", &payload, &[ExtractionRule::DataArray], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVector);
    }

    #[test]
    fn test_duplicate_index_fails() {
        let payload = json!({"data": [
            {"index": 0, "embedding": [1.0]},
            {"index": 0, "embedding": [2.0]}
        ]});
        assert!(ExtractionRule::DataArray.apply(&payload).is_none());
    }

    #[test]
    fn test_item_without_vector_is_no_match() {
        let payload = json!({"data": [{"embedding": [1.0]}, {"other": 1}]});
        assert!(ExtractionRule::DataArray.apply(&payload).is_none());
    }

    #[test]
    fn test_invalid_item_type_is_no_match() {
        let payload = json!({"embeddings": [[1.0, 2.0], "invalid"]});
        assert!(ExtractionRule::EmbeddingsArray.apply(&payload).is_none());
    }

    #[test]
    fn test_embeddings_array_raw_and_nested() {
        let raw = json!({"embeddings": [[1.0], [2.0]]});
        assert_eq!(extract("Test", &raw, ALL, 2).unwrap().len(), 2);

        let nested = json!({"embeddings": [{"embedding": [5.0, 6.0]}, {"values": [7.0, 8.0]}]});
        assert_eq!(lens(&extract("Test", &nested, ALL, 2).unwrap()), vec![2, 2]);
    }

    #[test]
    fn test_bare_batch_and_single() {
        let batch = json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(extract("Test", &batch, ALL, 2).unwrap().len(), 2);

        let single = json!([1.0, 2.0, 3.0]);
        assert_eq!(lens(&extract("Test", &single, ALL, 1).unwrap()), vec![3]);
    }

    #[test]
    fn test_typed_map_prefers_then_falls_back() {
        let rule = ExtractionRule::TypedMap {
            field: "embeddings",
            preferred: "float",
        };
        let both = json!({"embeddings": {"int8": [[1]], "float": [[0.5, 0.25]]}});
        assert_eq!(rule.apply(&both).unwrap()[0].len(), 2);

        let only_other = json!({"embeddings": {"uint8": [[9, 9, 9]], "binary": [[1]]}});
        // sorted key order: "binary" comes first
        assert_eq!(rule.apply(&only_other).unwrap()[0].len(), 1);
    }

    #[test]
    fn test_nested_path() {
        let rule = ExtractionRule::Nested {
            path: &["Response", "Data"],
            keys: &["Embedding", "embedding"],
        };
        let payload = json!({"Response": {"Data": [{"Embedding": [1.0, 2.0], "Index": 0}]}});
        assert_eq!(rule.apply(&payload).unwrap()[0].len(), 2);

        let lowercase = json!({"Response": {"Data": [{"embedding": [4.0, 5.0]}]}});
        assert_eq!(rule.apply(&lowercase).unwrap()[0].len(), 2);
    }

    #[test]
    fn test_single_key_and_values_wrapper() {
        let rule = ExtractionRule::Single { key: "embedding" };
        assert_eq!(rule.apply(&json!({"embedding": [0.5, 0.6]})).unwrap().len(), 1);
        assert_eq!(
            rule.apply(&json!({"embedding": {"values": [1.0]}})).unwrap()[0].len(),
            1
        );
        assert!(rule.apply(&json!({"embedding": "nope"})).is_none());
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        let payload = json!({"data": [{"embedding": [1.0]}], "embeddings": [[1.0], [2.0]]});
        let vectors = extract("Test", &payload, ALL, 1).unwrap();
        assert_eq!(vectors.len(), 1);
    }

    #[test]
    fn test_no_shape_or_short_batch_fails() {
        for payload in [json!(null), json!("invalid"), json!({"data": []}), json!({"embeddings": "x"})] {
            let err = extract("Test", &payload, ALL, 1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingVector);
        }

        let short = json!({"data": [{"embedding": [1.0]}]});
        let err = extract("Test", &short, ALL, 2).unwrap_err();
        assert!(err.message().contains("1 vectors for 2 inputs"));
    }
}
