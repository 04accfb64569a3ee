//! Conversion of provider-returned scalars into validated `f64` vectors.

use super::Embedding;
use crate::error::{ErrorKind, ProviderError, Result};
use serde_json::Value;
use std::num::ParseFloatError;
use thiserror::Error;

/// Why a single element could not become a float.
#[derive(Error, Debug)]
pub enum CoercionError {
    #[error("element {index} is not a number: {source}")]
    Unparseable {
        index: usize,
        #[source]
        source: ParseFloatError,
    },

    #[error("element {index} has non-numeric type {kind}")]
    WrongType { index: usize, kind: &'static str },

    #[error("element {index} is not finite")]
    NotFinite { index: usize },

    #[error("vector is empty")]
    Empty,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_element(index: usize, value: &Value) -> std::result::Result<f64, CoercionError> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or(CoercionError::NotFinite { index })?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|source| CoercionError::Unparseable { index, source })?,
        other => {
            return Err(CoercionError::WrongType {
                index,
                kind: json_type(other),
            })
        }
    };
    if !number.is_finite() {
        return Err(CoercionError::NotFinite { index });
    }
    Ok(number)
}

/// Coerce one raw vector. Integers become floats; numeric strings are parsed.
pub fn coerce_vector(raw: &[Value]) -> std::result::Result<Embedding, CoercionError> {
    if raw.is_empty() {
        return Err(CoercionError::Empty);
    }
    raw.iter()
        .enumerate()
        .map(|(index, value)| coerce_element(index, value))
        .collect()
}

/// Coerce a whole batch; any bad element fails the entire batch.
pub fn coerce_vectors(provider: &str, raw: &[&[Value]]) -> Result<Vec<Embedding>> {
    raw.iter()
        .enumerate()
        .map(|(position, vector)| {
            coerce_vector(vector).map_err(|e| {
                let (kind, problem) = match e {
                    CoercionError::Empty => (ErrorKind::MissingVector, "was empty"),
                    _ => (ErrorKind::NonNumericVector, "contained non-numeric values"),
                };
                ProviderError::with_source(
                    kind,
                    format!("{} embedding vector {} {}", provider, position, problem),
                    e,
                )
            })
        })
        .collect()
}
