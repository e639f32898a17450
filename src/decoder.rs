use serde_json::Value;

/// Key used when a record carries no usable category field.
///
/// Events without a category are still counted; they fold under this key
/// rather than being dropped. The key is distinct from an empty-string or
/// differently-cased category, which pass through untouched.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One decoded review event, ready to fold into the score board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEvent {
    pub category: String,
    pub score: i64,
}

#[derive(Debug)]
pub enum DecodeError {
    MalformedPayload(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MalformedPayload(reason) => {
                write!(f, "Malformed record payload: {}", reason)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode one raw record payload into a `ScoreEvent`.
///
/// A payload that is not a JSON object fails with `MalformedPayload` and is
/// the caller's problem to skip. A malformed *field* degrades instead:
/// a missing or null category folds under [`UNKNOWN_CATEGORY`], a missing or
/// non-numeric "Review Score" becomes 0. Unrecognized fields are ignored.
pub fn decode(raw: &[u8]) -> Result<ScoreEvent, DecodeError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;

    let record = value
        .as_object()
        .ok_or_else(|| DecodeError::MalformedPayload("not a JSON object".to_string()))?;

    let category = match record.get("category") {
        Some(Value::String(s)) => s.clone(),
        _ => UNKNOWN_CATEGORY.to_string(),
    };

    let score = record.get("Review Score").map_or(0, coerce_score);

    Ok(ScoreEvent { category, score })
}

/// Integer coercion matching the source format's tolerance: integers pass
/// through, floats truncate, numeric strings parse, everything else is 0.
fn coerce_score(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}
