use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model output contained no JSON object")]
    NoJsonFound,
    #[error("model output contained malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

/// Pulls a single JSON object out of free-form model text.
///
/// The span is greedy: everything from the first `{` to the last `}` is
/// parsed as one object. Nested braces inside the object are therefore
/// fine, but a second `{...}` block elsewhere in the text will corrupt the
/// span and fail as malformed JSON. That matches the behavior the rest of
/// the pipeline was tuned against, so it is kept rather than replaced with
/// a balanced-brace scan.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoJsonFound)?;
    let end = text.rfind('}').filter(|end| *end > start).ok_or(ExtractError::NoJsonFound)?;

    serde_json::from_str(&text[start..=end]).map_err(ExtractError::MalformedJson)
}
