//! Error types for loading fonts and reading requests.
//!
//! Layout and drawing never fail; only the loading paths return errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StashError {
    /// A font file or request could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// ttf-parser rejected the font data.
    #[error("Font error: failed to parse '{id}': {source}")]
    FontParse {
        id: String,
        #[source]
        source: ttf_parser::FaceParsingError,
    },

    /// A JSON request failed to parse.
    #[error("Failed to parse request: {source}{}", hint_suffix(.hint))]
    Json {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for StashError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        StashError::Json { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_carries_hint() {
        let err: StashError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1,, }")
            .map_err(StashError::from)
            .expect_err("invalid json");
        let msg = err.to_string();
        assert!(msg.contains("Hint:"), "expected a hint, got: {msg}");
    }
}
