use thiserror::Error;

/// Top-level error type for the Repovox system.
///
/// Each variant wraps a subsystem-specific failure as a descriptive string.
/// Subsystem crates define their own error types where they need richer
/// rejection semantics and implement `From` conversions so that the `?`
/// operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepovoxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Chat backend error: {0}")]
    Chat(String),

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RepovoxError {
    fn from(err: toml::de::Error) -> Self {
        RepovoxError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RepovoxError {
    fn from(err: toml::ser::Error) -> Self {
        RepovoxError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RepovoxError {
    fn from(err: serde_json::Error) -> Self {
        RepovoxError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Repovox operations.
pub type Result<T> = std::result::Result<T, RepovoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RepovoxError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(RepovoxError, &str)> = vec![
            (
                RepovoxError::Ingestion("repository not found".to_string()),
                "Ingestion error: repository not found",
            ),
            (
                RepovoxError::Chat("backend returned 500".to_string()),
                "Chat backend error: backend returned 500",
            ),
            (
                RepovoxError::Recognition("microphone busy".to_string()),
                "Speech recognition error: microphone busy",
            ),
            (
                RepovoxError::Synthesis("invalid voice".to_string()),
                "Speech synthesis error: invalid voice",
            ),
            (
                RepovoxError::Playback("no output device".to_string()),
                "Playback error: no output device",
            ),
            (
                RepovoxError::Http("connection refused".to_string()),
                "HTTP error: connection refused",
            ),
            (
                RepovoxError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RepovoxError = io_err.into();
        assert!(matches!(err, RepovoxError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(parsed.is_err());
        let err: RepovoxError = parsed.unwrap_err().into();
        assert!(matches!(err, RepovoxError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(parsed.is_err());
        let err: RepovoxError = parsed.unwrap_err().into();
        assert!(matches!(err, RepovoxError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
