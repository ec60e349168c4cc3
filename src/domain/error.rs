//! Domain error types.

/// Top-level error type for quant-engine.
///
/// Every kind is fatal for the run that raised it: nothing is retried and no
/// partial equity curve is returned.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no data for {instrument}: {reason}")]
    DataUnavailable { instrument: String, reason: String },

    #[error("malformed price series for {instrument}: {reason}")]
    MalformedSeries { instrument: String, reason: String },

    #[error("invalid configuration {key}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    #[error("invalid price {price}: prices must be positive")]
    InvalidPrice { price: f64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn data_unavailable(instrument: &str, reason: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            instrument: instrument.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(key: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::InvalidConfiguration { .. } => 2,
            EngineError::DataUnavailable { .. } | EngineError::MalformedSeries { .. } => 3,
            EngineError::InvalidPrice { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
