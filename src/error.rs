use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Threshold angles must lie within [0, 180] degrees")]
    AngleOutOfRange,

    #[error("Contracted angle {contracted} must be below extended angle {extended}")]
    InvertedAngles { contracted: f32, extended: f32 },

    #[error("Invalid duration for {name}: {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("Visibility threshold must lie within [0, 1], got {0}")]
    InvalidVisibility(f32),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read pose frames: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed pose frame on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write rep event: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode rep event: {0}")]
    Encode(#[from] serde_json::Error),
}
