use thiserror::Error;

/// Errors surfaced at configuration and loading boundaries. Block synthesis
/// itself never fails.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("fade time must be non-negative and finite, got {0}")]
    InvalidFadeTime(f64),

    #[error("noise cutoff must be a positive frequency, got {0}")]
    InvalidNoiseCutoff(f64),

    #[error("failed to read partial data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed partial data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SynthResult<T> = Result<T, SynthError>;
