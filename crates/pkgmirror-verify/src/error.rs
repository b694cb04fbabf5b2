#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("invalid {algorithm} digest {value:?}")]
    InvalidDigest {
        algorithm: &'static str,
        value:     String,
    },
}

pub type Result<T> = std::result::Result<T, VerificationError>;
