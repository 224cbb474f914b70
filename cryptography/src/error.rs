use thiserror::Error;

/// Errors that can occur when generating keys, signing payloads, or
/// verifying signatures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("inconsistent signature spec: {0}")]
    Configuration(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("unsupported parameter: {0}")]
    UnsupportedParameter(String),
    #[error("malformed key material: {0}")]
    KeyDecode(String),
    #[error("key encoding failed: {0}")]
    KeyEncode(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("verification setup failed: {0}")]
    VerificationSetup(String),
    #[error("character is not representable in latin-1: {0:?}")]
    Charset(char),
}
