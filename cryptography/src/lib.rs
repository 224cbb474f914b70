//! Generate algorithm-tagged key pairs, sign arbitrary payloads, and frame
//! signatures in a delimited text envelope.
//!
//! The crate is organized around an explicit [SignatureSpec] value (key
//! algorithm, signature algorithm, implementation provider) that is passed
//! into every operation. There is intentionally no process-wide
//! configuration: two concurrent callers with different specs cannot
//! interfere with each other.
//!
//! Key material crosses every boundary as opaque DER blobs (PKCS#8 for
//! private keys, SPKI for public keys), so callers can persist and reload
//! keys without knowing anything about the underlying scheme.

mod error;
pub use error::Error;
pub mod envelope;
pub use envelope::SignatureEnvelope;
pub mod handler;
pub mod keypair;
pub use keypair::KeyPair;
mod provider;
pub mod spec;
pub use spec::{KeyAlgorithm, Provider, SignAlgorithm, SignatureSpec};
