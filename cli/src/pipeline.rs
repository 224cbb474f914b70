//! The sign/verify pipelines.
//!
//! Each invocation is self-contained: it opens the store, runs its
//! sequence of blocking steps, and returns a typed error on the first
//! failure. Nothing is shared between invocations, so one payload's
//! failure cannot poison another's.

use glyphstamp_cryptography::{
    envelope::{SIG_END_TAG, SIG_START_TAG},
    handler,
    keypair::generate_key_pair,
    SignatureSpec,
};
use glyphstamp_storage::Store;
use glyphstamp_symbol::{encoder, render, EcLevel};
use rand::rngs::OsRng;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

/// Quiet zone width in modules, the standard border for reliable
/// optical decoding.
pub const QUIET_ZONE: usize = 4;

/// Ascending size tiers: payloads below each byte threshold request the
/// paired square pixel dimension.
const SIZE_TIERS: &[(usize, usize)] = &[(1000, 500), (2000, 800), (3000, 1200)];

/// Pixel dimension requested for payloads past every tier threshold.
const MAX_TIER_DIMENSION: usize = 1500;

/// Errors surfaced by a pipeline invocation. Generation, storage, and
/// rendering failures stay distinguishable so callers can report them
/// independently.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cryptography(#[from] glyphstamp_cryptography::Error),
    #[error(transparent)]
    Storage(#[from] glyphstamp_storage::Error),
    #[error(transparent)]
    Symbol(#[from] glyphstamp_symbol::Error),
    #[error("io failure at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Requested pixel dimension for a payload of `len` bytes.
pub fn target_dimension(len: usize) -> usize {
    for &(threshold, dimension) in SIZE_TIERS {
        if len < threshold {
            return dimension;
        }
    }
    MAX_TIER_DIMENSION
}

fn read_payload(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|err| Error::Io {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Signs the payload file under `name`, renders the signed envelope as
/// a symbol, and persists signature, key pair, and symbol image.
pub fn sign(
    base: &Path,
    spec: &SignatureSpec,
    name: &str,
    payload_path: &Path,
    size_bits: usize,
) -> Result<(), Error> {
    let store = Store::new(base, spec)?;
    let payload = read_payload(payload_path)?;

    // Cache-or-generate: an empty store is a cold-start miss; a
    // populated store with bad files for `name` surfaces as an error.
    // Regenerating over an inconsistent store must be an explicit
    // operator decision, never automatic.
    let keys = match store.get_key_pair(name)? {
        Some(keys) => {
            debug!(name, "loaded key pair from store");
            keys
        }
        None => {
            let keys = generate_key_pair(spec, &mut OsRng, size_bits)?;
            info!(name, size_bits, algorithm = %spec.key_algorithm, "generated key pair");
            keys
        }
    };

    let envelope = handler::sign(spec, &payload, &keys)?;

    // The symbol payload is the message followed by the envelope text,
    // both in their single-byte (latin-1) form.
    let mut symbol_payload = payload.clone();
    symbol_payload.extend_from_slice(SIG_START_TAG.as_bytes());
    symbol_payload.extend_from_slice(envelope.as_bytes());
    symbol_payload.extend_from_slice(SIG_END_TAG.as_bytes());

    let dimension = target_dimension(payload.len());
    let grid = encoder::encode(&symbol_payload, EcLevel::Low)?;
    let raster = render(&grid, dimension, dimension, QUIET_ZONE)?;

    store.save_signature(&envelope, name)?;
    store.save_key_pair(&keys, name)?;
    store.save_symbol(&raster, name)?;

    info!(
        message_bits = payload.len() * 8,
        signature_bits = envelope.size() * 8,
        private_key_der_bytes = keys.private_der().len(),
        public_key_der_bytes = keys.public_der().len(),
        symbol_version = grid.version(),
        symbol_dimension = grid.dimension(),
        raster_width = raster.width(),
        raster_height = raster.height(),
        "signed payload"
    );
    Ok(())
}

/// Verifies the persisted signature for `name` against the payload
/// file. A mismatch is a normal `false`, not an error.
pub fn verify(
    base: &Path,
    spec: &SignatureSpec,
    name: &str,
    payload_path: &Path,
) -> Result<bool, Error> {
    let store = Store::new(base, spec)?;
    let payload = read_payload(payload_path)?;

    let public_der = store.get_public_key(name)?;
    let envelope = store.get_signature(name)?;
    let verified = handler::verify(spec, &envelope, &payload, &public_der)?;

    info!(name, verified, "verification done");
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_tiers_ascend() {
        assert_eq!(target_dimension(0), 500);
        assert_eq!(target_dimension(999), 500);
        assert_eq!(target_dimension(1000), 800);
        assert_eq!(target_dimension(1999), 800);
        assert_eq!(target_dimension(2000), 1200);
        assert_eq!(target_dimension(2999), 1200);
        assert_eq!(target_dimension(3000), 1500);
        assert_eq!(target_dimension(100_000), 1500);
    }
}
