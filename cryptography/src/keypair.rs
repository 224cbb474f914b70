//! Key-pair generation with algorithm-specific parameter derivation.
//!
//! Generation is a stateless function of the [SignatureSpec] and the
//! caller's RNG; nothing is cached or shared between calls, and nothing
//! is persisted (persistence belongs to the caller).

use crate::{
    provider,
    spec::{KeyAlgorithm, SignatureSpec},
    Error,
};
use num_bigint_dig::{BigUint, RandBigInt, RandPrime};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};

/// Default key length in bits.
pub const DEFAULT_KEY_BITS: usize = 1024;

/// Upper bound on sub-prime draws during DSA domain derivation. A
/// coprime draw almost surely succeeds immediately; hitting the cap
/// indicates a broken RNG and is reported instead of looping forever.
pub const MAX_SUBPRIME_DRAWS: usize = 10_000;

/// An asymmetric key pair held as opaque DER blobs (PKCS#8 private key,
/// SPKI public key) tagged with the generating algorithm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    algorithm: KeyAlgorithm,
    private_der: Vec<u8>,
    public_der: Vec<u8>,
}

impl KeyPair {
    /// Reassembles a key pair from persisted DER blobs, validating both
    /// against the expected algorithm.
    pub fn from_der(
        algorithm: KeyAlgorithm,
        private_der: Vec<u8>,
        public_der: Vec<u8>,
    ) -> Result<Self, Error> {
        provider::validate_private_key(algorithm, &private_der)?;
        provider::validate_public_key(algorithm, &public_der)?;
        Ok(Self {
            algorithm,
            private_der,
            public_der,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn private_der(&self) -> &[u8] {
        &self.private_der
    }

    pub fn public_der(&self) -> &[u8] {
        &self.public_der
    }
}

/// Validates a persisted PKCS#8 private key blob for `algorithm`.
pub fn validate_private_key(algorithm: KeyAlgorithm, private_der: &[u8]) -> Result<(), Error> {
    provider::validate_private_key(algorithm, private_der)
}

/// Validates a persisted SPKI public key blob for `algorithm`.
pub fn validate_public_key(algorithm: KeyAlgorithm, public_der: &[u8]) -> Result<(), Error> {
    provider::validate_public_key(algorithm, public_der)
}

/// Generates a key pair at the default length of [DEFAULT_KEY_BITS].
pub fn generate_default_key_pair<R: RngCore + CryptoRng>(
    spec: &SignatureSpec,
    rng: &mut R,
) -> Result<KeyPair, Error> {
    generate_key_pair(spec, rng, DEFAULT_KEY_BITS)
}

/// Generates a key pair for the spec's key algorithm at `size_bits`.
///
/// Parameter handling is algorithm-specific:
/// - DSA at 2048/3072 bits derives explicit domain parameters (see
///   [derive_dsa_domain]); 1024 bits uses the primitive's own
///   size-to-parameter mapping; other sizes have no mapping.
/// - RSA initializes directly with `size_bits`.
/// - EC maps `size_bits` to a named curve (1024 -> P-192, 2048 -> P-224,
///   3072 -> P-256) and rejects sizes outside the table.
pub fn generate_key_pair<R: RngCore + CryptoRng>(
    spec: &SignatureSpec,
    rng: &mut R,
    size_bits: usize,
) -> Result<KeyPair, Error> {
    let (private_der, public_der) = match spec.key_algorithm {
        KeyAlgorithm::Dsa => provider::generate_dsa(rng, size_bits)?,
        KeyAlgorithm::Rsa => provider::generate_rsa(rng, size_bits)?,
        KeyAlgorithm::Ec => provider::generate_ec(rng, size_bits)?,
    };
    Ok(KeyPair {
        algorithm: spec.key_algorithm,
        private_der,
        public_der,
    })
}

/// Explicit DSA domain parameters: prime modulus, sub-group order, and
/// base.
#[derive(Clone, Debug)]
pub struct DsaDomain {
    pub prime: BigUint,
    pub sub_prime: BigUint,
    pub base: BigUint,
}

/// Derives DSA domain parameters for 2048- or 3072-bit keys: a random
/// prime of `size_bits`, a sub-group order of 224 (2048) or 256 (3072)
/// bits redrawn until it is coprime with the prime, and a random base of
/// the same width as the sub-group order.
///
/// The redraw loop is capped at [MAX_SUBPRIME_DRAWS]; reaching the cap
/// has negligible probability with a working RNG and is surfaced as an
/// error rather than looping unbounded.
pub fn derive_dsa_domain<R: RngCore + CryptoRng>(
    rng: &mut R,
    size_bits: usize,
) -> Result<DsaDomain, Error> {
    let sub_bits = match size_bits {
        2048 => 224,
        3072 => 256,
        other => {
            return Err(Error::UnsupportedParameter(format!(
                "no dsa domain derivation for {other}-bit keys"
            )))
        }
    };

    let prime = rng.gen_prime(size_bits);
    let base = rng.gen_biguint(sub_bits);

    let mut draws = 0;
    let sub_prime = loop {
        // Force the top bit so the sub-group order has the mandated width.
        let candidate = rng.gen_biguint(sub_bits) | (BigUint::one() << (sub_bits - 1));
        if prime.gcd(&candidate).is_one() {
            break candidate;
        }
        draws += 1;
        if draws >= MAX_SUBPRIME_DRAWS {
            return Err(Error::UnsupportedParameter(format!(
                "no coprime sub-group order found within {MAX_SUBPRIME_DRAWS} draws"
            )));
        }
    };

    Ok(DsaDomain {
        prime,
        sub_prime,
        base,
    })
}
