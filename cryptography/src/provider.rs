//! Boundary to the signing primitives backing each algorithm family.
//!
//! Key generation, signing, verification, and key-material validation all
//! funnel through this module; the rest of the crate treats key material
//! as opaque DER blobs. Signature bytes use each scheme's canonical
//! encoding: ASN.1 DER for DSA, fixed-width `r || s` for ECDSA, and the
//! PKCS#1 v1.5 block for RSA.
//!
//! Verification maps an unparseable or mismatched signature to `false`;
//! only key and configuration faults surface as errors.

use crate::{keypair::derive_dsa_domain, spec::KeyAlgorithm, Error};
use elliptic_curve::{
    ops::Reduce, point::AffineCoordinates, Curve, Field, FieldBytes, NonZeroScalar, PrimeField,
    PublicKey, SecretKey,
};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use signature::{
    hazmat::{PrehashSigner, PrehashVerifier},
    DigestSigner, DigestVerifier, SignatureEncoding, Signer, Verifier,
};

/// Signs `payload` with the PKCS#8-encoded private key of `algorithm`.
pub(crate) fn sign(
    algorithm: KeyAlgorithm,
    payload: &[u8],
    private_der: &[u8],
) -> Result<Vec<u8>, Error> {
    match algorithm {
        KeyAlgorithm::Dsa => dsa_sign(payload, private_der),
        KeyAlgorithm::Rsa => rsa_sign(payload, private_der),
        KeyAlgorithm::Ec => ec_sign(payload, private_der),
    }
}

/// Checks `sig` over `payload` against the SPKI-encoded public key of
/// `algorithm`.
pub(crate) fn verify(
    algorithm: KeyAlgorithm,
    sig: &[u8],
    payload: &[u8],
    public_der: &[u8],
) -> Result<bool, Error> {
    match algorithm {
        KeyAlgorithm::Dsa => dsa_verify(sig, payload, public_der),
        KeyAlgorithm::Rsa => rsa_verify(sig, payload, public_der),
        KeyAlgorithm::Ec => ec_verify(sig, payload, public_der),
    }
}

/// Parses a persisted private key blob, failing on malformed material.
pub(crate) fn validate_private_key(
    algorithm: KeyAlgorithm,
    private_der: &[u8],
) -> Result<(), Error> {
    match algorithm {
        KeyAlgorithm::Dsa => {
            dsa::SigningKey::from_pkcs8_der(private_der)
                .map_err(|err| Error::KeyDecode(err.to_string()))?;
        }
        KeyAlgorithm::Rsa => {
            rsa::RsaPrivateKey::from_pkcs8_der(private_der)
                .map_err(|err| Error::KeyDecode(err.to_string()))?;
        }
        KeyAlgorithm::Ec => {
            ec_private_curve(private_der)?;
        }
    }
    Ok(())
}

/// Parses a persisted public key blob, failing on malformed material.
pub(crate) fn validate_public_key(
    algorithm: KeyAlgorithm,
    public_der: &[u8],
) -> Result<(), Error> {
    match algorithm {
        KeyAlgorithm::Dsa => {
            dsa::VerifyingKey::from_public_key_der(public_der)
                .map_err(|err| Error::KeyDecode(err.to_string()))?;
        }
        KeyAlgorithm::Rsa => {
            rsa::RsaPublicKey::from_public_key_der(public_der)
                .map_err(|err| Error::KeyDecode(err.to_string()))?;
        }
        KeyAlgorithm::Ec => {
            ec_public_curve(public_der)?;
        }
    }
    Ok(())
}

/// Generates a DSA key pair. 2048/3072-bit keys use explicitly derived
/// domain parameters; 1024-bit keys use the primitive's own parameter
/// table. Other sizes have no mapping.
pub(crate) fn generate_dsa<R: RngCore + CryptoRng>(
    rng: &mut R,
    size_bits: usize,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let components = match size_bits {
        2048 | 3072 => {
            let domain = derive_dsa_domain(rng, size_bits)?;
            dsa::Components::from_components(domain.prime, domain.sub_prime, domain.base)
                .map_err(|err| {
                    Error::UnsupportedParameter(format!("dsa domain parameters rejected: {err}"))
                })?
        }
        1024 => dsa::Components::generate(rng, dsa::KeySize::DSA_1024_160),
        other => {
            return Err(Error::UnsupportedParameter(format!(
                "no dsa parameter mapping for {other}-bit keys"
            )))
        }
    };
    let signing = dsa::SigningKey::generate(rng, components);
    let verifying = signing.verifying_key().clone();
    encode_keys(&signing, &verifying)
}

/// Generates an RSA key pair of `size_bits`.
pub(crate) fn generate_rsa<R: RngCore + CryptoRng>(
    rng: &mut R,
    size_bits: usize,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let private = rsa::RsaPrivateKey::new(rng, size_bits)
        .map_err(|err| Error::UnsupportedParameter(format!("rsa generation failed: {err}")))?;
    let public = rsa::RsaPublicKey::from(&private);
    encode_keys(&private, &public)
}

/// Generates an EC key pair on the named curve mapped from `size_bits`:
/// 1024 -> P-192, 2048 -> P-224, 3072 -> P-256. Sizes outside the table
/// fail loudly.
pub(crate) fn generate_ec<R: RngCore + CryptoRng>(
    rng: &mut R,
    size_bits: usize,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    match size_bits {
        1024 => {
            let private = SecretKey::<p192::NistP192>::random(rng);
            let public = private.public_key();
            encode_keys(&private, &public)
        }
        2048 => {
            let private = p224::SecretKey::random(rng);
            let public = private.public_key();
            encode_keys(&private, &public)
        }
        3072 => {
            let private = p256::SecretKey::random(rng);
            let public = private.public_key();
            encode_keys(&private, &public)
        }
        other => Err(Error::UnsupportedParameter(format!(
            "no named curve for {other}-bit ec keys"
        ))),
    }
}

fn encode_keys<P: EncodePrivateKey, U: EncodePublicKey>(
    private: &P,
    public: &U,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let private_der = private
        .to_pkcs8_der()
        .map_err(|err| Error::KeyEncode(err.to_string()))?
        .as_bytes()
        .to_vec();
    let public_der = public
        .to_public_key_der()
        .map_err(|err| Error::KeyEncode(err.to_string()))?
        .as_bytes()
        .to_vec();
    Ok((private_der, public_der))
}

fn dsa_sign(payload: &[u8], private_der: &[u8]) -> Result<Vec<u8>, Error> {
    let key = dsa::SigningKey::from_pkcs8_der(private_der)
        .map_err(|err| Error::KeyDecode(err.to_string()))?;
    let sig: dsa::Signature = key
        .try_sign_digest(Sha256::new_with_prefix(payload))
        .map_err(|err| Error::Signing(err.to_string()))?;
    Ok(sig.to_vec())
}

fn dsa_verify(sig: &[u8], payload: &[u8], public_der: &[u8]) -> Result<bool, Error> {
    let key = dsa::VerifyingKey::from_public_key_der(public_der)
        .map_err(|err| Error::VerificationSetup(err.to_string()))?;
    let Ok(sig) = dsa::Signature::try_from(sig) else {
        return Ok(false);
    };
    Ok(key
        .verify_digest(Sha256::new_with_prefix(payload), &sig)
        .is_ok())
}

fn rsa_sign(payload: &[u8], private_der: &[u8]) -> Result<Vec<u8>, Error> {
    let key = rsa::RsaPrivateKey::from_pkcs8_der(private_der)
        .map_err(|err| Error::KeyDecode(err.to_string()))?;
    let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new(key);
    let sig = signer
        .try_sign(payload)
        .map_err(|err| Error::Signing(err.to_string()))?;
    Ok(sig.to_vec())
}

fn rsa_verify(sig: &[u8], payload: &[u8], public_der: &[u8]) -> Result<bool, Error> {
    let key = rsa::RsaPublicKey::from_public_key_der(public_der)
        .map_err(|err| Error::VerificationSetup(err.to_string()))?;
    let verifier = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key);
    let Ok(sig) = rsa::pkcs1v15::Signature::try_from(sig) else {
        return Ok(false);
    };
    Ok(verifier.verify(payload, &sig).is_ok())
}

// The EC algorithm tag does not record which curve a key lives on; the
// pkcs8/spki algorithm parameters do. Probing the supported curves in
// table order lets the OID check in the decoder pick the right one.
//
// The three curves need three different signing entry points. P-256 is
// the only one whose field width matches the SHA-256 output, so only it
// can take the digest API; P-224 signs over the truncated prehash; and
// the `p192` crate ships no signer at all, so P-192 signatures are
// produced in-crate (see [p192_sign]) and checked through its verifier.

fn ec_sign(payload: &[u8], private_der: &[u8]) -> Result<Vec<u8>, Error> {
    let digest = Sha256::digest(payload);
    if let Ok(key) = SecretKey::<p192::NistP192>::from_pkcs8_der(private_der) {
        return p192_sign(&key, &digest);
    }
    if let Ok(key) = p224::SecretKey::from_pkcs8_der(private_der) {
        let signer = p224::ecdsa::SigningKey::from(key);
        let sig: p224::ecdsa::Signature = signer
            .sign_prehash(&digest)
            .map_err(|err| Error::Signing(err.to_string()))?;
        return Ok(sig.to_vec());
    }
    if let Ok(key) = p256::SecretKey::from_pkcs8_der(private_der) {
        let signer = p256::ecdsa::SigningKey::from(key);
        let sig: p256::ecdsa::Signature = signer
            .try_sign_digest(Sha256::new_with_prefix(payload))
            .map_err(|err| Error::Signing(err.to_string()))?;
        return Ok(sig.to_vec());
    }
    Err(Error::KeyDecode(
        "ec private key matches no supported curve".to_string(),
    ))
}

fn ec_verify(sig: &[u8], payload: &[u8], public_der: &[u8]) -> Result<bool, Error> {
    let digest = Sha256::digest(payload);
    if let Ok(key) = PublicKey::<p192::NistP192>::from_public_key_der(public_der) {
        let verifier = p192::ecdsa::VerifyingKey::from(key);
        let Ok(sig) = p192::ecdsa::Signature::from_slice(sig) else {
            return Ok(false);
        };
        return Ok(verifier.verify_prehash(&digest, &sig).is_ok());
    }
    if let Ok(key) = p224::PublicKey::from_public_key_der(public_der) {
        let verifier = p224::ecdsa::VerifyingKey::from(key);
        let Ok(sig) = p224::ecdsa::Signature::from_slice(sig) else {
            return Ok(false);
        };
        return Ok(verifier.verify_prehash(&digest, &sig).is_ok());
    }
    if let Ok(key) = p256::PublicKey::from_public_key_der(public_der) {
        let verifier = p256::ecdsa::VerifyingKey::from(key);
        let Ok(sig) = p256::ecdsa::Signature::from_slice(sig) else {
            return Ok(false);
        };
        return Ok(verifier
            .verify_digest(Sha256::new_with_prefix(payload), &sig)
            .is_ok());
    }
    Err(Error::VerificationSetup(
        "ec public key matches no supported curve".to_string(),
    ))
}

/// Upper bound on ephemeral nonce draws while signing on P-192. A draw
/// is unusable only when r or s reduces to zero, which has negligible
/// probability with a working RNG.
const MAX_NONCE_DRAWS: usize = 64;

/// ECDSA on P-192 with a fresh random nonce per signature.
///
/// The `p192` crate only ships verification, so the signing equation
/// runs here over its curve arithmetic: draw k, compute r from the x
/// coordinate of kG, then s = k^-1 (z + r d), retrying on a zero r or
/// s. The digest is truncated to the leftmost field width before
/// reduction, matching what the verifier does with the prehash.
fn p192_sign(key: &SecretKey<p192::NistP192>, digest: &[u8]) -> Result<Vec<u8>, Error> {
    let d = *key.to_nonzero_scalar().as_ref();
    let z = p192_digest_scalar(digest);
    for _ in 0..MAX_NONCE_DRAWS {
        let k = NonZeroScalar::<p192::NistP192>::random(&mut OsRng);
        let k = *k.as_ref();
        let point = (p192::ProjectivePoint::GENERATOR * k).to_affine();
        let r = p192_reduce(&point.x());
        let Some(k_inv) = Option::<p192::Scalar>::from(k.invert()) else {
            continue;
        };
        let s = k_inv * (z + r * d);
        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            continue;
        }
        let sig = p192::ecdsa::Signature::from_scalars(r.to_repr(), s.to_repr())
            .map_err(|err| Error::Signing(err.to_string()))?;
        return Ok(sig.to_vec());
    }
    Err(Error::Signing(format!(
        "no usable nonce within {MAX_NONCE_DRAWS} draws"
    )))
}

fn p192_reduce(bytes: &FieldBytes<p192::NistP192>) -> p192::Scalar {
    <p192::Scalar as Reduce<<p192::NistP192 as Curve>::Uint>>::reduce_bytes(bytes)
}

fn p192_digest_scalar(digest: &[u8]) -> p192::Scalar {
    let mut bytes = FieldBytes::<p192::NistP192>::default();
    let take = bytes.len().min(digest.len());
    bytes[..take].copy_from_slice(&digest[..take]);
    p192_reduce(&bytes)
}

fn ec_private_curve(private_der: &[u8]) -> Result<(), Error> {
    if SecretKey::<p192::NistP192>::from_pkcs8_der(private_der).is_ok()
        || p224::SecretKey::from_pkcs8_der(private_der).is_ok()
        || p256::SecretKey::from_pkcs8_der(private_der).is_ok()
    {
        return Ok(());
    }
    Err(Error::KeyDecode(
        "ec private key matches no supported curve".to_string(),
    ))
}

fn ec_public_curve(public_der: &[u8]) -> Result<(), Error> {
    if PublicKey::<p192::NistP192>::from_public_key_der(public_der).is_ok()
        || p224::PublicKey::from_public_key_der(public_der).is_ok()
        || p256::PublicKey::from_public_key_der(public_der).is_ok()
    {
        return Ok(());
    }
    Err(Error::KeyDecode(
        "ec public key matches no supported curve".to_string(),
    ))
}
