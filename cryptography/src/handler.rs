//! Signing, verification, and the textual envelope protocol.

use crate::{
    envelope::{SignatureEnvelope, SIG_END_TAG, SIG_START_TAG},
    keypair::KeyPair,
    provider,
    spec::SignatureSpec,
    Error,
};

/// Signs `payload` with the key pair's private key under `spec`.
pub fn sign(
    spec: &SignatureSpec,
    payload: &[u8],
    keys: &KeyPair,
) -> Result<SignatureEnvelope, Error> {
    if keys.algorithm() != spec.key_algorithm {
        return Err(Error::Configuration(format!(
            "key pair algorithm {} does not match spec {}",
            keys.algorithm(),
            spec.key_algorithm
        )));
    }
    let sig = provider::sign(spec.key_algorithm, payload, keys.private_der())?;
    Ok(SignatureEnvelope::new(&sig))
}

/// Checks the envelope's signature over `payload` against an SPKI-encoded
/// public key.
///
/// A signature that does not match (including one whose bytes do not
/// parse as the scheme's encoding) yields `Ok(false)`; only key or
/// configuration faults are errors.
pub fn verify(
    spec: &SignatureSpec,
    envelope: &SignatureEnvelope,
    payload: &[u8],
    public_der: &[u8],
) -> Result<bool, Error> {
    provider::verify(spec.key_algorithm, envelope.as_bytes(), payload, public_der)
}

/// Splits tagged text into message and signature text.
///
/// Without a start tag the whole text is the message. With one, the
/// signature text runs from the first start tag to the first end tag
/// after it (or to the end of the text if the end tag is missing). The
/// framing has no escaping, so a message that itself contains a
/// delimiter is split at that delimiter; callers embedding arbitrary
/// text accept that ambiguity.
pub fn extract_content(text: &str) -> (String, Option<String>) {
    match text.split_once(SIG_START_TAG) {
        None => (text.to_string(), None),
        Some((message, rest)) => {
            let signature_text = match rest.split_once(SIG_END_TAG) {
                Some((signature_text, _)) => signature_text,
                None => rest,
            };
            (message.to_string(), Some(signature_text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        envelope::string_to_latin1,
        keypair::{generate_default_key_pair, generate_key_pair},
        spec::KeyAlgorithm,
    };
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    #[test_case(KeyAlgorithm::Dsa)]
    #[test_case(KeyAlgorithm::Rsa)]
    #[test_case(KeyAlgorithm::Ec)]
    fn test_sign_verify_round_trip(algorithm: KeyAlgorithm) {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = SignatureSpec::sha256(algorithm);
        let keys = generate_default_key_pair(&spec, &mut rng).unwrap();

        let payload = b"the quick brown fox jumps over the lazy dog";
        let envelope = sign(&spec, payload, &keys).unwrap();
        assert!(verify(&spec, &envelope, payload, keys.public_der()).unwrap());
    }

    #[test_case(KeyAlgorithm::Dsa)]
    #[test_case(KeyAlgorithm::Rsa)]
    #[test_case(KeyAlgorithm::Ec)]
    fn test_flipped_bit_verifies_false(algorithm: KeyAlgorithm) {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = SignatureSpec::sha256(algorithm);
        let keys = generate_default_key_pair(&spec, &mut rng).unwrap();

        let payload = b"hello";
        let envelope = sign(&spec, payload, &keys).unwrap();

        let mut tampered = envelope.get();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        let tampered = SignatureEnvelope::new(&tampered);

        // A mismatch is a false result, never an error.
        assert!(!verify(&spec, &tampered, payload, keys.public_der()).unwrap());
    }

    #[test_case(2048)]
    #[test_case(3072)]
    fn test_ec_larger_curves_round_trip(size_bits: usize) {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = SignatureSpec::sha256(KeyAlgorithm::Ec);
        let keys = generate_key_pair(&spec, &mut rng, size_bits).unwrap();

        let payload = b"payload";
        let envelope = sign(&spec, payload, &keys).unwrap();
        assert!(verify(&spec, &envelope, payload, keys.public_der()).unwrap());
    }

    #[test]
    fn test_default_curve_repeat_signatures_both_verify() {
        // The P-192 signer draws a fresh nonce per signature, so two
        // signatures over the same payload differ but both verify.
        let mut rng = StdRng::seed_from_u64(42);
        let spec = SignatureSpec::sha256(KeyAlgorithm::Ec);
        let keys = generate_default_key_pair(&spec, &mut rng).unwrap();

        let payload = b"hello";
        let first = sign(&spec, payload, &keys).unwrap();
        let second = sign(&spec, payload, &keys).unwrap();
        assert!(verify(&spec, &first, payload, keys.public_der()).unwrap());
        assert!(verify(&spec, &second, payload, keys.public_der()).unwrap());
    }

    #[test]
    fn test_wrong_key_verifies_false() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = SignatureSpec::sha256(KeyAlgorithm::Ec);
        let keys = generate_default_key_pair(&spec, &mut rng).unwrap();
        let other = generate_default_key_pair(&spec, &mut rng).unwrap();

        let payload = b"hello";
        let envelope = sign(&spec, payload, &keys).unwrap();
        assert!(!verify(&spec, &envelope, payload, other.public_der()).unwrap());
    }

    #[test]
    fn test_sign_rejects_mismatched_key_pair() {
        let mut rng = StdRng::seed_from_u64(42);
        let ec = SignatureSpec::sha256(KeyAlgorithm::Ec);
        let keys = generate_default_key_pair(&ec, &mut rng).unwrap();

        let rsa = SignatureSpec::sha256(KeyAlgorithm::Rsa);
        assert!(matches!(
            sign(&rsa, b"hello", &keys),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_extract_without_start_tag() {
        let (message, signature_text) = extract_content("just a message");
        assert_eq!(message, "just a message");
        assert!(signature_text.is_none());
    }

    #[test]
    fn test_extract_splits_at_first_end_tag() {
        let (message, signature_text) = extract_content("msg<ds>sig</ds>trailing</ds>");
        assert_eq!(message, "msg");
        assert_eq!(signature_text.as_deref(), Some("sig"));
    }

    #[test]
    fn test_extract_with_missing_end_tag_runs_to_end() {
        let (message, signature_text) = extract_content("msg<ds>sig");
        assert_eq!(message, "msg");
        assert_eq!(signature_text.as_deref(), Some("sig"));
    }

    #[test]
    fn test_envelope_round_trip_through_extraction() {
        // Any byte sequence free of the literal delimiters survives the
        // text round trip bit-for-bit.
        let raw: Vec<u8> = (0..=255).collect();
        let envelope = SignatureEnvelope::new(&raw);
        let text = format!("message body{}", envelope.to_text());

        let (message, signature_text) = extract_content(&text);
        assert_eq!(message, "message body");
        let recovered = string_to_latin1(&signature_text.unwrap()).unwrap();
        assert_eq!(recovered, raw);
    }
}
