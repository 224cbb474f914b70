//! The algorithm triple that parameterizes every operation.
//!
//! A [SignatureSpec] is a plain value: construct one, hand it to the
//! components that need it. Consistency between the key algorithm and
//! the signature algorithm is checked at construction, so a spec that
//! exists is always usable.

use crate::Error;
use std::{fmt, str::FromStr};

/// Asymmetric key algorithm family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Dsa,
    Rsa,
    Ec,
}

impl KeyAlgorithm {
    /// Lower-cased token keyed into every persisted artifact name.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Dsa => "dsa",
            Self::Rsa => "rsa",
            Self::Ec => "ec",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dsa" => Ok(Self::Dsa),
            "rsa" => Ok(Self::Rsa),
            "ec" => Ok(Self::Ec),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Signature algorithm (digest + scheme pairing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignAlgorithm {
    Sha256Dsa,
    Sha256Rsa,
    Sha256Ecdsa,
}

impl SignAlgorithm {
    /// The key algorithm family this signature algorithm operates on.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Sha256Dsa => KeyAlgorithm::Dsa,
            Self::Sha256Rsa => KeyAlgorithm::Rsa,
            Self::Sha256Ecdsa => KeyAlgorithm::Ec,
        }
    }
}

impl fmt::Display for SignAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sha256Dsa => "sha256-with-dsa",
            Self::Sha256Rsa => "sha256-with-rsa",
            Self::Sha256Ecdsa => "sha256-with-ecdsa",
        };
        f.write_str(name)
    }
}

impl FromStr for SignAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256-with-dsa" => Ok(Self::Sha256Dsa),
            "sha256-with-rsa" => Ok(Self::Sha256Rsa),
            "sha256-with-ecdsa" => Ok(Self::Sha256Ecdsa),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Implementation provider backing the signing primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    RustCrypto,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RustCrypto => f.write_str("rustcrypto"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rustcrypto" => Ok(Self::RustCrypto),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The {key algorithm, signature algorithm, provider} triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureSpec {
    pub key_algorithm: KeyAlgorithm,
    pub sign_algorithm: SignAlgorithm,
    pub provider: Provider,
}

impl SignatureSpec {
    /// Builds a spec, rejecting a signature algorithm whose family does
    /// not match the key algorithm.
    pub fn new(
        key_algorithm: KeyAlgorithm,
        sign_algorithm: SignAlgorithm,
        provider: Provider,
    ) -> Result<Self, Error> {
        if sign_algorithm.key_algorithm() != key_algorithm {
            return Err(Error::Configuration(format!(
                "signature algorithm {sign_algorithm} does not operate on {key_algorithm} keys"
            )));
        }
        Ok(Self {
            key_algorithm,
            sign_algorithm,
            provider,
        })
    }

    /// Convenience constructor: the SHA-256 signature algorithm for
    /// `key_algorithm`, consistent by construction.
    pub fn sha256(key_algorithm: KeyAlgorithm) -> Self {
        let sign_algorithm = match key_algorithm {
            KeyAlgorithm::Dsa => SignAlgorithm::Sha256Dsa,
            KeyAlgorithm::Rsa => SignAlgorithm::Sha256Rsa,
            KeyAlgorithm::Ec => SignAlgorithm::Sha256Ecdsa,
        };
        Self {
            key_algorithm,
            sign_algorithm,
            provider: Provider::RustCrypto,
        }
    }
}

impl fmt::Display for SignatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.key_algorithm, self.sign_algorithm, self.provider
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for algorithm in [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa, KeyAlgorithm::Ec] {
            assert_eq!(
                algorithm.to_string().parse::<KeyAlgorithm>().unwrap(),
                algorithm
            );
        }
        for algorithm in [
            SignAlgorithm::Sha256Dsa,
            SignAlgorithm::Sha256Rsa,
            SignAlgorithm::Sha256Ecdsa,
        ] {
            assert_eq!(
                algorithm.to_string().parse::<SignAlgorithm>().unwrap(),
                algorithm
            );
        }
        assert_eq!(
            "rustcrypto".parse::<Provider>().unwrap(),
            Provider::RustCrypto
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("DSA".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Dsa);
        assert_eq!(
            "SHA256-WITH-ECDSA".parse::<SignAlgorithm>().unwrap(),
            SignAlgorithm::Sha256Ecdsa
        );
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(matches!(
            "ed25519".parse::<KeyAlgorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            "openssl".parse::<Provider>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_mismatched_families_rejected() {
        let result = SignatureSpec::new(
            KeyAlgorithm::Dsa,
            SignAlgorithm::Sha256Rsa,
            Provider::RustCrypto,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_sha256_constructor_consistent() {
        for algorithm in [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa, KeyAlgorithm::Ec] {
            let spec = SignatureSpec::sha256(algorithm);
            assert_eq!(spec.sign_algorithm.key_algorithm(), algorithm);
        }
    }
}
