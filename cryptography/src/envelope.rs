//! The signature envelope and the latin-1 codec used to embed raw
//! signature bytes in symbol text.
//!
//! An envelope's text form is `<ds>` + the signature bytes reinterpreted
//! as ISO-8859-1 text + `</ds>`. Because every byte value maps to exactly
//! one code point below U+0100, the reinterpretation is lossless in both
//! directions.

use crate::Error;

/// Start delimiter of the signature section of a tagged text.
pub const SIG_START_TAG: &str = "<ds>";
/// End delimiter of the signature section of a tagged text.
pub const SIG_END_TAG: &str = "</ds>";

/// Raw signature bytes, immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEnvelope {
    data: Vec<u8>,
}

impl SignatureEnvelope {
    /// Wraps a copy of `sign`.
    pub fn new(sign: &[u8]) -> Self {
        Self {
            data: sign.to_vec(),
        }
    }

    /// Copies the raw signature bytes out.
    pub fn get(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Borrows the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Signature length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Delimited text form of the envelope.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(
            SIG_START_TAG.len() + self.data.len() + SIG_END_TAG.len(),
        );
        text.push_str(SIG_START_TAG);
        text.push_str(&latin1_to_string(&self.data));
        text.push_str(SIG_END_TAG);
        text
    }

    /// Rebuilds an envelope from the latin-1 text between the delimiters.
    pub fn from_text(signature_text: &str) -> Result<Self, Error> {
        Ok(Self {
            data: string_to_latin1(signature_text)?,
        })
    }
}

/// Reinterprets bytes as text, one character per byte.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of [latin1_to_string]. Code points above U+00FF have no
/// single-byte representation and are rejected.
pub fn string_to_latin1(text: &str) -> Result<Vec<u8>, Error> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Error::Charset(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_round_trip_all_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = latin1_to_string(&bytes);
        assert_eq!(string_to_latin1(&text).unwrap(), bytes);
    }

    #[test]
    fn test_latin1_rejects_wide_characters() {
        assert!(matches!(
            string_to_latin1("signature \u{2713}"),
            Err(Error::Charset('\u{2713}'))
        ));
    }

    #[test]
    fn test_text_form_is_delimited() {
        let envelope = SignatureEnvelope::new(b"abc");
        assert_eq!(envelope.to_text(), "<ds>abc</ds>");
    }

    #[test]
    fn test_defensive_copies() {
        let mut sign = vec![1u8, 2, 3];
        let envelope = SignatureEnvelope::new(&sign);
        sign[0] = 9;
        assert_eq!(envelope.get(), vec![1, 2, 3]);

        let mut copy = envelope.get();
        copy[1] = 9;
        assert_eq!(envelope.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_from_text_round_trip() {
        let bytes: Vec<u8> = (0..=255).rev().collect();
        let envelope = SignatureEnvelope::new(&bytes);
        let text = envelope.to_text();
        let inner = text
            .strip_prefix(SIG_START_TAG)
            .unwrap()
            .strip_suffix(SIG_END_TAG)
            .unwrap();
        assert_eq!(SignatureEnvelope::from_text(inner).unwrap(), envelope);
    }
}
