//! Adapter over the external symbol encoder.
//!
//! The data-to-module transformation (segmentation, masking, error
//! correction) is consumed as a black box from the `qrcode` crate; this
//! module only translates between its types and [ModuleGrid].

use crate::{EcLevel, Error, ModuleGrid};
use qrcode::{Color, QrCode, Version};

/// Encodes `payload` into a module grid at the requested
/// error-correction level.
pub fn encode(payload: &[u8], ec_level: EcLevel) -> Result<ModuleGrid, Error> {
    let level = match ec_level {
        EcLevel::Low => qrcode::EcLevel::L,
        EcLevel::Medium => qrcode::EcLevel::M,
        EcLevel::Quartile => qrcode::EcLevel::Q,
        EcLevel::High => qrcode::EcLevel::H,
    };
    let code = QrCode::with_error_correction_level(payload, level)?;

    let width = code.width();
    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };
    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == Color::Dark)
        .collect();
    ModuleGrid::new(width, width, modules, ec_level, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_square_grid() {
        let grid = encode(b"hello", EcLevel::Low).unwrap();
        assert_eq!(grid.width(), grid.height());
        assert_eq!(grid.dimension(), grid.width());
        // Version 1 symbols are 21 modules on a side; a five-byte
        // payload fits in version 1 at level L.
        assert_eq!(grid.version(), 1);
        assert_eq!(grid.width(), 21);
        assert_eq!(grid.ec_level(), EcLevel::Low);
    }

    #[test]
    fn test_encode_has_dark_and_light_modules() {
        let grid = encode(b"hello", EcLevel::Low).unwrap();
        let dark = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.get(x, y))
            .count();
        assert!(dark > 0);
        assert!(dark < grid.width() * grid.height());
    }

    #[test]
    fn test_longer_payload_needs_larger_version() {
        let short = encode(b"hello", EcLevel::Low).unwrap();
        let long = encode(&[b'a'; 500], EcLevel::Low).unwrap();
        assert!(long.version() > short.version());
        assert!(long.dimension() > short.dimension());
    }

    #[test]
    fn test_oversized_payload_fails() {
        // Version 40 at level L caps out below 3000 bytes.
        let payload = vec![b'a'; 4000];
        assert!(matches!(
            encode(&payload, EcLevel::Low),
            Err(Error::Encoding(_))
        ));
    }
}
