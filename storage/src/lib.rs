//! Persist keys, signatures, and rendered symbols under a deterministic
//! naming scheme.
//!
//! Every artifact name is a pure function of the caller's logical name
//! and the lower-cased key algorithm captured when the [Store] is
//! constructed: private keys live at `keys/{name}-{alg}`, public keys at
//! `keys/{name}-{alg}.pub`, signatures at
//! `signatures/{name}-{alg}-sign.sig`, and symbol images at
//! `symbols/QRCode-{name}.png`. Reconfiguring the algorithm after
//! artifacts exist silently orphans them; nothing detects that.
//!
//! All I/O is blocking and writes are direct (no atomic rename or
//! fsync), so an abrupt abort can leave a partial file. There is no
//! internal locking either: concurrent writers to the same logical name
//! race, and callers are expected to serialize them.

use glyphstamp_cryptography::{
    keypair::{validate_private_key, validate_public_key},
    KeyAlgorithm, KeyPair, SignatureEnvelope, SignatureSpec,
};
use glyphstamp_symbol::PixelRaster;
use image::{GrayImage, Luma};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Subdirectory holding key files.
pub const KEY_DIR: &str = "keys";
/// Subdirectory holding signature files.
pub const SIGN_DIR: &str = "signatures";
/// Subdirectory holding rendered symbol images.
pub const SYMBOL_DIR: &str = "symbols";

/// Errors that can occur when interacting with a [Store].
#[derive(Debug, Error)]
pub enum Error {
    #[error("io failure at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("malformed key material for '{name}': {detail}")]
    KeyDecode { name: String, detail: String },
    #[error("symbol image write failed at '{path}': {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Durable storage for keys, signatures, and rendered symbols.
pub struct Store {
    base: PathBuf,
    algorithm: KeyAlgorithm,
}

impl Store {
    /// Opens a store rooted at `base`, creating the three artifact
    /// subdirectories if any is missing. Bootstrapping is idempotent.
    pub fn new(base: impl Into<PathBuf>, spec: &SignatureSpec) -> Result<Self, Error> {
        let base = base.into();
        for dir in [KEY_DIR, SIGN_DIR, SYMBOL_DIR] {
            let path = base.join(dir);
            fs::create_dir_all(&path).map_err(|err| io_err(&path, err))?;
        }
        Ok(Self {
            base,
            algorithm: spec.key_algorithm,
        })
    }

    /// Path of the private key file for `name`.
    pub fn private_key_path(&self, name: &str) -> PathBuf {
        self.base
            .join(KEY_DIR)
            .join(format!("{name}-{}", self.algorithm.token()))
    }

    /// Path of the public key file for `name`.
    pub fn public_key_path(&self, name: &str) -> PathBuf {
        self.base
            .join(KEY_DIR)
            .join(format!("{name}-{}.pub", self.algorithm.token()))
    }

    /// Path of the signature file for `name`.
    pub fn signature_path(&self, name: &str) -> PathBuf {
        self.base
            .join(SIGN_DIR)
            .join(format!("{name}-{}-sign.sig", self.algorithm.token()))
    }

    /// Path of the rendered symbol image for `name`.
    pub fn symbol_path(&self, name: &str) -> PathBuf {
        self.base.join(SYMBOL_DIR).join(format!("QRCode-{name}.png"))
    }

    /// Reads a file's full contents.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>, Error> {
        fs::read(path).map_err(|err| io_err(path, err))
    }

    /// Writes `data` to a file, replacing any previous contents.
    pub fn write_file(&self, data: &[u8], path: &Path) -> Result<(), Error> {
        fs::write(path, data).map_err(|err| io_err(path, err))
    }

    /// Loads and validates the public key stored for `name`.
    pub fn get_public_key(&self, name: &str) -> Result<Vec<u8>, Error> {
        let der = self.read_file(&self.public_key_path(name))?;
        validate_public_key(self.algorithm, &der).map_err(|err| Error::KeyDecode {
            name: name.to_string(),
            detail: err.to_string(),
        })?;
        Ok(der)
    }

    /// Loads and validates the private key stored for `name`.
    pub fn get_private_key(&self, name: &str) -> Result<Vec<u8>, Error> {
        let der = self.read_file(&self.private_key_path(name))?;
        validate_private_key(self.algorithm, &der).map_err(|err| Error::KeyDecode {
            name: name.to_string(),
            detail: err.to_string(),
        })?;
        Ok(der)
    }

    /// Loads the key pair stored for `name`.
    ///
    /// An empty key directory is a cold-start cache miss and returns
    /// `None`. A non-empty directory where either file of `name` is
    /// missing or undecodable is an inconsistent store and returns an
    /// error; callers must not treat that as absence.
    pub fn get_key_pair(&self, name: &str) -> Result<Option<KeyPair>, Error> {
        if is_dir_empty(&self.base.join(KEY_DIR))? {
            return Ok(None);
        }

        let decode_err = |err: String| Error::KeyDecode {
            name: name.to_string(),
            detail: err,
        };
        let private_der =
            fs::read(self.private_key_path(name)).map_err(|err| decode_err(err.to_string()))?;
        let public_der =
            fs::read(self.public_key_path(name)).map_err(|err| decode_err(err.to_string()))?;
        let pair = KeyPair::from_der(self.algorithm, private_der, public_der)
            .map_err(|err| decode_err(err.to_string()))?;
        Ok(Some(pair))
    }

    /// Persists both halves of a key pair under `name`.
    pub fn save_key_pair(&self, pair: &KeyPair, name: &str) -> Result<(), Error> {
        self.save_private_key(pair.private_der(), name)?;
        self.save_public_key(pair.public_der(), name)
    }

    /// Persists a PKCS#8 private key blob under `name`.
    pub fn save_private_key(&self, der: &[u8], name: &str) -> Result<(), Error> {
        self.write_file(der, &self.private_key_path(name))
    }

    /// Persists an SPKI public key blob under `name`.
    pub fn save_public_key(&self, der: &[u8], name: &str) -> Result<(), Error> {
        self.write_file(der, &self.public_key_path(name))
    }

    /// Loads the signature stored for `name`.
    pub fn get_signature(&self, name: &str) -> Result<SignatureEnvelope, Error> {
        let data = self.read_file(&self.signature_path(name))?;
        Ok(SignatureEnvelope::new(&data))
    }

    /// Persists a signature envelope under `name`.
    pub fn save_signature(&self, envelope: &SignatureEnvelope, name: &str) -> Result<(), Error> {
        self.write_file(envelope.as_bytes(), &self.signature_path(name))
    }

    /// Whether a signature file for `name` exists (case-insensitive
    /// substring scan over the signature directory).
    pub fn signature_exists(&self, name: &str) -> Result<bool, Error> {
        let dir = self.base.join(SIGN_DIR);
        if is_dir_empty(&dir)? {
            return Ok(false);
        }

        let pattern = format!("{name}-{}-sign", self.algorithm.token()).to_lowercase();
        let entries = fs::read_dir(&dir).map_err(|err| io_err(&dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| io_err(&dir, err))?;
            let file_name = entry.file_name().to_string_lossy().to_lowercase();
            if file_name.contains(&pattern) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Renders a pixel raster to a PNG under `name` (dark pixels black,
    /// light pixels white).
    pub fn save_symbol(&self, raster: &PixelRaster, name: &str) -> Result<(), Error> {
        let image = GrayImage::from_fn(raster.width() as u32, raster.height() as u32, |x, y| {
            if raster.get(x as usize, y as usize) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });
        let path = self.symbol_path(name);
        image.save(&path).map_err(|err| Error::Image {
            path: path.clone(),
            source: err,
        })
    }
}

/// Checks that `path` is a directory and whether it holds any entries.
fn is_dir_empty(path: &Path) -> Result<bool, Error> {
    if !path.is_dir() {
        return Err(Error::NotADirectory(path.to_path_buf()));
    }
    let mut entries = fs::read_dir(path).map_err(|err| io_err(path, err))?;
    Ok(entries.next().is_none())
}
