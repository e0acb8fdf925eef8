//! Payload encoding
//!
//! Turns a [`SessionRecord`] into an [`EncryptedPayload`] right before it is
//! handed to the transport. Two schemes exist:
//!
//! - `simulation-base64`: base64 over the record's JSON. Not encryption; only
//!   accepted outside production.
//! - `aes-256-gcm`: authenticated encryption with a key derived from the
//!   configured device key. Output is `base64(nonce || ciphertext)`.

use crate::config::{EncryptionAlgorithm, EncryptionConfig};
use crate::domain::{EncryptedPayload, QuickScanError, Result, SessionRecord};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

const NONCE_LEN: usize = 12;

/// Encodes a session record for transmission
pub trait PayloadEncoder: Send + Sync {
    /// Name carried in the payload's `algorithm` field
    fn algorithm(&self) -> &'static str;

    /// Encode one record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or encrypted.
    fn encode(&self, record: &SessionRecord) -> Result<EncryptedPayload>;
}

/// Build the encoder selected by the configuration
///
/// # Errors
///
/// Returns a configuration error when `aes-256-gcm` is selected without a key.
pub fn encoder_from_config(config: &EncryptionConfig) -> Result<Arc<dyn PayloadEncoder>> {
    match config.algorithm {
        EncryptionAlgorithm::SimulationBase64 => {
            tracing::warn!(
                "Using simulation-base64 payload encoding; records are NOT encrypted in transit"
            );
            Ok(Arc::new(Base64Encoder))
        }
        EncryptionAlgorithm::Aes256Gcm => {
            let key = config.key.as_ref().ok_or_else(|| {
                QuickScanError::Configuration(
                    "encryption.key is required for aes-256-gcm".to_string(),
                )
            })?;
            Ok(Arc::new(AesGcmEncoder::from_key_material(
                key.expose_secret().as_bytes(),
            )?))
        }
    }
}

fn record_json(record: &SessionRecord) -> Result<Zeroizing<String>> {
    Ok(Zeroizing::new(serde_json::to_string(record)?))
}

/// Placeholder encoder: base64 of the record's JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Encoder;

impl PayloadEncoder for Base64Encoder {
    fn algorithm(&self) -> &'static str {
        EncryptionAlgorithm::SimulationBase64.as_str()
    }

    fn encode(&self, record: &SessionRecord) -> Result<EncryptedPayload> {
        let json = record_json(record)?;
        let encoded = general_purpose::STANDARD.encode(json.as_bytes());
        Ok(EncryptedPayload::new(encoded, self.algorithm()))
    }
}

/// AES-256-GCM encoder
///
/// The 256-bit key is the SHA-256 digest of the configured key material.
/// A fresh random 96-bit nonce is drawn for every payload.
pub struct AesGcmEncoder {
    cipher: Aes256Gcm,
}

impl AesGcmEncoder {
    /// # Errors
    ///
    /// Returns an error if the key material is empty.
    pub fn from_key_material(material: &[u8]) -> Result<Self> {
        if material.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(QuickScanError::Configuration(
                "encryption key material cannot be empty".to_string(),
            ));
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(material));
        let cipher = Aes256Gcm::new_from_slice(&digest)
            .map_err(|e| QuickScanError::Encryption(format!("invalid key length: {e}")));
        digest.zeroize();

        Ok(Self { cipher: cipher? })
    }

    /// Reverse [`PayloadEncoder::encode`], returning the record's JSON bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64, is too short, or
    /// fails authentication.
    pub fn decrypt(&self, encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
        let raw = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| QuickScanError::Encryption(format!("invalid base64: {e}")))?;
        if raw.len() <= NONCE_LEN {
            return Err(QuickScanError::Encryption(
                "ciphertext is too short".to_string(),
            ));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| QuickScanError::Encryption("payload authentication failed".to_string()))
    }
}

impl PayloadEncoder for AesGcmEncoder {
    fn algorithm(&self) -> &'static str {
        EncryptionAlgorithm::Aes256Gcm.as_str()
    }

    fn encode(&self, record: &SessionRecord) -> Result<EncryptedPayload> {
        let json = record_json(record)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), json.as_bytes())
            .map_err(|_| QuickScanError::Encryption("AES-GCM encryption failed".to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&ciphertext);
        let encoded = general_purpose::STANDARD.encode(&framed);

        Ok(EncryptedPayload::new(encoded, self.algorithm()))
    }
}
