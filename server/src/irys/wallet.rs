use std::fmt;

use ed25519_dalek::{Signer, SigningKey};

use crate::error::UploadError;

/// A Solana wallet used to sign data items.
///
/// Accepted credential encodings:
/// - base58 of the 64-byte `secret || public` keypair (Phantom export)
/// - base58 of a 32-byte seed
/// - the Solana CLI keypair file content, a JSON array of 64 bytes
pub struct SolanaWallet {
    signing_key: SigningKey,
}

impl SolanaWallet {
    pub fn from_secret(secret: &str) -> Result<Self, UploadError> {
        let secret = secret.trim();
        let bytes = if secret.starts_with('[') {
            serde_json::from_str::<Vec<u8>>(secret).map_err(|_| {
                UploadError::InvalidCredential("JSON keypair must be an array of bytes".to_string())
            })?
        } else {
            bs58::decode(secret).into_vec().map_err(|_| {
                UploadError::InvalidCredential("secret key is not valid base58".to_string())
            })?
        };

        let signing_key = match bytes.len() {
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair).map_err(|_| {
                    UploadError::InvalidCredential(
                        "public half of the keypair does not match the secret".to_string(),
                    )
                })?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(UploadError::InvalidCredential(format!(
                    "expected a 32 or 64 byte key, got {} bytes",
                    n
                )))
            }
        };

        Ok(Self { signing_key })
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Raw ed25519 public key, the data item owner.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 wallet address.
    pub fn address(&self) -> String {
        bs58::encode(self.public_key()).into_string()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for SolanaWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaWallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
