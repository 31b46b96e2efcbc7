//! ANS-104 data items signed with a Solana key.
//!
//! Layout:
//! ```text
//! u16 LE   signature type (4 = Solana)
//! [64]     ed25519 signature
//! [32]     owner public key
//! u8       target present (always 0)
//! u8       anchor present (always 1) + [32] anchor
//! u64 LE   tag count
//! u64 LE   tag bytes length
//! [..]     Avro tags
//! [..]     data
//! ```
//!
//! Every item gets a fresh random anchor. ed25519 signatures are
//! deterministic, so without it identical uploads would collide on one id.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::UploadError;
use crate::irys::deep_hash::{deep_hash, Chunk, Hash384};
use crate::irys::tags::serialize_tags;
use crate::irys::wallet::SolanaWallet;
use crate::upload::Tag;

pub const SIGNATURE_TYPE_SOLANA: u16 = 4;
pub const SIGNATURE_LEN: usize = 64;
pub const OWNER_LEN: usize = 32;
pub const ANCHOR_LEN: usize = 32;

const SIGNATURE_OFFSET: usize = 2;
const OWNER_OFFSET: usize = SIGNATURE_OFFSET + SIGNATURE_LEN;

#[derive(Debug, Clone)]
pub struct DataItem {
    bytes: Vec<u8>,
    id: String,
}

impl DataItem {
    /// Build and sign a data item carrying `data` and `tags`.
    pub fn sign(wallet: &SolanaWallet, data: &[u8], tags: &[Tag]) -> Result<Self, UploadError> {
        Self::sign_with_anchor(wallet, data, tags, random_anchor())
    }

    pub fn sign_with_anchor(
        wallet: &SolanaWallet,
        data: &[u8],
        tags: &[Tag],
        anchor: [u8; ANCHOR_LEN],
    ) -> Result<Self, UploadError> {
        let owner = wallet.public_key();
        let tag_bytes = serialize_tags(tags)?;

        let message = signature_data(&owner, &anchor, &tag_bytes, data);
        let signature = wallet.sign(&message);

        let mut bytes = Vec::with_capacity(
            2 + SIGNATURE_LEN + OWNER_LEN + 1 + 1 + ANCHOR_LEN + 16 + tag_bytes.len() + data.len(),
        );
        bytes.extend_from_slice(&SIGNATURE_TYPE_SOLANA.to_le_bytes());
        bytes.extend_from_slice(&signature);
        bytes.extend_from_slice(&owner);
        bytes.push(0);
        bytes.push(1);
        bytes.extend_from_slice(&anchor);
        bytes.extend_from_slice(&(tags.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&tag_bytes);
        bytes.extend_from_slice(data);

        Ok(Self {
            id: item_id(&signature),
            bytes,
        })
    }

    /// Base64url SHA-256 of the signature, the id the bundler will report.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn signature(&self) -> &[u8] {
        &self.bytes[SIGNATURE_OFFSET..OWNER_OFFSET]
    }

    pub fn owner(&self) -> &[u8] {
        &self.bytes[OWNER_OFFSET..OWNER_OFFSET + OWNER_LEN]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The message the owner signs.
pub fn signature_data(owner: &[u8], anchor: &[u8], tag_bytes: &[u8], data: &[u8]) -> Hash384 {
    let sig_type = SIGNATURE_TYPE_SOLANA.to_string();
    deep_hash(&Chunk::List(vec![
        Chunk::Blob(b"dataitem"),
        Chunk::Blob(b"1"),
        Chunk::Blob(sig_type.as_bytes()),
        Chunk::Blob(owner),
        Chunk::Blob(&[]),
        Chunk::Blob(anchor),
        Chunk::Blob(tag_bytes),
        Chunk::Blob(data),
    ]))
}

fn item_id(signature: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(signature))
}

/// 32 printable bytes, the same shape the JS bundler client produces.
fn random_anchor() -> [u8; ANCHOR_LEN] {
    let raw: [u8; 32] = rand::rng().random();
    let encoded = STANDARD.encode(raw);
    let mut anchor = [0u8; ANCHOR_LEN];
    anchor.copy_from_slice(&encoded.as_bytes()[..ANCHOR_LEN]);
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};

    fn wallet() -> SolanaWallet {
        SolanaWallet::from_signing_key(SigningKey::from_bytes(&[11; 32]))
    }

    #[test]
    fn test_layout() {
        let wallet = wallet();
        let tags = [Tag::new("Content-Type", "text/plain")];
        let anchor = [b'A'; ANCHOR_LEN];
        let item = DataItem::sign_with_anchor(&wallet, b"Hello", &tags, anchor).unwrap();
        let bytes = item.as_bytes();

        assert_eq!(&bytes[..2], &[4, 0]);
        assert_eq!(item.owner(), &wallet.public_key());
        let mut at = OWNER_OFFSET + OWNER_LEN;
        assert_eq!(bytes[at], 0, "no target");
        at += 1;
        assert_eq!(bytes[at], 1, "anchor present");
        at += 1;
        assert_eq!(&bytes[at..at + ANCHOR_LEN], &anchor);
        at += ANCHOR_LEN;
        assert_eq!(u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap()), 1);
        at += 8;
        let tag_len = u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap()) as usize;
        at += 8;
        assert_eq!(&bytes[at..at + tag_len], serialize_tags(&tags).unwrap().as_slice());
        at += tag_len;
        assert_eq!(&bytes[at..], b"Hello");
    }

    #[test]
    fn test_signature_covers_deep_hash() {
        let wallet = wallet();
        let tags = [Tag::new("App-Name", "SCAI-Press")];
        let anchor = [b'z'; ANCHOR_LEN];
        let item = DataItem::sign_with_anchor(&wallet, b"payload", &tags, anchor).unwrap();

        let message = signature_data(
            item.owner(),
            &anchor,
            &serialize_tags(&tags).unwrap(),
            b"payload",
        );
        let vk = VerifyingKey::from_bytes(&wallet.public_key()).unwrap();
        let sig = Signature::from_slice(item.signature()).unwrap();
        assert!(vk.verify(&message, &sig).is_ok());

        let tampered = signature_data(item.owner(), &anchor, &[], b"payload");
        assert!(vk.verify(&tampered, &sig).is_err());
    }

    #[test]
    fn test_id_is_hash_of_signature() {
        let item = DataItem::sign(&wallet(), b"abc", &[]).unwrap();
        assert_eq!(item.id().len(), 43);
        assert_eq!(item.id(), URL_SAFE_NO_PAD.encode(Sha256::digest(item.signature())));
    }

    #[test]
    fn test_same_bytes_get_distinct_ids() {
        let wallet = wallet();
        let a = DataItem::sign(&wallet, b"same", &[]).unwrap();
        let b = DataItem::sign(&wallet, b"same", &[]).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_fixed_anchor_is_deterministic() {
        let wallet = wallet();
        let a = DataItem::sign_with_anchor(&wallet, b"same", &[], [1; ANCHOR_LEN]).unwrap();
        let b = DataItem::sign_with_anchor(&wallet, b"same", &[], [1; ANCHOR_LEN]).unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_tags_fail_before_signing() {
        let err = DataItem::sign(&wallet(), b"x", &[Tag::new("", "v")]).unwrap_err();
        assert!(matches!(err, UploadError::InvalidTag(_)));
    }
}
