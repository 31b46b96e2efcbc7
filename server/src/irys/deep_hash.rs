//! Arweave deep hash over SHA-384.
//!
//! blob:  H( H("blob" || len) || H(bytes) )
//! list:  acc = H("list" || len); for each item: acc = H(acc || deep_hash(item))
//!
//! Lengths are written as ASCII decimal.

use sha2::{Digest, Sha384};

pub type Hash384 = [u8; 48];

pub enum Chunk<'a> {
    Blob(&'a [u8]),
    List(Vec<Chunk<'a>>),
}

pub fn deep_hash(chunk: &Chunk<'_>) -> Hash384 {
    match chunk {
        Chunk::Blob(bytes) => {
            let tag = sha384(&[b"blob".as_slice(), bytes.len().to_string().as_bytes()]);
            let data = sha384(&[*bytes]);
            sha384(&[tag.as_slice(), data.as_slice()])
        }
        Chunk::List(items) => {
            let mut acc = sha384(&[b"list".as_slice(), items.len().to_string().as_bytes()]);
            for item in items {
                acc = sha384(&[acc.as_slice(), deep_hash(item).as_slice()]);
            }
            acc
        }
    }
}

fn sha384(parts: &[&[u8]]) -> Hash384 {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 48];
    out.copy_from_slice(&hasher.finalize());
    out
}
