//! Avro encoding of data item tags.
//!
//! Schema: `array<record { name: bytes, value: bytes }>`. Longs are zig-zag
//! varints, byte strings are length-prefixed, the array is written as one
//! block followed by a zero terminator. No tags encode to zero bytes.

use crate::error::UploadError;
use crate::upload::Tag;

pub const MAX_TAGS: usize = 128;
pub const MAX_TAG_NAME_BYTES: usize = 1024;
pub const MAX_TAG_VALUE_BYTES: usize = 3072;

pub fn serialize_tags(tags: &[Tag]) -> Result<Vec<u8>, UploadError> {
    validate(tags)?;
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let mut buf = Vec::new();
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    Ok(buf)
}

/// Bundler nodes reject items outside these limits, so fail before signing.
fn validate(tags: &[Tag]) -> Result<(), UploadError> {
    if tags.len() > MAX_TAGS {
        return Err(UploadError::InvalidTag(format!(
            "{} tags exceeds the limit of {}",
            tags.len(),
            MAX_TAGS
        )));
    }
    for (i, tag) in tags.iter().enumerate() {
        let name_len = tag.name.len();
        if name_len == 0 || name_len > MAX_TAG_NAME_BYTES {
            return Err(UploadError::InvalidTag(format!(
                "tag {} name must be 1..={} bytes",
                i, MAX_TAG_NAME_BYTES
            )));
        }
        let value_len = tag.value.len();
        if value_len == 0 || value_len > MAX_TAG_VALUE_BYTES {
            return Err(UploadError::InvalidTag(format!(
                "tag {} value must be 1..={} bytes",
                i, MAX_TAG_VALUE_BYTES
            )));
        }
    }
    Ok(())
}

fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z >= 0x80 {
        buf.push((z as u8 & 0x7f) | 0x80);
        z >>= 7;
    }
    buf.push(z as u8);
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}
