//! Tag/length-delimited wire format used by serialized model artifacts.
//!
//! Every field starts with a varint tag `(field_number << 3) | wire_type`.
//! Only the four wire types found in model files are understood; anything
//! else, a truncated varint, or a length running past the buffer is an error.

use crate::error::{MetadataError, Result};

/// Top-level field holding one metadata entry per occurrence.
pub const MODEL_METADATA_FIELD: u32 = 14;

/// Entry field holding the key.
pub const ENTRY_KEY_FIELD: u32 = 1;

/// Entry field holding the value.
pub const ENTRY_VALUE_FIELD: u32 = 2;

/// Longest varint encoding of a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// Wire type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Base-128 varint.
    Varint,
    /// Eight little-endian bytes.
    Fixed64,
    /// Varint length followed by that many bytes.
    LengthDelimited,
    /// Four little-endian bytes.
    Fixed32,
}

impl WireType {
    /// Decodes the low three bits of a tag.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    const fn bits(self) -> u64 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }
}

/// Payload of a decoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Varint payload.
    Varint(u64),
    /// Fixed 64-bit payload.
    Fixed64(u64),
    /// Length-delimited payload.
    Bytes(&'a [u8]),
    /// Fixed 32-bit payload.
    Fixed32(u32),
}

/// Reads a varint at `offset`, returning the value and the next offset.
///
/// # Errors
///
/// Returns [`MetadataError::MalformedWire`] when the buffer ends mid-varint
/// or the encoding exceeds ten bytes.
pub fn read_varint(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().skip(offset).take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, offset + i + 1));
        }
    }
    if bytes.len().saturating_sub(offset) >= MAX_VARINT_LEN {
        Err(MetadataError::malformed(offset, "varint longer than 10 bytes"))
    } else {
        Err(MetadataError::malformed(offset, "truncated varint"))
    }
}

/// Sequential reader over the fields of one message.
///
/// Yields `(field_number, value)`; after the first error the reader is exhausted.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader over a whole message.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, start: usize, len: usize) -> Result<&'a [u8]> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                MetadataError::malformed(start, format!("field of {len} bytes overruns buffer"))
            })?;
        let bytes = self.bytes;
        self.offset = end;
        Ok(&bytes[start..end])
    }

    fn read_field(&mut self) -> Result<(u32, FieldValue<'a>)> {
        let tag_offset = self.offset;
        let (tag, pos) = read_varint(self.bytes, tag_offset)?;
        let field = u32::try_from(tag >> 3)
            .map_err(|_| MetadataError::malformed(tag_offset, "field number out of range"))?;
        let wire = WireType::from_bits(tag & 0x7).ok_or_else(|| {
            MetadataError::malformed(tag_offset, format!("unsupported wire type {}", tag & 0x7))
        })?;

        let value = match wire {
            WireType::Varint => {
                let (v, next) = read_varint(self.bytes, pos)?;
                self.offset = next;
                FieldValue::Varint(v)
            }
            WireType::Fixed64 => {
                let raw = self.take(pos, 8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                FieldValue::Fixed64(u64::from_le_bytes(buf))
            }
            WireType::Fixed32 => {
                let raw = self.take(pos, 4)?;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(raw);
                FieldValue::Fixed32(u32::from_le_bytes(buf))
            }
            WireType::LengthDelimited => {
                let (len, start) = read_varint(self.bytes, pos)?;
                let len = usize::try_from(len)
                    .map_err(|_| MetadataError::malformed(pos, "length out of range"))?;
                FieldValue::Bytes(self.take(start, len)?)
            }
        };
        Ok((field, value))
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<(u32, FieldValue<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let item = self.read_field();
        if item.is_err() {
            self.offset = self.bytes.len();
        }
        Some(item)
    }
}

/// Decodes one metadata entry record into `(key, value)`.
///
/// Missing fields decode as empty strings; non-UTF-8 text is replaced lossily.
///
/// # Errors
///
/// Returns [`MetadataError::MalformedWire`] if the record cannot be walked.
pub fn decode_entry(bytes: &[u8]) -> Result<(String, String)> {
    let mut key = String::new();
    let mut value = String::new();
    for field in FieldReader::new(bytes) {
        match field? {
            (ENTRY_KEY_FIELD, FieldValue::Bytes(raw)) => {
                key = String::from_utf8_lossy(raw).into_owned();
            }
            (ENTRY_VALUE_FIELD, FieldValue::Bytes(raw)) => {
                value = String::from_utf8_lossy(raw).into_owned();
            }
            _ => {}
        }
    }
    Ok((key, value))
}

/// Scans a serialized model for its metadata entries.
///
/// Only top-level fields are inspected; nested messages such as the graph are
/// skipped whole. Entries with an empty key are dropped and later duplicates
/// win.
///
/// # Errors
///
/// Returns [`MetadataError::MalformedWire`] if the model cannot be walked.
pub fn scan_model_metadata(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for field in FieldReader::new(bytes) {
        if let (MODEL_METADATA_FIELD, FieldValue::Bytes(raw)) = field? {
            let (key, value) = decode_entry(raw)?;
            if key.is_empty() {
                continue;
            }
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => entries.push((key, value)),
            }
        }
    }
    Ok(entries)
}

/// Appends a varint.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push(u8::try_from(value & 0x7f).unwrap_or(0) | 0x80);
        value >>= 7;
    }
    out.push(u8::try_from(value).unwrap_or(0));
}

/// Appends a field tag.
pub fn encode_tag(field: u32, wire: WireType, out: &mut Vec<u8>) {
    encode_varint((u64::from(field) << 3) | wire.bits(), out);
}

/// Appends a length-delimited field.
pub fn encode_bytes_field(field: u32, payload: &[u8], out: &mut Vec<u8>) {
    encode_tag(field, WireType::LengthDelimited, out);
    encode_varint(payload.len() as u64, out);
    out.extend_from_slice(payload);
}

/// Encodes one metadata entry record.
#[must_use]
pub fn encode_entry(key: &str, value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + value.len() + 6);
    encode_bytes_field(ENTRY_KEY_FIELD, key.as_bytes(), &mut out);
    encode_bytes_field(ENTRY_VALUE_FIELD, value.as_bytes(), &mut out);
    out
}

/// Encodes metadata entries as top-level model fields.
#[must_use]
pub fn encode_model_metadata<K, V>(entries: &[(K, V)]) -> Vec<u8>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = Vec::new();
    for (key, value) in entries {
        encode_bytes_field(
            MODEL_METADATA_FIELD,
            &encode_entry(key.as_ref(), value.as_ref()),
            &mut out,
        );
    }
    out
}
